//! Drawing a world snapshot
//!
//! Layout, top to bottom: title banner, play field, ground line on the
//! second-to-last row, command hints on the last row. The world is as wide as
//! the banner and centered horizontally.

use std::io;

use super::{Canvas, Surface};
use crate::assets::{GROUND_GLYPH, HAZARD_GLYPH, ITEM_GLYPH, TITLE_ART};
use crate::consts::HAZARD_THRESHOLD;
use crate::sim::WorldSnapshot;

/// Command hints plus the meal counter
pub fn status_line(snapshot: &WorldSnapshot) -> String {
    let commands = if snapshot.hazard_active() {
        "Commands: q=quit  f=feed  c=clean poop"
    } else {
        "Commands: q=quit  f=feed"
    };
    format!(
        "{}   eaten: {}/{}",
        commands, snapshot.consumed, HAZARD_THRESHOLD
    )
}

/// Clear the surface and draw `snapshot` (does not refresh)
pub fn draw_scene<S: Surface>(surface: &mut S, snapshot: &WorldSnapshot) -> io::Result<()> {
    let mut canvas = Canvas::new(surface)?;
    canvas.clear()?;

    let rows = canvas.rows();
    let width = snapshot.geometry.width as i32;
    let x_offset = (canvas.cols() - width) / 2;

    for (row, line) in TITLE_ART.iter().enumerate() {
        canvas.put_line(row as i32, x_offset, line)?;
    }
    for col in 0..width {
        canvas.put_char(rows - 2, x_offset + col, GROUND_GLYPH)?;
    }

    if let Some(x) = snapshot.hazard_x {
        canvas.put_char(rows - 3, x_offset + x.floor() as i32, HAZARD_GLYPH)?;
    }
    if let Some(item) = snapshot.item {
        canvas.put_char(
            item.y.floor() as i32,
            x_offset + item.x.floor() as i32,
            ITEM_GLYPH,
        )?;
    }

    // Never draw the pet over the ground line
    let pet_row = snapshot.pet.y.floor() as i32;
    if pet_row < rows - 2 {
        let pet_col = x_offset + (snapshot.pet.x - snapshot.pet_half_width).floor() as i32;
        canvas.put_sprite(pet_row, pet_col, snapshot.pet_sprite)?;
    }

    canvas.put_line(rows - 1, x_offset.max(0), &status_line(snapshot))
}

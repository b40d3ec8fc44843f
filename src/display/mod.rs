//! Character-grid display
//!
//! The control loop draws through the [`Surface`] trait:
//! - `TerminalSurface`: crossterm, alternate screen, raw mode
//! - `MemorySurface`: in-memory grid with scripted keys (headless, tests)
//!
//! Surfaces expect in-bounds coordinates; [`Canvas`] does the clipping so
//! nothing out of bounds is ever sent to them.

pub mod memory;
pub mod scene;
pub mod terminal;

pub use memory::MemorySurface;
pub use scene::{draw_scene, status_line};
pub use terminal::TerminalSurface;

use std::io;

/// A single keystroke
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Char(char),
    /// Ctrl-C; raw mode swallows the signal so it arrives as a key
    Interrupt,
}

/// Text-grid output plus non-blocking keyboard input
pub trait Surface {
    /// Current size as `(rows, cols)`
    fn size(&self) -> io::Result<(u16, u16)>;

    fn clear(&mut self) -> io::Result<()>;

    fn draw_str(&mut self, row: u16, col: u16, text: &str) -> io::Result<()>;

    fn draw_char(&mut self, row: u16, col: u16, ch: char) -> io::Result<()>;

    /// Push everything drawn since the last clear to the screen
    fn refresh(&mut self) -> io::Result<()>;

    /// Next pending key, or `None` immediately if there is none
    fn poll_key(&mut self) -> io::Result<Option<Key>>;
}

/// Bounds-checked drawing over a surface of fixed size
pub struct Canvas<'a, S: Surface> {
    surface: &'a mut S,
    rows: i32,
    cols: i32,
}

impl<'a, S: Surface> Canvas<'a, S> {
    /// Snapshot the surface size; it stays fixed for the canvas' lifetime
    pub fn new(surface: &'a mut S) -> io::Result<Self> {
        let (rows, cols) = surface.size()?;
        Ok(Self {
            surface,
            rows: rows as i32,
            cols: cols as i32,
        })
    }

    pub fn rows(&self) -> i32 {
        self.rows
    }

    pub fn cols(&self) -> i32 {
        self.cols
    }

    pub fn clear(&mut self) -> io::Result<()> {
        self.surface.clear()
    }

    fn in_bounds(&self, row: i32, col: i32) -> bool {
        (0..self.rows).contains(&row) && (0..self.cols).contains(&col)
    }

    pub fn put_char(&mut self, row: i32, col: i32, ch: char) -> io::Result<()> {
        if !self.in_bounds(row, col) {
            return Ok(());
        }
        self.surface.draw_char(row as u16, col as u16, ch)
    }

    /// Draw `text` only if all of it fits
    pub fn put_sprite(&mut self, row: i32, col: i32, text: &str) -> io::Result<()> {
        let len = text.chars().count() as i32;
        if len == 0 || !self.in_bounds(row, col) || !self.in_bounds(row, col + len - 1) {
            return Ok(());
        }
        self.surface.draw_str(row as u16, col as u16, text)
    }

    /// Draw whatever part of `text` falls on screen
    pub fn put_line(&mut self, row: i32, col: i32, text: &str) -> io::Result<()> {
        if !(0..self.rows).contains(&row) {
            return Ok(());
        }
        let skip = (-col).max(0) as usize;
        let start = col.max(0);
        let room = (self.cols - start).max(0) as usize;
        let visible: String = text.chars().skip(skip).take(room).collect();
        if visible.is_empty() {
            return Ok(());
        }
        self.surface.draw_str(row as u16, start as u16, &visible)
    }
}

//! Static glyphs: title banner and sprites

/// Title banner drawn at the top of the screen; its width is the world width
pub const TITLE_ART: &[&str] = &[
    r"  ____      _                    _       _     _ ",
    r" / ___|__ _| |_ __ _  __ _  ___ | |_ ___| |__ (_)",
    r"| |   / _` | __/ _` |/ _` |/ _ \| __/ __| '_ \| |",
    r"| |__| (_| | || (_| | (_| | (_) | || (__| | | | |",
    r" \____\__,_|\__\__,_|\__, |\___/ \__\___|_| |_|_|",
    r"                     |___/                       ",
];

/// Five cells wide, matching the pet's collision box
pub const PET_SPRITE: &str = "=^.^=";
pub const ITEM_GLYPH: char = '*';
pub const HAZARD_GLYPH: char = '@';
pub const GROUND_GLYPH: char = '-';

/// Widest banner line, in characters
pub fn title_width() -> usize {
    TITLE_ART
        .iter()
        .map(|line| line.chars().count())
        .max()
        .unwrap_or(0)
}

pub fn title_height() -> usize {
    TITLE_ART.len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::PET_HALF_WIDTH;

    #[test]
    fn test_sprite_matches_pet_box() {
        assert_eq!(PET_SPRITE.chars().count() as f32, 2.0 * PET_HALF_WIDTH);
    }

    #[test]
    fn test_title_wide_enough_for_item_band() {
        assert!(title_width() > 8 + 2 * PET_HALF_WIDTH as usize);
        assert_eq!(title_height(), 6);
    }
}

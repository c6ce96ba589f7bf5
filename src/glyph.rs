//! Glyph tiles and date label overlay
//!
//! Glyph tiles use 2 bits per pixel, four pixels per byte with the leftmost
//! pixel in the lowest bits:
//!
//! | Bit | Meaning                                  |
//! |-----|------------------------------------------|
//! | 1   | Ink present (0 = transparent)            |
//! | 0   | 1 = label ink, 0 = label background      |
//!
//! Digit and bracket tiles span the whole label band. Kanji tiles are shorter
//! and sit at the bottom of the band, `kanji_offset` rows down.
//!
//! The label is centered horizontally at the top of the frame: one slot of
//! `letter_width` pixels per letter.

use crate::color::Color;
use crate::date::{DateLabel, LABEL_LEN, Letter, Weekday};
use crate::error::BuilderError;

/// Tile geometry
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GlyphGeometry {
    /// Tile width in pixels (multiple of 4)
    pub letter_width: u16,
    /// Rows of digit and bracket tiles, which is also the band height
    pub digit_height: u16,
    /// First band row covered by kanji tiles
    pub kanji_offset: u16,
}

impl GlyphGeometry {
    /// 32 px wide tiles, 48 row digits, 32 row kanji
    pub const STANDARD: Self = Self {
        letter_width: 32,
        digit_height: 48,
        kanji_offset: 16,
    };

    /// Bytes in one tile row
    pub fn row_len(&self) -> usize {
        self.letter_width as usize / 4
    }

    /// Bytes in a digit or bracket tile
    pub fn digit_len(&self) -> usize {
        self.row_len() * self.digit_height as usize
    }

    /// Bytes in a kanji tile
    pub fn kanji_len(&self) -> usize {
        self.row_len() * self.digit_height.saturating_sub(self.kanji_offset) as usize
    }

    /// Bytes of a scanline covered by one letter slot
    fn slot_len(&self) -> usize {
        self.letter_width as usize / 2
    }

    fn validate(&self) -> Result<(), BuilderError> {
        if self.letter_width == 0 || self.letter_width % 4 != 0 {
            return Err(BuilderError::InvalidGlyphGeometry);
        }
        if self.digit_height == 0 || self.kanji_offset >= self.digit_height {
            return Err(BuilderError::InvalidGlyphGeometry);
        }
        Ok(())
    }
}

impl Default for GlyphGeometry {
    fn default() -> Self {
        Self::STANDARD
    }
}

/// Kanji tile order inside a glyph table
const KANJI_YEAR: usize = 7;
const KANJI_MONTH: usize = 8;
const KANJI_DAY: usize = 9;

/// Borrowed glyph tile set
///
/// Holds ten digit tiles, ten kanji tiles (日 月 火 水 木 金 土 for the weekdays,
/// then 年 月 日) and two optional bracket tiles.
#[derive(Clone, Copy, Debug)]
pub struct GlyphTable<'a> {
    geometry: GlyphGeometry,
    digits: &'a [u8],
    kanji: &'a [u8],
    brackets: &'a [u8],
}

impl<'a> GlyphTable<'a> {
    /// Create a table from concatenated tiles
    ///
    /// * `digits` - tiles for 0..=9, `geometry.digit_len()` bytes each
    /// * `kanji` - ten kanji tiles, `geometry.kanji_len()` bytes each
    /// * `brackets` - open then close bracket, `geometry.digit_len()` bytes
    ///   each, or empty to leave the bracket slots untouched
    ///
    /// # Errors
    ///
    /// Returns `BuilderError::InvalidGlyphGeometry` for unusable geometry and
    /// `BuilderError::InvalidGlyphTile` if a slice has the wrong length.
    pub fn from_tiles(
        geometry: GlyphGeometry,
        digits: &'a [u8],
        kanji: &'a [u8],
        brackets: &'a [u8],
    ) -> Result<Self, BuilderError> {
        geometry.validate()?;
        check_len(digits, geometry.digit_len() * 10)?;
        check_len(kanji, geometry.kanji_len() * 10)?;
        if !brackets.is_empty() {
            check_len(brackets, geometry.digit_len() * 2)?;
        }
        Ok(Self {
            geometry,
            digits,
            kanji,
            brackets,
        })
    }

    /// Tile geometry
    pub fn geometry(&self) -> GlyphGeometry {
        self.geometry
    }

    /// Tile row for `letter` at band row `row`, if the letter draws anything there
    fn tile_row(&self, letter: Letter, row: u16) -> Option<&'a [u8]> {
        let geometry = self.geometry;
        let (tiles, tile_len, index, tile_row) = match letter {
            Letter::Blank => return None,
            Letter::Digit(digit) => (self.digits, geometry.digit_len(), digit as usize, row),
            Letter::OpenBracket => (self.brackets, geometry.digit_len(), 0, row),
            Letter::CloseBracket => (self.brackets, geometry.digit_len(), 1, row),
            Letter::Weekday(day) => kanji_row(self.kanji, geometry, day.index() as usize, row)?,
            Letter::Year => kanji_row(self.kanji, geometry, KANJI_YEAR, row)?,
            Letter::Month => kanji_row(self.kanji, geometry, KANJI_MONTH, row)?,
            Letter::Day => kanji_row(self.kanji, geometry, KANJI_DAY, row)?,
        };
        let start = index * tile_len + tile_row as usize * geometry.row_len();
        tiles.get(start..start + geometry.row_len())
    }

    /// Merge the label glyphs into one scanline
    ///
    /// `row` is the frame row of `scanline`. Rows below the label band are left
    /// untouched, as are pixels where a glyph is transparent. Only the nibble of
    /// each inked pixel changes; calling this twice gives the same result as
    /// calling it once.
    pub fn overlay(
        &self,
        scanline: &mut [u8],
        row: u16,
        label: &DateLabel,
        ink: Color,
        background: Color,
    ) {
        if row >= self.geometry.digit_height {
            return;
        }
        let slot_len = self.geometry.slot_len();
        let margin = scanline.len().saturating_sub(slot_len * LABEL_LEN) / 2;

        for (slot, letter) in label.letters().iter().enumerate() {
            let Some(tile) = self.tile_row(*letter, row) else {
                continue;
            };
            let start = margin + slot * slot_len;
            let Some(dest) = scanline.get_mut(start..) else {
                break;
            };
            composite(dest, tile, ink, background);
        }
    }
}

/// Kanji tile lookup: nothing above the kanji offset
fn kanji_row(
    kanji: &[u8],
    geometry: GlyphGeometry,
    index: usize,
    row: u16,
) -> Option<(&[u8], usize, usize, u16)> {
    let tile_row = row.checked_sub(geometry.kanji_offset)?;
    Some((kanji, geometry.kanji_len(), index, tile_row))
}

/// Write inked tile pixels into packed destination bytes
fn composite(dest: &mut [u8], tile: &[u8], ink: Color, background: Color) {
    let pixels = tile
        .iter()
        .flat_map(|&byte| (0..4).map(move |i| (byte >> (i * 2)) & 0b11));
    for (x, pixel) in pixels.enumerate() {
        if pixel & 0b10 == 0 {
            continue;
        }
        let Some(byte) = dest.get_mut(x / 2) else {
            return;
        };
        let color = (if pixel & 0b01 != 0 { ink } else { background }).index();
        *byte = if x % 2 == 0 {
            (*byte & 0x0F) | (color << 4)
        } else {
            (*byte & 0xF0) | color
        };
    }
}

fn check_len(tiles: &[u8], expected: usize) -> Result<(), BuilderError> {
    if tiles.len() != expected {
        return Err(BuilderError::InvalidGlyphTile {
            expected,
            provided: tiles.len(),
        });
    }
    Ok(())
}

/// Blanks followed by weekday kanji, the first line of the glyph showcase
pub(crate) const SHOWCASE_UPPER: [Letter; LABEL_LEN] = [
    Letter::Blank,
    Letter::Blank,
    Letter::Blank,
    Letter::Blank,
    Letter::Blank,
    Letter::Blank,
    Letter::Blank,
    Letter::Blank,
    Letter::Blank,
    Letter::Blank,
    Letter::Weekday(Weekday::Sunday),
    Letter::Weekday(Weekday::Monday),
    Letter::Weekday(Weekday::Tuesday),
    Letter::Weekday(Weekday::Wednesday),
];

/// All digits and the remaining kanji, the second line of the glyph showcase
pub(crate) const SHOWCASE_LOWER: [Letter; LABEL_LEN] = [
    Letter::Digit(0),
    Letter::Digit(1),
    Letter::Digit(2),
    Letter::Digit(3),
    Letter::Digit(4),
    Letter::Digit(5),
    Letter::Digit(6),
    Letter::Digit(7),
    Letter::Digit(8),
    Letter::Digit(9),
    Letter::Weekday(Weekday::Thursday),
    Letter::Weekday(Weekday::Friday),
    Letter::Weekday(Weekday::Saturday),
    Letter::Year,
];

#[cfg(test)]
mod tests {
    use super::*;
    use crate::date::Date;

    /// 4 px wide tiles, 4 row digits, kanji from row 2
    const SMALL: GlyphGeometry = GlyphGeometry {
        letter_width: 4,
        digit_height: 4,
        kanji_offset: 2,
    };

    /// Pixel codes: transparent, background, ink
    const T: u8 = 0b00;
    const B: u8 = 0b10;
    const I: u8 = 0b11;

    const fn tile_byte(p: [u8; 4]) -> u8 {
        p[0] | (p[1] << 2) | (p[2] << 4) | (p[3] << 6)
    }

    fn small_table() -> GlyphTable<'static> {
        // Every digit: ink, background, transparent, ink on every row
        static DIGITS: [u8; 40] = [tile_byte([I, B, T, I]); 40];
        // Every kanji: ink everywhere
        static KANJI: [u8; 20] = [tile_byte([I, I, I, I]); 20];
        GlyphTable::from_tiles(SMALL, &DIGITS, &KANJI, &[]).unwrap()
    }

    fn label() -> DateLabel {
        DateLabel::compose(Date::new(2024, 2, 29))
    }

    #[test]
    fn test_standard_geometry_lengths() {
        assert_eq!(GlyphGeometry::STANDARD.row_len(), 8);
        assert_eq!(GlyphGeometry::STANDARD.digit_len(), 384);
        assert_eq!(GlyphGeometry::STANDARD.kanji_len(), 256);
    }

    #[test]
    fn test_wrong_tile_length_is_rejected() {
        let digits = [0u8; 39];
        let kanji = [0u8; 20];
        assert_eq!(
            GlyphTable::from_tiles(SMALL, &digits, &kanji, &[]).err(),
            Some(BuilderError::InvalidGlyphTile {
                expected: 40,
                provided: 39
            })
        );
    }

    #[test]
    fn test_bad_geometry_is_rejected() {
        let geometry = GlyphGeometry {
            letter_width: 6,
            ..SMALL
        };
        assert_eq!(
            GlyphTable::from_tiles(geometry, &[], &[], &[]).err(),
            Some(BuilderError::InvalidGlyphGeometry)
        );
    }

    #[test]
    fn test_rows_outside_band_are_untouched() {
        let table = small_table();
        let mut scanline = [0x55u8; 30];
        for row in [4, 5, 100, u16::MAX] {
            table.overlay(&mut scanline, row, &label(), Color::Red, Color::White);
            assert_eq!(scanline, [0x55u8; 30]);
        }
    }

    #[test]
    fn test_digit_pixels_composite_per_nibble() {
        let table = small_table();
        // 14 slots of 2 bytes centered in 30 bytes: 1 byte margin
        let mut scanline = [0x66u8; 30];
        table.overlay(&mut scanline, 0, &label(), Color::Red, Color::White);
        // Untouched margin
        assert_eq!(scanline[0], 0x66);
        // Slot 0 is digit 2: ink, background | transparent, ink
        assert_eq!(scanline[1], 0x41);
        assert_eq!(scanline[2], 0x64);
        assert_eq!(scanline[29], 0x66);
    }

    #[test]
    fn test_kanji_rows_above_offset_leave_slot_alone() {
        let table = small_table();
        let mut scanline = [0x66u8; 30];
        table.overlay(&mut scanline, 1, &label(), Color::Blue, Color::White);
        // Slot 4 is 年 starting at byte 1 + 4 * 2
        assert_eq!(scanline[9..11], [0x66, 0x66]);

        table.overlay(&mut scanline, 2, &label(), Color::Blue, Color::White);
        assert_eq!(scanline[9..11], [0x33, 0x33]);
    }

    #[test]
    fn test_blank_and_missing_brackets_draw_nothing() {
        let table = small_table();
        let mut scanline = [0x66u8; 30];
        table.overlay(&mut scanline, 0, &label(), Color::Red, Color::White);
        // Slot 5 is the blank month tens digit, slot 11 the open bracket
        assert_eq!(scanline[11..13], [0x66, 0x66]);
        assert_eq!(scanline[23..25], [0x66, 0x66]);
    }

    #[test]
    fn test_overlay_is_idempotent() {
        let table = small_table();
        let mut once = [0u8; 30];
        for (i, byte) in once.iter_mut().enumerate() {
            *byte = (i as u8).wrapping_mul(37);
        }
        let mut twice = once;
        for row in 0..4 {
            table.overlay(&mut once, row, &label(), Color::Red, Color::Yellow);
            table.overlay(&mut twice, row, &label(), Color::Red, Color::Yellow);
            table.overlay(&mut twice, row, &label(), Color::Red, Color::Yellow);
            assert_eq!(once, twice);
        }
    }

    #[test]
    fn test_label_wider_than_scanline_is_clipped() {
        let table = small_table();
        let mut scanline = [0x11u8; 5];
        table.overlay(&mut scanline, 0, &label(), Color::Red, Color::White);
        // Digits 2 0 2: [I B | T I] per slot
        assert_eq!(scanline, [0x41, 0x14, 0x41, 0x14, 0x41]);
    }

    #[test]
    fn test_showcase_lines_are_full_length() {
        assert_eq!(SHOWCASE_UPPER.len(), LABEL_LEN);
        assert_eq!(SHOWCASE_LOWER[13], Letter::Year);
    }
}

//! Color palette for 7-color ACeP e-paper panels
//!
//! ACeP panels render one of seven fixed inks per pixel. Pixels travel over the
//! wire as 3-bit palette indices, two per byte: the left pixel in the high
//! nibble and the right pixel in the low nibble. The top bit of each nibble is
//! unused and always zero.
//!
//! | Color  | Index |
//! |--------|-------|
//! | Black  | 0     |
//! | White  | 1     |
//! | Green  | 2     |
//! | Blue   | 3     |
//! | Red    | 4     |
//! | Yellow | 5     |
//! | Orange | 6     |
//!
//! ## Example
//!
//! ```
//! use acep_calendar::Color;
//!
//! assert_eq!(Color::Red.index(), 4);
//! assert_eq!(Color::Red.fill_byte(), 0x44);
//! assert_eq!(Color::try_from(3), Ok(Color::Blue));
//! assert!(Color::try_from(7).is_err());
//! ```

/// Number of inks in the panel palette
pub const PALETTE_SIZE: u8 = 7;

/// Colors supported by 7-color ACeP panels
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
#[repr(u8)]
pub enum Color {
    /// Black ink
    Black = 0,
    /// White ink
    #[default]
    White = 1,
    /// Green ink
    Green = 2,
    /// Blue ink
    Blue = 3,
    /// Red ink
    Red = 4,
    /// Yellow ink
    Yellow = 5,
    /// Orange ink
    Orange = 6,
}

#[cfg(feature = "graphics")]
impl embedded_graphics_core::prelude::PixelColor for Color {
    type Raw = embedded_graphics_core::pixelcolor::raw::RawU4;
}

impl Color {
    /// All palette entries in index order
    pub const ALL: [Self; PALETTE_SIZE as usize] = [
        Self::Black,
        Self::White,
        Self::Green,
        Self::Blue,
        Self::Red,
        Self::Yellow,
        Self::Orange,
    ];

    /// 3-bit palette index sent to the panel
    pub fn index(self) -> u8 {
        self as u8
    }

    /// A byte with both nibbles set to this color
    ///
    /// ```
    /// use acep_calendar::Color;
    ///
    /// assert_eq!(Color::Black.fill_byte(), 0x00);
    /// assert_eq!(Color::Orange.fill_byte(), 0x66);
    /// ```
    pub fn fill_byte(self) -> u8 {
        (self.index() << 4) | self.index()
    }

    /// Background that stays legible behind glyphs inked in this color
    ///
    /// White and yellow ink get a black background, everything else white.
    pub fn contrasting(self) -> Self {
        match self {
            Self::White | Self::Yellow => Self::Black,
            _ => Self::White,
        }
    }
}

impl From<Color> for u8 {
    fn from(color: Color) -> Self {
        color.index()
    }
}

impl TryFrom<u8> for Color {
    /// The rejected index
    type Error = u8;

    fn try_from(index: u8) -> Result<Self, Self::Error> {
        Self::ALL.get(index as usize).copied().ok_or(index)
    }
}

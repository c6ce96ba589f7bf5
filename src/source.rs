//! Scanline sources
//!
//! A [`ScanlineSource`] fills one packed scanline at a time. The display pulls
//! exactly `rows` scanlines per frame, after rewinding the source.
//!
//! - [`Solid`] - one color everywhere
//! - [`Tiled`] - a [`Bitmap`] repeated across and down the panel
//! - [`Stream`] - raw frame bytes from a reader, such as a file on an SD card
//! - [`ColorBands`] - the seven palette colors as horizontal bands
//!
//! ## Example
//!
//! ```
//! use acep_calendar::{Bitmap, ScanlineSource, Tiled};
//!
//! // 2x2 pixels: one byte per row
//! let pixels = [0x01, 0x23];
//! let bitmap = Bitmap::new(&pixels, 2, 2).unwrap();
//! let mut source = Tiled::new(bitmap);
//!
//! let mut scanline = [0u8; 3];
//! source.next_scanline(&mut scanline).unwrap();
//! assert_eq!(scanline, [0x01, 0x01, 0x01]);
//! source.next_scanline(&mut scanline).unwrap();
//! assert_eq!(scanline, [0x23, 0x23, 0x23]);
//! ```

use embedded_io::{Error as _, Read};

use crate::color::Color;
use crate::error::SourceError;

/// Producer of packed scanlines
pub trait ScanlineSource {
    /// Restart at the first scanline
    fn rewind(&mut self) {}

    /// Fill `scanline` with the next row of packed pixels
    fn next_scanline(&mut self, scanline: &mut [u8]) -> Result<(), SourceError>;

    /// Whether the source uses a bus shared with the panel
    ///
    /// When true, the panel is deselected around every call to
    /// [`next_scanline`](Self::next_scanline).
    fn shares_bus(&self) -> bool {
        false
    }
}

/// Borrowed packed pixel data, two pixels per byte
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Bitmap<'a> {
    data: &'a [u8],
    width: u16,
    height: u16,
}

impl<'a> Bitmap<'a> {
    /// Wrap `data` as a `width` x `height` bitmap
    ///
    /// Each row takes `width / 2` bytes. Returns `None` if the bitmap is
    /// narrower than two pixels, has no rows, or `data` is too short.
    pub fn new(data: &'a [u8], width: u16, height: u16) -> Option<Self> {
        let row_len = width as usize / 2;
        if row_len == 0 || height == 0 || data.len() < row_len * height as usize {
            return None;
        }
        Some(Self {
            data,
            width,
            height,
        })
    }

    /// Wrap data already known to be large enough
    #[cfg(feature = "graphics")]
    pub(crate) fn from_parts(data: &'a [u8], width: u16, height: u16) -> Self {
        Self {
            data,
            width,
            height,
        }
    }

    /// Width in pixels
    pub fn width(&self) -> u16 {
        self.width
    }

    /// Height in pixels
    pub fn height(&self) -> u16 {
        self.height
    }

    /// Pixel data
    pub fn data(&self) -> &'a [u8] {
        self.data
    }

    /// Packed bytes of row `y`
    fn row(&self, y: u16) -> &'a [u8] {
        let row_len = self.width as usize / 2;
        let start = row_len * y as usize;
        self.data.get(start..start + row_len).unwrap_or_default()
    }
}

/// Every pixel the same color
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Solid(pub Color);

impl ScanlineSource for Solid {
    fn next_scanline(&mut self, scanline: &mut [u8]) -> Result<(), SourceError> {
        scanline.fill(self.0.fill_byte());
        Ok(())
    }
}

/// A bitmap repeated to fill the panel
///
/// Panel row `y` shows bitmap row `y % height`, repeated horizontally with the
/// last repeat cut off at the panel edge.
#[derive(Clone, Copy, Debug)]
pub struct Tiled<'a> {
    bitmap: Bitmap<'a>,
    row: u16,
}

impl<'a> Tiled<'a> {
    /// Tile `bitmap` starting at its first row
    pub fn new(bitmap: Bitmap<'a>) -> Self {
        Self { bitmap, row: 0 }
    }
}

impl ScanlineSource for Tiled<'_> {
    fn rewind(&mut self) {
        self.row = 0;
    }

    fn next_scanline(&mut self, scanline: &mut [u8]) -> Result<(), SourceError> {
        let row = self.bitmap.row(self.row);
        for chunk in scanline.chunks_mut(row.len().max(1)) {
            let len = chunk.len().min(row.len());
            chunk[..len].copy_from_slice(&row[..len]);
        }
        self.row = (self.row + 1) % self.bitmap.height;
        Ok(())
    }
}

/// Raw frame bytes read sequentially from `R`
///
/// The reader must be positioned at the first scanline; it is consumed as the
/// frame is drawn and cannot be rewound.
pub struct Stream<R> {
    reader: R,
    shares_bus: bool,
}

impl<R: Read> Stream<R> {
    /// Read scanlines from `reader`
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            shares_bus: true,
        }
    }

    /// Declare whether the reader sits on the panel's SPI bus (default true)
    pub fn with_shared_bus(mut self, shares_bus: bool) -> Self {
        self.shares_bus = shares_bus;
        self
    }

    /// Return the reader
    pub fn into_inner(self) -> R {
        self.reader
    }
}

impl<R: Read> ScanlineSource for Stream<R> {
    fn next_scanline(&mut self, scanline: &mut [u8]) -> Result<(), SourceError> {
        let mut received = 0;
        while received < scanline.len() {
            match self.reader.read(&mut scanline[received..]) {
                Ok(0) => {
                    return Err(SourceError::ShortRead {
                        expected: scanline.len(),
                        received,
                    });
                }
                Ok(n) => received += n,
                Err(e) => return Err(SourceError::Io(e.kind())),
            }
        }
        Ok(())
    }

    fn shares_bus(&self) -> bool {
        self.shares_bus
    }
}

/// Seven horizontal bands, one per palette color
///
/// Each band is `rows / 7` rows tall. Leftover rows continue the last band.
#[derive(Clone, Copy, Debug)]
pub struct ColorBands {
    band_height: u16,
    row: u16,
}

impl ColorBands {
    /// Bands for a panel with `rows` rows
    pub fn new(rows: u16) -> Self {
        Self {
            band_height: (rows / Color::ALL.len() as u16).max(1),
            row: 0,
        }
    }

    /// Rows per band
    pub fn band_height(&self) -> u16 {
        self.band_height
    }

    /// Band color at frame row `row` and the row's offset within the band
    pub fn band_at(&self, row: u16) -> (Color, u16) {
        let last = Color::ALL.len() - 1;
        let band = (row / self.band_height) as usize;
        if band > last {
            let start = self.band_height * last as u16;
            (Color::ALL[last], row - start)
        } else {
            (Color::ALL[band], row % self.band_height)
        }
    }
}

impl ScanlineSource for ColorBands {
    fn rewind(&mut self) {
        self.row = 0;
    }

    fn next_scanline(&mut self, scanline: &mut [u8]) -> Result<(), SourceError> {
        let (color, _) = self.band_at(self.row);
        scanline.fill(color.fill_byte());
        self.row = self.row.saturating_add(1);
        Ok(())
    }
}

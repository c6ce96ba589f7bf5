//! Error types for the driver
//!
//! This module defines error types for configuration building ([`BuilderError`]),
//! scanline sources ([`SourceError`]), the image catalog ([`CatalogError`]) and
//! display operations ([`Error`]).
//!
//! ## Error Types
//!
//! - [`BuilderError`] - Errors during configuration, canvas or glyph table construction
//! - [`SourceError`] - A scanline source could not deliver a full scanline
//! - [`CatalogError`] - Image lookup on removable storage failed
//! - [`Error`] - Runtime errors during display operations
//! - [`InterfaceError`](crate::interface::InterfaceError) - Low-level hardware communication errors
//!
//! None of these are retried by the driver. A failed frame leaves the panel
//! showing its previous content.
//!
//! ## Example
//!
//! ```
//! use acep_calendar::{Builder, Dimensions, BuilderError};
//!
//! // Missing dimensions
//! let result = Builder::new().build();
//! assert!(matches!(result, Err(BuilderError::MissingDimensions)));
//!
//! // Odd width: two pixels share a byte
//! let result = Dimensions::new(448, 601);
//! assert!(result.is_err());
//! ```

use embedded_io::ErrorKind;

use crate::interface::DisplayInterface;

/// Maximum number of rows supported by the controller
pub const MAX_ROWS: u16 = 600;

/// Maximum number of columns supported by the controller
pub const MAX_COLUMNS: u16 = 800;

/// Errors that can occur when interacting with the display
///
/// Generic over the interface type to preserve the specific error type.
#[derive(Debug)]
pub enum Error<I: DisplayInterface> {
    /// Interface error (SPI/GPIO)
    ///
    /// Wraps the underlying hardware error from the [`DisplayInterface`] implementation.
    Interface(I::Error),
    /// A picture operation was attempted before a successful initialization
    NotInitialized,
    /// BUSY never reported ready within the startup window
    ///
    /// The display is left uninitialized; call `initialize` again.
    HardwareTimeout,
    /// Color index outside the 7-entry palette
    InvalidColor(u8),
    /// Bitmap with a zero dimension or too little pixel data
    InvalidBitmap {
        /// Bitmap width in pixels
        width: u16,
        /// Bitmap height in pixels
        height: u16,
        /// Pixel data length in bytes
        len: usize,
    },
    /// Removable storage is not inserted
    MediaAbsent,
    /// The image stream ended before the frame was complete
    ///
    /// The rest of the frame is skipped and no refresh is triggered.
    ShortRead {
        /// Bytes required for the scanline
        expected: usize,
        /// Bytes actually read
        received: usize,
    },
    /// Storage I/O error
    Io(ErrorKind),
    /// No file on the storage qualifies as an image
    NoEligibleAsset,
}

impl<I: DisplayInterface> core::fmt::Display for Error<I> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Interface(_) => write!(f, "Interface error"),
            Self::NotInitialized => write!(f, "Display not initialized"),
            Self::HardwareTimeout => write!(f, "Timeout waiting for display to become ready"),
            Self::InvalidColor(index) => write!(f, "Invalid color index: {index}"),
            Self::InvalidBitmap { width, height, len } => {
                write!(f, "Invalid bitmap: {width}x{height} with {len} bytes")
            }
            Self::MediaAbsent => write!(f, "Storage media not present"),
            Self::ShortRead { expected, received } => {
                write!(
                    f,
                    "Short read: expected {expected} bytes, received {received}"
                )
            }
            Self::Io(kind) => write!(f, "Storage I/O error: {kind:?}"),
            Self::NoEligibleAsset => write!(f, "No eligible image file found"),
        }
    }
}

impl<I: DisplayInterface + core::fmt::Debug> core::error::Error for Error<I> {}

impl<I: DisplayInterface> From<SourceError> for Error<I> {
    fn from(error: SourceError) -> Self {
        match error {
            SourceError::ShortRead { expected, received } => Self::ShortRead { expected, received },
            SourceError::Io(kind) => Self::Io(kind),
        }
    }
}

impl<I: DisplayInterface> From<CatalogError> for Error<I> {
    fn from(error: CatalogError) -> Self {
        match error {
            CatalogError::MediaAbsent => Self::MediaAbsent,
            CatalogError::NoEligibleAsset => Self::NoEligibleAsset,
            CatalogError::Io(kind) => Self::Io(kind),
        }
    }
}

/// Errors produced by a [`ScanlineSource`](crate::source::ScanlineSource)
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SourceError {
    /// Fewer bytes were available than one scanline needs
    ShortRead {
        /// Bytes required for the scanline
        expected: usize,
        /// Bytes actually read
        received: usize,
    },
    /// The underlying reader failed
    Io(ErrorKind),
}

impl core::fmt::Display for SourceError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::ShortRead { expected, received } => {
                write!(
                    f,
                    "Short read: expected {expected} bytes, received {received}"
                )
            }
            Self::Io(kind) => write!(f, "I/O error: {kind:?}"),
        }
    }
}

impl core::error::Error for SourceError {}

/// Errors produced by the [`ImageCatalog`](crate::catalog::ImageCatalog)
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CatalogError {
    /// Removable storage is not inserted
    MediaAbsent,
    /// No directory entry qualifies as an image
    NoEligibleAsset,
    /// Directory listing failed
    Io(ErrorKind),
}

impl core::fmt::Display for CatalogError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::MediaAbsent => write!(f, "Storage media not present"),
            Self::NoEligibleAsset => write!(f, "No eligible image file found"),
            Self::Io(kind) => write!(f, "I/O error: {kind:?}"),
        }
    }
}

impl core::error::Error for CatalogError {}

/// Errors that can occur when building configuration
///
/// These errors occur before the display or glyph table is created.
#[derive(Debug, PartialEq, Eq)]
pub enum BuilderError {
    /// Dimensions were not specified
    ///
    /// [`Builder::dimensions()`](crate::config::Builder::dimensions) must be called before building.
    MissingDimensions,
    /// Invalid dimensions provided
    ///
    /// See [`Dimensions::new()`](crate::config::Dimensions::new) for constraints.
    InvalidDimensions {
        /// Number of rows (height) requested
        rows: u16,
        /// Number of columns (width) requested
        cols: u16,
    },
    /// Glyph geometry is unusable
    ///
    /// Tile width must be a non-zero multiple of 4 and the kanji offset must
    /// lie inside the digit height.
    InvalidGlyphGeometry,
    /// Buffer is smaller than the frame it must hold
    BufferTooSmall {
        /// Required size in bytes
        required: usize,
        /// Provided size in bytes
        provided: usize,
    },
    /// Glyph tile data has the wrong length
    InvalidGlyphTile {
        /// Expected length in bytes
        expected: usize,
        /// Provided length in bytes
        provided: usize,
    },
}

impl core::fmt::Display for BuilderError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::MissingDimensions => write!(f, "Dimensions must be specified"),
            Self::InvalidDimensions { rows, cols } => write!(
                f,
                "Invalid dimensions {rows}x{cols} (max {MAX_ROWS}x{MAX_COLUMNS}, cols must be even)"
            ),
            Self::BufferTooSmall { required, provided } => write!(
                f,
                "Buffer too small: required {required} bytes, provided {provided}"
            ),
            Self::InvalidGlyphGeometry => write!(f, "Invalid glyph geometry"),
            Self::InvalidGlyphTile { expected, provided } => write!(
                f,
                "Invalid glyph tile data: expected {expected} bytes, provided {provided}"
            ),
        }
    }
}

impl core::error::Error for BuilderError {}

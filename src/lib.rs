//! 7-color ACeP e-Paper calendar driver
//!
//! A driver for 5.65" 600x448 ACeP (Advanced Color ePaper) panels that streams
//! pictures scanline by scanline and draws a Japanese date label on top:
//!
//! ```text
//! 2024年 2月29日(木)
//! ```
//!
//! ## Features
//!
//! - `no_std` compatible, no frame buffer required
//! - `embedded-hal` v1.0 support
//! - Pictures from embedded bitmaps, raw image files on an SD card or a color self-test
//! - Date label overlay with weekday-dependent ink
//! - `embedded-graphics` canvas (with `graphics` feature)
//! - Host directory as image storage (with `std` feature)
//! - Boxed readers as image streams (with `alloc` feature, through `embedded-io`)
//!
//! ## Usage
//!
//! ```rust,no_run
//! use core::convert::Infallible;
//! use embedded_hal::delay::DelayNs;
//! use embedded_hal::digital::{InputPin, OutputPin};
//! use embedded_hal::spi::SpiBus;
//! use acep_calendar::{
//!     Config, Controller, Date, Display, GlyphGeometry, GlyphTable, Interface,
//! };
//!
//! # struct MockSpi;
//! # impl embedded_hal::spi::ErrorType for MockSpi { type Error = Infallible; }
//! # impl SpiBus for MockSpi {
//! #     fn read(&mut self, _words: &mut [u8]) -> Result<(), Self::Error> { Ok(()) }
//! #     fn write(&mut self, _words: &[u8]) -> Result<(), Self::Error> { Ok(()) }
//! #     fn transfer(&mut self, _read: &mut [u8], _write: &[u8]) -> Result<(), Self::Error> { Ok(()) }
//! #     fn transfer_in_place(&mut self, _words: &mut [u8]) -> Result<(), Self::Error> { Ok(()) }
//! #     fn flush(&mut self) -> Result<(), Self::Error> { Ok(()) }
//! # }
//! # struct MockPin;
//! # impl embedded_hal::digital::ErrorType for MockPin { type Error = Infallible; }
//! # impl OutputPin for MockPin {
//! #     fn set_low(&mut self) -> Result<(), Self::Error> { Ok(()) }
//! #     fn set_high(&mut self) -> Result<(), Self::Error> { Ok(()) }
//! # }
//! # impl InputPin for MockPin {
//! #     fn is_high(&mut self) -> Result<bool, Self::Error> { Ok(true) }
//! #     fn is_low(&mut self) -> Result<bool, Self::Error> { Ok(false) }
//! # }
//! # struct MockDelay;
//! # impl DelayNs for MockDelay { fn delay_ns(&mut self, _ns: u32) {} }
//! # let (spi, cs, dc, rst, busy) = (MockSpi, MockPin, MockPin, MockPin, MockPin);
//! # let mut delay = MockDelay;
//! # static DIGITS: [u8; 3840] = [0; 3840];
//! # static KANJI: [u8; 2560] = [0; 2560];
//! let interface = Interface::new(spi, cs, dc, rst, busy);
//! let display = Display::new(interface, Config::default());
//! let glyphs = match GlyphTable::from_tiles(GlyphGeometry::STANDARD, &DIGITS, &KANJI, &[]) {
//!     Ok(glyphs) => glyphs,
//!     Err(_) => return,
//! };
//!
//! let mut calendar = Controller::new(display, glyphs);
//! if calendar.initialize(&mut delay).is_err() {
//!     return;
//! }
//! calendar.set_date(Date::new(2024, 2, 29));
//! let _ = calendar.show_test_pattern(true, &mut delay);
//! let _ = calendar.finish(&mut delay);
//! ```

#![no_std]

#[cfg(test)]
extern crate alloc;

#[cfg(feature = "std")]
extern crate std;

/// Image lookup on removable storage
pub mod catalog;
/// Color palette for 7-color panels
pub mod color;
/// ACeP command definitions
pub mod command;
/// Display configuration types and builder
pub mod config;
/// Calendar controller and request dispatch
pub mod controller;
/// Date label composition
pub mod date;
/// Core display operations
pub mod display;
/// Error types for the driver
pub mod error;
/// Glyph tiles and label overlay
pub mod glyph;
/// Hardware interface abstraction
pub mod interface;
/// Scanline sources
pub mod source;

/// Graphics support via embedded-graphics (requires `graphics` feature)
#[cfg(feature = "graphics")]
pub mod graphics;

pub use catalog::{DirEntry, ImageCatalog, ImagePath, Lookup, Volume};
pub use color::Color;
pub use config::{Builder, Config, Dimensions, MAX_COLUMNS, MAX_ROWS, Timing};
pub use controller::{Clock, Controller, Request, Response};
pub use date::{Date, DateLabel, LABEL_LEN, Letter, Weekday};
pub use display::{DeviceState, Display};
pub use error::{BuilderError, CatalogError, Error, SourceError};
pub use glyph::{GlyphGeometry, GlyphTable};
pub use interface::{BusyState, DisplayInterface, Interface, InterfaceError, Poll};
pub use source::{Bitmap, ColorBands, ScanlineSource, Solid, Stream, Tiled};

#[cfg(feature = "graphics")]
pub use graphics::Canvas;

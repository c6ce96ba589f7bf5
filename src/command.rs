//! ACeP panel command definitions
//!
//! Command bytes understood by the controller of 7-color 5.65" ACeP panels.
//! Commands are sent over SPI with the DC pin low; their parameters follow with
//! the DC pin high.
//!
//! ## Frame Structure
//!
//! A full picture update is:
//! 1. [`RESOLUTION`] with the panel geometry
//! 2. [`DATA_START_TRANSMISSION`] followed by `cols / 2 * rows` pixel bytes
//! 3. [`POWER_ON`], wait for BUSY to report ready
//! 4. [`DISPLAY_REFRESH`], wait for BUSY to report ready
//! 5. [`POWER_OFF`], wait for BUSY to drop
//!
//! ## Example
//!
//! ```rust,no_run
//! use acep_calendar::{command, DisplayInterface, Interface};
//! # use core::convert::Infallible;
//! # use embedded_hal::digital::{InputPin, OutputPin};
//! # use embedded_hal::spi::SpiBus;
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
//! /// Put the panel to sleep, deselecting it even when a write fails
//! fn deep_sleep<I: DisplayInterface>(interface: &mut I) -> Result<(), I::Error> {
//!     interface.begin_transaction()?;
//!     let sent = interface
//!         .send_command(command::DEEP_SLEEP)
//!         .and_then(|()| interface.send_data(&[command::DEEP_SLEEP_CHECK_CODE]));
//!     let end = interface.end_transaction();
//!     sent.and(end)
//! }
//!
//! # let mut interface = Interface::new(MockSpi, MockPin, MockPin, MockPin, MockPin);
//! deep_sleep(&mut interface)?;
//! # Ok::<(), acep_calendar::InterfaceError<Infallible, Infallible>>(())
//! ```

// Power and timing setup

/// Panel setting (0x00)
///
/// Resolution select, gate/source scan direction, booster switch.
/// Requires 2 bytes.
pub const PANEL_SETTING: u8 = 0x00;

/// Power setting (0x01)
///
/// Internal/external power selection and VGH/VGL/VDH/VDL levels.
/// Requires 4 bytes.
pub const POWER_SETTING: u8 = 0x01;

/// Power off (0x02)
///
/// Turns the charge pumps off at the end of a refresh. BUSY drops once the
/// panel has finished.
pub const POWER_OFF: u8 = 0x02;

/// Power off sequence setting (0x03)
///
/// Requires 1 byte.
pub const POWER_OFF_SEQUENCE: u8 = 0x03;

/// Power on (0x04)
///
/// Starts the charge pumps and converts the frame RAM for refresh.
/// BUSY reports ready once conversion has completed.
pub const POWER_ON: u8 = 0x04;

/// Booster soft start (0x06)
///
/// Requires 3 bytes.
pub const BOOSTER_SOFT_START: u8 = 0x06;

/// Deep sleep (0x07)
///
/// Requires the check code [`DEEP_SLEEP_CHECK_CODE`]. Only a hardware reset
/// wakes the controller.
pub const DEEP_SLEEP: u8 = 0x07;

/// Check code that must follow [`DEEP_SLEEP`]
pub const DEEP_SLEEP_CHECK_CODE: u8 = 0xA5;

// Frame RAM

/// Data start transmission (0x10)
///
/// Followed by `cols / 2 * rows` bytes of packed pixel data.
pub const DATA_START_TRANSMISSION: u8 = 0x10;

/// Display refresh (0x12)
///
/// Drives the waveform for the converted frame. Takes several seconds on
/// 7-color panels.
pub const DISPLAY_REFRESH: u8 = 0x12;

// Timing and geometry

/// PLL control (0x30)
///
/// Frame rate selection. Requires 1 byte.
pub const PLL_CONTROL: u8 = 0x30;

/// Temperature sensor selection (0x40)
///
/// Requires 1 byte.
pub const TEMPERATURE_SENSOR: u8 = 0x40;

/// VCOM and data interval setting (0x50)
///
/// Border color and data/VCOM interval. Requires 1 byte.
pub const VCOM_DATA_INTERVAL: u8 = 0x50;

/// TCON setting (0x60)
///
/// Gate/source non-overlap period. Requires 1 byte.
pub const TCON_SETTING: u8 = 0x60;

/// Resolution setting (0x61)
///
/// Requires 4 bytes: [cols MSB, cols LSB, rows MSB, rows LSB]
pub const RESOLUTION: u8 = 0x61;

/// Power saving (0xE3)
///
/// Requires 1 byte.
pub const POWER_SAVING: u8 = 0xE3;

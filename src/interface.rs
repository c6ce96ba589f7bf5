//! Hardware interface abstraction
//!
//! This module provides the [`DisplayInterface`] trait and the [`Interface`] struct
//! for communicating with an ACeP panel over SPI.
//!
//! ## Hardware Requirements
//!
//! The panel requires:
//! - SPI bus (MOSI + SCK)
//! - 4 GPIO pins:
//!   - **CS**: Chip select (output, active low)
//!   - **DC**: Data/Command select (output)
//!   - **RST**: Reset (output, active low)
//!   - **BUSY**: Busy status (input, high when ready)
//!
//! Chip select is driven by hand rather than through `SpiDevice` so that a whole
//! frame can be streamed inside one selected transaction. Boards that share the
//! bus with an SD card must keep the two chip selects exclusive: end the panel
//! transaction before touching the card.
//!
//! ## Example
//!
//! ```rust,no_run
//! use embedded_hal::delay::DelayNs;
//! use embedded_hal::digital::{InputPin, OutputPin};
//! use embedded_hal::spi::SpiBus;
//! use acep_calendar::{BusyState, DisplayInterface, Interface, Poll};
//! # use core::convert::Infallible;
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
//! # let mut delay = MockDelay;
//! // Create interface with SPI and GPIO pins
//! let mut interface = Interface::new(MockSpi, MockPin, MockPin, MockPin, MockPin);
//!
//! // Send a command with parameters
//! interface.begin_transaction()?;
//! interface.send_command(0x50)?;
//! interface.send_data(&[0x37])?;
//! interface.end_transaction()?;
//!
//! // Wait up to five seconds for the panel to report ready
//! let ready = interface.wait_for(&mut delay, BusyState::Ready, Poll::bounded(50, 100))?;
//! assert!(ready);
//! # Ok::<(), acep_calendar::InterfaceError<Infallible, Infallible>>(())
//! ```

use core::fmt::Debug;
use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{InputPin, OutputPin};
use embedded_hal::spi::SpiBus;

type InterfaceResult<T, E> = core::result::Result<T, E>;

/// Level reported by the BUSY line
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BusyState {
    /// Panel accepts the next protocol phase
    Ready,
    /// Panel is processing
    Busy,
}

/// Busy-line polling policy
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Poll {
    /// Sleep between two reads of the BUSY line, in milliseconds
    pub interval_ms: u32,
    /// Maximum number of sleeps, `None` for no limit
    pub limit: Option<u32>,
}

impl Poll {
    /// Poll until the target level is seen, however long it takes
    pub const fn unbounded(interval_ms: u32) -> Self {
        Self {
            interval_ms,
            limit: None,
        }
    }

    /// Poll at most `limit` times
    pub const fn bounded(interval_ms: u32, limit: u32) -> Self {
        Self {
            interval_ms,
            limit: Some(limit),
        }
    }
}

/// Trait for hardware interface to an ACeP panel
///
/// This trait abstracts over different hardware implementations,
/// allowing the [`Display`](crate::display::Display) to work with any
/// SPI + GPIO implementation that satisfies embedded-hal traits.
///
/// ## Implementing
///
/// For most cases, use the provided [`Interface`] struct. If you need
/// custom behavior (e.g., a chip select shared through a bus manager),
/// implement this trait on your own type.
pub trait DisplayInterface {
    /// Error type for interface operations
    ///
    /// Must implement [`Debug`] for error reporting.
    type Error: Debug;

    /// Select the panel (CS low)
    fn begin_transaction(&mut self) -> InterfaceResult<(), Self::Error>;

    /// Flush pending bytes and deselect the panel (CS high)
    fn end_transaction(&mut self) -> InterfaceResult<(), Self::Error>;

    /// Send a command byte to the controller
    ///
    /// The implementation must:
    /// 1. Set DC pin low (command mode)
    /// 2. Send the command byte over SPI
    ///
    /// Must be called inside a transaction.
    fn send_command(&mut self, command: u8) -> InterfaceResult<(), Self::Error>;

    /// Send data bytes to the controller
    ///
    /// The implementation must:
    /// 1. Set DC pin high (data mode)
    /// 2. Send the data bytes over SPI
    ///
    /// Must be called inside a transaction.
    fn send_data(&mut self, data: &[u8]) -> InterfaceResult<(), Self::Error>;

    /// Perform hardware reset
    ///
    /// The implementation must:
    /// 1. Set RST pin low
    /// 2. Wait `low_ms`
    /// 3. Set RST pin high
    /// 4. Wait `high_ms`
    fn reset<D: DelayNs>(
        &mut self,
        delay: &mut D,
        low_ms: u32,
        high_ms: u32,
    ) -> InterfaceResult<(), Self::Error>;

    /// Drive RST low and keep it there
    fn hold_reset(&mut self) -> InterfaceResult<(), Self::Error>;

    /// Read the BUSY line once
    fn busy_state(&mut self) -> InterfaceResult<BusyState, Self::Error>;

    /// Poll the BUSY line until it reports `target`
    ///
    /// Sleeps `poll.interval_ms` between reads. Returns `Ok(false)` when
    /// `poll.limit` sleeps have passed without seeing `target`.
    fn wait_for<D: DelayNs>(
        &mut self,
        delay: &mut D,
        target: BusyState,
        poll: Poll,
    ) -> InterfaceResult<bool, Self::Error> {
        let mut iterations = 0u32;
        loop {
            if self.busy_state()? == target {
                return Ok(true);
            }
            if poll.limit.is_some_and(|limit| iterations >= limit) {
                return Ok(false);
            }
            delay.delay_ms(poll.interval_ms);
            iterations = iterations.saturating_add(1);
        }
    }
}

/// Errors that can occur at the interface level
///
/// Generic over SPI and GPIO error types.
#[derive(Debug)]
pub enum InterfaceError<SpiErr, PinErr> {
    /// SPI communication error
    Spi(SpiErr),
    /// GPIO pin error
    Pin(PinErr),
}

impl<SpiErr: Debug, PinErr: Debug> core::fmt::Display for InterfaceError<SpiErr, PinErr> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Spi(e) => write!(f, "SPI error: {e:?}"),
            Self::Pin(e) => write!(f, "Pin error: {e:?}"),
        }
    }
}

impl<SpiErr: Debug, PinErr: Debug> core::error::Error for InterfaceError<SpiErr, PinErr> {}

/// Hardware interface implementation for ACeP panels
///
/// Implements [`DisplayInterface`] for embedded-hal v1.0 SPI and GPIO traits.
///
/// ## Type Parameters
///
/// * `SPI` - SPI bus implementing [`SpiBus`]
/// * `CS` - Chip select pin implementing [`OutputPin`]
/// * `DC` - Data/Command pin implementing [`OutputPin`]
/// * `RST` - Reset pin implementing [`OutputPin`]
/// * `BUSY` - Busy pin implementing [`InputPin`]
pub struct Interface<SPI, CS, DC, RST, BUSY> {
    /// SPI bus for communication
    spi: SPI,
    /// Chip select pin (active low)
    cs: CS,
    /// Data/Command select pin (low=command, high=data)
    dc: DC,
    /// Reset pin (active low)
    rst: RST,
    /// Busy pin
    busy: BUSY,
    /// Busy pin polarity (true = high means ready)
    ready_high: bool,
}

impl<SPI, CS, DC, RST, BUSY> Interface<SPI, CS, DC, RST, BUSY>
where
    SPI: SpiBus,
    CS: OutputPin,
    DC: OutputPin,
    RST: OutputPin,
    BUSY: InputPin,
{
    /// Create a new Interface
    ///
    /// # Arguments
    ///
    /// * `spi` - SPI bus (must implement [`SpiBus`]), mode 0, MSB first
    /// * `cs` - Chip select pin (output, active low)
    /// * `dc` - Data/Command pin (output, low=command, high=data)
    /// * `rst` - Reset pin (output, active low)
    /// * `busy` - Busy pin (input, high when ready)
    pub fn new(spi: SPI, cs: CS, dc: DC, rst: RST, busy: BUSY) -> Self {
        Self {
            spi,
            cs,
            dc,
            rst,
            busy,
            ready_high: true,
        }
    }

    /// Set busy pin polarity
    ///
    /// Default is high-means-ready. Set to false for boards that invert BUSY.
    pub fn set_busy_ready_high(&mut self, ready_high: bool) -> &mut Self {
        self.ready_high = ready_high;
        self
    }

    /// Get busy pin polarity (true = high means ready)
    pub fn busy_ready_high(&self) -> bool {
        self.ready_high
    }

    /// Release the bus and pins
    pub fn release(self) -> (SPI, CS, DC, RST, BUSY) {
        (self.spi, self.cs, self.dc, self.rst, self.busy)
    }
}

impl<SPI, CS, DC, RST, BUSY, PinErr> DisplayInterface for Interface<SPI, CS, DC, RST, BUSY>
where
    SPI: SpiBus,
    SPI::Error: Debug,
    CS: OutputPin<Error = PinErr>,
    DC: OutputPin<Error = PinErr>,
    RST: OutputPin<Error = PinErr>,
    BUSY: InputPin<Error = PinErr>,
    PinErr: Debug,
{
    type Error = InterfaceError<SPI::Error, PinErr>;

    fn begin_transaction(&mut self) -> InterfaceResult<(), Self::Error> {
        self.cs.set_low().map_err(InterfaceError::Pin)
    }

    fn end_transaction(&mut self) -> InterfaceResult<(), Self::Error> {
        let flushed = self.spi.flush().map_err(InterfaceError::Spi);
        self.cs.set_high().map_err(InterfaceError::Pin)?;
        flushed
    }

    fn send_command(&mut self, command: u8) -> InterfaceResult<(), Self::Error> {
        self.dc.set_low().map_err(InterfaceError::Pin)?;
        self.spi.write(&[command]).map_err(InterfaceError::Spi)?;
        Ok(())
    }

    fn send_data(&mut self, data: &[u8]) -> InterfaceResult<(), Self::Error> {
        self.dc.set_high().map_err(InterfaceError::Pin)?;
        self.spi.write(data).map_err(InterfaceError::Spi)?;
        Ok(())
    }

    fn reset<D: DelayNs>(
        &mut self,
        delay: &mut D,
        low_ms: u32,
        high_ms: u32,
    ) -> InterfaceResult<(), Self::Error> {
        // Keep the panel deselected while it comes out of reset
        self.cs.set_high().map_err(InterfaceError::Pin)?;
        self.rst.set_low().map_err(InterfaceError::Pin)?;
        delay.delay_ms(low_ms);
        self.rst.set_high().map_err(InterfaceError::Pin)?;
        delay.delay_ms(high_ms);
        Ok(())
    }

    fn hold_reset(&mut self) -> InterfaceResult<(), Self::Error> {
        self.rst.set_low().map_err(InterfaceError::Pin)
    }

    fn busy_state(&mut self) -> InterfaceResult<BusyState, Self::Error> {
        let high = self.busy.is_high().map_err(InterfaceError::Pin)?;
        Ok(if high == self.ready_high {
            BusyState::Ready
        } else {
            BusyState::Busy
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::cell::Cell;
    use core::convert::Infallible;
    use embedded_hal::spi::ErrorKind as SpiErrorKind;

    struct ScriptedBusy<'a> {
        /// Number of reads that report busy before switching to ready
        busy_reads: &'a Cell<u32>,
    }

    impl DisplayInterface for ScriptedBusy<'_> {
        type Error = Infallible;

        fn begin_transaction(&mut self) -> Result<(), Self::Error> {
            Ok(())
        }
        fn end_transaction(&mut self) -> Result<(), Self::Error> {
            Ok(())
        }
        fn send_command(&mut self, _command: u8) -> Result<(), Self::Error> {
            Ok(())
        }
        fn send_data(&mut self, _data: &[u8]) -> Result<(), Self::Error> {
            Ok(())
        }
        fn reset<D: DelayNs>(&mut self, _: &mut D, _: u32, _: u32) -> Result<(), Self::Error> {
            Ok(())
        }
        fn hold_reset(&mut self) -> Result<(), Self::Error> {
            Ok(())
        }
        fn busy_state(&mut self) -> Result<BusyState, Self::Error> {
            let remaining = self.busy_reads.get();
            if remaining == 0 {
                Ok(BusyState::Ready)
            } else {
                self.busy_reads.set(remaining - 1);
                Ok(BusyState::Busy)
            }
        }
    }

    #[derive(Default)]
    struct ClockDelay {
        elapsed_ms: u32,
    }

    impl DelayNs for ClockDelay {
        fn delay_ns(&mut self, ns: u32) {
            self.elapsed_ms += ns / 1_000_000;
        }

        fn delay_ms(&mut self, ms: u32) {
            self.elapsed_ms += ms;
        }
    }

    #[test]
    fn test_wait_for_returns_once_target_is_seen() {
        let busy_reads = Cell::new(3);
        let mut interface = ScriptedBusy {
            busy_reads: &busy_reads,
        };
        let mut delay = ClockDelay::default();
        let reached = interface
            .wait_for(&mut delay, BusyState::Ready, Poll::unbounded(50))
            .unwrap();
        assert!(reached);
        assert_eq!(delay.elapsed_ms, 150);
    }

    #[test]
    fn test_wait_for_gives_up_at_limit() {
        let busy_reads = Cell::new(u32::MAX);
        let mut interface = ScriptedBusy {
            busy_reads: &busy_reads,
        };
        let mut delay = ClockDelay::default();
        let reached = interface
            .wait_for(&mut delay, BusyState::Ready, Poll::bounded(50, 100))
            .unwrap();
        assert!(!reached);
        assert_eq!(delay.elapsed_ms, 5_000);
    }

    #[test]
    fn test_wait_for_busy_target() {
        let busy_reads = Cell::new(0);
        let mut interface = ScriptedBusy {
            busy_reads: &busy_reads,
        };
        let mut delay = ClockDelay::default();
        let reached = interface
            .wait_for(&mut delay, BusyState::Busy, Poll::bounded(10, 2))
            .unwrap();
        assert!(!reached);
        assert_eq!(delay.elapsed_ms, 20);
    }

    /// SPI bus whose flush always fails
    struct FailingFlush;

    impl embedded_hal::spi::ErrorType for FailingFlush {
        type Error = SpiErrorKind;
    }

    impl SpiBus for FailingFlush {
        fn read(&mut self, _words: &mut [u8]) -> Result<(), Self::Error> {
            Ok(())
        }
        fn write(&mut self, _words: &[u8]) -> Result<(), Self::Error> {
            Ok(())
        }
        fn transfer(&mut self, _read: &mut [u8], _write: &[u8]) -> Result<(), Self::Error> {
            Ok(())
        }
        fn transfer_in_place(&mut self, _words: &mut [u8]) -> Result<(), Self::Error> {
            Ok(())
        }
        fn flush(&mut self) -> Result<(), Self::Error> {
            Err(SpiErrorKind::Other)
        }
    }

    /// Pin that mirrors its level into a shared cell
    struct LevelPin<'a>(&'a Cell<bool>);

    impl embedded_hal::digital::ErrorType for LevelPin<'_> {
        type Error = Infallible;
    }

    impl OutputPin for LevelPin<'_> {
        fn set_low(&mut self) -> Result<(), Self::Error> {
            self.0.set(false);
            Ok(())
        }
        fn set_high(&mut self) -> Result<(), Self::Error> {
            self.0.set(true);
            Ok(())
        }
    }

    impl InputPin for LevelPin<'_> {
        fn is_high(&mut self) -> Result<bool, Self::Error> {
            Ok(self.0.get())
        }
        fn is_low(&mut self) -> Result<bool, Self::Error> {
            Ok(!self.0.get())
        }
    }

    #[test]
    fn test_end_transaction_deselects_when_flush_fails() {
        let cs = Cell::new(true);
        let other = Cell::new(true);
        let mut interface = Interface::new(
            FailingFlush,
            LevelPin(&cs),
            LevelPin(&other),
            LevelPin(&other),
            LevelPin(&other),
        );

        interface.begin_transaction().unwrap();
        assert!(!cs.get());
        let result = interface.end_transaction();
        assert!(matches!(result, Err(InterfaceError::Spi(SpiErrorKind::Other))));
        assert!(cs.get());
    }
}

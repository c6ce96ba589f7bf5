//! Core display operations
//!
//! [`Display`] owns the panel protocol: the reset and initialization sequence,
//! streaming a frame, and the refresh handshake on the BUSY line.
//!
//! ```text
//! Uninitialized --initialize--> Resetting --> AwaitingReady --> Ready
//!                                                  |
//!                                                  +--timeout--> Failed
//! Ready / Failed --finish--> Uninitialized
//! ```
//!
//! Every picture operation needs the `Ready` state.

use embedded_hal::delay::DelayNs;
use log::{debug, info, warn};

use crate::color::Color;
use crate::command::{
    BOOSTER_SOFT_START, DATA_START_TRANSMISSION, DEEP_SLEEP, DEEP_SLEEP_CHECK_CODE,
    DISPLAY_REFRESH, PANEL_SETTING, PLL_CONTROL, POWER_OFF, POWER_OFF_SEQUENCE, POWER_ON,
    POWER_SAVING, POWER_SETTING, RESOLUTION, TCON_SETTING, TEMPERATURE_SENSOR,
    VCOM_DATA_INTERVAL,
};
use crate::config::{Config, Dimensions};
use crate::error::{Error, MAX_COLUMNS};
use crate::interface::{BusyState, DisplayInterface, Poll};
use crate::source::{ScanlineSource, Solid};

type DisplayResult<I> = core::result::Result<(), Error<I>>;

/// Largest scanline the driver buffers, in bytes
pub const MAX_SCANLINE_LEN: usize = MAX_COLUMNS as usize / 2;

/// Lifecycle of the panel
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DeviceState {
    /// Not reset, or put to sleep by `finish`
    #[default]
    Uninitialized,
    /// Reset line is being toggled
    Resetting,
    /// Waiting for BUSY to report ready after reset
    AwaitingReady,
    /// Initialized; picture operations are allowed
    Ready,
    /// BUSY never reported ready after reset
    Failed,
}

/// Core display driver for 7-color ACeP panels
///
/// Not reentrant: every operation takes `&mut self` and blocks until the
/// panel has finished.
pub struct Display<I>
where
    I: DisplayInterface,
{
    /// Hardware interface
    interface: I,
    /// Display configuration
    config: Config,
    /// Protocol state
    state: DeviceState,
}

impl<I> Display<I>
where
    I: DisplayInterface,
{
    /// Create a new Display instance
    pub fn new(interface: I, config: Config) -> Self {
        Self {
            interface,
            config,
            state: DeviceState::Uninitialized,
        }
    }

    /// Reset the panel and send the initialization sequence
    ///
    /// Calling this on a display that is already `Ready` resets and
    /// initializes it again.
    ///
    /// # Errors
    ///
    /// Returns [`Error::HardwareTimeout`] if BUSY does not report ready within
    /// `timing.ready_poll_limit` polls. The display is then `Failed` and needs
    /// another `initialize`.
    pub fn initialize<D: DelayNs>(&mut self, delay: &mut D) -> DisplayResult<I> {
        let timing = self.config.timing;

        debug!("acep: reset");
        self.state = DeviceState::Resetting;
        if let Err(e) =
            self.interface
                .reset(delay, timing.short_settle_ms, timing.long_settle_ms)
        {
            self.state = DeviceState::Failed;
            return Err(Error::Interface(e));
        }

        self.state = DeviceState::AwaitingReady;
        let poll = Poll::bounded(timing.poll_interval_ms, timing.ready_poll_limit);
        match self.interface.wait_for(delay, BusyState::Ready, poll) {
            Ok(true) => {}
            Ok(false) => {
                warn!("acep: panel not ready after reset");
                self.state = DeviceState::Failed;
                return Err(Error::HardwareTimeout);
            }
            Err(e) => {
                self.state = DeviceState::Failed;
                return Err(Error::Interface(e));
            }
        }

        debug!("acep: init sequence");
        if let Err(e) = self.init(delay) {
            self.state = DeviceState::Failed;
            return Err(e);
        }
        self.state = DeviceState::Ready;
        info!("acep: initialized");
        Ok(())
    }

    /// Send the vendor power, timing and geometry setup
    fn init<D: DelayNs>(&mut self, delay: &mut D) -> DisplayResult<I> {
        let config = self.config.clone();

        self.transaction(|i| {
            i.send_command(PANEL_SETTING)?;
            i.send_data(&config.panel_setting)?;
            i.send_command(POWER_SETTING)?;
            i.send_data(&config.power_setting)?;
            i.send_command(POWER_OFF_SEQUENCE)?;
            i.send_data(&[config.power_off_sequence])?;
            i.send_command(BOOSTER_SOFT_START)?;
            i.send_data(&config.booster_soft_start)?;
            i.send_command(PLL_CONTROL)?;
            i.send_data(&[config.pll])?;
            i.send_command(TEMPERATURE_SENSOR)?;
            i.send_data(&[config.temperature_sensor])?;
            i.send_command(VCOM_DATA_INTERVAL)?;
            i.send_data(&[config.vcom_data_interval])?;
            i.send_command(TCON_SETTING)?;
            i.send_data(&[config.tcon])?;
            i.send_command(RESOLUTION)?;
            i.send_data(&config.dimensions.resolution_bytes())?;
            i.send_command(POWER_SAVING)?;
            i.send_data(&[config.power_saving])
        })?;

        delay.delay_ms(config.timing.short_settle_ms);

        // The panel drops the VCOM/data interval on power saving setup
        self.transaction(|i| {
            i.send_command(VCOM_DATA_INTERVAL)?;
            i.send_data(&[config.vcom_data_interval])
        })
    }

    /// Fill the whole panel with one color
    pub fn clear<D: DelayNs>(&mut self, color: Color, delay: &mut D) -> DisplayResult<I> {
        self.draw(&mut Solid(color), |_, _| {}, delay)
    }

    /// Stream a frame from `source` and refresh the panel
    ///
    /// `decorate` is called with each row index and scanline before the
    /// scanline is sent, so overlays can be merged in.
    ///
    /// # Errors
    ///
    /// A source error aborts the remaining scanlines and skips the refresh;
    /// the panel keeps showing its previous picture.
    pub fn draw<S, F, D>(
        &mut self,
        source: &mut S,
        mut decorate: F,
        delay: &mut D,
    ) -> DisplayResult<I>
    where
        S: ScanlineSource + ?Sized,
        F: FnMut(u16, &mut [u8]),
        D: DelayNs,
    {
        self.ensure_ready()?;
        let Dimensions { rows, .. } = self.config.dimensions;
        let len = self.config.dimensions.scanline_len();
        let mut buffer = [0u8; MAX_SCANLINE_LEN];
        let scanline = &mut buffer[..len];
        let shares_bus = source.shares_bus();

        self.begin_picture()?;
        source.rewind();

        // A source on the panel's bus needs the panel deselected while it reads
        if shares_bus {
            for row in 0..rows {
                Self::next_row(source, &mut decorate, row, scanline)?;
                let line: &[u8] = scanline;
                self.transaction(|i| i.send_data(line))?;
            }
        } else {
            self.framed(|i| {
                for row in 0..rows {
                    Self::next_row(source, &mut decorate, row, scanline)?;
                    i.send_data(scanline).map_err(Error::Interface)?;
                }
                Ok(())
            })?;
        }

        self.refresh(delay)
    }

    /// Put the panel into deep sleep and hold it in reset
    ///
    /// The display returns to `Uninitialized`. The sleep command is only sent
    /// when the display was `Ready`.
    pub fn finish<D: DelayNs>(&mut self, delay: &mut D) -> DisplayResult<I> {
        let short = self.config.timing.short_settle_ms;
        if self.state == DeviceState::Ready {
            debug!("acep: deep sleep");
            delay.delay_ms(short);
            self.transaction(|i| {
                i.send_command(DEEP_SLEEP)?;
                i.send_data(&[DEEP_SLEEP_CHECK_CODE])
            })?;
            delay.delay_ms(short);
        }
        self.state = DeviceState::Uninitialized;
        self.interface.hold_reset().map_err(Error::Interface)
    }

    /// Set geometry and open the frame RAM for writing
    fn begin_picture(&mut self) -> DisplayResult<I> {
        let resolution = self.config.dimensions.resolution_bytes();
        self.transaction(|i| {
            i.send_command(RESOLUTION)?;
            i.send_data(&resolution)?;
            i.send_command(DATA_START_TRANSMISSION)
        })
    }

    /// Convert, refresh and power off, waiting out each phase
    fn refresh<D: DelayNs>(&mut self, delay: &mut D) -> DisplayResult<I> {
        let timing = self.config.timing;
        let poll = Poll::unbounded(timing.poll_interval_ms);

        debug!("acep: refresh");
        self.framed(|i| {
            i.send_command(POWER_ON).map_err(Error::Interface)?;
            Self::wait_for(i, delay, BusyState::Ready, poll)?;
            i.send_command(DISPLAY_REFRESH).map_err(Error::Interface)?;
            Self::wait_for(i, delay, BusyState::Ready, poll)?;
            i.send_command(POWER_OFF).map_err(Error::Interface)
        })?;

        // BUSY drops once the panel has powered down
        Self::wait_for(&mut self.interface, delay, BusyState::Busy, poll)?;
        delay.delay_ms(timing.long_settle_ms);
        debug!("acep: refresh done");
        Ok(())
    }

    fn ensure_ready(&self) -> DisplayResult<I> {
        if self.state != DeviceState::Ready {
            return Err(Error::NotInitialized);
        }
        Ok(())
    }

    /// Fill the next scanline and let `decorate` draw over it
    fn next_row<S, F>(
        source: &mut S,
        decorate: &mut F,
        row: u16,
        scanline: &mut [u8],
    ) -> DisplayResult<I>
    where
        S: ScanlineSource + ?Sized,
        F: FnMut(u16, &mut [u8]),
    {
        if let Err(e) = source.next_scanline(scanline) {
            warn!("acep: frame aborted at row {}", row);
            return Err(e.into());
        }
        decorate(row, scanline);
        Ok(())
    }

    fn wait_for<D: DelayNs>(
        interface: &mut I,
        delay: &mut D,
        target: BusyState,
        poll: Poll,
    ) -> DisplayResult<I> {
        match interface.wait_for(delay, target, poll) {
            Ok(true) => Ok(()),
            Ok(false) => Err(Error::HardwareTimeout),
            Err(e) => Err(Error::Interface(e)),
        }
    }

    /// Run `f` with the panel selected
    fn transaction<F>(&mut self, f: F) -> DisplayResult<I>
    where
        F: FnOnce(&mut I) -> Result<(), I::Error>,
    {
        self.framed(|i| f(i).map_err(Error::Interface))
    }

    /// Run `f` with the panel selected; the panel is deselected on every exit
    fn framed<F>(&mut self, f: F) -> DisplayResult<I>
    where
        F: FnOnce(&mut I) -> DisplayResult<I>,
    {
        self.begin_transaction()?;
        let result = f(&mut self.interface);
        let end = self.end_transaction();
        result.and(end)
    }

    fn begin_transaction(&mut self) -> DisplayResult<I> {
        self.interface.begin_transaction().map_err(Error::Interface)
    }

    fn end_transaction(&mut self) -> DisplayResult<I> {
        self.interface.end_transaction().map_err(Error::Interface)
    }

    /// Current protocol state
    pub fn state(&self) -> DeviceState {
        self.state
    }

    /// Whether picture operations are allowed
    pub fn is_ready(&self) -> bool {
        self.state == DeviceState::Ready
    }

    /// Get display dimensions
    pub fn dimensions(&self) -> &Dimensions {
        &self.config.dimensions
    }

    /// Access the underlying configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Access the hardware interface
    pub fn interface(&self) -> &I {
        &self.interface
    }

    /// Mutably access the hardware interface
    pub fn interface_mut(&mut self) -> &mut I {
        &mut self.interface
    }

    /// Release the hardware interface
    pub fn release(self) -> I {
        self.interface
    }
}

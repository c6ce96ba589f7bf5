//! Display configuration types and builder

pub use crate::error::{BuilderError, MAX_COLUMNS, MAX_ROWS};

/// Display dimensions
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Dimensions {
    /// Number of rows (height in pixels)
    pub rows: u16,
    /// Number of columns (width in pixels)
    pub cols: u16,
}

impl Dimensions {
    /// Geometry of the 5.65" 7-color ACeP panel (600x448)
    pub const ACEP_5IN65: Self = Self {
        rows: 448,
        cols: 600,
    };

    /// Create new dimensions with validation
    ///
    /// # Errors
    ///
    /// Returns `BuilderError::InvalidDimensions` if:
    /// - rows == 0 or rows > MAX_ROWS
    /// - cols == 0 or cols > MAX_COLUMNS
    /// - cols is odd (two pixels share a byte)
    pub fn new(rows: u16, cols: u16) -> Result<Self, BuilderError> {
        if rows == 0 || rows > MAX_ROWS {
            return Err(BuilderError::InvalidDimensions { rows, cols });
        }
        if cols == 0 || cols > MAX_COLUMNS || cols % 2 != 0 {
            return Err(BuilderError::InvalidDimensions { rows, cols });
        }
        Ok(Self { rows, cols })
    }

    /// Bytes in one packed scanline
    pub fn scanline_len(&self) -> usize {
        self.cols as usize / 2
    }

    /// Bytes in one full frame
    ///
    /// This is also the exact size an image file must have to be displayed.
    pub fn frame_len(&self) -> usize {
        self.scanline_len() * self.rows as usize
    }

    /// Parameter bytes for the resolution command
    pub(crate) fn resolution_bytes(&self) -> [u8; 4] {
        let [cols_hi, cols_lo] = self.cols.to_be_bytes();
        let [rows_hi, rows_lo] = self.rows.to_be_bytes();
        [cols_hi, cols_lo, rows_hi, rows_lo]
    }
}

impl Default for Dimensions {
    fn default() -> Self {
        Self::ACEP_5IN65
    }
}

/// Reset, settle and busy-poll timing
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Timing {
    /// Short settle delay in milliseconds
    pub short_settle_ms: u32,
    /// Long settle delay in milliseconds
    pub long_settle_ms: u32,
    /// Interval between two reads of the BUSY line in milliseconds
    pub poll_interval_ms: u32,
    /// Number of polls allowed for the panel to report ready after reset
    pub ready_poll_limit: u32,
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            short_settle_ms: 50,
            long_settle_ms: 200,
            poll_interval_ms: 50,
            // 100 polls of 50ms: five seconds
            ready_poll_limit: 100,
        }
    }
}

/// Display configuration
///
/// This struct holds the vendor initialization parameters sent to the panel.
/// Use `Builder` to create a Config.
#[derive(Clone, Debug)]
pub struct Config {
    /// Display dimensions
    pub dimensions: Dimensions,
    /// Reset and polling timing
    pub timing: Timing,
    /// Panel setting (2 bytes for command 0x00)
    pub panel_setting: [u8; 2],
    /// Power setting (4 bytes for command 0x01)
    pub power_setting: [u8; 4],
    /// Power off sequence (command 0x03)
    pub power_off_sequence: u8,
    /// Booster soft-start settings (3 bytes for command 0x06)
    pub booster_soft_start: [u8; 3],
    /// PLL control (command 0x30)
    pub pll: u8,
    /// Temperature sensor selection (command 0x40)
    pub temperature_sensor: u8,
    /// VCOM and data interval (command 0x50)
    pub vcom_data_interval: u8,
    /// TCON setting (command 0x60)
    pub tcon: u8,
    /// Power saving (command 0xE3)
    pub power_saving: u8,
}

impl Default for Config {
    fn default() -> Self {
        Builder::new().into_config(Dimensions::default())
    }
}

/// Builder for constructing display configuration
///
/// # Example
///
/// ```rust,no_run
/// use acep_calendar::{Builder, Dimensions};
///
/// let config = match Builder::new().dimensions(Dimensions::ACEP_5IN65).build() {
///     Ok(config) => config,
///     Err(_) => return,
/// };
/// let _ = config;
/// ```
#[must_use]
pub struct Builder {
    /// Display dimensions (required)
    dimensions: Option<Dimensions>,
    timing: Timing,
    panel_setting: [u8; 2],
    power_setting: [u8; 4],
    power_off_sequence: u8,
    booster_soft_start: [u8; 3],
    pll: u8,
    temperature_sensor: u8,
    vcom_data_interval: u8,
    tcon: u8,
    power_saving: u8,
}

impl Default for Builder {
    fn default() -> Self {
        // Vendor values for the 5.65" panel
        Self {
            dimensions: None,
            timing: Timing::default(),
            panel_setting: [0xEF, 0x08],
            power_setting: [0x37, 0x00, 0x23, 0x23],
            power_off_sequence: 0x00,
            booster_soft_start: [0xC7, 0xC7, 0x1D],
            pll: 0x3C,
            temperature_sensor: 0x00,
            vcom_data_interval: 0x37,
            tcon: 0x22,
            power_saving: 0xAA,
        }
    }
}

impl Builder {
    /// Create a new Builder with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set display dimensions (required)
    pub fn dimensions(mut self, dims: Dimensions) -> Self {
        self.dimensions = Some(dims);
        self
    }

    /// Set reset and busy-poll timing
    pub fn timing(mut self, timing: Timing) -> Self {
        self.timing = timing;
        self
    }

    /// Set panel setting parameters
    pub fn panel_setting(mut self, values: [u8; 2]) -> Self {
        self.panel_setting = values;
        self
    }

    /// Set power setting parameters
    pub fn power_setting(mut self, values: [u8; 4]) -> Self {
        self.power_setting = values;
        self
    }

    /// Set power off sequence
    pub fn power_off_sequence(mut self, value: u8) -> Self {
        self.power_off_sequence = value;
        self
    }

    /// Set booster soft-start parameters
    pub fn booster_soft_start(mut self, values: [u8; 3]) -> Self {
        self.booster_soft_start = values;
        self
    }

    /// Set PLL control
    pub fn pll(mut self, value: u8) -> Self {
        self.pll = value;
        self
    }

    /// Set temperature sensor selection
    pub fn temperature_sensor(mut self, value: u8) -> Self {
        self.temperature_sensor = value;
        self
    }

    /// Set VCOM and data interval
    pub fn vcom_data_interval(mut self, value: u8) -> Self {
        self.vcom_data_interval = value;
        self
    }

    /// Set TCON
    pub fn tcon(mut self, value: u8) -> Self {
        self.tcon = value;
        self
    }

    /// Set power saving
    pub fn power_saving(mut self, value: u8) -> Self {
        self.power_saving = value;
        self
    }

    /// Build the configuration
    ///
    /// # Errors
    ///
    /// Returns `BuilderError::MissingDimensions` if dimensions were not set
    pub fn build(self) -> Result<Config, BuilderError> {
        let dimensions = self.dimensions.ok_or(BuilderError::MissingDimensions)?;
        Ok(self.into_config(dimensions))
    }

    fn into_config(self, dimensions: Dimensions) -> Config {
        Config {
            dimensions,
            timing: self.timing,
            panel_setting: self.panel_setting,
            power_setting: self.power_setting,
            power_off_sequence: self.power_off_sequence,
            booster_soft_start: self.booster_soft_start,
            pll: self.pll,
            temperature_sensor: self.temperature_sensor,
            vcom_data_interval: self.vcom_data_interval,
            tcon: self.tcon,
            power_saving: self.power_saving,
        }
    }
}

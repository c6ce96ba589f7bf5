//! Calendar controller
//!
//! [`Controller`] ties the panel driver to a glyph table and the current date
//! label. It provides the picture operations of the calendar: clear, embedded
//! bitmaps, image files from a [`Volume`], the color self-test and the daily
//! update driven by a [`Clock`].
//!
//! The same operations are available as [`Request`] values through
//! [`Controller::execute`], for command shells and schedulers.

use embedded_hal::delay::DelayNs;
use log::{debug, info, warn};

use crate::catalog::{ImageCatalog, Lookup, Volume};
use crate::color::Color;
use crate::date::{Date, DateLabel, Weekday};
use crate::display::{DeviceState, Display};
use crate::error::{CatalogError, Error};
use crate::glyph::{GlyphTable, SHOWCASE_LOWER, SHOWCASE_UPPER};
use crate::interface::DisplayInterface;
use crate::source::{Bitmap, ColorBands, ScanlineSource, Stream, Tiled};

type ControllerResult<T, I> = core::result::Result<T, Error<I>>;

/// Source of the current date and the selected image
///
/// Usually a battery backed real-time clock that also keeps the image index
/// in its spare RAM.
pub trait Clock {
    /// Clock error
    type Error: core::fmt::Debug;

    /// Current date
    fn date(&mut self) -> Result<Date, Self::Error>;

    /// Index of the image to show
    fn image_index(&mut self) -> Result<u8, Self::Error>;
}

/// One controller operation
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Request<'a> {
    /// Reset and initialize the panel
    Initialize,
    /// Set the date rendered by overlays
    SetDate(Date),
    /// Fill the panel with a palette index
    Clear(u8),
    /// Show a packed bitmap, tiled to fill the panel
    ShowBitmap {
        /// Packed pixels, two per byte
        data: &'a [u8],
        /// Width in pixels
        width: u16,
        /// Height in pixels
        height: u16,
        /// Draw the date label on top
        overlay: bool,
    },
    /// Look up the n-th image on the volume
    FindImage(usize),
    /// Show an image file from the volume
    ShowFile {
        /// Path on the volume
        path: &'a str,
        /// Draw the date label on top
        overlay: bool,
    },
    /// Show the seven palette colors, optionally with every glyph
    SelfTest {
        /// Draw the glyph showcase in every band
        overlay: bool,
    },
    /// Put the panel to sleep
    Finish,
}

/// Outcome of a successful [`Request`]
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Response {
    /// The operation completed
    Done,
    /// Result of [`Request::FindImage`]
    Image(Lookup),
}

/// Calendar controller over a panel interface
pub struct Controller<'g, I>
where
    I: DisplayInterface,
{
    display: Display<I>,
    glyphs: GlyphTable<'g>,
    catalog: ImageCatalog,
    label: Option<DateLabel>,
    background: Color,
}

impl<'g, I> Controller<'g, I>
where
    I: DisplayInterface,
{
    /// Create a controller; the panel stays untouched until [`initialize`](Self::initialize)
    pub fn new(display: Display<I>, glyphs: GlyphTable<'g>) -> Self {
        let catalog = ImageCatalog::new(display.dimensions());
        Self {
            display,
            glyphs,
            catalog,
            label: None,
            background: Color::White,
        }
    }

    /// Reset and initialize the panel
    pub fn initialize<D: DelayNs>(&mut self, delay: &mut D) -> ControllerResult<(), I> {
        self.display.initialize(delay)
    }

    /// Set the date drawn by overlays
    ///
    /// The date is not validated.
    pub fn set_date(&mut self, date: Date) {
        let label = DateLabel::compose(date);
        debug!(
            "controller: date {}-{}-{} ({:?})",
            date.year,
            date.month,
            date.day,
            label.weekday()
        );
        self.label = Some(label);
    }

    /// Current date label, if a date was set
    pub fn label(&self) -> Option<&DateLabel> {
        self.label.as_ref()
    }

    /// Color drawn where glyphs use the label background
    pub fn set_background(&mut self, background: Color) {
        self.background = background;
    }

    /// Fill the panel with palette entry `color`
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidColor`] for indices outside the palette without
    /// touching the bus.
    pub fn clear<D: DelayNs>(&mut self, color: u8, delay: &mut D) -> ControllerResult<(), I> {
        let color = Color::try_from(color).map_err(Error::InvalidColor)?;
        self.display.clear(color, delay)?;
        info!("controller: cleared to {:?}", color);
        Ok(())
    }

    /// Show a packed bitmap, tiled across and down the panel
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidBitmap`] if the bitmap is narrower than two
    /// pixels, has no rows or `data` is too short.
    pub fn show_bitmap<D: DelayNs>(
        &mut self,
        data: &[u8],
        width: u16,
        height: u16,
        overlay: bool,
        delay: &mut D,
    ) -> ControllerResult<(), I> {
        let bitmap = Bitmap::new(data, width, height).ok_or(Error::InvalidBitmap {
            width,
            height,
            len: data.len(),
        })?;
        self.draw_with_label(&mut Tiled::new(bitmap), overlay, delay)?;
        info!("controller: bitmap {}x{} shown", width, height);
        Ok(())
    }

    /// Look up the `index`-th image on `volume`
    ///
    /// See [`ImageCatalog::find_nth`] for the wrap-around rule.
    pub fn find_image<V: Volume>(
        &mut self,
        volume: &mut V,
        index: usize,
    ) -> ControllerResult<Lookup, I> {
        self.ensure_ready()?;
        Ok(self.catalog.find_nth(volume, index)?)
    }

    /// Stream the image file at `path` to the panel
    ///
    /// # Errors
    ///
    /// A file shorter than a frame aborts the picture with
    /// [`Error::ShortRead`]; the panel is not refreshed.
    pub fn show_file<V: Volume, D: DelayNs>(
        &mut self,
        volume: &mut V,
        path: &str,
        overlay: bool,
        delay: &mut D,
    ) -> ControllerResult<(), I> {
        self.ensure_ready()?;
        if !volume.is_present() {
            return Err(CatalogError::MediaAbsent.into());
        }
        let file = volume.open(path).map_err(|e| {
            warn!("controller: cannot open {}", path);
            Error::Io(embedded_io::Error::kind(&e))
        })?;
        self.draw_with_label(&mut Stream::new(file), overlay, delay)?;
        info!("controller: {} shown", path);
        Ok(())
    }

    /// Show the seven palette colors as horizontal bands
    ///
    /// With `overlay`, every band shows all glyphs in two lines: the band
    /// color as ink, on black for white and yellow bands and on white
    /// otherwise. The stored date label is left alone.
    pub fn show_test_pattern<D: DelayNs>(
        &mut self,
        overlay: bool,
        delay: &mut D,
    ) -> ControllerResult<(), I> {
        let rows = self.display.dimensions().rows;
        let mut bands = ColorBands::new(rows);
        let layout = bands;
        let glyphs = self.glyphs;
        let upper = DateLabel::from_letters(SHOWCASE_UPPER, Weekday::Sunday);
        let lower = DateLabel::from_letters(SHOWCASE_LOWER, Weekday::Sunday);
        let offset = glyphs.geometry().kanji_offset;

        self.display.draw(
            &mut bands,
            |row, scanline| {
                if !overlay {
                    return;
                }
                let (color, y) = layout.band_at(row);
                let background = color.contrasting();
                // Only the kanji half of the upper line fits above the lower line
                glyphs.overlay(scanline, y.saturating_add(offset), &upper, color, background);
                glyphs.overlay(scanline, y.wrapping_sub(offset), &lower, color, background);
            },
            delay,
        )?;
        info!("controller: test pattern shown");
        Ok(())
    }

    /// Refresh the calendar for the current day
    ///
    /// Reads the date from `clock`, clears the panel to white, then shows the
    /// image selected by the clock's image index with the date on top. When
    /// the clock cannot be read the previous date and the first image are
    /// used.
    pub fn daily_update<C, V, D>(
        &mut self,
        clock: &mut C,
        volume: &mut V,
        delay: &mut D,
    ) -> ControllerResult<Lookup, I>
    where
        C: Clock,
        V: Volume,
        D: DelayNs,
    {
        match clock.date() {
            Ok(date) => self.set_date(date),
            Err(e) => warn!("controller: clock date unavailable: {:?}", e),
        }
        let index = clock.image_index().unwrap_or_else(|e| {
            warn!("controller: clock image index unavailable: {:?}", e);
            0
        });

        self.display.clear(Color::White, delay)?;
        let lookup = self.find_image(volume, usize::from(index))?;
        self.show_file(volume, lookup.path(), true, delay)?;
        Ok(lookup)
    }

    /// Put the panel to sleep and hold it in reset
    pub fn finish<D: DelayNs>(&mut self, delay: &mut D) -> ControllerResult<(), I> {
        self.display.finish(delay)
    }

    /// Run one request
    pub fn execute<V, D>(
        &mut self,
        request: Request<'_>,
        volume: &mut V,
        delay: &mut D,
    ) -> ControllerResult<Response, I>
    where
        V: Volume,
        D: DelayNs,
    {
        match request {
            Request::Initialize => self.initialize(delay)?,
            Request::SetDate(date) => self.set_date(date),
            Request::Clear(color) => self.clear(color, delay)?,
            Request::ShowBitmap {
                data,
                width,
                height,
                overlay,
            } => self.show_bitmap(data, width, height, overlay, delay)?,
            Request::FindImage(index) => {
                return Ok(Response::Image(self.find_image(volume, index)?));
            }
            Request::ShowFile { path, overlay } => self.show_file(volume, path, overlay, delay)?,
            Request::SelfTest { overlay } => self.show_test_pattern(overlay, delay)?,
            Request::Finish => self.finish(delay)?,
        }
        Ok(Response::Done)
    }

    /// Panel protocol state
    pub fn state(&self) -> DeviceState {
        self.display.state()
    }

    /// Access the panel driver
    pub fn display(&self) -> &Display<I> {
        &self.display
    }

    /// Release the panel driver
    pub fn release(self) -> Display<I> {
        self.display
    }

    fn ensure_ready(&self) -> ControllerResult<(), I> {
        if !self.display.is_ready() {
            return Err(Error::NotInitialized);
        }
        Ok(())
    }

    /// Draw `source`, merging the date label into the top rows
    fn draw_with_label<S, D>(
        &mut self,
        source: &mut S,
        overlay: bool,
        delay: &mut D,
    ) -> ControllerResult<(), I>
    where
        S: ScanlineSource,
        D: DelayNs,
    {
        let label = match (overlay, self.label) {
            (true, None) => {
                warn!("controller: no date set, drawing without label");
                None
            }
            (true, label) => label,
            (false, _) => None,
        };
        let glyphs = self.glyphs;
        let background = self.background;
        self.display.draw(
            source,
            |row, scanline| {
                if let Some(label) = &label {
                    glyphs.overlay(scanline, row, label, label.ink(), background);
                }
            },
            delay,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::tests::MockVolume;
    use crate::command::{DATA_START_TRANSMISSION, DISPLAY_REFRESH, POWER_ON};
    use crate::config::{Builder, Dimensions};
    use crate::display::tests::{Event, MockDelay, MockInterface, small_config};
    use crate::glyph::GlyphGeometry;
    use alloc::vec::Vec;
    use embedded_io::ErrorKind;

    /// 4 px tiles, 2 row digits, kanji on row 1
    const TINY: GlyphGeometry = GlyphGeometry {
        letter_width: 4,
        digit_height: 2,
        kanji_offset: 1,
    };

    /// Every pixel of every tile is ink
    static DIGITS: [u8; 20] = [0xFF; 20];
    static KANJI: [u8; 10] = [0xFF; 10];

    fn tiny_glyphs() -> GlyphTable<'static> {
        GlyphTable::from_tiles(TINY, &DIGITS, &KANJI, &[]).unwrap()
    }

    /// 14 letters of 2 bytes on a 28 byte scanline
    fn label_config() -> crate::config::Config {
        Builder::new()
            .dimensions(Dimensions::new(14, 56).unwrap())
            .build()
            .unwrap()
    }

    fn controller(config: crate::config::Config) -> Controller<'static, MockInterface> {
        Controller::new(Display::new(MockInterface::new(), config), tiny_glyphs())
    }

    fn ready_controller(config: crate::config::Config) -> Controller<'static, MockInterface> {
        let mut controller = controller(config);
        controller.initialize(&mut MockDelay::default()).unwrap();
        controller.display.interface_mut().events.clear();
        controller
    }

    fn events<'a>(controller: &'a Controller<'_, MockInterface>) -> &'a [Event] {
        &controller.display.interface().events
    }

    struct MockClock {
        date: Option<Date>,
        index: u8,
    }

    impl Clock for MockClock {
        type Error = ();

        fn date(&mut self) -> Result<Date, Self::Error> {
            self.date.ok_or(())
        }

        fn image_index(&mut self) -> Result<u8, Self::Error> {
            Ok(self.index)
        }
    }

    #[test]
    fn test_clear_rejects_color_outside_palette() {
        let mut controller = ready_controller(small_config());
        let result = controller.clear(7, &mut MockDelay::default());
        assert!(matches!(result, Err(Error::InvalidColor(7))));
        assert!(events(&controller).is_empty());
    }

    #[test]
    fn test_clear_with_palette_index() {
        let mut controller = ready_controller(small_config());
        controller.clear(4, &mut MockDelay::default()).unwrap();
        let scanlines = controller.display.interface().scanlines();
        assert_eq!(scanlines.len(), 4);
        assert!(scanlines.iter().all(|s| *s == [0x44, 0x44]));
    }

    #[test]
    fn test_operations_require_initialize() {
        let mut controller = controller(small_config());
        let mut delay = MockDelay::default();
        let mut volume = MockVolume::new(&[]);
        assert!(matches!(
            controller.clear(1, &mut delay),
            Err(Error::NotInitialized)
        ));
        assert!(matches!(
            controller.show_test_pattern(false, &mut delay),
            Err(Error::NotInitialized)
        ));
        assert!(matches!(
            controller.find_image(&mut volume, 0),
            Err(Error::NotInitialized)
        ));
        assert!(events(&controller).is_empty());
    }

    #[test]
    fn test_show_bitmap_rejects_bad_input() {
        let mut controller = ready_controller(small_config());
        let result = controller.show_bitmap(&[0x12], 2, 2, false, &mut MockDelay::default());
        assert!(matches!(
            result,
            Err(Error::InvalidBitmap {
                width: 2,
                height: 2,
                len: 1
            })
        ));
        assert!(events(&controller).is_empty());
    }

    #[test]
    fn test_show_bitmap_with_label() {
        let mut controller = ready_controller(label_config());
        // 2024-03-03 is a Sunday: red ink
        controller.set_date(Date::new(2024, 3, 3));
        let pixels = [0x11u8; 1];
        controller
            .show_bitmap(&pixels, 2, 1, true, &mut MockDelay::default())
            .unwrap();

        let scanlines = controller.display.interface().scanlines();
        assert_eq!(scanlines.len(), 14);
        // Year digits, then 年 which starts one row down
        assert_eq!(scanlines[0][0..8], [0x44; 8]);
        assert_eq!(scanlines[0][8..10], [0x11, 0x11]);
        assert_eq!(scanlines[1][8..10], [0x44, 0x44]);
        // Month " 3": blank tens digit
        assert_eq!(scanlines[0][10..12], [0x11, 0x11]);
        assert_eq!(scanlines[0][12..14], [0x44, 0x44]);
        // No bracket tiles in this table
        assert_eq!(scanlines[1][22..24], [0x11, 0x11]);
        assert_eq!(scanlines[1][24..26], [0x44, 0x44]);
        // Below the band the bitmap is untouched
        assert!(scanlines[2].iter().all(|b| *b == 0x11));
    }

    #[test]
    fn test_overlay_without_date_draws_plain_picture() {
        let mut controller = ready_controller(label_config());
        let pixels = [0x11u8; 1];
        controller
            .show_bitmap(&pixels, 2, 1, true, &mut MockDelay::default())
            .unwrap();
        let scanlines = controller.display.interface().scanlines();
        assert!(scanlines.iter().flatten().all(|b| *b == 0x11));
    }

    #[test]
    fn test_self_test_does_not_touch_stored_label() {
        let mut controller = ready_controller(label_config());
        controller.set_date(Date::new(2024, 3, 2));
        let before = *controller.label().unwrap();
        controller
            .show_test_pattern(true, &mut MockDelay::default())
            .unwrap();
        assert_eq!(controller.label(), Some(&before));
        assert_eq!(controller.label().unwrap().ink(), Color::Blue);
    }

    #[test]
    fn test_self_test_bands_and_showcase() {
        // Every tile row: ink, background, ink, background
        static STRIPED_DIGITS: [u8; 20] = [0xBB; 20];
        static STRIPED_KANJI: [u8; 10] = [0xBB; 10];
        let glyphs = GlyphTable::from_tiles(TINY, &STRIPED_DIGITS, &STRIPED_KANJI, &[]).unwrap();
        let mut controller =
            Controller::new(Display::new(MockInterface::new(), label_config()), glyphs);
        let mut delay = MockDelay::default();
        controller.initialize(&mut delay).unwrap();
        controller.show_test_pattern(true, &mut delay).unwrap();

        let scanlines = controller.display.interface().scanlines();
        assert_eq!(scanlines.len(), 14);

        // Black band: upper line kanji on the first row, digits on the second
        assert_eq!(scanlines[0][0..20], [0x00; 20]);
        assert_eq!(scanlines[0][20..28], [0x01; 8]);
        assert_eq!(scanlines[1][0..20], [0x01; 20]);
        assert_eq!(scanlines[1][20..28], [0x00; 8]);
        // White band uses a black background
        assert_eq!(scanlines[2][20..28], [0x10; 8]);
        assert_eq!(scanlines[3][0..20], [0x10; 20]);
        // Red band on white, yellow band on black
        assert_eq!(scanlines[9][0..20], [0x41; 20]);
        assert_eq!(scanlines[10][0..20], [0x55; 20]);
        assert_eq!(scanlines[10][20..28], [0x50; 8]);
    }

    #[test]
    fn test_self_test_without_overlay_is_plain_bands() {
        let mut controller = ready_controller(small_config());
        controller
            .show_test_pattern(false, &mut MockDelay::default())
            .unwrap();
        let scanlines = controller.display.interface().scanlines();
        // Four rows: band height 1, palette order
        let firsts: Vec<u8> = scanlines.iter().map(|s| s[0]).collect();
        assert_eq!(firsts, [0x00, 0x11, 0x22, 0x33]);
    }

    #[test]
    fn test_show_file_streams_image() {
        static FRAME: [u8; 8] = [0x23; 8];
        let mut controller = ready_controller(small_config());
        let mut volume = MockVolume::new(&[("A.ACP", &FRAME, false)]);
        controller
            .show_file(&mut volume, "A.ACP", false, &mut MockDelay::default())
            .unwrap();
        let scanlines = controller.display.interface().scanlines();
        assert!(scanlines.iter().all(|s| *s == [0x23, 0x23]));
        assert_eq!(volume.opened, ["A.ACP"]);
    }

    #[test]
    fn test_show_file_short_read_skips_refresh() {
        static SHORT: [u8; 7] = [0x23; 7];
        let mut controller = ready_controller(small_config());
        let mut volume = MockVolume::new(&[("A.ACP", &SHORT, false)]);
        let result = controller.show_file(&mut volume, "A.ACP", false, &mut MockDelay::default());
        assert!(matches!(result, Err(Error::ShortRead { .. })));
        let commands = controller.display.interface().commands();
        assert!(commands.contains(&DATA_START_TRANSMISSION));
        assert!(!commands.contains(&POWER_ON));
        assert!(!commands.contains(&DISPLAY_REFRESH));
    }

    #[test]
    fn test_show_file_media_absent_and_missing_file() {
        let mut controller = ready_controller(small_config());
        let mut volume = MockVolume::new(&[]);
        let mut delay = MockDelay::default();
        assert!(matches!(
            controller.show_file(&mut volume, "A.ACP", false, &mut delay),
            Err(Error::Io(ErrorKind::NotFound))
        ));
        volume.present = false;
        assert!(matches!(
            controller.show_file(&mut volume, "A.ACP", false, &mut delay),
            Err(Error::MediaAbsent)
        ));
        assert!(events(&controller).is_empty());
    }

    #[test]
    fn test_daily_update_shows_indexed_image_with_date() {
        static A: [u8; 8] = [0x22; 8];
        static B: [u8; 8] = [0x33; 8];
        let mut controller = ready_controller(small_config());
        let mut volume = MockVolume::new(&[("A.ACP", &A, false), ("B.ACP", &B, false)]);
        let mut clock = MockClock {
            date: Some(Date::new(2024, 3, 4)),
            index: 1,
        };
        let lookup = controller
            .daily_update(&mut clock, &mut volume, &mut MockDelay::default())
            .unwrap();
        assert!(lookup.is_found());
        assert_eq!(lookup.path(), "B.ACP");
        assert_eq!(
            controller.label().map(|l| l.weekday()),
            Some(Weekday::Monday)
        );
        // White clear, then the image
        let refreshes = controller
            .display
            .interface()
            .commands()
            .iter()
            .filter(|c| **c == DISPLAY_REFRESH)
            .count();
        assert_eq!(refreshes, 2);
        assert_eq!(volume.opened, ["B.ACP"]);
    }

    #[test]
    fn test_daily_update_wraps_and_keeps_old_date() {
        static A: [u8; 8] = [0x22; 8];
        let mut controller = ready_controller(small_config());
        controller.set_date(Date::new(2024, 3, 3));
        let mut volume = MockVolume::new(&[("A.ACP", &A, false)]);
        let mut clock = MockClock {
            date: None,
            index: 9,
        };
        let lookup = controller
            .daily_update(&mut clock, &mut volume, &mut MockDelay::default())
            .unwrap();
        assert!(!lookup.is_found());
        assert_eq!(lookup.path(), "A.ACP");
        assert_eq!(controller.label().map(|l| l.weekday()), Some(Weekday::Sunday));
    }

    #[test]
    fn test_execute_dispatches_requests() {
        static A: [u8; 8] = [0x22; 8];
        let mut controller = controller(small_config());
        let mut volume = MockVolume::new(&[("A.ACP", &A, false)]);
        let mut delay = MockDelay::default();

        assert_eq!(
            controller
                .execute(Request::Initialize, &mut volume, &mut delay)
                .unwrap(),
            Response::Done
        );
        assert_eq!(controller.state(), DeviceState::Ready);

        controller
            .execute(Request::SetDate(Date::new(2024, 2, 29)), &mut volume, &mut delay)
            .unwrap();
        assert!(controller.label().is_some());

        let response = controller
            .execute(Request::FindImage(0), &mut volume, &mut delay)
            .unwrap();
        assert!(matches!(response, Response::Image(Lookup::Found { index: 0, .. })));

        assert!(matches!(
            controller.execute(Request::Clear(9), &mut volume, &mut delay),
            Err(Error::InvalidColor(9))
        ));

        controller
            .execute(Request::Finish, &mut volume, &mut delay)
            .unwrap();
        assert_eq!(controller.state(), DeviceState::Uninitialized);
    }
}

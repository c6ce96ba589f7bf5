//! Graphics support via embedded-graphics
//!
//! [`Canvas`] is a packed 4 bits per pixel frame that implements
//! [`DrawTarget`](embedded_graphics_core::draw_target::DrawTarget) with the
//! panel's 7-color [`Color`]. Once drawn, the canvas is shown through
//! [`Canvas::as_bitmap`] like any other bitmap: a canvas smaller than the
//! panel is tiled across it.
//!
//! ## Example
//!
//! ```
//! use embedded_graphics::{
//!     prelude::*,
//!     primitives::{PrimitiveStyle, Rectangle},
//! };
//! use acep_calendar::{Canvas, Color};
//!
//! let mut canvas = Canvas::new([0u8; 8 * 4 / 2], 8, 4);
//! canvas.clear(Color::White);
//!
//! let _ = Rectangle::new(Point::new(0, 0), Size::new(2, 2))
//!     .into_styled(PrimitiveStyle::with_fill(Color::Red))
//!     .draw(&mut canvas);
//!
//! assert_eq!(canvas.pixel(1, 1), Some(Color::Red));
//! let bitmap = canvas.as_bitmap();
//! assert_eq!(bitmap.data()[0], 0x44);
//! ```

use core::convert::Infallible;
use embedded_graphics_core::{
    draw_target::DrawTarget,
    geometry::{Dimensions, OriginDimensions, Point, Size},
    prelude::Pixel,
    primitives::Rectangle,
};

use crate::color::Color;
use crate::error::BuilderError;
use crate::source::Bitmap;

/// Packed 7-color frame buffer
///
/// Two pixels per byte, the left pixel in the high nibble.
///
/// ## Type Parameters
///
/// * `B` - Buffer type, `width / 2 * height` bytes or more
pub struct Canvas<B> {
    buffer: B,
    width: u16,
    height: u16,
}

impl<B> Canvas<B>
where
    B: AsRef<[u8]> + AsMut<[u8]>,
{
    /// Create a canvas over `buffer`
    ///
    /// # Panics
    ///
    /// Panics if the size is unusable or `buffer` is too small. See
    /// [`try_new`](Self::try_new) for the fallible version.
    pub fn new(buffer: B, width: u16, height: u16) -> Self {
        let required = Self::required_len(width, height);
        assert!(
            width >= 2 && width % 2 == 0 && height > 0,
            "invalid canvas size {width}x{height}"
        );
        assert!(
            buffer.as_ref().len() >= required,
            "buffer too small: required {} bytes, got {}",
            required,
            buffer.as_ref().len()
        );
        Self {
            buffer,
            width,
            height,
        }
    }

    /// Try to create a canvas, returning an error if `buffer` is too small
    ///
    /// # Errors
    ///
    /// * `BuilderError::InvalidDimensions` - width is odd or zero, or height is zero
    /// * `BuilderError::BufferTooSmall` - `buffer` holds fewer than `width / 2 * height` bytes
    pub fn try_new(buffer: B, width: u16, height: u16) -> Result<Self, BuilderError> {
        if width < 2 || width % 2 != 0 || height == 0 {
            return Err(BuilderError::InvalidDimensions {
                rows: height,
                cols: width,
            });
        }
        let required = Self::required_len(width, height);
        if buffer.as_ref().len() < required {
            return Err(BuilderError::BufferTooSmall {
                required,
                provided: buffer.as_ref().len(),
            });
        }
        Ok(Self {
            buffer,
            width,
            height,
        })
    }

    fn required_len(width: u16, height: u16) -> usize {
        width as usize / 2 * height as usize
    }

    /// Fill the whole canvas with one color
    pub fn clear(&mut self, color: Color) {
        let len = Self::required_len(self.width, self.height);
        self.buffer.as_mut()[..len].fill(color.fill_byte());
    }

    /// Set one pixel; coordinates outside the canvas are ignored
    pub fn set_pixel(&mut self, x: u16, y: u16, color: Color) {
        if x >= self.width || y >= self.height {
            return;
        }
        let index = self.width as usize / 2 * y as usize + x as usize / 2;
        let byte = &mut self.buffer.as_mut()[index];
        *byte = if x % 2 == 0 {
            (*byte & 0x0F) | (color.index() << 4)
        } else {
            (*byte & 0xF0) | color.index()
        };
    }

    /// Read one pixel
    ///
    /// Returns `None` outside the canvas or for a nibble that is not a
    /// palette index.
    pub fn pixel(&self, x: u16, y: u16) -> Option<Color> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let index = self.width as usize / 2 * y as usize + x as usize / 2;
        let byte = self.buffer.as_ref()[index];
        let nibble = if x % 2 == 0 { byte >> 4 } else { byte & 0x0F };
        Color::try_from(nibble).ok()
    }

    /// The drawn frame as a bitmap
    pub fn as_bitmap(&self) -> Bitmap<'_> {
        let len = Self::required_len(self.width, self.height);
        Bitmap::from_parts(&self.buffer.as_ref()[..len], self.width, self.height)
    }

    /// Return the buffer
    pub fn release(self) -> B {
        self.buffer
    }
}

impl<B> DrawTarget for Canvas<B>
where
    B: AsRef<[u8]> + AsMut<[u8]>,
{
    type Color = Color;
    type Error = Infallible;

    fn draw_iter<Iter>(&mut self, pixels: Iter) -> Result<(), Self::Error>
    where
        Iter: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(Point { x, y }, color) in pixels {
            let (Ok(x), Ok(y)) = (u16::try_from(x), u16::try_from(y)) else {
                continue;
            };
            self.set_pixel(x, y, color);
        }
        Ok(())
    }

    fn fill_solid(&mut self, area: &Rectangle, color: Self::Color) -> Result<(), Self::Error> {
        let area = area.intersection(&self.bounding_box());
        let Some(bottom_right) = area.bottom_right() else {
            return Ok(());
        };
        // Clipped to the canvas, so every coordinate fits
        for y in area.top_left.y..=bottom_right.y {
            for x in area.top_left.x..=bottom_right.x {
                self.set_pixel(x as u16, y as u16, color);
            }
        }
        Ok(())
    }

    fn clear(&mut self, color: Self::Color) -> Result<(), Self::Error> {
        Canvas::clear(self, color);
        Ok(())
    }
}

impl<B> OriginDimensions for Canvas<B> {
    fn size(&self) -> Size {
        Size::new(u32::from(self.width), u32::from(self.height))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::{ScanlineSource, Tiled};
    use embedded_graphics::{
        prelude::*,
        primitives::{Circle, Line, PrimitiveStyle},
    };

    #[test]
    fn test_pixels_pack_left_pixel_high() {
        let mut canvas = Canvas::new([0x11u8; 4], 4, 2);
        canvas.set_pixel(0, 0, Color::Red);
        canvas.set_pixel(3, 1, Color::Orange);
        assert_eq!(canvas.release(), [0x41, 0x11, 0x11, 0x16]);
    }

    #[test]
    fn test_out_of_bounds_pixels_are_ignored() {
        let mut canvas = Canvas::new([0x11u8; 4], 4, 2);
        let _ = Line::new(Point::new(-5, 0), Point::new(10, 0))
            .into_styled(PrimitiveStyle::with_stroke(Color::Black, 1))
            .draw(&mut canvas);
        assert_eq!(canvas.release(), [0x00, 0x00, 0x11, 0x11]);
    }

    #[test]
    fn test_fill_solid_is_clipped() {
        let mut canvas = Canvas::new([0x11u8; 8], 4, 4);
        let _ = canvas.fill_solid(
            &Rectangle::new(Point::new(2, 2), Size::new(10, 10)),
            Color::Green,
        );
        assert_eq!(canvas.pixel(1, 1), Some(Color::White));
        assert_eq!(canvas.pixel(2, 2), Some(Color::Green));
        assert_eq!(canvas.pixel(3, 3), Some(Color::Green));
        assert_eq!(canvas.release(), [0x11, 0x11, 0x11, 0x11, 0x11, 0x22, 0x11, 0x22]);
    }

    #[test]
    fn test_circle_stays_inside_canvas() {
        let mut canvas = Canvas::new([0u8; 32], 8, 8);
        DrawTarget::clear(&mut canvas, Color::White).unwrap();
        let _ = Circle::new(Point::new(-4, -4), 8)
            .into_styled(PrimitiveStyle::with_fill(Color::Blue))
            .draw(&mut canvas);
        assert_eq!(canvas.pixel(0, 0), Some(Color::Blue));
        assert_eq!(canvas.pixel(7, 7), Some(Color::White));
    }

    #[test]
    fn test_try_new_rejects_small_buffer_and_odd_width() {
        assert_eq!(
            Canvas::try_new([0u8; 3], 4, 2).err(),
            Some(BuilderError::BufferTooSmall {
                required: 4,
                provided: 3
            })
        );
        assert_eq!(
            Canvas::try_new([0u8; 8], 3, 2).err(),
            Some(BuilderError::InvalidDimensions { rows: 2, cols: 3 })
        );
    }

    #[test]
    #[should_panic(expected = "buffer too small")]
    fn test_new_panics_on_small_buffer() {
        let _ = Canvas::new([0u8; 1], 4, 2);
    }

    #[test]
    fn test_canvas_tiles_across_panel() {
        let mut canvas = Canvas::new([0u8; 2], 2, 2);
        canvas.clear(Color::Yellow);
        canvas.set_pixel(1, 1, Color::Black);
        let mut source = Tiled::new(canvas.as_bitmap());
        let mut scanline = [0u8; 3];
        source.next_scanline(&mut scanline).unwrap();
        assert_eq!(scanline, [0x55; 3]);
        source.next_scanline(&mut scanline).unwrap();
        assert_eq!(scanline, [0x50; 3]);
    }
}

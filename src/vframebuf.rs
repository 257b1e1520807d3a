/*
 *  vframebuf.rs
 *
 *  nowmatrix - now playing, on the wall
 *  (c) 2020-26 Stuart Hunter
 *
 *  This program is free software: you can redistribute it and/or modify
 *  it under the terms of the GNU General Public License as published by
 *  the Free Software Foundation, either version 3 of the License, or
 *  (at your option) any later version.
 *
 *  This program is distributed in the hope that it will be useful,
 *  but WITHOUT ANY WARRANTY; without even the implied warranty of
 *  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 *  GNU General Public License for more details.
 *
 *  See <http://www.gnu.org/licenses/> to get a copy of the GNU General
 *  Public License.
 *
 */

use core::convert::Infallible;
use embedded_graphics::geometry::{OriginDimensions, Size};
use embedded_graphics::pixelcolor::{PixelColor, Rgb888};
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::Rectangle;

/// Bytes per pixel in the RGBA buffer handed to the display.
pub const RGBA_STRIDE: usize = 4;

/// A runtime-sized framebuffer for embedded-graphics.
///
/// The panel size is only known once the controller reports its strip
/// topology, so the buffer cannot be a const-generic array.
#[derive(Debug, Clone)]
pub struct VarFrameBuf<C: PixelColor> {
    buf: Vec<C>,
    w: usize,
    h: usize,
}

impl<C: PixelColor + Clone> VarFrameBuf<C> {
    pub fn new(width: u32, height: u32, fill: C) -> Self {
        let (w, h) = (width as usize, height as usize);
        Self { buf: vec![fill; w * h], w, h }
    }

    pub fn width(&self) -> usize { self.w }
    pub fn height(&self) -> usize { self.h }

    /// Immutable raw access, row-major
    pub fn as_slice(&self) -> &[C] { &self.buf }

    /// Clear to a color
    pub fn clear_color(&mut self, color: C) {
        self.buf.fill(color);
    }

    /// Read back one pixel; None if out of bounds
    pub fn pixel(&self, x: i32, y: i32) -> Option<C> {
        self.idx(Point::new(x, y)).map(|i| self.buf[i])
    }

    /// Map (x,y) to linear index; returns None if out of bounds
    #[inline]
    fn idx(&self, p: Point) -> Option<usize> {
        if p.x >= 0 && p.y >= 0 {
            let (x, y) = (p.x as usize, p.y as usize);
            if x < self.w && y < self.h {
                return Some(y * self.w + x);
            }
        }
        None
    }
}

impl VarFrameBuf<Rgb888> {
    /// Length of the RGBA export for this buffer.
    pub fn rgba_len(&self) -> usize {
        self.w * self.h * RGBA_STRIDE
    }

    /// Write the frame as row-major RGBA (alpha always opaque) into `out`.
    ///
    /// Returns the number of bytes written; a short `out` is filled as far
    /// as it goes.
    pub fn write_rgba(&self, out: &mut [u8]) -> usize {
        let mut written = 0;
        for (px, chunk) in self.buf.iter().zip(out.chunks_exact_mut(RGBA_STRIDE)) {
            chunk[0] = px.r();
            chunk[1] = px.g();
            chunk[2] = px.b();
            chunk[3] = 0xFF;
            written += RGBA_STRIDE;
        }
        written
    }

    /// Owned RGBA copy of the frame.
    pub fn to_rgba_bytes(&self) -> Vec<u8> {
        let mut bytes = vec![0u8; self.rgba_len()];
        self.write_rgba(&mut bytes);
        bytes
    }

    /// Count pixels that are not the given background.
    pub fn count_lit(&self, background: Rgb888) -> usize {
        self.buf.iter().filter(|&&c| c != background).count()
    }
}

impl<C: PixelColor> OriginDimensions for VarFrameBuf<C> {
    fn size(&self) -> Size {
        Size::new(self.w as u32, self.h as u32)
    }
}

impl<C: PixelColor + Clone> DrawTarget for VarFrameBuf<C> {
    type Color = C;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(p, c) in pixels {
            if let Some(i) = self.idx(p) {
                self.buf[i] = c;
            }
        }
        Ok(())
    }

    fn clear(&mut self, color: Self::Color) -> Result<(), Self::Error> {
        self.clear_color(color);
        Ok(())
    }

    fn fill_contiguous<I>(&mut self, area: &Rectangle, colors: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Self::Color>,
    {
        // area may hang off any edge while scrolling, clip per pixel
        for (p, c) in area.points().zip(colors) {
            if let Some(i) = self.idx(p) {
                self.buf[i] = c;
            }
        }
        Ok(())
    }

    fn fill_solid(&mut self, area: &Rectangle, color: Self::Color) -> Result<(), Self::Error> {
        let clipped = area.intersection(&self.bounding_box());
        let Size { width, height } = clipped.size;
        if width == 0 || height == 0 { return Ok(()); }
        let (x0, y0) = (clipped.top_left.x as usize, clipped.top_left.y as usize);
        for row in y0..y0 + height as usize {
            let base = row * self.w;
            self.buf[base + x0..base + x0 + width as usize].fill(color);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_graphics::primitives::{PrimitiveStyle, Rectangle};

    #[test]
    fn rgba_export_is_row_major() {
        let mut fb = VarFrameBuf::new(3, 2, Rgb888::BLACK);
        fb.draw_iter([Pixel(Point::new(2, 1), Rgb888::new(10, 20, 30))]).unwrap();

        let bytes = fb.to_rgba_bytes();
        assert_eq!(bytes.len(), 3 * 2 * 4);
        let i = (1 * 3 + 2) * 4;
        assert_eq!(&bytes[i..i + 4], &[10, 20, 30, 255]);
        assert_eq!(&bytes[0..4], &[0, 0, 0, 255]);
    }

    #[test]
    fn out_of_bounds_pixels_are_clipped() {
        let mut fb = VarFrameBuf::new(4, 4, Rgb888::BLACK);
        Rectangle::new(Point::new(-2, -2), Size::new(4, 4))
            .into_styled(PrimitiveStyle::with_fill(Rgb888::WHITE))
            .draw(&mut fb)
            .unwrap();

        assert_eq!(fb.count_lit(Rgb888::BLACK), 4);
        assert_eq!(fb.pixel(1, 1), Some(Rgb888::WHITE));
        assert_eq!(fb.pixel(2, 2), Some(Rgb888::BLACK));
        assert_eq!(fb.pixel(-1, 0), None);
    }

    #[test]
    fn short_output_buffer_is_partially_filled() {
        let fb = VarFrameBuf::new(2, 2, Rgb888::WHITE);
        let mut out = [0u8; 6];
        assert_eq!(fb.write_rgba(&mut out), 4);
        assert_eq!(&out[..4], &[255, 255, 255, 255]);
    }
}

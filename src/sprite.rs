/*
 *  sprite.rs
 *
 *  nowmatrix - now playing, on the wall
 *  (c) 2020-26 Stuart Hunter
 *
 *  Small RGBA bitmaps: artwork thumbnails, weather icons, badges
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

use embedded_graphics::pixelcolor::Rgb888;
use embedded_graphics::prelude::*;

use crate::glyphs::Glyph16;

/// Alpha at or above this is drawn, below is treated as transparent.
const ALPHA_THRESHOLD: u8 = 128;

/// An immutable RGBA image, straight (non-premultiplied) alpha.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sprite {
    width: u32,
    height: u32,
    rgba: Vec<u8>,
}

impl Sprite {
    /// Wrap raw RGBA bytes. Returns None when the length doesn't match.
    pub fn from_rgba(width: u32, height: u32, rgba: Vec<u8>) -> Option<Self> {
        if rgba.len() != (width as usize) * (height as usize) * 4 {
            return None;
        }
        Some(Self { width, height, rgba })
    }

    /// Expand a 16x16 one-bit glyph into a single-colour sprite.
    pub fn from_glyph(glyph: &Glyph16, color: Rgb888) -> Self {
        let mut rgba = vec![0u8; 16 * 16 * 4];
        for (y, row) in glyph.iter().enumerate() {
            for x in 0..16 {
                if row & (0x8000 >> x) != 0 {
                    let i = (y * 16 + x) * 4;
                    rgba[i] = color.r();
                    rgba[i + 1] = color.g();
                    rgba[i + 2] = color.b();
                    rgba[i + 3] = 0xFF;
                }
            }
        }
        Self { width: 16, height: 16, rgba }
    }

    pub fn width(&self) -> u32 { self.width }
    pub fn height(&self) -> u32 { self.height }
    pub fn size(&self) -> Size { Size::new(self.width, self.height) }

    /// Colour at (x, y), None for transparent or out of range.
    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgb888> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = ((y * self.width + x) * 4) as usize;
        let px = &self.rgba[i..i + 4];
        (px[3] >= ALPHA_THRESHOLD).then(|| Rgb888::new(px[0], px[1], px[2]))
    }

    /// Blit with its top-left at `origin`. Transparent pixels are skipped.
    pub fn draw<D>(&self, target: &mut D, origin: Point) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = Rgb888>,
    {
        let w = self.width;
        let pixels = self.rgba.chunks_exact(4).enumerate().filter_map(move |(i, px)| {
            if px[3] < ALPHA_THRESHOLD {
                return None;
            }
            let (x, y) = (i as u32 % w, i as u32 / w);
            Some(Pixel(
                origin + Point::new(x as i32, y as i32),
                Rgb888::new(px[0], px[1], px[2]),
            ))
        });
        target.draw_iter(pixels)
    }
}

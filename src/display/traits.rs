/*
 *  display/traits.rs
 *
 *  nowmatrix - now playing, on the wall
 *  (c) 2020-26 Stuart Hunter
 *
 *  The one trait every pixel sink implements
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

use crate::display::error::DisplayError;
use crate::vframebuf::RGBA_STRIDE;

/// Display capabilities and metadata
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayCapabilities {
    /// Display width in pixels
    pub width: u32,

    /// Display height in pixels
    pub height: u32,

    /// Highest frame rate the sink can take
    pub max_fps: u32,
}

/// A full-colour panel that takes whole frames as row-major RGBA.
pub trait PixelDisplay: Send {
    /// Returns the capabilities of this display
    fn capabilities(&self) -> &DisplayCapabilities;

    /// Returns the display dimensions as (width, height)
    fn dimensions(&self) -> (u32, u32) {
        let caps = self.capabilities();
        (caps.width, caps.height)
    }

    /// Bytes in one frame: width * height * 4
    fn frame_len(&self) -> usize {
        let (w, h) = self.dimensions();
        w as usize * h as usize * RGBA_STRIDE
    }

    /// Prepare the sink. Called once before the first frame.
    fn init(&mut self) -> Result<(), DisplayError> {
        Ok(())
    }

    /// Hand over one frame. Must be exactly `frame_len` bytes.
    fn push_rgba(&mut self, frame: &[u8]) -> Result<(), DisplayError>;

    /// False once the hardware is gone.
    fn is_connected(&self) -> bool {
        true
    }
}

/// Shared length check for `push_rgba` implementations.
pub fn check_frame_len(display: &(impl PixelDisplay + ?Sized), frame: &[u8]) -> Result<(), DisplayError> {
    let expected = display.frame_len();
    if frame.len() != expected {
        return Err(DisplayError::BufferSizeMismatch { expected, actual: frame.len() });
    }
    Ok(())
}

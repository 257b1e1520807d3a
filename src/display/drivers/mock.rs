/*
 *  display/drivers/mock.rs
 *
 *  nowmatrix - now playing, on the wall
 *  (c) 2020-26 Stuart Hunter
 *
 *  Headless display that records what it is sent
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

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use embedded_graphics::pixelcolor::Rgb888;

use crate::display::error::DisplayError;
use crate::display::traits::{check_frame_len, DisplayCapabilities, PixelDisplay};

/// Display without hardware. Keeps the last frame and counters in shared
/// state so a test (or a headless run) can look at them.
#[derive(Debug, Clone)]
pub struct MockDisplay {
    capabilities: DisplayCapabilities,
    state: Arc<Mutex<MockDisplayState>>,
}

/// Internal state for the mock display (shared for inspection)
#[derive(Debug, Default)]
pub struct MockDisplayState {
    /// Number of times init() was called
    pub init_count: usize,

    /// Frames accepted
    pub frames_pushed: u64,

    /// Total bytes accepted
    pub bytes_written: usize,

    /// Copy of the most recent frame
    pub last_frame: Vec<u8>,

    /// Report disconnected once this many frames were accepted
    pub disconnect_after: Option<u64>,

    /// Reject frames with an error (the loop should carry on)
    pub simulate_push_failure: bool,
}

impl MockDisplayState {
    fn connected(&self) -> bool {
        self.disconnect_after.is_none_or(|n| self.frames_pushed < n)
    }
}

impl MockDisplay {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            capabilities: DisplayCapabilities { width, height, max_fps: 120 },
            state: Arc::new(Mutex::new(MockDisplayState::default())),
        }
    }

    /// Disconnects by itself after `frames` frames.
    pub fn disconnecting_after(width: u32, height: u32, frames: u64) -> Self {
        let display = Self::new(width, height);
        display.lock().disconnect_after = Some(frames);
        display
    }

    /// Get reference to state for inspection
    pub fn state(&self) -> Arc<Mutex<MockDisplayState>> {
        Arc::clone(&self.state)
    }

    fn lock(&self) -> MutexGuard<'_, MockDisplayState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn frames_pushed(&self) -> u64 {
        self.lock().frames_pushed
    }

    /// Pixel of the last frame, None before the first or out of range.
    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgb888> {
        if x >= self.capabilities.width || y >= self.capabilities.height {
            return None;
        }
        let state = self.lock();
        let i = ((y * self.capabilities.width + x) * 4) as usize;
        state.last_frame.get(i..i + 3).map(|p| Rgb888::new(p[0], p[1], p[2]))
    }
}

impl PixelDisplay for MockDisplay {
    fn capabilities(&self) -> &DisplayCapabilities {
        &self.capabilities
    }

    fn init(&mut self) -> Result<(), DisplayError> {
        self.lock().init_count += 1;
        Ok(())
    }

    fn push_rgba(&mut self, frame: &[u8]) -> Result<(), DisplayError> {
        check_frame_len(self, frame)?;
        let mut state = self.lock();
        if !state.connected() {
            return Err(DisplayError::Disconnected);
        }
        if state.simulate_push_failure {
            return Err(DisplayError::Other("Simulated push failure".to_string()));
        }
        state.frames_pushed += 1;
        state.bytes_written += frame.len();
        state.last_frame.clear();
        state.last_frame.extend_from_slice(frame);
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.lock().connected()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_display_creation() {
        let display = MockDisplay::new(64, 32);
        assert_eq!(display.dimensions(), (64, 32));
        assert_eq!(display.frame_len(), 64 * 32 * 4);
        assert!(display.is_connected());
        assert_eq!(display.pixel(0, 0), None);
    }

    #[test]
    fn test_mock_display_records_frames() {
        let mut display = MockDisplay::new(2, 2);
        let mut frame = vec![0u8; 16];
        frame[12..16].copy_from_slice(&[1, 2, 3, 255]);

        display.init().unwrap();
        display.push_rgba(&frame).unwrap();

        let state = display.state();
        assert_eq!(state.lock().unwrap().init_count, 1);
        assert_eq!(state.lock().unwrap().frames_pushed, 1);
        assert_eq!(state.lock().unwrap().bytes_written, 16);
        assert_eq!(display.pixel(1, 1), Some(Rgb888::new(1, 2, 3)));
    }

    #[test]
    fn test_mock_display_rejects_wrong_size() {
        let mut display = MockDisplay::new(2, 2);
        match display.push_rgba(&[0u8; 15]) {
            Err(DisplayError::BufferSizeMismatch { expected, actual }) => {
                assert_eq!(expected, 16);
                assert_eq!(actual, 15);
            }
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(display.frames_pushed(), 0);
    }

    #[test]
    fn test_mock_display_disconnects() {
        let mut display = MockDisplay::disconnecting_after(1, 1, 2);
        let frame = [0u8; 4];
        display.push_rgba(&frame).unwrap();
        assert!(display.is_connected());
        display.push_rgba(&frame).unwrap();
        assert!(!display.is_connected());
        assert!(matches!(display.push_rgba(&frame), Err(DisplayError::Disconnected)));
    }

    #[test]
    fn test_mock_display_simulated_failure() {
        let mut display = MockDisplay::new(1, 1);
        display.state().lock().unwrap().simulate_push_failure = true;
        assert!(matches!(display.push_rgba(&[0u8; 4]), Err(DisplayError::Other(_))));
    }
}

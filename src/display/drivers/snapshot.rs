/*
 *  display/drivers/snapshot.rs
 *
 *  nowmatrix - now playing, on the wall
 *  (c) 2020-26 Stuart Hunter
 *
 *  Writes the current frame to a PNG file now and then
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

use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use image::{ImageFormat, RgbaImage};
use log::{debug, info};

use crate::display::error::DisplayError;
use crate::display::traits::{check_frame_len, DisplayCapabilities, PixelDisplay};

/// Desktop stand-in for the panel: the latest frame lands in a PNG that
/// an image viewer can keep reloading.
#[derive(Debug)]
pub struct SnapshotDisplay {
    capabilities: DisplayCapabilities,
    path: PathBuf,
    every: Duration,
    last_write: Option<Instant>,
    written: u64,
}

impl SnapshotDisplay {
    pub fn new(width: u32, height: u32, path: impl Into<PathBuf>, every: Duration) -> Self {
        Self {
            capabilities: DisplayCapabilities { width, height, max_fps: 60 },
            path: path.into(),
            every,
            last_write: None,
            written: 0,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Files written so far.
    pub fn written(&self) -> u64 {
        self.written
    }

    fn due(&self, now: Instant) -> bool {
        self.last_write
            .is_none_or(|last| now.saturating_duration_since(last) >= self.every)
    }

    /// Write `frame` now, replacing the file in one rename.
    pub fn write_png(&mut self, frame: &[u8]) -> Result<(), DisplayError> {
        check_frame_len(self, frame)?;
        let (w, h) = self.dimensions();
        let img = RgbaImage::from_raw(w, h, frame.to_vec())
            .ok_or_else(|| DisplayError::Other(format!("frame is not {}x{} RGBA", w, h)))?;

        let tmp = self.path.with_extension("png.tmp");
        img.save_with_format(&tmp, ImageFormat::Png)?;
        fs::rename(&tmp, &self.path)?;
        self.written += 1;
        debug!("frame written to {}", self.path.display());
        Ok(())
    }
}

impl PixelDisplay for SnapshotDisplay {
    fn capabilities(&self) -> &DisplayCapabilities {
        &self.capabilities
    }

    fn init(&mut self) -> Result<(), DisplayError> {
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir)?;
        }
        info!("Snapshot display {}x{} -> {}", self.capabilities.width, self.capabilities.height, self.path.display());
        Ok(())
    }

    fn push_rgba(&mut self, frame: &[u8]) -> Result<(), DisplayError> {
        check_frame_len(self, frame)?;
        let now = Instant::now();
        if !self.due(now) {
            return Ok(());
        }
        self.last_write = Some(now);
        self.write_png(frame)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_png(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("nowmatrix-{}-{}.png", name, std::process::id()))
    }

    #[test]
    fn writes_a_readable_png() {
        let path = temp_png("write");
        let mut display = SnapshotDisplay::new(2, 1, &path, Duration::from_secs(1));
        display.init().unwrap();
        display.push_rgba(&[255, 0, 0, 255, 0, 0, 255, 255]).unwrap();

        let img = image::open(&path).unwrap().to_rgba8();
        assert_eq!(img.dimensions(), (2, 1));
        assert_eq!(img.get_pixel(0, 0).0, [255, 0, 0, 255]);
        assert_eq!(img.get_pixel(1, 0).0, [0, 0, 255, 255]);
        fs::remove_file(&path).ok();
    }

    #[test]
    fn throttles_writes() {
        let path = temp_png("throttle");
        let mut display = SnapshotDisplay::new(1, 1, &path, Duration::from_secs(3600));
        for _ in 0..5 {
            display.push_rgba(&[0, 0, 0, 255]).unwrap();
        }
        assert_eq!(display.written(), 1);
        fs::remove_file(&path).ok();
    }

    #[test]
    fn wrong_size_is_rejected_before_writing() {
        let path = temp_png("size");
        let mut display = SnapshotDisplay::new(2, 2, &path, Duration::ZERO);
        assert!(matches!(display.push_rgba(&[0u8; 4]), Err(DisplayError::BufferSizeMismatch { .. })));
        assert_eq!(display.written(), 0);
    }
}

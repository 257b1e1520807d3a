/*
 *  display/factory.rs
 *
 *  nowmatrix - now playing, on the wall
 *  (c) 2020-26 Stuart Hunter
 *
 *  Builds the configured display
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

use std::time::Duration;

use log::info;

use crate::config::{DisplaySettings, DriverKind};
use crate::display::drivers::mock::MockDisplay;
use crate::display::drivers::snapshot::SnapshotDisplay;
use crate::display::error::DisplayError;
use crate::display::traits::PixelDisplay;

/// Type alias for boxed display trait objects
pub type BoxedDisplay = Box<dyn PixelDisplay>;

/// Factory for creating displays from configuration
pub struct DisplayFactory;

impl DisplayFactory {
    /// Create the display the settings ask for.
    ///
    /// Dimensions are checked here as well as in the config layer, since
    /// settings can be built by hand.
    pub fn create_from_settings(settings: &DisplaySettings) -> Result<BoxedDisplay, DisplayError> {
        if settings.width == 0 || settings.height == 0 {
            return Err(DisplayError::InvalidConfiguration(format!(
                "display must be at least 1x1, got {}x{}",
                settings.width, settings.height
            )));
        }

        let display: BoxedDisplay = match settings.driver {
            DriverKind::Mock => Box::new(MockDisplay::new(settings.width, settings.height)),
            DriverKind::Snapshot => Box::new(SnapshotDisplay::new(
                settings.width,
                settings.height,
                settings.snapshot_path.clone(),
                Duration::from_secs(settings.snapshot_every_secs),
            )),
        };
        info!("{:?} display {}x{}", settings.driver, settings.width, settings.height);
        Ok(display)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn settings(driver: DriverKind) -> DisplaySettings {
        DisplaySettings {
            width: 64,
            height: 32,
            fps: 30,
            driver,
            snapshot_path: PathBuf::from("frame.png"),
            snapshot_every_secs: 1,
        }
    }

    #[test]
    fn builds_each_driver() {
        for kind in [DriverKind::Mock, DriverKind::Snapshot] {
            let display = DisplayFactory::create_from_settings(&settings(kind)).unwrap();
            assert_eq!(display.dimensions(), (64, 32));
            assert_eq!(display.frame_len(), 64 * 32 * 4);
        }
    }

    #[test]
    fn zero_size_is_rejected() {
        let mut s = settings(DriverKind::Mock);
        s.height = 0;
        assert!(matches!(
            DisplayFactory::create_from_settings(&s),
            Err(DisplayError::InvalidConfiguration(_))
        ));
    }
}

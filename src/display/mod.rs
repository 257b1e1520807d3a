/*
 *  display/mod.rs
 *
 *  nowmatrix - now playing, on the wall
 *  (c) 2020-26 Stuart Hunter
 *
 *  Display subsystem: the sink trait, drivers and the frame loop
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

use std::time::{Duration, Instant};

use log::{info, warn};
use tokio::time::{interval, MissedTickBehavior};

// Core trait definitions
pub mod traits;
pub mod error;
pub mod factory;

// Display drivers
pub mod drivers;

// Re-exports for convenience
pub use traits::{DisplayCapabilities, PixelDisplay};
pub use error::DisplayError;
pub use factory::{BoxedDisplay, DisplayFactory};
pub use drivers::mock::MockDisplay;
pub use drivers::snapshot::SnapshotDisplay;

/// Drive `display` at `fps`, asking `on_frame` to fill each frame.
///
/// `fps` is clamped to what the display can take. Returns the number of
/// frames pushed once the display disconnects. Other push errors are
/// logged and the loop carries on with the next frame.
pub async fn start_rendering<D, F>(display: &mut D, fps: u32, mut on_frame: F) -> Result<u64, DisplayError>
where
    D: PixelDisplay + ?Sized,
    F: FnMut(Instant, &mut [u8]),
{
    let max_fps = display.capabilities().max_fps.max(1);
    let fps = fps.clamp(1, max_fps);
    display.init()?;

    let (w, h) = display.dimensions();
    info!("Rendering {}x{} at {} fps", w, h, fps);

    let mut frame = vec![0u8; display.frame_len()];
    let mut ticker = interval(Duration::from_nanos(1_000_000_000 / fps as u64));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    let mut pushed = 0u64;
    let mut errors = 0u64;
    loop {
        let tick = ticker.tick().await;
        if !display.is_connected() {
            break;
        }
        on_frame(tick.into_std(), &mut frame);
        match display.push_rgba(&frame) {
            Ok(()) => pushed += 1,
            Err(DisplayError::Disconnected) => break,
            Err(e) => {
                errors += 1;
                warn!("frame push failed ({}), {} so far", e, errors);
            }
        }
    }
    info!("Display disconnected after {} frames", pushed);
    Ok(pushed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn runs_until_disconnect() {
        let mut display = MockDisplay::disconnecting_after(4, 4, 5);
        let probe = display.clone();
        let mut calls = 0;
        let pushed = start_rendering(&mut display, 30, |_, frame| {
            calls += 1;
            frame.fill(calls as u8);
        })
        .await
        .unwrap();

        assert_eq!(pushed, 5);
        assert_eq!(calls, 5);
        assert_eq!(probe.state().lock().unwrap().init_count, 1);
        assert_eq!(probe.state().lock().unwrap().last_frame[0], 5);
    }

    #[tokio::test(start_paused = true)]
    async fn frame_timestamps_follow_the_rate() {
        let mut display = MockDisplay::disconnecting_after(1, 1, 3);
        let mut stamps = Vec::new();
        start_rendering(&mut display, 10, |now, _| stamps.push(now)).await.unwrap();

        assert_eq!(stamps.len(), 3);
        let gap = stamps[2].duration_since(stamps[1]);
        assert_eq!(gap, Duration::from_millis(100));
    }

    #[tokio::test(start_paused = true)]
    async fn push_errors_do_not_stop_the_loop() {
        let mut display = MockDisplay::disconnecting_after(1, 1, 2);
        let state = display.state();
        state.lock().unwrap().simulate_push_failure = true;

        let mut calls = 0;
        let pushed = start_rendering(&mut display, 60, |_, _| {
            calls += 1;
            if calls == 3 {
                state.lock().unwrap().simulate_push_failure = false;
            }
        })
        .await
        .unwrap();

        assert_eq!(pushed, 2);
        assert_eq!(calls, 4);
    }

    #[tokio::test(start_paused = true)]
    async fn works_through_a_trait_object() {
        let mut display: BoxedDisplay = Box::new(MockDisplay::disconnecting_after(2, 2, 1));
        let pushed = start_rendering(display.as_mut(), 1000, |_, _| {}).await.unwrap();
        assert_eq!(pushed, 1);
    }
}

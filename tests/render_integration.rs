/*
 *  tests/render_integration.rs
 *
 *  nowmatrix - now playing, on the wall
 *  (c) 2020-26 Stuart Hunter
 *
 *  Renderer, pollers and a headless display wired together
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

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, FixedOffset, TimeZone};
use embedded_graphics::pixelcolor::Rgb888;

use nowmatrix::composer::{FrameComposer, FrameMode, Layout, BORDER};
use nowmatrix::display::{start_rendering, MockDisplay, PixelDisplay};
use nowmatrix::error::FetchError;
use nowmatrix::icons::IconSet;
use nowmatrix::marquee::MarqueeTiming;
use nowmatrix::nowplaying::{NowPlayingSnapshot, NowPlayingSource};
use nowmatrix::poller::{now_playing_channel, spawn_now_playing, weather_channel};
use nowmatrix::render::Renderer;
use nowmatrix::sprite::Sprite;
use nowmatrix::weather::Units;

fn renderer() -> Renderer {
    let composer = FrameComposer::new(Layout::new(64, 64, 2), IconSet::builtin(), Units::Metric);
    Renderer::new(composer, MarqueeTiming::default(), 30)
}

fn evening() -> DateTime<FixedOffset> {
    FixedOffset::east_opt(3600).unwrap().with_ymd_and_hms(2026, 10, 19, 21, 5, 0).unwrap()
}

fn cover() -> Arc<Sprite> {
    Arc::new(Sprite::from_rgba(32, 32, [200u8, 10, 10, 255].repeat(32 * 32)).unwrap())
}

/// Always reports the same track.
struct OneTrack;

impl NowPlayingSource for OneTrack {
    async fn fetch(&mut self) -> Result<NowPlayingSnapshot, FetchError> {
        Ok(NowPlayingSnapshot::playing(
            "Queen",
            "A Night at the Opera",
            "Bohemian Rhapsody",
            None,
            Some(cover()),
        ))
    }
}

#[tokio::test(start_paused = true)]
async fn idle_panel_shows_the_clock() {
    let (_np_tx, np_rx) = now_playing_channel();
    let (_wx_tx, wx_rx) = weather_channel();
    let mut r = renderer().with_now_playing(np_rx).with_weather(wx_rx);

    let mut display = MockDisplay::disconnecting_after(64, 64, 3);
    let probe = display.clone();
    let mut modes = Vec::new();
    start_rendering(&mut display, 30, |now, frame| {
        modes.push(r.render(now, evening(), frame));
    })
    .await
    .unwrap();

    assert_eq!(modes, vec![FrameMode::Idle; 3]);
    assert_eq!(probe.pixel(0, 0), Some(BORDER));
    assert_eq!(probe.pixel(63, 63), Some(BORDER));
}

#[tokio::test(start_paused = true)]
async fn polled_track_reaches_the_panel() {
    let (np_tx, np_rx) = now_playing_channel();
    let poller = spawn_now_playing(OneTrack, np_tx, Duration::from_secs(15));
    // first poll is immediate
    tokio::task::yield_now().await;

    let mut r = renderer().with_now_playing(np_rx);
    let mut display = MockDisplay::disconnecting_after(64, 64, 200);
    let probe = display.clone();
    let mut last = FrameMode::Idle;
    start_rendering(&mut display, 30, |now, frame| {
        last = r.render(now, evening(), frame);
    })
    .await
    .unwrap();

    assert_eq!(last, FrameMode::NowPlaying);
    assert_eq!(r.state().lines()[0].text(), "Bohemian Rhapsody");
    assert_eq!(r.state().lines()[1].text(), "Queen");
    // artwork sits at (2,2)
    assert_eq!(probe.pixel(2, 2), Some(Rgb888::new(200, 10, 10)));
    assert_eq!(probe.pixel(33, 33), Some(Rgb888::new(200, 10, 10)));
    assert_eq!(probe.frames_pushed(), 200);

    // past the opening pause the long title has started to move
    assert!(r.state().lines()[0].offset() > 0.0);

    drop(r);
    poller.await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn frame_size_matches_display() {
    let r = renderer();
    let display = MockDisplay::new(64, 64);
    assert_eq!(r.frame_len(), display.frame_len());
}

/*
 *  render.rs
 *
 *  nowmatrix - now playing, on the wall
 *  (c) 2020-26 Stuart Hunter
 *
 *  Per-frame driver: take new snapshots, advance the marquee, compose
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
use std::time::Instant;

use chrono::{DateTime, FixedOffset, Local};
use embedded_graphics::mono_font::MonoTextStyle;
use embedded_graphics::pixelcolor::{Rgb888, RgbColor};
use log::{debug, info, warn};
use tokio::sync::watch;

use crate::composer::{FrameComposer, FrameInputs, FrameMode, Layout, LineRole, LINE_FONT};
use crate::detector::TrackChangeDetector;
use crate::marquee::{MarqueeLine, MarqueeTiming};
use crate::nowplaying::NowPlayingSnapshot;
use crate::vframebuf::VarFrameBuf;
use crate::weather::WeatherSnapshot;

/// Longest step the animation takes in one frame, seconds.
pub const MAX_FRAME_STEP: f64 = 0.25;

const SUMMARY_EVERY_FRAMES: u64 = 900;

/// Wall-clock delta between consecutive frames, clamped so a stall
/// doesn't jump the marquee.
#[derive(Debug, Clone, Default)]
pub struct FrameClock {
    last: Option<Instant>,
}

impl FrameClock {
    pub fn new() -> Self {
        Self { last: None }
    }

    /// Seconds since the previous call; 0 on the first.
    pub fn step(&mut self, now: Instant) -> f64 {
        let dt = match self.last {
            Some(prev) => now.saturating_duration_since(prev).as_secs_f64(),
            None => 0.0,
        };
        self.last = Some(now);
        dt.min(MAX_FRAME_STEP)
    }
}

/// Frame timing, warns when a frame overruns its period by more than 20%.
#[derive(Debug, Clone)]
pub struct FrameMetrics {
    pub compose_time_us: u64,
    pub export_time_us: u64,
    pub frame_time_us: u64,
    pub frame_count: u64,
    pub avg_frame_time_us: u64,
    pub target_frame_time_us: u64,
}

impl FrameMetrics {
    pub fn new(target_fps: u32) -> Self {
        Self {
            compose_time_us: 0,
            export_time_us: 0,
            frame_time_us: 0,
            frame_count: 0,
            avg_frame_time_us: 0,
            target_frame_time_us: 1_000_000 / target_fps.max(1) as u64,
        }
    }

    pub fn record_frame(&mut self, compose_time_us: u64, export_time_us: u64) {
        self.compose_time_us = compose_time_us;
        self.export_time_us = export_time_us;
        self.frame_time_us = compose_time_us + export_time_us;
        self.frame_count += 1;

        if self.avg_frame_time_us == 0 {
            self.avg_frame_time_us = self.frame_time_us;
        } else {
            self.avg_frame_time_us = (self.avg_frame_time_us + self.frame_time_us) / 2;
        }

        if self.frame_time_us > self.target_frame_time_us * 12 / 10 {
            warn!("Frame time {}μs exceeds target {}μs (compose: {}μs, export: {}μs)",
                  self.frame_time_us, self.target_frame_time_us,
                  compose_time_us, export_time_us);
        }
        if self.frame_count % SUMMARY_EVERY_FRAMES == 0 {
            debug!("{} frames, avg {}μs ({:.1} fps headroom)",
                   self.frame_count, self.avg_frame_time_us, self.fps());
        }
    }

    pub fn fps(&self) -> f32 {
        if self.avg_frame_time_us == 0 {
            0.0
        } else {
            1_000_000.0 / self.avg_frame_time_us as f32
        }
    }
}

/// The render loop's own state. Snapshots come in whole; lines are only
/// resynced here, between frames.
#[derive(Debug, Clone)]
pub struct RenderState {
    now_playing: Arc<NowPlayingSnapshot>,
    weather: Option<Arc<WeatherSnapshot>>,
    lines: Vec<MarqueeLine>,
    detector: TrackChangeDetector,
    layout: Layout,
    clock: FrameClock,
}

impl RenderState {
    pub fn new(layout: Layout, timing: MarqueeTiming) -> Self {
        let lines = LineRole::ALL
            .iter()
            .map(|_| MarqueeLine::new(layout.available_width(), timing))
            .collect();
        Self {
            now_playing: Arc::new(NowPlayingSnapshot::idle()),
            weather: None,
            lines,
            detector: TrackChangeDetector::new(),
            layout,
            clock: FrameClock::new(),
        }
    }

    pub fn now_playing(&self) -> &NowPlayingSnapshot { &self.now_playing }
    pub fn weather(&self) -> Option<&WeatherSnapshot> { self.weather.as_deref() }
    pub fn lines(&self) -> &[MarqueeLine] { &self.lines }
    pub fn layout(&self) -> &Layout { &self.layout }

    /// Take a new now-playing snapshot. Returns true when the lines were
    /// resynced. Text, width and offset change together or not at all.
    pub fn apply_now_playing(&mut self, snapshot: Arc<NowPlayingSnapshot>) -> bool {
        let reset = self.detector.observe(&snapshot);
        self.now_playing = snapshot;
        if reset {
            self.resync_lines();
            if self.now_playing.is_playing {
                info!("Now playing: {} - {}", self.now_playing.artist, self.now_playing.title);
            }
        }
        reset
    }

    pub fn apply_weather(&mut self, weather: Option<Arc<WeatherSnapshot>>) {
        self.weather = weather;
    }

    fn resync_lines(&mut self) {
        let style = MonoTextStyle::new(&LINE_FONT, Rgb888::WHITE);
        for (line, role) in self.lines.iter_mut().zip(LineRole::ALL) {
            line.sync_measured(role.text(&self.now_playing), &style);
        }
    }

    /// Advance every line by `dt` seconds.
    pub fn advance(&mut self, dt: f64) {
        for line in &mut self.lines {
            line.tick(dt);
        }
    }

    /// Clamped seconds since the previous frame.
    pub fn step_clock(&mut self, now: Instant) -> f64 {
        self.clock.step(now)
    }

    pub fn frame_inputs(&self, now: DateTime<FixedOffset>) -> FrameInputs<'_> {
        FrameInputs {
            now_playing: &self.now_playing,
            weather: self.weather.as_deref(),
            lines: &self.lines,
            now,
        }
    }
}

/// Owns the render state, the framebuffer and the snapshot receivers.
/// Called once per frame by the display loop.
pub struct Renderer {
    state: RenderState,
    composer: FrameComposer,
    frame: VarFrameBuf<Rgb888>,
    now_playing_rx: Option<watch::Receiver<Arc<NowPlayingSnapshot>>>,
    weather_rx: Option<watch::Receiver<Option<Arc<WeatherSnapshot>>>>,
    metrics: FrameMetrics,
    last_mode: Option<FrameMode>,
}

impl Renderer {
    pub fn new(composer: FrameComposer, timing: MarqueeTiming, target_fps: u32) -> Self {
        let layout = *composer.layout();
        Self {
            state: RenderState::new(layout, timing),
            frame: VarFrameBuf::new(layout.width, layout.height, Rgb888::BLACK),
            composer,
            now_playing_rx: None,
            weather_rx: None,
            metrics: FrameMetrics::new(target_fps),
            last_mode: None,
        }
    }

    pub fn with_now_playing(mut self, rx: watch::Receiver<Arc<NowPlayingSnapshot>>) -> Self {
        self.now_playing_rx = Some(rx);
        self
    }

    pub fn with_weather(mut self, rx: watch::Receiver<Option<Arc<WeatherSnapshot>>>) -> Self {
        self.weather_rx = Some(rx);
        self
    }

    pub fn state(&self) -> &RenderState { &self.state }
    pub fn frame(&self) -> &VarFrameBuf<Rgb888> { &self.frame }
    pub fn metrics(&self) -> &FrameMetrics { &self.metrics }

    /// Bytes `render` writes per frame.
    pub fn frame_len(&self) -> usize {
        self.frame.rgba_len()
    }

    /// Apply whatever the pollers published since the last frame.
    fn intake(&mut self) {
        if let Some(rx) = self.now_playing_rx.as_mut() {
            if rx.has_changed().unwrap_or(false) {
                let snapshot = rx.borrow_and_update().clone();
                self.state.apply_now_playing(snapshot);
            }
        }
        if let Some(rx) = self.weather_rx.as_mut() {
            if rx.has_changed().unwrap_or(false) {
                let weather = rx.borrow_and_update().clone();
                self.state.apply_weather(weather);
            }
        }
    }

    /// One frame at `now`, drawn with `local` as the wall-clock time,
    /// exported as RGBA into `out`.
    pub fn render(&mut self, now: Instant, local: DateTime<FixedOffset>, out: &mut [u8]) -> FrameMode {
        let started = Instant::now();

        self.intake();
        let dt = self.state.step_clock(now);
        self.state.advance(dt);

        let inputs = self.state.frame_inputs(local);
        let Ok(mode) = self.composer.compose(&mut self.frame, &inputs);
        let composed = Instant::now();

        if out.len() != self.frame.rgba_len() {
            warn!("frame buffer is {} bytes, expected {}", out.len(), self.frame.rgba_len());
        }
        self.frame.write_rgba(out);

        if self.last_mode != Some(mode) {
            info!("Display mode {:?}", mode);
            self.last_mode = Some(mode);
        }

        let compose_us = composed.duration_since(started).as_micros() as u64;
        let export_us = composed.elapsed().as_micros() as u64;
        self.metrics.record_frame(compose_us, export_us);
        mode
    }

    /// `render` at the host's local time.
    pub fn on_frame(&mut self, now: Instant, out: &mut [u8]) -> FrameMode {
        self.render(now, Local::now().fixed_offset(), out)
    }
}

/*
 *  marquee.rs
 *
 *  nowmatrix - now playing, on the wall
 *  (c) 2020-26 Stuart Hunter
 *
 *  Time-based back-and-forth scrolling for one line of text
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

//! A line wider than its slot sweeps left until its right edge shows,
//! then back, pausing at the start edge (and optionally at the far edge).
//! Movement is driven by elapsed seconds, never by frame count.

use embedded_graphics::prelude::Point;
use embedded_graphics::text::{renderer::TextRenderer, Baseline};

/// Pause shorter than this counts as finished, absorbs float drift.
const PAUSE_EPSILON: f64 = 1e-9;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MarqueeTiming {
    /// pixels per second
    pub scroll_speed: f64,
    /// pause at the start edge, seconds
    pub pause_secs: f64,
    /// pause at the far edge before sweeping back, 0 for none
    pub far_edge_pause_secs: f64,
}

impl Default for MarqueeTiming {
    fn default() -> Self {
        Self { scroll_speed: 8.0, pause_secs: 5.0, far_edge_pause_secs: 0.0 }
    }
}

/// Which way the offset is heading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// offset falling back to 0, text moving right
    Forward,
    /// offset growing toward the max, text moving left
    Backward,
}

impl Direction {
    fn sign(self) -> f64 {
        match self {
            Direction::Forward => -1.0,
            Direction::Backward => 1.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarqueePhase {
    Static,
    PausedAtStart,
    PausedAtEnd,
    ScrollingBackward,
    ScrollingForward,
}

/// Pixel width of `text` in `style`.
pub fn text_width<S: TextRenderer>(style: &S, text: &str) -> u32 {
    let metrics = style.measure_string(text, Point::zero(), Baseline::Alphabetic);
    metrics.next_position.x.max(0) as u32
}

#[derive(Debug, Clone)]
pub struct MarqueeLine {
    text: String,
    pixel_width: u32,
    available_width: u32,
    offset: f64,
    direction: Direction,
    pause_remaining: f64,
    timing: MarqueeTiming,
}

impl MarqueeLine {
    pub fn new(available_width: u32, timing: MarqueeTiming) -> Self {
        Self {
            text: String::new(),
            pixel_width: 0,
            available_width,
            offset: 0.0,
            direction: Direction::Backward,
            pause_remaining: timing.pause_secs,
            timing,
        }
    }

    /// Replace text and width together and restart from the initial state.
    /// Calling it again with the same text gives the same state.
    pub fn sync(&mut self, text: &str, pixel_width: u32) {
        self.text.clear();
        self.text.push_str(text);
        self.pixel_width = pixel_width;
        self.restart();
    }

    /// `sync` with the width measured from the font the line is drawn in.
    pub fn sync_measured<S: TextRenderer>(&mut self, text: &str, style: &S) {
        let width = text_width(style, text);
        self.sync(text, width);
    }

    pub fn restart(&mut self) {
        self.offset = 0.0;
        self.direction = Direction::Backward;
        self.pause_remaining = self.timing.pause_secs;
    }

    /// Slot width changed (display resize). Keeps the offset in range.
    pub fn set_available_width(&mut self, available_width: u32) {
        self.available_width = available_width;
        self.offset = self.offset.clamp(0.0, self.max_offset());
    }

    pub fn text(&self) -> &str { &self.text }
    pub fn pixel_width(&self) -> u32 { self.pixel_width }
    pub fn available_width(&self) -> u32 { self.available_width }
    pub fn offset(&self) -> f64 { self.offset }
    pub fn direction(&self) -> Direction { self.direction }
    pub fn pause_remaining(&self) -> f64 { self.pause_remaining }
    pub fn timing(&self) -> MarqueeTiming { self.timing }

    pub fn needs_scroll(&self) -> bool {
        self.pixel_width > self.available_width
    }

    pub fn max_offset(&self) -> f64 {
        self.pixel_width.saturating_sub(self.available_width) as f64
    }

    pub fn phase(&self) -> MarqueePhase {
        if !self.needs_scroll() {
            return MarqueePhase::Static;
        }
        let paused = self.pause_remaining > PAUSE_EPSILON;
        match (self.direction, paused) {
            (Direction::Backward, true) => MarqueePhase::PausedAtStart,
            (Direction::Forward, true) => MarqueePhase::PausedAtEnd,
            (Direction::Backward, false) => MarqueePhase::ScrollingBackward,
            (Direction::Forward, false) => MarqueePhase::ScrollingForward,
        }
    }

    /// Advance by `dt` seconds. Negative or non-finite steps do nothing.
    pub fn tick(&mut self, dt: f64) {
        if !self.needs_scroll() || !dt.is_finite() || dt <= 0.0 {
            return;
        }

        if self.pause_remaining > PAUSE_EPSILON {
            self.pause_remaining = (self.pause_remaining - dt).max(0.0);
            return;
        }
        self.pause_remaining = 0.0;

        let max = self.max_offset();
        self.offset += self.direction.sign() * self.timing.scroll_speed * dt;

        match self.direction {
            Direction::Forward if self.offset <= 0.0 => {
                self.offset = 0.0;
                self.direction = Direction::Backward;
                self.pause_remaining = self.timing.pause_secs;
            }
            Direction::Backward if self.offset >= max => {
                self.offset = max;
                self.direction = Direction::Forward;
                self.pause_remaining = self.timing.far_edge_pause_secs;
            }
            _ => {}
        }
    }

    /// Left edge to draw at, given the slot's left inset.
    pub fn draw_x(&self, inset: i32) -> i32 {
        if self.needs_scroll() {
            inset - self.offset.floor() as i32
        } else {
            inset
        }
    }
}

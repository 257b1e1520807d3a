/*
 *  composer.rs
 *
 *  nowmatrix - now playing, on the wall
 *  (c) 2020-26 Stuart Hunter
 *
 *  Builds one frame: the now-playing view or the clock/weather view
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

use chrono::{DateTime, FixedOffset};
use embedded_graphics::{
    mono_font::{ascii::FONT_10X20, iso_8859_1::{FONT_4X6, FONT_5X8}, MonoFont, MonoTextStyle},
    pixelcolor::Rgb888,
    prelude::*,
    primitives::{PrimitiveStyle, Rectangle},
    text::Text,
};

use crate::icons::{IconKey, IconSet};
use crate::marquee::{text_width, MarqueeLine};
use crate::nowplaying::NowPlayingSnapshot;
use crate::sprite::Sprite;
use crate::weather::{Units, WeatherSnapshot};

pub const BACKGROUND: Rgb888 = Rgb888::BLACK;
pub const BORDER: Rgb888 = Rgb888::new(40, 40, 40);
const TIME_COLOR: Rgb888 = Rgb888::WHITE;
const DATE_COLOR: Rgb888 = Rgb888::new(170, 170, 170);
const WEATHER_COLOR: Rgb888 = Rgb888::new(120, 200, 255);

/// Font for the marquee lines; Latin-1 so accented names draw.
pub const LINE_FONT: MonoFont<'static> = FONT_5X8;
const TIME_FONT: MonoFont<'static> = FONT_10X20;
const DATE_FONT: MonoFont<'static> = FONT_5X8;
/// Latin-1 carries the degree sign.
const WEATHER_FONT: MonoFont<'static> = FONT_4X6;

const TIME_BASELINE: i32 = 18;
const DATE_BASELINE: i32 = 29;
const WEATHER_BASELINE: i32 = 38;
const WEATHER_ICON_TOP: i32 = 42;

pub const ARTWORK_ORIGIN: Point = Point::new(2, 2);
pub const BADGE_SIZE: u32 = 16;

pub const LINE_COUNT: usize = 3;

/// The marquee lines, in drawing order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineRole {
    Title,
    Artist,
    Album,
}

impl LineRole {
    pub const ALL: [LineRole; LINE_COUNT] = [LineRole::Title, LineRole::Artist, LineRole::Album];

    pub fn text(self, snapshot: &NowPlayingSnapshot) -> &str {
        match self {
            LineRole::Title => &snapshot.title,
            LineRole::Artist => &snapshot.artist,
            LineRole::Album => &snapshot.album,
        }
    }

    fn color(self) -> Rgb888 {
        match self {
            LineRole::Title => Rgb888::WHITE,
            LineRole::Artist => Rgb888::new(200, 200, 200),
            LineRole::Album => Rgb888::new(150, 150, 150),
        }
    }
}

/// Fixed positions for a panel size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Layout {
    pub width: u32,
    pub height: u32,
    pub inset: u32,
    pub artwork_origin: Point,
    pub badge_origin: Point,
    pub line_baselines: [i32; LINE_COUNT],
}

impl Layout {
    pub fn new(width: u32, height: u32, inset: u32) -> Self {
        let h = height as i32;
        Self {
            width,
            height,
            inset,
            artwork_origin: ARTWORK_ORIGIN,
            badge_origin: Point::new(width as i32 - BADGE_SIZE as i32 - 2, 2),
            // 44 / 53 / 62 on a 64 row panel
            line_baselines: [h - 20, h - 11, h - 2],
        }
    }

    pub fn available_width(&self) -> u32 {
        self.width.saturating_sub(2 * self.inset)
    }

    /// Clip box for a line drawn at `baseline`.
    pub fn line_area(&self, baseline: i32) -> Rectangle {
        Rectangle::new(
            Point::new(self.inset as i32, baseline - LINE_FONT.baseline as i32),
            Size::new(self.available_width(), LINE_FONT.character_size.height),
        )
    }
}

/// `floor((frame_width - text_width) / 2)`; negative when the text is wider.
pub fn centered_x(frame_width: u32, text_width: u32) -> i32 {
    (frame_width as i32 - text_width as i32).div_euclid(2)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameMode {
    NowPlaying,
    Idle,
}

impl FrameMode {
    /// Now playing needs both a playing track and usable artwork.
    pub fn for_snapshot(snapshot: &NowPlayingSnapshot) -> Self {
        if snapshot.is_playing && snapshot.has_artwork() {
            FrameMode::NowPlaying
        } else {
            FrameMode::Idle
        }
    }
}

/// Everything one frame is drawn from.
#[derive(Debug, Clone, Copy)]
pub struct FrameInputs<'a> {
    pub now_playing: &'a NowPlayingSnapshot,
    pub weather: Option<&'a WeatherSnapshot>,
    pub lines: &'a [MarqueeLine],
    /// Wall clock for the clock face and for day or night.
    pub now: DateTime<FixedOffset>,
}

pub struct FrameComposer {
    layout: Layout,
    icons: IconSet,
    units: Units,
}

impl FrameComposer {
    pub fn new(layout: Layout, icons: IconSet, units: Units) -> Self {
        Self { layout, icons, units }
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    /// Clear and draw exactly one view. No I/O.
    pub fn compose<D>(&self, target: &mut D, frame: &FrameInputs<'_>) -> Result<FrameMode, D::Error>
    where
        D: DrawTarget<Color = Rgb888>,
    {
        target.clear(BACKGROUND)?;

        let artwork = frame.now_playing.artwork.as_deref();
        match (FrameMode::for_snapshot(frame.now_playing), artwork) {
            (FrameMode::NowPlaying, Some(art)) => {
                self.draw_now_playing(target, art, frame.lines)?;
                Ok(FrameMode::NowPlaying)
            }
            _ => {
                self.draw_idle(target, &frame.now, frame.weather)?;
                Ok(FrameMode::Idle)
            }
        }
    }

    fn draw_now_playing<D>(&self, target: &mut D, artwork: &Sprite, lines: &[MarqueeLine]) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = Rgb888>,
    {
        artwork.draw(target, self.layout.artwork_origin)?;
        if let Some(badge) = self.icons.get(IconKey::ServiceBadge) {
            badge.draw(target, self.layout.badge_origin)?;
        }

        let inset = self.layout.inset as i32;
        for ((line, role), baseline) in lines.iter().zip(LineRole::ALL).zip(self.layout.line_baselines) {
            if line.text().is_empty() {
                continue;
            }
            let style = MonoTextStyle::new(&LINE_FONT, role.color());
            let area = self.layout.line_area(baseline);
            let mut slot = target.clipped(&area);
            Text::new(line.text(), Point::new(line.draw_x(inset), baseline), style).draw(&mut slot)?;
        }
        Ok(())
    }

    fn draw_idle<D>(&self, target: &mut D, now: &DateTime<FixedOffset>, weather: Option<&WeatherSnapshot>) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = Rgb888>,
    {
        let Layout { width, height, .. } = self.layout;
        Rectangle::new(Point::zero(), Size::new(width, height))
            .into_styled(PrimitiveStyle::with_stroke(BORDER, 1))
            .draw(target)?;

        let time = now.format("%H:%M").to_string();
        self.draw_centered(target, &time, &TIME_FONT, TIME_COLOR, TIME_BASELINE)?;

        let date = now.format("%a %d %b").to_string();
        self.draw_centered(target, &date, &DATE_FONT, DATE_COLOR, DATE_BASELINE)?;

        let Some(weather) = weather else {
            return Ok(());
        };
        let Some(summary) = weather.summary(self.units) else {
            return Ok(());
        };
        self.draw_centered(target, &summary, &WEATHER_FONT, WEATHER_COLOR, WEATHER_BASELINE)?;

        if let Some(icon) = weather.condition_at(now).icon.and_then(|key| self.icons.get(key)) {
            let x = centered_x(width, icon.width());
            icon.draw(target, Point::new(x, WEATHER_ICON_TOP))?;
        }
        Ok(())
    }

    fn draw_centered<D>(&self, target: &mut D, text: &str, font: &MonoFont<'_>, color: Rgb888, baseline: i32) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = Rgb888>,
    {
        let style = MonoTextStyle::new(font, color);
        let x = centered_x(self.layout.width, text_width(&style, text));
        Text::new(text, Point::new(x, baseline), style).draw(target)?;
        Ok(())
    }
}

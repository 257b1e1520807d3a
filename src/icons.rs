/*
 *  icons.rs
 *
 *  nowmatrix - now playing, on the wall
 *  (c) 2020-26 Stuart Hunter
 *
 *  Icon resources: built-in pixel glyphs, optionally replaced by SVGs
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

//! Icons are resolved by a fixed logical name. Every key always has a
//! built-in 16x16 glyph; when an icon folder is configured, `<name>.svg`
//! from that folder is rendered with resvg and takes precedence.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use embedded_graphics::pixelcolor::Rgb888;
use log::{debug, warn};
use resvg::{
    render,
    usvg::{Options as ResvgUsvgOptions, Transform, Tree as ResvgTree},
};
use thiserror::Error;
use tiny_skia::Pixmap;

use crate::glyphs::*;
use crate::sprite::Sprite;

/// Logical icon names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IconKey {
    ClearDayWarm,
    ClearDayCool,
    ClearNight,
    Cloudy,
    Overcast,
    Fog,
    Drizzle,
    Rain,
    Snow,
    Storms,
    ServiceBadge,
}

impl IconKey {
    pub const ALL: [IconKey; 11] = [
        IconKey::ClearDayWarm,
        IconKey::ClearDayCool,
        IconKey::ClearNight,
        IconKey::Cloudy,
        IconKey::Overcast,
        IconKey::Fog,
        IconKey::Drizzle,
        IconKey::Rain,
        IconKey::Snow,
        IconKey::Storms,
        IconKey::ServiceBadge,
    ];

    /// File stem used when loading from an icon folder.
    pub const fn name(self) -> &'static str {
        match self {
            IconKey::ClearDayWarm => "clear_day_warm",
            IconKey::ClearDayCool => "clear_day_cool",
            IconKey::ClearNight => "clear_night",
            IconKey::Cloudy => "cloudy",
            IconKey::Overcast => "overcast",
            IconKey::Fog => "fog",
            IconKey::Drizzle => "drizzle",
            IconKey::Rain => "rain",
            IconKey::Snow => "snow",
            IconKey::Storms => "storms",
            IconKey::ServiceBadge => "service_badge",
        }
    }

    fn builtin(self) -> (&'static Glyph16, Rgb888) {
        match self {
            IconKey::ClearDayWarm => (&GLYPH_CLEAR_WARM, Rgb888::new(255, 200, 0)),
            IconKey::ClearDayCool => (&GLYPH_CLEAR_COOL, Rgb888::new(255, 240, 160)),
            IconKey::ClearNight => (&GLYPH_CLEAR_NIGHT, Rgb888::new(180, 190, 255)),
            IconKey::Cloudy => (&GLYPH_CLOUDY, Rgb888::new(200, 200, 200)),
            IconKey::Overcast => (&GLYPH_OVERCAST, Rgb888::new(140, 140, 150)),
            IconKey::Fog => (&GLYPH_FOG, Rgb888::new(150, 150, 150)),
            IconKey::Drizzle => (&GLYPH_DRIZZLE, Rgb888::new(120, 170, 255)),
            IconKey::Rain => (&GLYPH_RAIN, Rgb888::new(60, 120, 255)),
            IconKey::Snow => (&GLYPH_SNOW, Rgb888::new(240, 240, 255)),
            IconKey::Storms => (&GLYPH_STORMS, Rgb888::new(255, 220, 60)),
            IconKey::ServiceBadge => (&GLYPH_SERVICE_BADGE, Rgb888::new(213, 16, 7)),
        }
    }
}

/// Errors that can happen while rendering an SVG icon.
#[derive(Debug, Error)]
pub enum IconError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("SVG parse error: {0}")]
    SvgParse(String),
    #[error("Pixmap creation error: {0}x{1}")]
    Pixmap(u32, u32),
}

/// The loaded icon table, one sprite per key.
#[derive(Debug, Clone)]
pub struct IconSet {
    sprites: HashMap<IconKey, Sprite>,
}

impl IconSet {
    /// Built-in glyphs only.
    pub fn builtin() -> Self {
        let sprites = IconKey::ALL
            .iter()
            .map(|&key| {
                let (glyph, color) = key.builtin();
                (key, Sprite::from_glyph(glyph, color))
            })
            .collect();
        Self { sprites }
    }

    /// Built-ins, overridden by any `<name>.svg` found in `folder`.
    /// A missing or broken SVG keeps the built-in and is logged.
    pub fn load(folder: Option<&Path>, size: u32) -> Self {
        let mut set = Self::builtin();
        let Some(folder) = folder else {
            return set;
        };
        for key in IconKey::ALL {
            let path = folder.join(format!("{}.svg", key.name()));
            if !path.exists() {
                debug!("{} doesn't exist, keeping built-in icon", path.display());
                continue;
            }
            match render_svg_file(&path, size, size) {
                Ok(sprite) => {
                    set.sprites.insert(key, sprite);
                }
                Err(e) => warn!("Icon {} not usable ({}), keeping built-in", path.display(), e),
            }
        }
        set
    }

    pub fn get(&self, key: IconKey) -> Option<&Sprite> {
        self.sprites.get(&key)
    }
}

/// Render an SVG file scaled to `width` x `height`.
pub fn render_svg_file(path: &Path, width: u32, height: u32) -> Result<Sprite, IconError> {
    let data = fs::read_to_string(path)?;
    render_svg(&data, width, height)
}

/// Render SVG text scaled to `width` x `height` into an RGBA sprite.
pub fn render_svg(svg_data: &str, width: u32, height: u32) -> Result<Sprite, IconError> {
    let tree = ResvgTree::from_str(svg_data, &ResvgUsvgOptions::default())
        .map_err(|e| IconError::SvgParse(format!("{:?}", e)))?;

    let mut pixmap = Pixmap::new(width, height).ok_or(IconError::Pixmap(width, height))?;

    // For simple scaling from (0,0), a direct scale transform is sufficient.
    let svg_size = tree.size();
    let transform = Transform::from_scale(
        width as f32 / svg_size.width(),
        height as f32 / svg_size.height(),
    );
    render(&tree, transform, &mut pixmap.as_mut());

    // tiny-skia stores premultiplied colour, the sprite wants straight alpha
    let mut rgba = Vec::with_capacity((width * height * 4) as usize);
    for p in pixmap.pixels() {
        let c = p.demultiply();
        rgba.extend_from_slice(&[c.red(), c.green(), c.blue(), c.alpha()]);
    }
    Sprite::from_rgba(width, height, rgba).ok_or(IconError::Pixmap(width, height))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_key_has_a_builtin() {
        let set = IconSet::builtin();
        for key in IconKey::ALL {
            let s = set.get(key).expect("built-in icon");
            assert_eq!((s.width(), s.height()), (16, 16));
        }
    }

    #[test]
    fn svg_renders_to_requested_size() {
        let svg = r##"<svg xmlns="http://www.w3.org/2000/svg" width="8" height="8">
            <rect x="0" y="0" width="8" height="8" fill="#ff0000"/>
        </svg>"##;
        let s = render_svg(svg, 16, 16).unwrap();
        assert_eq!((s.width(), s.height()), (16, 16));
        assert_eq!(s.pixel(8, 8), Some(Rgb888::new(255, 0, 0)));
    }

    #[test]
    fn broken_svg_is_an_error() {
        assert!(matches!(render_svg("not svg", 16, 16), Err(IconError::SvgParse(_))));
    }

    #[test]
    fn missing_folder_keeps_builtins() {
        let set = IconSet::load(Some(Path::new("/definitely/not/here")), 16);
        assert!(set.get(IconKey::Rain).is_some());
    }
}

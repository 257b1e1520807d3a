/*
 *  lib.rs
 *
 *  nowmatrix - now playing, on the wall
 *  (c) 2020-26 Stuart Hunter
 *
 *  Library root
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

pub mod artwork;
pub mod composer;
pub mod conditions;
pub mod config;
pub mod detector;
pub mod display;
pub mod error;
pub mod glyphs;
pub mod icons;
pub mod marquee;
pub mod nowplaying;
pub mod poller;
pub mod render;
pub mod sprite;
pub mod vframebuf;
pub mod weather;

pub use composer::{FrameComposer, FrameMode, Layout};
pub use error::FetchError;
pub use render::Renderer;

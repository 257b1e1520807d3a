/*
 *  glyphs.rs
 *
 *  nowmatrix - now playing, on the wall
 *  (c) 2020-26 Stuart Hunter
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

/// 16x16 one-bit glyph, one u16 per row, MSB is the leftmost pixel.
pub type Glyph16 = [u16; 16];

pub const GLYPH_CLEAR_WARM: Glyph16 = [
    0b0000000110000000,
    0b0000000110000000,
    0b0010000000000100,
    0b0001000000001000,
    0b0000001111000000,
    0b0000011111100000,
    0b0000111111110000,
    0b1100111111110011,
    0b1100111111110011,
    0b0000111111110000,
    0b0000011111100000,
    0b0000001111000000,
    0b0001000000001000,
    0b0010000000000100,
    0b0000000110000000,
    0b0000000110000000,
];

pub const GLYPH_CLEAR_COOL: Glyph16 = [
    0b0000000000000000,
    0b0000000110000000,
    0b0000000000000000,
    0b0001000000001000,
    0b0000001111000000,
    0b0000010000100000,
    0b0000100000010000,
    0b0110100000010110,
    0b0110100000010110,
    0b0000100000010000,
    0b0000010000100000,
    0b0000001111000000,
    0b0001000000001000,
    0b0000000000000000,
    0b0000000110000000,
    0b0000000000000000,
];

pub const GLYPH_CLEAR_NIGHT: Glyph16 = [
    0b0000000000000000,
    0b0000011110000000,
    0b0000111000000000,
    0b0001110000000000,
    0b0011100000000000,
    0b0011100000000000,
    0b0111000000000000,
    0b0111000000000000,
    0b0111000000000000,
    0b0111100000000010,
    0b0011110000000110,
    0b0011111000011100,
    0b0001111111111000,
    0b0000111111110000,
    0b0000001111000000,
    0b0000000000000000,
];

pub const GLYPH_CLOUDY: Glyph16 = [
    0b0000000000000000,
    0b0000000001010100,
    0b0000000000111000,
    0b0000000001111100,
    0b0000001110111000,
    0b0000011111010100,
    0b0001111111100000,
    0b0011111111110000,
    0b0111111111111000,
    0b1111111111111100,
    0b1111111111111100,
    0b0111111111111000,
    0b0011111111110000,
    0b0000000000000000,
    0b0000000000000000,
    0b0000000000000000,
];

pub const GLYPH_OVERCAST: Glyph16 = [
    0b0000000000000000,
    0b0000000000000000,
    0b0000000000000000,
    0b0000001111000000,
    0b0000011111100000,
    0b0001111111110000,
    0b0011111111111000,
    0b0111111111111100,
    0b1111111111111110,
    0b1111111111111111,
    0b1111111111111111,
    0b0111111111111110,
    0b0011111111111100,
    0b0000000000000000,
    0b0000000000000000,
    0b0000000000000000,
];

pub const GLYPH_FOG: Glyph16 = [
    0b0000000000000000,
    0b0000000000000000,
    0b0000000000000000,
    0b0111111111111110,
    0b0000000000000000,
    0b0001111111111111,
    0b0000000000000000,
    0b1111111111111000,
    0b0000000000000000,
    0b0111111111111110,
    0b0000000000000000,
    0b0000111111111111,
    0b0000000000000000,
    0b0111111111110000,
    0b0000000000000000,
    0b0000000000000000,
];

pub const GLYPH_DRIZZLE: Glyph16 = [
    0b0000001111000000,
    0b0000011111100000,
    0b0001111111110000,
    0b0011111111111000,
    0b0111111111111100,
    0b1111111111111110,
    0b1111111111111110,
    0b0111111111111100,
    0b0000000000000000,
    0b0001000100010000,
    0b0000000000000000,
    0b0000100010001000,
    0b0000000000000000,
    0b0001000100010000,
    0b0000000000000000,
    0b0000000000000000,
];

pub const GLYPH_RAIN: Glyph16 = [
    0b0000001111000000,
    0b0000011111100000,
    0b0001111111110000,
    0b0011111111111000,
    0b0111111111111100,
    0b1111111111111110,
    0b1111111111111110,
    0b0111111111111100,
    0b0000000000000000,
    0b0010001000100000,
    0b0100010001000000,
    0b0000000000000000,
    0b0001000100010000,
    0b0010001000100000,
    0b0000000000000000,
    0b0000000000000000,
];

pub const GLYPH_SNOW: Glyph16 = [
    0b0000001111000000,
    0b0000011111100000,
    0b0001111111110000,
    0b0011111111111000,
    0b0111111111111100,
    0b1111111111111110,
    0b1111111111111110,
    0b0111111111111100,
    0b0000000000000000,
    0b0010000010000000,
    0b0111000111000000,
    0b0010000010000000,
    0b0000010000010000,
    0b0000111000111000,
    0b0000010000010000,
    0b0000000000000000,
];

pub const GLYPH_STORMS: Glyph16 = [
    0b0000001111000000,
    0b0000011111100000,
    0b0001111111110000,
    0b0011111111111000,
    0b0111111111111100,
    0b1111111111111110,
    0b1111111111111110,
    0b0111111111111100,
    0b0000001110000000,
    0b0000011100000000,
    0b0000111111000000,
    0b0000000111000000,
    0b0000001100000000,
    0b0000011000000000,
    0b0000010000000000,
    0b0000000000000000,
];

/// Music-note badge shown beside the artwork in the now-playing view.
pub const GLYPH_SERVICE_BADGE: Glyph16 = [
    0b0000000000000000,
    0b0000000000111100,
    0b0000000011111100,
    0b0000001111110100,
    0b0000001111000100,
    0b0000001000000100,
    0b0000001000000100,
    0b0000001000000100,
    0b0000001000000100,
    0b0000001000011100,
    0b0000001000111110,
    0b0001111000111110,
    0b0011111000011100,
    0b0011111000000000,
    0b0001110000000000,
    0b0000000000000000,
];

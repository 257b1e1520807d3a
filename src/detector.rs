/*
 *  detector.rs
 *
 *  nowmatrix - now playing, on the wall
 *  (c) 2020-26 Stuart Hunter
 *
 *  Decides when a now-playing poll means the text lines start over
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

use crate::nowplaying::NowPlayingSnapshot;

/// Stored key while nothing is playing. Cannot collide with a real key,
/// those always contain the separator.
pub const NOT_PLAYING_KEY: &str = "";

/// True when the snapshot is not playing or names a different track.
/// Artwork plays no part, only the identity key.
pub fn should_reset(previous_key: &str, snapshot: &NowPlayingSnapshot) -> bool {
    !snapshot.is_playing || snapshot.identity_key() != previous_key
}

/// Remembers the last identity key so repeated polls of the same track
/// leave the marquee alone.
#[derive(Debug, Clone)]
pub struct TrackChangeDetector {
    last_key: String,
}

impl Default for TrackChangeDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl TrackChangeDetector {
    pub fn new() -> Self {
        Self { last_key: NOT_PLAYING_KEY.to_string() }
    }

    pub fn last_key(&self) -> &str {
        &self.last_key
    }

    /// Returns true when the caller must resync its lines. The stored key
    /// is updated before returning.
    pub fn observe(&mut self, snapshot: &NowPlayingSnapshot) -> bool {
        let reset = should_reset(&self.last_key, snapshot);
        if reset {
            self.last_key.clear();
            if snapshot.is_playing {
                self.last_key.push_str(snapshot.identity_key());
            }
        }
        reset
    }
}

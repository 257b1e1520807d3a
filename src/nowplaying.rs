/*
 *  nowplaying.rs
 *
 *  nowmatrix - now playing, on the wall
 *  (c) 2020-26 Stuart Hunter
 *
 *  Last.fm recent tracks, reduced to a now-playing snapshot
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

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use log::{debug, info, warn};
use reqwest::{header, Client};
use serde::Deserialize;

use crate::artwork::ArtworkLoader;
use crate::error::{FetchError, USER_AGENT};
use crate::sprite::Sprite;

/// Separator between the fields of an identity key.
pub const KEY_SEPARATOR: &str = "|||";

pub fn identity_key(artist: &str, album: &str, title: &str) -> String {
    format!("{artist}{KEY_SEPARATOR}{album}{KEY_SEPARATOR}{title}")
}

/// What the music service says is playing right now. Replaced whole on
/// every successful poll.
#[derive(Debug, Clone, Default)]
pub struct NowPlayingSnapshot {
    pub is_playing: bool,
    pub artist: String,
    pub album: String,
    pub title: String,
    pub artwork_url: Option<String>,
    pub artwork: Option<Arc<Sprite>>,
    identity_key: String,
}

impl NowPlayingSnapshot {
    /// Nothing playing: empty text, no artwork.
    pub fn idle() -> Self {
        Self::default()
    }

    pub fn playing(
        artist: impl Into<String>,
        album: impl Into<String>,
        title: impl Into<String>,
        artwork_url: Option<String>,
        artwork: Option<Arc<Sprite>>,
    ) -> Self {
        let (artist, album, title) = (artist.into(), album.into(), title.into());
        let identity_key = identity_key(&artist, &album, &title);
        Self { is_playing: true, artist, album, title, artwork_url, artwork, identity_key }
    }

    /// Build from a parsed track with whatever artwork could be loaded.
    pub fn from_track(track: TrackInfo, artwork: Option<Arc<Sprite>>) -> Self {
        Self::playing(track.artist, track.album, track.title, track.artwork_url, artwork)
    }

    pub fn identity_key(&self) -> &str {
        &self.identity_key
    }

    pub fn has_artwork(&self) -> bool {
        self.artwork.is_some()
    }
}

/// The fields we keep from a "now playing" record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackInfo {
    pub artist: String,
    pub album: String,
    pub title: String,
    pub artwork_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RecentTracksResponse {
    recenttracks: Option<RecentTracks>,
    error: Option<i64>,
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RecentTracks {
    #[serde(default)]
    track: OneOrMany<RecentTrack>,
}

/// The API collapses a one-element list to a bare object.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum OneOrMany<T> {
    Many(Vec<T>),
    One(T),
}

impl<T> Default for OneOrMany<T> {
    fn default() -> Self {
        OneOrMany::Many(Vec::new())
    }
}

impl<T> OneOrMany<T> {
    fn into_first(self) -> Option<T> {
        match self {
            OneOrMany::Many(v) => v.into_iter().next(),
            OneOrMany::One(t) => Some(t),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct TextField {
    #[serde(rename = "#text", default)]
    text: String,
}

#[derive(Debug, Deserialize)]
struct RecentTrack {
    #[serde(default)]
    artist: TextField,
    #[serde(default)]
    album: TextField,
    #[serde(default)]
    name: String,
    #[serde(default)]
    image: Vec<TextField>,
    #[serde(rename = "@attr")]
    attr: Option<TrackAttr>,
}

#[derive(Debug, Deserialize)]
struct TrackAttr {
    nowplaying: Option<String>,
}

impl RecentTrack {
    fn is_now_playing(&self) -> bool {
        self.attr
            .as_ref()
            .and_then(|a| a.nowplaying.as_deref())
            .is_some_and(|v| v.eq_ignore_ascii_case("true"))
    }
}

/// Parse a `user.getrecenttracks` body.
///
/// `Ok(None)` means the service answered but nothing is playing.
pub fn parse_recent_tracks(body: &str) -> Result<Option<TrackInfo>, FetchError> {
    let resp: RecentTracksResponse = serde_json::from_str(body)?;
    if let Some(code) = resp.error {
        return Err(FetchError::Api { code, message: resp.message.unwrap_or_default() });
    }

    let Some(track) = resp.recenttracks.and_then(|r| r.track.into_first()) else {
        return Ok(None);
    };
    if !track.is_now_playing() {
        return Ok(None);
    }

    // ordered small to extralarge, take the largest that is present
    let artwork_url = track
        .image
        .iter()
        .rev()
        .map(|i| i.text.trim())
        .find(|u| !u.is_empty())
        .map(str::to_string);

    Ok(Some(TrackInfo {
        artist: track.artist.text,
        album: track.album.text,
        title: track.name,
        artwork_url,
    }))
}

/// Error for a non-2xx reply. The API reports its own errors in the body,
/// prefer those; anything else (a proxy's HTML page, say) is the status.
fn status_error(status: u16, body: &str) -> FetchError {
    match parse_recent_tracks(body) {
        Err(e @ FetchError::Api { .. }) => e,
        _ => FetchError::Status(status),
    }
}

/// Anything that can be polled for a now-playing snapshot.
pub trait NowPlayingSource: Send {
    fn fetch(&mut self) -> impl Future<Output = Result<NowPlayingSnapshot, FetchError>> + Send;
}

/// Last.fm `user.getrecenttracks` client.
pub struct LastFmClient {
    client: Client,
    base_url: String,
    user: String,
    api_key: String,
    artwork: ArtworkLoader,
}

impl LastFmClient {
    pub fn new(base_url: &str, user: &str, api_key: &str) -> Result<Self, FetchError> {
        let mut headers = header::HeaderMap::new();
        headers.insert("User-Agent", header::HeaderValue::from_static(USER_AGENT));
        headers.insert("Accept", header::HeaderValue::from_static("application/json"));

        let client = Client::builder()
            .connect_timeout(Duration::from_secs(3))
            .default_headers(headers)
            .timeout(Duration::from_secs(10))
            .build()?;

        info!("Last.fm now playing for {}", user);
        Ok(Self {
            artwork: ArtworkLoader::new(client.clone()),
            client,
            base_url: base_url.to_string(),
            user: user.to_string(),
            api_key: api_key.to_string(),
        })
    }

    async fn fetch_track(&self) -> Result<Option<TrackInfo>, FetchError> {
        let params = [
            ("method", "user.getrecenttracks"),
            ("user", self.user.as_str()),
            ("api_key", self.api_key.as_str()),
            ("format", "json"),
            ("limit", "1"),
        ];
        let response = self.client.get(&self.base_url).query(&params).send().await?;
        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(status_error(status.as_u16(), &body));
        }
        parse_recent_tracks(&body)
    }
}

impl NowPlayingSource for LastFmClient {
    async fn fetch(&mut self) -> Result<NowPlayingSnapshot, FetchError> {
        let Some(track) = self.fetch_track().await? else {
            debug!("nothing playing");
            return Ok(NowPlayingSnapshot::idle());
        };

        let artwork = match track.artwork_url.as_deref() {
            Some(url) => match self.artwork.load(url).await {
                Ok(sprite) => Some(sprite),
                Err(e) => {
                    warn!("artwork for {} unavailable: {}", track.title, e);
                    None
                }
            },
            None => None,
        };
        Ok(NowPlayingSnapshot::from_track(track, artwork))
    }
}

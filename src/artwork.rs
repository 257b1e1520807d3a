/*
 *  artwork.rs
 *
 *  nowmatrix - now playing, on the wall
 *  (c) 2020-26 Stuart Hunter
 *
 *  Cover art download, decode and thumbnail
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

use image::imageops::FilterType;
use log::debug;
use mini_moka::sync::Cache;
use reqwest::Client;

use crate::error::FetchError;
use crate::sprite::Sprite;

/// Edge of the square thumbnail drawn in the now-playing view.
pub const ARTWORK_SIZE: u32 = 32;

const CACHE_CAPACITY: u64 = 32;
const CACHE_TTL: Duration = Duration::from_secs(60 * 60);

/// Decode an encoded image and scale it to a `size` x `size` sprite.
pub fn decode_artwork(bytes: &[u8], size: u32) -> Result<Sprite, FetchError> {
    let img = image::load_from_memory(bytes)?;
    let thumb = img.resize_exact(size, size, FilterType::Triangle).to_rgba8();
    let (w, h) = thumb.dimensions();
    Sprite::from_rgba(w, h, thumb.into_raw())
        .ok_or_else(|| FetchError::Worker(format!("thumbnail buffer is not {}x{}", w, h)))
}

/// Fetches artwork by URL, keeping recent thumbnails so a replayed track
/// is not downloaded again.
#[derive(Clone)]
pub struct ArtworkLoader {
    client: Client,
    cache: Cache<String, Arc<Sprite>>,
    size: u32,
}

impl ArtworkLoader {
    pub fn new(client: Client) -> Self {
        Self::with_size(client, ARTWORK_SIZE)
    }

    pub fn with_size(client: Client, size: u32) -> Self {
        let cache = Cache::builder()
            .max_capacity(CACHE_CAPACITY)
            .time_to_live(CACHE_TTL)
            .build();
        Self { client, cache, size }
    }

    pub fn cached(&self, url: &str) -> Option<Arc<Sprite>> {
        self.cache.get(&url.to_string())
    }

    pub async fn load(&self, url: &str) -> Result<Arc<Sprite>, FetchError> {
        if let Some(sprite) = self.cached(url) {
            debug!("artwork cache hit {}", url);
            return Ok(sprite);
        }

        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }
        let bytes = response.bytes().await?;

        let size = self.size;
        let sprite = tokio::task::spawn_blocking(move || decode_artwork(&bytes, size)).await??;
        let sprite = Arc::new(sprite);
        self.cache.insert(url.to_string(), Arc::clone(&sprite));
        debug!("artwork loaded {}", url);
        Ok(sprite)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageBuffer, ImageFormat, Rgba};

    fn png_bytes(w: u32, h: u32, color: [u8; 4]) -> Vec<u8> {
        let img = ImageBuffer::from_pixel(w, h, Rgba(color));
        let mut buffer = Vec::new();
        img.write_to(&mut std::io::Cursor::new(&mut buffer), ImageFormat::Png)
            .unwrap();
        buffer
    }

    #[test]
    fn decodes_and_scales_to_thumbnail() {
        let bytes = png_bytes(300, 300, [10, 200, 30, 255]);
        let sprite = decode_artwork(&bytes, ARTWORK_SIZE).unwrap();
        assert_eq!((sprite.width(), sprite.height()), (32, 32));
        assert_eq!(
            sprite.pixel(16, 16),
            Some(embedded_graphics::pixelcolor::Rgb888::new(10, 200, 30))
        );
    }

    #[test]
    fn garbage_is_an_image_error() {
        let err = decode_artwork(b"definitely not a png", 32).unwrap_err();
        assert!(matches!(err, FetchError::Image(_)));
    }

    #[test]
    fn empty_cache_misses() {
        let loader = ArtworkLoader::new(Client::new());
        assert!(loader.cached("http://example.invalid/a.png").is_none());
    }
}

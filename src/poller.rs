/*
 *  poller.rs
 *
 *  nowmatrix - now playing, on the wall
 *  (c) 2020-26 Stuart Hunter
 *
 *  Background refresh of now-playing and weather snapshots
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

//! Each poller owns its source and publishes whole snapshots through a
//! watch channel. A failed poll publishes nothing, so the receiver keeps
//! the last good value. The first poll runs immediately.

use std::sync::Arc;
use std::time::Duration;

use log::{debug, info, warn};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};

use crate::error::FetchError;
use crate::nowplaying::{NowPlayingSnapshot, NowPlayingSource};
use crate::weather::{WeatherSnapshot, WeatherSource};

pub type NowPlayingTx = watch::Sender<Arc<NowPlayingSnapshot>>;
pub type NowPlayingRx = watch::Receiver<Arc<NowPlayingSnapshot>>;
pub type WeatherTx = watch::Sender<Option<Arc<WeatherSnapshot>>>;
pub type WeatherRx = watch::Receiver<Option<Arc<WeatherSnapshot>>>;

pub const NOW_PLAYING_PERIOD: Duration = Duration::from_secs(15);
pub const WEATHER_PERIOD: Duration = Duration::from_secs(5 * 60);

/// Channels start idle: nothing playing, no weather.
pub fn now_playing_channel() -> (NowPlayingTx, NowPlayingRx) {
    watch::channel(Arc::new(NowPlayingSnapshot::idle()))
}

pub fn weather_channel() -> (WeatherTx, WeatherRx) {
    watch::channel(None)
}

/// One now-playing poll. Publishes on success, returns the error otherwise.
pub async fn poll_now_playing_once<S: NowPlayingSource>(source: &mut S, tx: &NowPlayingTx) -> Result<(), FetchError> {
    let snapshot = source.fetch().await?;
    debug!("now playing poll: playing={} {:?}", snapshot.is_playing, snapshot.title);
    tx.send_replace(Arc::new(snapshot));
    Ok(())
}

/// One weather poll. Publishes on success, returns the error otherwise.
pub async fn poll_weather_once<S: WeatherSource>(source: &mut S, tx: &WeatherTx) -> Result<(), FetchError> {
    let snapshot = source.fetch().await?;
    debug!("weather poll: {:.1}°C code {}", snapshot.temperature_c, snapshot.condition_code);
    tx.send_replace(Some(Arc::new(snapshot)));
    Ok(())
}

/// Poll `source` every `period` until every receiver is gone.
pub fn spawn_now_playing<S>(mut source: S, tx: NowPlayingTx, period: Duration) -> JoinHandle<()>
where
    S: NowPlayingSource + 'static,
{
    tokio::spawn(async move {
        let mut ticker = interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut failures = 0u32;
        loop {
            ticker.tick().await;
            if tx.is_closed() {
                break;
            }
            match poll_now_playing_once(&mut source, &tx).await {
                Ok(()) => {
                    if failures > 0 {
                        info!("now playing recovered after {} failed polls", failures);
                    }
                    failures = 0;
                }
                Err(e) => {
                    failures += 1;
                    warn!("now playing poll failed ({}), keeping last snapshot", e);
                }
            }
        }
        info!("now playing poller stopped");
    })
}

/// Poll `source` every `period` until every receiver is gone.
pub fn spawn_weather<S>(mut source: S, tx: WeatherTx, period: Duration) -> JoinHandle<()>
where
    S: WeatherSource + 'static,
{
    tokio::spawn(async move {
        let mut ticker = interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            if tx.is_closed() {
                break;
            }
            match poll_weather_once(&mut source, &tx).await {
                Ok(()) => info!("Weather polling successful."),
                Err(e) => warn!("Weather polling failed ({}), keeping last snapshot", e),
            }
        }
        info!("weather poller stopped");
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;

    /// Replays scripted results, then fails.
    struct Scripted<T> {
        results: VecDeque<Result<T, FetchError>>,
        calls: Arc<std::sync::atomic::AtomicUsize>,
    }

    impl<T> Scripted<T> {
        fn new(results: Vec<Result<T, FetchError>>) -> Self {
            Self { results: results.into(), calls: Arc::default() }
        }

        fn next(&mut self) -> Result<T, FetchError> {
            self.calls.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
            self.results.pop_front().unwrap_or(Err(FetchError::Status(503)))
        }
    }

    impl NowPlayingSource for Scripted<NowPlayingSnapshot> {
        async fn fetch(&mut self) -> Result<NowPlayingSnapshot, FetchError> {
            self.next()
        }
    }

    impl WeatherSource for Scripted<WeatherSnapshot> {
        async fn fetch(&mut self) -> Result<WeatherSnapshot, FetchError> {
            self.next()
        }
    }

    fn track(title: &str) -> NowPlayingSnapshot {
        NowPlayingSnapshot::playing("Queen", "A Night at the Opera", title, Some("https://img/l.png".into()), None)
    }

    #[tokio::test]
    async fn three_failures_keep_the_last_snapshot() {
        let (tx, mut rx) = now_playing_channel();
        let mut source = Scripted::new(vec![
            Ok(track("Bohemian Rhapsody")),
            Err(FetchError::Status(500)),
            Err(FetchError::Api { code: 29, message: "Rate limit exceeded".into() }),
            Err(FetchError::Worker("timeout".into())),
        ]);

        poll_now_playing_once(&mut source, &tx).await.unwrap();
        assert!(rx.has_changed().unwrap());
        let before = rx.borrow_and_update().clone();

        for _ in 0..3 {
            assert!(poll_now_playing_once(&mut source, &tx).await.is_err());
        }
        assert!(!rx.has_changed().unwrap());
        let after = rx.borrow().clone();
        assert!(Arc::ptr_eq(&before, &after));
        assert_eq!(after.title, "Bohemian Rhapsody");
        assert_eq!(after.artwork_url.as_deref(), Some("https://img/l.png"));
    }

    #[tokio::test]
    async fn not_playing_is_published_not_an_error() {
        let (tx, rx) = now_playing_channel();
        let mut source = Scripted::new(vec![Ok(track("Bohemian Rhapsody")), Ok(NowPlayingSnapshot::idle())]);
        poll_now_playing_once(&mut source, &tx).await.unwrap();
        poll_now_playing_once(&mut source, &tx).await.unwrap();
        assert!(!rx.borrow().is_playing);
    }

    #[tokio::test]
    async fn weather_failure_keeps_previous() {
        let (tx, rx) = weather_channel();
        let snap = WeatherSnapshot::new(9.0, 61, None, None);
        let mut source = Scripted::new(vec![Ok(snap), Err(FetchError::Status(502))]);

        poll_weather_once(&mut source, &tx).await.unwrap();
        assert!(poll_weather_once(&mut source, &tx).await.is_err());
        assert_eq!(rx.borrow().as_ref().map(|w| w.condition_code), Some(61));
    }

    #[tokio::test(start_paused = true)]
    async fn spawned_poller_runs_on_its_period() {
        let (tx, mut rx) = now_playing_channel();
        let source = Scripted::new(vec![Ok(track("One")), Err(FetchError::Status(500)), Ok(track("Two"))]);
        let calls = Arc::clone(&source.calls);
        let handle = spawn_now_playing(source, tx, NOW_PLAYING_PERIOD);

        rx.changed().await.unwrap();
        assert_eq!(rx.borrow_and_update().title, "One");
        assert_eq!(calls.load(std::sync::atomic::Ordering::SeqCst), 1);

        rx.changed().await.unwrap();
        assert_eq!(rx.borrow_and_update().title, "Two");
        assert_eq!(calls.load(std::sync::atomic::Ordering::SeqCst), 3);

        drop(rx);
        tokio::time::advance(NOW_PLAYING_PERIOD).await;
        handle.await.unwrap();
    }
}

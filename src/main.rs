/*
 *  main.rs
 *
 *  nowmatrix - now playing, on the wall
 *  (c) 2020-26 Stuart Hunter
 *
 *  Now playing and weather on a full-colour LED matrix
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

use anyhow::Context;
use env_logger::Env;
use log::{info, warn};
use tokio::signal::unix::{signal, SignalKind};

use nowmatrix::composer::{FrameComposer, Layout, BADGE_SIZE};
use nowmatrix::config::{self, Settings};
use nowmatrix::display::{start_rendering, DisplayFactory};
use nowmatrix::icons::IconSet;
use nowmatrix::nowplaying::LastFmClient;
use nowmatrix::poller::{now_playing_channel, spawn_now_playing, spawn_weather, weather_channel};
use nowmatrix::render::Renderer;
use nowmatrix::weather::OpenMeteoClient;

include!(concat!(env!("OUT_DIR"), "/build_info.rs"));

/// Asynchronously waits for a SIGINT, SIGTERM, or SIGHUP signal.
async fn signal_handler() -> std::io::Result<()> {
    let mut sigint = signal(SignalKind::interrupt())?;
    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sighup = signal(SignalKind::hangup())?;

    tokio::select! {
        _ = sigint.recv() => {
            info!("SIGINT received. Initiating graceful shutdown.");
        }
        _ = sigterm.recv() => {
            info!("SIGTERM received. Initiating graceful shutdown.");
        }
        _ = sighup.recv() => {
            info!("SIGHUP received. Initiating graceful shutdown.");
        }
    }
    Ok(())
}

/// Wire the pollers to the renderer. Services left unconfigured get no
/// poller and their channel keeps its initial value.
fn build_renderer(settings: &Settings) -> anyhow::Result<Renderer> {
    let layout = Layout::new(settings.display.width, settings.display.height, settings.marquee.inset);
    let icon_folder = settings.weather.as_ref().and_then(|w| w.icons.as_deref());
    let units = settings.weather.as_ref().map(|w| w.units).unwrap_or_default();
    let composer = FrameComposer::new(layout, IconSet::load(icon_folder, BADGE_SIZE), units);

    let (np_tx, np_rx) = now_playing_channel();
    match settings.lastfm.as_ref() {
        Some(lastfm) => {
            let client = LastFmClient::new(&lastfm.base_url, &lastfm.user, &lastfm.api_key)
                .context("building the now playing client")?;
            info!("Polling now playing for {}", lastfm.user);
            spawn_now_playing(client, np_tx, settings.polling.now_playing_period());
        }
        None => warn!("No scrobbler user/key configured, showing the clock only"),
    }

    let (wx_tx, wx_rx) = weather_channel();
    match settings.weather.as_ref() {
        Some(w) => {
            let client = OpenMeteoClient::new(&w.base_url, w.latitude, w.longitude, &w.timezone)
                .context("building the weather client")?;
            info!("Polling weather for {:.3},{:.3}", w.latitude, w.longitude);
            spawn_weather(client, wx_tx, settings.polling.weather_period());
        }
        None => info!("No location configured, weather disabled"),
    }

    Ok(Renderer::new(composer, settings.marquee.timing(), settings.display.fps)
        .with_now_playing(np_rx)
        .with_weather(wx_rx))
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let settings = config::load()?;

    env_logger::Builder::from_env(Env::default().default_filter_or(settings.log_level.as_str()))
        .format_timestamp_secs()
        .init();

    info!("{} - now playing, on the wall", env!("CARGO_PKG_NAME"));
    info!("v.{} built {}", env!("CARGO_PKG_VERSION"), BUILD_DATE);

    let mut renderer = build_renderer(&settings)?;
    let mut display = DisplayFactory::create_from_settings(&settings.display)?;

    tokio::select! {
        result = start_rendering(display.as_mut(), settings.display.fps, |now, frame| {
            renderer.on_frame(now, frame);
        }) => {
            let frames = result?;
            info!("Render loop ended after {} frames", frames);
        }
        result = signal_handler() => {
            result?;
        }
    }

    info!("{} exiting", env!("CARGO_PKG_NAME"));
    Ok(())
}

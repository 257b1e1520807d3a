/*
 *  config.rs
 *
 *  nowmatrix - now playing, on the wall
 *  (c) 2020-26 Stuart Hunter
 *
 *  Layered configuration: defaults, YAML file, command line / environment
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

use serde::{Deserialize, Serialize};
use clap::{ArgAction, Parser, ValueEnum, ValueHint};
use dirs_next::home_dir;
use std::{fs, path::{Path, PathBuf}, time::Duration};
use thiserror::Error;

use crate::marquee::MarqueeTiming;
use crate::weather::Units;

pub const DEFAULT_LASTFM_URL: &str = "https://ws.audioscrobbler.com/2.0/";
pub const DEFAULT_WEATHER_URL: &str = "https://api.open-meteo.com/v1/forecast";
pub const MAX_FPS: u32 = 120;

/// Error type for config loading/validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Validation error: {0}")]
    Validation(String),
}

/// Config file as written: every field optional so layers can stack.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    pub log_level: Option<String>,     // e.g., "info" | "debug"
    pub lastfm: Option<LastFmConfig>,
    pub weather: Option<WeatherConfig>,
    pub display: Option<DisplayConfig>,
    pub marquee: Option<MarqueeConfig>,
    pub polling: Option<PollingConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct LastFmConfig {
    pub user: Option<String>,
    pub api_key: Option<String>,
    pub base_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct WeatherConfig {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub timezone: Option<String>,   // IANA name or "auto"
    pub units: Option<Units>,
    pub base_url: Option<String>,
    pub icons: Option<PathBuf>,     // folder of <name>.svg overrides
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct DisplayConfig {
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub fps: Option<u32>,
    pub driver: Option<DriverKind>,
    pub snapshot_path: Option<PathBuf>,
    pub snapshot_every_secs: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct MarqueeConfig {
    pub scroll_speed: Option<f64>,        // px/s
    pub pause_secs: Option<f64>,
    pub far_edge_pause_secs: Option<f64>, // 0 = pause at the start edge only
    pub inset: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct PollingConfig {
    pub now_playing_secs: Option<u64>,
    pub weather_secs: Option<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum DriverKind {
    /// headless, frames are counted and dropped
    #[default]
    Mock,
    /// latest frame written to a PNG
    Snapshot,
}

/// CLI overrides. All fields are Options so we can layer them over YAML.
#[derive(Debug, Parser, Clone, Default)]
#[command(name = "nowmatrix", about = "Now playing and weather on an LED matrix", version)]
pub struct Cli {
    /// Path to a YAML config file (overrides search)
    #[arg(long, value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,
    #[arg(long)]
    pub log_level: Option<String>,
    #[arg(long, env = "LASTFM_USER")]
    pub lastfm_user: Option<String>,
    #[arg(long, env = "LASTFM_KEY", hide_env_values = true)]
    pub lastfm_key: Option<String>,
    #[arg(long, allow_hyphen_values = true)]
    pub latitude: Option<f64>,
    #[arg(long, allow_hyphen_values = true)]
    pub longitude: Option<f64>,
    #[arg(long)]
    pub timezone: Option<String>,
    #[arg(long)]
    pub display_width: Option<u32>,
    #[arg(long)]
    pub display_height: Option<u32>,
    #[arg(long)]
    pub fps: Option<u32>,
    #[arg(long, value_enum)]
    pub driver: Option<DriverKind>,
    #[arg(long, value_hint = ValueHint::FilePath)]
    pub snapshot_path: Option<PathBuf>,
    /// dump fully merged config (after overrides) and exit
    #[arg(long, action = ArgAction::SetTrue)]
    pub dump_config: bool,
}

/// Effective settings after every layer, with defaults filled in.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Settings {
    pub log_level: String,
    /// None when user or key is missing; the display then stays idle.
    pub lastfm: Option<LastFmSettings>,
    /// None when no coordinate is configured.
    pub weather: Option<WeatherSettings>,
    pub display: DisplaySettings,
    pub marquee: MarqueeSettings,
    pub polling: PollingSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LastFmSettings {
    pub user: String,
    #[serde(skip_serializing)]
    pub api_key: String,
    pub base_url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeatherSettings {
    pub latitude: f64,
    pub longitude: f64,
    pub timezone: String,
    pub units: Units,
    pub base_url: String,
    pub icons: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DisplaySettings {
    pub width: u32,
    pub height: u32,
    pub fps: u32,
    pub driver: DriverKind,
    pub snapshot_path: PathBuf,
    pub snapshot_every_secs: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarqueeSettings {
    pub scroll_speed: f64,
    pub pause_secs: f64,
    pub far_edge_pause_secs: f64,
    pub inset: u32,
}

impl MarqueeSettings {
    pub fn timing(&self) -> MarqueeTiming {
        MarqueeTiming {
            scroll_speed: self.scroll_speed,
            pause_secs: self.pause_secs,
            far_edge_pause_secs: self.far_edge_pause_secs,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PollingSettings {
    pub now_playing_secs: u64,
    pub weather_secs: u64,
}

impl PollingSettings {
    pub fn now_playing_period(&self) -> Duration { Duration::from_secs(self.now_playing_secs) }
    pub fn weather_period(&self) -> Duration { Duration::from_secs(self.weather_secs) }
}

impl Settings {
    pub fn to_yaml(&self) -> Result<String, ConfigError> {
        Ok(serde_yaml::to_string(self)?)
    }
}

/// Public entry point: parse CLI, read YAML, merge, validate.
pub fn load() -> Result<Settings, ConfigError> {
    let cli = Cli::parse();
    let settings = load_from(&cli)?;

    if cli.dump_config {
        // Pretty YAML of effective config (nice for debugging)
        println!("{}", settings.to_yaml()?);
        std::process::exit(0);
    }

    Ok(settings)
}

/// Every layer for an already parsed command line.
pub fn load_from(cli: &Cli) -> Result<Settings, ConfigError> {
    // 1) defaults (filled in by `resolve`)
    let mut cfg = Config::default();

    // 2) YAML file (explicit path or search)
    if let Some(p) = cli.config.as_ref() {
        if p.exists() {
            let y = read_yaml(p)?;
            merge(&mut cfg, y);
        } else {
            return Err(ConfigError::Validation(format!(
                "Config file not found: {}",
                p.display()
            )));
        }
    } else if let Some(p) = find_config_file() {
        let y = read_yaml(&p)?;
        merge(&mut cfg, y);
    }

    // 3) CLI overrides (highest precedence)
    apply_cli_overrides(&mut cfg, cli);

    // 4) Validate
    let settings = resolve(cfg);
    validate(&settings)?;
    Ok(settings)
}

/// YAML text alone over the defaults, no CLI and no file search.
pub fn from_yaml_str(yaml: &str) -> Result<Settings, ConfigError> {
    let mut cfg = Config::default();
    merge(&mut cfg, serde_yaml::from_str(yaml)?);
    let settings = resolve(cfg);
    validate(&settings)?;
    Ok(settings)
}

/// Try common locations in order (first hit wins).
fn find_config_file() -> Option<PathBuf> {
    // XDG-style: ~/.config/nowmatrix/config.yaml
    if let Some(home) = home_dir() {
        let p = home.join(".config/nowmatrix/config.yaml");
        if p.exists() { return Some(p) }
        let p = home.join(".config/nowmatrix.yaml");
        if p.exists() { return Some(p) }
    }
    // project local
    for candidate in &["nowmatrix.yaml", "config.yaml"] {
        let p = PathBuf::from(candidate);
        if p.exists() { return Some(p) }
    }
    None
}

fn read_yaml(path: &Path) -> Result<Config, ConfigError> {
    let s = fs::read_to_string(path)?;
    let cfg: Config = serde_yaml::from_str(&s)?;
    Ok(cfg)
}

/// Overwrite `dst` with whatever `src` sets.
fn take<T>(dst: &mut Option<T>, src: Option<T>) {
    if src.is_some() { *dst = src; }
}

/// Merge a whole group, field by field.
fn merge_group<T>(dst: &mut Option<T>, src: Option<T>, fields: fn(&mut T, T)) {
    let Some(s) = src else { return };
    match dst.as_mut() {
        Some(d) => fields(d, s),
        None => *dst = Some(s),
    }
}

/// Shallow merge `src` into `dst`, Option-by-Option.
fn merge(dst: &mut Config, src: Config) {
    take(&mut dst.log_level, src.log_level);
    merge_group(&mut dst.lastfm, src.lastfm, |d, s| {
        take(&mut d.user, s.user);
        take(&mut d.api_key, s.api_key);
        take(&mut d.base_url, s.base_url);
    });
    merge_group(&mut dst.weather, src.weather, |d, s| {
        take(&mut d.latitude, s.latitude);
        take(&mut d.longitude, s.longitude);
        take(&mut d.timezone, s.timezone);
        take(&mut d.units, s.units);
        take(&mut d.base_url, s.base_url);
        take(&mut d.icons, s.icons);
    });
    merge_group(&mut dst.display, src.display, |d, s| {
        take(&mut d.width, s.width);
        take(&mut d.height, s.height);
        take(&mut d.fps, s.fps);
        take(&mut d.driver, s.driver);
        take(&mut d.snapshot_path, s.snapshot_path);
        take(&mut d.snapshot_every_secs, s.snapshot_every_secs);
    });
    merge_group(&mut dst.marquee, src.marquee, |d, s| {
        take(&mut d.scroll_speed, s.scroll_speed);
        take(&mut d.pause_secs, s.pause_secs);
        take(&mut d.far_edge_pause_secs, s.far_edge_pause_secs);
        take(&mut d.inset, s.inset);
    });
    merge_group(&mut dst.polling, src.polling, |d, s| {
        take(&mut d.now_playing_secs, s.now_playing_secs);
        take(&mut d.weather_secs, s.weather_secs);
    });
}

fn apply_cli_overrides(cfg: &mut Config, cli: &Cli) {
    take(&mut cfg.log_level, cli.log_level.clone());

    if cli.lastfm_user.is_some() || cli.lastfm_key.is_some() {
        let lastfm = cfg.lastfm.get_or_insert_with(LastFmConfig::default);
        take(&mut lastfm.user, cli.lastfm_user.clone());
        take(&mut lastfm.api_key, cli.lastfm_key.clone());
    }

    if cli.latitude.is_some() || cli.longitude.is_some() || cli.timezone.is_some() {
        let weather = cfg.weather.get_or_insert_with(WeatherConfig::default);
        take(&mut weather.latitude, cli.latitude);
        take(&mut weather.longitude, cli.longitude);
        take(&mut weather.timezone, cli.timezone.clone());
    }

    let any_display = cli.display_width.is_some()
        || cli.display_height.is_some()
        || cli.fps.is_some()
        || cli.driver.is_some()
        || cli.snapshot_path.is_some();
    if any_display {
        let display = cfg.display.get_or_insert_with(DisplayConfig::default);
        take(&mut display.width, cli.display_width);
        take(&mut display.height, cli.display_height);
        take(&mut display.fps, cli.fps);
        take(&mut display.driver, cli.driver);
        take(&mut display.snapshot_path, cli.snapshot_path.clone());
    }
}

fn non_empty(s: Option<String>) -> Option<String> {
    s.filter(|v| !v.trim().is_empty())
}

/// Fill defaults. Optional services without their required fields drop out.
fn resolve(cfg: Config) -> Settings {
    let timing = MarqueeTiming::default();

    let lastfm = cfg.lastfm.unwrap_or_default();
    let lastfm = match (non_empty(lastfm.user), non_empty(lastfm.api_key)) {
        (Some(user), Some(api_key)) => Some(LastFmSettings {
            user,
            api_key,
            base_url: lastfm.base_url.unwrap_or_else(|| DEFAULT_LASTFM_URL.to_string()),
        }),
        _ => None,
    };

    let weather = cfg.weather.unwrap_or_default();
    let weather = match (weather.latitude, weather.longitude) {
        (Some(latitude), Some(longitude)) => Some(WeatherSettings {
            latitude,
            longitude,
            timezone: weather.timezone.unwrap_or_else(|| "auto".to_string()),
            units: weather.units.unwrap_or_default(),
            base_url: weather.base_url.unwrap_or_else(|| DEFAULT_WEATHER_URL.to_string()),
            icons: weather.icons,
        }),
        _ => None,
    };

    let display = cfg.display.unwrap_or_default();
    let marquee = cfg.marquee.unwrap_or_default();
    let polling = cfg.polling.unwrap_or_default();

    Settings {
        log_level: cfg.log_level.unwrap_or_else(|| "info".to_string()),
        lastfm,
        weather,
        display: DisplaySettings {
            width: display.width.unwrap_or(64),
            height: display.height.unwrap_or(64),
            fps: display.fps.unwrap_or(30),
            driver: display.driver.unwrap_or_default(),
            snapshot_path: display.snapshot_path.unwrap_or_else(|| PathBuf::from("./frame.png")),
            snapshot_every_secs: display.snapshot_every_secs.unwrap_or(1),
        },
        marquee: MarqueeSettings {
            scroll_speed: marquee.scroll_speed.unwrap_or(timing.scroll_speed),
            pause_secs: marquee.pause_secs.unwrap_or(timing.pause_secs),
            far_edge_pause_secs: marquee.far_edge_pause_secs.unwrap_or(timing.far_edge_pause_secs),
            inset: marquee.inset.unwrap_or(2),
        },
        polling: PollingSettings {
            now_playing_secs: polling.now_playing_secs.unwrap_or(15),
            weather_secs: polling.weather_secs.unwrap_or(300),
        },
    }
}

/// Put any invariants here (required fields, ranges, etc.)
fn validate(s: &Settings) -> Result<(), ConfigError> {
    let fail = |msg: &str| Err(ConfigError::Validation(msg.into()));

    if s.display.width == 0 || s.display.height == 0 {
        return fail("display width/height must be > 0");
    }
    if s.display.fps == 0 || s.display.fps > MAX_FPS {
        return fail("display fps must be 1..=120");
    }
    if !(s.marquee.scroll_speed > 0.0) {
        return fail("marquee scroll_speed must be > 0");
    }
    if !(s.marquee.pause_secs >= 0.0) || !(s.marquee.far_edge_pause_secs >= 0.0) {
        return fail("marquee pauses must be >= 0");
    }
    if s.polling.now_playing_secs == 0 || s.polling.weather_secs == 0 {
        return fail("polling intervals must be > 0");
    }
    if let Some(w) = s.weather.as_ref() {
        if !(-90.0..=90.0).contains(&w.latitude) {
            return fail("weather latitude must be -90..=90");
        }
        if !(-180.0..=180.0).contains(&w.longitude) {
            return fail("weather longitude must be -180..=180");
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_without_any_file() {
        let s = from_yaml_str("{}").unwrap();
        assert_eq!(s.log_level, "info");
        assert_eq!(s.lastfm, None);
        assert_eq!(s.weather, None);
        assert_eq!((s.display.width, s.display.height, s.display.fps), (64, 64, 30));
        assert_eq!(s.display.driver, DriverKind::Mock);
        assert_eq!(s.marquee.timing(), MarqueeTiming::default());
        assert_eq!(s.marquee.inset, 2);
        assert_eq!(s.polling.now_playing_period(), Duration::from_secs(15));
        assert_eq!(s.polling.weather_period(), Duration::from_secs(300));
    }

    #[test]
    fn full_yaml() {
        let yaml = r#"
log_level: debug
lastfm:
  user: someone
  api_key: abc123
weather:
  latitude: 51.5
  longitude: -0.12
  timezone: Europe/London
  units: imperial
display:
  width: 128
  driver: snapshot
  snapshot_path: /tmp/panel.png
marquee:
  far_edge_pause_secs: 5
"#;
        let s = from_yaml_str(yaml).unwrap();
        let lastfm = s.lastfm.as_ref().unwrap();
        assert_eq!(lastfm.user, "someone");
        assert_eq!(lastfm.base_url, DEFAULT_LASTFM_URL);
        let weather = s.weather.as_ref().unwrap();
        assert_eq!(weather.units, Units::Imperial);
        assert_eq!(weather.timezone, "Europe/London");
        assert_eq!(s.display.width, 128);
        assert_eq!(s.display.height, 64);
        assert_eq!(s.display.driver, DriverKind::Snapshot);
        assert_eq!(s.marquee.far_edge_pause_secs, 5.0);
    }

    #[test]
    fn lastfm_without_key_is_disabled() {
        let s = from_yaml_str("lastfm: { user: someone }").unwrap();
        assert_eq!(s.lastfm, None);
        let s = from_yaml_str("lastfm: { user: someone, api_key: '  ' }").unwrap();
        assert_eq!(s.lastfm, None);
    }

    #[test]
    fn api_key_is_not_dumped() {
        let s = from_yaml_str("lastfm: { user: someone, api_key: sekrit }").unwrap();
        let dumped = s.to_yaml().unwrap();
        assert!(dumped.contains("someone"));
        assert!(!dumped.contains("sekrit"));
    }

    #[test]
    fn validation_rejects_bad_values() {
        for yaml in [
            "display: { width: 0 }",
            "display: { fps: 0 }",
            "display: { fps: 500 }",
            "marquee: { scroll_speed: 0 }",
            "marquee: { pause_secs: -1 }",
            "polling: { weather_secs: 0 }",
            "weather: { latitude: 91, longitude: 0 }",
            "weather: { latitude: 0, longitude: -181 }",
        ] {
            assert!(matches!(from_yaml_str(yaml), Err(ConfigError::Validation(_))), "{yaml}");
        }
    }

    #[test]
    fn bad_yaml_is_a_yaml_error() {
        assert!(matches!(from_yaml_str("display: [1, 2"), Err(ConfigError::Yaml(_))));
    }

    #[test]
    fn later_layers_win() {
        let mut cfg: Config = serde_yaml::from_str("display: { width: 32, height: 16 }").unwrap();
        merge(&mut cfg, serde_yaml::from_str("display: { height: 32 }").unwrap());
        let cli = Cli { display_width: Some(96), lastfm_user: Some("cli".into()), lastfm_key: Some("k".into()), ..Cli::default() };
        apply_cli_overrides(&mut cfg, &cli);

        let s = resolve(cfg);
        assert_eq!((s.display.width, s.display.height), (96, 32));
        assert_eq!(s.lastfm.map(|l| l.user).as_deref(), Some("cli"));
    }

    #[test]
    fn command_line_parses() {
        let cli = Cli::try_parse_from([
            "nowmatrix", "--latitude", "-33.9", "--longitude", "151.2", "--driver", "snapshot", "--fps", "25",
        ]).unwrap();
        assert_eq!(cli.latitude, Some(-33.9));
        assert_eq!(cli.driver, Some(DriverKind::Snapshot));
        assert_eq!(cli.fps, Some(25));
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let cli = Cli { config: Some(PathBuf::from("/definitely/not/here.yaml")), ..Cli::default() };
        assert!(matches!(load_from(&cli), Err(ConfigError::Validation(_))));
    }
}

/*
 *  weather.rs
 *
 *  nowmatrix - now playing, on the wall
 *  (c) 2020-26 Stuart Hunter
 *
 *  Current conditions and today's sun times from an Open-Meteo endpoint
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
use std::io::Read;
use std::time::Duration;

use chrono::{DateTime, FixedOffset, Local, NaiveDate, NaiveDateTime, Offset, TimeZone, Utc};
use flate2::read::GzDecoder;
use log::{debug, info};
use reqwest::{header, Client};
use serde::{Deserialize, Serialize};

use crate::conditions::{is_night, resolve_condition, ResolvedCondition};
use crate::error::{FetchError, USER_AGENT};

const LOCAL_MINUTE_FORMAT: &str = "%Y-%m-%dT%H:%M";
const MAX_RETRIES: u8 = 3;

/// Temperature units for display. Requests are always made in Celsius.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Units {
    #[default]
    Metric,
    Imperial,
}

impl Units {
    pub fn suffix(self) -> char {
        match self {
            Units::Metric => 'C',
            Units::Imperial => 'F',
        }
    }

    pub fn from_celsius(self, c: f64) -> f64 {
        match self {
            Units::Metric => c,
            Units::Imperial => c * 9.0 / 5.0 + 32.0,
        }
    }
}

/// One weather poll. Replaced whole. Day or night is decided when the
/// condition is resolved, so a stale snapshot still turns to night.
#[derive(Debug, Clone, PartialEq)]
pub struct WeatherSnapshot {
    pub temperature_c: f64,
    pub condition_code: i32,
    pub sunrise: Option<DateTime<FixedOffset>>,
    pub sunset: Option<DateTime<FixedOffset>>,
}

impl WeatherSnapshot {
    pub fn new(
        temperature_c: f64,
        condition_code: i32,
        sunrise: Option<DateTime<FixedOffset>>,
        sunset: Option<DateTime<FixedOffset>>,
    ) -> Self {
        Self { temperature_c, condition_code, sunrise, sunset }
    }

    /// Label and icon as of `now`.
    pub fn condition_at<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> ResolvedCondition {
        let night = is_night(now, self.sunrise.as_ref(), self.sunset.as_ref());
        resolve_condition(self.condition_code, night, self.temperature_c)
    }

    /// Rounded temperature with unit, e.g. `12°C`.
    pub fn temperature_text(&self, units: Units) -> String {
        let t = units.from_celsius(self.temperature_c).round() as i64;
        format!("{}°{}", t, units.suffix())
    }

    /// `12°C Cloudy`, or None when the condition is unknown.
    pub fn summary(&self, units: Units) -> Option<String> {
        // the label never depends on the time of day
        let condition = resolve_condition(self.condition_code, false, self.temperature_c);
        condition
            .is_known()
            .then(|| format!("{} {}", self.temperature_text(units), condition.label))
    }
}

#[derive(Debug, Deserialize)]
struct ForecastResponse {
    #[serde(default)]
    error: bool,
    reason: Option<String>,
    #[serde(default)]
    utc_offset_seconds: i32,
    current_weather: Option<CurrentWeather>,
    daily: Option<Daily>,
}

#[derive(Debug, Deserialize)]
struct CurrentWeather {
    temperature: f64,
    weathercode: i32,
}

#[derive(Debug, Default, Deserialize)]
struct Daily {
    #[serde(default)]
    sunrise: Vec<String>,
    #[serde(default)]
    sunset: Vec<String>,
}

fn parse_local(raw: Option<&String>, offset: FixedOffset) -> Option<DateTime<FixedOffset>> {
    let raw = raw?;
    let naive = NaiveDateTime::parse_from_str(raw, LOCAL_MINUTE_FORMAT).ok()?;
    offset.from_local_datetime(&naive).single()
}

/// Parse a forecast body. Returns the snapshot and the location's offset.
pub fn parse_forecast(body: &str) -> Result<(WeatherSnapshot, FixedOffset), FetchError> {
    let resp: ForecastResponse = serde_json::from_str(body)?;
    if resp.error {
        return Err(FetchError::Api { code: 400, message: resp.reason.unwrap_or_default() });
    }
    let Some(current) = resp.current_weather else {
        return Err(FetchError::Api { code: 0, message: "no current_weather in response".into() });
    };

    let offset = FixedOffset::east_opt(resp.utc_offset_seconds)
        .unwrap_or_else(|| Utc.fix());
    let daily = resp.daily.unwrap_or_default();
    let sunrise = parse_local(daily.sunrise.first(), offset);
    let sunset = parse_local(daily.sunset.first(), offset);

    let snapshot = WeatherSnapshot::new(current.temperature, current.weathercode, sunrise, sunset);
    Ok((snapshot, offset))
}

/// Anything that can be polled for a weather snapshot.
pub trait WeatherSource: Send {
    fn fetch(&mut self) -> impl Future<Output = Result<WeatherSnapshot, FetchError>> + Send;
}

pub struct OpenMeteoClient {
    client: Client,
    base_url: String,
    latitude: f64,
    longitude: f64,
    timezone: String,
    location_offset: Option<FixedOffset>,
}

impl OpenMeteoClient {
    pub fn new(base_url: &str, latitude: f64, longitude: f64, timezone: &str) -> Result<Self, FetchError> {
        let mut headers = header::HeaderMap::new();
        headers.insert("User-Agent", header::HeaderValue::from_static(USER_AGENT));
        headers.insert("Accept", header::HeaderValue::from_static("application/json"));
        headers.insert("Accept-Encoding", header::HeaderValue::from_static("deflate, gzip"));
        headers.insert("Connection", header::HeaderValue::from_static("close"));

        let client = Client::builder()
            .connect_timeout(Duration::from_secs(3))
            .default_headers(headers)
            .timeout(Duration::from_secs(10))
            .build()?;

        info!("Weather for {:.3},{:.3} ({})", latitude, longitude, timezone);
        Ok(Self {
            client,
            base_url: base_url.to_string(),
            latitude,
            longitude,
            timezone: timezone.to_string(),
            location_offset: None,
        })
    }

    /// Today at the location, recomputed on every call. Until the first
    /// response tells us the location's offset, the host's date is used.
    pub fn today(&self) -> NaiveDate {
        match self.location_offset {
            Some(offset) => Utc::now().with_timezone(&offset).date_naive(),
            None => Local::now().date_naive(),
        }
    }

    pub fn query_params(&self, today: NaiveDate) -> Vec<(&'static str, String)> {
        let day = today.format("%Y-%m-%d").to_string();
        vec![
            ("latitude", format!("{:.4}", self.latitude)),
            ("longitude", format!("{:.4}", self.longitude)),
            ("current_weather", "true".to_string()),
            ("daily", "sunrise,sunset".to_string()),
            ("timezone", self.timezone.clone()),
            ("temperature_unit", "celsius".to_string()),
            ("start_date", day.clone()),
            ("end_date", day),
        ]
    }

    async fn send_with_retries<T: Serialize + ?Sized>(&self, params: &T, max_retries: u8) -> Result<String, FetchError> {
        let mut retries = 0;
        loop {
            match self.client.get(&self.base_url).query(params).send().await {
                Ok(response) => {
                    let status = response.status();
                    let raw = response.bytes().await?;
                    let plain = decode_body(&raw);
                    if !status.is_success() && !status.is_client_error() {
                        return Err(FetchError::Status(status.as_u16()));
                    }
                    // 4xx carries {"error": true, "reason": ...}
                    return Ok(plain);
                }
                Err(e) => {
                    retries += 1;
                    if retries >= max_retries {
                        return Err(e.into());
                    }
                    debug!("weather request failed ({}), retry {}", e, retries);
                    tokio::time::sleep(Duration::from_secs(1)).await;
                }
            }
        }
    }
}

/// Gzip if it decodes as gzip, plain text otherwise.
fn decode_body(raw: &[u8]) -> String {
    let mut decoder = GzDecoder::new(raw);
    let mut decoded = String::new();
    match decoder.read_to_string(&mut decoded) {
        Ok(_) => decoded,
        Err(_) => String::from_utf8_lossy(raw).to_string(),
    }
}

impl WeatherSource for OpenMeteoClient {
    async fn fetch(&mut self) -> Result<WeatherSnapshot, FetchError> {
        let params = self.query_params(self.today());
        let body = self.send_with_retries(&params, MAX_RETRIES).await?;
        let (snapshot, offset) = parse_forecast(&body)?;
        self.location_offset = Some(offset);
        Ok(snapshot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::icons::IconKey;
    use flate2::{write::GzEncoder, Compression};
    use std::io::Write;

    const BODY: &str = r#"{
        "latitude": 51.5, "longitude": -0.12,
        "utc_offset_seconds": 3600, "timezone": "Europe/London",
        "current_weather": {"temperature": 16.6, "windspeed": 9.4, "weathercode": 0, "is_day": 1, "time": "2026-10-19T12:00"},
        "daily": {"time": ["2026-10-19"], "sunrise": ["2026-10-19T07:30"], "sunset": ["2026-10-19T18:00"]}
    }"#;

    #[test]
    fn parses_local_sun_times_with_offset() {
        let now = Utc.with_ymd_and_hms(2026, 10, 19, 11, 0, 0).unwrap();
        let (snap, offset) = parse_forecast(BODY).unwrap();
        assert_eq!(offset.local_minus_utc(), 3600);
        let sunset = snap.sunset.unwrap();
        assert_eq!(sunset.with_timezone(&Utc), Utc.with_ymd_and_hms(2026, 10, 19, 17, 0, 0).unwrap());
        assert_eq!(snap.condition_at(&now).icon, Some(IconKey::ClearDayWarm));
        assert_eq!(snap.summary(Units::Metric).as_deref(), Some("17°C Clear"));
    }

    #[test]
    fn clear_after_sunset_uses_night_icon() {
        let (snap, _) = parse_forecast(BODY).unwrap();
        let afternoon = Utc.with_ymd_and_hms(2026, 10, 19, 16, 0, 0).unwrap();
        let evening = Utc.with_ymd_and_hms(2026, 10, 19, 17, 30, 0).unwrap();
        // same snapshot, the icon follows the clock
        assert_eq!(snap.condition_at(&afternoon).icon, Some(IconKey::ClearDayWarm));
        assert_eq!(snap.condition_at(&evening).label, "Clear");
        assert_eq!(snap.condition_at(&evening).icon, Some(IconKey::ClearNight));
    }

    #[test]
    fn missing_daily_block_means_day() {
        let body = r#"{"utc_offset_seconds": 0, "current_weather": {"temperature": 3.2, "weathercode": 0}}"#;
        let now = Utc.with_ymd_and_hms(2026, 1, 5, 23, 0, 0).unwrap();
        let (snap, _) = parse_forecast(body).unwrap();
        assert_eq!(snap.sunset, None);
        assert_eq!(snap.condition_at(&now).icon, Some(IconKey::ClearDayCool));
    }

    #[test]
    fn api_error_is_reported() {
        let body = r#"{"error": true, "reason": "Latitude must be in range of -90 to 90"}"#;
        assert!(matches!(parse_forecast(body), Err(FetchError::Api { code: 400, .. })));
    }

    #[test]
    fn unknown_code_has_no_summary() {
        let snap = WeatherSnapshot::new(10.0, 42, None, None);
        assert_eq!(snap.summary(Units::Metric), None);
    }

    #[test]
    fn imperial_display() {
        let snap = WeatherSnapshot::new(-0.4, 3, None, None);
        assert_eq!(snap.temperature_text(Units::Metric), "0°C");
        assert_eq!(snap.temperature_text(Units::Imperial), "31°F");
        assert_eq!(snap.summary(Units::Imperial).as_deref(), Some("31°F Overcast"));
    }

    #[test]
    fn gzip_and_plain_bodies_both_decode() {
        let mut enc = GzEncoder::new(Vec::new(), Compression::default());
        enc.write_all(BODY.as_bytes()).unwrap();
        let gz = enc.finish().unwrap();
        assert_eq!(decode_body(&gz), BODY);
        assert_eq!(decode_body(BODY.as_bytes()), BODY);
    }

    #[test]
    fn request_is_scoped_to_one_day() {
        let client = OpenMeteoClient::new("http://localhost/v1/forecast", 51.5, -0.12, "auto").unwrap();
        let day = NaiveDate::from_ymd_opt(2026, 10, 19).unwrap();
        let params = client.query_params(day);
        let get = |k: &str| params.iter().find(|(n, _)| *n == k).map(|(_, v)| v.as_str());
        assert_eq!(get("start_date"), Some("2026-10-19"));
        assert_eq!(get("end_date"), Some("2026-10-19"));
        assert_eq!(get("daily"), Some("sunrise,sunset"));
        assert_eq!(get("timezone"), Some("auto"));
    }
}

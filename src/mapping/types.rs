//! Normalized records served to clients and stored in the cache.

use serde::{Deserialize, Serialize};

/// One hour of forecast. `hour` is 0..=23.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HourlyWeather {
    pub hour: u8,
    pub temperature: f64,
    pub condition: String,
    pub condition_icon: String,
    pub wind_kph: f64,
    pub wind_dir: String,
    pub humidity: f64,
    pub precip_mm: f64,
    pub cloud: f64,
    pub feelslike: f64,
    pub will_it_rain: bool,
    pub chance_of_rain: f64,
    pub uv: f64,
}

/// A city's forecast for one calendar day, always 24 hourly entries.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DailyForecast {
    pub city: String,
    pub region: String,
    pub country: String,
    pub lat: f64,
    pub lon: f64,
    /// `YYYY-MM-DD`.
    pub date: String,
    /// RFC 3339 UTC, second precision.
    pub last_updated: String,
    pub sunrise: String,
    pub sunset: String,
    /// When the gateway fetched this record, RFC 3339 UTC.
    pub cached_at: String,
    pub weather: Vec<HourlyWeather>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CityResult {
    pub id: i64,
    pub name: String,
    pub region: String,
    pub country: String,
    pub lat: f64,
    pub lon: f64,
    pub url: String,
}

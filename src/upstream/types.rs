//! Raw provider payloads.
//!
//! Every field defaults so a partial or drifting upstream schema still
//! decodes; the mapper turns gaps into empty strings and zeros. A field sent
//! as JSON `null` is treated like a missing one.

use serde::{Deserialize, Deserializer, Serialize};

/// Deserialize `null` as `T::default()`.
///
/// Pair with `#[serde(default)]` on the container so an absent field
/// defaults too.
pub fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct RawForecastResponse {
    #[serde(deserialize_with = "null_as_default")]
    pub location: RawLocation,
    #[serde(deserialize_with = "null_as_default")]
    pub current: RawCurrent,
    #[serde(deserialize_with = "null_as_default")]
    pub forecast: RawForecast,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct RawLocation {
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub region: String,
    #[serde(deserialize_with = "null_as_default")]
    pub country: String,
    #[serde(deserialize_with = "null_as_default")]
    pub lat: f64,
    #[serde(deserialize_with = "null_as_default")]
    pub lon: f64,
    #[serde(deserialize_with = "null_as_default")]
    pub tz_id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub localtime: String,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct RawCurrent {
    #[serde(deserialize_with = "null_as_default")]
    pub last_updated_epoch: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub last_updated: String,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct RawForecast {
    #[serde(deserialize_with = "null_as_default")]
    pub forecastday: Vec<RawForecastDay>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct RawForecastDay {
    #[serde(deserialize_with = "null_as_default")]
    pub date: String,
    #[serde(deserialize_with = "null_as_default")]
    pub astro: RawAstro,
    #[serde(deserialize_with = "null_as_default")]
    pub hour: Vec<RawHour>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct RawAstro {
    #[serde(deserialize_with = "null_as_default")]
    pub sunrise: String,
    #[serde(deserialize_with = "null_as_default")]
    pub sunset: String,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct RawCondition {
    #[serde(deserialize_with = "null_as_default")]
    pub text: String,
    #[serde(deserialize_with = "null_as_default")]
    pub icon: String,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct RawHour {
    #[serde(deserialize_with = "null_as_default")]
    pub time_epoch: i64,
    /// Provider local time, `YYYY-MM-DD HH:MM`.
    #[serde(deserialize_with = "null_as_default")]
    pub time: String,
    #[serde(deserialize_with = "null_as_default")]
    pub temp_c: f64,
    #[serde(deserialize_with = "null_as_default")]
    pub condition: RawCondition,
    #[serde(deserialize_with = "null_as_default")]
    pub wind_kph: f64,
    #[serde(deserialize_with = "null_as_default")]
    pub wind_dir: String,
    #[serde(deserialize_with = "null_as_default")]
    pub humidity: f64,
    #[serde(deserialize_with = "null_as_default")]
    pub precip_mm: f64,
    #[serde(deserialize_with = "null_as_default")]
    pub cloud: f64,
    #[serde(deserialize_with = "null_as_default")]
    pub feelslike_c: f64,
    /// 0 or 1.
    #[serde(deserialize_with = "null_as_default")]
    pub will_it_rain: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub chance_of_rain: f64,
    #[serde(deserialize_with = "null_as_default")]
    pub uv: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct RawSearchResult {
    #[serde(deserialize_with = "null_as_default")]
    pub id: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub region: String,
    #[serde(deserialize_with = "null_as_default")]
    pub country: String,
    #[serde(deserialize_with = "null_as_default")]
    pub lat: f64,
    #[serde(deserialize_with = "null_as_default")]
    pub lon: f64,
    #[serde(deserialize_with = "null_as_default")]
    pub url: String,
}

//! Raw forecast → `DailyForecast`.

use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Timelike, Utc};

use crate::mapping::types::{DailyForecast, HourlyWeather};
use crate::upstream::types::{RawForecastDay, RawForecastResponse, RawHour};

const HOURS_PER_DAY: u8 = 24;
const PROVIDER_TIME_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Shape a provider forecast into the served record. Never fails.
pub fn map_forecast(
    raw: &RawForecastResponse,
    date: NaiveDate,
    fetched_at: DateTime<Utc>,
) -> DailyForecast {
    let wanted = date.format("%Y-%m-%d").to_string();
    // Only the requested day; a missing day maps to an empty one.
    let empty = RawForecastDay::default();
    let day = raw
        .forecast
        .forecastday
        .iter()
        .find(|day| day.date == wanted)
        .unwrap_or(&empty);

    DailyForecast {
        city: raw.location.name.clone(),
        region: raw.location.region.clone(),
        country: raw.location.country.clone(),
        lat: raw.location.lat,
        lon: raw.location.lon,
        date: wanted,
        last_updated: last_updated(raw, fetched_at),
        sunrise: day.astro.sunrise.clone(),
        sunset: day.astro.sunset.clone(),
        cached_at: rfc3339(fetched_at),
        weather: hourly(&day.hour),
    }
}

/// Exactly 24 entries. Each slot takes the raw entry whose `time` names that
/// hour, else the entry at that position, else defaults.
fn hourly(raw: &[RawHour]) -> Vec<HourlyWeather> {
    let mut slots: [Option<&RawHour>; HOURS_PER_DAY as usize] = [None; HOURS_PER_DAY as usize];

    for entry in raw {
        if let Some(hour) = hour_of(&entry.time) {
            let slot = &mut slots[hour as usize];
            if slot.is_none() {
                *slot = Some(entry);
            }
        }
    }

    (0..HOURS_PER_DAY)
        .map(|hour| {
            let entry = slots[hour as usize].or_else(|| {
                raw.get(hour as usize)
                    .filter(|entry| hour_of(&entry.time).is_none())
            });
            match entry {
                Some(entry) => map_hour(hour, entry),
                None => HourlyWeather {
                    hour,
                    ..HourlyWeather::default()
                },
            }
        })
        .collect()
}

fn hour_of(time: &str) -> Option<u8> {
    NaiveDateTime::parse_from_str(time, PROVIDER_TIME_FORMAT)
        .ok()
        .map(|t| t.hour() as u8)
}

fn map_hour(hour: u8, raw: &RawHour) -> HourlyWeather {
    HourlyWeather {
        hour,
        temperature: raw.temp_c,
        condition: raw.condition.text.clone(),
        condition_icon: absolute_icon(&raw.condition.icon),
        wind_kph: raw.wind_kph,
        wind_dir: raw.wind_dir.clone(),
        humidity: raw.humidity,
        precip_mm: raw.precip_mm,
        cloud: raw.cloud,
        feelslike: raw.feelslike_c,
        will_it_rain: raw.will_it_rain != 0,
        chance_of_rain: raw.chance_of_rain,
        uv: raw.uv,
    }
}

/// The provider serves protocol-relative icon URLs.
fn absolute_icon(icon: &str) -> String {
    if icon.starts_with("//") {
        format!("https:{icon}")
    } else {
        icon.to_string()
    }
}

fn last_updated(raw: &RawForecastResponse, fetched_at: DateTime<Utc>) -> String {
    let from_epoch = (raw.current.last_updated_epoch > 0)
        .then(|| DateTime::<Utc>::from_timestamp(raw.current.last_updated_epoch, 0))
        .flatten();

    // Local provider time carries no offset; read it as UTC.
    let from_local = || {
        NaiveDateTime::parse_from_str(&raw.current.last_updated, PROVIDER_TIME_FORMAT)
            .ok()
            .map(|t| t.and_utc())
    };

    rfc3339(from_epoch.or_else(from_local).unwrap_or(fetched_at))
}

fn rfc3339(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Secs, true)
}

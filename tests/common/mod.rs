//! Shared utilities for integration tests.
#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;

use weather_gateway::cache::{CacheError, CacheResult, CacheStore, MemoryCacheStore};
use weather_gateway::config::ResourceConfig;
use weather_gateway::upstream::types::{
    RawAstro, RawCondition, RawForecast, RawForecastDay, RawForecastResponse, RawHour,
    RawLocation, RawSearchResult,
};
use weather_gateway::upstream::{UpstreamError, WeatherProvider};

/// How a scripted endpoint answers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Succeed,
    Fail,
    /// Sleep, then succeed.
    Hang(Duration),
}

/// Provider whose answers are programmed per endpoint and whose calls are
/// counted.
#[derive(Debug)]
pub struct ScriptedProvider {
    forecast_mode: Mutex<Mode>,
    search_mode: Mutex<Mode>,
    forecast_calls: AtomicUsize,
    forecast_completions: AtomicUsize,
    search_calls: AtomicUsize,
    last_city: Mutex<Option<String>>,
}

impl ScriptedProvider {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            forecast_mode: Mutex::new(Mode::Succeed),
            search_mode: Mutex::new(Mode::Succeed),
            forecast_calls: AtomicUsize::new(0),
            forecast_completions: AtomicUsize::new(0),
            search_calls: AtomicUsize::new(0),
            last_city: Mutex::new(None),
        })
    }

    pub fn set_forecast_mode(&self, mode: Mode) {
        *self.forecast_mode.lock().unwrap() = mode;
    }

    pub fn set_search_mode(&self, mode: Mode) {
        *self.search_mode.lock().unwrap() = mode;
    }

    pub fn forecast_calls(&self) -> usize {
        self.forecast_calls.load(Ordering::SeqCst)
    }

    /// Forecast calls that ran to completion (not cancelled by a timeout).
    pub fn forecast_completions(&self) -> usize {
        self.forecast_completions.load(Ordering::SeqCst)
    }

    pub fn search_calls(&self) -> usize {
        self.search_calls.load(Ordering::SeqCst)
    }

    pub fn last_city(&self) -> Option<String> {
        self.last_city.lock().unwrap().clone()
    }
}

async fn answer(mode: Mode) -> Result<(), UpstreamError> {
    match mode {
        Mode::Succeed => Ok(()),
        Mode::Fail => Err(UpstreamError::Status { status: 500 }),
        Mode::Hang(delay) => {
            tokio::time::sleep(delay).await;
            Ok(())
        }
    }
}

#[async_trait]
impl WeatherProvider for ScriptedProvider {
    async fn forecast(
        &self,
        city: &str,
        date: NaiveDate,
    ) -> Result<RawForecastResponse, UpstreamError> {
        self.forecast_calls.fetch_add(1, Ordering::SeqCst);
        *self.last_city.lock().unwrap() = Some(city.to_string());
        let mode = *self.forecast_mode.lock().unwrap();
        answer(mode).await?;
        self.forecast_completions.fetch_add(1, Ordering::SeqCst);
        Ok(sample_forecast(city, date))
    }

    async fn search(&self, query: &str) -> Result<Vec<RawSearchResult>, UpstreamError> {
        self.search_calls.fetch_add(1, Ordering::SeqCst);
        let mode = *self.search_mode.lock().unwrap();
        answer(mode).await?;
        Ok(sample_search(query))
    }
}

/// Memory store with switchable read/write failures and stalls.
#[derive(Debug, Default)]
pub struct FlakyStore {
    inner: MemoryCacheStore,
    fail_get: AtomicBool,
    fail_set: AtomicBool,
    hang_get: AtomicBool,
    hang_set: AtomicBool,
    get_calls: AtomicUsize,
    set_calls: AtomicUsize,
}

impl FlakyStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn fail_get(&self, fail: bool) {
        self.fail_get.store(fail, Ordering::SeqCst);
    }

    pub fn fail_set(&self, fail: bool) {
        self.fail_set.store(fail, Ordering::SeqCst);
    }

    /// Make reads never answer.
    pub fn hang_get(&self, hang: bool) {
        self.hang_get.store(hang, Ordering::SeqCst);
    }

    /// Make writes never answer.
    pub fn hang_set(&self, hang: bool) {
        self.hang_set.store(hang, Ordering::SeqCst);
    }

    pub fn get_calls(&self) -> usize {
        self.get_calls.load(Ordering::SeqCst)
    }

    pub fn set_calls(&self) -> usize {
        self.set_calls.load(Ordering::SeqCst)
    }

    /// Read straight from the backing store, bypassing counters and faults.
    pub async fn peek(&self, key: &str) -> Option<String> {
        self.inner.get(key).await.unwrap()
    }

    /// Seed the backing store directly.
    pub async fn seed(&self, key: &str, value: &str, ttl_secs: u64) {
        self.inner.set(key, value, ttl_secs).await.unwrap();
    }
}

#[async_trait]
impl CacheStore for FlakyStore {
    async fn get(&self, key: &str) -> CacheResult<Option<String>> {
        self.get_calls.fetch_add(1, Ordering::SeqCst);
        if self.hang_get.load(Ordering::SeqCst) {
            std::future::pending::<()>().await;
        }
        if self.fail_get.load(Ordering::SeqCst) {
            return Err(CacheError::Unavailable("injected read failure".into()));
        }
        self.inner.get(key).await
    }

    async fn set(&self, key: &str, value: &str, ttl_secs: u64) -> CacheResult<()> {
        self.set_calls.fetch_add(1, Ordering::SeqCst);
        if self.hang_set.load(Ordering::SeqCst) {
            std::future::pending::<()>().await;
        }
        if self.fail_set.load(Ordering::SeqCst) {
            return Err(CacheError::Unavailable("injected write failure".into()));
        }
        self.inner.set(key, value, ttl_secs).await
    }

    fn provider_name(&self) -> &'static str {
        "flaky"
    }
}

/// A full day of hourly data for `city` on `date`.
pub fn sample_forecast(city: &str, date: NaiveDate) -> RawForecastResponse {
    let day = date.format("%Y-%m-%d").to_string();
    RawForecastResponse {
        location: RawLocation {
            name: city.to_string(),
            region: "Region".into(),
            country: "Country".into(),
            lat: 51.52,
            lon: -0.11,
            ..RawLocation::default()
        },
        forecast: RawForecast {
            forecastday: vec![RawForecastDay {
                date: day.clone(),
                astro: RawAstro {
                    sunrise: "05:13 AM".into(),
                    sunset: "09:00 PM".into(),
                },
                hour: (0..24u32)
                    .map(|h| RawHour {
                        time: format!("{day} {h:02}:00"),
                        temp_c: 12.0 + f64::from(h) / 2.0,
                        condition: RawCondition {
                            text: "Partly cloudy".into(),
                            icon: "//cdn.weatherapi.com/weather/64x64/day/116.png".into(),
                        },
                        chance_of_rain: 20.0,
                        ..RawHour::default()
                    })
                    .collect(),
            }],
        },
        ..RawForecastResponse::default()
    }
}

pub fn sample_search(query: &str) -> Vec<RawSearchResult> {
    vec![RawSearchResult {
        id: 2801268,
        name: format!("{query} City"),
        region: "Region".into(),
        country: "Country".into(),
        lat: 51.52,
        lon: -0.11,
        url: format!("{}-city", query.to_lowercase()),
    }]
}

pub fn july_24() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 7, 24).unwrap()
}

pub fn resource(max_failures: u32, open_timeout_ms: u64, call_timeout_ms: u64, ttl: u64) -> ResourceConfig {
    ResourceConfig {
        max_failures,
        open_timeout_ms,
        call_timeout_ms,
        cache_ttl_secs: ttl,
    }
}

//! Response mapping.
//!
//! Pure functions from raw provider payloads to the records the gateway
//! serves and caches. Missing fields become `""`, `0` or `false`; mapping
//! never fails.

pub mod city;
pub mod forecast;
pub mod types;

pub use city::map_search;
pub use forecast::map_forecast;
pub use types::{CityResult, DailyForecast, HourlyWeather};

//! reqwest client for a weatherapi.com-compatible API.
//!
//! # Endpoints
//! - `GET {base}/forecast.json?key=&q=&dt=&days=1&aqi=no&alerts=no`
//! - `GET {base}/search.json?key=&q=`

use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::Client;
use serde::de::DeserializeOwned;

use crate::config::UpstreamConfig;
use crate::upstream::types::{RawForecastResponse, RawSearchResult};
use crate::upstream::{UpstreamError, WeatherProvider};

const USER_AGENT: &str = concat!("weather-gateway/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Clone)]
pub struct WeatherApiClient {
    http: Client,
    base_url: String,
    api_key: String,
}

impl WeatherApiClient {
    pub fn new(config: &UpstreamConfig) -> Result<Self, UpstreamError> {
        let http = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_millis(config.request_timeout_ms))
            .build()
            .map_err(|e| UpstreamError::Transport(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
        })
    }

    async fn get_json<T>(&self, endpoint: &str, query: &[(&str, &str)]) -> Result<T, UpstreamError>
    where
        T: DeserializeOwned,
    {
        let url = format!("{}/{endpoint}", self.base_url);
        let response = self
            .http
            .get(&url)
            .query(&[("key", self.api_key.as_str())])
            .query(query)
            .send()
            .await
            .map_err(|e| UpstreamError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            tracing::debug!(endpoint, status = status.as_u16(), "Upstream returned error status");
            return Err(UpstreamError::Status {
                status: status.as_u16(),
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| UpstreamError::Transport(e.to_string()))?;

        serde_json::from_slice(&body).map_err(|e| UpstreamError::Malformed(e.to_string()))
    }
}

#[async_trait]
impl WeatherProvider for WeatherApiClient {
    async fn forecast(
        &self,
        city: &str,
        date: NaiveDate,
    ) -> Result<RawForecastResponse, UpstreamError> {
        let dt = date.format("%Y-%m-%d").to_string();
        self.get_json(
            "forecast.json",
            &[
                ("q", city),
                ("dt", dt.as_str()),
                ("days", "1"),
                ("aqi", "no"),
                ("alerts", "no"),
            ],
        )
        .await
    }

    async fn search(&self, query: &str) -> Result<Vec<RawSearchResult>, UpstreamError> {
        self.get_json("search.json", &[("q", query)]).await
    }
}

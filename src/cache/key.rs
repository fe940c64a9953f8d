//! Cache key derivation.
//!
//! Format: `<resource>:<lowercased key>[:<YYYY-MM-DD>]`, e.g.
//! `weather:london:2025-07-24` or `city:lon`.

use std::fmt;

use chrono::NaiveDate;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

impl CacheKey {
    /// Key for an undated resource.
    pub fn new(resource: &str, key: &str) -> Self {
        Self(format!("{resource}:{}", key.to_lowercase()))
    }

    /// Key bucketed by calendar day.
    pub fn dated(resource: &str, key: &str, date: NaiveDate) -> Self {
        Self(format!(
            "{resource}:{}:{}",
            key.to_lowercase(),
            date.format("%Y-%m-%d")
        ))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

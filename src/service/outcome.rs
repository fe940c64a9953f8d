use serde::Serialize;

/// Where a payload came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Origin {
    Cache,
    Live,
}

impl Origin {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Cache => "cache",
            Self::Live => "live",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FetchOutcome<T> {
    pub payload: T,
    pub origin: Origin,
}

impl<T> FetchOutcome<T> {
    pub fn cached(payload: T) -> Self {
        Self {
            payload,
            origin: Origin::Cache,
        }
    }

    pub fn live(payload: T) -> Self {
        Self {
            payload,
            origin: Origin::Live,
        }
    }
}

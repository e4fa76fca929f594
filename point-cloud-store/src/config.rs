/// Container configuration with lenient, never-failing normalisation.
use crate::error::ConfigError;
use constants::store::{DEFAULT_CHUNK_CAPACITY, DEFAULT_YIELD_INTERVAL};
use serde::de::{Deserializer, IgnoredAny};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::warn;

/// Sizing and scheduling parameters handed to every container at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Maximum elements per chunk. Always at least 1.
    #[serde(deserialize_with = "deserialize_chunk_capacity")]
    pub chunk_capacity: usize,
    /// Elements processed between cooperative yields. Always at least 1.
    #[serde(deserialize_with = "deserialize_yield_interval")]
    pub yield_interval: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            chunk_capacity: DEFAULT_CHUNK_CAPACITY,
            yield_interval: DEFAULT_YIELD_INTERVAL,
        }
    }
}

impl StoreConfig {
    /// Build from raw, possibly signed caller values.
    /// Non-positive capacity clamps to 1, non-positive interval falls back to the default.
    pub fn clamped(chunk_capacity: i64, yield_interval: i64) -> Self {
        Self {
            chunk_capacity: normalize_chunk_capacity(chunk_capacity),
            yield_interval: normalize_yield_interval(yield_interval),
        }
    }

    pub fn with_chunk_capacity(mut self, chunk_capacity: usize) -> Self {
        self.chunk_capacity = chunk_capacity.max(1);
        self
    }

    pub fn with_yield_interval(mut self, yield_interval: usize) -> Self {
        self.yield_interval = if yield_interval == 0 {
            DEFAULT_YIELD_INTERVAL
        } else {
            yield_interval
        };
        self
    }

    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load from a JSON file. Only unreadable files or malformed JSON fail;
    /// odd field values are normalised.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let json = fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }
}

pub fn normalize_chunk_capacity(raw: i64) -> usize {
    if raw <= 0 {
        warn!(raw, "non-positive chunk capacity, clamping to 1");
        1
    } else {
        usize::try_from(raw).unwrap_or(usize::MAX)
    }
}

pub fn normalize_yield_interval(raw: i64) -> usize {
    if raw <= 0 {
        warn!(
            raw,
            fallback = DEFAULT_YIELD_INTERVAL,
            "non-positive yield interval, using default"
        );
        DEFAULT_YIELD_INTERVAL
    } else {
        usize::try_from(raw).unwrap_or(usize::MAX)
    }
}

/// Whatever a config author wrote for a numeric field.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawNumber {
    Integer(i64),
    Text(String),
    Other(IgnoredAny),
}

impl RawNumber {
    fn as_integer(&self) -> Option<i64> {
        match self {
            RawNumber::Integer(n) => Some(*n),
            RawNumber::Text(s) => s.trim().parse().ok(),
            RawNumber::Other(_) => None,
        }
    }
}

fn deserialize_chunk_capacity<'de, D: Deserializer<'de>>(d: D) -> Result<usize, D::Error> {
    let raw = RawNumber::deserialize(d)?;
    Ok(match raw.as_integer() {
        Some(n) => normalize_chunk_capacity(n),
        None => {
            warn!(
                fallback = DEFAULT_CHUNK_CAPACITY,
                "unparsable chunk capacity, using default"
            );
            DEFAULT_CHUNK_CAPACITY
        }
    })
}

fn deserialize_yield_interval<'de, D: Deserializer<'de>>(d: D) -> Result<usize, D::Error> {
    let raw = RawNumber::deserialize(d)?;
    Ok(match raw.as_integer() {
        Some(n) => normalize_yield_interval(n),
        None => {
            warn!(
                fallback = DEFAULT_YIELD_INTERVAL,
                "unparsable yield interval, using default"
            );
            DEFAULT_YIELD_INTERVAL
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_use_defaults() {
        let config = StoreConfig::from_json_str("{}").unwrap();
        assert_eq!(config, StoreConfig::default());
    }

    #[test]
    fn non_positive_capacity_clamps_to_one() {
        let config = StoreConfig::from_json_str(r#"{"chunk_capacity": -5}"#).unwrap();
        assert_eq!(config.chunk_capacity, 1);
        assert_eq!(StoreConfig::clamped(0, 10).chunk_capacity, 1);
    }

    #[test]
    fn bad_interval_falls_back() {
        let config =
            StoreConfig::from_json_str(r#"{"chunk_capacity": "250", "yield_interval": "soon"}"#)
                .unwrap();
        assert_eq!(config.chunk_capacity, 250);
        assert_eq!(config.yield_interval, DEFAULT_YIELD_INTERVAL);

        let config = StoreConfig::from_json_str(r#"{"yield_interval": 0}"#).unwrap();
        assert_eq!(config.yield_interval, DEFAULT_YIELD_INTERVAL);

        let config = StoreConfig::from_json_str(r#"{"yield_interval": null}"#).unwrap();
        assert_eq!(config.yield_interval, DEFAULT_YIELD_INTERVAL);
    }

    #[test]
    fn fractional_values_are_unparsable() {
        let config = StoreConfig::from_json_str(r#"{"chunk_capacity": 2.5}"#).unwrap();
        assert_eq!(config.chunk_capacity, DEFAULT_CHUNK_CAPACITY);
    }

    #[test]
    fn malformed_json_is_an_error() {
        assert!(StoreConfig::from_json_str("{chunk_capacity").is_err());
    }
}

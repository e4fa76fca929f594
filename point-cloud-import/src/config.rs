/// Importer settings, read from an optional JSON file.
use crate::error::ImportError;
use constants::store::{DEFAULT_BATCH_SIZE, MAX_BATCH_SIZE};
use point_cloud_store::StoreConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportConfig {
    /// Chunk sizing and yield cadence of the point columns.
    pub store: StoreConfig,
    /// Records per bulk append. 0 falls back to the default; larger values
    /// are capped at the chunk capacity so every batch is adopted whole.
    pub batch_size: usize,
    /// Keep only these classification codes. `None` keeps every point and
    /// switches ingestion to whole-batch appends.
    pub keep_classes: Option<Vec<u8>>,
    /// Rotate LAS Z-up coordinates into Y-up scene space.
    pub transform_coordinates: bool,
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            store: StoreConfig::default(),
            batch_size: DEFAULT_BATCH_SIZE,
            keep_classes: None,
            transform_coordinates: true,
        }
    }
}

impl ImportConfig {
    pub fn load(path: &Path) -> Result<Self, ImportError> {
        let json = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&json)?)
    }

    pub fn batch_size(&self) -> usize {
        let requested = if self.batch_size == 0 {
            DEFAULT_BATCH_SIZE
        } else {
            self.batch_size
        };
        requested
            .min(self.store.chunk_capacity.max(1))
            .min(MAX_BATCH_SIZE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_config_keeps_defaults() {
        let config: ImportConfig = serde_json::from_str(
            r#"{"store": {"chunk_capacity": 5000}, "keep_classes": [2, 11], "batch_size": 0}"#,
        )
        .unwrap();

        assert_eq!(config.store.chunk_capacity, 5000);
        assert_eq!(config.keep_classes, Some(vec![2, 11]));
        assert_eq!(config.batch_size(), 5000);
        assert!(config.transform_coordinates);
    }

    #[test]
    fn huge_batch_size_is_capped() {
        let config: ImportConfig =
            serde_json::from_str(r#"{"batch_size": 18446744073709551615}"#).unwrap();
        assert_eq!(config.batch_size(), DEFAULT_BATCH_SIZE);

        let unbounded = ImportConfig {
            store: StoreConfig::default().with_chunk_capacity(usize::MAX),
            batch_size: usize::MAX,
            ..ImportConfig::default()
        };
        assert_eq!(unbounded.batch_size(), MAX_BATCH_SIZE);
    }
}

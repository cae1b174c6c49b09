//! Behaviour switches for features and attribute bags.
//!
//! Every consumer accepts an explicit [`FeatureConfig`]. The process-wide
//! default is only consulted by the convenience methods that take none.

use std::fs;
use std::sync::RwLock;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::error::{FeatureError, Result};

static GLOBAL: Lazy<RwLock<FeatureConfig>> = Lazy::new(|| RwLock::new(FeatureConfig::default()));

/// Switches controlling lazy bounding boxes and indexed attribute writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FeatureConfig {
    /// Derive a missing bounding box from the geometry envelope on read.
    #[serde(default)]
    pub compute_bounding_box_when_missing: bool,
    /// Let an indexed write to an absent attribute insert it silently.
    #[serde(default)]
    pub add_attribute_with_indexer: bool,
}

impl FeatureConfig {
    /// Creates a configuration with both switches off.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_compute_bounding_box_when_missing(mut self, on: bool) -> Self {
        self.compute_bounding_box_when_missing = on;
        self
    }

    pub fn with_add_attribute_with_indexer(mut self, on: bool) -> Self {
        self.add_attribute_with_indexer = on;
        self
    }

    /// Loads a configuration from a JSON file.
    pub fn from_json(path: &str) -> Result<Self> {
        let data = fs::read_to_string(path)?;
        let config: Self =
            serde_json::from_str(&data).map_err(|e| FeatureError::Config(e.to_string()))?;
        log::debug!("loaded feature configuration from {path}: {config:?}");
        Ok(config)
    }

    /// Returns a copy of the process-wide default.
    pub fn global() -> Self {
        match GLOBAL.read() {
            Ok(guard) => *guard,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }

    /// Replaces the process-wide default.
    pub fn set_global(config: FeatureConfig) {
        let mut guard = match GLOBAL.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        *guard = config;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_off() {
        let config = FeatureConfig::new();
        assert!(!config.compute_bounding_box_when_missing);
        assert!(!config.add_attribute_with_indexer);
    }

    #[test]
    fn missing_fields_default_to_off() {
        let config: FeatureConfig =
            serde_json::from_str(r#"{ "add_attribute_with_indexer": true }"#).unwrap();
        assert!(config.add_attribute_with_indexer);
        assert!(!config.compute_bounding_box_when_missing);
    }

    #[test]
    fn builder_sets_switches() {
        let config = FeatureConfig::new()
            .with_compute_bounding_box_when_missing(true)
            .with_add_attribute_with_indexer(true);
        assert_eq!(
            config,
            FeatureConfig {
                compute_bounding_box_when_missing: true,
                add_attribute_with_indexer: true,
            }
        );
    }
}

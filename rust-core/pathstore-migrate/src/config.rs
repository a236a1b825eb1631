// SPDX-License-Identifier: PMPL-1.0-or-later
//! Migrator configuration.
//!
//! Defaults:
//! - strategy: diff
//! - marker_key: `/pathstore/migration`
//! - marker_value: `v1`

use serde::{Deserialize, Serialize};

use pathstore_storage::key::sanitize_key;
use pathstore_storage::{StorageError, StorageResult};

/// Reserved key recording a completed marker-strategy migration.
pub const DEFAULT_MARKER_KEY: &str = "/pathstore/migration";

/// Value stored under the marker key once a migration has finished.
pub const DEFAULT_MARKER_VALUE: &str = "v1";

/// How the migrator avoids redoing work on repeated runs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MigrationStrategy {
    /// List both sides and copy only keys missing from the destination.
    #[default]
    Diff,
    /// Copy everything once, then record completion under a marker key.
    Marker,
}

/// Configuration for the [`crate::Migrator`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MigratorConfig {
    /// Idempotency strategy.
    pub strategy: MigrationStrategy,
    /// Marker key, used by [`MigrationStrategy::Marker`] only.
    pub marker_key: String,
    /// Marker value, used by [`MigrationStrategy::Marker`] only.
    pub marker_value: String,
}

impl MigratorConfig {
    /// Check the settings, returning the canonical marker key.
    ///
    /// Marker settings are checked for every strategy.
    pub fn validate(&self) -> StorageResult<String> {
        let marker_key = sanitize_key(&self.marker_key).map_err(|_| {
            StorageError::InvalidConfig(format!(
                "marker_key {:?} is not a valid key",
                self.marker_key
            ))
        })?;
        if self.marker_value.is_empty() {
            return Err(StorageError::InvalidConfig(
                "marker_value must not be empty".to_string(),
            ));
        }
        Ok(marker_key)
    }
}

impl Default for MigratorConfig {
    fn default() -> Self {
        Self {
            strategy: MigrationStrategy::Diff,
            marker_key: DEFAULT_MARKER_KEY.to_string(),
            marker_value: DEFAULT_MARKER_VALUE.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = MigratorConfig::default();
        assert_eq!(config.strategy, MigrationStrategy::Diff);
        assert_eq!(config.validate().unwrap(), DEFAULT_MARKER_KEY);
    }

    #[test]
    fn test_marker_key_is_canonicalized() {
        let config = MigratorConfig {
            marker_key: "ops/migration/".to_string(),
            ..Default::default()
        };
        assert_eq!(config.validate().unwrap(), "/ops/migration");
    }

    #[test]
    fn test_invalid_marker_key() {
        for key in ["", "/", "ops//migration"] {
            let config = MigratorConfig {
                marker_key: key.to_string(),
                ..Default::default()
            };
            let err = config.validate().unwrap_err();
            assert!(err.is_invalid_config(), "key={key:?}");
            assert!(!err.is_invalid_key(), "key={key:?}");
        }
    }

    #[test]
    fn test_empty_marker_value() {
        let config = MigratorConfig {
            marker_value: String::new(),
            ..Default::default()
        };
        assert!(config.validate().unwrap_err().is_invalid_config());
    }

    #[test]
    fn test_deserialize_partial_config() {
        let config: MigratorConfig = serde_json::from_str(r#"{"strategy":"marker"}"#).unwrap();
        assert_eq!(config.strategy, MigrationStrategy::Marker);
        assert_eq!(config.marker_key, DEFAULT_MARKER_KEY);
        assert_eq!(config.marker_value, DEFAULT_MARKER_VALUE);
    }

    #[test]
    fn test_strategy_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&MigrationStrategy::Diff).unwrap(),
            r#""diff""#
        );
    }
}

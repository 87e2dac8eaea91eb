use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use quiz_core::model::{BandRatios, Level, LevelConfig};

use crate::repository::StorageError;

/// Persisted shape of a level configuration, validated into `LevelConfig` on load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LevelConfigRecord {
    pub level: Level,
    pub name: String,
    #[serde(default)]
    pub price_cents: u32,
    pub duration_secs: u32,
    pub target_count: u32,
    pub expected_accuracy: f64,
    pub expected_secs_per_question: u32,
    pub level_multiplier: f64,
    pub band_ratios: BandRatios,
}

impl LevelConfigRecord {
    #[must_use]
    pub fn from_config(config: &LevelConfig) -> Self {
        Self {
            level: config.level(),
            name: config.name().to_owned(),
            price_cents: config.price_cents(),
            duration_secs: config.duration_secs(),
            target_count: config.target_count(),
            expected_accuracy: config.expected_accuracy(),
            expected_secs_per_question: config.expected_secs_per_question(),
            level_multiplier: config.level_multiplier(),
            band_ratios: config.band_ratios(),
        }
    }

    /// Convert the record into a domain `LevelConfig`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::InvalidLevelConfig` if the values fail validation.
    pub fn into_config(self) -> Result<LevelConfig, StorageError> {
        let level = self.level;
        LevelConfig::new(
            level,
            self.name,
            self.price_cents,
            self.duration_secs,
            self.target_count,
            self.expected_accuracy,
            self.expected_secs_per_question,
            self.level_multiplier,
            self.band_ratios,
        )
        .map_err(|source| StorageError::InvalidLevelConfig { level, source })
    }
}

/// Level configuration table keyed by level.
#[derive(Debug, Clone, PartialEq)]
pub struct LevelCatalog {
    configs: HashMap<Level, LevelConfig>,
}

impl Default for LevelCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

impl LevelCatalog {
    /// Catalog holding the built-in constants for every level.
    #[must_use]
    pub fn builtin() -> Self {
        Self {
            configs: Level::ALL
                .into_iter()
                .map(|level| (level, LevelConfig::builtin(level)))
                .collect(),
        }
    }

    /// Catalog with no levels configured.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            configs: HashMap::new(),
        }
    }

    /// Replace (or add) the configuration for `config.level()`.
    #[must_use]
    pub fn with_config(mut self, config: LevelConfig) -> Self {
        self.configs.insert(config.level(), config);
        self
    }

    /// Start from the built-in table and apply overrides from a JSON array of records.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Serialization` on malformed JSON or
    /// `StorageError::InvalidLevelConfig` if a record fails validation.
    pub fn from_json_str(json: &str) -> Result<Self, StorageError> {
        let records: Vec<LevelConfigRecord> = serde_json::from_str(json)?;
        records
            .into_iter()
            .try_fold(Self::builtin(), |catalog, record| {
                Ok(catalog.with_config(record.into_config()?))
            })
    }

    #[must_use]
    pub fn get(&self, level: Level) -> Option<&LevelConfig> {
        self.configs.get(&level)
    }

    /// Resolve a caller-supplied level key. Unknown keys yield `None`.
    #[must_use]
    pub fn get_by_key(&self, key: &str) -> Option<&LevelConfig> {
        key.parse::<Level>().ok().and_then(|level| self.get(level))
    }
}

//! Engine configuration
//!
//! Level thresholds and the progress clamping policy, loadable from JSON. Every
//! field has a default, so `{}` is a valid configuration.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::EngineError;
use crate::level::{LevelScale, DEFAULT_LEVEL_THRESHOLDS};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Ascending level thresholds in minutes
    pub level_thresholds: Vec<u32>,
    /// Clamp level progress into `[0, 1]`
    pub clamp_progress: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            level_thresholds: DEFAULT_LEVEL_THRESHOLDS.to_vec(),
            clamp_progress: true,
        }
    }
}

impl EngineConfig {
    /// Parse and validate a JSON configuration
    pub fn from_json(json: &str) -> Result<Self, EngineError> {
        let config: EngineConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a JSON configuration file
    pub fn from_path(path: &Path) -> Result<Self, EngineError> {
        let json = fs::read_to_string(path).map_err(|e| {
            EngineError::InvalidConfig(format!("cannot read {}: {e}", path.display()))
        })?;
        Self::from_json(&json)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Reject thresholds that would make levels ambiguous or progress undefined
    pub fn validate(&self) -> Result<(), EngineError> {
        let thresholds = &self.level_thresholds;

        if thresholds.is_empty() {
            return Err(self.reject("level_thresholds must not be empty".to_string()));
        }
        if thresholds[0] == 0 {
            return Err(self.reject("first level threshold must be positive".to_string()));
        }
        if let Some(pair) = thresholds.windows(2).find(|w| w[0] >= w[1]) {
            return Err(self.reject(format!(
                "level_thresholds must be strictly ascending ({} >= {})",
                pair[0], pair[1]
            )));
        }

        Ok(())
    }

    /// Level scale described by this configuration
    pub fn level_scale(&self) -> LevelScale {
        LevelScale::new(self.level_thresholds.clone()).with_clamp_progress(self.clamp_progress)
    }

    fn reject(&self, reason: String) -> EngineError {
        tracing::warn!(thresholds = ?self.level_thresholds, %reason, "rejected engine config");
        EngineError::InvalidConfig(reason)
    }
}

//! Settings loading and merge-over-defaults semantics.

use crate::{ConfigError, Settings};
use log::{debug, info};
use serde_json::Value;
use std::fs;
use std::path::Path;

impl Settings {
    /// Load settings from a JSON5 file, merging over defaults.
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        info!("loading settings from path: {}", path.as_ref().display());
        let contents = fs::read_to_string(path)?;
        Self::load_from_str(&contents)
    }

    /// Load settings from JSON5 contents, merging over defaults.
    pub fn load_from_str(contents: &str) -> Result<Self, ConfigError> {
        debug!("loading settings from raw contents (len={})", contents.len());
        let value: Value = json5::from_str(contents)?;
        Self::from_value(value)
    }

    /// Decode a stored settings object; missing keys fall back to defaults,
    /// unknown keys are ignored.
    pub fn from_value(value: Value) -> Result<Self, ConfigError> {
        if !value.is_object() {
            return Err(ConfigError::Invalid(
                "settings must be a JSON object".to_string(),
            ));
        }
        let settings: Settings = serde_json::from_value(value)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Overlay a partial settings object on top of this record.
    ///
    /// Used by the CLI to apply a settings file over the stored sync scope.
    pub fn with_overrides(&self, overrides: &Value) -> Result<Self, ConfigError> {
        let overrides = overrides.as_object().ok_or_else(|| {
            ConfigError::Invalid("settings overrides must be a JSON object".to_string())
        })?;
        let mut merged = serde_json::to_value(self)?;
        let base = merged
            .as_object_mut()
            .ok_or_else(|| ConfigError::Invalid("settings record must serialize to an object".to_string()))?;
        for (key, value) in overrides {
            base.insert(key.clone(), value.clone());
        }
        Self::from_value(merged)
    }

    /// Validate invariants that cannot be expressed in serde.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.chance > 100 {
            return Err(ConfigError::Invalid(format!(
                "chance must be 0-100, got {}",
                self.chance
            )));
        }
        Ok(())
    }
}

//! Validation configuration.

use serde::{Deserialize, Serialize};

use crate::error::{RecordError, Result};

/// Source software that can only track a single individual.
pub const LIGHTNING_POSE: &str = "LightningPose";

/// Policy knobs shared by both validators.
///
/// The defaults reproduce the standard behaviour: `LightningPose` is the only
/// single-individual source, and generated names look like `individual_0`
/// and `keypoint_0`.
///
/// # Example
///
/// ```
/// use motion_records::ValidationConfig;
///
/// let config = ValidationConfig::default();
/// assert!(config.is_single_individual_source("LightningPose"));
/// assert_eq!(config.individual_prefix, "individual");
/// assert!(config.is_valid());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    /// Source software names that only support one individual.
    pub single_individual_sources: Vec<String>,

    /// Prefix for generated individual names.
    pub individual_prefix: String,

    /// Prefix for generated keypoint names.
    pub keypoint_prefix: String,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            single_individual_sources: vec![LIGHTNING_POSE.to_string()],
            individual_prefix: "individual".to_string(),
            keypoint_prefix: "keypoint".to_string(),
        }
    }
}

impl ValidationConfig {
    /// Adds a source software name to the single-individual set.
    #[must_use]
    pub fn with_single_individual_source(mut self, source: impl Into<String>) -> Self {
        let source = source.into();
        if !self.is_single_individual_source(&source) {
            self.single_individual_sources.push(source);
        }
        self
    }

    /// Sets the prefix for generated individual names.
    #[must_use]
    pub fn with_individual_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.individual_prefix = prefix.into();
        self
    }

    /// Sets the prefix for generated keypoint names.
    #[must_use]
    pub fn with_keypoint_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.keypoint_prefix = prefix.into();
        self
    }

    /// Returns `true` if `source` is limited to a single individual.
    #[must_use]
    pub fn is_single_individual_source(&self, source: &str) -> bool {
        self.single_individual_sources.iter().any(|s| s == source)
    }

    /// Returns `true` if all values are usable.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }

    /// Checks the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`RecordError::InvalidConfig`] if a name prefix is blank.
    pub fn validate(&self) -> Result<()> {
        if self.individual_prefix.trim().is_empty() {
            return Err(RecordError::invalid_config("individual_prefix must not be empty"));
        }
        if self.keypoint_prefix.trim().is_empty() {
            return Err(RecordError::invalid_config("keypoint_prefix must not be empty"));
        }
        Ok(())
    }

    /// Parses and validates a configuration from JSON.
    ///
    /// Missing keys fall back to their defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed or the result is invalid.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Serializes the configuration to pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| RecordError::invalid_config(e.to_string()))
    }

    /// Generates `count` names of the form `{prefix}_{i}`.
    pub(crate) fn generated_names(prefix: &str, count: usize) -> Vec<String> {
        (0..count).map(|i| format!("{prefix}_{i}")).collect()
    }
}

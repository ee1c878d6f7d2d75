//! Composition configuration model.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Result, StagewireError};
use crate::types::{DuplicatePolicy, ValidationPolicy};

/// Policies applied when building and invoking staged factories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CompositionConfig {
    /// Behaviour on duplicate names in one definition map.
    pub duplicate_policy: DuplicatePolicy,
    /// When supplied dependency values are type-checked.
    pub validation: ValidationPolicy,
    /// Whether merging contracts that share a name with the same type is allowed.
    pub allow_identical_merge: bool,
}

impl CompositionConfig {
    /// Returns the default configuration.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            duplicate_policy: DuplicatePolicy::Reject,
            validation: ValidationPolicy::Eager,
            allow_identical_merge: true,
        }
    }

    /// Parses a configuration from JSON. Missing fields take their defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed or names an unknown field.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Loads a configuration from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self> {
        tracing::debug!(path = %path.display(), "loading composition config");
        let content = std::fs::read_to_string(path).map_err(|e| StagewireError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::from_json(&content)
    }

    /// Reads the configuration from [`CONFIG_ENV_VAR`](crate::constants::CONFIG_ENV_VAR),
    /// falling back to the defaults when the variable is unset.
    ///
    /// # Errors
    ///
    /// Returns an error if the variable is set but does not hold valid JSON.
    pub fn from_env() -> Result<Self> {
        match std::env::var(crate::constants::CONFIG_ENV_VAR) {
            Ok(json) => Self::from_json(&json),
            Err(std::env::VarError::NotPresent) => Ok(Self::new()),
            Err(std::env::VarError::NotUnicode(_)) => Err(StagewireError::Config {
                message: format!("{} is not valid UTF-8", crate::constants::CONFIG_ENV_VAR),
            }),
        }
    }
}

impl Default for CompositionConfig {
    fn default() -> Self {
        Self::new()
    }
}

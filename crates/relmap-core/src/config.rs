//! Runtime configuration loaded from `relmap.toml`.

use crate::DEFAULT_MAX_INCLUDE_DEPTH;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error as ThisError;

/// Conventional config file name.
pub const CONFIG_FILE_NAME: &str = "relmap.toml";

///
/// ConfigError
///

#[derive(Debug, ThisError)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

///
/// RelmapConfig
///
/// ```toml
/// [model]
/// default_schema = "dbo"
///
/// [planner]
/// max_include_depth = 16
/// track_by_default = true
/// ```
///

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RelmapConfig {
    #[serde(default)]
    pub model: ModelConfig,

    #[serde(default)]
    pub planner: PlannerConfig,
}

///
/// ModelConfig
///

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ModelConfig {
    /// Schema used for entity types that do not declare one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_schema: Option<String>,
}

///
/// PlannerConfig
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(deny_unknown_fields)]
pub struct PlannerConfig {
    /// Longest include path the planner accepts.
    #[serde(default = "default_max_include_depth")]
    pub max_include_depth: usize,

    /// Tracking flag used when a caller does not pass one explicitly.
    #[serde(default = "default_track")]
    pub track_by_default: bool,
}

const fn default_max_include_depth() -> usize {
    DEFAULT_MAX_INCLUDE_DEPTH
}

const fn default_track() -> bool {
    true
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            max_include_depth: default_max_include_depth(),
            track_by_default: default_track(),
        }
    }
}

impl RelmapConfig {
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;

        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;

        Self::from_toml_str(&content)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.planner.max_include_depth == 0 {
            return Err(ConfigError::Invalid(
                "planner.max_include_depth must be at least 1".to_string(),
            ));
        }
        if self
            .model
            .default_schema
            .as_deref()
            .is_some_and(|schema| schema.trim().is_empty())
        {
            return Err(ConfigError::Invalid(
                "model.default_schema must not be blank".to_string(),
            ));
        }

        Ok(())
    }

    /// Default config file content with comments.
    #[must_use]
    pub const fn default_toml() -> &'static str {
        r#"# relmap configuration

[model]
# Schema applied to entity types that do not declare one.
# default_schema = "dbo"

[planner]
# Longest include path accepted by the planner.
max_include_depth = 16

# Track included root entities unless the caller says otherwise.
track_by_default = true
"#
    }
}

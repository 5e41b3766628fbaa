use std::path::Path;

use serde::Deserialize;

use crate::error::{DashboardError, Result};

pub const CONFIG_ENV: &str = "METAMORPET_CONFIG";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DashboardConfig {
    /// Clamp displayed percentages into 0..=100. Extracted values are never
    /// altered.
    pub clamp_display: bool,
    pub report_limit: usize,
    pub default_routine: Option<String>,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        DashboardConfig {
            clamp_display: true,
            report_limit: 10,
            default_routine: None,
        }
    }
}

impl DashboardConfig {
    pub fn from_toml(path: &Path, text: &str) -> Result<Self> {
        toml::from_str(text).map_err(|source| DashboardError::Config {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Reads the config file if one was named, otherwise falls back to
    /// defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let text = std::fs::read_to_string(path).map_err(|source| DashboardError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml(path, &text)?;
        tracing::debug!(path = %path.display(), ?config, "loaded config");
        Ok(config)
    }
}

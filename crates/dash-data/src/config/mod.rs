//! Data layer configuration

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::DataError;

/// Top-level data configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    /// Remote table polling
    pub polling: PollingConfig,

    /// Remote request shaping
    pub remote: RemoteConfig,
}

/// Polling configuration for remote tables
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PollingConfig {
    /// Master switch; when off no remote table polls
    pub enabled: bool,

    /// Intervals below this many seconds do not poll
    pub min_interval_secs: f64,
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            min_interval_secs: 1.0,
        }
    }
}

impl PollingConfig {
    /// Whether a connector interval should start a poll timer
    pub fn should_poll(&self, interval: Option<f64>) -> bool {
        self.enabled && interval.is_some_and(|secs| secs >= self.min_interval_secs)
    }
}

/// Remote request configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RemoteConfig {
    /// Header carrying the JSON filter spec on filtered-row requests
    pub filter_header: String,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            filter_header: "Filter-Spec".to_string(),
        }
    }
}

impl DataConfig {
    /// Load a configuration from a JSON file
    pub fn load(path: &Path) -> Result<Self, DataError> {
        let text = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }
}

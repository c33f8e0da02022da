//! Logging configuration

use crate::error::{RampartError, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::str::FromStr;

/// Line format of log output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Text,
    Json,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: "info".to_string(), format: LogFormat::Text }
    }
}

impl LoggingConfig {
    pub fn merge(&mut self, other: Self) {
        *self = other;
    }

    pub fn apply_env_vars(&mut self) -> Result<()> {
        if let Ok(level) = env::var("RAMPART_LOG_LEVEL") {
            self.level = level;
        }
        if let Ok(format) = env::var("RAMPART_LOG_FORMAT") {
            self.format = match format.trim().to_ascii_lowercase().as_str() {
                "text" => LogFormat::Text,
                "json" => LogFormat::Json,
                other => {
                    return Err(RampartError::Configuration(format!(
                        "RAMPART_LOG_FORMAT must be `text` or `json`, got `{}`",
                        other
                    )))
                }
            };
        }
        Ok(())
    }

    pub fn level_filter(&self) -> Result<log::LevelFilter> {
        log::LevelFilter::from_str(self.level.trim()).map_err(|_| {
            RampartError::Configuration(format!("unknown log level `{}`", self.level))
        })
    }

    pub fn validate(&self) -> Result<()> {
        self.level_filter().map(|_| ())
    }
}

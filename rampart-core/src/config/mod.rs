//! Configuration system for rampart
//!
//! Configuration values are resolved in the following order (highest priority wins):
//!
//! 1. **Code** (builder methods on each section) - Highest priority
//! 2. **Environment Variables** (`RAMPART_*`) - Override file config
//! 3. **Config File** (rampart.toml) - Override defaults
//! 4. **Defaults** - Lowest priority
//!
//! Malformed values are reported as [`RampartError::Configuration`]; they never
//! fall back to a default.
//!
//! # Example
//!
//! ```no_run
//! use rampart_core::config::RampartConfig;
//!
//! let config = RampartConfig::load()?;
//! println!("roles must be present: {}", config.access.must_have_roles);
//! # Ok::<(), rampart_core::RampartError>(())
//! ```

pub mod access;
pub mod cache;
pub mod logging;

pub use access::AccessConfig;
pub use cache::CacheConfig;
pub use logging::{LogFormat, LoggingConfig};

use crate::error::{RampartError, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;

/// Complete rampart configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RampartConfig {
    pub access: AccessConfig,
    pub cache: CacheConfig,
    pub logging: LoggingConfig,
}

impl RampartConfig {
    /// Load configuration with full supersedence chain from `rampart.toml`
    pub fn load() -> Result<Self> {
        Self::load_from("rampart.toml")
    }

    /// Load configuration from a specific file (if present), then the environment
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        let mut config = Self::default();

        if path.exists() {
            let file_config = Self::from_file(path)?;
            config.merge(file_config);
        }

        config.apply_env_vars()?;
        config.validate()?;

        Ok(config)
    }

    /// Load configuration from TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            RampartError::Configuration(format!(
                "failed to read config file {}: {}",
                path.display(),
                e
            ))
        })?;

        Self::from_toml(&content).map_err(|e| match e {
            RampartError::Configuration(msg) => {
                RampartError::Configuration(format!("{}: {}", path.display(), msg))
            }
            other => other,
        })
    }

    /// Parse configuration from a TOML string
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| RampartError::Configuration(e.to_string()))
    }

    /// Merge another config into this one (other takes priority)
    pub fn merge(&mut self, other: Self) {
        self.access.merge(other.access);
        self.cache.merge(other.cache);
        self.logging.merge(other.logging);
    }

    /// Apply environment variables to configuration
    pub fn apply_env_vars(&mut self) -> Result<()> {
        self.access.apply_env_vars()?;
        self.cache.apply_env_vars()?;
        self.logging.apply_env_vars()?;
        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        self.access.validate()?;
        self.cache.validate()?;
        self.logging.validate()?;
        Ok(())
    }
}

/// Read a boolean environment variable; anything but `true`/`false`/`1`/`0` is an error
pub(crate) fn env_bool(name: &str) -> Result<Option<bool>> {
    match env::var(name) {
        Ok(raw) => parse_bool(name, &raw).map(Some),
        Err(_) => Ok(None),
    }
}

/// Read an unsigned integer environment variable
pub(crate) fn env_u64(name: &str) -> Result<Option<u64>> {
    match env::var(name) {
        Ok(raw) => raw.trim().parse::<u64>().map(Some).map_err(|_| {
            RampartError::Configuration(format!("{} must be a non-negative integer, got `{}`", name, raw))
        }),
        Err(_) => Ok(None),
    }
}

pub(crate) fn parse_bool(name: &str, raw: &str) -> Result<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" => Ok(true),
        "false" | "0" => Ok(false),
        _ => Err(RampartError::Configuration(format!(
            "{} must be a boolean, got `{}`",
            name, raw
        ))),
    }
}

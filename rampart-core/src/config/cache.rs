//! Role cache configuration

use super::{env_bool, env_u64};
use crate::error::{RampartError, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub enabled: bool,
    /// Lifetime of an entry; 0 keeps entries until they are deleted
    pub ttl_secs: u64,
    /// Grace window during which an expired entry is still served while one caller recomputes it
    pub race_condition_ttl_secs: u64,
    /// Key prefix reserved for rampart in a shared backing store
    pub namespace: String,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            ttl_secs: 3600,
            race_condition_ttl_secs: 10,
            namespace: "rampart".to_string(),
        }
    }
}

impl CacheConfig {
    /// Caching switched off; every lookup goes to the role store
    pub fn disabled() -> Self {
        Self { enabled: false, ..Self::default() }
    }

    pub fn with_ttl_secs(mut self, ttl_secs: u64) -> Self {
        self.ttl_secs = ttl_secs;
        self
    }

    pub fn with_race_condition_ttl_secs(mut self, secs: u64) -> Self {
        self.race_condition_ttl_secs = secs;
        self
    }

    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }

    pub fn ttl(&self) -> Option<Duration> {
        (self.ttl_secs > 0).then_some(Duration::from_secs(self.ttl_secs))
    }

    pub fn race_condition_ttl(&self) -> Duration {
        Duration::from_secs(self.race_condition_ttl_secs)
    }

    pub fn merge(&mut self, other: Self) {
        *self = other;
    }

    pub fn apply_env_vars(&mut self) -> Result<()> {
        if let Some(enabled) = env_bool("RAMPART_CACHE_ENABLED")? {
            self.enabled = enabled;
        }
        if let Some(ttl) = env_u64("RAMPART_CACHE_TTL_SECS")? {
            self.ttl_secs = ttl;
        }
        if let Some(grace) = env_u64("RAMPART_CACHE_RACE_CONDITION_TTL_SECS")? {
            self.race_condition_ttl_secs = grace;
        }
        if let Ok(namespace) = env::var("RAMPART_CACHE_NAMESPACE") {
            self.namespace = namespace;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.namespace.trim().is_empty() || self.namespace.contains(':') {
            return Err(RampartError::Configuration(format!(
                "cache namespace must be non-empty and must not contain ':', got `{}`",
                self.namespace
            )));
        }
        Ok(())
    }
}

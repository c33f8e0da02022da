//! Access decision configuration

use super::env_bool;
use crate::error::{RampartError, Result};
use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AccessConfig {
    /// A principal without any role in the rule's context fails even roleless rules
    pub must_have_roles: bool,
    /// Receiver method that yields the current principal
    pub principal_method: String,
    /// Run the integrity check at startup rather than before the first authorization
    pub eager_integrity_check: bool,
    /// Forward denials to the audit sink
    pub audit_denials: bool,
}

impl Default for AccessConfig {
    fn default() -> Self {
        Self {
            must_have_roles: false,
            principal_method: "current_user".to_string(),
            eager_integrity_check: true,
            audit_denials: true,
        }
    }
}

impl AccessConfig {
    pub fn with_must_have_roles(mut self, must_have_roles: bool) -> Self {
        self.must_have_roles = must_have_roles;
        self
    }

    pub fn with_principal_method(mut self, method: impl Into<String>) -> Self {
        self.principal_method = method.into();
        self
    }

    pub fn with_eager_integrity_check(mut self, eager: bool) -> Self {
        self.eager_integrity_check = eager;
        self
    }

    pub fn with_audit_denials(mut self, audit: bool) -> Self {
        self.audit_denials = audit;
        self
    }

    pub fn merge(&mut self, other: Self) {
        *self = other;
    }

    pub fn apply_env_vars(&mut self) -> Result<()> {
        if let Some(must_have_roles) = env_bool("RAMPART_MUST_HAVE_ROLES")? {
            self.must_have_roles = must_have_roles;
        }
        if let Ok(method) = env::var("RAMPART_PRINCIPAL_METHOD") {
            self.principal_method = method;
        }
        if let Some(eager) = env_bool("RAMPART_EAGER_INTEGRITY_CHECK")? {
            self.eager_integrity_check = eager;
        }
        if let Some(audit) = env_bool("RAMPART_AUDIT_DENIALS")? {
            self.audit_denials = audit;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        let method = self.principal_method.trim();
        if method.is_empty() || !method.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
            return Err(RampartError::Configuration(format!(
                "principal_method must be a method name, got `{}`",
                self.principal_method
            )));
        }
        Ok(())
    }
}

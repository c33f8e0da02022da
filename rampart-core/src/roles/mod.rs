//! Principals, roles and role assignments
//!
//! A role is a name scoped to an [`AuthorizationContext`]: `admin` in the
//! global context is a different role from `admin` on `Post`, which is again
//! different from `admin` on `Post#42`. Principals hold roles through
//! assignments kept by a [`RoleStore`]; lookups and mutations go through the
//! [`RoleDirectory`], which keeps the role cache in step with the store.

mod directory;
mod memory;
mod store;

pub use directory::RoleDirectory;
pub use memory::MemoryRoleStore;
pub use store::RoleStore;

use crate::context::AuthorizationContext;
use crate::error::{RampartError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Stable identifier of a principal
pub type PrincipalId = String;

/// Name of a role, e.g. `"admin"`
pub type RoleName = String;

/// Ordered set of role names
pub type RoleSet = BTreeSet<RoleName>;

/// Storage identifier of a persisted role
pub type RoleId = u64;

/// An actor that can hold roles
///
/// Host types (a user model, a service account) implement this instead of
/// inheriting role behaviour. Unauthenticated callers are represented by
/// [`AnonymousPrincipal`].
pub trait Roleable: Send + Sync {
    /// Identifier used for role lookups, `None` for an anonymous actor
    fn roleable_id(&self) -> Option<PrincipalId>;

    fn is_anonymous(&self) -> bool {
        self.roleable_id().is_none()
    }
}

/// Null-object principal: holds no roles and cannot be assigned any
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AnonymousPrincipal;

impl Roleable for AnonymousPrincipal {
    fn roleable_id(&self) -> Option<PrincipalId> {
        None
    }
}

/// Minimal identified principal
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Principal {
    pub id: PrincipalId,
}

impl Principal {
    pub fn new(id: impl Into<PrincipalId>) -> Self {
        Self { id: id.into() }
    }
}

impl Roleable for Principal {
    fn roleable_id(&self) -> Option<PrincipalId> {
        Some(self.id.clone())
    }
}

/// A role row as held by the role store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedRole {
    pub id: RoleId,
    pub name: RoleName,
    pub context: AuthorizationContext,
}

/// Check and normalize a role name
///
/// Surrounding whitespace is dropped; what remains must be a non-empty run of
/// lowercase ASCII letters, digits and underscores.
pub fn validate_role_name(raw: &str) -> Result<RoleName> {
    let name = raw.trim();
    if name.is_empty() {
        return Err(RampartError::InvalidArgument("role name is empty".to_string()));
    }
    if !name.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_') {
        return Err(RampartError::InvalidArgument(format!(
            "role name `{}` may only contain lowercase letters, digits and underscores",
            raw
        )));
    }
    Ok(name.to_string())
}

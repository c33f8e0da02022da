//! Role storage trait

use super::{PersistedRole, RoleId, RoleSet};
use crate::context::AuthorizationContext;
use anyhow::Result;

/// Role storage trait
///
/// Implement this trait to keep roles and assignments in a durable backend.
/// Lookups are exact: roles assigned in one context are never reported for
/// another.
#[async_trait::async_trait]
pub trait RoleStore: Send + Sync {
    /// Names of the roles `principal` holds in `context`
    async fn roles_for(&self, principal: &str, context: &AuthorizationContext) -> Result<RoleSet>;

    /// Assign `role` in `context`, creating the role if needed
    ///
    /// Returns the principal's roles in `context` after the assignment.
    async fn assign(&self, principal: &str, role: &str, context: &AuthorizationContext) -> Result<RoleSet>;

    /// Remove the assignment of `role` in `context`
    ///
    /// Returns the principal's roles in `context` after the revocation.
    async fn revoke(&self, principal: &str, role: &str, context: &AuthorizationContext) -> Result<RoleSet>;

    /// Every persisted role, assigned or not
    async fn persisted_roles(&self) -> Result<Vec<PersistedRole>>;

    /// Delete roles together with their assignments as one atomic operation
    ///
    /// Returns the number of roles deleted.
    async fn delete_roles(&self, ids: &[RoleId]) -> Result<usize>;
}

#[async_trait::async_trait]
impl<S: RoleStore> RoleStore for std::sync::Arc<S> {
    async fn roles_for(&self, principal: &str, context: &AuthorizationContext) -> Result<RoleSet> {
        (**self).roles_for(principal, context).await
    }

    async fn assign(&self, principal: &str, role: &str, context: &AuthorizationContext) -> Result<RoleSet> {
        (**self).assign(principal, role, context).await
    }

    async fn revoke(&self, principal: &str, role: &str, context: &AuthorizationContext) -> Result<RoleSet> {
        (**self).revoke(principal, role, context).await
    }

    async fn persisted_roles(&self) -> Result<Vec<PersistedRole>> {
        (**self).persisted_roles().await
    }

    async fn delete_roles(&self, ids: &[RoleId]) -> Result<usize> {
        (**self).delete_roles(ids).await
    }
}

//! Cached role queries and mutations for principals

use super::store::RoleStore;
use super::{validate_role_name, Roleable, RoleSet};
use crate::cache::{RoleCache, RoleCacheKey};
use crate::context::{resolve, AuthorizationContext, ContextValue};
use crate::error::{RampartError, Result};
use std::sync::Arc;

/// Role lookups through the role cache, and role changes that keep it fresh
///
/// Every mutation deletes exactly the cache entry for the affected
/// `(principal, context)` pair once the store has applied it.
#[derive(Clone)]
pub struct RoleDirectory {
    store: Arc<dyn RoleStore>,
    cache: RoleCache,
}

impl RoleDirectory {
    pub fn new(store: Arc<dyn RoleStore>, cache: RoleCache) -> Self {
        Self { store, cache }
    }

    pub fn store(&self) -> &Arc<dyn RoleStore> {
        &self.store
    }

    pub fn cache(&self) -> &RoleCache {
        &self.cache
    }

    /// Roles held by `principal` in exactly `context`
    ///
    /// An anonymous principal holds no roles.
    pub async fn roles_in(&self, principal: &dyn Roleable, context: &AuthorizationContext) -> Result<RoleSet> {
        let Some(principal_id) = principal.roleable_id() else {
            return Ok(RoleSet::new());
        };

        let key = RoleCacheKey::new(principal_id.clone(), context.clone());
        let store = Arc::clone(&self.store);
        let context = context.clone();
        self.cache
            .fetch(&key, || async move {
                let roles = store.roles_for(&principal_id, &context).await?;
                Ok(roles)
            })
            .await
    }

    pub async fn has_role(
        &self,
        principal: &dyn Roleable,
        role: &str,
        context: impl Into<ContextValue>,
    ) -> Result<bool> {
        let context = resolve(&context.into())?;
        Ok(self.roles_in(principal, &context).await?.contains(role.trim()))
    }

    pub async fn has_any_role<I, S>(
        &self,
        principal: &dyn Roleable,
        roles: I,
        context: impl Into<ContextValue>,
    ) -> Result<bool>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let context = resolve(&context.into())?;
        let held = self.roles_in(principal, &context).await?;
        Ok(roles.into_iter().any(|role| held.contains(role.as_ref().trim())))
    }

    /// Assign `role` in `context`; returns the principal's roles there afterwards
    pub async fn add_role(
        &self,
        principal: &dyn Roleable,
        role: &str,
        context: impl Into<ContextValue>,
    ) -> Result<RoleSet> {
        let (principal_id, role, context) = Self::mutation_target(principal, role, context.into())?;
        let roles = self.store.assign(&principal_id, &role, &context).await?;
        log::info!("Assigned role `{}` to {} in {}", role, principal_id, context);
        self.cache.delete(&[RoleCacheKey::new(principal_id, context)]).await;
        Ok(roles)
    }

    /// Revoke `role` in `context`; returns the principal's roles there afterwards
    pub async fn remove_role(
        &self,
        principal: &dyn Roleable,
        role: &str,
        context: impl Into<ContextValue>,
    ) -> Result<RoleSet> {
        let (principal_id, role, context) = Self::mutation_target(principal, role, context.into())?;
        let roles = self.store.revoke(&principal_id, &role, &context).await?;
        log::info!("Revoked role `{}` from {} in {}", role, principal_id, context);
        self.cache.delete(&[RoleCacheKey::new(principal_id, context)]).await;
        Ok(roles)
    }

    fn mutation_target(
        principal: &dyn Roleable,
        role: &str,
        context: ContextValue,
    ) -> Result<(String, String, AuthorizationContext)> {
        let principal_id = principal.roleable_id().ok_or_else(|| {
            RampartError::InvalidArgument("roles cannot be assigned to an anonymous principal".to_string())
        })?;
        let role = validate_role_name(role)?;
        let context = resolve(&context)?;
        Ok((principal_id, role, context))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CacheConfig;
    use crate::roles::{AnonymousPrincipal, MemoryRoleStore, Principal};

    fn directory() -> (RoleDirectory, Arc<MemoryRoleStore>) {
        let store = Arc::new(MemoryRoleStore::new());
        let directory = RoleDirectory::new(store.clone(), RoleCache::new(CacheConfig::default()));
        (directory, store)
    }

    #[tokio::test]
    async fn test_add_role_is_visible_through_the_cache() {
        let (directory, _) = directory();
        let alice = Principal::new("alice");

        // Prime the cache with the empty set
        assert!(!directory.has_role(&alice, "admin", ContextValue::Global).await.unwrap());

        let roles = directory.add_role(&alice, "admin", ContextValue::Global).await.unwrap();
        assert!(roles.contains("admin"));
        assert!(directory.has_role(&alice, "admin", ContextValue::Global).await.unwrap());

        directory.remove_role(&alice, "admin", ContextValue::Global).await.unwrap();
        assert!(!directory.has_role(&alice, "admin", ContextValue::Global).await.unwrap());
    }

    #[tokio::test]
    async fn test_roles_are_isolated_per_context() {
        let (directory, _) = directory();
        let alice = Principal::new("alice");
        let post = ContextValue::Instance { type_name: "Post".into(), id: Some("1".into()) };

        directory.add_role(&alice, "editor", post.clone()).await.unwrap();
        assert!(directory.has_role(&alice, "editor", post).await.unwrap());
        assert!(!directory.has_role(&alice, "editor", ContextValue::of_type("Post")).await.unwrap());
        assert!(!directory.has_role(&alice, "editor", ContextValue::Global).await.unwrap());
    }

    #[tokio::test]
    async fn test_has_any_role() {
        let (directory, _) = directory();
        let bob = Principal::new("bob");
        directory.add_role(&bob, "viewer", ContextValue::Global).await.unwrap();

        assert!(directory.has_any_role(&bob, ["admin", "viewer"], ContextValue::Global).await.unwrap());
        assert!(!directory.has_any_role(&bob, ["admin"], ContextValue::Global).await.unwrap());
        assert!(!directory.has_any_role(&bob, Vec::<String>::new(), ContextValue::Global).await.unwrap());
    }

    #[tokio::test]
    async fn test_anonymous_principal_has_no_roles_and_cannot_be_assigned() {
        let (directory, store) = directory();

        assert!(directory.roles_in(&AnonymousPrincipal, &AuthorizationContext::GLOBAL).await.unwrap().is_empty());
        let err = directory.add_role(&AnonymousPrincipal, "admin", ContextValue::Global).await.unwrap_err();
        assert!(matches!(err, RampartError::InvalidArgument(_)));
        assert!(store.persisted_roles().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_invalid_mutations_never_reach_the_store() {
        let (directory, store) = directory();
        let alice = Principal::new("alice");

        let bad_name = directory.add_role(&alice, "Site Admin", ContextValue::Global).await;
        assert!(matches!(bad_name, Err(RampartError::InvalidArgument(_))));

        let unsaved = ContextValue::Instance { type_name: "Post".into(), id: None };
        let bad_context = directory.add_role(&alice, "editor", unsaved).await;
        assert!(matches!(bad_context, Err(RampartError::InvalidContext(_))));

        assert!(store.persisted_roles().await.unwrap().is_empty());
    }
}

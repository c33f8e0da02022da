//! In-memory role storage
//!
//! Roles and assignments live in two tables behind one `RwLock`, so a
//! multi-row deletion is atomic with respect to every other operation.
//! Suitable for tests and single-process deployments.

use super::store::RoleStore;
use super::{PersistedRole, PrincipalId, RoleId, RoleSet};
use crate::context::AuthorizationContext;
use anyhow::{anyhow, Result};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

#[derive(Debug, Default)]
struct RoleTables {
    next_id: RoleId,
    roles: BTreeMap<RoleId, PersistedRole>,
    assignments: BTreeSet<(PrincipalId, RoleId)>,
}

impl RoleTables {
    fn find_role(&self, name: &str, context: &AuthorizationContext) -> Option<RoleId> {
        self.roles
            .values()
            .find(|role| role.name == name && &role.context == context)
            .map(|role| role.id)
    }

    fn ensure_role(&mut self, name: &str, context: &AuthorizationContext) -> RoleId {
        if let Some(id) = self.find_role(name, context) {
            return id;
        }
        self.next_id += 1;
        let id = self.next_id;
        self.roles.insert(id, PersistedRole { id, name: name.to_string(), context: context.clone() });
        id
    }

    fn roles_for(&self, principal: &str, context: &AuthorizationContext) -> RoleSet {
        self.assignments
            .iter()
            .filter(|(holder, _)| holder == principal)
            .filter_map(|(_, id)| self.roles.get(id))
            .filter(|role| &role.context == context)
            .map(|role| role.name.clone())
            .collect()
    }

    fn is_assigned(&self, id: RoleId) -> bool {
        self.assignments.iter().any(|(_, assigned)| *assigned == id)
    }
}

/// In-memory role store
///
/// Revoking the last assignment of a role deletes the role itself.
#[derive(Clone, Default)]
pub struct MemoryRoleStore {
    tables: Arc<RwLock<RoleTables>>,
}

impl MemoryRoleStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Persist a role without assigning it to anyone
    pub fn insert_role(&self, name: &str, context: AuthorizationContext) -> Result<RoleId> {
        Ok(self.write()?.ensure_role(name, &context))
    }

    /// Number of role assignments currently held
    pub fn assignment_count(&self) -> Result<usize> {
        Ok(self.read()?.assignments.len())
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, RoleTables>> {
        self.tables.read().map_err(|_| anyhow!("role store lock poisoned"))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, RoleTables>> {
        self.tables.write().map_err(|_| anyhow!("role store lock poisoned"))
    }
}

#[async_trait::async_trait]
impl RoleStore for MemoryRoleStore {
    async fn roles_for(&self, principal: &str, context: &AuthorizationContext) -> Result<RoleSet> {
        Ok(self.read()?.roles_for(principal, context))
    }

    async fn assign(&self, principal: &str, role: &str, context: &AuthorizationContext) -> Result<RoleSet> {
        let mut tables = self.write()?;
        let id = tables.ensure_role(role, context);
        tables.assignments.insert((principal.to_string(), id));
        Ok(tables.roles_for(principal, context))
    }

    async fn revoke(&self, principal: &str, role: &str, context: &AuthorizationContext) -> Result<RoleSet> {
        let mut tables = self.write()?;
        if let Some(id) = tables.find_role(role, context) {
            tables.assignments.remove(&(principal.to_string(), id));
            if !tables.is_assigned(id) {
                tables.roles.remove(&id);
            }
        }
        Ok(tables.roles_for(principal, context))
    }

    async fn persisted_roles(&self) -> Result<Vec<PersistedRole>> {
        Ok(self.read()?.roles.values().cloned().collect())
    }

    async fn delete_roles(&self, ids: &[RoleId]) -> Result<usize> {
        let mut tables = self.write()?;
        let doomed: BTreeSet<RoleId> = ids.iter().copied().collect();
        tables.assignments.retain(|(_, id)| !doomed.contains(id));
        let before = tables.roles.len();
        tables.roles.retain(|id, _| !doomed.contains(id));
        Ok(before - tables.roles.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::{resolve, ContextValue};

    fn post(id: &str) -> AuthorizationContext {
        resolve(&ContextValue::Instance { type_name: "Post".into(), id: Some(id.into()) }).unwrap()
    }

    #[tokio::test]
    async fn test_assign_and_lookup_are_context_exact() {
        let store = MemoryRoleStore::new();
        let roles = store.assign("1", "admin", &AuthorizationContext::GLOBAL).await.unwrap();
        assert!(roles.contains("admin"));

        assert!(store.roles_for("1", &post("5")).await.unwrap().is_empty());
        assert!(store.roles_for("2", &AuthorizationContext::GLOBAL).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_assign_reuses_existing_role() {
        let store = MemoryRoleStore::new();
        store.assign("1", "editor", &post("5")).await.unwrap();
        store.assign("2", "editor", &post("5")).await.unwrap();
        assert_eq!(store.persisted_roles().await.unwrap().len(), 1);
        assert_eq!(store.assignment_count().unwrap(), 2);
    }

    #[tokio::test]
    async fn test_revoke_drops_unassigned_role() {
        let store = MemoryRoleStore::new();
        store.assign("1", "editor", &post("5")).await.unwrap();
        store.assign("2", "editor", &post("5")).await.unwrap();

        let remaining = store.revoke("1", "editor", &post("5")).await.unwrap();
        assert!(remaining.is_empty());
        assert_eq!(store.persisted_roles().await.unwrap().len(), 1);

        store.revoke("2", "editor", &post("5")).await.unwrap();
        assert!(store.persisted_roles().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_delete_roles_removes_assignments() {
        let store = MemoryRoleStore::new();
        store.assign("1", "editor", &post("5")).await.unwrap();
        store.assign("1", "admin", &AuthorizationContext::GLOBAL).await.unwrap();
        let unassigned = store.insert_role("viewer", post("6")).unwrap();

        let editor = store
            .persisted_roles()
            .await
            .unwrap()
            .into_iter()
            .find(|role| role.name == "editor")
            .map(|role| role.id)
            .unwrap();

        assert_eq!(store.delete_roles(&[editor, unassigned, 999]).await.unwrap(), 2);
        assert_eq!(store.assignment_count().unwrap(), 1);
        assert!(store.roles_for("1", &post("5")).await.unwrap().is_empty());
        assert!(store.roles_for("1", &AuthorizationContext::GLOBAL).await.unwrap().contains("admin"));
    }
}

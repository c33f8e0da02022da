//! Consistency checks between declared rules, persisted roles and the application
//!
//! Run once all rules are registered. Rules naming actions a resource does not
//! implement, and persisted roles scoped to a type that no longer exists, are
//! fatal. Roles scoped to a deleted instance are removed.

use crate::error::{IntegrityError, Result};
use crate::persistence::PersistenceLookup;
use crate::registry::RuleRegistry;
use crate::resource::ResourceCatalog;
use crate::roles::{RoleDirectory, RoleId};
use serde::Serialize;
use std::collections::BTreeSet;
use std::sync::Arc;

/// Outcome of a successful integrity run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IntegrityReport {
    /// Resources whose action rules were checked against the catalog
    pub resources_checked: usize,
    /// Distinct context types referenced by persisted roles
    pub context_types: BTreeSet<String>,
    pub orphaned_roles_removed: usize,
}

pub struct IntegrityChecker<R> {
    registry: Arc<RuleRegistry<R>>,
    catalog: Arc<dyn ResourceCatalog>,
    directory: RoleDirectory,
    lookup: Arc<dyn PersistenceLookup>,
}

impl<R> IntegrityChecker<R> {
    pub fn new(
        registry: Arc<RuleRegistry<R>>,
        catalog: Arc<dyn ResourceCatalog>,
        directory: RoleDirectory,
        lookup: Arc<dyn PersistenceLookup>,
    ) -> Self {
        Self { registry, catalog, directory, lookup }
    }

    /// Run every check; the first fatal inconsistency is returned as an error
    pub async fn run(&self) -> Result<IntegrityReport> {
        let resources_checked = self.check_actions()?;
        let context_types = self.check_context_types().await?;
        let orphaned_roles_removed = self.remove_orphaned_roles().await?;

        log::info!(
            "Integrity check passed: {} resources, {} context types, {} orphaned roles removed",
            resources_checked,
            context_types.len(),
            orphaned_roles_removed
        );

        Ok(IntegrityReport { resources_checked, context_types, orphaned_roles_removed })
    }

    fn check_actions(&self) -> Result<usize> {
        let declared = self.registry.declared_actions();
        for (resource, actions) in &declared {
            let actual = self.catalog.actions_of(resource).unwrap_or_default();
            let missing: Vec<String> = actions.difference(&actual).cloned().collect();
            if !missing.is_empty() {
                log::error!("Rules on {} reference unknown actions: {:?}", resource, missing);
                return Err(IntegrityError::MissingActions { resource: resource.clone(), actions: missing }.into());
            }
        }
        Ok(declared.len())
    }

    async fn check_context_types(&self) -> Result<BTreeSet<String>> {
        let types: BTreeSet<String> = self
            .directory
            .store()
            .persisted_roles()
            .await?
            .into_iter()
            .filter_map(|role| role.context.type_name().map(str::to_string))
            .collect();

        for type_name in &types {
            if !self.lookup.type_exists(type_name).await? {
                log::error!("Persisted roles reference missing context type {}", type_name);
                return Err(IntegrityError::MissingContextType { type_name: type_name.clone() }.into());
            }
        }
        Ok(types)
    }

    async fn remove_orphaned_roles(&self) -> Result<usize> {
        let mut orphaned: Vec<RoleId> = Vec::new();
        for role in self.directory.store().persisted_roles().await? {
            let (Some(type_name), Some(id)) = (role.context.type_name(), role.context.id()) else {
                continue;
            };
            if !self.lookup.instance_exists(type_name, id).await? {
                log::debug!("Role `{}` on {} is orphaned", role.name, role.context);
                orphaned.push(role.id);
            }
        }

        if orphaned.is_empty() {
            return Ok(0);
        }

        let removed = self.directory.store().delete_roles(&orphaned).await?;
        if removed > 0 {
            self.directory.cache().clear().await;
            log::info!("Removed {} roles scoped to deleted instances", removed);
        }
        Ok(removed)
    }
}

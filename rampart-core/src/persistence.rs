//! Lookups against the application's durable models

use crate::context::{Identifier, TypeName};
use anyhow::{anyhow, Result};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::RwLock;

/// Resolves context types and instances against durable storage
#[async_trait::async_trait]
pub trait PersistenceLookup: Send + Sync {
    /// Whether `type_name` still names a model
    async fn type_exists(&self, type_name: &str) -> Result<bool>;

    /// Whether the instance `id` of `type_name` still exists
    async fn instance_exists(&self, type_name: &str, id: &str) -> Result<bool>;
}

/// In-memory model registry
#[derive(Debug, Default)]
pub struct MemoryPersistence {
    models: RwLock<BTreeMap<TypeName, BTreeSet<Identifier>>>,
}

impl MemoryPersistence {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_type(&self, type_name: impl Into<TypeName>) -> Result<()> {
        self.models
            .write()
            .map_err(|_| anyhow!("persistence lock poisoned"))?
            .entry(type_name.into())
            .or_default();
        Ok(())
    }

    pub fn insert(&self, type_name: impl Into<TypeName>, id: impl Into<Identifier>) -> Result<()> {
        self.models
            .write()
            .map_err(|_| anyhow!("persistence lock poisoned"))?
            .entry(type_name.into())
            .or_default()
            .insert(id.into());
        Ok(())
    }

    /// Delete one instance; returns whether it existed
    pub fn remove(&self, type_name: &str, id: &str) -> Result<bool> {
        let mut models = self.models.write().map_err(|_| anyhow!("persistence lock poisoned"))?;
        Ok(models.get_mut(type_name).is_some_and(|ids| ids.remove(id)))
    }

    /// Forget a whole model, as when it is renamed or dropped
    pub fn drop_type(&self, type_name: &str) -> Result<bool> {
        let mut models = self.models.write().map_err(|_| anyhow!("persistence lock poisoned"))?;
        Ok(models.remove(type_name).is_some())
    }
}

#[async_trait::async_trait]
impl PersistenceLookup for MemoryPersistence {
    async fn type_exists(&self, type_name: &str) -> Result<bool> {
        let models = self.models.read().map_err(|_| anyhow!("persistence lock poisoned"))?;
        Ok(models.contains_key(type_name))
    }

    async fn instance_exists(&self, type_name: &str, id: &str) -> Result<bool> {
        let models = self.models.read().map_err(|_| anyhow!("persistence lock poisoned"))?;
        Ok(models.get(type_name).is_some_and(|ids| ids.contains(id)))
    }
}

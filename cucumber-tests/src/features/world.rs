use cucumber::World as CucumberWorld;
use rampart_core::prelude::*;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

/// Request state the scenario rules are evaluated against
#[derive(Debug, Default, Clone)]
pub struct ScenarioRequest {
    pub user: Option<Principal>,
    pub flags: BTreeMap<String, bool>,
}

impl PredicateReceiver for ScenarioRequest {
    fn call_predicate(&self, method: &str) -> Option<bool> {
        Some(self.flags.get(method).copied().unwrap_or(false))
    }

    fn lookup_principal(&self, method: &str) -> Option<Arc<dyn Roleable>> {
        match method {
            "current_user" => self.user.clone().map(|user| Arc::new(user) as Arc<dyn Roleable>),
            _ => None,
        }
    }
}

#[derive(CucumberWorld)]
pub struct RampartWorld {
    pub registry: Arc<RuleRegistry<ScenarioRequest>>,
    pub directory: RoleDirectory,
    pub persistence: Arc<MemoryPersistence>,
    pub catalog: StaticCatalog,
    pub config: AccessConfig,
    pub resources: HashMap<String, ResourceIdentity>,
    pub request: ScenarioRequest,
    pub last_context: Option<AuthorizationContext>,
    pub last_error: Option<RampartError>,
    pub last_report: Option<IntegrityReport>,
}

impl std::fmt::Debug for RampartWorld {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RampartWorld")
            .field("resources", &self.resources.keys().collect::<Vec<_>>())
            .field("config", &self.config)
            .field("request", &self.request)
            .field("last_context", &self.last_context)
            .field("last_error", &self.last_error)
            .finish()
    }
}

impl Default for RampartWorld {
    fn default() -> Self {
        Self {
            registry: Arc::new(RuleRegistry::new()),
            directory: RoleDirectory::new(
                Arc::new(MemoryRoleStore::new()),
                RoleCache::new(CacheConfig::default()),
            ),
            persistence: Arc::new(MemoryPersistence::new()),
            catalog: StaticCatalog::new(),
            config: AccessConfig::default(),
            resources: HashMap::new(),
            request: ScenarioRequest::default(),
            last_context: None,
            last_error: None,
            last_report: None,
        }
    }
}

impl RampartWorld {
    /// A previously declared resource, or a new root resource
    pub fn resource(&mut self, name: &str) -> ResourceIdentity {
        self.resources
            .entry(name.to_string())
            .or_insert_with(|| ResourceIdentity::root(name))
            .clone()
    }

    pub fn gatekeeper(&self) -> Gatekeeper<ScenarioRequest> {
        Gatekeeper::new(Arc::clone(&self.registry), self.directory.clone(), self.config.clone())
    }

    pub fn integrity_checker(&self) -> IntegrityChecker<ScenarioRequest> {
        IntegrityChecker::new(
            Arc::clone(&self.registry),
            Arc::new(self.catalog.clone()),
            self.directory.clone(),
            self.persistence.clone(),
        )
    }

    pub async fn decide(&mut self, principal: &str, action: &str, resource: &str) -> bool {
        let resource = self.resource(resource);
        let principal = Principal::new(principal);
        self.gatekeeper()
            .access_granted(&principal, &resource, action, &self.request)
            .await
            .expect("access decision failed")
    }
}

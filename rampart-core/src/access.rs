//! Access decisions
//!
//! Access is granted when a resource rule on the resource or on any of its
//! ancestors passes, or when an action rule registered on the resource itself
//! for the requested action passes. Nothing matching means no access.

use crate::audit::{AccessEvent, AuditSink, LogAuditSink};
use crate::config::AccessConfig;
use crate::error::{IntegrityError, RampartError, Result};
use crate::integrity::{IntegrityChecker, IntegrityReport};
use crate::predicate::PredicateReceiver;
use crate::registry::RuleRegistry;
use crate::resource::ResourceIdentity;
use crate::roles::{AnonymousPrincipal, RoleDirectory, Roleable};
use std::sync::Arc;
use tokio::sync::OnceCell;

/// Entry point for authorization checks
pub struct Gatekeeper<R> {
    registry: Arc<RuleRegistry<R>>,
    directory: RoleDirectory,
    config: AccessConfig,
    audit: Arc<dyn AuditSink>,
    integrity: Option<Arc<IntegrityChecker<R>>>,
    integrity_state: OnceCell<std::result::Result<IntegrityReport, IntegrityError>>,
}

impl<R: PredicateReceiver> Gatekeeper<R> {
    pub fn new(registry: Arc<RuleRegistry<R>>, directory: RoleDirectory, config: AccessConfig) -> Self {
        Self {
            registry,
            directory,
            config,
            audit: Arc::new(LogAuditSink),
            integrity: None,
            integrity_state: OnceCell::new(),
        }
    }

    pub fn with_audit_sink(mut self, audit: Arc<dyn AuditSink>) -> Self {
        self.audit = audit;
        self
    }

    pub fn with_integrity_checker(mut self, checker: IntegrityChecker<R>) -> Self {
        self.integrity = Some(Arc::new(checker));
        self
    }

    pub fn registry(&self) -> &Arc<RuleRegistry<R>> {
        &self.registry
    }

    pub fn directory(&self) -> &RoleDirectory {
        &self.directory
    }

    pub fn config(&self) -> &AccessConfig {
        &self.config
    }

    /// Run the integrity check now when configured to check eagerly
    ///
    /// Returns `None` when there is no checker or the check is deferred to the
    /// first [`authorize`](Self::authorize).
    pub async fn startup(&self) -> Result<Option<IntegrityReport>> {
        if !self.config.eager_integrity_check {
            log::debug!("Integrity check deferred until the first authorization");
            return Ok(None);
        }
        self.ensure_integrity().await
    }

    /// Whether `principal` may perform `action` on `resource`
    pub async fn access_granted(
        &self,
        principal: &dyn Roleable,
        resource: &ResourceIdentity,
        action: &str,
        receiver: &R,
    ) -> Result<bool> {
        let snapshot = self.registry.snapshot();
        let must_have_roles = self.config.must_have_roles;

        for name in resource.lineage() {
            let Some(rule) = snapshot.resource_rule(name) else {
                continue;
            };
            if rule.verify_access(&self.directory, principal, receiver, Some(action), must_have_roles).await? {
                log::debug!("{}#{} granted by resource rule on {}", resource, action, name);
                return Ok(true);
            }
        }

        for rule in snapshot.action_rules(resource.name()) {
            if rule.action() != Some(action) {
                continue;
            }
            if rule.verify_access(&self.directory, principal, receiver, Some(action), must_have_roles).await? {
                log::debug!("{}#{} granted by action rule", resource, action);
                return Ok(true);
            }
        }

        log::debug!("{}#{} denied", resource, action);
        Ok(false)
    }

    /// Check access for the receiver's current principal
    ///
    /// The principal comes from the receiver's configured lookup method, falling
    /// back to [`AnonymousPrincipal`]. Denials are reported to the audit sink.
    pub async fn authorize(&self, resource: &ResourceIdentity, action: &str, receiver: &R) -> Result<bool> {
        self.ensure_integrity().await?;

        let principal: Arc<dyn Roleable> = receiver
            .lookup_principal(&self.config.principal_method)
            .unwrap_or_else(|| Arc::new(AnonymousPrincipal));

        let granted = self.access_granted(principal.as_ref(), resource, action, receiver).await?;
        if !granted && self.config.audit_denials {
            self.audit.record(&AccessEvent::new(principal.roleable_id(), resource.name(), action, false));
        }
        Ok(granted)
    }

    async fn ensure_integrity(&self) -> Result<Option<IntegrityReport>> {
        let Some(checker) = &self.integrity else {
            return Ok(None);
        };

        // Integrity failures are final; collaborator failures leave the cell empty
        let outcome = self
            .integrity_state
            .get_or_try_init(|| async {
                match checker.run().await {
                    Ok(report) => Ok(Ok(report)),
                    Err(RampartError::Integrity(e)) => Ok(Err(e)),
                    Err(other) => Err(other),
                }
            })
            .await?;

        match outcome {
            Ok(report) => Ok(Some(report.clone())),
            Err(e) => Err(e.clone().into()),
        }
    }
}

//! Prelude module for convenient imports.
//!
//! ```rust,ignore
//! use rampart_core::prelude::*;
//! ```

// === Decisions ===
pub use crate::access::Gatekeeper;
pub use crate::audit::{AccessEvent, AuditSink, LogAuditSink};
pub use crate::integrity::{IntegrityChecker, IntegrityReport};

// === Rules ===
pub use crate::predicate::{Predicate, PredicateReceiver};
pub use crate::registry::RuleRegistry;
pub use crate::resource::{ResourceCatalog, ResourceIdentity, StaticCatalog};
pub use crate::rule::{Rule, RuleDeclaration};

// === Contexts and roles ===
pub use crate::cache::{RoleCache, RoleCacheKey};
pub use crate::context::{resolve, AuthorizationContext, ContextInstance, ContextValue};
pub use crate::persistence::{MemoryPersistence, PersistenceLookup};
pub use crate::roles::{AnonymousPrincipal, MemoryRoleStore, Principal, RoleDirectory, RoleStore, Roleable};

// === Configuration and errors ===
pub use crate::config::{AccessConfig, CacheConfig, LoggingConfig, RampartConfig};
pub use crate::error::{IntegrityError, RampartError, Result};

//! Rampart - Core
//!
//! A role- and context-scoped access-control engine.
//!
//! # Overview
//!
//! Applications declare rules on protected resources (controllers, route
//! groups, services). A rule names the roles that satisfy it, the context those
//! roles are checked in (global, a model type, or one model instance) and
//! optional runtime predicates. At request time the [`Gatekeeper`] walks the
//! rules for the resource and its ancestors and answers yes or no.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use rampart_core::prelude::*;
//! use std::sync::Arc;
//!
//! let registry = Arc::new(RuleRegistry::<MyRequest>::new());
//! let posts = ResourceIdentity::root("PostsController");
//! registry.add(&posts, Some("show"), RuleDeclaration::new())?;
//! registry.add(&posts, Some("edit"), RuleDeclaration::new().role("admin"))?;
//!
//! let directory = RoleDirectory::new(Arc::new(MemoryRoleStore::new()), RoleCache::new(CacheConfig::default()));
//! let gatekeeper = Gatekeeper::new(registry, directory, AccessConfig::default());
//! let allowed = gatekeeper.authorize(&posts, "edit", &request).await?;
//! ```
//!
//! # Architecture
//!
//! - [`context`] - Canonical authorization contexts
//! - [`cache`] - Role cache with explicit invalidation
//! - [`roles`] - Principals, role storage and the role directory
//! - [`rule`] - Single access rules and their declarations
//! - [`registry`] - Copy-on-write rule registry
//! - [`access`] - The access decision algorithm
//! - [`integrity`] - Startup consistency checks and orphan cleanup
//! - [`config`] - TOML and environment configuration

pub mod access;
pub mod audit;
pub mod cache;
pub mod config;
pub mod context;
pub mod error;
pub mod integrity;
pub mod logging;
pub mod persistence;
pub mod predicate;
pub mod prelude;
pub mod registry;
pub mod resource;
pub mod roles;
pub mod rule;

pub use access::Gatekeeper;
pub use error::{IntegrityError, RampartError, Result};

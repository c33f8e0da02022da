//! Authorization contexts
//!
//! Every role assignment and every rule lives in a context: the global scope,
//! a whole resource type, or one persisted instance of that type. Callers hand
//! in a loose [`ContextValue`]; [`resolve`] turns it into the canonical
//! [`AuthorizationContext`] used for role lookups and cache keys.

use crate::error::{RampartError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Name of a context type (e.g. a model name such as `"Post"`)
pub type TypeName = String;

/// Primary key of a persisted context instance
pub type Identifier = String;

/// Canonical `{type, id}` pair
///
/// - `{none, none}`: global
/// - `{T, none}`: any instance of `T`
/// - `{T, I}`: the instance `I` of `T`
///
/// An `id` never appears without a `type`. Values are only produced by
/// [`resolve`]; a deserialized value is re-checked when passed back through it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AuthorizationContext {
    #[serde(rename = "type")]
    type_name: Option<TypeName>,
    id: Option<Identifier>,
}

/// Scope of a canonical context
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextScope {
    Global,
    Type,
    Instance,
}

impl AuthorizationContext {
    /// The global context
    pub const GLOBAL: AuthorizationContext = AuthorizationContext { type_name: None, id: None };

    pub fn type_name(&self) -> Option<&str> {
        self.type_name.as_deref()
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn scope(&self) -> ContextScope {
        match (&self.type_name, &self.id) {
            (None, _) => ContextScope::Global,
            (Some(_), None) => ContextScope::Type,
            (Some(_), Some(_)) => ContextScope::Instance,
        }
    }

    pub fn is_global(&self) -> bool {
        self.scope() == ContextScope::Global
    }

    pub fn is_instance(&self) -> bool {
        self.scope() == ContextScope::Instance
    }
}

impl fmt::Display for AuthorizationContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.type_name, &self.id) {
            (Some(t), Some(id)) => write!(f, "{}#{}", t, id),
            (Some(t), None) => write!(f, "{}", t),
            _ => write!(f, "global"),
        }
    }
}

/// A persisted (or not yet persisted) object usable as an instance context
pub trait ContextInstance {
    /// Type name the instance is filed under
    fn context_type(&self) -> &str;

    /// Stable primary key, `None` until the instance has been persisted
    fn primary_key(&self) -> Option<Identifier>;
}

/// Raw context as supplied by rule declarations and role mutations
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ContextValue {
    /// No context: the global scope
    #[default]
    Global,
    /// A resource type
    Type(TypeName),
    /// A resource instance; `id` is `None` for an unsaved instance
    Instance { type_name: TypeName, id: Option<Identifier> },
    /// An already resolved context
    Canonical(AuthorizationContext),
}

impl ContextValue {
    pub fn of_type(type_name: impl Into<TypeName>) -> Self {
        ContextValue::Type(type_name.into())
    }

    /// Capture the type and primary key of an instance
    pub fn instance<I: ContextInstance + ?Sized>(instance: &I) -> Self {
        ContextValue::Instance {
            type_name: instance.context_type().to_string(),
            id: instance.primary_key(),
        }
    }

    pub fn resolve(&self) -> Result<AuthorizationContext> {
        resolve(self)
    }
}

impl From<AuthorizationContext> for ContextValue {
    fn from(context: AuthorizationContext) -> Self {
        ContextValue::Canonical(context)
    }
}

impl<T: Into<ContextValue>> From<Option<T>> for ContextValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(ContextValue::Global)
    }
}

/// Normalize a raw context into its canonical form
///
/// Pure: resolving an already canonical context returns it unchanged.
pub fn resolve(raw: &ContextValue) -> Result<AuthorizationContext> {
    match raw {
        ContextValue::Global => Ok(AuthorizationContext::GLOBAL),
        ContextValue::Type(type_name) => Ok(AuthorizationContext {
            type_name: Some(checked_type_name(type_name)?),
            id: None,
        }),
        ContextValue::Instance { type_name, id } => {
            let type_name = checked_type_name(type_name)?;
            let id = id.as_deref().map(str::trim).filter(|id| !id.is_empty()).ok_or_else(|| {
                RampartError::InvalidContext(format!(
                    "instance of `{}` has not been persisted and has no identifier",
                    type_name
                ))
            })?;
            Ok(AuthorizationContext { type_name: Some(type_name), id: Some(id.to_string()) })
        }
        ContextValue::Canonical(context) => {
            match (&context.type_name, &context.id) {
                (None, Some(id)) => Err(RampartError::InvalidContext(format!(
                    "context identifier `{}` has no type",
                    id
                ))),
                (Some(t), _) if t.trim().is_empty() => {
                    Err(RampartError::InvalidContext("context type name is empty".to_string()))
                }
                (_, Some(id)) if id.trim().is_empty() => {
                    Err(RampartError::InvalidContext("context identifier is empty".to_string()))
                }
                _ => Ok(context.clone()),
            }
        }
    }
}

fn checked_type_name(type_name: &str) -> Result<TypeName> {
    let trimmed = type_name.trim();
    if trimmed.is_empty() {
        return Err(RampartError::InvalidContext("context type name is empty".to_string()));
    }
    Ok(trimmed.to_string())
}

//! Runtime predicates evaluated against the request receiver

use crate::error::{RampartError, Result};
use crate::roles::Roleable;
use std::fmt;
use std::sync::Arc;

/// Runtime state an access decision is evaluated against
///
/// Typically the request handler: it answers named boolean checks
/// (`"owner_of_post"`, `"params_valid"`) and knows who the current principal is.
pub trait PredicateReceiver: Send + Sync {
    /// Evaluate the named boolean method; `None` when the receiver has no such method
    fn call_predicate(&self, method: &str) -> Option<bool>;

    /// Principal returned by the named lookup method, if any
    fn lookup_principal(&self, _method: &str) -> Option<Arc<dyn Roleable>> {
        None
    }
}

type PredicateFn<R> = dyn Fn(&R) -> bool + Send + Sync;

/// A boolean condition on the receiver
pub enum Predicate<R> {
    /// Closure over the receiver
    Closure(Arc<PredicateFn<R>>),
    /// Named method looked up on the receiver
    Method(String),
}

impl<R> Predicate<R> {
    pub fn closure<F>(f: F) -> Self
    where
        F: Fn(&R) -> bool + Send + Sync + 'static,
    {
        Predicate::Closure(Arc::new(f))
    }

    pub fn method(name: impl Into<String>) -> Self {
        Predicate::Method(name.into())
    }
}

impl<R: PredicateReceiver> Predicate<R> {
    /// Evaluate against `receiver`
    ///
    /// A method the receiver does not implement is a declaration error.
    pub fn evaluate(&self, receiver: &R) -> Result<bool> {
        match self {
            Predicate::Closure(f) => Ok(f(receiver)),
            Predicate::Method(name) => receiver.call_predicate(name).ok_or_else(|| {
                RampartError::InvalidArgument(format!("receiver has no predicate method `{}`", name))
            }),
        }
    }
}

impl<R> Clone for Predicate<R> {
    fn clone(&self) -> Self {
        match self {
            Predicate::Closure(f) => Predicate::Closure(Arc::clone(f)),
            Predicate::Method(name) => Predicate::Method(name.clone()),
        }
    }
}

impl<R> fmt::Debug for Predicate<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Predicate::Closure(_) => f.write_str("Predicate::Closure(..)"),
            Predicate::Method(name) => f.debug_tuple("Predicate::Method").field(name).finish(),
        }
    }
}

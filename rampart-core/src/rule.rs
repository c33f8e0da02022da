//! Access rules
//!
//! A [`Rule`] combines a role requirement, the context that requirement is
//! checked in, and an optional pair of runtime predicates. Rules are declared
//! with a [`RuleDeclaration`] and become immutable once registered.

use crate::context::{resolve, AuthorizationContext, ContextValue};
use crate::error::{RampartError, Result};
use crate::predicate::{Predicate, PredicateReceiver};
use crate::roles::{validate_role_name, RoleDirectory, RoleSet, Roleable};
use std::fmt;
use std::sync::Arc;

type ContextFn<R> = dyn Fn(&R) -> ContextValue + Send + Sync;

/// Context a rule checks roles in
pub enum RuleContext<R> {
    Static(AuthorizationContext),
    /// Computed from the receiver on every check
    Dynamic(Arc<ContextFn<R>>),
}

impl<R> RuleContext<R> {
    /// Resolve the context for one check
    pub fn resolve_for(&self, receiver: &R) -> Result<AuthorizationContext> {
        match self {
            RuleContext::Static(context) => Ok(context.clone()),
            RuleContext::Dynamic(f) => resolve(&f(receiver)),
        }
    }
}

impl<R> Clone for RuleContext<R> {
    fn clone(&self) -> Self {
        match self {
            RuleContext::Static(context) => RuleContext::Static(context.clone()),
            RuleContext::Dynamic(f) => RuleContext::Dynamic(Arc::clone(f)),
        }
    }
}

impl<R> fmt::Debug for RuleContext<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuleContext::Static(context) => write!(f, "Static({})", context),
            RuleContext::Dynamic(_) => f.write_str("Dynamic(..)"),
        }
    }
}

enum DeclaredContext<R> {
    Value(ContextValue),
    Dynamic(Arc<ContextFn<R>>),
}

/// Unvalidated rule input
///
/// ```ignore
/// let declaration = RuleDeclaration::new()
///     .roles(["admin", "editor"])
///     .context(ContextValue::of_type("Post"))
///     .unless(Predicate::method("archived"));
/// ```
pub struct RuleDeclaration<R> {
    roles: Vec<String>,
    context: DeclaredContext<R>,
    predicate: Option<Predicate<R>>,
    negated_predicate: Option<Predicate<R>>,
}

impl<R> Default for RuleDeclaration<R> {
    fn default() -> Self {
        Self {
            roles: Vec::new(),
            context: DeclaredContext::Value(ContextValue::Global),
            predicate: None,
            negated_predicate: None,
        }
    }
}

impl<R> RuleDeclaration<R> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn roles<I, S>(mut self, roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.roles.extend(roles.into_iter().map(Into::into));
        self
    }

    pub fn role(mut self, role: impl Into<String>) -> Self {
        self.roles.push(role.into());
        self
    }

    pub fn context(mut self, context: impl Into<ContextValue>) -> Self {
        self.context = DeclaredContext::Value(context.into());
        self
    }

    /// Derive the context from the receiver at check time
    pub fn dynamic_context<F>(mut self, f: F) -> Self
    where
        F: Fn(&R) -> ContextValue + Send + Sync + 'static,
    {
        self.context = DeclaredContext::Dynamic(Arc::new(f));
        self
    }

    /// Require `predicate` to hold
    pub fn when(mut self, predicate: Predicate<R>) -> Self {
        self.predicate = Some(predicate);
        self
    }

    /// Require `predicate` not to hold
    pub fn unless(mut self, predicate: Predicate<R>) -> Self {
        self.negated_predicate = Some(predicate);
        self
    }

    /// Validate role names and resolve a static context
    pub fn into_rule(self, action: Option<&str>) -> Result<Rule<R>> {
        let roles = self
            .roles
            .iter()
            .map(|role| validate_role_name(role))
            .collect::<Result<RoleSet>>()?;

        let context = match self.context {
            DeclaredContext::Value(raw) => RuleContext::Static(resolve(&raw).map_err(|e| {
                RampartError::InvalidArgument(format!("rule context {:?} is invalid: {}", raw, e))
            })?),
            DeclaredContext::Dynamic(f) => RuleContext::Dynamic(f),
        };

        Ok(Rule {
            roles,
            context,
            predicate: self.predicate,
            negated_predicate: self.negated_predicate,
            action: action.map(str::to_string),
        })
    }
}

/// A registered access rule
pub struct Rule<R> {
    roles: RoleSet,
    context: RuleContext<R>,
    predicate: Option<Predicate<R>>,
    negated_predicate: Option<Predicate<R>>,
    action: Option<String>,
}

impl<R> Rule<R> {
    /// Roles that satisfy the rule; empty means no role requirement
    pub fn roles(&self) -> &RoleSet {
        &self.roles
    }

    pub fn context(&self) -> &RuleContext<R> {
        &self.context
    }

    pub fn predicate(&self) -> Option<&Predicate<R>> {
        self.predicate.as_ref()
    }

    pub fn negated_predicate(&self) -> Option<&Predicate<R>> {
        self.negated_predicate.as_ref()
    }

    /// Action the rule is bound to, `None` for a whole-resource rule
    pub fn action(&self) -> Option<&str> {
        self.action.as_deref()
    }
}

impl<R: PredicateReceiver> Rule<R> {
    /// Whether `principal` passes this rule for `action`
    ///
    /// A rule bound to a different action never passes. Otherwise the
    /// predicates must hold and the principal must hold one of the rule's
    /// roles in the rule's context. With `must_have_roles`, a principal with
    /// no role at all in that context fails even a roleless rule.
    pub async fn verify_access(
        &self,
        directory: &RoleDirectory,
        principal: &dyn Roleable,
        receiver: &R,
        action: Option<&str>,
        must_have_roles: bool,
    ) -> Result<bool> {
        if let (Some(requested), Some(own)) = (action, self.action.as_deref()) {
            if requested != own {
                return Ok(false);
            }
        }

        if !self.predicates_hold(receiver)? {
            return Ok(false);
        }

        if self.roles.is_empty() && !must_have_roles {
            return Ok(true);
        }

        let context = self.context.resolve_for(receiver)?;
        let held = directory.roles_in(principal, &context).await?;
        if held.is_empty() {
            return Ok(false);
        }
        Ok(self.roles.is_empty() || !self.roles.is_disjoint(&held))
    }

    fn predicates_hold(&self, receiver: &R) -> Result<bool> {
        let positive = match &self.predicate {
            Some(predicate) => predicate.evaluate(receiver)?,
            None => true,
        };
        if !positive {
            return Ok(false);
        }
        let negative = match &self.negated_predicate {
            Some(predicate) => predicate.evaluate(receiver)?,
            None => false,
        };
        Ok(!negative)
    }
}

impl<R> fmt::Debug for Rule<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rule")
            .field("roles", &self.roles)
            .field("context", &self.context)
            .field("predicate", &self.predicate)
            .field("negated_predicate", &self.negated_predicate)
            .field("action", &self.action)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::RoleCache;
    use crate::config::CacheConfig;
    use crate::roles::{AnonymousPrincipal, MemoryRoleStore, Principal};

    struct Request {
        post_id: Option<String>,
        flagged: bool,
    }

    impl PredicateReceiver for Request {
        fn call_predicate(&self, method: &str) -> Option<bool> {
            match method {
                "flagged" => Some(self.flagged),
                _ => None,
            }
        }
    }

    fn request() -> Request {
        Request { post_id: Some("9".into()), flagged: false }
    }

    fn directory() -> RoleDirectory {
        RoleDirectory::new(Arc::new(MemoryRoleStore::new()), RoleCache::new(CacheConfig::default()))
    }

    fn rule(declaration: RuleDeclaration<Request>, action: Option<&str>) -> Rule<Request> {
        declaration.into_rule(action).unwrap()
    }

    #[tokio::test]
    async fn test_action_mismatch_fails() {
        let dir = directory();
        let edit = rule(RuleDeclaration::new(), Some("edit"));
        let alice = Principal::new("alice");

        assert!(!edit.verify_access(&dir, &alice, &request(), Some("show"), false).await.unwrap());
        assert!(edit.verify_access(&dir, &alice, &request(), Some("edit"), false).await.unwrap());
        assert!(edit.verify_access(&dir, &alice, &request(), None, false).await.unwrap());
    }

    #[tokio::test]
    async fn test_empty_roles_and_must_have_roles() {
        let dir = directory();
        let open = rule(RuleDeclaration::new(), None);
        let alice = Principal::new("alice");

        assert!(open.verify_access(&dir, &alice, &request(), None, false).await.unwrap());
        assert!(open.verify_access(&dir, &AnonymousPrincipal, &request(), None, false).await.unwrap());
        assert!(!open.verify_access(&dir, &alice, &request(), None, true).await.unwrap());

        dir.add_role(&alice, "reader", ContextValue::Global).await.unwrap();
        assert!(open.verify_access(&dir, &alice, &request(), None, true).await.unwrap());
    }

    #[tokio::test]
    async fn test_role_intersection() {
        let dir = directory();
        let admins = rule(RuleDeclaration::new().roles(["admin", "owner"]), None);
        let alice = Principal::new("alice");

        assert!(!admins.verify_access(&dir, &alice, &request(), None, false).await.unwrap());
        dir.add_role(&alice, "owner", ContextValue::Global).await.unwrap();
        assert!(admins.verify_access(&dir, &alice, &request(), None, false).await.unwrap());
    }

    #[tokio::test]
    async fn test_roles_are_checked_in_the_rule_context() {
        let dir = directory();
        let editors = rule(RuleDeclaration::new().role("editor").context(ContextValue::of_type("Post")), None);
        let alice = Principal::new("alice");

        dir.add_role(&alice, "editor", ContextValue::Global).await.unwrap();
        assert!(!editors.verify_access(&dir, &alice, &request(), None, false).await.unwrap());

        dir.add_role(&alice, "editor", ContextValue::of_type("Post")).await.unwrap();
        assert!(editors.verify_access(&dir, &alice, &request(), None, false).await.unwrap());
    }

    #[tokio::test]
    async fn test_dynamic_context() {
        let dir = directory();
        let owners = rule(
            RuleDeclaration::new().role("owner").dynamic_context(|req: &Request| ContextValue::Instance {
                type_name: "Post".into(),
                id: req.post_id.clone(),
            }),
            None,
        );
        let alice = Principal::new("alice");
        let post = ContextValue::Instance { type_name: "Post".into(), id: Some("9".into()) };
        dir.add_role(&alice, "owner", post).await.unwrap();

        assert!(owners.verify_access(&dir, &alice, &request(), None, false).await.unwrap());

        let other = Request { post_id: Some("10".into()), flagged: false };
        assert!(!owners.verify_access(&dir, &alice, &other, None, false).await.unwrap());

        let unsaved = Request { post_id: None, flagged: false };
        let err = owners.verify_access(&dir, &alice, &unsaved, None, false).await.unwrap_err();
        assert!(matches!(err, RampartError::InvalidContext(_)));
    }

    #[tokio::test]
    async fn test_negated_predicate_only() {
        let dir = directory();
        let unflagged = rule(RuleDeclaration::new().unless(Predicate::method("flagged")), None);
        let alice = Principal::new("alice");

        assert!(unflagged.verify_access(&dir, &alice, &request(), None, false).await.unwrap());
        let flagged = Request { post_id: None, flagged: true };
        assert!(!unflagged.verify_access(&dir, &alice, &flagged, None, false).await.unwrap());
    }

    #[tokio::test]
    async fn test_predicate_and_negated_predicate_combine() {
        let dir = directory();
        let both = rule(
            RuleDeclaration::new()
                .when(Predicate::closure(|req: &Request| req.post_id.is_some()))
                .unless(Predicate::method("flagged")),
            None,
        );
        let alice = Principal::new("alice");

        assert!(both.verify_access(&dir, &alice, &request(), None, false).await.unwrap());
        let no_post = Request { post_id: None, flagged: false };
        assert!(!both.verify_access(&dir, &alice, &no_post, None, false).await.unwrap());
    }

    #[tokio::test]
    async fn test_unknown_predicate_method_is_an_error() {
        let dir = directory();
        let broken = rule(RuleDeclaration::new().when(Predicate::method("published")), None);
        let result = broken.verify_access(&dir, &Principal::new("alice"), &request(), None, false).await;
        assert!(matches!(result, Err(RampartError::InvalidArgument(_))));
    }

    #[test]
    fn test_declaration_validation() {
        let bad_role = RuleDeclaration::<Request>::new().role("Admin!").into_rule(None);
        assert!(matches!(bad_role, Err(RampartError::InvalidArgument(_))));

        let bad_context = RuleDeclaration::<Request>::new().context(ContextValue::of_type("")).into_rule(None);
        assert!(matches!(bad_context, Err(RampartError::InvalidArgument(_))));

        let ok = RuleDeclaration::<Request>::new().roles([" admin "]).into_rule(Some("edit")).unwrap();
        assert!(ok.roles().contains("admin"));
        assert_eq!(ok.action(), Some("edit"));
    }
}

//! Rule registry
//!
//! Two independent maps keyed by resource name:
//!
//! - **resource rules**: at most one per resource, applying to every action of
//!   the resource and of its subtypes. A later registration replaces the earlier
//!   one and logs a warning.
//! - **action rules**: an ordered, append-only list per resource. Rules bound to
//!   the same action are alternatives.
//!
//! Writers are serialized and publish a fresh snapshot; readers clone the
//! current `Arc` and never wait on each other.

use crate::error::Result;
use crate::resource::ResourceIdentity;
use crate::rule::{Rule, RuleDeclaration};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::{Arc, PoisonError, RwLock};

/// Immutable view of the registry at one point in time
pub struct RuleSnapshot<R> {
    resource_rules: HashMap<String, Arc<Rule<R>>>,
    action_rules: HashMap<String, Vec<Arc<Rule<R>>>>,
}

impl<R> RuleSnapshot<R> {
    fn empty() -> Self {
        Self { resource_rules: HashMap::new(), action_rules: HashMap::new() }
    }

    pub fn resource_rule(&self, resource: &str) -> Option<&Arc<Rule<R>>> {
        self.resource_rules.get(resource)
    }

    pub fn action_rules(&self, resource: &str) -> &[Arc<Rule<R>>] {
        self.action_rules.get(resource).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Resources carrying at least one action rule
    pub fn resources_with_action_rules(&self) -> impl Iterator<Item = &str> {
        self.action_rules.keys().map(String::as_str)
    }

    pub fn rule_count(&self) -> usize {
        self.resource_rules.len() + self.action_rules.values().map(Vec::len).sum::<usize>()
    }
}

impl<R> Clone for RuleSnapshot<R> {
    fn clone(&self) -> Self {
        Self { resource_rules: self.resource_rules.clone(), action_rules: self.action_rules.clone() }
    }
}

/// Registry of access rules, shared as `Arc<RuleRegistry<R>>`
pub struct RuleRegistry<R> {
    current: RwLock<Arc<RuleSnapshot<R>>>,
}

impl<R> Default for RuleRegistry<R> {
    fn default() -> Self {
        Self { current: RwLock::new(Arc::new(RuleSnapshot::empty())) }
    }
}

impl<R> RuleRegistry<R> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a rule
    ///
    /// With an action the rule is appended to the resource's action rules;
    /// without one it becomes the resource rule. Actions are not checked here;
    /// the integrity checker does that once registration is complete.
    pub fn add(
        &self,
        resource: &ResourceIdentity,
        action: Option<&str>,
        declaration: RuleDeclaration<R>,
    ) -> Result<()> {
        let rule = Arc::new(declaration.into_rule(action)?);
        let name = resource.name().to_string();

        // Poisoning cannot leave a half-written snapshot behind
        let mut current = self.current.write().unwrap_or_else(PoisonError::into_inner);
        let mut next = RuleSnapshot::clone(&current);

        match action {
            Some(action) => {
                log::debug!("Registered rule for {}#{}", name, action);
                next.action_rules.entry(name).or_default().push(rule);
            }
            None => {
                if next.resource_rules.insert(name.clone(), rule).is_some() {
                    log::warn!("Resource rule for {} replaced by a later declaration", name);
                } else {
                    log::debug!("Registered resource rule for {}", name);
                }
            }
        }

        *current = Arc::new(next);
        Ok(())
    }

    /// Current snapshot
    pub fn snapshot(&self) -> Arc<RuleSnapshot<R>> {
        let current = self.current.read().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&current)
    }

    pub fn resource_rule_for(&self, resource: &str) -> Option<Arc<Rule<R>>> {
        self.snapshot().resource_rule(resource).cloned()
    }

    pub fn action_rules_for(&self, resource: &str) -> Vec<Arc<Rule<R>>> {
        self.snapshot().action_rules(resource).to_vec()
    }

    /// Actions referenced by action rules, per resource
    pub fn declared_actions(&self) -> BTreeMap<String, BTreeSet<String>> {
        let snapshot = self.snapshot();
        snapshot
            .action_rules
            .iter()
            .map(|(resource, rules)| {
                let actions = rules.iter().filter_map(|rule| rule.action()).map(str::to_string).collect();
                (resource.clone(), actions)
            })
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshot().rule_count() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::predicate::PredicateReceiver;

    struct Request;

    impl PredicateReceiver for Request {
        fn call_predicate(&self, _method: &str) -> Option<bool> {
            None
        }
    }

    fn posts() -> ResourceIdentity {
        ResourceIdentity::root("PostsController")
    }

    #[test]
    fn test_unknown_resource_has_no_rules() {
        let registry = RuleRegistry::<Request>::new();
        assert!(registry.is_empty());
        assert!(registry.resource_rule_for("PostsController").is_none());
        assert!(registry.action_rules_for("PostsController").is_empty());
    }

    #[test]
    fn test_resource_rule_is_replaced() {
        let registry = RuleRegistry::<Request>::new();
        registry.add(&posts(), None, RuleDeclaration::new().role("admin")).unwrap();
        registry.add(&posts(), None, RuleDeclaration::new().role("editor")).unwrap();

        let rule = registry.resource_rule_for("PostsController").unwrap();
        assert_eq!(rule.roles().iter().collect::<Vec<_>>(), vec!["editor"]);
        assert_eq!(registry.snapshot().rule_count(), 1);
    }

    #[test]
    fn test_action_rules_are_appended_in_order() {
        let registry = RuleRegistry::<Request>::new();
        registry.add(&posts(), Some("show"), RuleDeclaration::new()).unwrap();
        registry.add(&posts(), Some("edit"), RuleDeclaration::new().role("admin")).unwrap();
        registry.add(&posts(), Some("edit"), RuleDeclaration::new().role("owner")).unwrap();

        let rules = registry.action_rules_for("PostsController");
        let actions: Vec<_> = rules.iter().map(|rule| rule.action().unwrap()).collect();
        assert_eq!(actions, vec!["show", "edit", "edit"]);

        let declared = registry.declared_actions();
        assert_eq!(declared["PostsController"].iter().collect::<Vec<_>>(), vec!["edit", "show"]);
    }

    #[test]
    fn test_invalid_declaration_is_not_registered() {
        let registry = RuleRegistry::<Request>::new();
        assert!(registry.add(&posts(), None, RuleDeclaration::new().role("Bad Role")).is_err());
        assert!(registry.is_empty());
    }

    #[test]
    fn test_snapshot_is_unaffected_by_later_writes() {
        let registry = RuleRegistry::<Request>::new();
        registry.add(&posts(), Some("show"), RuleDeclaration::new()).unwrap();
        let before = registry.snapshot();

        registry.add(&posts(), Some("edit"), RuleDeclaration::new()).unwrap();
        assert_eq!(before.action_rules("PostsController").len(), 1);
        assert_eq!(registry.snapshot().action_rules("PostsController").len(), 2);
    }

    #[test]
    fn test_concurrent_registration() {
        let registry = Arc::new(RuleRegistry::<Request>::new());
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let registry = Arc::clone(&registry);
                std::thread::spawn(move || {
                    let action = format!("action_{}", i);
                    registry.add(&posts(), Some(&action), RuleDeclaration::new()).unwrap();
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(registry.action_rules_for("PostsController").len(), 8);
    }
}

//! Protected resources and their actions

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// A protected resource type together with its ancestry
///
/// Built from a root with [`ResourceIdentity::root`] and refined with
/// [`ResourceIdentity::subtype`]. Two identities are equal when their names
/// are equal.
#[derive(Clone)]
pub struct ResourceIdentity {
    /// Nearest first: `[self, parent, grandparent, ..]`
    lineage: Arc<[String]>,
}

impl ResourceIdentity {
    pub fn root(name: impl Into<String>) -> Self {
        Self { lineage: Arc::from(vec![name.into()]) }
    }

    /// A resource that is-a `self`
    pub fn subtype(&self, name: impl Into<String>) -> Self {
        let mut lineage = Vec::with_capacity(self.lineage.len() + 1);
        lineage.push(name.into());
        lineage.extend(self.lineage.iter().cloned());
        Self { lineage: Arc::from(lineage) }
    }

    pub fn name(&self) -> &str {
        &self.lineage[0]
    }

    /// This resource followed by its ancestors, nearest first
    pub fn lineage(&self) -> impl Iterator<Item = &str> {
        self.lineage.iter().map(String::as_str)
    }

    pub fn parent_name(&self) -> Option<&str> {
        self.lineage.get(1).map(String::as_str)
    }

    /// Whether `self` is `ancestor` or one of its descendants
    pub fn is_subtype_of(&self, ancestor: &str) -> bool {
        self.lineage().any(|name| name == ancestor)
    }
}

impl PartialEq for ResourceIdentity {
    fn eq(&self, other: &Self) -> bool {
        self.name() == other.name()
    }
}

impl Eq for ResourceIdentity {}

impl Hash for ResourceIdentity {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name().hash(state);
    }
}

impl fmt::Debug for ResourceIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.lineage()).finish()
    }
}

impl fmt::Display for ResourceIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Source of truth for the actions a resource actually implements
pub trait ResourceCatalog: Send + Sync {
    /// Actions of `resource`, `None` when the resource is unknown
    fn actions_of(&self, resource: &str) -> Option<BTreeSet<String>>;
}

/// Fixed resource catalog
#[derive(Debug, Clone, Default)]
pub struct StaticCatalog {
    resources: BTreeMap<String, BTreeSet<String>>,
}

impl StaticCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_resource<I, S>(mut self, resource: impl Into<String>, actions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.resources
            .entry(resource.into())
            .or_default()
            .extend(actions.into_iter().map(Into::into));
        self
    }
}

impl ResourceCatalog for StaticCatalog {
    fn actions_of(&self, resource: &str) -> Option<BTreeSet<String>> {
        self.resources.get(resource).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lineage_is_nearest_first() {
        let parent = ResourceIdentity::root("ApplicationController");
        let child = parent.subtype("PostsController");
        let grandchild = child.subtype("AdminPostsController");

        assert_eq!(
            grandchild.lineage().collect::<Vec<_>>(),
            vec!["AdminPostsController", "PostsController", "ApplicationController"]
        );
        assert_eq!(grandchild.parent_name(), Some("PostsController"));
        assert!(grandchild.is_subtype_of("ApplicationController"));
        assert!(!parent.is_subtype_of("PostsController"));
        assert_eq!(parent.parent_name(), None);
    }

    #[test]
    fn test_identity_equality_is_by_name() {
        let a = ResourceIdentity::root("Base").subtype("Posts");
        let b = ResourceIdentity::root("Posts");
        assert_eq!(a, b);
        assert_eq!(a.to_string(), "Posts");
    }

    #[test]
    fn test_static_catalog() {
        let catalog = StaticCatalog::new()
            .with_resource("Posts", ["index", "show"])
            .with_resource("Posts", ["edit"]);
        assert_eq!(catalog.actions_of("Posts").unwrap().len(), 3);
        assert!(catalog.actions_of("Comments").is_none());
    }
}

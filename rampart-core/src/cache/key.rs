//! Structured role cache keys
//!
//! A key is the pair `(principal, context)`. The storage key handed to the
//! backing store is `"{namespace}:roles:{sha256}"`, where the digest covers a
//! structural encoding of the pair: fields in a fixed order, each optional field
//! tagged, each string length-prefixed. Two keys collide only if the underlying
//! structures are equal.

use crate::context::AuthorizationContext;
use crate::roles::PrincipalId;
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::fmt;

const ENCODING_VERSION: u8 = 1;

/// Cache key for the roles of one principal in one context
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct RoleCacheKey {
    pub principal_id: PrincipalId,
    pub context: AuthorizationContext,
}

impl RoleCacheKey {
    pub fn new(principal_id: impl Into<PrincipalId>, context: AuthorizationContext) -> Self {
        Self { principal_id: principal_id.into(), context }
    }

    /// Stable byte encoding of the key
    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(64);
        out.push(ENCODING_VERSION);
        put_str(&mut out, &self.principal_id);
        put_opt(&mut out, self.context.type_name());
        put_opt(&mut out, self.context.id());
        out
    }

    /// Hex SHA-256 digest of [`encode`](Self::encode)
    pub fn digest(&self) -> String {
        hex::encode(Sha256::digest(self.encode()))
    }

    /// Key under which the entry is kept in the backing store
    pub fn storage_key(&self, namespace: &str) -> String {
        format!("{}:roles:{}", namespace, self.digest())
    }
}

impl fmt::Display for RoleCacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.principal_id, self.context)
    }
}

fn put_str(out: &mut Vec<u8>, value: &str) {
    out.extend_from_slice(&(value.len() as u64).to_be_bytes());
    out.extend_from_slice(value.as_bytes());
}

fn put_opt(out: &mut Vec<u8>, value: Option<&str>) {
    match value {
        Some(v) => {
            out.push(1);
            put_str(out, v);
        }
        None => out.push(0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::{resolve, ContextValue};

    fn ctx(raw: ContextValue) -> AuthorizationContext {
        resolve(&raw).unwrap()
    }

    #[test]
    fn test_digest_is_independent_of_construction_path() {
        let direct = RoleCacheKey::new("7", ctx(ContextValue::of_type("Post")));
        let round_tripped = RoleCacheKey::new(
            String::from("7"),
            ctx(ContextValue::from(ctx(ContextValue::of_type(" Post ")))),
        );
        assert_eq!(direct.digest(), round_tripped.digest());
    }

    #[test]
    fn test_digest_separates_field_boundaries() {
        // Naive concatenation would render both of these as "ab" + "c"
        let a = RoleCacheKey::new(
            "1",
            ctx(ContextValue::Instance { type_name: "ab".into(), id: Some("c".into()) }),
        );
        let b = RoleCacheKey::new(
            "1",
            ctx(ContextValue::Instance { type_name: "a".into(), id: Some("bc".into()) }),
        );
        assert_ne!(a.digest(), b.digest());

        let global = RoleCacheKey::new("1", AuthorizationContext::GLOBAL);
        let typed = RoleCacheKey::new("1", ctx(ContextValue::of_type("global")));
        assert_ne!(global.digest(), typed.digest());
    }

    #[test]
    fn test_storage_key_is_namespaced() {
        let key = RoleCacheKey::new("1", AuthorizationContext::GLOBAL);
        let storage_key = key.storage_key("rampart");
        assert!(storage_key.starts_with("rampart:roles:"));
        assert_eq!(storage_key.len(), "rampart:roles:".len() + 64);
    }
}

//! Tenant/identity boundary. See `Scope` invariants in the module docs.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::constants::MAX_SCOPE_KEYS;
use crate::errors::{CortexError, CortexResult};

/// A small key/value map acting as the sole tenant-isolation primitive.
///
/// Two scopes are equal iff they carry identical key sets and values — this
/// is deliberately structural, not an opaque ID, so that a caller can build
/// a `Scope` from whatever identity fields it has (`user_id`, `org_id`, ...)
/// without a lookup. `BTreeMap` gives a canonical iteration order, which
/// keeps `Hash`/`Eq`/`Serialize` all consistent with each other.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Scope(BTreeMap<String, String>);

impl Scope {
    /// Build a scope from key/value pairs, enforcing the bounded key count.
    pub fn new<I, K, V>(pairs: I) -> CortexResult<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let map: BTreeMap<String, String> = pairs
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        Self::from_map(map)
    }

    /// Build a scope with a single `user_id` key — the common case.
    pub fn for_user(user_id: impl Into<String>) -> Self {
        let mut map = BTreeMap::new();
        map.insert("user_id".to_string(), user_id.into());
        Self(map)
    }

    fn from_map(map: BTreeMap<String, String>) -> CortexResult<Self> {
        if map.is_empty() {
            return Err(CortexError::InvalidInput {
                reason: "scope must carry at least one key".to_string(),
            });
        }
        if map.len() > MAX_SCOPE_KEYS {
            return Err(CortexError::InvalidInput {
                reason: format!(
                    "scope carries {} keys, maximum is {MAX_SCOPE_KEYS}",
                    map.len()
                ),
            });
        }
        Ok(Self(map))
    }

    /// Get a key's value, if present.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    /// Iterate over the scope's key/value pairs in canonical order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Number of keys carried by this scope.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Stable string form suitable for a vector-store payload filter key or a
    /// log field — `k1=v1,k2=v2` in canonical key order.
    pub fn canonical_key(&self) -> String {
        self.0
            .iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join(",")
    }
}

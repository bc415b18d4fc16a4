//! Compiled-validator cache (C6, part two).
//!
//! Schema compilation is too expensive to repeat per request, so each
//! operation's body and query validators are compiled once — lazily, on
//! first use — and shared behind an `Arc`. Double-checked locking avoids
//! two requests racing to compile the same schema right after startup.

use jsonschema::Validator;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use tracing::debug;

#[derive(Clone, Default)]
pub struct ValidatorCache {
    cache: Arc<RwLock<HashMap<String, Arc<Validator>>>>,
}

impl ValidatorCache {
    pub fn new() -> Self {
        Self::default()
    }

    fn cache_key(route_key: &str, kind: &str) -> String {
        format!("{route_key}:{kind}")
    }

    /// Return the cached validator for `(route_key, kind)`, compiling and
    /// caching it from `schema` on first use. Returns `None` if `schema`
    /// fails to compile — callers treat that as a startup bug, not a
    /// per-request condition, since schemas are translated and checked
    /// ahead of time.
    pub fn get_or_compile(
        &self,
        route_key: &str,
        kind: &str,
        schema: &Value,
    ) -> Option<Arc<Validator>> {
        let key = Self::cache_key(route_key, kind);

        {
            let cache = self.cache.read().expect("validator cache lock poisoned");
            if let Some(validator) = cache.get(&key) {
                debug!(cache_key = %key, "schema validator cache hit");
                return Some(Arc::clone(validator));
            }
        }

        let compiled = jsonschema::validator_for(schema).ok()?;
        let validator = Arc::new(compiled);
        let mut cache = self.cache.write().expect("validator cache lock poisoned");
        if let Some(existing) = cache.get(&key) {
            return Some(Arc::clone(existing));
        }
        cache.insert(key, Arc::clone(&validator));
        Some(validator)
    }

    pub fn size(&self) -> usize {
        self.cache.read().expect("validator cache lock poisoned").len()
    }
}

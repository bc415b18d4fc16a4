//! Fixture archive: a mapping from resource id (the value of a schema's
//! `x-resourceId`) to the literal JSON value used to seed generated
//! responses.
//!
//! Fixtures are loaded once at startup and are never mutated in place — every
//! caller that needs to overlay an id or request field onto a fixture value
//! must clone it first. [`Fixtures::get`] returns a borrow; callers clone.

use anyhow::{Context, Result};
use serde_json::Value;
use std::collections::HashMap;
use std::path::Path;

#[derive(Debug, Clone, Default)]
pub struct Fixtures(HashMap<String, Value>);

impl Fixtures {
    pub fn from_map(map: HashMap<String, Value>) -> Self {
        Self(map)
    }

    pub fn from_str(content: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(content).context("failed to parse fixtures")?;
        let Value::Object(obj) = value else {
            anyhow::bail!("fixtures file must contain a top-level JSON object");
        };
        Ok(Self(obj.into_iter().collect()))
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read fixtures at {}", path.display()))?;
        Self::from_str(&content)
    }

    /// Look up a fixture by resource id. Returns a borrow; the generator is
    /// responsible for cloning before any in-place edit (ID substitution,
    /// request-field overlay) so concurrent requests never see each other's
    /// mutations.
    pub fn get(&self, resource_id: &str) -> Option<&Value> {
        self.0.get(resource_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loads_object_fixtures() {
        let fixtures = Fixtures::from_str(r#"{"charge": {"id": "ch_123", "amount": 100}}"#).unwrap();
        assert_eq!(fixtures.get("charge").unwrap()["amount"], 100);
        assert!(fixtures.get("missing").is_none());
    }

    #[test]
    fn rejects_non_object_top_level() {
        assert!(Fixtures::from_str("[1, 2, 3]").is_err());
    }

    #[test]
    fn clones_are_independent() {
        let fixtures = Fixtures::from_str(r#"{"charge": {"id": "ch_123"}}"#).unwrap();
        let mut copy = fixtures.get("charge").unwrap().clone();
        copy["id"] = Value::String("ch_NEW".into());
        assert_eq!(fixtures.get("charge").unwrap()["id"], "ch_123");
    }
}

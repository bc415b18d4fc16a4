//! Expansion parser and tree (C7).
//!
//! `expand` arrives as a single dotted path or an array of them, e.g.
//! `charge.customer.default_source`. Entries sharing a prefix collapse into
//! one tree; `*` anywhere in a path sets the `wildcard` flag on its node.
//! Leaves are nodes with no children, not `null`.

use serde_json::Value;
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ExpansionNode {
    pub children: HashMap<String, ExpansionNode>,
    pub wildcard: bool,
}

impl ExpansionNode {
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty() && !self.wildcard
    }

    fn insert_path(&mut self, segments: &[&str]) {
        let Some((head, rest)) = segments.split_first() else {
            return;
        };
        if *head == "*" {
            self.wildcard = true;
            return;
        }
        let child = self.children.entry(head.to_string()).or_default();
        child.insert_path(rest);
    }

    /// The child node for `key`, inherited as a fresh wildcard node when this
    /// node is itself a wildcard (a wildcard expansion descends into every
    /// property, not just the ones explicitly named).
    pub fn child(&self, key: &str) -> Option<ExpansionNode> {
        if let Some(node) = self.children.get(key) {
            return Some(node.clone());
        }
        if self.wildcard {
            return Some(ExpansionNode {
                wildcard: true,
                ..Default::default()
            });
        }
        None
    }
}

/// Parse the `expand` parameter (a string or array of strings) into an
/// expansion tree, or `None` if no expansion was requested.
pub fn parse_expand(value: Option<&Value>) -> Option<ExpansionNode> {
    let entries: Vec<String> = match value? {
        Value::String(s) => vec![s.clone()],
        Value::Array(items) => items
            .iter()
            .filter_map(|v| v.as_str().map(str::to_string))
            .collect(),
        _ => return None,
    };
    if entries.is_empty() {
        return None;
    }
    let mut root = ExpansionNode::default();
    for entry in &entries {
        let segments: Vec<&str> = entry.split('.').collect();
        root.insert_path(&segments);
    }
    Some(root)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn single_path_builds_chain() {
        let tree = parse_expand(Some(&json!("charge.customer"))).unwrap();
        let customer = tree.child("charge").unwrap();
        assert!(customer.child("customer").unwrap().is_leaf());
    }

    #[test]
    fn shared_prefix_merges() {
        let tree =
            parse_expand(Some(&json!(["charge.customer", "charge.invoice"]))).unwrap();
        let charge = tree.child("charge").unwrap();
        assert!(charge.child("customer").is_some());
        assert!(charge.child("invoice").is_some());
    }

    #[test]
    fn wildcard_sets_flag_and_is_inherited() {
        let tree = parse_expand(Some(&json!("data.*"))).unwrap();
        let data = tree.child("data").unwrap();
        assert!(data.wildcard);
        let inherited = data.child("anything").unwrap();
        assert!(inherited.wildcard);
        assert!(inherited.is_leaf());
    }

    #[test]
    fn absent_value_yields_none() {
        assert!(parse_expand(None).is_none());
    }

    #[test]
    fn empty_array_yields_none() {
        assert!(parse_expand(Some(&json!([]))).is_none());
    }
}

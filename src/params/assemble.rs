//! Nested-type assembler (C4): turns an ordered list of bracket-notation
//! key/value pairs into a nested JSON value.
//!
//! Keys are tokenized into a mandatory raw name followed by `[]` (array
//! marker) and `[name]` (map key) tokens. Each pair builds a singleton
//! structure that is merged into a running accumulator; the merge rule for
//! arrays (collapse adjacent single-key maps, otherwise append) is what lets
//! `obj[][k1]=a&obj[][k2]=b` come out as one object instead of two.

use indexmap::IndexMap;
use serde_json::Value;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssembleError {
    pub key: String,
    pub reason: &'static str,
}

impl fmt::Display for AssembleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "malformed parameter key {:?}: {}", self.key, self.reason)
    }
}

impl std::error::Error for AssembleError {}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Array,
    MapKey(String),
}

#[derive(Debug, Clone, PartialEq)]
enum Node {
    Leaf(String),
    Map(IndexMap<String, Node>),
    List(Vec<Node>),
}

fn parse_key(key: &str) -> Result<(String, Vec<Token>), AssembleError> {
    if key.is_empty() || key.starts_with('[') {
        return Err(AssembleError {
            key: key.to_string(),
            reason: "must start with a raw name",
        });
    }
    let (raw, mut rest) = match key.find('[') {
        Some(pos) => (&key[..pos], &key[pos..]),
        None => (key, ""),
    };
    let mut tokens = Vec::new();
    while !rest.is_empty() {
        if !rest.starts_with('[') {
            return Err(AssembleError {
                key: key.to_string(),
                reason: "expected '[' to start a bracket token",
            });
        }
        let Some(close) = rest.find(']') else {
            return Err(AssembleError {
                key: key.to_string(),
                reason: "unterminated bracket token",
            });
        };
        let inner = &rest[1..close];
        tokens.push(if inner.is_empty() {
            Token::Array
        } else {
            Token::MapKey(inner.to_string())
        });
        rest = &rest[close + 1..];
    }
    Ok((raw.to_string(), tokens))
}

fn build(tokens: &[Token], leaf: Node) -> Node {
    let mut node = leaf;
    for token in tokens.iter().rev() {
        node = match token {
            Token::Array => Node::List(vec![node]),
            Token::MapKey(name) => {
                let mut m = IndexMap::new();
                m.insert(name.clone(), node);
                Node::Map(m)
            }
        };
    }
    node
}

/// Can `incoming`'s keys be deeply merged into `last` in place, or would
/// doing so clobber a scalar? Per pair key: either the key is absent from
/// `last`, or both sides are non-leaf (map/array) — never two conflicting
/// scalars.
fn collapsible(last: &IndexMap<String, Node>, incoming: &IndexMap<String, Node>) -> bool {
    incoming.iter().all(|(k, v)| match last.get(k) {
        None => true,
        Some(existing) => !matches!(existing, Node::Leaf(_)) && !matches!(v, Node::Leaf(_)),
    })
}

fn merge_list_elem(acc: &mut Vec<Node>, incoming: Node) {
    if let (Some(Node::Map(last_map)), Node::Map(incoming_map)) = (acc.last_mut(), &incoming) {
        if collapsible(last_map, incoming_map) {
            let Node::Map(incoming_map) = incoming else {
                unreachable!()
            };
            for (k, v) in incoming_map {
                match last_map.get_mut(&k) {
                    Some(existing) => merge(existing, v),
                    None => {
                        last_map.insert(k, v);
                    }
                }
            }
            return;
        }
    }
    acc.push(incoming);
}

fn merge(acc: &mut Node, incoming: Node) {
    match (acc, incoming) {
        (Node::Map(a), Node::Map(b)) => {
            for (k, v) in b {
                match a.get_mut(&k) {
                    Some(existing) => merge(existing, v),
                    None => {
                        a.insert(k, v);
                    }
                }
            }
        }
        (Node::List(a), Node::List(b)) => {
            for elem in b {
                merge_list_elem(a, elem);
            }
        }
        (slot, incoming) => {
            *slot = incoming;
        }
    }
}

fn to_value(node: Node) -> Value {
    match node {
        Node::Leaf(s) => Value::String(s),
        Node::Map(m) => Value::Object(m.into_iter().map(|(k, v)| (k, to_value(v))).collect()),
        Node::List(l) => Value::Array(l.into_iter().map(to_value).collect()),
    }
}

/// Assemble an ordered pair list into a nested JSON object whose leaves are
/// strings.
pub fn assemble(pairs: &[(String, String)]) -> Result<Value, AssembleError> {
    let mut acc = Node::Map(IndexMap::new());
    for (key, value) in pairs {
        let (raw, tokens) = parse_key(key)?;
        let built = build(&tokens, Node::Leaf(value.clone()));
        let mut singleton = IndexMap::new();
        singleton.insert(raw, built);
        merge(&mut acc, Node::Map(singleton));
    }
    Ok(to_value(acc))
}

//! Data generator (C8): synthesizes a response value for a schema, driven by
//! a fixture-seeded example, an optional expansion tree, and an optional
//! resolved primary ID.
//!
//! The recursive procedure below mirrors the ordered decision list in the
//! design: dereference, check the expansion precondition, seed an example
//! from a fixture, choose expanded vs. unexpanded branches, handle
//! `anyOf`/nullable, list resources, primitives, and finally structured
//! objects with per-property expansion selection and ID substitution.
//! Generation is pure — same inputs always produce the same bytes.

use crate::expand::ExpansionNode;
use crate::fixtures::Fixtures;
use crate::spec::{Schema, Spec};
use serde_json::{Map, Value};

/// An example value, distinguishing "no example was supplied" from
/// "the supplied example is JSON null".
#[derive(Debug, Clone)]
pub enum Example {
    Absent,
    Value(Value),
}

impl Example {
    fn as_value(&self) -> Option<&Value> {
        match self {
            Example::Value(v) => Some(v),
            Example::Absent => None,
        }
    }

    fn is_explicit_null(&self) -> bool {
        matches!(self, Example::Value(Value::Null))
    }

    fn object_field(&self, key: &str) -> Example {
        match self.as_value().and_then(|v| v.as_object()).and_then(|m| m.get(key)) {
            Some(v) => Example::Value(v.clone()),
            None => Example::Absent,
        }
    }
}

struct GenCtx<'a> {
    spec: &'a Spec,
    fixtures: &'a Fixtures,
    request_path: &'a str,
    primary_id: Option<&'a str>,
}

/// Entry point: generate a value for `schema` at the top of a response,
/// optionally expanded per `expansions`, with `primary_id` resolved from the
/// request's URL (if the route declared one).
pub fn generate(
    spec: &Spec,
    fixtures: &Fixtures,
    schema: &Schema,
    expansions: Option<&ExpansionNode>,
    request_path: &str,
    primary_id: Option<&str>,
) -> Value {
    let ctx = GenCtx {
        spec,
        fixtures,
        request_path,
        primary_id,
    };
    gen(&ctx, schema, Example::Absent, expansions, None, true)
}

/// `is_root` is true only for the object that corresponds to the route's
/// primary resource (the response root, or a schema reached from it purely
/// through `$ref`/`anyOf`/expansion substitution). It gates ID substitution
/// in [`gen_object`] so a nested resource (a list item, an expanded field)
/// keeps its own `id` instead of inheriting the URL's.
fn gen(
    ctx: &GenCtx,
    schema: &Schema,
    example: Example,
    expansions: Option<&ExpansionNode>,
    replaced_id: Option<String>,
    is_root: bool,
) -> Value {
    // 1. Dereference $ref once.
    let schema = match &schema.reference {
        Some(reference) => ctx
            .spec
            .resolve_ref(reference)
            .unwrap_or_else(|| panic!("generator: unresolvable $ref {reference:?}")),
        None => schema,
    };

    // 2. Expansion precondition.
    if let (Some(node), Some(declared)) = (expansions, &schema.x_expandable_fields) {
        for key in node.children.keys() {
            if !declared.iter().any(|d| d == key) {
                panic!("generator: expansion not supported for field {key:?}");
            }
        }
    }

    // 3. Seed example from fixture.
    let example = if matches!(example, Example::Absent) {
        if let Some(resource_id) = &schema.x_resource_id {
            let fixture = ctx
                .fixtures
                .get(resource_id)
                .unwrap_or_else(|| panic!("generator: no fixture for resource {resource_id:?}"));
            Example::Value(fixture.clone())
        } else {
            example
        }
    } else {
        example
    };

    // 4. Expansion resource handling.
    if let Some(expansion_resources) = &schema.x_expansion_resources {
        if expansions.is_some() {
            let expanded_form = expansion_resources
                .one_of
                .first()
                .unwrap_or_else(|| panic!("generator: x-expansionResources.oneOf is empty"));
            return gen(ctx, expanded_form, Example::Absent, expansions, replaced_id, is_root);
        }
        if let Some(any_of) = &schema.any_of {
            if let Some(unexpanded) = any_of.first() {
                return gen(ctx, unexpanded, example, expansions, replaced_id, is_root);
            }
        }
    }

    // 5. Nullable single-branch anyOf.
    if let Some(any_of) = &schema.any_of {
        if any_of.len() == 1 && schema.nullable.unwrap_or(false) {
            if example.is_explicit_null() && expansions.is_none() {
                return Value::Null;
            }
            return gen(ctx, &any_of[0], example, expansions, replaced_id, is_root);
        }
        // 6. Multi-branch anyOf (and single-branch without nullable): pick
        // the first branch, with no example carried over from the parent.
        return gen(ctx, &any_of[0], Example::Absent, expansions, replaced_id, is_root);
    }

    // 7. List resources.
    if schema.is_list_resource() {
        return gen_list(ctx, schema, &example, expansions, replaced_id.as_deref());
    }

    let schema_type = schema.schema_type.as_deref();

    // 8. Primitives.
    if matches!(schema_type, Some("boolean") | Some("integer") | Some("number")) {
        return example.as_value().cloned().unwrap_or(Value::Null);
    }
    if schema_type == Some("string") {
        let value = example.as_value().cloned().unwrap_or(Value::Null);
        return substitute_string(value, replaced_id.as_deref(), ctx.primary_id);
    }

    // 9. Generic object/array (no properties declared).
    if schema.properties.is_none() {
        return example.as_value().cloned().unwrap_or(Value::Null);
    }

    // 10. Structured object.
    gen_object(ctx, schema, &example, expansions, replaced_id, is_root)
}

fn substitute_string(value: Value, replaced_id: Option<&str>, primary_id: Option<&str>) -> Value {
    match (&value, replaced_id, primary_id) {
        (Value::String(s), Some(old), Some(new)) if s == old => Value::String(new.to_string()),
        _ => value,
    }
}

fn gen_object(
    ctx: &GenCtx,
    schema: &Schema,
    example: &Example,
    expansions: Option<&ExpansionNode>,
    mut replaced_id: Option<String>,
    is_root: bool,
) -> Value {
    let properties = schema
        .properties
        .as_ref()
        .expect("gen_object called on a schema with no properties");

    // ID substitution only applies to the route's primary resource: a nested
    // resource (a list item, an expanded field) keeps its own fixture `id`.
    let mut overridden_id: Option<Value> = None;
    if let (Some(new_id), true, true) = (ctx.primary_id, properties.contains_key("id"), is_root) {
        if let Some(old) = example.object_field("id").as_value() {
            if let Value::String(old_str) = old {
                replaced_id = Some(old_str.clone());
            }
        }
        overridden_id = Some(Value::String(new_id.to_string()));
    }

    let mut out = Map::new();
    for (key, prop_schema) in properties {
        let sub_expansion = expansions.and_then(|e| e.child(key));
        let field_example = example.object_field(key);
        let has_example = matches!(field_example, Example::Value(_));
        if !has_example && sub_expansion.is_none() {
            continue;
        }
        let field_example = if key == "id" {
            match &overridden_id {
                Some(new_id) => Example::Value(new_id.clone()),
                None => field_example,
            }
        } else {
            field_example
        };
        let value = gen(
            ctx,
            prop_schema,
            field_example,
            sub_expansion.as_ref(),
            replaced_id.clone(),
            false,
        );
        out.insert(key.clone(), value);
    }
    Value::Object(out)
}

fn gen_list(
    ctx: &GenCtx,
    schema: &Schema,
    example: &Example,
    expansions: Option<&ExpansionNode>,
    replaced_id: Option<&str>,
) -> Value {
    let properties = schema.properties.as_ref().expect("list resource without properties");
    let data_schema = properties
        .get("data")
        .and_then(|s| s.items.as_deref())
        .expect("list resource without data.items");
    let data_expansion = expansions.and_then(|e| e.child("data"));

    // A list's item is always a distinct nested resource, never the route's
    // primary one, even when the list itself is the response root.
    let item = gen(
        ctx,
        data_schema,
        Example::Absent,
        data_expansion.as_ref(),
        replaced_id.map(str::to_string),
        false,
    );

    let url_schema_pattern = properties.get("url").and_then(|s| s.pattern.as_deref());
    let url = if let Some(pattern) = url_schema_pattern {
        pattern.strip_prefix('^').unwrap_or(pattern).to_string()
    } else if let Some(url) = example.as_value().and_then(|v| v.get("url")).and_then(Value::as_str) {
        url.to_string()
    } else {
        ctx.request_path.to_string()
    };
    let url = match substitute_string(Value::String(url), replaced_id, ctx.primary_id) {
        Value::String(s) => s,
        _ => unreachable!(),
    };

    let mut out = Map::new();
    for key in properties.keys() {
        let value = match key.as_str() {
            "object" => Value::String("list".to_string()),
            "data" => Value::Array(vec![item.clone()]),
            "has_more" => Value::Bool(false),
            "total_count" => Value::Number(1.into()),
            "url" => Value::String(url.clone()),
            _ => Value::Null,
        };
        out.insert(key.clone(), value);
    }
    Value::Object(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::HashMap;

    fn schema_from(json_str: &str) -> Schema {
        serde_json::from_str(json_str).unwrap()
    }

    fn empty_spec() -> Spec {
        Spec::default()
    }

    #[test]
    fn primitive_returns_example() {
        let spec = empty_spec();
        let fixtures = Fixtures::default();
        let schema = schema_from(r#"{"type": "integer"}"#);
        let ctx = GenCtx {
            spec: &spec,
            fixtures: &fixtures,
            request_path: "/v1/x",
            primary_id: None,
        };
        let value = gen(&ctx, &schema, Example::Value(json!(42)), None, None, true);
        assert_eq!(value, json!(42));
    }

    #[test]
    fn seeds_example_from_fixture() {
        let mut map = HashMap::new();
        map.insert("charge".to_string(), json!({"id": "ch_123", "amount": 100}));
        let fixtures = Fixtures::from_map(map);
        let spec = empty_spec();
        let schema = schema_from(
            r#"{"type": "object", "x-resourceId": "charge", "properties": {"id": {"type": "string"}, "amount": {"type": "integer"}}}"#,
        );
        let result = generate(&spec, &fixtures, &schema, None, "/v1/charges/ch_123", None);
        assert_eq!(result, json!({"id": "ch_123", "amount": 100}));
    }

    #[test]
    fn substitutes_primary_id() {
        let mut map = HashMap::new();
        map.insert("charge".to_string(), json!({"id": "ch_123", "amount": 100}));
        let fixtures = Fixtures::from_map(map);
        let spec = empty_spec();
        let schema = schema_from(
            r#"{"type": "object", "x-resourceId": "charge", "properties": {"id": {"type": "string"}, "amount": {"type": "integer"}}}"#,
        );
        let result = generate(&spec, &fixtures, &schema, None, "/v1/charges/ch_NEW", Some("ch_NEW"));
        assert_eq!(result["id"], json!("ch_NEW"));
    }

    #[test]
    fn nullable_single_branch_with_null_example_returns_null() {
        let spec = empty_spec();
        let fixtures = Fixtures::default();
        let schema = schema_from(r#"{"nullable": true, "anyOf": [{"type": "string"}]}"#);
        let ctx = GenCtx {
            spec: &spec,
            fixtures: &fixtures,
            request_path: "/v1/x",
            primary_id: None,
        };
        let value = gen(&ctx, &schema, Example::Value(Value::Null), None, None, true);
        assert_eq!(value, Value::Null);
    }

    #[test]
    fn list_resource_emits_singleton_list() {
        let mut map = HashMap::new();
        map.insert("charge".to_string(), json!({"id": "ch_1"}));
        let fixtures = Fixtures::from_map(map);
        let spec = empty_spec();
        let schema = schema_from(
            r#"{
                "type": "object",
                "properties": {
                    "object": {"type": "string", "enum": ["list"]},
                    "data": {"type": "array", "items": {"type": "object", "x-resourceId": "charge", "properties": {"id": {"type": "string"}}}},
                    "has_more": {"type": "boolean"},
                    "total_count": {"type": "integer"},
                    "url": {"type": "string", "pattern": "^/v1/charges"}
                }
            }"#,
        );
        let result = generate(&spec, &fixtures, &schema, None, "/v1/charges", None);
        assert_eq!(result["object"], json!("list"));
        assert_eq!(result["has_more"], json!(false));
        assert_eq!(result["total_count"], json!(1));
        assert_eq!(result["url"], json!("/v1/charges"));
        assert_eq!(result["data"][0]["id"], json!("ch_1"));
    }

    #[test]
    fn nested_resource_keeps_its_own_id() {
        let mut map = HashMap::new();
        map.insert(
            "charge".to_string(),
            json!({"id": "ch_123", "refund": {"id": "re_123"}}),
        );
        map.insert("refund".to_string(), json!({"id": "re_123"}));
        let fixtures = Fixtures::from_map(map);
        let spec = empty_spec();
        let schema = schema_from(
            r#"{
                "type": "object",
                "x-resourceId": "charge",
                "properties": {
                    "id": {"type": "string"},
                    "refund": {
                        "type": "object",
                        "x-resourceId": "refund",
                        "properties": {"id": {"type": "string"}}
                    }
                }
            }"#,
        );
        let result = generate(&spec, &fixtures, &schema, None, "/v1/charges/ch_NEW", Some("ch_NEW"));
        assert_eq!(result["id"], json!("ch_NEW"));
        assert_eq!(result["refund"]["id"], json!("re_123"));
    }
}

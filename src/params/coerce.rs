//! Leaf coercer (C5): converts the string leaves produced by the assembler
//! into the JSON type their schema declares.
//!
//! Only scalar leaves are coerced — a string sitting where the schema says
//! `boolean`, `integer`, or `number`. Object leaves are walked by property;
//! arrays are not coerced element-wise (a known limitation — an array leaf
//! passes through untouched regardless of its `items` schema). A string
//! that fails to parse under its declared type falls back to that type's
//! zero value (`false`, `0`, `0.0`) rather than erroring, matching the
//! documented "best-effort" coercion behavior — only the shape of a value
//! (array vs not) is ever rejected.

use crate::spec::Schema;
use serde_json::Value;

/// Coerce `value` in place according to `schema`. `$ref`s are assumed
/// already resolved by the caller (coercion runs after the assembler, before
/// the schema is dereferenced further, so callers pass the deref'd schema).
pub fn coerce(value: Value, schema: &Schema) -> Value {
    match value {
        Value::String(s) => coerce_scalar(&s, schema.schema_type.as_deref()),
        Value::Object(map) => {
            let properties = schema.properties.as_ref();
            Value::Object(
                map.into_iter()
                    .map(|(k, v)| {
                        let coerced = match properties.and_then(|p| p.get(&k)) {
                            Some(prop_schema) => coerce(v, prop_schema),
                            None => v,
                        };
                        (k, coerced)
                    })
                    .collect(),
            )
        }
        other => other,
    }
}

fn coerce_scalar(s: &str, schema_type: Option<&str>) -> Value {
    match schema_type {
        Some("boolean") => Value::Bool(s == "true"),
        Some("integer") => Value::Number(s.parse::<i64>().unwrap_or(0).into()),
        Some("number") => serde_json::Number::from_f64(s.parse::<f64>().unwrap_or(0.0))
            .map(Value::Number)
            .unwrap_or_else(|| Value::Number(0.into())),
        _ => Value::String(s.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn schema(schema_type: &str) -> Schema {
        Schema {
            schema_type: Some(schema_type.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn coerces_boolean() {
        assert_eq!(coerce(json!("true"), &schema("boolean")), json!(true));
        assert_eq!(coerce(json!("nope"), &schema("boolean")), json!(false));
    }

    #[test]
    fn coerces_integer() {
        assert_eq!(coerce(json!("42"), &schema("integer")), json!(42));
        assert_eq!(coerce(json!("bogus"), &schema("integer")), json!(0));
    }

    #[test]
    fn coerces_number() {
        assert_eq!(coerce(json!("3.5"), &schema("number")), json!(3.5));
        assert_eq!(coerce(json!("nan-ish"), &schema("number")), json!(0.0));
    }

    #[test]
    fn leaves_strings_alone() {
        assert_eq!(coerce(json!("hello"), &schema("string")), json!("hello"));
    }

    #[test]
    fn recurses_into_object_properties() {
        let mut properties = indexmap::IndexMap::new();
        properties.insert("active".to_string(), schema("boolean"));
        let obj_schema = Schema {
            schema_type: Some("object".to_string()),
            properties: Some(properties),
            ..Default::default()
        };
        let result = coerce(json!({"active": "true", "other": "x"}), &obj_schema);
        assert_eq!(result, json!({"active": true, "other": "x"}));
    }

    #[test]
    fn leaves_array_items_uncoerced() {
        let arr_schema = Schema {
            schema_type: Some("array".to_string()),
            items: Some(Box::new(schema("integer"))),
            ..Default::default()
        };
        let result = coerce(json!(["1", "2"]), &arr_schema);
        assert_eq!(result, json!(["1", "2"]));
    }
}

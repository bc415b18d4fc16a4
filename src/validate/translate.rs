//! OpenAPI-to-JSON-Schema translator (C6, part one).
//!
//! The validator crate speaks standard JSON Schema; OpenAPI's `nullable`
//! keyword does not exist there. Translation folds `nullable: true` into
//! either a `type` array or an extra `{const: null}` branch in `anyOf`, and
//! otherwise carries the whitelisted schema attributes straight through.

use crate::spec::{AdditionalProperties, Parameter, Schema};
use serde_json::{json, Map, Value};

/// Translate a single OpenAPI schema into a JSON Schema document.
pub fn translate_schema(schema: &Schema) -> Value {
    if let Some(reference) = &schema.reference {
        return json!({ "$ref": reference });
    }

    let mut any_of_json: Option<Vec<Value>> =
        schema.any_of.as_ref().map(|variants| variants.iter().map(translate_schema).collect());

    let nullable = schema.nullable.unwrap_or(false);
    let mut type_value = schema.schema_type.as_ref().map(|t| {
        if nullable {
            json!([t, "null"])
        } else {
            json!(t)
        }
    });

    if nullable {
        if let Some(variants) = &mut any_of_json {
            variants.push(json!({ "const": Value::Null }));
        }
    }

    let mut map = Map::new();
    if let Some(t) = type_value.take() {
        map.insert("type".to_string(), t);
    }
    if let Some(format) = &schema.format {
        map.insert("format".to_string(), json!(format));
    }
    if let Some(pattern) = &schema.pattern {
        map.insert("pattern".to_string(), json!(pattern));
    }
    if let Some(max_length) = schema.max_length {
        map.insert("maxLength".to_string(), json!(max_length));
    }
    if let Some(values) = &schema.enum_values {
        map.insert("enum".to_string(), json!(values));
    }
    if let Some(items) = &schema.items {
        map.insert("items".to_string(), translate_schema(items));
    }
    if let Some(properties) = &schema.properties {
        let translated: Map<String, Value> = properties
            .iter()
            .map(|(name, prop)| (name.clone(), translate_schema(prop)))
            .collect();
        map.insert("properties".to_string(), Value::Object(translated));
    }
    if let Some(required) = &schema.required {
        map.insert("required".to_string(), json!(required));
    }
    if let Some(additional) = &schema.additional_properties {
        let value = match additional {
            AdditionalProperties::Bool(b) => json!(b),
            AdditionalProperties::Schema(s) => translate_schema(s),
        };
        map.insert("additionalProperties".to_string(), value);
    }
    if let Some(variants) = any_of_json {
        map.insert("anyOf".to_string(), json!(variants));
    }
    Value::Object(map)
}

/// Synthesize a schema describing the recognized query parameters of an
/// operation: `type: object`, `additionalProperties: false`, one property
/// per declared query parameter, `required` from each parameter's flag.
/// Parameters without their own schema default to `type: object`.
pub fn synthesize_query_schema(parameters: &[Parameter]) -> Value {
    use crate::spec::ParameterLocation;

    let mut properties = Map::new();
    let mut required = Vec::new();
    for param in parameters {
        if param.location != ParameterLocation::Query {
            continue;
        }
        let schema_json = match &param.schema {
            Some(schema) => translate_schema(schema),
            None => json!({ "type": "object" }),
        };
        properties.insert(param.name.clone(), schema_json);
        if param.required {
            required.push(param.name.clone());
        }
    }
    json!({
        "type": "object",
        "additionalProperties": false,
        "properties": properties,
        "required": required,
    })
}

//! Loading an OpenAPI document into a [`Spec`] and checking the startup
//! invariants from the data model: `$ref` completeness, every `200`
//! operation shaped as JSON-or-binary, and every `x-resourceId` backed by a
//! fixture.

use super::model::{Operation, Schema, Spec};
use crate::fixtures::Fixtures;
use anyhow::{anyhow, bail, Context, Result};
use http::Method;
use std::path::Path;

/// A single compiled route: the verb, the literal path pattern it came from,
/// and the operation it dispatches to. Regex compilation happens in
/// `router::build`, which consumes a `Vec<RouteMeta>`.
#[derive(Debug, Clone)]
pub struct RouteMeta {
    pub method: Method,
    pub path_pattern: String,
    pub operation: Operation,
}

pub fn load_spec_from_str(content: &str) -> Result<Spec> {
    let spec: Spec = serde_json::from_str(content).context("failed to parse OpenAPI document")?;
    check_invariants(&spec)?;
    Ok(spec)
}

pub fn load_spec_from_file(path: &Path) -> Result<Spec> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read OpenAPI spec at {}", path.display()))?;
    load_spec_from_str(&content)
}

/// Verify the invariants from §3 of the data model: every `$ref` resolves,
/// path templates are well formed, and (when `fixtures` is supplied) every
/// `x-resourceId` has a matching fixture.
pub fn check_invariants(spec: &Spec) -> Result<()> {
    for (path, methods) in &spec.paths {
        validate_path_pattern(path)?;
        for (verb, operation) in methods {
            let location = format!("{verb} {path}");
            if let Some(schema) = operation.form_body_schema() {
                check_refs(spec, schema, &location)?;
            }
            for param in &operation.parameters {
                if let Some(schema) = &param.schema {
                    check_refs(spec, schema, &location)?;
                }
            }
            if let Some(resp) = operation.responses.get("200") {
                let has_json = resp.content.contains_key("application/json");
                let binary_count = resp.content.keys().filter(|k| *k != "application/json").count();
                if has_json && binary_count > 0 {
                    bail!("{location}: 200 response mixes application/json with a binary media type");
                }
                if let Some(schema) = operation.json_response_schema() {
                    check_refs(spec, schema, &location)?;
                }
            }
        }
    }
    for (name, schema) in &spec.components.schemas {
        check_refs(spec, schema, &format!("#/components/schemas/{name}"))?;
    }
    Ok(())
}

fn validate_path_pattern(path: &str) -> Result<()> {
    for segment in path.split('/') {
        if segment.starts_with('{') {
            if !segment.ends_with('}') {
                bail!("malformed path placeholder in {path:?}: {segment:?}");
            }
            let name = &segment[1..segment.len() - 1];
            if name.is_empty() || !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
                bail!("path placeholder {{{name}}} in {path:?} is not a \\w+ identifier");
            }
        }
    }
    Ok(())
}

fn check_refs(spec: &Spec, schema: &Schema, location: &str) -> Result<()> {
    if let Some(reference) = &schema.reference {
        if spec.resolve_ref(reference).is_none() {
            bail!("{location}: unresolvable $ref {reference:?}");
        }
        return Ok(());
    }
    if let Some(items) = &schema.items {
        check_refs(spec, items, location)?;
    }
    if let Some(properties) = &schema.properties {
        for prop in properties.values() {
            check_refs(spec, prop, location)?;
        }
    }
    if let Some(variants) = &schema.any_of {
        for variant in variants {
            check_refs(spec, variant, location)?;
        }
    }
    if let Some(expansion) = &schema.x_expansion_resources {
        for variant in &expansion.one_of {
            check_refs(spec, variant, location)?;
        }
    }
    Ok(())
}

/// Verify that every schema declaring `x-resourceId` has a corresponding
/// fixture. This is split from [`check_invariants`] because it needs the
/// loaded `Fixtures`, which in turn are loaded independently of the spec.
pub fn check_fixtures_cover_resources(spec: &Spec, fixtures: &Fixtures) -> Result<()> {
    for (name, schema) in &spec.components.schemas {
        walk_resource_ids(schema, name, fixtures)?;
    }
    for methods in spec.paths.values() {
        for operation in methods.values() {
            if let Some(schema) = operation.json_response_schema() {
                walk_resource_ids(schema, "<inline response schema>", fixtures)?;
            }
        }
    }
    Ok(())
}

fn walk_resource_ids(schema: &Schema, location: &str, fixtures: &Fixtures) -> Result<()> {
    if let Some(id) = &schema.x_resource_id {
        if fixtures.get(id).is_none() {
            return Err(anyhow!(
                "{location}: schema declares x-resourceId {id:?} but no fixture exists for it"
            ));
        }
    }
    if let Some(items) = &schema.items {
        walk_resource_ids(items, location, fixtures)?;
    }
    if let Some(properties) = &schema.properties {
        for prop in properties.values() {
            walk_resource_ids(prop, location, fixtures)?;
        }
    }
    if let Some(variants) = &schema.any_of {
        for variant in variants {
            walk_resource_ids(variant, location, fixtures)?;
        }
    }
    if let Some(expansion) = &schema.x_expansion_resources {
        for variant in &expansion.one_of {
            walk_resource_ids(variant, location, fixtures)?;
        }
    }
    Ok(())
}

/// Flatten `spec.paths` into a list of routes, one per declared method.
/// Methods not in the supported set are skipped, matching the router's
/// method bucket list.
pub fn build_routes(spec: &Spec) -> Vec<RouteMeta> {
    const SUPPORTED: &[&str] = &["GET", "POST", "PUT", "DELETE", "PATCH", "HEAD", "OPTIONS"];
    let mut routes = Vec::new();
    for (path, methods) in &spec.paths {
        for (verb, operation) in methods {
            let upper = verb.to_uppercase();
            if !SUPPORTED.contains(&upper.as_str()) {
                continue;
            }
            let Ok(method) = upper.parse::<Method>() else {
                continue;
            };
            routes.push(RouteMeta {
                method,
                path_pattern: path.clone(),
                operation: operation.clone(),
            });
        }
    }
    routes
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minimal_spec_json() -> &'static str {
        r#"{
            "info": {"title": "Test", "version": "2020-01-01"},
            "servers": [{"url": "https://api.example.com/v1"}],
            "paths": {
                "/charges/{id}": {
                    "get": {
                        "parameters": [{"name": "id", "in": "path", "required": true, "schema": {"type": "string"}}],
                        "responses": {"200": {"content": {"application/json": {"schema": {"$ref": "#/components/schemas/charge"}}}}}
                    }
                }
            },
            "components": {
                "schemas": {
                    "charge": {"type": "object", "properties": {"id": {"type": "string"}}, "x-resourceId": "charge"}
                }
            }
        }"#
    }

    #[test]
    fn loads_minimal_spec() {
        let spec = load_spec_from_str(minimal_spec_json()).unwrap();
        assert_eq!(spec.info.version, "2020-01-01");
        assert_eq!(spec.base_path(), "/v1");
        assert_eq!(build_routes(&spec).len(), 1);
    }

    #[test]
    fn rejects_unknown_schema_field() {
        let bad = minimal_spec_json().replace(
            "\"x-resourceId\": \"charge\"",
            "\"x-resourceId\": \"charge\", \"x-bogus\": true",
        );
        assert!(load_spec_from_str(&bad).is_err());
    }

    #[test]
    fn rejects_unresolvable_ref() {
        let bad = minimal_spec_json().replace(
            "#/components/schemas/charge",
            "#/components/schemas/missing",
        );
        assert!(load_spec_from_str(&bad).is_err());
    }

    #[test]
    fn rejects_malformed_path_placeholder() {
        let bad = minimal_spec_json().replace("{id}", "{id-bad}");
        assert!(load_spec_from_str(&bad).is_err());
    }
}

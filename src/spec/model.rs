//! Typed model of the OpenAPI 3 subset this server understands.
//!
//! Only a deliberately small surface of OpenAPI is modeled: enough to route
//! requests and synthesize responses. [`Schema`] in particular denies any
//! field outside its whitelist so drift between the spec on disk and what
//! this server understands is caught at load time rather than silently
//! ignored.

use indexmap::IndexMap;
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;

/// A JSON-Schema-like node, restricted to the attributes the generator and
/// validator actually consume plus the upstream's `x-*` extensions.
///
/// Any field not in this whitelist fails deserialization (`deny_unknown_fields`),
/// which is the load-time guard against spec drift described in the data model.
#[derive(Debug, Clone, Deserialize, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct Schema {
    #[serde(rename = "type")]
    pub schema_type: Option<String>,
    pub format: Option<String>,
    pub pattern: Option<String>,
    #[serde(rename = "maxLength")]
    pub max_length: Option<u64>,
    #[serde(rename = "enum")]
    pub enum_values: Option<Vec<Value>>,
    pub items: Option<Box<Schema>>,
    pub properties: Option<IndexMap<String, Schema>>,
    pub required: Option<Vec<String>>,
    #[serde(rename = "additionalProperties")]
    pub additional_properties: Option<AdditionalProperties>,
    pub nullable: Option<bool>,
    #[serde(rename = "anyOf")]
    pub any_of: Option<Vec<Schema>>,
    #[serde(rename = "$ref")]
    pub reference: Option<String>,
    #[serde(rename = "x-expandableFields")]
    pub x_expandable_fields: Option<Vec<String>>,
    #[serde(rename = "x-expansionResources")]
    pub x_expansion_resources: Option<ExpansionResources>,
    #[serde(rename = "x-resourceId")]
    pub x_resource_id: Option<String>,
}

impl Schema {
    pub fn is_list_resource(&self) -> bool {
        self.schema_type.as_deref() == Some("object")
            && self
                .properties
                .as_ref()
                .and_then(|p| p.get("object"))
                .and_then(|s| s.enum_values.as_ref())
                .map(|v| v.as_slice() == [Value::String("list".to_string())])
                .unwrap_or(false)
            && self
                .properties
                .as_ref()
                .and_then(|p| p.get("data"))
                .and_then(|s| s.items.as_ref())
                .is_some()
    }
}

/// `x-expansionResources`: a `oneOf` wrapper whose single member is the
/// expanded form of the property this extension is attached to.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ExpansionResources {
    #[serde(rename = "oneOf")]
    pub one_of: Vec<Schema>,
}

/// `additionalProperties` is either a boolean toggle or a schema all extra
/// properties must satisfy.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum AdditionalProperties {
    Bool(bool),
    Schema(Box<Schema>),
}

/// Where a parameter is carried on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterLocation {
    Query,
    Path,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Parameter {
    pub name: String,
    #[serde(rename = "in")]
    pub location: ParameterLocation,
    #[serde(default)]
    pub required: bool,
    pub schema: Option<Schema>,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct MediaType {
    pub schema: Option<Schema>,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct RequestBody {
    #[serde(default)]
    pub content: HashMap<String, MediaType>,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct Response {
    #[serde(default)]
    pub content: HashMap<String, MediaType>,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct Operation {
    #[serde(default)]
    pub parameters: Vec<Parameter>,
    #[serde(rename = "requestBody")]
    pub request_body: Option<RequestBody>,
    #[serde(default)]
    pub responses: HashMap<String, Response>,
}

impl Operation {
    /// The form-encoded request body schema, if this operation declares one.
    pub fn form_body_schema(&self) -> Option<&Schema> {
        self.request_body
            .as_ref()?
            .content
            .get("application/x-www-form-urlencoded")?
            .schema
            .as_ref()
    }

    /// The 200 JSON response schema, if present.
    pub fn json_response_schema(&self) -> Option<&Schema> {
        self.responses
            .get("200")?
            .content
            .get("application/json")?
            .schema
            .as_ref()
    }

    /// A non-JSON 200 response's media type, when the operation's success
    /// response is a binary payload rather than JSON.
    pub fn binary_response_media_type(&self) -> Option<&str> {
        let resp = self.responses.get("200")?;
        if resp.content.contains_key("application/json") {
            return None;
        }
        resp.content.keys().next().map(|s| s.as_str())
    }
}

pub type PathItem = HashMap<String, Operation>;

#[derive(Debug, Clone, Deserialize, Default)]
pub struct Info {
    pub title: Option<String>,
    pub version: String,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct ServerEntry {
    pub url: String,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct Components {
    #[serde(default)]
    pub schemas: HashMap<String, Schema>,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct Spec {
    #[serde(default)]
    pub info: Info,
    #[serde(default)]
    pub servers: Vec<ServerEntry>,
    #[serde(default)]
    pub paths: HashMap<String, PathItem>,
    #[serde(default)]
    pub components: Components,
}

impl Spec {
    /// Resolve a `#/components/schemas/{name}` reference.
    pub fn resolve_ref<'a>(&'a self, reference: &str) -> Option<&'a Schema> {
        reference
            .strip_prefix("#/components/schemas/")
            .and_then(|name| self.components.schemas.get(name))
    }

    /// Follow `$ref` until a non-ref schema is reached, or `None` if the
    /// chain is broken (caught as a startup invariant violation by the
    /// caller, not here).
    pub fn deref<'a>(&'a self, schema: &'a Schema) -> Option<&'a Schema> {
        let mut current = schema;
        let mut hops = 0;
        while let Some(reference) = &current.reference {
            current = self.resolve_ref(reference)?;
            hops += 1;
            if hops > 64 {
                return None;
            }
        }
        Some(current)
    }

    pub fn base_path(&self) -> String {
        let Some(server) = self.servers.first() else {
            return String::new();
        };
        let url_str = &server.url;
        url::Url::parse(url_str)
            .or_else(|_| url::Url::parse(&format!("http://dummy{url_str}")))
            .map(|u| {
                let p = u.path().trim_end_matches('/');
                if p.is_empty() {
                    String::new()
                } else {
                    p.to_string()
                }
            })
            .unwrap_or_default()
    }
}

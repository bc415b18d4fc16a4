//! Request handler (C11): the transport-agnostic pipeline from an
//! authenticated, routed request down to a serialized response body.
//!
//! This is deliberately free of `may`/`may_minihttp` so the whole pipeline
//! can be driven directly from tests. `server::service` is the thin adapter
//! that feeds it real sockets.

use crate::auth::validate_authorization;
use crate::error::ApiError;
use crate::expand::parse_expand;
use crate::fixtures::Fixtures;
use crate::generate::generate;
use crate::params::{assemble, boundary_from_content_type, coerce, parse_form, parse_multipart};
use crate::replace::replace;
use crate::router::Router;
use crate::server::request::ParsedRequest;
use crate::spec::{ParameterLocation, Schema, Spec};
use crate::validate::{synthesize_query_schema, translate_schema, ValidatorCache};
use http::Method;
use serde_json::Value;

pub const STRIPE_MOCK_VERSION: &str = env!("CARGO_PKG_VERSION");
/// Stand-in payload for a non-JSON (e.g. `application/pdf`) 200 response.
/// Binary fixtures are out of scope; this sentinel makes the content type
/// contract observable without modeling real binary payloads.
const BINARY_SENTINEL: &[u8] = b"%mockstripe-binary-fixture%";

pub struct AppState {
    pub spec: Spec,
    pub router: Router,
    pub fixtures: Fixtures,
    pub validator_cache: ValidatorCache,
    pub strict_version_check: bool,
}

#[derive(Debug, Clone)]
pub struct HandlerResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl HandlerResponse {
    fn error(err: ApiError, mut headers: Vec<(String, String)>) -> Self {
        let body = serde_json::to_vec(&err.to_json()).unwrap_or_default();
        headers.push(("Content-Type".to_string(), "application/json".to_string()));
        Self {
            status: err.status(),
            headers,
            body,
        }
    }
}

pub fn handle(state: &AppState, request: &ParsedRequest) -> HandlerResponse {
    // 1. Always emit Stripe-Mock-Version; Request-Id is added only on success.
    let base_headers = vec![("Stripe-Mock-Version".to_string(), STRIPE_MOCK_VERSION.to_string())];

    // 2. Authorization.
    if let Err(auth_err) = validate_authorization(request.get_header("authorization")) {
        return HandlerResponse::error(ApiError::InvalidAuth(auth_err.0.to_string()), base_headers);
    }

    // 3. Routing.
    let route_match = match state.router.route(&request.method, &request.path) {
        Ok(Some(m)) => m,
        Ok(None) => return HandlerResponse::error(ApiError::NotFound, base_headers),
        Err(decode_err) => {
            return HandlerResponse::error(ApiError::PathDecode(decode_err.0), base_headers)
        }
    };
    let operation = route_match.meta.operation.clone();
    let method = route_match.meta.method.clone();
    let primary_id = route_match.primary_id.clone();

    // 4. Content-Type enforcement.
    let needs_body_check = !matches!(method, Method::GET | Method::DELETE) && !request.body.is_empty();
    let content_type = request.get_header("content-type").unwrap_or("").to_string();
    let is_form = content_type.starts_with("application/x-www-form-urlencoded");
    let boundary = boundary_from_content_type(&content_type).map(str::to_string);
    if needs_body_check && !is_form && boundary.is_none() {
        return HandlerResponse::error(
            ApiError::InvalidContentType(format!(
                "Unrecognized Content-Type {content_type:?}; expected application/x-www-form-urlencoded"
            )),
            base_headers,
        );
    }

    // 5. Parameter parsing: query string + (for non-GET) body, in that order.
    let mut pairs = match parse_form(&request.query) {
        Ok(p) => p,
        Err(e) => return HandlerResponse::error(ApiError::Decode(e.to_string()), base_headers),
    };
    if method != Method::GET {
        let body_str = String::from_utf8_lossy(&request.body);
        let body_pairs = if let Some(boundary) = &boundary {
            parse_multipart(&request.body, boundary).map_err(|e| e.to_string())
        } else if !body_str.is_empty() {
            parse_form(body_str.as_ref()).map_err(|e| e.to_string())
        } else {
            Ok(Vec::new())
        };
        match body_pairs {
            Ok(mut p) => pairs.append(&mut p),
            Err(e) => return HandlerResponse::error(ApiError::Decode(e), base_headers),
        }
    }
    let assembled = match assemble(&pairs) {
        Ok(v) => v,
        Err(e) => return HandlerResponse::error(ApiError::Decode(e.to_string()), base_headers),
    };

    // 6. Coerce.
    let body_schema = operation.form_body_schema().cloned();
    let query_params: Vec<_> = operation
        .parameters
        .iter()
        .filter(|p| p.location == ParameterLocation::Query)
        .cloned()
        .collect();
    let has_query_schema = !query_params.is_empty();

    let coerced = if method == Method::GET {
        if has_query_schema {
            coerce(assembled.clone(), &query_object_schema(&query_params))
        } else {
            assembled.clone()
        }
    } else if let Some(schema) = &body_schema {
        coerce(assembled.clone(), schema)
    } else {
        assembled.clone()
    };

    // 7. Validate.
    let route_key = format!("{method} {}", route_match.meta.path_pattern);
    if method != Method::GET {
        if let Some(schema) = &body_schema {
            let translated = translate_schema(schema);
            if let Some(validator) = state.validator_cache.get_or_compile(&route_key, "body", &translated) {
                if let Err(error) = validator.validate(&coerced) {
                    let message = error.to_string();
                    return HandlerResponse::error(ApiError::Validation(message), base_headers);
                }
            }
        }
    }
    if has_query_schema {
        let synthesized = synthesize_query_schema(&query_params);
        if let Some(validator) = state.validator_cache.get_or_compile(&route_key, "query", &synthesized) {
            if let Err(error) = validator.validate(&coerced) {
                let message = error.to_string();
                return HandlerResponse::error(ApiError::Validation(message), base_headers);
            }
        }
    }

    // 8. Strict version check.
    if state.strict_version_check {
        if let Some(got) = request.get_header("stripe-version") {
            if got != state.spec.info.version {
                return HandlerResponse::error(
                    ApiError::VersionMismatch {
                        expected: state.spec.info.version.clone(),
                        got: got.to_string(),
                    },
                    base_headers,
                );
            }
        }
    }

    // 9. Expansions.
    let expand_field = coerced.get("expand").cloned();
    let expansions = parse_expand(expand_field.as_ref());

    // 10. Generate.
    let mut headers = base_headers;
    headers.push(("Request-Id".to_string(), crate::ids::STATIC_REQUEST_ID.to_string()));

    if let Some(media_type) = operation.binary_response_media_type() {
        headers.push(("Content-Type".to_string(), media_type.to_string()));
        return HandlerResponse {
            status: 200,
            headers,
            body: BINARY_SENTINEL.to_vec(),
        };
    }

    let Some(response_schema) = operation.json_response_schema() else {
        return HandlerResponse::error(ApiError::NotFound, headers);
    };
    let mut generated = generate(
        &state.spec,
        &state.fixtures,
        response_schema,
        expansions.as_ref(),
        &request.path,
        primary_id.as_deref(),
    );

    // 11. Replace request fields into the response.
    if method != Method::GET {
        replace(&coerced, &mut generated);
    }

    // 12. Reflect Idempotency-Key.
    if let Some(key) = request.get_header("idempotency-key") {
        headers.push(("Idempotency-Key".to_string(), key.to_string()));
    }

    headers.push(("Content-Type".to_string(), "application/json".to_string()));

    // 13. Serialize.
    let pretty = request
        .get_header("user-agent")
        .map(|ua| ua.starts_with("curl/"))
        .unwrap_or(false);
    let body = serialize(&generated, pretty);

    HandlerResponse {
        status: 200,
        headers,
        body,
    }
}

fn serialize(value: &Value, pretty: bool) -> Vec<u8> {
    if pretty {
        let mut out = serde_json::to_vec_pretty(value).unwrap_or_default();
        out.push(b'\n');
        out
    } else {
        serde_json::to_vec(value).unwrap_or_default()
    }
}

fn query_object_schema(params: &[crate::spec::Parameter]) -> Schema {
    use indexmap::IndexMap;
    let mut properties = IndexMap::new();
    for param in params {
        if let Some(schema) = &param.schema {
            properties.insert(param.name.clone(), schema.clone());
        }
    }
    Schema {
        schema_type: Some("object".to_string()),
        properties: Some(properties),
        ..Default::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spec::{build_routes, load_spec_from_str};
    use std::collections::HashMap;

    fn minimal_spec() -> &'static str {
        r#"{
            "info": {"title": "Test", "version": "2020-01-01"},
            "servers": [{"url": "https://api.example.com/v1"}],
            "paths": {
                "/charges/{id}": {
                    "get": {
                        "responses": {"200": {"content": {"application/json": {"schema": {"$ref": "#/components/schemas/charge"}}}}}
                    }
                }
            },
            "components": {
                "schemas": {
                    "charge": {"type": "object", "x-resourceId": "charge", "properties": {"id": {"type": "string"}, "amount": {"type": "integer"}}}
                }
            }
        }"#
    }

    fn state() -> AppState {
        let spec = load_spec_from_str(minimal_spec()).unwrap();
        let base_path = spec.base_path();
        let routes = build_routes(&spec);
        let router = Router::build(&base_path, routes);
        let mut fixtures_map = HashMap::new();
        fixtures_map.insert("charge".to_string(), serde_json::json!({"id": "ch_123", "amount": 100}));
        AppState {
            spec,
            router,
            fixtures: Fixtures::from_map(fixtures_map),
            validator_cache: ValidatorCache::new(),
            strict_version_check: false,
        }
    }

    fn request(method: Method, path: &str) -> ParsedRequest {
        ParsedRequest {
            method,
            path: path.to_string(),
            query: String::new(),
            headers: vec![("authorization".to_string(), "Bearer sk_test_abc".to_string())],
            body: Vec::new(),
        }
    }

    #[test]
    fn happy_path_returns_fixture() {
        let state = state();
        let response = handle(&state, &request(Method::GET, "/v1/charges/ch_123"));
        assert_eq!(response.status, 200);
        let body: Value = serde_json::from_slice(&response.body).unwrap();
        assert_eq!(body["id"], "ch_123");
        assert_eq!(body["amount"], 100);
    }

    #[test]
    fn missing_auth_is_401() {
        let state = state();
        let mut req = request(Method::GET, "/v1/charges/ch_123");
        req.headers.clear();
        let response = handle(&state, &req);
        assert_eq!(response.status, 401);
    }

    #[test]
    fn unknown_route_is_404() {
        let state = state();
        let response = handle(&state, &request(Method::GET, "/v1/unknown"));
        assert_eq!(response.status, 404);
    }

    #[test]
    fn curl_user_agent_pretty_prints() {
        let state = state();
        let mut req = request(Method::GET, "/v1/charges/ch_123");
        req.headers.push(("user-agent".to_string(), "curl/7.64.1".to_string()));
        let response = handle(&state, &req);
        let body = String::from_utf8(response.body).unwrap();
        assert!(body.contains('\n'));
        assert!(body.ends_with('\n'));
    }

    #[test]
    fn idempotency_key_is_reflected() {
        let state = state();
        let mut req = request(Method::GET, "/v1/charges/ch_123");
        req.headers.push(("idempotency-key".to_string(), "idem_1".to_string()));
        let response = handle(&state, &req);
        assert!(response.headers.iter().any(|(k, v)| k == "Idempotency-Key" && v == "idem_1"));
    }

    #[test]
    fn primary_id_substitution_rewrites_response_id() {
        let state = state();
        let response = handle(&state, &request(Method::GET, "/v1/charges/ch_NEW"));
        let body: Value = serde_json::from_slice(&response.body).unwrap();
        assert_eq!(body["id"], "ch_NEW");
    }
}

//! Data replacer (C9): overlays request fields onto a generated response so
//! a resource created with `amount=123` comes back with `"amount": 123`
//! without the generator needing full schema knowledge of every field.

use serde_json::Value;

/// Overlay `request` onto `response` in place, type-matched at every level.
pub fn replace(request: &Value, response: &mut Value) {
    match (request, response) {
        (Value::Object(req_map), Value::Object(resp_map)) => {
            for (key, req_value) in req_map {
                if let Some(resp_value) = resp_map.get_mut(key) {
                    replace(req_value, resp_value);
                }
            }
        }
        (Value::Array(req_items), Value::Array(resp_items)) => {
            let (Some(req_first), Some(resp_first)) = (req_items.first(), resp_items.first())
            else {
                return;
            };
            if std::mem::discriminant(req_first) == std::mem::discriminant(resp_first) {
                *resp_items = req_items.clone();
            }
        }
        (req, resp) => {
            if std::mem::discriminant(req) == std::mem::discriminant(resp) {
                *resp = req.clone();
            }
        }
    }
}

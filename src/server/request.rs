//! Transport-agnostic parsed request (§4.9, GLOSSARY: `ParsedRequest`).
//!
//! Everything downstream of the transport adapter (C13) operates on this
//! struct, never on `may_minihttp` types directly, so the pipeline can be
//! exercised in tests without a socket.

use http::Method;

#[derive(Debug, Clone)]
pub struct ParsedRequest {
    pub method: Method,
    pub path: String,
    pub query: String,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl ParsedRequest {
    pub fn get_header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Collapse runs of `/` in a path into single slashes (§4.9), so
/// `//v1/charges` routes as `/v1/charges` instead of triggering a default
/// 301-redirect mux behavior.
pub fn collapse_double_slashes(path: &str) -> String {
    let mut out = String::with_capacity(path.len());
    let mut last_was_slash = false;
    for c in path.chars() {
        if c == '/' {
            if !last_was_slash {
                out.push(c);
            }
            last_was_slash = true;
        } else {
            out.push(c);
            last_was_slash = false;
        }
    }
    out
}

/// Split a raw request target into its path and query components.
pub fn split_path_and_query(raw_target: &str) -> (String, String) {
    match raw_target.split_once('?') {
        Some((path, query)) => (collapse_double_slashes(path), query.to_string()),
        None => (collapse_double_slashes(raw_target), String::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collapses_runs_of_slashes() {
        assert_eq!(collapse_double_slashes("//v1//charges"), "/v1/charges");
    }

    #[test]
    fn leaves_single_slashes_alone() {
        assert_eq!(collapse_double_slashes("/v1/charges/ch_1"), "/v1/charges/ch_1");
    }

    #[test]
    fn splits_query_string() {
        let (path, query) = split_path_and_query("/v1/charges?limit=1");
        assert_eq!(path, "/v1/charges");
        assert_eq!(query, "limit=1");
    }

    #[test]
    fn path_without_query_has_empty_query() {
        let (path, query) = split_path_and_query("//v1//charges");
        assert_eq!(path, "/v1/charges");
        assert_eq!(query, "");
    }

    #[test]
    fn header_lookup_is_case_insensitive() {
        let request = ParsedRequest {
            method: Method::GET,
            path: "/v1/charges".to_string(),
            query: String::new(),
            headers: vec![("Content-Type".to_string(), "application/json".to_string())],
            body: Vec::new(),
        };
        assert_eq!(request.get_header("content-type"), Some("application/json"));
    }
}

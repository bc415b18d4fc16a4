//! Multipart/form-data reader (C12).
//!
//! Splits a body on `--{boundary}`, reads each part's `Content-Disposition`
//! header for its field `name` (and optional `filename`), and yields
//! `(name, value)` pairs into the same ordered list the form parser
//! produces. File parts are decoded lossily to UTF-8 — binary fixtures are
//! out of scope, see the multipart Open Question in the design notes.

use std::fmt;

pub const MULTIPART_MAX_BYTES: usize = 1024 * 1024;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MultipartError(pub String);

impl fmt::Display for MultipartError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid multipart body: {}", self.0)
    }
}

impl std::error::Error for MultipartError {}

fn err(msg: impl Into<String>) -> MultipartError {
    MultipartError(msg.into())
}

/// Extract the `boundary=` parameter from a `Content-Type` header value.
pub fn boundary_from_content_type(content_type: &str) -> Option<&str> {
    content_type.split(';').skip(1).find_map(|param| {
        let param = param.trim();
        param.strip_prefix("boundary=").map(|b| b.trim_matches('"'))
    })
}

fn find_name(header_value: &str, key: &str) -> Option<String> {
    let marker = format!("{key}=\"");
    let start = header_value.find(&marker)? + marker.len();
    let end = header_value[start..].find('"')? + start;
    Some(header_value[start..end].to_string())
}

/// Parse a multipart body into an ordered list of `(field name, value)`
/// pairs. Fails if the total decoded payload would exceed
/// [`MULTIPART_MAX_BYTES`], or if a part is missing its `name` attribute.
pub fn parse(body: &[u8], boundary: &str) -> Result<Vec<(String, String)>, MultipartError> {
    let body = std::str::from_utf8(body).map_err(|_| err("body is not valid UTF-8"))?;
    let delimiter = format!("--{boundary}");
    let mut pairs = Vec::new();
    let mut total_bytes = 0usize;

    for chunk in body.split(&delimiter) {
        let chunk = chunk.trim_start_matches("\r\n");
        if chunk.is_empty() || chunk == "--" || chunk.starts_with("--") {
            continue;
        }
        let Some(header_end) = chunk.find("\r\n\r\n") else {
            continue;
        };
        let headers = &chunk[..header_end];
        let mut content = &chunk[header_end + 4..];
        content = content.strip_suffix("\r\n").unwrap_or(content);

        let disposition = headers
            .lines()
            .find(|l| l.to_ascii_lowercase().starts_with("content-disposition"))
            .ok_or_else(|| err("part missing Content-Disposition header"))?;
        let name = find_name(disposition, "name")
            .ok_or_else(|| err("part missing name attribute"))?;

        total_bytes += content.len();
        if total_bytes > MULTIPART_MAX_BYTES {
            return Err(err("multipart body exceeds 1 MiB limit"));
        }

        pairs.push((name, content.to_string()));
    }
    Ok(pairs)
}

//! Rack-style form/query string tokenizer (C3).
//!
//! Produces an ordered, duplicate-preserving sequence of `(key, value)`
//! pairs from a `key=value&key=value` string. A leading `?` is stripped, `+`
//! decodes to a space, and a malformed `%XX` escape fails the whole parse —
//! callers surface that as a 400-class request-decoding error.

use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodeError {
    pub fragment: String,
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid percent-escape near {:?}", self.fragment)
    }
}

impl std::error::Error for DecodeError {}

fn hex_val(b: u8) -> Option<u8> {
    match b {
        b'0'..=b'9' => Some(b - b'0'),
        b'a'..=b'f' => Some(b - b'a' + 10),
        b'A'..=b'F' => Some(b - b'A' + 10),
        _ => None,
    }
}

/// Decode one urlencoded component: `+` becomes a space, `%XX` decodes to
/// the raw byte, and any other byte passes through unchanged. Fails on a
/// truncated or non-hex escape, or on a result that is not valid UTF-8.
pub fn decode_component(input: &str) -> Result<String, DecodeError> {
    let bytes = input.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'+' => {
                out.push(b' ');
                i += 1;
            }
            b'%' => {
                let hex = bytes.get(i + 1..i + 3).ok_or_else(|| DecodeError {
                    fragment: input[i..].to_string(),
                })?;
                let (hi, lo) = (hex_val(hex[0]), hex_val(hex[1]));
                match (hi, lo) {
                    (Some(hi), Some(lo)) => {
                        out.push((hi << 4) | lo);
                        i += 3;
                    }
                    _ => {
                        return Err(DecodeError {
                            fragment: input[i..(i + 3).min(input.len())].to_string(),
                        })
                    }
                }
            }
            b => {
                out.push(b);
                i += 1;
            }
        }
    }
    String::from_utf8(out).map_err(|_| DecodeError {
        fragment: input.to_string(),
    })
}

/// Parse a form-encoded or query string into an ordered list of pairs.
/// Leading `?` is stripped; empty input yields an empty list.
pub fn parse(input: &str) -> Result<Vec<(String, String)>, DecodeError> {
    let input = input.strip_prefix('?').unwrap_or(input);
    if input.is_empty() {
        return Ok(Vec::new());
    }
    let mut pairs = Vec::new();
    for raw_pair in input.split('&') {
        if raw_pair.is_empty() {
            continue;
        }
        let (raw_key, raw_value) = match raw_pair.split_once('=') {
            Some((k, v)) => (k, v),
            None => (raw_pair, ""),
        };
        let key = decode_component(raw_key)?;
        let value = decode_component(raw_value)?;
        pairs.push((key, value));
    }
    Ok(pairs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_leading_question_mark() {
        assert_eq!(parse("?a=1&b=2").unwrap(), vec![("a".into(), "1".into()), ("b".into(), "2".into())]);
    }

    #[test]
    fn preserves_order_and_duplicates() {
        let pairs = parse("a=1&a=2&b=3").unwrap();
        assert_eq!(pairs, vec![("a".into(), "1".into()), ("a".into(), "2".into()), ("b".into(), "3".into())]);
    }

    #[test]
    fn decodes_plus_as_space() {
        assert_eq!(parse("name=John+Doe").unwrap(), vec![("name".into(), "John Doe".into())]);
    }

    #[test]
    fn decodes_percent_escapes() {
        assert_eq!(parse("q=a%26b").unwrap(), vec![("q".into(), "a&b".into())]);
    }

    #[test]
    fn rejects_truncated_escape() {
        assert!(parse("q=a%2").is_err());
    }

    #[test]
    fn rejects_non_hex_escape() {
        assert!(parse("q=a%zz").is_err());
    }

    #[test]
    fn empty_string_is_empty_list() {
        assert_eq!(parse("").unwrap(), Vec::<(String, String)>::new());
    }

    #[test]
    fn value_without_equals_is_empty_string() {
        assert_eq!(parse("flag").unwrap(), vec![("flag".into(), "".into())]);
    }
}

//! Request identifiers.
//!
//! Unlike the teacher's ULID-backed [`RequestId`], generation here must be
//! deterministic byte-for-byte, so a fixed value is returned rather than a
//! freshly minted one.

pub const STATIC_REQUEST_ID: &str = "req_123";

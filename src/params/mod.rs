//! Request-parameter pipeline: tokenize a form/query/multipart body into
//! pairs (C3, C12), assemble them into a nested JSON value (C4), then
//! coerce string leaves to their schema's declared type (C5).

pub mod assemble;
pub mod coerce;
pub mod form;
pub mod multipart;

pub use assemble::{assemble, AssembleError};
pub use coerce::coerce;
pub use form::{parse as parse_form, DecodeError};
pub use multipart::{boundary_from_content_type, parse as parse_multipart, MultipartError};

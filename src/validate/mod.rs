//! Schema translation and validator caching (C6).

pub mod cache;
pub mod translate;

pub use cache::ValidatorCache;
pub use translate::{synthesize_query_schema, translate_schema};

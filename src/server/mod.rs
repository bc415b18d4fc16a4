//! Transport adapter (C13): a `may_minihttp::HttpService` wrapper around the
//! transport-agnostic [`crate::handler`] pipeline.

pub mod request;
pub mod response;
pub mod service;

pub use service::AppService;

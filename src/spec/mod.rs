//! Typed OpenAPI 3 subset and the invariant checks this server relies on.
//!
//! `model` holds the whitelisted schema shapes; `load` turns a document into
//! a validated [`model::Spec`] and flattens it into routable [`load::RouteMeta`]
//! values. Unknown schema fields and unresolvable `$ref`s are fatal at load
//! time — the rest of the crate assumes a spec that passed these checks.

pub mod load;
pub mod model;

pub use load::{
    build_routes, check_fixtures_cover_resources, check_invariants, load_spec_from_file,
    load_spec_from_str, RouteMeta,
};
pub use model::{
    AdditionalProperties, Components, ExpansionResources, Info, MediaType, Operation, Parameter,
    ParameterLocation, PathItem, RequestBody, Response, Schema, ServerEntry, Spec,
};

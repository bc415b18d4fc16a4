//! Server startup CLI (C14).

use clap::Parser;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "mockstripe")]
#[command(about = "An OpenAPI 3 + fixture-driven mock HTTP server", long_about = None)]
pub struct Cli {
    /// Path to the OpenAPI 3 document describing the mocked API.
    #[arg(long, env = "MOCKSTRIPE_SPEC")]
    pub spec: PathBuf,

    /// Path to the fixture archive (a JSON object keyed by resource id).
    #[arg(long, env = "MOCKSTRIPE_FIXTURES")]
    pub fixtures: PathBuf,

    /// Address to bind the HTTP server to.
    #[arg(long, env = "MOCKSTRIPE_BIND", default_value = "127.0.0.1:12111")]
    pub bind: String,

    /// Reject requests whose `Stripe-Version` header disagrees with the
    /// spec's declared version.
    #[arg(long, env = "MOCKSTRIPE_STRICT_VERSION_CHECK", default_value_t = false)]
    pub strict_version_check: bool,
}

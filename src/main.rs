use anyhow::{Context, Result};
use clap::Parser;
use mockstripe::cli::Cli;
use mockstripe::fixtures::Fixtures;
use mockstripe::handler::AppState;
use mockstripe::router::Router;
use mockstripe::server::AppService;
use mockstripe::spec::{build_routes, check_fixtures_cover_resources, load_spec_from_file};
use mockstripe::validate::ValidatorCache;
use may_minihttp::HttpServer;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();

    let spec = load_spec_from_file(&cli.spec)
        .with_context(|| format!("failed to load spec at {}", cli.spec.display()))?;
    let fixtures = Fixtures::from_file(&cli.fixtures)
        .with_context(|| format!("failed to load fixtures at {}", cli.fixtures.display()))?;
    check_fixtures_cover_resources(&spec, &fixtures)
        .context("fixture archive does not cover every resource declared in the spec")?;

    let base_path = spec.base_path();
    let routes = build_routes(&spec);
    let router = Router::build(&base_path, routes);

    let state = Arc::new(AppState {
        spec,
        router,
        fixtures,
        validator_cache: ValidatorCache::new(),
        strict_version_check: cli.strict_version_check,
    });

    tracing::info!(bind = %cli.bind, "starting mockstripe");
    let service = AppService::new(state);
    let server = HttpServer(service)
        .start(&cli.bind)
        .map_err(|e| anyhow::anyhow!("failed to start server on {}: {e}", cli.bind))?;
    server
        .join()
        .map_err(|e| anyhow::anyhow!("server task panicked: {e:?}"))?;
    Ok(())
}

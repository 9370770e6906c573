// crates/server/src/main.rs
//! sharp-web server binary.
//!
//! Prepares the output directory, then serves the upload/preview UI on
//! localhost until interrupted.

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use sharp_web_core::{Orchestrator, SharpCli};
use sharp_web_server::cli::Cli;
use sharp_web_server::{create_app, AppState};
use tracing_subscriber::EnvFilter;

const DEFAULT_LOG_FILTER: &str = "warn,sharp_web_core=info,sharp_web_server=info";

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .compact()
        .init();

    eprintln!("\n\u{2728} sharp-web v{}\n", env!("CARGO_PKG_VERSION"));

    let cwd = std::env::current_dir().context("Could not determine working directory")?;
    let config = cli.generator_config(&cwd);
    let tool = SharpCli::new(&cli.sharp_bin).with_leading_args(cli.sharp_args.iter().cloned());

    let orchestrator = Orchestrator::new(config, Arc::new(tool))
        .context("Invalid generator configuration")?;
    tracing::info!(
        output_root = %orchestrator.output_root().display(),
        max_generations = orchestrator.config().max_generations,
        program = %cli.sharp_bin,
        "Generator ready"
    );

    let assets_dir = cli.assets_dir(&cwd);
    if !assets_dir.join("viewer.html").is_file() {
        tracing::warn!(
            dir = %assets_dir.display(),
            "viewer.html not found; previews will not render"
        );
    }

    let state = AppState::new(orchestrator, assets_dir);
    let app = create_app(state, cli.static_dir(&cwd), cli.max_upload_bytes());

    let addr = cli.addr();
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;

    let url = format!("http://{addr}");
    eprintln!("  \u{2192} {url}\n");
    if cli.open {
        if let Err(e) = open::that(&url) {
            tracing::warn!(error = %e, "Could not open browser");
        }
    }

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for ctrl-c");
    }
    tracing::info!("Shutting down");
}

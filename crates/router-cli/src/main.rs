//! Build Router - regional fan-out for CI builds
//!
//! Runs as a step of the parent build. It derives one build configuration
//! per target region from the tag or branch, applies the first to the
//! running build and starts the others on Bitrise.
//!
//! Builds started by the router carry `SOURCE_BITRISE_BUILD_NUMBER`, which
//! makes the router a no-op in them.

mod config;
mod export;
mod fanout;

use anyhow::{Context, Result};
use clap::Parser;
use router_bitrise::BitriseClient;
use router_core::{derive, GitCommitResolver};
use tracing::{info, Level};

use crate::config::Config;
use crate::export::EnvmanExporter;
use crate::fanout::run_fan_out;

#[derive(Parser)]
#[command(name = "build-router")]
#[command(author = "Stevedores Org")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Fan a CI build out to one build per region", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, env = "verbose")]
    verbose: bool,

    /// Emit JSON-formatted log lines
    #[arg(long)]
    json: bool,

    /// Print the derived build parameters as JSON and exit
    #[arg(long)]
    dry_run: bool,

    #[command(flatten)]
    config: Config,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    router_core::init_tracing(cli.json, level);

    info!(config = ?cli.config, "configuration");

    if let Some(parent) = cli.config.parent() {
        info!("Bypassing router, child build of {}", parent);
        return Ok(());
    }
    info!("I am the parent build, forking if necessary");

    let ctx = cli
        .config
        .derivation_context()
        .context("invalid router configuration")?;
    let resolver = GitCommitResolver::new(cli.config.source_dir.clone());
    let derivation = derive(&ctx, &resolver).context("failed to derive build parameters")?;

    if cli.dry_run {
        println!("{}", serde_json::to_string_pretty(&derivation)?);
        return Ok(());
    }

    let client = BitriseClient::new(cli.config.bitrise_config())
        .context("failed to create Bitrise client")?;
    let exporter = EnvmanExporter::default();

    let started = run_fan_out(
        &derivation,
        &client,
        &exporter,
        &cli.config.fan_out_settings(),
    )
    .await?;

    info!(started = started.len(), "router finished");
    Ok(())
}

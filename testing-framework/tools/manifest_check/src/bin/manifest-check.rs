use std::{path::PathBuf, process, time::Duration};

use anyhow::{Context as _, Result};
use clap::Parser;
use e2e_manifest_check::{init_tracing, render_summary};
use e2e_testnet_config::{adjust_timeout, manifest::Manifest, timeouts};
use e2e_testnet_core::topology::TestnetBuilder;
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(about = "Build and validate a testnet manifest before anything is started")]
struct Args {
    /// Manifest file (YAML).
    manifest: PathBuf,
    /// Override the testnet name.
    #[arg(long)]
    name: Option<String>,
    /// After validating, wait for every exposed node to reach this height.
    #[arg(long)]
    wait_height: Option<u64>,
    /// Budget for --wait-height, in seconds. Defaults to
    /// E2E_WAIT_TIMEOUT_SECS or 60.
    #[arg(long)]
    timeout_secs: Option<u64>,
}

#[tokio::main]
async fn main() {
    init_tracing();

    let args = Args::parse();
    if let Err(err) = run(args).await {
        warn!("manifest check failed: {err:#}");
        process::exit(1);
    }
}

async fn run(args: Args) -> Result<()> {
    let manifest = Manifest::load_from_file(&args.manifest)?;

    let mut builder = TestnetBuilder::new(manifest);
    if let Some(name) = args.name {
        builder = builder.with_name(name);
    }
    let testnet = builder
        .build()
        .with_context(|| format!("invalid testnet in {}", args.manifest.display()))?;

    print!("{}", render_summary(&testnet));
    info!(testnet = testnet.name, nodes = testnet.nodes.len(), "manifest is valid");

    let Some(height) = args.wait_height else {
        return Ok(());
    };

    let timeout = args
        .timeout_secs
        .map(Duration::from_secs)
        .unwrap_or_else(timeouts::wait_timeout);
    testnet
        .wait_for_height(height, adjust_timeout(timeout))
        .await
        .with_context(|| format!("testnet {} did not reach height {height}", testnet.name))?;
    info!(testnet = testnet.name, height, "testnet reached height");

    Ok(())
}

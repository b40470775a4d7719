//! Remote-Write Push Demo
//!
//! This example reads an exporter settings file, builds an [`Exporter`] and
//! pushes an already-encoded remote-write payload a number of times, waiting
//! the configured push interval between attempts.
//!
//! # Usage
//!
//! ```bash
//! # Push a payload once
//! cargo run --example push_demo -- \
//!     --config cortex.toml --payload samples.pb.snappy
//!
//! # Push three times with debug logging
//! RUST_LOG=debug cargo run --example push_demo -- \
//!     --config cortex.toml --payload samples.pb.snappy --count 3
//! ```

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use log::{info, warn};

use cortex_client::Exporter;
use cortex_common::Config;

#[derive(Parser, Debug)]
#[command(author, version, about = "Cortex remote-write push demo")]
struct Args {
    /// Path to the exporter settings file (TOML)
    #[arg(long, env = "CORTEX_EXPORTER_CONFIG")]
    config: PathBuf,

    /// Path to a snappy-compressed remote-write payload
    #[arg(long)]
    payload: PathBuf,

    /// Number of pushes to perform
    #[arg(long, default_value_t = 1)]
    count: u32,
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    let args = Args::parse();

    let contents = fs::read_to_string(&args.config)
        .with_context(|| format!("Failed to read {}", args.config.display()))?;
    let config = Config::from_toml_str(&contents)?;
    let exporter = Exporter::new(config)?;

    let payload = fs::read(&args.payload)
        .with_context(|| format!("Failed to read {}", args.payload.display()))?;

    for attempt in 1..=args.count {
        match exporter.send(payload.clone()).await {
            Ok(()) => info!("Push {attempt}/{} succeeded", args.count),
            Err(e) if e.is_retryable() => warn!("Push {attempt}/{} failed: {e}", args.count),
            Err(e) => return Err(e.into()),
        }

        if attempt < args.count {
            tokio::time::sleep(exporter.push_interval()).await;
        }
    }

    Ok(())
}

//! Raiden contract deployer
//!
//! Deploys the Raiden registries and tokens to an Ethereum-compatible network
//! and links them together.
//!
//! # Architecture Overview
//!
//! ```text
//!   cli ──▶ config (file + flags, validated)
//!    │
//!    ▼
//!   commands ──▶ deploy::pipeline ──▶ deploy::deployer ──▶ blockchain::transaction
//!                     │                      │                     │
//!                     ▼                      ▼                     ▼
//!             DeploymentContext         artifacts            client + wallet ──▶ node
//! ```
//!
//! Results are printed to stdout as JSON, logs go to stderr.

use clap::Parser;
use std::process::ExitCode;

use raiden_deploy::cli::Cli;
use raiden_deploy::commands;
use raiden_deploy::observability::init_logging;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match cli.resolve_config() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {e}");
            return ExitCode::FAILURE;
        }
    };

    init_logging(&config.logging);
    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        rpc_url = %config.rpc.rpc_url,
        command = ?cli.command,
        "raiden-deploy starting"
    );

    let output = match commands::run(&cli.command, &config).await {
        Ok(output) => output,
        Err(e) => {
            tracing::error!(error = %e, "Deployment failed");
            eprintln!("Error: {e}");
            return ExitCode::FAILURE;
        }
    };

    match serde_json::to_string_pretty(&output.addresses()) {
        Ok(json) => {
            println!("{json}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: cannot serialize result: {e}");
            ExitCode::FAILURE
        }
    }
}

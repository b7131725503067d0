//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for a deployment
//! run. All types derive Serde traits for deserialization from TOML files;
//! command line flags are applied on top afterwards.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::contracts::{
    CONTRACT_CUSTOM_TOKEN, DEPLOY_SETTLE_TIMEOUT_MAX, DEPLOY_SETTLE_TIMEOUT_MIN,
};

/// Root configuration for a deployment run.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct DeployConfig {
    /// JSON-RPC endpoint settings.
    pub rpc: RpcConfig,

    /// Signing account.
    pub account: AccountConfig,

    /// Gas and confirmation settings.
    pub transaction: TransactionConfig,

    /// Contract artifacts and deployment constants.
    pub contracts: ContractsConfig,

    /// Log output settings.
    pub logging: LoggingConfig,
}

/// JSON-RPC endpoint configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RpcConfig {
    /// JSON-RPC endpoint URL.
    pub rpc_url: String,

    /// Failover JSON-RPC endpoint URLs.
    pub failover_urls: Vec<String>,

    /// Expected chain ID. When set, the run aborts if the node reports another.
    pub chain_id: Option<u64>,

    /// RPC request timeout in seconds.
    pub rpc_timeout_secs: u64,
}

impl Default for RpcConfig {
    fn default() -> Self {
        Self {
            rpc_url: "http://127.0.0.1:8545".to_string(),
            failover_urls: Vec::new(),
            chain_id: None,
            rpc_timeout_secs: 60,
        }
    }
}

/// Signing account configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct AccountConfig {
    /// Path to the private key file (hex key or JSON keystore).
    pub private_key_path: Option<PathBuf>,

    /// Path to a file holding the keystore password.
    pub password_file: Option<PathBuf>,
}

/// Transaction parameters shared by every step of a run.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TransactionConfig {
    /// Gas price in gwei. 0 uses the node's `eth_gasPrice`.
    pub gas_price_gwei: u64,

    /// Gas limit for contract deployments.
    pub gas_limit: u64,

    /// Gas limit for the token network registration call.
    pub register_gas_limit: u64,

    /// Maximum time to wait for a receipt, in seconds.
    pub wait_secs: u64,

    /// Receipt polling interval in milliseconds.
    pub poll_interval_ms: u64,
}

impl Default for TransactionConfig {
    fn default() -> Self {
        Self {
            gas_price_gwei: 5,
            gas_limit: 5_500_000,
            register_gas_limit: 4_000_000,
            wait_secs: 300,
            poll_interval_ms: 1_000,
        }
    }
}

/// Contract artifact locations and deployment constants.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ContractsConfig {
    /// Precompiled contracts file (ABI + bytecode + checksums).
    pub precompiled_path: PathBuf,

    /// Solidity source directories the precompiled file is checked against.
    pub source_dirs: Vec<PathBuf>,

    /// Compare source checksums with the precompiled file before deploying.
    /// When enabled, `source_dirs` must not be empty.
    pub verify_checksums: bool,

    /// Minimum settle timeout passed to the TokenNetworkRegistry.
    pub settle_timeout_min: u64,

    /// Maximum settle timeout passed to the TokenNetworkRegistry.
    pub settle_timeout_max: u64,

    /// Contract name used for token deployments and registration.
    pub token_type: String,
}

impl Default for ContractsConfig {
    fn default() -> Self {
        Self {
            precompiled_path: PathBuf::from("data/contracts.json"),
            source_dirs: Vec::new(),
            verify_checksums: true,
            settle_timeout_min: DEPLOY_SETTLE_TIMEOUT_MIN,
            settle_timeout_max: DEPLOY_SETTLE_TIMEOUT_MAX,
            token_type: CONTRACT_CUSTOM_TOKEN.to_string(),
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human readable lines.
    #[default]
    Pretty,
    /// One JSON object per event.
    Json,
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Level for this crate's events (`RUST_LOG` takes precedence).
    pub level: String,

    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "debug".to_string(),
            format: LogFormat::Pretty,
        }
    }
}

//! Command line interface.
//!
//! Global flags override values from the optional TOML config file, which
//! override built-in defaults.

use alloy::primitives::Address;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::config::loader::read_config;
use crate::config::{validate_config, ConfigError, DeployConfig, LogFormat};
use crate::contracts::{CONTRACT_CUSTOM_TOKEN, CONTRACT_TOKEN_NETWORK_REGISTRY};
use crate::deploy::{DeployError, DeploymentContext, TokenParams};

#[derive(Debug, Parser)]
#[command(name = "raiden-deploy", version)]
#[command(about = "Deploy and wire up the Raiden smart contracts", long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Command,
}

/// Flags shared by every subcommand.
#[derive(Debug, Clone, Default, Args)]
pub struct GlobalArgs {
    /// TOML configuration file
    #[arg(long, global = true, env = "RAIDEN_DEPLOY_CONFIG")]
    pub config: Option<PathBuf>,

    /// Address of the Ethereum RPC provider [default: http://127.0.0.1:8545]
    #[arg(long, global = true, env = "RAIDEN_DEPLOY_RPC_PROVIDER")]
    pub rpc_provider: Option<String>,

    /// Path to a private key store
    #[arg(long, global = true, env = "RAIDEN_DEPLOY_PRIVATE_KEY")]
    pub private_key: Option<PathBuf>,

    /// File holding the keystore password
    #[arg(long, global = true, env = "RAIDEN_DEPLOY_PASSWORD_FILE")]
    pub password_file: Option<PathBuf>,

    /// Max tx wait time in s [default: 300]
    #[arg(long, global = true, env = "RAIDEN_DEPLOY_WAIT")]
    pub wait: Option<u64>,

    /// Gas price to use in gwei, 0 asks the node [default: 5]
    #[arg(long, global = true, env = "RAIDEN_DEPLOY_GAS_PRICE")]
    pub gas_price: Option<u64>,

    /// Gas limit for deployments [default: 5500000]
    #[arg(long, global = true, env = "RAIDEN_DEPLOY_GAS_LIMIT")]
    pub gas_limit: Option<u64>,

    /// Precompiled contracts file [default: data/contracts.json]
    #[arg(long, global = true, env = "RAIDEN_DEPLOY_CONTRACTS_PATH")]
    pub contracts_path: Option<PathBuf>,

    /// Solidity source directory to verify the precompiled file against (repeatable)
    #[arg(long = "contracts-source-dir", global = true)]
    pub contracts_source_dirs: Vec<PathBuf>,

    /// Deploy without comparing source checksums to the precompiled file
    #[arg(long, global = true, env = "RAIDEN_DEPLOY_SKIP_CHECKSUM_VERIFICATION")]
    pub skip_checksum_verification: bool,

    /// Log level for this tool [default: debug]
    #[arg(long, global = true, env = "RAIDEN_DEPLOY_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Log output format
    #[arg(long, global = true, value_enum)]
    pub log_format: Option<LogFormat>,
}

impl GlobalArgs {
    /// Overwrite config values with every flag that was given.
    pub fn apply(&self, config: &mut DeployConfig) {
        if let Some(rpc_provider) = &self.rpc_provider {
            config.rpc.rpc_url = rpc_provider.clone();
        }
        if let Some(private_key) = &self.private_key {
            config.account.private_key_path = Some(private_key.clone());
        }
        if let Some(password_file) = &self.password_file {
            config.account.password_file = Some(password_file.clone());
        }
        if let Some(wait) = self.wait {
            config.transaction.wait_secs = wait;
        }
        if let Some(gas_price) = self.gas_price {
            config.transaction.gas_price_gwei = gas_price;
        }
        if let Some(gas_limit) = self.gas_limit {
            config.transaction.gas_limit = gas_limit;
        }
        if let Some(contracts_path) = &self.contracts_path {
            config.contracts.precompiled_path = contracts_path.clone();
        }
        if !self.contracts_source_dirs.is_empty() {
            config.contracts.source_dirs = self.contracts_source_dirs.clone();
        }
        if self.skip_checksum_verification {
            config.contracts.verify_checksums = false;
        }
        if let Some(log_level) = &self.log_level {
            config.logging.level = log_level.clone();
        }
        if let Some(log_format) = self.log_format {
            config.logging.format = log_format;
        }
    }
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Deploy EndpointRegistry, SecretRegistry and TokenNetworkRegistry
    Raiden,
    /// Deploy a token contract
    Token(TokenArgs),
    /// Register a token with a TokenNetworkRegistry
    Register(RegisterArgs),
    /// Deploy the Raiden contracts and a token, then register the token
    All(TokenArgs),
}

#[derive(Debug, Clone, Args)]
pub struct TokenArgs {
    /// Token contract supply (number of total issued tokens)
    #[arg(long, default_value_t = 10_000_000)]
    pub token_supply: u64,

    /// Token contract name
    #[arg(long, default_value = CONTRACT_CUSTOM_TOKEN)]
    pub token_name: String,

    /// Token contract number of decimals
    #[arg(long, default_value_t = 18)]
    pub token_decimals: u8,

    /// Token contract symbol
    #[arg(long, default_value = "TKN")]
    pub token_symbol: String,
}

impl TokenArgs {
    pub fn params(&self) -> TokenParams {
        TokenParams {
            supply: self.token_supply,
            decimals: self.token_decimals,
            name: self.token_name.clone(),
            symbol: self.token_symbol.clone(),
        }
    }
}

#[derive(Debug, Clone, Args)]
pub struct RegisterArgs {
    /// Already deployed token address
    #[arg(long, value_parser = parse_address)]
    pub token_address: Option<Address>,

    /// Address of token network registry
    #[arg(long, value_parser = parse_address)]
    pub registry_address: Option<Address>,
}

impl RegisterArgs {
    /// Put the given addresses into `context`, replacing earlier entries.
    pub fn seed(&self, context: DeploymentContext, token_type: &str) -> DeploymentContext {
        let context = match self.token_address {
            Some(token) => context.with(token_type, token),
            None => context,
        };
        match self.registry_address {
            Some(registry) => context.with(CONTRACT_TOKEN_NETWORK_REGISTRY, registry),
            None => context,
        }
    }
}

/// Parse an ethereum address; checksums are not enforced.
pub fn parse_address(value: &str) -> Result<Address, DeployError> {
    value
        .trim()
        .parse()
        .map_err(|_| DeployError::InvalidAddress(value.to_string()))
}

impl Cli {
    /// Assemble and validate the configuration for this invocation.
    pub fn resolve_config(&self) -> Result<DeployConfig, ConfigError> {
        let mut config = match &self.global.config {
            Some(path) => read_config(path)?,
            None => DeployConfig::default(),
        };
        self.global.apply(&mut config);
        validate_config(&config).map_err(ConfigError::Validation)?;
        Ok(config)
    }
}

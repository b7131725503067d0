//! Subcommand execution.
//!
//! # Responsibilities
//! - Build the client, wallet, artifact store and deployer in order
//! - Run the pipeline steps a subcommand asks for
//! - Collect every produced address for output
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - Nothing touches the network before the configuration is validated

use std::path::Path;

use crate::artifacts::{ContractManager, SourceChecksums};
use crate::blockchain::{BlockchainClient, BlockchainError, RpcClient, Wallet};
use crate::cli::Command;
use crate::config::DeployConfig;
use crate::contracts::CONTRACT_TOKEN_NETWORK;
use crate::deploy::pipeline::{deploy_raiden_contracts, deploy_token_contract, register_token_network};
use crate::deploy::{
    ContractDeployer, DeployError, DeployResult, DeploymentContext, SettleTimeouts, TokenNetworkRegistration,
};

/// What a subcommand produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    pub context: DeploymentContext,
    pub registration: Option<TokenNetworkRegistration>,
}

impl CommandOutput {
    fn deployed(context: DeploymentContext) -> Self {
        Self {
            context,
            registration: None,
        }
    }

    /// Every address of the run, the token network last when registered.
    pub fn addresses(&self) -> DeploymentContext {
        match &self.registration {
            Some(registration) => self
                .context
                .clone()
                .with(CONTRACT_TOKEN_NETWORK, registration.token_network),
            None => self.context.clone(),
        }
    }
}

/// Connect to the configured node and run `command`.
pub async fn run(command: &Command, config: &DeployConfig) -> DeployResult<CommandOutput> {
    let client = BlockchainClient::new(config.rpc.clone()).await?;
    let chain_id = client.get_chain_id().await?;

    let key_path = config
        .account
        .private_key_path
        .as_deref()
        .ok_or_else(|| DeployError::InvalidArgument("no private key file configured".to_string()))?;
    let password = read_password(config.account.password_file.as_deref())?;
    let wallet = Wallet::from_key_file(key_path, password.as_deref(), chain_id.0)?;

    let contracts = ContractManager::load(&config.contracts.precompiled_path)?;
    let sources = if config.contracts.verify_checksums {
        Some(SourceChecksums::compute(&config.contracts.source_dirs)?)
    } else {
        None
    };

    let deployer = ContractDeployer::connect(client, wallet, contracts, sources.as_ref(), &config.transaction).await?;
    execute(&deployer, command, config).await
}

/// Run `command` with an already connected deployer.
pub async fn execute<C: RpcClient>(
    deployer: &ContractDeployer<C>,
    command: &Command,
    config: &DeployConfig,
) -> DeployResult<CommandOutput> {
    let settle_timeouts = SettleTimeouts {
        min: config.contracts.settle_timeout_min,
        max: config.contracts.settle_timeout_max,
    };
    let token_type = config.contracts.token_type.as_str();
    let register_gas_limit = config.transaction.register_gas_limit;

    match command {
        Command::Raiden => {
            let context = deploy_raiden_contracts(deployer, DeploymentContext::new(), settle_timeouts).await?;
            Ok(CommandOutput::deployed(context))
        }
        Command::Token(args) => {
            let context = deploy_token_contract(deployer, DeploymentContext::new(), &args.params(), token_type).await?;
            Ok(CommandOutput::deployed(context))
        }
        Command::Register(args) => {
            let context = args.seed(DeploymentContext::new(), token_type);
            let (context, registration) =
                register_token_network(deployer, context, token_type, register_gas_limit).await?;
            Ok(CommandOutput {
                context,
                registration: Some(registration),
            })
        }
        Command::All(args) => {
            let context = deploy_raiden_contracts(deployer, DeploymentContext::new(), settle_timeouts).await?;
            let context = deploy_token_contract(deployer, context, &args.params(), token_type).await?;
            let (context, registration) =
                register_token_network(deployer, context, token_type, register_gas_limit).await?;
            Ok(CommandOutput {
                context,
                registration: Some(registration),
            })
        }
    }
}

fn read_password(path: Option<&Path>) -> DeployResult<Option<String>> {
    let Some(path) = path else {
        return Ok(None);
    };
    let password = std::fs::read_to_string(path).map_err(|e| {
        BlockchainError::Wallet(format!("Cannot read password file {}: {}", path.display(), e))
    })?;
    Ok(Some(password.trim_end_matches(['\r', '\n']).to_string()))
}

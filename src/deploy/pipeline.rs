//! The fixed deployment sequences.
//!
//! Every step takes the current [`DeploymentContext`] and returns it extended
//! with the addresses it produced.

use alloy::dyn_abi::DynSolValue;
use alloy::primitives::{Address, U256};
use alloy::sol_types::SolCall;

use crate::blockchain::RpcClient;
use crate::contracts::{
    TokenNetworkRegistry, CONTRACT_ENDPOINT_REGISTRY, CONTRACT_SECRET_REGISTRY,
    CONTRACT_TOKEN_NETWORK_REGISTRY,
};
use crate::deploy::context::DeploymentContext;
use crate::deploy::deployer::ContractDeployer;
use crate::deploy::types::{DeployError, DeployResult};

/// Settlement window bounds for the TokenNetworkRegistry, in blocks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SettleTimeouts {
    pub min: u64,
    pub max: u64,
}

/// Token contract constructor parameters as given by the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenParams {
    /// Supply in whole tokens, scaled by `10^decimals` on deployment.
    pub supply: u64,
    pub decimals: u8,
    pub name: String,
    pub symbol: String,
}

impl TokenParams {
    /// Total supply in the token's smallest unit.
    pub fn scaled_supply(&self) -> DeployResult<U256> {
        U256::from(10u64)
            .checked_pow(U256::from(self.decimals))
            .and_then(|unit| unit.checked_mul(U256::from(self.supply)))
            .ok_or_else(|| {
                DeployError::InvalidArgument(format!(
                    "token supply {} with {} decimals overflows uint256",
                    self.supply, self.decimals
                ))
            })
    }

    /// Constructor arguments: supply, decimals, name, symbol.
    pub fn constructor_args(&self) -> DeployResult<Vec<DynSolValue>> {
        Ok(vec![
            DynSolValue::Uint(self.scaled_supply()?, 256),
            DynSolValue::Uint(U256::from(self.decimals), 8),
            DynSolValue::String(self.name.clone()),
            DynSolValue::String(self.symbol.clone()),
        ])
    }
}

/// Outcome of registering a token with a TokenNetworkRegistry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenNetworkRegistration {
    pub token_network_registry: Address,
    pub token: Address,
    pub token_network: Address,
    pub gas_used: u64,
}

/// Deploy a contract and record its address under its own name.
async fn deploy_step<C: RpcClient>(
    deployer: &ContractDeployer<C>,
    context: DeploymentContext,
    contract_name: &str,
    args: &[DynSolValue],
) -> DeployResult<DeploymentContext> {
    let receipt = deployer.deploy(contract_name, args).await?;
    Ok(context.with(contract_name, receipt.contract_address))
}

/// Deploy EndpointRegistry, SecretRegistry and TokenNetworkRegistry.
///
/// The TokenNetworkRegistry is constructed with the SecretRegistry address
/// deployed just before it and the node's network id.
pub async fn deploy_raiden_contracts<C: RpcClient>(
    deployer: &ContractDeployer<C>,
    context: DeploymentContext,
    settle_timeouts: SettleTimeouts,
) -> DeployResult<DeploymentContext> {
    let context = deploy_step(deployer, context, CONTRACT_ENDPOINT_REGISTRY, &[]).await?;
    let context = deploy_step(deployer, context, CONTRACT_SECRET_REGISTRY, &[]).await?;

    let secret_registry = context.require(CONTRACT_SECRET_REGISTRY)?;
    let network_id = deployer.network_id().await?;
    let args = [
        DynSolValue::Address(secret_registry),
        DynSolValue::Uint(U256::from(network_id), 256),
        DynSolValue::Uint(U256::from(settle_timeouts.min), 256),
        DynSolValue::Uint(U256::from(settle_timeouts.max), 256),
    ];
    deploy_step(deployer, context, CONTRACT_TOKEN_NETWORK_REGISTRY, &args).await
}

/// Deploy a token contract, recorded under `token_type`.
pub async fn deploy_token_contract<C: RpcClient>(
    deployer: &ContractDeployer<C>,
    context: DeploymentContext,
    token: &TokenParams,
    token_type: &str,
) -> DeployResult<DeploymentContext> {
    let args = token.constructor_args()?;
    tracing::debug!(
        token_type,
        supply = %token.supply,
        decimals = token.decimals,
        name = %token.name,
        symbol = %token.symbol,
        "Deploying token"
    );
    deploy_step(deployer, context, token_type, &args).await
}

/// Create the token network for `token_type` in the TokenNetworkRegistry.
///
/// Both addresses must already be in `context`; nothing is sent otherwise.
pub async fn register_token_network<C: RpcClient>(
    deployer: &ContractDeployer<C>,
    context: DeploymentContext,
    token_type: &str,
    gas_limit: u64,
) -> DeployResult<(DeploymentContext, TokenNetworkRegistration)> {
    let registry = context.require(CONTRACT_TOKEN_NETWORK_REGISTRY)?;
    let token = context.require(token_type)?;

    let create = TokenNetworkRegistry::createERC20TokenNetworkCall { _token_address: token };
    tracing::debug!(registry = %registry, token = %token, "Calling createERC20TokenNetwork");
    let receipt = deployer
        .transact("createERC20TokenNetwork", registry, create.abi_encode().into(), gas_limit)
        .await?;

    let lookup = TokenNetworkRegistry::token_to_token_networksCall { token };
    let output = deployer.call(registry, lookup.abi_encode().into()).await?;
    let token_network =
        TokenNetworkRegistry::token_to_token_networksCall::abi_decode_returns(&output).map_err(|e| {
            DeployError::Decode {
                call: "token_to_token_networks".to_string(),
                reason: e.to_string(),
            }
        })?;

    tracing::info!(
        token_network = %token_network,
        gas_used = receipt.gas_used,
        "TokenNetwork registered"
    );

    Ok((
        context,
        TokenNetworkRegistration {
            token_network_registry: registry,
            token,
            token_network,
            gas_used: receipt.gas_used,
        },
    ))
}

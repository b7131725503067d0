//! Blockchain RPC client with timeout and error handling.
//!
//! # Responsibilities
//! - Connect to JSON-RPC endpoint (primary + failovers)
//! - Query chain state (chain id, network id, balances, nonces, receipts)
//! - Broadcast signed transactions and run read-only calls
//! - Handle timeouts and network errors gracefully

use alloy::network::TransactionBuilder;
use alloy::primitives::{keccak256, Address, Bytes, TxHash, U256};
use alloy::providers::{Provider, ProviderBuilder};
use alloy::rpc::types::TransactionRequest;
use alloy::transports::TransportResult;
use async_trait::async_trait;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;

use crate::blockchain::types::{BlockchainError, BlockchainResult, ChainId, MinedReceipt, RpcConfig};

/// Chain access needed by the deployer.
///
/// Implemented by [`BlockchainClient`] for real nodes; tests provide
/// in-memory chains.
#[async_trait]
pub trait RpcClient: Send + Sync {
    /// `eth_chainId`, used for EIP-155 signing.
    async fn get_chain_id(&self) -> BlockchainResult<ChainId>;

    /// `net_version`.
    async fn get_network_id(&self) -> BlockchainResult<u64>;

    async fn get_balance(&self, address: Address) -> BlockchainResult<U256>;

    /// Pending transaction count, i.e. the next nonce to use.
    async fn get_transaction_count(&self, address: Address) -> BlockchainResult<u64>;

    /// Current gas price in wei.
    async fn get_gas_price(&self) -> BlockchainResult<u128>;

    /// Broadcast an EIP-2718 encoded signed transaction.
    async fn send_raw_transaction(&self, raw: Bytes) -> BlockchainResult<TxHash>;

    /// Returns `None` while the transaction is pending.
    async fn get_transaction_receipt(&self, tx_hash: TxHash) -> BlockchainResult<Option<MinedReceipt>>;

    /// Read-only `eth_call` against the latest block.
    async fn call(&self, to: Address, data: Bytes) -> BlockchainResult<Bytes>;
}

type DynProvider = Arc<dyn Provider + Send + Sync>;

/// Error replies meaning the node already holds the transaction.
const ALREADY_KNOWN_REPLIES: [&str; 3] = ["already known", "known transaction", "alreadyknown"];

fn is_already_known(error: &str) -> bool {
    let error = error.to_ascii_lowercase();
    ALREADY_KNOWN_REPLIES.iter().any(|reply| error.contains(reply))
}

/// Blockchain RPC client wrapper with failover support.
#[derive(Clone)]
pub struct BlockchainClient {
    /// List of providers (primary + failovers).
    providers: Vec<DynProvider>,
    /// Configuration.
    config: RpcConfig,
    /// Request timeout duration.
    timeout_duration: Duration,
}

impl BlockchainClient {
    /// Create a new blockchain client.
    ///
    /// When `config.chain_id` is set the connected chain must match it,
    /// otherwise construction fails.
    pub async fn new(config: RpcConfig) -> BlockchainResult<Self> {
        let timeout_duration = Duration::from_secs(config.rpc_timeout_secs);
        let mut providers = Vec::new();

        // 1. Add primary provider
        let primary_url: url::Url = config.rpc_url.parse().map_err(|e| {
            BlockchainError::Rpc(format!("Invalid RPC URL '{}': {}", config.rpc_url, e))
        })?;
        providers.push(Arc::new(ProviderBuilder::new().connect_http(primary_url)) as DynProvider);

        // 2. Add failover providers
        for url_str in &config.failover_urls {
            if let Ok(url) = url_str.parse() {
                providers.push(Arc::new(ProviderBuilder::new().connect_http(url)) as DynProvider);
            } else {
                tracing::warn!(url = %url_str, "Ignoring invalid failover RPC URL");
            }
        }

        let client = Self {
            providers,
            config: config.clone(),
            timeout_duration,
        };

        if config.chain_id.is_some() {
            client.verify_chain_id().await?;
        }

        tracing::info!(
            rpc_url = %config.rpc_url,
            failovers = client.providers.len() - 1,
            "Blockchain client initialized"
        );

        Ok(client)
    }

    /// Verify the connected chain ID matches configuration.
    pub async fn verify_chain_id(&self) -> BlockchainResult<()> {
        let Some(expected) = self.config.chain_id else {
            return Ok(());
        };
        let chain_id = RpcClient::get_chain_id(self).await?;
        if chain_id.0 != expected {
            return Err(BlockchainError::ChainMismatch {
                expected,
                actual: chain_id.0,
            });
        }
        Ok(())
    }

    /// Run `request` against each provider in order until one answers.
    async fn with_failover<T, F, Fut>(&self, operation: &'static str, request: F) -> BlockchainResult<T>
    where
        F: Fn(DynProvider) -> Fut,
        Fut: Future<Output = TransportResult<T>>,
    {
        let mut all_timed_out = true;
        for (i, provider) in self.providers.iter().enumerate() {
            match timeout(self.timeout_duration, request(provider.clone())).await {
                Ok(Ok(result)) => return Ok(result),
                Ok(Err(e)) => {
                    all_timed_out = false;
                    tracing::warn!(provider_idx = i, operation, error = %e, "RPC error, trying next provider");
                }
                Err(_) => {
                    tracing::warn!(provider_idx = i, operation, "RPC timeout, trying next provider");
                }
            }
        }
        if all_timed_out {
            return Err(BlockchainError::Timeout(self.config.rpc_timeout_secs));
        }
        Err(BlockchainError::Rpc(format!("All RPC providers failed: {operation}")))
    }
}

#[async_trait]
impl RpcClient for BlockchainClient {
    async fn get_chain_id(&self) -> BlockchainResult<ChainId> {
        self.with_failover("eth_chainId", |p| async move { p.get_chain_id().await })
            .await
            .map(ChainId)
    }

    async fn get_network_id(&self) -> BlockchainResult<u64> {
        self.with_failover("net_version", |p| async move { p.get_net_version().await })
            .await
    }

    async fn get_balance(&self, address: Address) -> BlockchainResult<U256> {
        self.with_failover("eth_getBalance", |p| async move { p.get_balance(address).await })
            .await
    }

    async fn get_transaction_count(&self, address: Address) -> BlockchainResult<u64> {
        self.with_failover("eth_getTransactionCount", |p| async move {
            p.get_transaction_count(address).pending().await
        })
        .await
    }

    async fn get_gas_price(&self) -> BlockchainResult<u128> {
        self.with_failover("eth_gasPrice", |p| async move { p.get_gas_price().await })
            .await
    }

    /// A node that already holds the transaction, e.g. after a timed out
    /// broadcast to an earlier provider, counts as accepted.
    async fn send_raw_transaction(&self, raw: Bytes) -> BlockchainResult<TxHash> {
        self.with_failover("eth_sendRawTransaction", |p| {
            let raw = raw.clone();
            async move {
                match p.send_raw_transaction(&raw).await {
                    Ok(pending) => Ok(*pending.tx_hash()),
                    Err(e) if is_already_known(&e.to_string()) => {
                        tracing::debug!(error = %e, "Transaction already known to node");
                        Ok(keccak256(&raw))
                    }
                    Err(e) => Err(e),
                }
            }
        })
        .await
    }

    async fn get_transaction_receipt(&self, tx_hash: TxHash) -> BlockchainResult<Option<MinedReceipt>> {
        self.with_failover("eth_getTransactionReceipt", |p| async move {
            p.get_transaction_receipt(tx_hash).await
        })
        .await
        .map(|receipt| receipt.map(MinedReceipt::from))
    }

    async fn call(&self, to: Address, data: Bytes) -> BlockchainResult<Bytes> {
        self.with_failover("eth_call", |p| {
            let request = TransactionRequest::default().with_to(to).with_input(data.clone());
            async move { p.call(request).await }
        })
        .await
    }
}

impl std::fmt::Debug for BlockchainClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BlockchainClient")
            .field("rpc_url", &self.config.rpc_url)
            .field("chain_id", &self.config.chain_id)
            .field("timeout_secs", &self.config.rpc_timeout_secs)
            .finish()
    }
}

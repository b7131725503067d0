//! Chain-specific types and error definitions.

use alloy::primitives::{Address, TxHash};
use alloy::rpc::types::TransactionReceipt;
use thiserror::Error;

// Re-export RpcConfig from config module to avoid duplication
pub use crate::config::schema::RpcConfig;

/// Chain ID type for strong typing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChainId(pub u64);

impl From<u64> for ChainId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl From<ChainId> for u64 {
    fn from(id: ChainId) -> Self {
        id.0
    }
}

/// Errors that can occur during blockchain operations.
#[derive(Debug, Error)]
pub enum BlockchainError {
    /// RPC connection or request failed.
    #[error("RPC error: {0}")]
    Rpc(String),

    /// RPC request timed out.
    #[error("RPC timeout after {0} seconds")]
    Timeout(u64),

    /// Invalid key material, unreadable key file or signing failure.
    #[error("Wallet error: {0}")]
    Wallet(String),

    /// Chain configuration mismatch.
    #[error("Chain ID mismatch: expected {expected}, got {actual}")]
    ChainMismatch { expected: u64, actual: u64 },
}

/// Result type for blockchain operations.
pub type BlockchainResult<T> = Result<T, BlockchainError>;

/// The parts of a mined transaction receipt the deployer cares about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MinedReceipt {
    pub tx_hash: TxHash,
    pub block_number: Option<u64>,
    /// Set only for contract creation transactions.
    pub contract_address: Option<Address>,
    pub gas_used: u64,
    /// `false` when the transaction reverted.
    pub success: bool,
}

impl From<TransactionReceipt> for MinedReceipt {
    fn from(receipt: TransactionReceipt) -> Self {
        Self {
            tx_hash: receipt.transaction_hash,
            block_number: receipt.block_number,
            contract_address: receipt.contract_address,
            gas_used: receipt.gas_used,
            success: receipt.status(),
        }
    }
}

/// Outcome of waiting for a submitted transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfirmationStatus {
    /// Receipt observed within the wait window.
    Mined(MinedReceipt),
    /// Wait window elapsed without a receipt.
    TimedOut,
}

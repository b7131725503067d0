//! Deployment types and error definitions.

use alloy::primitives::{Address, TxHash};
use std::fmt;
use thiserror::Error;

use crate::artifacts::ArtifactError;
use crate::blockchain::BlockchainError;

/// Errors that abort a deployment run.
#[derive(Debug, Error)]
pub enum DeployError {
    /// The signing account cannot pay for any transaction.
    #[error("Account {0} has insufficient funds")]
    InsufficientFunds(Address),

    /// Receipt not observed within the wait window.
    #[error("Transaction {tx_hash} was not mined within {wait_secs} seconds")]
    TransactionTimeout { tx_hash: TxHash, wait_secs: u64 },

    /// Malformed address supplied by the user.
    #[error("Invalid address '{0}': must be a valid ethereum address")]
    InvalidAddress(String),

    /// A step needs a contract address the context does not hold.
    #[error("No address for {0} in deployment context")]
    MissingContract(String),

    /// A deploy transaction was mined without creating a contract.
    #[error("Receipt of {contract} deployment ({tx_hash}) has no contract address")]
    MissingContractAddress { contract: String, tx_hash: TxHash },

    /// Transaction mined but reverted.
    #[error("Transaction {tx_hash} for {step} reverted")]
    Reverted { step: String, tx_hash: TxHash },

    /// User supplied values that cannot be turned into call arguments.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Contract call output could not be decoded.
    #[error("Cannot decode output of {call}: {reason}")]
    Decode { call: String, reason: String },

    #[error(transparent)]
    Blockchain(#[from] BlockchainError),

    /// Includes precompiled checksum mismatches.
    #[error(transparent)]
    Artifact(#[from] ArtifactError),
}

/// Result type for deployment operations.
pub type DeployResult<T> = Result<T, DeployError>;

/// Parameters applied to every transaction of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransactionParameters {
    pub from: Address,
    pub gas_limit: u64,
    /// Gas price in wei.
    pub gas_price: u128,
}

/// Result of one contract deployment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeploymentReceipt {
    pub contract_name: String,
    pub tx_hash: TxHash,
    pub block_number: Option<u64>,
    pub contract_address: Address,
    pub gas_used: u64,
}

/// Lifecycle of a single transaction step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepState {
    Pending,
    Submitted,
    Mined,
    TimedOut,
}

impl fmt::Display for StepState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = match self {
            StepState::Pending => "pending",
            StepState::Submitted => "submitted",
            StepState::Mined => "mined",
            StepState::TimedOut => "timed_out",
        };
        f.write_str(state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = DeployError::TransactionTimeout {
            tx_hash: TxHash::ZERO,
            wait_secs: 300,
        };
        assert!(err.to_string().contains("not mined within 300 seconds"));

        let err = DeployError::MissingContract("TokenNetworkRegistry".into());
        assert_eq!(err.to_string(), "No address for TokenNetworkRegistry in deployment context");
    }

    #[test]
    fn test_checksum_mismatch_is_transparent() {
        let err = DeployError::from(ArtifactError::ChecksumMismatch {
            name: "Token.sol".into(),
            precompiled: "aa".into(),
            source_checksum: "bb".into(),
        });
        assert_eq!(
            err.to_string(),
            "Checksum of Token.sol does not match: precompiled aa != source bb"
        );
    }

    #[test]
    fn test_step_state_display() {
        assert_eq!(StepState::TimedOut.to_string(), "timed_out");
        assert_eq!(StepState::Mined.to_string(), "mined");
    }
}

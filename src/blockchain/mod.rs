//! Blockchain integration subsystem.
//!
//! # Data Flow
//! ```text
//! Key file (hex key or keystore)
//!     → wallet.rs (key loading, signing, nonce tracking)
//!     → client.rs (RPC connection with timeouts and failover)
//!     → transaction.rs (build, sign, broadcast, wait for receipt)
//! ```
//!
//! # Security Constraints
//! - Never log private keys or sensitive data
//! - All RPC calls have configurable timeouts

pub mod client;
pub mod transaction;
pub mod types;
pub mod wallet;

pub use client::{BlockchainClient, RpcClient};
pub use transaction::TxBuilder;
pub use types::{BlockchainError, BlockchainResult, ChainId, ConfirmationStatus, MinedReceipt, RpcConfig};
pub use wallet::Wallet;

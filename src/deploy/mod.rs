//! Deployment orchestration.
//!
//! # Data Flow
//! ```text
//! ContractDeployer::connect
//!     → balance check, nonce sync, checksum verification
//! pipeline step (context in)
//!     → deployer.rs (encode, sign, broadcast, wait for receipt)
//!     → context.rs (record name → address)
//! pipeline step (context out) → next step
//! ```
//!
//! # Design Decisions
//! - Steps run strictly in sequence; the order encodes constructor dependencies
//! - The context is threaded by value, never shared
//! - A timed out or reverted step aborts the run, nothing is retried

pub mod context;
pub mod deployer;
pub mod pipeline;
pub mod types;

pub use context::DeploymentContext;
pub use deployer::ContractDeployer;
pub use pipeline::{SettleTimeouts, TokenNetworkRegistration, TokenParams};
pub use types::{DeployError, DeployResult, DeploymentReceipt, StepState, TransactionParameters};

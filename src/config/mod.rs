//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML, optional)
//!     → loader.rs (parse & deserialize)
//!     → command line overrides (cli.rs)
//!     → validation.rs (semantic checks)
//!     → DeployConfig (validated, immutable for the run)
//! ```
//!
//! # Design Decisions
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{read_config, ConfigError};
pub use schema::{
    AccountConfig, ContractsConfig, DeployConfig, LogFormat, LoggingConfig, RpcConfig,
    TransactionConfig,
};
pub use validation::{validate_config, ValidationError};

//! Raiden contract deployment library

pub mod artifacts;
pub mod blockchain;
pub mod cli;
pub mod commands;
pub mod config;
pub mod contracts;
pub mod deploy;
pub mod observability;
pub mod signing;

pub use cli::{Cli, Command};
pub use config::DeployConfig;
pub use deploy::{ContractDeployer, DeployError, DeploymentContext};

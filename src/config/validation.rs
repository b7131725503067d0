//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (gas > 0, settle timeout bounds ordered)
//! - Require a signing key and contract sources before any RPC traffic
//! - Reject log levels the subscriber would silently ignore
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: DeployConfig → Result<(), Vec<ValidationError>>

use std::fmt;
use tracing::level_filters::LevelFilter;

use crate::config::schema::DeployConfig;

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Validate a fully assembled configuration.
pub fn validate_config(config: &DeployConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if let Err(e) = url::Url::parse(&config.rpc.rpc_url) {
        errors.push(ValidationError::new("rpc.rpc_url", format!("invalid URL: {e}")));
    }
    for failover in &config.rpc.failover_urls {
        if url::Url::parse(failover).is_err() {
            errors.push(ValidationError::new(
                "rpc.failover_urls",
                format!("invalid URL: {failover}"),
            ));
        }
    }
    if config.rpc.rpc_timeout_secs == 0 {
        errors.push(ValidationError::new("rpc.rpc_timeout_secs", "must be greater than 0"));
    }

    if config.account.private_key_path.is_none() {
        errors.push(ValidationError::new("account.private_key_path", "a private key file is required"));
    }

    let tx = &config.transaction;
    if tx.gas_limit == 0 {
        errors.push(ValidationError::new("transaction.gas_limit", "must be greater than 0"));
    }
    if tx.register_gas_limit == 0 {
        errors.push(ValidationError::new("transaction.register_gas_limit", "must be greater than 0"));
    }
    if tx.poll_interval_ms == 0 {
        errors.push(ValidationError::new("transaction.poll_interval_ms", "must be greater than 0"));
    }

    let contracts = &config.contracts;
    if contracts.verify_checksums && contracts.source_dirs.is_empty() {
        errors.push(ValidationError::new(
            "contracts.source_dirs",
            "required for checksum verification (or disable contracts.verify_checksums)",
        ));
    }
    if contracts.settle_timeout_min >= contracts.settle_timeout_max {
        errors.push(ValidationError::new(
            "contracts.settle_timeout_min",
            format!(
                "must be lower than settle_timeout_max ({} >= {})",
                contracts.settle_timeout_min, contracts.settle_timeout_max
            ),
        ));
    }
    if contracts.token_type.is_empty() {
        errors.push(ValidationError::new("contracts.token_type", "must not be empty"));
    }

    if config.logging.level.parse::<LevelFilter>().is_err() {
        errors.push(ValidationError::new(
            "logging.level",
            format!(
                "unknown level '{}' (expected off, error, warn, info, debug or trace)",
                config.logging.level
            ),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn valid_config() -> DeployConfig {
        let mut config = DeployConfig::default();
        config.account.private_key_path = Some(PathBuf::from("/keys/deployer.key"));
        config.contracts.source_dirs = vec![PathBuf::from("contracts")];
        config
    }

    #[test]
    fn test_valid_config() {
        assert!(validate_config(&valid_config()).is_ok());
    }

    #[test]
    fn test_private_key_required() {
        let mut config = valid_config();
        config.account.private_key_path = None;
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "account.private_key_path");
    }

    #[test]
    fn test_sources_required_for_checksum_verification() {
        let mut config = valid_config();
        config.contracts.source_dirs.clear();
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "contracts.source_dirs");

        config.contracts.verify_checksums = false;
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_defaults_need_key_and_sources() {
        let errors = validate_config(&DeployConfig::default()).unwrap_err();
        let fields: Vec<_> = errors.iter().map(|e| e.field).collect();
        assert_eq!(fields, vec!["account.private_key_path", "contracts.source_dirs"]);
    }

    #[test]
    fn test_reports_all_errors() {
        let mut config = valid_config();
        config.rpc.rpc_url = "::not a url::".to_string();
        config.transaction.gas_limit = 0;
        config.contracts.settle_timeout_min = 1_000;
        config.contracts.settle_timeout_max = 10;

        let errors = validate_config(&config).unwrap_err();
        let fields: Vec<_> = errors.iter().map(|e| e.field).collect();
        assert_eq!(
            fields,
            vec!["rpc.rpc_url", "transaction.gas_limit", "contracts.settle_timeout_min"]
        );
    }

    #[test]
    fn test_unknown_log_level_rejected() {
        let mut config = valid_config();
        config.logging.level = "verbose".to_string();
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "logging.level");
        assert!(errors[0].message.contains("verbose"));

        config.logging.level = "TRACE".to_string();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_zero_wait_is_allowed() {
        let mut config = valid_config();
        config.transaction.wait_secs = 0;
        assert!(validate_config(&config).is_ok());
    }
}

//! Artifact types and error definitions.

use alloy::dyn_abi::{DynSolValue, JsonAbiExt};
use alloy::json_abi::JsonAbi;
use alloy::primitives::Bytes;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while loading, verifying or encoding contract artifacts.
#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error("Cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed precompiled contracts file: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid bytecode for {contract}: {reason}")]
    Hex { contract: String, reason: String },

    #[error("Unknown contract: {0}")]
    UnknownContract(String),

    #[error("Contract {0} has no bytecode")]
    EmptyBytecode(String),

    #[error("Cannot encode constructor arguments for {contract}: {reason}")]
    Encode { contract: String, reason: String },

    #[error("No precompiled checksum for {0}")]
    MissingChecksum(String),

    #[error("Checksum of {name} does not match: precompiled {precompiled} != source {source_checksum}")]
    ChecksumMismatch {
        name: String,
        precompiled: String,
        source_checksum: String,
    },
}

/// Result type for artifact operations.
pub type ArtifactResult<T> = Result<T, ArtifactError>;

/// ABI and creation bytecode of one compiled contract.
#[derive(Debug, Clone)]
pub struct ContractArtifact {
    pub name: String,
    pub abi: JsonAbi,
    pub bytecode: Bytes,
}

impl ContractArtifact {
    /// Creation code followed by the ABI-encoded constructor arguments.
    pub fn deploy_code(&self, args: &[DynSolValue]) -> ArtifactResult<Bytes> {
        if self.bytecode.is_empty() {
            return Err(ArtifactError::EmptyBytecode(self.name.clone()));
        }

        let mut code = self.bytecode.to_vec();
        match &self.abi.constructor {
            Some(constructor) => {
                let encoded = constructor.abi_encode_input(args).map_err(|e| ArtifactError::Encode {
                    contract: self.name.clone(),
                    reason: e.to_string(),
                })?;
                code.extend_from_slice(&encoded);
            }
            None if args.is_empty() => {}
            None => {
                return Err(ArtifactError::Encode {
                    contract: self.name.clone(),
                    reason: format!("no constructor in ABI but {} arguments given", args.len()),
                })
            }
        }
        Ok(code.into())
    }
}

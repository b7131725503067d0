//! Precompiled contract lookup.

use alloy::json_abi::JsonAbi;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use crate::artifacts::types::{ArtifactError, ArtifactResult, ContractArtifact};

/// On-disk layout of the precompiled contracts file.
#[derive(Debug, Deserialize)]
struct PrecompiledFile {
    contracts: BTreeMap<String, RawArtifact>,
    #[serde(default)]
    contracts_checksums: BTreeMap<String, String>,
    #[serde(default)]
    overall_checksum: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawArtifact {
    abi: JsonAbi,
    bin: String,
}

/// Read-only store of compiled contracts, keyed by contract name.
#[derive(Debug, Clone)]
pub struct ContractManager {
    contracts: BTreeMap<String, ContractArtifact>,
    contracts_checksums: BTreeMap<String, String>,
    overall_checksum: Option<String>,
}

impl ContractManager {
    /// Load the precompiled contracts file.
    pub fn load(path: &Path) -> ArtifactResult<Self> {
        let content = fs::read_to_string(path).map_err(|source| ArtifactError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let manager = Self::from_json(&content)?;

        tracing::debug!(
            path = %path.display(),
            contracts = manager.contracts.len(),
            "Precompiled contracts loaded"
        );
        Ok(manager)
    }

    /// Parse precompiled contracts from a JSON document.
    pub fn from_json(json: &str) -> ArtifactResult<Self> {
        let file: PrecompiledFile = serde_json::from_str(json)?;

        let contracts = file
            .contracts
            .into_iter()
            .map(|(name, raw)| {
                let bytecode = alloy::hex::decode(raw.bin.trim()).map_err(|e| ArtifactError::Hex {
                    contract: name.clone(),
                    reason: e.to_string(),
                })?;
                let artifact = ContractArtifact {
                    name: name.clone(),
                    abi: raw.abi,
                    bytecode: bytecode.into(),
                };
                Ok((name, artifact))
            })
            .collect::<ArtifactResult<BTreeMap<_, _>>>()?;

        Ok(Self {
            contracts,
            contracts_checksums: file.contracts_checksums,
            overall_checksum: file.overall_checksum,
        })
    }

    pub fn get_contract(&self, name: &str) -> ArtifactResult<&ContractArtifact> {
        self.contracts
            .get(name)
            .ok_or_else(|| ArtifactError::UnknownContract(name.to_string()))
    }

    /// Source file checksums recorded when the file was compiled.
    pub fn contracts_checksums(&self) -> &BTreeMap<String, String> {
        &self.contracts_checksums
    }

    pub fn overall_checksum(&self) -> Option<&str> {
        self.overall_checksum.as_deref()
    }
}

//! Source checksums and precompiled artifact verification.
//!
//! Each `*.sol` file in the source directories is hashed with sha256 and keyed
//! by file name. The overall checksum is the sha256 of the per-file hex
//! digests, ordered by file name and joined with `:`.

use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use crate::artifacts::manager::ContractManager;
use crate::artifacts::types::{ArtifactError, ArtifactResult};

/// Checksums derived from Solidity sources.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceChecksums {
    contracts: BTreeMap<String, String>,
    overall: String,
}

impl SourceChecksums {
    /// Hash every `*.sol` file directly inside each of `source_dirs`.
    pub fn compute<P: AsRef<Path>>(source_dirs: &[P]) -> ArtifactResult<Self> {
        let mut contracts = BTreeMap::new();

        for dir in source_dirs {
            let dir = dir.as_ref();
            let io_err = |source: std::io::Error| ArtifactError::Io {
                path: dir.to_path_buf(),
                source,
            };

            for entry in fs::read_dir(dir).map_err(io_err)? {
                let path = entry.map_err(io_err)?.path();
                if !path.is_file() || path.extension().and_then(|ext| ext.to_str()) != Some("sol") {
                    continue;
                }
                let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
                    continue;
                };

                let content = fs::read(&path).map_err(|source| ArtifactError::Io {
                    path: path.clone(),
                    source,
                })?;
                contracts.insert(name.to_string(), alloy::hex::encode(Sha256::digest(&content)));
            }
        }

        let overall = Self::overall_of(&contracts);
        tracing::debug!(files = contracts.len(), overall = %overall, "Source checksums computed");

        Ok(Self { contracts, overall })
    }

    fn overall_of(contracts: &BTreeMap<String, String>) -> String {
        let joined = contracts.values().map(String::as_str).collect::<Vec<_>>().join(":");
        alloy::hex::encode(Sha256::digest(joined.as_bytes()))
    }

    pub fn contracts(&self) -> &BTreeMap<String, String> {
        &self.contracts
    }

    pub fn overall(&self) -> &str {
        &self.overall
    }

    /// Check that the precompiled file was built from these sources.
    ///
    /// Every source file needs a matching stored checksum, and the overall
    /// checksums must agree.
    pub fn verify_precompiled(&self, precompiled: &ContractManager) -> ArtifactResult<()> {
        let stored = precompiled.contracts_checksums();

        for (file, checksum) in &self.contracts {
            let precompiled_checksum = stored
                .get(file)
                .ok_or_else(|| ArtifactError::MissingChecksum(file.clone()))?;
            if precompiled_checksum != checksum {
                return Err(ArtifactError::ChecksumMismatch {
                    name: file.clone(),
                    precompiled: precompiled_checksum.clone(),
                    source_checksum: checksum.clone(),
                });
            }
        }

        match precompiled.overall_checksum() {
            Some(overall) if overall == self.overall => Ok(()),
            other => Err(ArtifactError::ChecksumMismatch {
                name: "overall checksum".to_string(),
                precompiled: other.unwrap_or("<none>").to_string(),
                source_checksum: self.overall.clone(),
            }),
        }
    }
}

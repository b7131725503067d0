//! Compiled contract artifacts.
//!
//! # Data Flow
//! ```text
//! precompiled contracts file (ABI + bytecode + checksums)
//!     → manager.rs (parse, lookup by contract name, constructor encoding)
//! Solidity source directories
//!     → checksum.rs (sha256 per file, overall checksum)
//!     → compared against the precompiled file's stored checksums
//! ```

pub mod checksum;
pub mod manager;
pub mod types;

pub use checksum::SourceChecksums;
pub use manager::ContractManager;
pub use types::{ArtifactError, ArtifactResult, ContractArtifact};

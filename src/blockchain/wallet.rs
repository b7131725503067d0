//! Wallet management and transaction signing.
//!
//! # Security
//! - Private keys are loaded from a key file (raw hex or encrypted keystore)
//! - Keys are never logged or serialized

use alloy::eips::eip2718::Encodable2718;
use alloy::network::{EthereumWallet, TransactionBuilder};
use alloy::primitives::{Address, Bytes, B256};
use alloy::rpc::types::TransactionRequest;
use alloy::signers::local::PrivateKeySigner;
use alloy::signers::Signer;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::blockchain::types::{BlockchainError, BlockchainResult};

/// Wallet for transaction signing with nonce management.
#[derive(Debug, Clone)]
pub struct Wallet {
    /// The underlying signer (private key).
    signer: PrivateKeySigner,
    /// Next nonce for sequential transactions.
    nonce: Arc<AtomicU64>,
    /// Chain ID for EIP-155 replay protection.
    chain_id: u64,
}

impl Wallet {
    /// Create a wallet from a hex-encoded private key string.
    ///
    /// # Arguments
    /// * `private_key_hex` - Hex string (with or without 0x prefix)
    /// * `chain_id` - Chain ID for transaction signing
    pub fn from_private_key(private_key_hex: &str, chain_id: u64) -> BlockchainResult<Self> {
        let key_hex = private_key_hex.trim();
        let key_hex = key_hex.strip_prefix("0x").unwrap_or(key_hex);

        let signer: PrivateKeySigner = key_hex
            .parse()
            .map_err(|e| BlockchainError::Wallet(format!("Invalid private key format: {}", e)))?;

        Ok(Self::from_signer(signer, chain_id))
    }

    /// Load a wallet from a key file.
    ///
    /// The file holds either a hex private key or an encrypted JSON keystore.
    /// Keystores need `password`.
    pub fn from_key_file(path: &Path, password: Option<&str>, chain_id: u64) -> BlockchainResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            BlockchainError::Wallet(format!("Cannot read key file {}: {}", path.display(), e))
        })?;

        if !content.trim_start().starts_with('{') {
            return Self::from_private_key(&content, chain_id);
        }

        let password = password.ok_or_else(|| {
            BlockchainError::Wallet(format!("Keystore {} requires a password", path.display()))
        })?;
        let signer = PrivateKeySigner::decrypt_keystore(path, password)
            .map_err(|e| BlockchainError::Wallet(format!("Cannot decrypt keystore: {}", e)))?;

        Ok(Self::from_signer(signer, chain_id))
    }

    fn from_signer(signer: PrivateKeySigner, chain_id: u64) -> Self {
        tracing::info!(
            address = %signer.address(),
            chain_id = chain_id,
            "Wallet initialized"
        );

        Self {
            signer,
            nonce: Arc::new(AtomicU64::new(0)),
            chain_id,
        }
    }

    /// Get the wallet's address.
    pub fn address(&self) -> Address {
        self.signer.address()
    }

    /// Get the chain ID this wallet is configured for.
    pub fn chain_id(&self) -> u64 {
        self.chain_id
    }

    /// Get and increment the nonce atomically.
    pub fn get_and_increment_nonce(&self) -> u64 {
        self.nonce.fetch_add(1, Ordering::SeqCst)
    }

    /// Set the nonce to a specific value (e.g., after querying from chain).
    pub fn set_nonce(&self, nonce: u64) {
        self.nonce.store(nonce, Ordering::SeqCst);
    }

    /// Sign a fully populated transaction request.
    ///
    /// # Returns
    /// The EIP-2718 encoded signed transaction, ready for `eth_sendRawTransaction`.
    pub async fn sign_transaction(&self, request: TransactionRequest) -> BlockchainResult<Bytes> {
        let wallet = EthereumWallet::from(self.signer.clone());
        let envelope = request
            .build(&wallet)
            .await
            .map_err(|e| BlockchainError::Wallet(format!("Transaction signing failed: {}", e)))?;
        Ok(envelope.encoded_2718().into())
    }

    /// Sign a 32-byte hash without any prefix.
    pub async fn sign_hash(&self, hash: B256) -> BlockchainResult<alloy::signers::Signature> {
        self.signer
            .sign_hash(&hash)
            .await
            .map_err(|e| BlockchainError::Wallet(format!("Signing failed: {}", e)))
    }
}

//! Transaction building, signing, and receipt monitoring.
//!
//! # Responsibilities
//! - Build legacy transactions with the run's fixed gas parameters
//! - Sign and broadcast transactions
//! - Poll for the mined receipt until the wait window closes

use alloy::network::TransactionBuilder;
use alloy::primitives::{Bytes, TxHash, TxKind};
use alloy::rpc::types::TransactionRequest;
use std::time::Duration;
use tokio::time::{interval, timeout};

use crate::blockchain::client::RpcClient;
use crate::blockchain::types::{BlockchainError, BlockchainResult, ConfirmationStatus};
use crate::blockchain::wallet::Wallet;

/// Transaction builder bound to one signing account.
pub struct TxBuilder<C> {
    client: C,
    wallet: Wallet,
    poll_interval: Duration,
}

impl<C: RpcClient> TxBuilder<C> {
    /// Create a new transaction builder.
    pub fn new(client: C, wallet: Wallet, poll_interval: Duration) -> Self {
        Self {
            client,
            wallet,
            poll_interval,
        }
    }

    /// Load the account's next nonce from the chain into the wallet.
    pub async fn sync_nonce(&self) -> BlockchainResult<u64> {
        let chain_nonce = self.client.get_transaction_count(self.wallet.address()).await?;
        self.wallet.set_nonce(chain_nonce);
        tracing::debug!(address = %self.wallet.address(), nonce = chain_nonce, "Nonce synchronized");
        Ok(chain_nonce)
    }

    /// Build a transaction request, consuming the next nonce.
    ///
    /// # Arguments
    /// * `kind` - `TxKind::Create` for deployments, `TxKind::Call` otherwise
    /// * `input` - Deploy code or call data
    /// * `gas_limit` - Gas limit for this transaction
    /// * `gas_price` - Gas price in wei
    pub fn build(&self, kind: TxKind, input: Bytes, gas_limit: u64, gas_price: u128) -> TransactionRequest {
        let nonce = self.wallet.get_and_increment_nonce();

        let tx = TransactionRequest::default()
            .with_from(self.wallet.address())
            .with_input(input)
            .with_nonce(nonce)
            .with_gas_price(gas_price)
            .with_chain_id(self.wallet.chain_id())
            .with_gas_limit(gas_limit);

        match kind {
            TxKind::Create => tx.into_create(),
            TxKind::Call(to) => tx.with_to(to),
        }
    }

    /// Sign and broadcast a transaction.
    pub async fn send(&self, request: TransactionRequest) -> BlockchainResult<TxHash> {
        let raw = self.wallet.sign_transaction(request).await?;
        self.client.send_raw_transaction(raw).await
    }

    /// Wait for a transaction to be mined.
    ///
    /// The receipt is queried right away and then once per poll interval.
    /// RPC errors abort the wait; a missing receipt at the end of `wait`
    /// yields [`ConfirmationStatus::TimedOut`].
    pub async fn wait_for_receipt(&self, tx_hash: TxHash, wait: Duration) -> BlockchainResult<ConfirmationStatus> {
        let result = timeout(wait, async {
            let mut ticker = interval(self.poll_interval);

            loop {
                ticker.tick().await;

                match self.client.get_transaction_receipt(tx_hash).await? {
                    Some(receipt) => return Ok::<_, BlockchainError>(receipt),
                    None => tracing::debug!(tx_hash = %tx_hash, "Transaction pending"),
                }
            }
        })
        .await;

        match result {
            Ok(Ok(receipt)) => Ok(ConfirmationStatus::Mined(receipt)),
            Ok(Err(e)) => Err(e),
            Err(_) => Ok(ConfirmationStatus::TimedOut),
        }
    }

    pub fn client(&self) -> &C {
        &self.client
    }
}

//! Contract deployment and calls for one signing account.

use alloy::dyn_abi::DynSolValue;
use alloy::primitives::{Address, Bytes, TxKind, U256};
use std::time::Duration;

use crate::artifacts::{ContractManager, SourceChecksums};
use crate::blockchain::{ConfirmationStatus, MinedReceipt, RpcClient, TxBuilder, Wallet};
use crate::config::TransactionConfig;
use crate::deploy::types::{DeployError, DeployResult, DeploymentReceipt, StepState, TransactionParameters};

const GWEI: u128 = 1_000_000_000;

/// Deploys precompiled contracts and sends transactions to deployed ones.
pub struct ContractDeployer<C> {
    tx: TxBuilder<C>,
    contracts: ContractManager,
    params: TransactionParameters,
    wait: Duration,
}

impl<C: RpcClient> ContractDeployer<C> {
    /// Prepare a deployer for `wallet`.
    ///
    /// Fails with [`DeployError::InsufficientFunds`] when the account balance
    /// is zero, and with a checksum error when `sources` does not match the
    /// precompiled contracts.
    pub async fn connect(
        client: C,
        wallet: Wallet,
        contracts: ContractManager,
        sources: Option<&SourceChecksums>,
        config: &TransactionConfig,
    ) -> DeployResult<Self> {
        let from = wallet.address();

        let balance = client.get_balance(from).await?;
        if balance == U256::ZERO {
            return Err(DeployError::InsufficientFunds(from));
        }

        match sources {
            Some(sources) => {
                sources.verify_precompiled(&contracts)?;
                tracing::info!(overall = %sources.overall(), "Precompiled contracts match sources");
            }
            None => tracing::warn!("Checksum verification disabled, precompiled contracts are not checked"),
        }

        let gas_price = match config.gas_price_gwei {
            0 => client.get_gas_price().await?,
            gwei => u128::from(gwei) * GWEI,
        };

        let tx = TxBuilder::new(client, wallet, Duration::from_millis(config.poll_interval_ms));
        tx.sync_nonce().await?;

        let params = TransactionParameters {
            from,
            gas_limit: config.gas_limit,
            gas_price,
        };
        tracing::info!(
            address = %from,
            balance = %balance,
            gas_limit = params.gas_limit,
            gas_price = params.gas_price,
            "Deployer ready"
        );

        Ok(Self {
            tx,
            contracts,
            params,
            wait: Duration::from_secs(config.wait_secs),
        })
    }

    /// Deploy `contract_name` with the given constructor arguments.
    pub async fn deploy(&self, contract_name: &str, args: &[DynSolValue]) -> DeployResult<DeploymentReceipt> {
        let code = self.contracts.get_contract(contract_name)?.deploy_code(args)?;

        let receipt = self
            .submit_and_wait(contract_name, TxKind::Create, code, self.params.gas_limit)
            .await?;

        let contract_address = receipt.contract_address.ok_or_else(|| DeployError::MissingContractAddress {
            contract: contract_name.to_string(),
            tx_hash: receipt.tx_hash,
        })?;

        tracing::info!(
            contract = contract_name,
            address = %contract_address,
            gas_used = receipt.gas_used,
            "Contract deployed"
        );

        Ok(DeploymentReceipt {
            contract_name: contract_name.to_string(),
            tx_hash: receipt.tx_hash,
            block_number: receipt.block_number,
            contract_address,
            gas_used: receipt.gas_used,
        })
    }

    /// Send a state-changing call to a deployed contract and wait for it.
    pub async fn transact(&self, step: &str, to: Address, calldata: Bytes, gas_limit: u64) -> DeployResult<MinedReceipt> {
        self.submit_and_wait(step, TxKind::Call(to), calldata, gas_limit).await
    }

    /// Read-only call against the latest block.
    pub async fn call(&self, to: Address, calldata: Bytes) -> DeployResult<Bytes> {
        Ok(self.tx.client().call(to, calldata).await?)
    }

    /// Network id reported by the node.
    pub async fn network_id(&self) -> DeployResult<u64> {
        Ok(self.tx.client().get_network_id().await?)
    }

    pub fn params(&self) -> &TransactionParameters {
        &self.params
    }

    async fn submit_and_wait(&self, step: &str, kind: TxKind, input: Bytes, gas_limit: u64) -> DeployResult<MinedReceipt> {
        tracing::debug!(step, state = %StepState::Pending, "Building transaction");
        let request = self.tx.build(kind, input, gas_limit, self.params.gas_price);
        let tx_hash = self.tx.send(request).await?;
        tracing::debug!(step, state = %StepState::Submitted, tx_hash = %tx_hash, "Transaction submitted");

        match self.tx.wait_for_receipt(tx_hash, self.wait).await? {
            ConfirmationStatus::Mined(receipt) => {
                if !receipt.success {
                    return Err(DeployError::Reverted {
                        step: step.to_string(),
                        tx_hash,
                    });
                }
                tracing::debug!(
                    step,
                    state = %StepState::Mined,
                    tx_hash = %tx_hash,
                    block = ?receipt.block_number,
                    "Transaction mined"
                );
                Ok(receipt)
            }
            ConfirmationStatus::TimedOut => {
                tracing::error!(step, state = %StepState::TimedOut, tx_hash = %tx_hash, "Transaction not mined in time");
                Err(DeployError::TransactionTimeout {
                    tx_hash,
                    wait_secs: self.wait.as_secs(),
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifacts::ArtifactError;
    use crate::blockchain::{BlockchainResult, ChainId};
    use alloy::primitives::{keccak256, TxHash};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Instant;

    const TEST_PRIVATE_KEY: &str = "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

    const PRECOMPILED: &str = r#"{
        "contracts": {"EndpointRegistry": {"abi": [], "bin": "0x6080604052"}},
        "contracts_checksums": {},
        "overall_checksum": "00"
    }"#;

    /// Accepts every transaction but never mines any.
    struct StalledChain {
        balance: U256,
        sent: AtomicUsize,
    }

    impl StalledChain {
        fn funded() -> Self {
            Self {
                balance: U256::from(10u64).pow(U256::from(18)),
                sent: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl RpcClient for StalledChain {
        async fn get_chain_id(&self) -> BlockchainResult<ChainId> {
            Ok(ChainId(31337))
        }

        async fn get_network_id(&self) -> BlockchainResult<u64> {
            Ok(31337)
        }

        async fn get_balance(&self, _address: Address) -> BlockchainResult<U256> {
            Ok(self.balance)
        }

        async fn get_transaction_count(&self, _address: Address) -> BlockchainResult<u64> {
            Ok(0)
        }

        async fn get_gas_price(&self) -> BlockchainResult<u128> {
            Ok(7)
        }

        async fn send_raw_transaction(&self, raw: Bytes) -> BlockchainResult<TxHash> {
            self.sent.fetch_add(1, Ordering::SeqCst);
            Ok(keccak256(&raw))
        }

        async fn get_transaction_receipt(&self, _tx_hash: TxHash) -> BlockchainResult<Option<MinedReceipt>> {
            Ok(None)
        }

        async fn call(&self, _to: Address, _data: Bytes) -> BlockchainResult<Bytes> {
            Ok(Bytes::new())
        }
    }

    fn wallet() -> Wallet {
        Wallet::from_private_key(TEST_PRIVATE_KEY, 31337).unwrap()
    }

    fn tx_config() -> TransactionConfig {
        TransactionConfig {
            wait_secs: 0,
            poll_interval_ms: 10,
            ..TransactionConfig::default()
        }
    }

    #[tokio::test]
    async fn test_deploy_times_out_without_receipt() {
        let contracts = ContractManager::from_json(PRECOMPILED).unwrap();
        let deployer = ContractDeployer::connect(StalledChain::funded(), wallet(), contracts, None, &tx_config())
            .await
            .unwrap();

        let started = Instant::now();
        let err = deployer.deploy("EndpointRegistry", &[]).await.unwrap_err();

        assert!(matches!(err, DeployError::TransactionTimeout { wait_secs: 0, .. }));
        assert!(started.elapsed() < Duration::from_secs(5));
        assert_eq!(deployer.tx.client().sent.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_zero_balance_rejected() {
        let chain = StalledChain {
            balance: U256::ZERO,
            sent: AtomicUsize::new(0),
        };
        let contracts = ContractManager::from_json(PRECOMPILED).unwrap();

        let result = ContractDeployer::connect(chain, wallet(), contracts, None, &tx_config()).await;
        assert!(matches!(result, Err(DeployError::InsufficientFunds(address)) if address == wallet().address()));
    }

    #[tokio::test]
    async fn test_checksum_mismatch_rejected_on_connect() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("EndpointRegistry.sol"), "contract EndpointRegistry {}").unwrap();
        let sources = SourceChecksums::compute(&[dir.path()]).unwrap();
        let contracts = ContractManager::from_json(PRECOMPILED).unwrap();

        let result =
            ContractDeployer::connect(StalledChain::funded(), wallet(), contracts, Some(&sources), &tx_config()).await;
        assert!(matches!(
            result,
            Err(DeployError::Artifact(ArtifactError::MissingChecksum(file))) if file == "EndpointRegistry.sol"
        ));
    }

    #[tokio::test]
    async fn test_gas_price_from_config_or_node() {
        let contracts = ContractManager::from_json(PRECOMPILED).unwrap();
        let deployer = ContractDeployer::connect(StalledChain::funded(), wallet(), contracts.clone(), None, &tx_config())
            .await
            .unwrap();
        assert_eq!(deployer.params().gas_price, 5 * GWEI);
        assert_eq!(deployer.params().gas_limit, 5_500_000);
        assert_eq!(deployer.params().from, wallet().address());

        let config = TransactionConfig {
            gas_price_gwei: 0,
            ..tx_config()
        };
        let deployer = ContractDeployer::connect(StalledChain::funded(), wallet(), contracts, None, &config)
            .await
            .unwrap();
        assert_eq!(deployer.params().gas_price, 7);
    }

    #[tokio::test]
    async fn test_unknown_contract_sends_nothing() {
        let contracts = ContractManager::from_json(PRECOMPILED).unwrap();
        let deployer = ContractDeployer::connect(StalledChain::funded(), wallet(), contracts, None, &tx_config())
            .await
            .unwrap();

        let err = deployer.deploy("SecretRegistry", &[]).await.unwrap_err();
        assert!(matches!(err, DeployError::Artifact(ArtifactError::UnknownContract(_))));
        assert_eq!(deployer.tx.client().sent.load(Ordering::SeqCst), 0);
    }
}

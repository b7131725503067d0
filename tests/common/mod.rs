//! Shared fixtures for integration tests: an in-memory chain and a small
//! precompiled contracts file.

use alloy::consensus::{Transaction, TxEnvelope};
use alloy::eips::eip2718::Decodable2718;
use alloy::primitives::{keccak256, Address, Bytes, TxHash, TxKind, U256};
use alloy::sol_types::{SolCall, SolValue};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use raiden_deploy::artifacts::ContractManager;
use raiden_deploy::blockchain::{BlockchainError, BlockchainResult, ChainId, MinedReceipt, RpcClient, Wallet};
use raiden_deploy::config::TransactionConfig;
use raiden_deploy::contracts::TokenNetworkRegistry;
use raiden_deploy::deploy::ContractDeployer;

// Anvil's first account, publicly known
pub const TEST_PRIVATE_KEY: &str = "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";
pub const CHAIN_ID: u64 = 31337;
pub const NETWORK_ID: u64 = 337;

/// Creation code of each fixture contract is two bytes long.
pub const CODE_LEN: usize = 2;

pub const PRECOMPILED: &str = r#"{
    "contracts": {
        "EndpointRegistry": {"abi": [], "bin": "0x6001"},
        "SecretRegistry": {"abi": [], "bin": "0x6002"},
        "TokenNetworkRegistry": {
            "abi": [{
                "type": "constructor",
                "stateMutability": "nonpayable",
                "inputs": [
                    {"name": "_secret_registry_address", "type": "address"},
                    {"name": "_chain_id", "type": "uint256"},
                    {"name": "_settlement_timeout_min", "type": "uint256"},
                    {"name": "_settlement_timeout_max", "type": "uint256"}
                ]
            }],
            "bin": "0x6003"
        },
        "CustomToken": {
            "abi": [{
                "type": "constructor",
                "stateMutability": "nonpayable",
                "inputs": [
                    {"name": "initial_supply", "type": "uint256"},
                    {"name": "decimal_units", "type": "uint8"},
                    {"name": "token_name", "type": "string"},
                    {"name": "token_symbol", "type": "string"}
                ]
            }],
            "bin": "0x6004"
        },
        "HumanStandardToken": {
            "abi": [{
                "type": "constructor",
                "stateMutability": "nonpayable",
                "inputs": [
                    {"name": "_initialAmount", "type": "uint256"},
                    {"name": "_decimalUnits", "type": "uint8"},
                    {"name": "_tokenName", "type": "string"},
                    {"name": "_tokenSymbol", "type": "string"}
                ]
            }],
            "bin": "0x6005"
        }
    },
    "contracts_checksums": {},
    "overall_checksum": ""
}"#;

/// A transaction as the chain received it.
#[derive(Debug, Clone)]
pub struct SentTx {
    pub kind: TxKind,
    pub input: Bytes,
    pub nonce: u64,
    pub gas_limit: u64,
    pub gas_price: Option<u128>,
}

#[derive(Debug, Default)]
struct ChainState {
    block: u64,
    sent: Vec<SentTx>,
    receipts: HashMap<TxHash, MinedReceipt>,
    token_networks: HashMap<Address, Address>,
}

/// In-memory chain that mines every transaction instantly.
///
/// Contract addresses follow the CREATE rule for the sending account.
#[derive(Debug, Clone)]
pub struct MockChain {
    sender: Address,
    balance: U256,
    mining: bool,
    reverting: bool,
    state: Arc<Mutex<ChainState>>,
}

impl MockChain {
    pub fn new(sender: Address) -> Self {
        Self {
            sender,
            balance: U256::from(10u64).pow(U256::from(18)),
            mining: true,
            reverting: false,
            state: Arc::default(),
        }
    }

    /// Transactions are accepted but never mined.
    pub fn stalled(mut self) -> Self {
        self.mining = false;
        self
    }

    /// Every mined transaction reports failure.
    pub fn reverting(mut self) -> Self {
        self.reverting = true;
        self
    }

    pub fn sent(&self) -> Vec<SentTx> {
        self.state.lock().unwrap().sent.clone()
    }

    fn mine(&self, tx_hash: TxHash, tx: &SentTx) -> BlockchainResult<MinedReceipt> {
        let mut state = self.state.lock().unwrap();
        state.block += 1;

        let contract_address = match tx.kind {
            TxKind::Create => Some(self.sender.create(tx.nonce)),
            TxKind::Call(registry) => {
                if tx.input.starts_with(&TokenNetworkRegistry::createERC20TokenNetworkCall::SELECTOR) {
                    let call = TokenNetworkRegistry::createERC20TokenNetworkCall::abi_decode(&tx.input)
                        .map_err(|e| BlockchainError::Rpc(e.to_string()))?;
                    let token_network = registry.create(state.token_networks.len() as u64);
                    state.token_networks.insert(call._token_address, token_network);
                }
                None
            }
        };

        Ok(MinedReceipt {
            tx_hash,
            block_number: Some(state.block),
            contract_address,
            gas_used: 21_000 + tx.input.len() as u64,
            success: !self.reverting,
        })
    }
}

#[async_trait]
impl RpcClient for MockChain {
    async fn get_chain_id(&self) -> BlockchainResult<ChainId> {
        Ok(ChainId(CHAIN_ID))
    }

    async fn get_network_id(&self) -> BlockchainResult<u64> {
        Ok(NETWORK_ID)
    }

    async fn get_balance(&self, _address: Address) -> BlockchainResult<U256> {
        Ok(self.balance)
    }

    async fn get_transaction_count(&self, _address: Address) -> BlockchainResult<u64> {
        Ok(self.state.lock().unwrap().sent.len() as u64)
    }

    async fn get_gas_price(&self) -> BlockchainResult<u128> {
        Ok(1_000_000_000)
    }

    async fn send_raw_transaction(&self, raw: Bytes) -> BlockchainResult<TxHash> {
        let envelope = TxEnvelope::decode_2718(&mut raw.as_ref())
            .map_err(|e| BlockchainError::Rpc(format!("undecodable transaction: {e}")))?;
        let tx = SentTx {
            kind: envelope.kind(),
            input: envelope.input().clone(),
            nonce: envelope.nonce(),
            gas_limit: envelope.gas_limit(),
            gas_price: envelope.gas_price(),
        };
        let tx_hash = keccak256(&raw);

        if self.mining {
            let receipt = self.mine(tx_hash, &tx)?;
            self.state.lock().unwrap().receipts.insert(tx_hash, receipt);
        }
        self.state.lock().unwrap().sent.push(tx);
        Ok(tx_hash)
    }

    async fn get_transaction_receipt(&self, tx_hash: TxHash) -> BlockchainResult<Option<MinedReceipt>> {
        Ok(self.state.lock().unwrap().receipts.get(&tx_hash).cloned())
    }

    async fn call(&self, _to: Address, data: Bytes) -> BlockchainResult<Bytes> {
        let call = TokenNetworkRegistry::token_to_token_networksCall::abi_decode(&data)
            .map_err(|e| BlockchainError::Rpc(format!("execution reverted: {e}")))?;
        let state = self.state.lock().unwrap();
        let token_network = state.token_networks.get(&call.token).copied().unwrap_or_default();
        Ok(token_network.abi_encode().into())
    }
}

pub fn wallet() -> Wallet {
    Wallet::from_private_key(TEST_PRIVATE_KEY, CHAIN_ID).unwrap()
}

pub fn contracts() -> ContractManager {
    ContractManager::from_json(PRECOMPILED).unwrap()
}

pub fn tx_config() -> TransactionConfig {
    TransactionConfig {
        poll_interval_ms: 10,
        wait_secs: 5,
        ..TransactionConfig::default()
    }
}

/// A deployer on a fresh mock chain, plus a handle to inspect the chain.
pub async fn deployer_with(chain: MockChain, config: &TransactionConfig) -> (ContractDeployer<MockChain>, MockChain) {
    let deployer = ContractDeployer::connect(chain.clone(), wallet(), contracts(), None, config)
        .await
        .unwrap();
    (deployer, chain)
}

pub async fn deployer() -> (ContractDeployer<MockChain>, MockChain) {
    deployer_with(MockChain::new(wallet().address()), &tx_config()).await
}

//! Hashes and signatures of Raiden off-chain messages.
//!
//! Balance proofs, balance proof updates, cooperative settlements and
//! withdrawals are signed over an EIP-191 prefixed hash of their tightly
//! packed fields. Reward proofs are signed over the plain keccak256 hash.

use alloy::primitives::{eip191_hash_message, keccak256, Address, Bytes, B256, U256};
use alloy::signers::Signature;
use alloy::sol_types::SolValue;

use crate::blockchain::{BlockchainResult, Wallet};

/// Message type tags mixed into the signed data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum MessageTypeId {
    BalanceProof = 1,
    BalanceProofUpdate = 2,
    Withdraw = 3,
    CooperativeSettle = 4,
}

/// Fields shared by every token network message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChannelRef {
    pub token_network: Address,
    pub chain_id: U256,
    pub channel_id: U256,
}

/// Signed part of a balance proof.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BalanceProof {
    pub channel: ChannelRef,
    pub balance_hash: B256,
    pub nonce: U256,
    pub additional_hash: B256,
}

/// Leading fields of every channel message: token network, chain id,
/// message type and channel id.
fn channel_fields(channel: &ChannelRef, message_type: MessageTypeId) -> (Address, U256, U256, U256) {
    (
        channel.token_network,
        channel.chain_id,
        U256::from(message_type as u8),
        channel.channel_id,
    )
}

/// `keccak256(transferred_amount, locked_amount, locksroot)`.
pub fn hash_balance_data(transferred_amount: U256, locked_amount: U256, locksroot: B256) -> B256 {
    keccak256((transferred_amount, locked_amount, locksroot).abi_encode_packed())
}

/// Hash of `message` with the `"\x19Ethereum Signed Message:\n" + len` prefix.
pub fn eth_sign_hash_message(message: &[u8]) -> B256 {
    eip191_hash_message(message)
}

pub fn hash_balance_proof(proof: &BalanceProof) -> B256 {
    let (token_network, chain_id, message_type, channel_id) =
        channel_fields(&proof.channel, MessageTypeId::BalanceProof);
    let packed = (
        token_network,
        chain_id,
        message_type,
        channel_id,
        proof.balance_hash,
        proof.nonce,
        proof.additional_hash,
    )
        .abi_encode_packed();
    eth_sign_hash_message(&packed)
}

/// The non-closing participant's countersignature over the closing balance proof.
pub fn hash_balance_proof_update_message(proof: &BalanceProof, closing_signature: &[u8]) -> B256 {
    let (token_network, chain_id, message_type, channel_id) =
        channel_fields(&proof.channel, MessageTypeId::BalanceProofUpdate);
    let packed = (
        token_network,
        chain_id,
        message_type,
        channel_id,
        proof.balance_hash,
        proof.nonce,
        proof.additional_hash,
        Bytes::copy_from_slice(closing_signature),
    )
        .abi_encode_packed();
    eth_sign_hash_message(&packed)
}

pub fn hash_cooperative_settle_message(
    channel: &ChannelRef,
    participant1: Address,
    participant1_balance: U256,
    participant2: Address,
    participant2_balance: U256,
) -> B256 {
    let (token_network, chain_id, message_type, channel_id) =
        channel_fields(channel, MessageTypeId::CooperativeSettle);
    let packed = (
        token_network,
        chain_id,
        message_type,
        channel_id,
        participant1,
        participant1_balance,
        participant2,
        participant2_balance,
    )
        .abi_encode_packed();
    eth_sign_hash_message(&packed)
}

pub fn hash_withdraw_message(channel: &ChannelRef, participant: Address, amount_to_withdraw: U256) -> B256 {
    let (token_network, chain_id, message_type, channel_id) = channel_fields(channel, MessageTypeId::Withdraw);
    let packed = (token_network, chain_id, message_type, channel_id, participant, amount_to_withdraw)
        .abi_encode_packed();
    eth_sign_hash_message(&packed)
}

/// Reward proofs for monitoring services; no EIP-191 prefix.
pub fn hash_reward_proof(
    channel_id: U256,
    reward_amount: U256,
    token_network: Address,
    chain_id: U256,
    nonce: U256,
) -> B256 {
    keccak256((channel_id, reward_amount, token_network, chain_id, nonce).abi_encode_packed())
}

pub async fn sign_balance_proof(wallet: &Wallet, proof: &BalanceProof) -> BlockchainResult<Signature> {
    wallet.sign_hash(hash_balance_proof(proof)).await
}

pub async fn sign_balance_proof_update_message(
    wallet: &Wallet,
    proof: &BalanceProof,
    closing_signature: &[u8],
) -> BlockchainResult<Signature> {
    wallet
        .sign_hash(hash_balance_proof_update_message(proof, closing_signature))
        .await
}

pub async fn sign_cooperative_settle_message(
    wallet: &Wallet,
    channel: &ChannelRef,
    participant1: Address,
    participant1_balance: U256,
    participant2: Address,
    participant2_balance: U256,
) -> BlockchainResult<Signature> {
    let hash = hash_cooperative_settle_message(
        channel,
        participant1,
        participant1_balance,
        participant2,
        participant2_balance,
    );
    wallet.sign_hash(hash).await
}

pub async fn sign_withdraw_message(
    wallet: &Wallet,
    channel: &ChannelRef,
    participant: Address,
    amount_to_withdraw: U256,
) -> BlockchainResult<Signature> {
    wallet
        .sign_hash(hash_withdraw_message(channel, participant, amount_to_withdraw))
        .await
}

pub async fn sign_reward_proof(
    wallet: &Wallet,
    channel_id: U256,
    reward_amount: U256,
    token_network: Address,
    chain_id: U256,
    nonce: U256,
) -> BlockchainResult<Signature> {
    let hash = hash_reward_proof(channel_id, reward_amount, token_network, chain_id, nonce);
    wallet.sign_hash(hash).await
}

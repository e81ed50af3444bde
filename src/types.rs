//! Value snapshots returned by node queries.
//!
//! These are read-only views over node state. A fresh snapshot is produced
//! per query; nothing here carries a lifecycle of its own.

use serde::{Deserialize, Serialize};

/// The state of an account on the blockchain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountState {
    pub address: String,
    pub balance: u64,
}

/// A block in the blockchain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    pub id: String,
    pub hash: String,
}

/// A blockchain transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: String,
    pub amount: i64,
}

/// A message recorded on the blockchain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockchainMessage {
    pub id: String,
    pub content: String,
}

/// A slice of ledger data: blocks, transactions and messages.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerSlice {
    pub blocks: Vec<Block>,
    pub transactions: Vec<Transaction>,
    pub messages: Vec<BlockchainMessage>,
}

/// Receipt returned by the node after accepting a submitted message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageReceipt {
    pub id: String,
}

/// Acknowledgment for an event subscription.
///
/// Only the initial acknowledgment is modeled; post-acknowledgment delivery
/// is out of scope for the gateway.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriptionHandle {
    pub id: String,
    pub topic: String,
}

/// Optional narrowing of a ledger query.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerFilter {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
}

//! Operation identifiers and request payloads.

use crate::types::LedgerFilter;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifies which node capability a request invokes.
///
/// Immutable once a request has been parsed. Each variant maps to exactly
/// one registered [`crate::dispatch::Operation`] implementation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationKind {
    SubmitMessage,
    FetchAccountState,
    QueryLedgerData,
    Subscribe,
    Sign,
    Hash,
    Encrypt,
    ValidateAddress,
    DecodeNativeObject,
}

impl OperationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            OperationKind::SubmitMessage => "submit_message",
            OperationKind::FetchAccountState => "fetch_account_state",
            OperationKind::QueryLedgerData => "query_ledger_data",
            OperationKind::Subscribe => "subscribe",
            OperationKind::Sign => "sign",
            OperationKind::Hash => "hash",
            OperationKind::Encrypt => "encrypt",
            OperationKind::ValidateAddress => "validate_address",
            OperationKind::DecodeNativeObject => "decode_native_object",
        }
    }

    /// All kinds the gateway knows about, in registration order.
    pub const ALL: [OperationKind; 9] = [
        OperationKind::SubmitMessage,
        OperationKind::FetchAccountState,
        OperationKind::QueryLedgerData,
        OperationKind::Subscribe,
        OperationKind::Sign,
        OperationKind::Hash,
        OperationKind::Encrypt,
        OperationKind::ValidateAddress,
        OperationKind::DecodeNativeObject,
    ];
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Operation-specific input data.
///
/// Owned exclusively by the request that carries it and never retained past
/// the dispatch call. Each operation validates that it received the payload
/// shape it expects and rejects anything else as an invalid payload.
#[derive(Debug, Clone)]
pub enum OperationPayload {
    /// Raw message bytes for submission.
    Message { content: Vec<u8> },
    /// An account address string.
    Address(String),
    /// Ledger query narrowing.
    Ledger(LedgerFilter),
    /// Event subscription topic.
    Subscription { topic: String },
    /// Data to sign with a named key.
    Sign { data: Vec<u8>, key: String },
    /// Data to digest with a named algorithm.
    Hash { data: Vec<u8>, algorithm: String },
    /// Data to encrypt with a named key.
    Encrypt { data: Vec<u8>, key: String },
    /// A serialized native object (BOC) blob, base64 or hex encoded.
    NativeObject { blob: String },
    /// No input at all.
    Empty,
}

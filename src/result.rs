//! The normalized success/failure envelope returned by every operation.

use crate::error::GatewayError;
use crate::types::{AccountState, LedgerSlice, MessageReceipt, SubscriptionHandle};
use serde::Serialize;

/// Failure categories surfaced to callers.
///
/// This taxonomy is stable across all operation variants so the transport
/// adapter can map it to a uniform status code independent of which
/// capability was invoked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    UnsupportedOperation,
    ClientUnavailable,
    OperationError,
    Internal,
}

/// Success data, shaped per operation kind.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum OperationData {
    Receipt(MessageReceipt),
    Account(AccountState),
    Ledger(LedgerSlice),
    Subscription(SubscriptionHandle),
    Signature(SignatureData),
    Digest(DigestData),
    Ciphertext(CiphertextData),
    Verdict(AddressVerdict),
    Decoded(crate::boc::NativeObject),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SignatureData {
    /// Compact ECDSA signature, hex encoded.
    pub signature: String,
    /// Compressed public key of the signing key, hex encoded.
    pub public_key: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DigestData {
    pub algorithm: String,
    /// Digest bytes, hex encoded.
    pub hash: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CiphertextData {
    /// Nonce-prefixed AES-256-GCM ciphertext, base64 encoded.
    pub encrypted_data: String,
    pub key: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AddressVerdict {
    pub address: String,
    pub is_valid: bool,
}

/// Tagged union returned by every dispatch: exactly one of success or
/// failure, never both, never neither.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum OperationResult {
    Success { data: OperationData },
    Failure { kind: FailureKind, message: String },
}

impl OperationResult {
    pub fn success(data: OperationData) -> Self {
        OperationResult::Success { data }
    }

    pub fn failure(kind: FailureKind, message: impl Into<String>) -> Self {
        OperationResult::Failure {
            kind,
            message: message.into(),
        }
    }

    /// Classify an operation-level error into the stable failure taxonomy.
    ///
    /// Internal faults never leak their detail outward; the detail stays in
    /// the operator log at the dispatch boundary.
    pub fn from_error(err: GatewayError) -> Self {
        match err {
            GatewayError::UnsupportedOperation(_) => {
                OperationResult::failure(FailureKind::UnsupportedOperation, err.to_string())
            }
            GatewayError::ClientUnavailable(_) => {
                OperationResult::failure(FailureKind::ClientUnavailable, err.to_string())
            }
            GatewayError::Internal(_) | GatewayError::IoError(_) | GatewayError::ConfigError(_) => {
                OperationResult::failure(FailureKind::Internal, "internal gateway error")
            }
            other => OperationResult::failure(FailureKind::OperationError, other.to_string()),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, OperationResult::Success { .. })
    }

    /// The failure kind, if this result is a failure.
    pub fn failure_kind(&self) -> Option<FailureKind> {
        match self {
            OperationResult::Success { .. } => None,
            OperationResult::Failure { kind, .. } => Some(*kind),
        }
    }
}

//! Error types for the TVM gateway

use std::fmt;

#[derive(Debug, Clone)]
pub enum GatewayError {
    UnsupportedOperation(String),
    ClientUnavailable(String),
    InvalidPayload(String),
    NodeRejected(String),
    TransportError(String),
    CryptoError(String),
    DecodeError(String),
    KeyNotFound(String),
    ConfigError(String),
    IoError(String),
    Internal(String),
}

impl fmt::Display for GatewayError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            GatewayError::UnsupportedOperation(msg) => write!(f, "Unsupported operation: {}", msg),
            GatewayError::ClientUnavailable(msg) => write!(f, "Node client unavailable: {}", msg),
            GatewayError::InvalidPayload(msg) => write!(f, "Invalid payload: {}", msg),
            GatewayError::NodeRejected(msg) => write!(f, "Node rejected request: {}", msg),
            GatewayError::TransportError(msg) => write!(f, "Transport error: {}", msg),
            GatewayError::CryptoError(msg) => write!(f, "Cryptographic error: {}", msg),
            GatewayError::DecodeError(msg) => write!(f, "Decode error: {}", msg),
            GatewayError::KeyNotFound(msg) => write!(f, "Key not found: {}", msg),
            GatewayError::ConfigError(msg) => write!(f, "Configuration error: {}", msg),
            GatewayError::IoError(msg) => write!(f, "IO error: {}", msg),
            GatewayError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for GatewayError {}

impl From<std::io::Error> for GatewayError {
    fn from(err: std::io::Error) -> Self {
        GatewayError::IoError(err.to_string())
    }
}

/// Convenience alias used across the crate
pub type Result<T> = std::result::Result<T, GatewayError>;

//! TVM Gateway - A stateless HTTP facade over a TVM blockchain node
//!
//! # Architecture
//!
//! The crate is organized into logical modules:
//!
//! ## Dispatch Core
//! - [`dispatch`] - Gateway dispatcher, operation trait and registry
//! - [`result`] - Success/failure envelope and error classification
//! - [`request`] - Operation kinds and payloads
//!
//! ## Node Client
//! - [`client`] - Client acquisition, release and the HTTP implementation
//! - [`types`] - Value snapshots returned by node queries
//!
//! ## Operations
//! - [`operations`] - The nine capability implementations
//! - [`crypto`] - Signatures, digests and encryption (secp256k1, AES-GCM)
//! - [`keystore`] - Named key material for sign/encrypt
//! - [`boc`] - Native serialized-object decoding
//!
//! ## Transport & Configuration
//! - [`api`] - REST transport adapter (axum)
//! - [`config`] - Configuration management
//! - [`error`] - Error types

#![forbid(unsafe_code)]

// ============================================================================
// Dispatch Core
// ============================================================================
pub mod dispatch;
pub mod request;
pub mod result;

// ============================================================================
// Node Client
// ============================================================================
pub mod client;
pub mod types;

// ============================================================================
// Operations
// ============================================================================
pub mod boc;
pub mod crypto;
pub mod keystore;
pub mod operations;

// ============================================================================
// Transport & Configuration
// ============================================================================
pub mod api;
pub mod config;
pub mod error;

//! Local cryptographic operations: sign, hash, encrypt, validate.
//!
//! These run inside a dispatch like every other operation but never touch
//! the node; the client is acquired and released around them all the same.

use crate::client::NodeClient;
use crate::crypto;
use crate::dispatch::Operation;
use crate::error::{GatewayError, Result};
use crate::keystore::KeyStore;
use crate::request::OperationPayload;
use crate::result::{AddressVerdict, CiphertextData, DigestData, OperationData, SignatureData};
use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use std::sync::Arc;

/// Sign data with a named key from the keystore.
pub struct SignOp {
    keys: Arc<KeyStore>,
}

impl SignOp {
    pub fn new(keys: Arc<KeyStore>) -> Self {
        Self { keys }
    }
}

#[async_trait]
impl Operation for SignOp {
    async fn run(
        &self,
        _client: &mut dyn NodeClient,
        payload: &OperationPayload,
    ) -> Result<OperationData> {
        let OperationPayload::Sign { data, key } = payload else {
            return Err(GatewayError::InvalidPayload(
                "Expected data and a key name".to_string(),
            ));
        };
        if data.is_empty() {
            return Err(GatewayError::InvalidPayload(
                "Nothing to sign".to_string(),
            ));
        }
        let keypair = self.keys.signing_key(key)?;
        let signature = keypair.sign(data)?;
        Ok(OperationData::Signature(SignatureData {
            signature: hex::encode(signature),
            public_key: hex::encode(keypair.public_key_bytes()),
        }))
    }
}

/// Digest data with a named algorithm (sha256 or sha512).
pub struct HashOp;

#[async_trait]
impl Operation for HashOp {
    async fn run(
        &self,
        _client: &mut dyn NodeClient,
        payload: &OperationPayload,
    ) -> Result<OperationData> {
        let OperationPayload::Hash { data, algorithm } = payload else {
            return Err(GatewayError::InvalidPayload(
                "Expected data and an algorithm name".to_string(),
            ));
        };
        let algorithm = crypto::HashAlgorithm::from_name(algorithm).ok_or_else(|| {
            GatewayError::InvalidPayload(format!("Unsupported hash algorithm '{}'", algorithm))
        })?;
        let hash = crypto::digest(algorithm, data);
        Ok(OperationData::Digest(DigestData {
            algorithm: algorithm.as_str().to_string(),
            hash: hex::encode(hash),
        }))
    }
}

/// Encrypt data with a named AES-256-GCM key from the keystore.
pub struct EncryptOp {
    keys: Arc<KeyStore>,
}

impl EncryptOp {
    pub fn new(keys: Arc<KeyStore>) -> Self {
        Self { keys }
    }
}

#[async_trait]
impl Operation for EncryptOp {
    async fn run(
        &self,
        _client: &mut dyn NodeClient,
        payload: &OperationPayload,
    ) -> Result<OperationData> {
        let OperationPayload::Encrypt { data, key } = payload else {
            return Err(GatewayError::InvalidPayload(
                "Expected data and a key name".to_string(),
            ));
        };
        let cipher_key = self.keys.cipher_key(key)?;
        let blob = crypto::encrypt(cipher_key, data)?;
        Ok(OperationData::Ciphertext(CiphertextData {
            encrypted_data: BASE64.encode(blob),
            key: key.clone(),
        }))
    }
}

/// Validate an address string. Always succeeds with a verdict: malformed
/// input is a `false`, never a failure.
pub struct ValidateAddressOp;

#[async_trait]
impl Operation for ValidateAddressOp {
    async fn run(
        &self,
        _client: &mut dyn NodeClient,
        payload: &OperationPayload,
    ) -> Result<OperationData> {
        let OperationPayload::Address(address) = payload else {
            return Err(GatewayError::InvalidPayload(
                "Expected an address string".to_string(),
            ));
        };
        Ok(OperationData::Verdict(AddressVerdict {
            address: address.clone(),
            is_valid: crypto::validate_address(address),
        }))
    }
}

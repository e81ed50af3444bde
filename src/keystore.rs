//! Named key material for the sign and encrypt operations.
//!
//! Keys are loaded once at startup from configuration and are read-only
//! afterwards, so the store is safe to share across concurrent dispatches.

use crate::crypto::{KeyPair, CIPHER_KEY_SIZE};
use crate::error::{GatewayError, Result};
use rand::rngs::OsRng;
use rand::RngCore;
use std::collections::HashMap;

#[derive(Debug, Default)]
pub struct KeyStore {
    signing: HashMap<String, KeyPair>,
    cipher: HashMap<String, [u8; CIPHER_KEY_SIZE]>,
}

impl KeyStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from hex-encoded secret material, as carried in the
    /// `[keys]` config section.
    pub fn from_hex_maps(
        signing: &HashMap<String, String>,
        cipher: &HashMap<String, String>,
    ) -> Result<Self> {
        let mut store = KeyStore::new();
        for (name, hex_secret) in signing {
            let bytes = hex::decode(hex_secret).map_err(|e| {
                GatewayError::ConfigError(format!("Signing key '{}' is not valid hex: {}", name, e))
            })?;
            store.add_signing_key(name, KeyPair::from_secret_bytes(&bytes)?);
        }
        for (name, hex_secret) in cipher {
            let bytes = hex::decode(hex_secret).map_err(|e| {
                GatewayError::ConfigError(format!("Cipher key '{}' is not valid hex: {}", name, e))
            })?;
            let key: [u8; CIPHER_KEY_SIZE] = bytes.try_into().map_err(|_| {
                GatewayError::ConfigError(format!(
                    "Cipher key '{}' must be {} bytes",
                    name, CIPHER_KEY_SIZE
                ))
            })?;
            store.add_cipher_key(name, key);
        }
        Ok(store)
    }

    /// A store with freshly generated `default` keys. Used when no key
    /// material is configured, so dev deployments work out of the box.
    pub fn ephemeral() -> Self {
        let mut store = KeyStore::new();
        store.add_signing_key("default", KeyPair::generate());
        let mut cipher_key = [0u8; CIPHER_KEY_SIZE];
        OsRng.fill_bytes(&mut cipher_key);
        store.add_cipher_key("default", cipher_key);
        store
    }

    pub fn add_signing_key(&mut self, name: &str, keypair: KeyPair) {
        self.signing.insert(name.to_string(), keypair);
    }

    pub fn add_cipher_key(&mut self, name: &str, key: [u8; CIPHER_KEY_SIZE]) {
        self.cipher.insert(name.to_string(), key);
    }

    pub fn signing_key(&self, name: &str) -> Result<&KeyPair> {
        self.signing
            .get(name)
            .ok_or_else(|| GatewayError::KeyNotFound(format!("signing key '{}'", name)))
    }

    pub fn cipher_key(&self, name: &str) -> Result<&[u8; CIPHER_KEY_SIZE]> {
        self.cipher
            .get(name)
            .ok_or_else(|| GatewayError::KeyNotFound(format!("cipher key '{}'", name)))
    }

    pub fn is_empty(&self) -> bool {
        self.signing.is_empty() && self.cipher.is_empty()
    }
}

//! Operation implementations, one per node capability.

pub mod boc_ops;
pub mod crypto_ops;
pub mod node;

use crate::dispatch::OperationRegistry;
use crate::keystore::KeyStore;
use crate::request::OperationKind;
use std::sync::Arc;

/// Build the registry with all nine operations. Called once at startup;
/// the result is read-only thereafter.
pub fn default_registry(keys: Arc<KeyStore>) -> OperationRegistry {
    let mut registry = OperationRegistry::new();
    registry.register(
        OperationKind::SubmitMessage,
        Box::new(node::SubmitMessageOp),
    );
    registry.register(
        OperationKind::FetchAccountState,
        Box::new(node::FetchAccountStateOp),
    );
    registry.register(
        OperationKind::QueryLedgerData,
        Box::new(node::QueryLedgerDataOp),
    );
    registry.register(OperationKind::Subscribe, Box::new(node::SubscribeOp));
    registry.register(
        OperationKind::Sign,
        Box::new(crypto_ops::SignOp::new(keys.clone())),
    );
    registry.register(OperationKind::Hash, Box::new(crypto_ops::HashOp));
    registry.register(
        OperationKind::Encrypt,
        Box::new(crypto_ops::EncryptOp::new(keys)),
    );
    registry.register(
        OperationKind::ValidateAddress,
        Box::new(crypto_ops::ValidateAddressOp),
    );
    registry.register(
        OperationKind::DecodeNativeObject,
        Box::new(boc_ops::DecodeNativeObjectOp),
    );
    registry
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_registry_covers_every_kind() {
        let registry = default_registry(Arc::new(KeyStore::ephemeral()));
        assert_eq!(registry.len(), OperationKind::ALL.len());
        for kind in OperationKind::ALL {
            assert!(registry.is_registered(kind), "{} not registered", kind);
        }
    }
}

//! Integration tests for the gateway dispatch core.
//!
//! These verify the client lifecycle guarantees: one acquire and one release
//! per dispatched operation on every exit path, none at all for unsupported
//! kinds, and stable failure classification.

use async_trait::async_trait;
use sha2::{Digest, Sha256};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tvm_gateway::client::{NodeClient, NodeConnector};
use tvm_gateway::dispatch::{GatewayDispatcher, Operation, OperationRegistry};
use tvm_gateway::error::{GatewayError, Result};
use tvm_gateway::keystore::KeyStore;
use tvm_gateway::operations::default_registry;
use tvm_gateway::request::{OperationKind, OperationPayload};
use tvm_gateway::result::{FailureKind, OperationData, OperationResult};
use tvm_gateway::types::{
    AccountState, LedgerFilter, LedgerSlice, MessageReceipt, SubscriptionHandle,
};

// ============================================================================
// Stub node client
// ============================================================================

/// Counters shared between a stub connector and every client it hands out.
#[derive(Default)]
struct Lifecycle {
    acquired: AtomicUsize,
    released: AtomicUsize,
}

struct StubClient {
    lifecycle: Arc<Lifecycle>,
    reject_sends: bool,
}

#[async_trait]
impl NodeClient for StubClient {
    async fn send_message(&mut self, payload: &[u8]) -> Result<MessageReceipt> {
        if self.reject_sends {
            return Err(GatewayError::NodeRejected("message rejected".to_string()));
        }
        // Receipt id correlated to the submitted content
        Ok(MessageReceipt {
            id: hex::encode(Sha256::digest(payload)),
        })
    }

    async fn account_state(&mut self, address: &str) -> Result<AccountState> {
        Ok(AccountState {
            address: address.to_string(),
            balance: 100,
        })
    }

    async fn ledger_slice(&mut self, filter: &LedgerFilter) -> Result<LedgerSlice> {
        let mut slice = LedgerSlice {
            blocks: vec![],
            transactions: vec![],
            messages: vec![tvm_gateway::types::BlockchainMessage {
                id: "msg1".to_string(),
                content: "message1".to_string(),
            }],
        };
        if let Some(message_id) = &filter.message_id {
            slice.messages.retain(|m| &m.id == message_id);
        }
        Ok(slice)
    }

    async fn subscribe(&mut self, topic: &str) -> Result<SubscriptionHandle> {
        Ok(SubscriptionHandle {
            id: "sub-1".to_string(),
            topic: topic.to_string(),
        })
    }

    async fn release(&mut self) {
        self.lifecycle.released.fetch_add(1, Ordering::SeqCst);
    }
}

struct StubConnector {
    lifecycle: Arc<Lifecycle>,
    fail_acquire: bool,
    reject_sends: bool,
}

impl StubConnector {
    fn working(lifecycle: Arc<Lifecycle>) -> Self {
        Self {
            lifecycle,
            fail_acquire: false,
            reject_sends: false,
        }
    }
}

#[async_trait]
impl NodeConnector for StubConnector {
    async fn acquire(&self) -> Result<Box<dyn NodeClient>> {
        if self.fail_acquire {
            return Err(GatewayError::ClientUnavailable(
                "endpoint unreachable".to_string(),
            ));
        }
        self.lifecycle.acquired.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(StubClient {
            lifecycle: self.lifecycle.clone(),
            reject_sends: self.reject_sends,
        }))
    }
}

fn full_dispatcher(connector: StubConnector) -> GatewayDispatcher {
    let registry = Arc::new(default_registry(Arc::new(KeyStore::ephemeral())));
    GatewayDispatcher::new(Arc::new(connector), registry)
}

fn sample_boc() -> String {
    use base64::Engine;
    let mut bytes = vec![0xb5, 0xee, 0x9c, 0x72, 0x01, 0x01];
    bytes.extend_from_slice(&[0x02, 0x01, 0x00, 0x08, 0x00]);
    bytes.extend_from_slice(&[0xde, 0xad, 0xbe, 0xef, 0x00, 0x11, 0x22, 0x33]);
    base64::engine::general_purpose::STANDARD.encode(bytes)
}

/// A well-formed payload for each operation kind.
fn payload_for(kind: OperationKind) -> OperationPayload {
    match kind {
        OperationKind::SubmitMessage => OperationPayload::Message {
            content: b"hello".to_vec(),
        },
        OperationKind::FetchAccountState => OperationPayload::Address("0x123abc".to_string()),
        OperationKind::QueryLedgerData => OperationPayload::Ledger(LedgerFilter::default()),
        OperationKind::Subscribe => OperationPayload::Subscription {
            topic: "blocks".to_string(),
        },
        OperationKind::Sign => OperationPayload::Sign {
            data: b"payload".to_vec(),
            key: "default".to_string(),
        },
        OperationKind::Hash => OperationPayload::Hash {
            data: b"payload".to_vec(),
            algorithm: "sha256".to_string(),
        },
        OperationKind::Encrypt => OperationPayload::Encrypt {
            data: b"payload".to_vec(),
            key: "default".to_string(),
        },
        OperationKind::ValidateAddress => OperationPayload::Address("anything".to_string()),
        OperationKind::DecodeNativeObject => OperationPayload::NativeObject { blob: sample_boc() },
    }
}

fn success_json(result: OperationResult) -> serde_json::Value {
    match result {
        OperationResult::Success { data } => serde_json::to_value(&data).unwrap(),
        OperationResult::Failure { kind, message } => {
            panic!("expected success, got {:?}: {}", kind, message)
        }
    }
}

// ============================================================================
// Lifecycle properties
// ============================================================================

#[tokio::test]
async fn test_every_kind_acquires_and_releases_exactly_once() {
    let lifecycle = Arc::new(Lifecycle::default());
    let dispatcher = full_dispatcher(StubConnector::working(lifecycle.clone()));

    for kind in OperationKind::ALL {
        let result = dispatcher.execute(kind, payload_for(kind)).await;
        assert!(result.is_success(), "{} failed: {:?}", kind, result);
    }

    let expected = OperationKind::ALL.len();
    assert_eq!(lifecycle.acquired.load(Ordering::SeqCst), expected);
    assert_eq!(lifecycle.released.load(Ordering::SeqCst), expected);
}

#[tokio::test]
async fn test_failed_operation_still_releases_client() {
    let lifecycle = Arc::new(Lifecycle::default());
    let dispatcher = full_dispatcher(StubConnector::working(lifecycle.clone()));

    // Empty message content is rejected before reaching the node
    let result = dispatcher
        .execute(
            OperationKind::SubmitMessage,
            OperationPayload::Message { content: vec![] },
        )
        .await;
    assert_eq!(result.failure_kind(), Some(FailureKind::OperationError));

    assert_eq!(lifecycle.acquired.load(Ordering::SeqCst), 1);
    assert_eq!(lifecycle.released.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_node_rejection_is_classified_and_released() {
    let lifecycle = Arc::new(Lifecycle::default());
    let connector = StubConnector {
        lifecycle: lifecycle.clone(),
        fail_acquire: false,
        reject_sends: true,
    };
    let dispatcher = full_dispatcher(connector);

    let result = dispatcher
        .execute(
            OperationKind::SubmitMessage,
            payload_for(OperationKind::SubmitMessage),
        )
        .await;
    assert_eq!(result.failure_kind(), Some(FailureKind::OperationError));
    assert_eq!(lifecycle.released.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_unsupported_kind_acquires_nothing() {
    let lifecycle = Arc::new(Lifecycle::default());
    let connector = StubConnector::working(lifecycle.clone());

    // A registry with a single capability: everything else is unsupported
    let mut registry = OperationRegistry::new();
    registry.register(
        OperationKind::ValidateAddress,
        Box::new(tvm_gateway::operations::crypto_ops::ValidateAddressOp),
    );
    let dispatcher = GatewayDispatcher::new(Arc::new(connector), Arc::new(registry));

    let result = dispatcher
        .execute(OperationKind::Sign, payload_for(OperationKind::Sign))
        .await;
    assert_eq!(
        result.failure_kind(),
        Some(FailureKind::UnsupportedOperation)
    );
    if let OperationResult::Failure { message, .. } = &result {
        assert!(message.contains("Unsupported operation"));
    }
    assert_eq!(lifecycle.acquired.load(Ordering::SeqCst), 0);
    assert_eq!(lifecycle.released.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_acquisition_failure_surfaces_client_unavailable_for_every_kind() {
    let lifecycle = Arc::new(Lifecycle::default());
    let connector = StubConnector {
        lifecycle: lifecycle.clone(),
        fail_acquire: true,
        reject_sends: false,
    };
    let dispatcher = full_dispatcher(connector);

    for kind in OperationKind::ALL {
        let result = dispatcher.execute(kind, payload_for(kind)).await;
        assert_eq!(
            result.failure_kind(),
            Some(FailureKind::ClientUnavailable),
            "{} was not classified as unavailable",
            kind
        );
    }
    assert_eq!(lifecycle.acquired.load(Ordering::SeqCst), 0);
    assert_eq!(lifecycle.released.load(Ordering::SeqCst), 0);
}

struct PanickingOp;

#[async_trait]
impl Operation for PanickingOp {
    async fn run(
        &self,
        _client: &mut dyn NodeClient,
        _payload: &OperationPayload,
    ) -> Result<OperationData> {
        panic!("boom");
    }
}

#[tokio::test]
async fn test_panicking_operation_is_contained_and_client_released() {
    let lifecycle = Arc::new(Lifecycle::default());
    let connector = StubConnector::working(lifecycle.clone());

    let mut registry = OperationRegistry::new();
    registry.register(OperationKind::Subscribe, Box::new(PanickingOp));
    let dispatcher = GatewayDispatcher::new(Arc::new(connector), Arc::new(registry));

    let result = dispatcher
        .execute(
            OperationKind::Subscribe,
            payload_for(OperationKind::Subscribe),
        )
        .await;
    assert_eq!(result.failure_kind(), Some(FailureKind::Internal));

    // The detail of the panic never reaches the caller
    if let OperationResult::Failure { message, .. } = result {
        assert!(!message.contains("boom"));
    }

    assert_eq!(lifecycle.acquired.load(Ordering::SeqCst), 1);
    assert_eq!(lifecycle.released.load(Ordering::SeqCst), 1);
}

struct HangingOp;

#[async_trait]
impl Operation for HangingOp {
    async fn run(
        &self,
        _client: &mut dyn NodeClient,
        _payload: &OperationPayload,
    ) -> Result<OperationData> {
        futures::future::pending().await
    }
}

#[tokio::test]
async fn test_abandoned_dispatch_still_releases_client() {
    let lifecycle = Arc::new(Lifecycle::default());
    let connector = StubConnector::working(lifecycle.clone());

    let mut registry = OperationRegistry::new();
    registry.register(OperationKind::Subscribe, Box::new(HangingOp));
    let dispatcher = GatewayDispatcher::new(Arc::new(connector), Arc::new(registry));

    // A caller losing interest drops the execute future mid-operation
    let abandoned = tokio::time::timeout(
        Duration::from_millis(50),
        dispatcher.execute(
            OperationKind::Subscribe,
            payload_for(OperationKind::Subscribe),
        ),
    )
    .await;
    assert!(abandoned.is_err());

    // Release runs on a background task; give it a moment
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(lifecycle.acquired.load(Ordering::SeqCst), 1);
    assert_eq!(lifecycle.released.load(Ordering::SeqCst), 1);
}

// ============================================================================
// Round-trip properties
// ============================================================================

#[tokio::test]
async fn test_submit_message_round_trip() {
    let lifecycle = Arc::new(Lifecycle::default());
    let dispatcher = full_dispatcher(StubConnector::working(lifecycle.clone()));

    let content = b"Hello, world!".to_vec();
    let result = dispatcher
        .execute(
            OperationKind::SubmitMessage,
            OperationPayload::Message {
                content: content.clone(),
            },
        )
        .await;

    let data = success_json(result);
    assert_eq!(data["id"], hex::encode(Sha256::digest(&content)));
}

#[tokio::test]
async fn test_fetch_account_state_snapshot() {
    let lifecycle = Arc::new(Lifecycle::default());
    let dispatcher = full_dispatcher(StubConnector::working(lifecycle));

    let result = dispatcher
        .execute(
            OperationKind::FetchAccountState,
            OperationPayload::Address("0x123abc".to_string()),
        )
        .await;

    let data = success_json(result);
    assert_eq!(data["address"], "0x123abc");
    assert_eq!(data["balance"], 100);
}

#[tokio::test]
async fn test_validate_address_always_returns_a_verdict() {
    let lifecycle = Arc::new(Lifecycle::default());
    let dispatcher = full_dispatcher(StubConnector::working(lifecycle));

    let inputs = [
        "not-an-address",
        "",
        "0x123abc",
        "0:aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa",
        "-1:aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa",
    ];
    let expected = [false, false, false, true, true];

    for (input, expected) in inputs.iter().zip(expected) {
        let result = dispatcher
            .execute(
                OperationKind::ValidateAddress,
                OperationPayload::Address(input.to_string()),
            )
            .await;
        assert!(result.is_success(), "verdict missing for {:?}", input);
        let data = success_json(result);
        assert_eq!(data["is_valid"], expected, "wrong verdict for {:?}", input);
    }
}

// ============================================================================
// Concurrency
// ============================================================================

#[tokio::test]
async fn test_concurrent_dispatches_have_independent_lifecycles() {
    let lifecycle = Arc::new(Lifecycle::default());
    let dispatcher = Arc::new(full_dispatcher(StubConnector::working(lifecycle.clone())));

    let mut handles = Vec::new();
    for i in 0..10 {
        let dispatcher = dispatcher.clone();
        handles.push(tokio::spawn(async move {
            dispatcher
                .execute(
                    OperationKind::SubmitMessage,
                    OperationPayload::Message {
                        content: format!("message-{}", i).into_bytes(),
                    },
                )
                .await
        }));
    }

    for handle in handles {
        let result = handle.await.expect("dispatch task panicked");
        assert!(result.is_success());
    }

    assert_eq!(lifecycle.acquired.load(Ordering::SeqCst), 10);
    assert_eq!(lifecycle.released.load(Ordering::SeqCst), 10);
}

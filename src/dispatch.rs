//! Gateway dispatch: the core orchestrator.
//!
//! `GatewayDispatcher::execute` turns an inbound `(kind, payload)` pair into
//! a correctly-initialized, correctly-torn-down node client call:
//!
//! 1. resolve the operation in the registry (miss → unsupported, no client
//!    is acquired),
//! 2. acquire one node client scoped to this call,
//! 3. run the operation, catching panics at the boundary,
//! 4. release the client on every exit path, including when the caller
//!    abandons the call and drops the future mid-operation,
//! 5. classify the outcome into the stable failure taxonomy.
//!
//! The dispatcher holds no per-call state and performs no retries: at most
//! one client lifecycle and one node interaction per call.

use crate::client::{NodeClient, NodeConnector};
use crate::error::{GatewayError, Result};
use crate::request::{OperationKind, OperationPayload};
use crate::result::{FailureKind, OperationData, OperationResult};
use async_trait::async_trait;
use futures::FutureExt;
use std::collections::HashMap;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tokio::runtime::Handle;
use tracing::{debug, error, warn};

/// A unit of work that, given a live node client and a typed payload,
/// produces operation data or an error.
#[async_trait]
pub trait Operation: Send + Sync {
    async fn run(
        &self,
        client: &mut dyn NodeClient,
        payload: &OperationPayload,
    ) -> Result<OperationData>;
}

/// Read-only mapping from operation kind to implementation.
///
/// Populated once at startup and never mutated during dispatch, so
/// concurrent lookups need no synchronization. Adding a capability means
/// adding one kind and one implementation; the dispatcher is untouched.
#[derive(Default)]
pub struct OperationRegistry {
    operations: HashMap<OperationKind, Box<dyn Operation>>,
}

impl OperationRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, kind: OperationKind, operation: Box<dyn Operation>) {
        self.operations.insert(kind, operation);
    }

    pub fn get(&self, kind: OperationKind) -> Option<&dyn Operation> {
        self.operations.get(&kind).map(|op| op.as_ref())
    }

    pub fn is_registered(&self, kind: OperationKind) -> bool {
        self.operations.contains_key(&kind)
    }

    pub fn len(&self) -> usize {
        self.operations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }
}

/// Owns the acquired client for the duration of one dispatch.
///
/// The normal paths (success, operation error, caught panic) release
/// explicitly through [`ClientGuard::release`]. If the `execute` future is
/// dropped before finishing — the request handler timed out or the caller
/// disconnected — `Drop` hands the client to a background task so the
/// release still happens exactly once.
struct ClientGuard {
    client: Option<Box<dyn NodeClient>>,
}

impl ClientGuard {
    fn new(client: Box<dyn NodeClient>) -> Self {
        Self {
            client: Some(client),
        }
    }

    async fn run(
        &mut self,
        operation: &dyn Operation,
        payload: &OperationPayload,
    ) -> std::thread::Result<Result<OperationData>> {
        match self.client.as_deref_mut() {
            Some(client) => {
                AssertUnwindSafe(operation.run(client, payload))
                    .catch_unwind()
                    .await
            }
            None => Ok(Err(GatewayError::Internal(
                "node client already released".to_string(),
            ))),
        }
    }

    async fn release(&mut self) {
        if let Some(mut client) = self.client.take() {
            client.release().await;
        }
    }
}

impl Drop for ClientGuard {
    fn drop(&mut self) {
        let Some(mut client) = self.client.take() else {
            return;
        };
        // Reached only when the dispatch future was dropped mid-operation.
        match Handle::try_current() {
            Ok(handle) => {
                warn!("dispatch abandoned; releasing node client in background");
                handle.spawn(async move {
                    client.release().await;
                });
            }
            Err(_) => warn!("node client dropped outside a runtime; release skipped"),
        }
    }
}

/// The core orchestrator. Stateless across calls; safe to share behind an
/// `Arc` between concurrent request handlers.
pub struct GatewayDispatcher {
    connector: Arc<dyn NodeConnector>,
    registry: Arc<OperationRegistry>,
}

impl GatewayDispatcher {
    pub fn new(connector: Arc<dyn NodeConnector>, registry: Arc<OperationRegistry>) -> Self {
        Self {
            connector,
            registry,
        }
    }

    /// Execute one operation against a freshly acquired node client.
    ///
    /// Always returns a structured result; nothing propagates unclassified.
    pub async fn execute(
        &self,
        kind: OperationKind,
        payload: OperationPayload,
    ) -> OperationResult {
        let Some(operation) = self.registry.get(kind) else {
            debug!(operation = %kind, "operation not registered");
            return OperationResult::from_error(GatewayError::UnsupportedOperation(
                kind.to_string(),
            ));
        };

        let client = match self.connector.acquire().await {
            Ok(client) => client,
            Err(err) => {
                warn!(operation = %kind, error = %err, "node client acquisition failed");
                return OperationResult::failure(FailureKind::ClientUnavailable, err.to_string());
            }
        };

        // The guard releases whether the operation returns, errors, panics,
        // or this future is dropped before reaching the explicit release.
        let mut guard = ClientGuard::new(client);
        let outcome = guard.run(operation, &payload).await;
        guard.release().await;

        match outcome {
            Ok(Ok(data)) => {
                debug!(operation = %kind, "operation succeeded");
                OperationResult::success(data)
            }
            Ok(Err(err)) => {
                warn!(operation = %kind, error = %err, "operation failed");
                OperationResult::from_error(err)
            }
            Err(panic) => {
                let detail = panic
                    .downcast_ref::<&str>()
                    .map(|s| s.to_string())
                    .or_else(|| panic.downcast_ref::<String>().cloned())
                    .unwrap_or_else(|| "unknown panic".to_string());
                error!(operation = %kind, detail = %detail, "operation panicked");
                OperationResult::failure(FailureKind::Internal, "internal gateway error")
            }
        }
    }
}

//! Node client acquisition and release.
//!
//! A [`NodeClient`] is an exclusively-owned, single-use-per-call handle to a
//! blockchain network endpoint. The dispatcher acquires one per call through
//! a [`NodeConnector`] and guarantees exactly one release on every exit path;
//! no two concurrent dispatches ever share a client instance.

use crate::error::{GatewayError, Result};
use crate::types::{AccountState, LedgerFilter, LedgerSlice, MessageReceipt, SubscriptionHandle};
use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};

/// Network endpoint set consumed by client acquisition.
#[derive(Debug, Clone)]
pub struct NodeEndpoints {
    pub base_urls: Vec<String>,
    /// Opaque credential material, forwarded as a bearer token when present.
    pub access_key: Option<String>,
}

impl NodeEndpoints {
    pub fn new(base_urls: Vec<String>, access_key: Option<String>) -> Self {
        Self {
            base_urls,
            access_key,
        }
    }

    pub fn devnet() -> Self {
        Self::new(
            vec!["https://gql-devnet.venom.network/graphql".to_string()],
            None,
        )
    }

    pub fn testnet() -> Self {
        Self::new(
            vec!["https://gql-testnet.venom.network/graphql".to_string()],
            None,
        )
    }

    pub fn mainnet() -> Self {
        Self::new(vec!["https://gql.venom.network/graphql".to_string()], None)
    }

    /// Resolve a named network to its endpoint preset.
    pub fn for_network(network: &str) -> Result<Self> {
        match network {
            "dev" | "devnet" => Ok(Self::devnet()),
            "test" | "testnet" => Ok(Self::testnet()),
            "main" | "mainnet" => Ok(Self::mainnet()),
            other => Err(GatewayError::ConfigError(format!(
                "Unknown network '{}', expected dev, test or main",
                other
            ))),
        }
    }
}

/// A live connection handle to a blockchain node.
///
/// Methods take `&mut self`: the handle is owned by a single dispatch call
/// for its whole lifetime. `release` must be called exactly once per
/// successful acquisition and must not fault when it is.
#[async_trait]
pub trait NodeClient: Send {
    /// Submit raw message bytes, returning the node's acceptance receipt.
    async fn send_message(&mut self, payload: &[u8]) -> Result<MessageReceipt>;

    /// Fetch the current state snapshot of an account.
    async fn account_state(&mut self, address: &str) -> Result<AccountState>;

    /// Fetch a slice of ledger data, optionally narrowed by `filter`.
    async fn ledger_slice(&mut self, filter: &LedgerFilter) -> Result<LedgerSlice>;

    /// Register an event subscription and return its acknowledgment.
    async fn subscribe(&mut self, topic: &str) -> Result<SubscriptionHandle>;

    /// Tear the handle down. Idempotent once per acquisition.
    async fn release(&mut self);
}

/// Acquires node clients. Acquisition may block on network/setup latency;
/// that blocking is confined to the call that owns the resulting client.
#[async_trait]
pub trait NodeConnector: Send + Sync {
    async fn acquire(&self) -> Result<Box<dyn NodeClient>>;
}

// ============================================================================
// HTTP-backed implementation
// ============================================================================

const CLIENT_TIMEOUT: Duration = Duration::from_secs(30);

/// Connector producing [`HttpNodeClient`] handles against the configured
/// endpoint set.
pub struct HttpNodeConnector {
    endpoints: NodeEndpoints,
}

impl HttpNodeConnector {
    pub fn new(endpoints: NodeEndpoints) -> Self {
        Self { endpoints }
    }
}

#[async_trait]
impl NodeConnector for HttpNodeConnector {
    async fn acquire(&self) -> Result<Box<dyn NodeClient>> {
        let base_url = self
            .endpoints
            .base_urls
            .first()
            .cloned()
            .ok_or_else(|| {
                GatewayError::ClientUnavailable("No node endpoints configured".to_string())
            })?;

        let http = reqwest::Client::builder()
            .timeout(CLIENT_TIMEOUT)
            .build()
            .map_err(|e| {
                GatewayError::ClientUnavailable(format!("Failed to initialize client: {}", e))
            })?;

        debug!(endpoint = %base_url, "node client acquired");
        Ok(Box::new(HttpNodeClient {
            http,
            base_url,
            access_key: self.endpoints.access_key.clone(),
            released: false,
        }))
    }
}

/// A node client speaking the node's HTTP API.
pub struct HttpNodeClient {
    http: reqwest::Client,
    base_url: String,
    access_key: Option<String>,
    released: bool,
}

#[derive(Deserialize)]
struct SendMessageReply {
    id: String,
}

#[derive(Deserialize)]
struct SubscribeReply {
    id: String,
}

impl HttpNodeClient {
    fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        let mut builder = self
            .http
            .request(method, format!("{}/{}", self.base_url, path));
        if let Some(key) = &self.access_key {
            builder = builder.bearer_auth(key);
        }
        builder
    }

    /// Surface non-2xx replies as node rejections with the node's complaint.
    async fn check_status(response: reqwest::Response) -> Result<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(GatewayError::NodeRejected(format!(
            "node returned {}: {}",
            status, body
        )))
    }
}

#[async_trait]
impl NodeClient for HttpNodeClient {
    async fn send_message(&mut self, payload: &[u8]) -> Result<MessageReceipt> {
        let response = self
            .request(reqwest::Method::POST, "messages")
            .json(&serde_json::json!({ "boc": BASE64.encode(payload) }))
            .send()
            .await
            .map_err(|e| GatewayError::TransportError(e.to_string()))?;
        let response = Self::check_status(response).await?;
        let reply: SendMessageReply = response
            .json()
            .await
            .map_err(|e| GatewayError::TransportError(format!("Malformed node reply: {}", e)))?;
        Ok(MessageReceipt { id: reply.id })
    }

    async fn account_state(&mut self, address: &str) -> Result<AccountState> {
        let response = self
            .request(reqwest::Method::GET, &format!("accounts/{}", address))
            .send()
            .await
            .map_err(|e| GatewayError::TransportError(e.to_string()))?;
        let response = Self::check_status(response).await?;
        response
            .json()
            .await
            .map_err(|e| GatewayError::TransportError(format!("Malformed node reply: {}", e)))
    }

    async fn ledger_slice(&mut self, filter: &LedgerFilter) -> Result<LedgerSlice> {
        let mut builder = self.request(reqwest::Method::GET, "blockchain");
        if let Some(message_id) = &filter.message_id {
            builder = builder.query(&[("message_id", message_id.as_str())]);
        }
        if let Some(limit) = filter.limit {
            builder = builder.query(&[("limit", limit)]);
        }
        let response = builder
            .send()
            .await
            .map_err(|e| GatewayError::TransportError(e.to_string()))?;
        let response = Self::check_status(response).await?;
        response
            .json()
            .await
            .map_err(|e| GatewayError::TransportError(format!("Malformed node reply: {}", e)))
    }

    async fn subscribe(&mut self, topic: &str) -> Result<SubscriptionHandle> {
        let response = self
            .request(reqwest::Method::POST, "subscriptions")
            .json(&serde_json::json!({ "topic": topic }))
            .send()
            .await
            .map_err(|e| GatewayError::TransportError(e.to_string()))?;
        let response = Self::check_status(response).await?;
        let reply: SubscribeReply = response
            .json()
            .await
            .map_err(|e| GatewayError::TransportError(format!("Malformed node reply: {}", e)))?;
        Ok(SubscriptionHandle {
            id: reply.id,
            topic: topic.to_string(),
        })
    }

    async fn release(&mut self) {
        if self.released {
            warn!(endpoint = %self.base_url, "node client released twice");
            return;
        }
        self.released = true;
        debug!(endpoint = %self.base_url, "node client released");
    }
}

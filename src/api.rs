//! REST transport adapter for the TVM gateway
//!
//! Decodes inbound requests into (operation kind, payload) pairs, hands them
//! to the dispatcher, and maps the result envelope onto HTTP status codes.
//! Routing, field layout and status mapping live here and nowhere else.

use axum::{
    extract::{Path, Query, Request, State},
    http::{self, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::RwLock;
use tower_http::cors::{AllowOrigin, CorsLayer};

use crate::dispatch::GatewayDispatcher;
use crate::request::{OperationKind, OperationPayload};
use crate::result::{FailureKind, OperationData, OperationResult};
use crate::types::LedgerFilter;

/// Gateway state shared by every request handler
#[derive(Clone)]
pub struct GatewayNode {
    pub dispatcher: Arc<GatewayDispatcher>,
    api_stats: Arc<RwLock<ApiStats>>,
}

impl GatewayNode {
    pub fn new(dispatcher: Arc<GatewayDispatcher>) -> Self {
        Self {
            dispatcher,
            api_stats: Arc::new(RwLock::new(ApiStats::new())),
        }
    }

    /// Get API statistics
    pub async fn get_stats(&self) -> ApiStatsResponse {
        let stats = self.api_stats.read().await;
        let uptime = stats.start_time.map(|t| t.elapsed().as_secs()).unwrap_or(0);

        ApiStatsResponse {
            total_requests: stats.total_requests,
            successful_requests: stats.successful_requests,
            failed_requests: stats.failed_requests,
            messages_submitted: stats.messages_submitted,
            uptime_seconds: uptime,
        }
    }
}

/// API statistics and monitoring
#[derive(Debug, Default)]
struct ApiStats {
    total_requests: u64,
    successful_requests: u64,
    failed_requests: u64,
    messages_submitted: u64,
    start_time: Option<Instant>,
}

impl ApiStats {
    fn new() -> Self {
        ApiStats {
            start_time: Some(Instant::now()),
            ..Default::default()
        }
    }

    fn record_request(&mut self, success: bool) {
        self.total_requests += 1;
        if success {
            self.successful_requests += 1;
        } else {
            self.failed_requests += 1;
        }
    }
}

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Deserialize)]
pub struct MessageRequest {
    pub content: String,
}

#[derive(Deserialize)]
pub struct SubscribeRequest {
    pub topic: String,
}

#[derive(Deserialize)]
pub struct SignRequest {
    pub data: String,
    #[serde(default = "default_key")]
    pub key: String,
}

#[derive(Deserialize)]
pub struct HashRequest {
    pub data: String,
    #[serde(default = "default_algorithm")]
    pub algorithm: String,
}

#[derive(Deserialize)]
pub struct EncryptRequest {
    pub data: String,
    #[serde(default = "default_key")]
    pub key: String,
}

#[derive(Deserialize)]
pub struct ValidateRequest {
    pub address: String,
}

#[derive(Deserialize)]
pub struct BocRequest {
    pub boc: String,
}

fn default_key() -> String {
    "default".to_string()
}

fn default_algorithm() -> String {
    "sha256".to_string()
}

#[derive(Serialize)]
pub struct ApiStatsResponse {
    pub total_requests: u64,
    pub successful_requests: u64,
    pub failed_requests: u64,
    pub messages_submitted: u64,
    pub uptime_seconds: u64,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: FailureKind,
    message: String,
}

// ============================================================================
// Result → HTTP mapping
// ============================================================================

fn failure_status(kind: FailureKind) -> StatusCode {
    match kind {
        FailureKind::UnsupportedOperation => StatusCode::NOT_FOUND,
        FailureKind::ClientUnavailable => StatusCode::SERVICE_UNAVAILABLE,
        FailureKind::OperationError => StatusCode::UNPROCESSABLE_ENTITY,
        FailureKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Shape an operation result: success data with the given status, failures
/// mapped uniformly regardless of which capability was invoked.
fn respond(result: OperationResult, success_status: StatusCode) -> Response {
    match result {
        OperationResult::Success { data } => (success_status, Json(data)).into_response(),
        OperationResult::Failure { kind, message } => (
            failure_status(kind),
            Json(ErrorResponse {
                error: kind,
                message,
            }),
        )
            .into_response(),
    }
}

// ============================================================================
// Middleware
// ============================================================================

/// Request logging and statistics middleware
async fn stats_middleware(
    State(node): State<Arc<GatewayNode>>,
    req: Request,
    next: Next,
) -> Response {
    let response = next.run(req).await;

    let success = response.status().is_success();
    let mut stats = node.api_stats.write().await;
    stats.record_request(success);

    response
}

/// Detailed request logging middleware. Logs method, path, status and
/// duration.
async fn logging_middleware(req: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = req.method().clone();
    let path = req.uri().path().to_string();

    let response = next.run(req).await;

    let duration = start.elapsed();
    let status = response.status();

    tracing::info!(
        method = %method,
        path = %path,
        status = %status.as_u16(),
        duration_ms = %duration.as_millis(),
        "api.request"
    );

    response
}

// ============================================================================
// API Server
// ============================================================================

/// Build the API router with all endpoints (also used by tests)
pub fn build_api_router(node: Arc<GatewayNode>) -> Router {
    // CORS configuration - allow all origins with credentials
    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::mirror_request())
        .allow_methods(vec![
            http::Method::GET,
            http::Method::POST,
            http::Method::OPTIONS,
        ])
        .allow_headers(vec![http::header::CONTENT_TYPE])
        .allow_credentials(true);

    Router::new()
        // Message endpoints
        .route("/messages", post(create_message))
        .route("/messages/:id", get(get_message))
        // Account endpoints
        .route("/accounts/:address", get(get_account_state))
        // Ledger endpoints
        .route("/blockchain", get(query_blockchain_data))
        // Event endpoints
        .route("/subscribe", post(subscribe_to_events))
        // Crypto endpoints
        .route("/sign", post(sign_data))
        .route("/hash", post(calculate_hash))
        .route("/encrypt", post(encrypt_data))
        .route("/validate", post(validate_address))
        // Native object endpoints
        .route("/bocs", post(decode_native_object))
        // System endpoints
        .route("/health", get(health_check))
        .route("/stats", get(get_api_stats))
        // logging before stats so we always record timing
        .layer(middleware::from_fn(logging_middleware))
        .layer(middleware::from_fn_with_state(
            node.clone(),
            stats_middleware,
        ))
        .with_state(node)
        .layer(cors)
}

/// Run the API server
pub async fn run_api_server(
    node: Arc<GatewayNode>,
    port: u16,
) -> Result<(), Box<dyn std::error::Error>> {
    let app = build_api_router(node);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr).await?;

    tracing::info!(addr = %addr, "gateway API server listening");

    axum::serve(listener, app).await?;

    Ok(())
}

// ============================================================================
// Route Handlers
// ============================================================================

async fn create_message(
    State(node): State<Arc<GatewayNode>>,
    Json(req): Json<MessageRequest>,
) -> Response {
    let result = node
        .dispatcher
        .execute(
            OperationKind::SubmitMessage,
            OperationPayload::Message {
                content: req.content.into_bytes(),
            },
        )
        .await;

    if result.is_success() {
        let mut stats = node.api_stats.write().await;
        stats.messages_submitted += 1;
    }

    respond(result, StatusCode::CREATED)
}

async fn get_message(State(node): State<Arc<GatewayNode>>, Path(id): Path<String>) -> Response {
    let filter = LedgerFilter {
        message_id: Some(id.clone()),
        limit: Some(1),
    };
    let result = node
        .dispatcher
        .execute(
            OperationKind::QueryLedgerData,
            OperationPayload::Ledger(filter),
        )
        .await;

    match result {
        // The slice is narrowed to one message id; surface just that message.
        OperationResult::Success {
            data: OperationData::Ledger(slice),
        } => match slice.messages.into_iter().next() {
            Some(message) => (StatusCode::OK, Json(message)).into_response(),
            None => (
                StatusCode::NOT_FOUND,
                Json(ErrorResponse {
                    error: FailureKind::OperationError,
                    message: format!("Message {} not found", id),
                }),
            )
                .into_response(),
        },
        OperationResult::Success { data } => {
            tracing::error!(?data, "ledger query returned an unexpected data shape");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: FailureKind::Internal,
                    message: "internal gateway error".to_string(),
                }),
            )
                .into_response()
        }
        failure => respond(failure, StatusCode::OK),
    }
}

async fn get_account_state(
    State(node): State<Arc<GatewayNode>>,
    Path(address): Path<String>,
) -> Response {
    let result = node
        .dispatcher
        .execute(
            OperationKind::FetchAccountState,
            OperationPayload::Address(address),
        )
        .await;
    respond(result, StatusCode::OK)
}

async fn query_blockchain_data(
    State(node): State<Arc<GatewayNode>>,
    Query(filter): Query<LedgerFilter>,
) -> Response {
    let result = node
        .dispatcher
        .execute(
            OperationKind::QueryLedgerData,
            OperationPayload::Ledger(filter),
        )
        .await;
    respond(result, StatusCode::OK)
}

async fn subscribe_to_events(
    State(node): State<Arc<GatewayNode>>,
    Json(req): Json<SubscribeRequest>,
) -> Response {
    let result = node
        .dispatcher
        .execute(
            OperationKind::Subscribe,
            OperationPayload::Subscription { topic: req.topic },
        )
        .await;
    respond(result, StatusCode::OK)
}

async fn sign_data(State(node): State<Arc<GatewayNode>>, Json(req): Json<SignRequest>) -> Response {
    let result = node
        .dispatcher
        .execute(
            OperationKind::Sign,
            OperationPayload::Sign {
                data: req.data.into_bytes(),
                key: req.key,
            },
        )
        .await;
    respond(result, StatusCode::OK)
}

async fn calculate_hash(
    State(node): State<Arc<GatewayNode>>,
    Json(req): Json<HashRequest>,
) -> Response {
    let result = node
        .dispatcher
        .execute(
            OperationKind::Hash,
            OperationPayload::Hash {
                data: req.data.into_bytes(),
                algorithm: req.algorithm,
            },
        )
        .await;
    respond(result, StatusCode::OK)
}

async fn encrypt_data(
    State(node): State<Arc<GatewayNode>>,
    Json(req): Json<EncryptRequest>,
) -> Response {
    let result = node
        .dispatcher
        .execute(
            OperationKind::Encrypt,
            OperationPayload::Encrypt {
                data: req.data.into_bytes(),
                key: req.key,
            },
        )
        .await;
    respond(result, StatusCode::OK)
}

async fn validate_address(
    State(node): State<Arc<GatewayNode>>,
    Json(req): Json<ValidateRequest>,
) -> Response {
    let result = node
        .dispatcher
        .execute(
            OperationKind::ValidateAddress,
            OperationPayload::Address(req.address),
        )
        .await;
    respond(result, StatusCode::OK)
}

async fn decode_native_object(
    State(node): State<Arc<GatewayNode>>,
    Json(req): Json<BocRequest>,
) -> Response {
    let result = node
        .dispatcher
        .execute(
            OperationKind::DecodeNativeObject,
            OperationPayload::NativeObject { blob: req.boc },
        )
        .await;
    respond(result, StatusCode::OK)
}

async fn health_check() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(serde_json::json!({
            "status": "healthy",
            "timestamp": chrono::Utc::now().to_rfc3339()
        })),
    )
}

async fn get_api_stats(State(node): State<Arc<GatewayNode>>) -> impl IntoResponse {
    let stats = node.get_stats().await;
    Json(stats)
}

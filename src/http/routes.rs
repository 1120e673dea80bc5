//! HTTP route table, handlers, and request/response bodies.
//!
//! Each route binds one engine operation. The handlers validate field
//! shape, delegate to the engine, and translate the result to JSON; no
//! decision logic lives here.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};

use crate::admission::{AdmissionEngine, Decision, WindowConfig};
use crate::error::FloodgateError;

/// Body of a check request.
#[derive(Debug, Deserialize)]
pub struct CheckRequest {
    /// The rate-limited principal
    pub client_id: String,
    /// Accepted for API compatibility; has no effect on the decision
    pub resource: String,
}

/// Body of a check response.
#[derive(Debug, Serialize, Deserialize)]
pub struct CheckResponse {
    pub allowed: bool,
    pub remaining: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retry_after: Option<u64>,
}

impl From<Decision> for CheckResponse {
    fn from(decision: Decision) -> Self {
        Self {
            allowed: decision.allowed,
            remaining: decision.remaining,
            retry_after: decision.retry_after,
        }
    }
}

/// Body of a configure request.
#[derive(Debug, Deserialize)]
pub struct ConfigRequest {
    pub window_seconds: i64,
    pub limit: i64,
}

/// A window configuration as reported to callers.
#[derive(Debug, Serialize, Deserialize)]
pub struct ConfigResponse {
    pub window_seconds: u64,
    pub limit: u32,
}

impl From<WindowConfig> for ConfigResponse {
    fn from(config: WindowConfig) -> Self {
        Self {
            window_seconds: config.window_seconds(),
            limit: config.limit,
        }
    }
}

/// Acknowledgement body for operations with no other output.
#[derive(Debug, Serialize, Deserialize)]
pub struct AckResponse {
    pub status: String,
}

impl AckResponse {
    fn ok() -> Self {
        Self {
            status: "ok".to_string(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct ErrorResponse {
    error: String,
}

/// An error translated to an HTTP status and JSON body.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }
}

impl From<FloodgateError> for ApiError {
    fn from(err: FloodgateError) -> Self {
        let status = match err {
            FloodgateError::InvalidConfig(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self {
            status,
            message: err.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(ErrorResponse {
                error: self.message,
            }),
        )
            .into_response()
    }
}

/// Build the route table over the given engine.
pub fn router(engine: Arc<AdmissionEngine>) -> Router {
    Router::new()
        .route("/check", post(check))
        .route("/config/global", get(get_global).put(set_global))
        .route(
            "/config/clients/{client_id}",
            get(get_effective).put(set_client).delete(reset_client),
        )
        .route("/reset", post(reset_all))
        .with_state(engine)
}

fn require_non_empty(value: &str, field: &str) -> Result<(), ApiError> {
    if value.is_empty() {
        return Err(ApiError::bad_request(format!(
            "{} must be non-empty",
            field
        )));
    }
    Ok(())
}

async fn check(
    State(engine): State<Arc<AdmissionEngine>>,
    Json(req): Json<CheckRequest>,
) -> Result<Json<CheckResponse>, ApiError> {
    require_non_empty(&req.client_id, "client_id")?;
    require_non_empty(&req.resource, "resource")?;

    let decision = engine.check(&req.client_id);
    Ok(Json(decision.into()))
}

async fn get_global(
    State(engine): State<Arc<AdmissionEngine>>,
) -> Json<ConfigResponse> {
    Json(engine.global_config().into())
}

async fn set_global(
    State(engine): State<Arc<AdmissionEngine>>,
    Json(req): Json<ConfigRequest>,
) -> Result<Json<ConfigResponse>, ApiError> {
    let config = WindowConfig::from_seconds(req.window_seconds, req.limit)?;
    Ok(Json(engine.configure_global(config).into()))
}

async fn get_effective(
    State(engine): State<Arc<AdmissionEngine>>,
    Path(client_id): Path<String>,
) -> Result<Json<ConfigResponse>, ApiError> {
    require_non_empty(&client_id, "client_id")?;
    Ok(Json(engine.effective_config(&client_id).into()))
}

async fn set_client(
    State(engine): State<Arc<AdmissionEngine>>,
    Path(client_id): Path<String>,
    Json(req): Json<ConfigRequest>,
) -> Result<Json<ConfigResponse>, ApiError> {
    require_non_empty(&client_id, "client_id")?;
    let config = WindowConfig::from_seconds(req.window_seconds, req.limit)?;
    Ok(Json(engine.configure_client(&client_id, config).into()))
}

async fn reset_client(
    State(engine): State<Arc<AdmissionEngine>>,
    Path(client_id): Path<String>,
) -> Result<Json<AckResponse>, ApiError> {
    require_non_empty(&client_id, "client_id")?;
    engine.reset_client_config(&client_id);
    Ok(Json(AckResponse::ok()))
}

async fn reset_all(
    State(engine): State<Arc<AdmissionEngine>>,
) -> Json<AckResponse> {
    engine.reset_all();
    Json(AckResponse::ok())
}

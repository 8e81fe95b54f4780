use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use companion_relay::{ChatRelay, RelayError};
use companion_types::{ChatReply, ChatRequest, ErrorBody, Health};

/// Application state shared across routes
#[derive(Clone)]
pub struct AppState {
    pub relay: Arc<ChatRelay>,
    /// Fired on shutdown; aborts every in-flight relay call
    pub shutdown: CancellationToken,
}

impl AppState {
    pub fn new(relay: ChatRelay) -> Self {
        Self {
            relay: Arc::new(relay),
            shutdown: CancellationToken::new(),
        }
    }
}

/// Create router with all API routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(health))
        .route("/api/chat", post(chat))
        .with_state(state)
}

/// GET /api/health - Liveness probe
async fn health() -> Json<Health> {
    Json(Health { ok: true })
}

/// POST /api/chat - Relay one message to the provider
async fn chat(
    State(state): State<AppState>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatReply>, AppError> {
    // A missing credential is reported even for malformed bodies
    state.relay.ensure_configured()?;

    let Json(request) = payload.map_err(|rejection| RelayError::Validation {
        details: Some(rejection.body_text()),
    })?;

    let text = state.relay.chat(request, &state.shutdown).await?;
    Ok(Json(ChatReply { text }))
}

/// Error handling
#[derive(Debug)]
pub struct AppError(RelayError);

impl From<RelayError> for AppError {
    fn from(err: RelayError) -> Self {
        AppError(err)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let err = self.0;
        let status =
            StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        match &err {
            RelayError::Validation { .. } => tracing::debug!(%err, "rejected chat request"),
            RelayError::Configuration => tracing::error!("chat request without GEMINI_API_KEY"),
            RelayError::Upstream { status, .. } => tracing::warn!(status, "provider error passed through"),
            RelayError::Cancelled => tracing::info!("chat request aborted"),
            _ => tracing::error!(error = %err, "chat request failed"),
        }

        let body = Json(ErrorBody {
            error: err.public_message().to_string(),
            details: err.details(),
        });

        (status, body).into_response()
    }
}

//! API routes

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use serde::Serialize;

use crate::core::{ChatError, ChatRequest, ChatResponse};
use crate::AppState;

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
    documents: usize,
    users: usize,
}

/// Error replies share the success shape so the widget can always render `reply`.
/// This includes bodies axum fails to extract.
#[derive(Debug)]
enum ApiError {
    NotReady,
    EmptyMessage,
    BadRequest,
    Internal,
}

impl ApiError {
    fn status_and_reply(&self) -> (StatusCode, &'static str) {
        match self {
            ApiError::NotReady => (StatusCode::SERVICE_UNAVAILABLE, "Assistant is starting up."),
            ApiError::EmptyMessage => (StatusCode::BAD_REQUEST, "Please type a message."),
            ApiError::BadRequest => (StatusCode::BAD_REQUEST, "Invalid request."),
            ApiError::Internal => (StatusCode::INTERNAL_SERVER_ERROR, "Server error."),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, reply) = self.status_and_reply();
        (
            status,
            Json(ChatResponse {
                reply: reply.to_string(),
            }),
        )
            .into_response()
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        tracing::debug!(error = %rejection.body_text(), "rejected chat body");
        ApiError::BadRequest
    }
}

impl From<ChatError> for ApiError {
    fn from(err: ChatError) -> Self {
        match err {
            ChatError::EmptyMessage => ApiError::EmptyMessage,
            other => {
                tracing::error!(error = %other, "chat request failed");
                ApiError::Internal
            }
        }
    }
}

async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let (status, documents, users) = match state.chat_engine.get() {
        Some(engine) => ("ok", engine.index().len(), engine.memory().user_count().await),
        None => ("starting", 0, 0),
    };

    Json(HealthResponse {
        status,
        version: env!("CARGO_PKG_VERSION"),
        documents,
        users,
    })
}

async fn chat(
    State(state): State<AppState>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatResponse>, ApiError> {
    let engine = state.chat_engine.get().ok_or(ApiError::NotReady)?;
    let Json(request) = payload?;

    tracing::debug!(user_id = request.user_id(), "chat request");

    let response = engine.chat(request).await?;
    Ok(Json(response))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/chat", post(chat))
}

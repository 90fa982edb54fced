//! REST endpoints for the quiz chat and recommendations.

use std::sync::Arc;

use axum::extract::State;
use axum::http::{HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tracing::{error, warn};

use crate::error::{Error, RecommendError};
use crate::service::QuizService;

/// Shared state for the API routes.
#[derive(Clone)]
pub struct ApiState {
    pub service: Arc<QuizService>,
}

#[derive(Debug, Deserialize)]
struct ChatRequest {
    message: String,
}

/// Error response with a `{"detail": ...}` body.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    detail: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(serde_json::json!({ "detail": self.detail })),
        )
            .into_response()
    }
}

impl From<RecommendError> for ApiError {
    fn from(e: RecommendError) -> Self {
        let status = match &e {
            RecommendError::NoActiveSession => StatusCode::BAD_REQUEST,
            RecommendError::UpstreamFailure(_) => StatusCode::BAD_GATEWAY,
            RecommendError::MissingCredential
            | RecommendError::Quiz(_)
            | RecommendError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status.is_server_error() {
            error!(status = %status, error = %e, "Recommendation request failed");
        }
        Self {
            status,
            detail: e.to_string(),
        }
    }
}

impl From<Error> for ApiError {
    fn from(e: Error) -> Self {
        match e {
            Error::Recommend(inner) => inner.into(),
            other => {
                error!(error = %other, "Request failed");
                Self {
                    status: StatusCode::INTERNAL_SERVER_ERROR,
                    detail: other.to_string(),
                }
            }
        }
    }
}

/// Build the API router.
pub fn api_routes(state: ApiState, cors_origins: &[String]) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/", get(root))
        .route("/api/chat", post(chat))
        .route("/api/recommend", get(recommend))
        .route("/api/session", get(session))
        .layer(cors_layer(cors_origins))
        .with_state(state)
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    if origins.iter().any(|o| o == "*") {
        return layer.allow_origin(Any);
    }

    let parsed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|o| match HeaderValue::from_str(o) {
            Ok(v) => Some(v),
            Err(_) => {
                warn!(origin = %o, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();
    layer.allow_origin(AllowOrigin::list(parsed))
}

// ── Handlers ────────────────────────────────────────────────────────────

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "service": "movie-dna"
    }))
}

async fn root() -> impl IntoResponse {
    Json(serde_json::json!({ "message": "MovieDNA API" }))
}

/// POST /api/chat
///
/// Feeds one message to the quiz and returns `{reply, done}`.
async fn chat(
    State(state): State<ApiState>,
    Json(req): Json<ChatRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let reply = state.service.submit_message(&req.message).await?;
    Ok(Json(reply))
}

/// GET /api/recommend
async fn recommend(State(state): State<ApiState>) -> Result<impl IntoResponse, ApiError> {
    let resp = state.service.recommendations().await?;
    Ok(Json(resp))
}

/// GET /api/session
async fn session(State(state): State<ApiState>) -> Result<impl IntoResponse, ApiError> {
    let status = state.service.status().await?;
    Ok(Json(status))
}

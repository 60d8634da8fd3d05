use crate::error::ApiError;
use crate::state::AppState;
use axum::{
    extract::{rejection::JsonRejection, State},
    routing::{get, post},
    Json, Router,
};
use magic_core::{AnalyzeRequest, CompatibilityReport, CompatibilityRequest};
use serde_json::{json, Value};

pub const LIVENESS_TEXT: &str = "Magic Serv JSON-safe API up";

pub fn health_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
}

pub fn magic_routes() -> Router<AppState> {
    Router::new()
        .route("/analyze", post(analyze))
        .route("/compatibility", post(compatibility))
}

async fn root() -> &'static str {
    LIVENESS_TEXT
}

async fn health(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "provider": state.gateway.provider_name(),
        "sessions": state.gateway.session_count(),
        "uptimeSecs": state.start_time.elapsed().as_secs(),
    }))
}

async fn analyze(
    State(state): State<AppState>,
    payload: Result<Json<AnalyzeRequest>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let Json(req) = payload?;
    Ok(Json(state.gateway.analyze(&req).await?))
}

async fn compatibility(
    State(state): State<AppState>,
    payload: Result<Json<CompatibilityRequest>, JsonRejection>,
) -> Result<Json<CompatibilityReport>, ApiError> {
    let Json(req) = payload?;
    Ok(Json(state.gateway.compatibility(&req).await?))
}

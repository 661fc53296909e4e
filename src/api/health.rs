use std::sync::Arc;

use axum::{Json, Router, extract::State, response::IntoResponse, routing::get};
use reqwest::StatusCode;
use serde_json::json;
use tracing::error;

use crate::models::{app_state::AppState, error::ServerError};

pub fn health_routes(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(health))
        .route("/detailed", get(health_detailed))
        .with_state(state)
}

async fn health() -> impl IntoResponse {
    "OK".into_response()
}

async fn health_detailed(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ServerError> {
    let portal_status = match state.get_portal_client() {
        Some(client) => match client.health_check().await {
            Ok(_) => Some(true),
            Err(e) => {
                error!("Failed portal health check: {}", e);
                Some(false)
            }
        },
        None => None,
    };

    let json = json!({
        "quiz": true,
        "portal": portal_status,
        "active_sessions": state.get_sessions().len(),
    });

    Ok((StatusCode::OK, Json(json)))
}

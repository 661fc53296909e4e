use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, State},
    response::IntoResponse,
    routing::{get, post},
};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use crate::{
    api::validation::ValidatedJson,
    models::{app_state::AppState, error::ServerError, player::PlayerId, quiz_game::GameSnapshot},
    service::quiz_runner::QuizRunner,
};

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct CreateSessionRequest {
    #[validate(range(min = 1, message = "Player id must be positive"))]
    pub player_id: PlayerId,
}

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct AnswerRequest {
    #[validate(length(min = 1, message = "An option must be selected"))]
    pub option: String,
}

#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub session_id: Uuid,
    pub state: GameSnapshot,
}

pub fn quiz_routes(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/sessions", post(create_session))
        .route("/sessions/{session_id}", get(get_session).delete(close_session))
        .route("/sessions/{session_id}/begin", post(begin_round))
        .route("/sessions/{session_id}/answer", post(submit_answer))
        .with_state(state)
}

fn find_session(state: &AppState, session_id: Uuid) -> Result<Arc<QuizRunner>, ServerError> {
    state
        .get_sessions()
        .get(&session_id)
        .ok_or_else(|| ServerError::NotFound(format!("Quiz session {} does not exist", session_id)))
}

async fn create_session(
    State(state): State<Arc<AppState>>,
    ValidatedJson(request): ValidatedJson<CreateSessionRequest>,
) -> Result<impl IntoResponse, ServerError> {
    let runner = state.new_runner(request.player_id);
    let (session_id, runner) = state.get_sessions().insert(runner);
    let snapshot = runner.load().await?;

    info!(
        "Created quiz session {} for player {}",
        session_id, request.player_id
    );

    let response = SessionResponse {
        session_id,
        state: snapshot,
    };
    Ok((StatusCode::CREATED, Json(response)))
}

async fn get_session(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<Uuid>,
) -> Result<impl IntoResponse, ServerError> {
    let runner = find_session(&state, session_id)?;
    let response = SessionResponse {
        session_id,
        state: runner.snapshot().await,
    };

    Ok((StatusCode::OK, Json(response)))
}

async fn begin_round(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<Uuid>,
) -> Result<impl IntoResponse, ServerError> {
    let runner = find_session(&state, session_id)?;
    let response = SessionResponse {
        session_id,
        state: runner.begin().await?,
    };

    Ok((StatusCode::OK, Json(response)))
}

async fn submit_answer(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<Uuid>,
    ValidatedJson(request): ValidatedJson<AnswerRequest>,
) -> Result<impl IntoResponse, ServerError> {
    let runner = find_session(&state, session_id)?;
    let response = SessionResponse {
        session_id,
        state: runner.answer(request.option).await?,
    };

    Ok((StatusCode::OK, Json(response)))
}

async fn close_session(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<Uuid>,
) -> Result<impl IntoResponse, ServerError> {
    if !state.get_sessions().remove(&session_id).await {
        return Err(ServerError::NotFound(format!(
            "Quiz session {} does not exist",
            session_id
        )));
    }

    info!("Closed quiz session {}", session_id);
    Ok(StatusCode::NO_CONTENT)
}

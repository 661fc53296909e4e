use axum::{http::StatusCode, response::IntoResponse};
use thiserror::Error;
use tracing::{error, warn};

use crate::{api::portal_client::PortalError, models::quiz_game::GameError};

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Api error: {1}")]
    Api(StatusCode, String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Game error: {0}")]
    Game(#[from] GameError),

    #[error("Portal error: {0}")]
    Portal(#[from] PortalError),
}

impl IntoResponse for ServerError {
    fn into_response(self) -> axum::response::Response {
        match self {
            ServerError::Api(sc, msg) => {
                warn!("Api error: {} - {}", sc, msg);
                (sc, msg)
            }
            ServerError::NotFound(e) => {
                warn!("Entity not found: {}", e);
                (StatusCode::NOT_FOUND, e)
            }
            ServerError::Game(e) => {
                warn!("Rejected quiz action: {}", e);
                (StatusCode::CONFLICT, e.to_string())
            }
            ServerError::Portal(e) => {
                error!("Portal error: {}", e);
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    String::from("Upstream service unavailable"),
                )
            }
        }
        .into_response()
    }
}

use std::sync::Arc;

use axum::Router;
use dotenvy::dotenv;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::{
    api::{health::health_routes, quiz::quiz_routes},
    config::app_config::CONFIG,
    models::app_state::AppState,
};

mod api;
mod config;
mod models;
mod service;
mod tests;

pub fn app_router(state: Arc<AppState>) -> Router {
    Router::new()
        .nest("/health", health_routes(state.clone()))
        .nest("/quiz", quiz_routes(state))
}

#[tokio::main]
async fn main() {
    // Initialize .env
    dotenv().ok();

    // Initialize logging
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env())
        .init();

    // Initialize state
    let state = match AppState::from_config(&CONFIG) {
        Ok(state) => state,
        Err(e) => {
            error!("Failed to initialize state: {}", e);
            return;
        }
    };

    let app = app_router(state);

    // Initialize webserver
    let address = format!("{}:{}", CONFIG.server.address, CONFIG.server.port);
    let listener = match tokio::net::TcpListener::bind(&address).await {
        Ok(listener) => listener,
        Err(e) => {
            error!("Failed to bind {}: {}", address, e);
            return;
        }
    };

    info!("Quiz server listening on address: {}", address);
    if let Err(e) = axum::serve(listener, app).await {
        error!("Server stopped: {}", e);
    }
}

pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::relay::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let body_limit = state.config.max_body_bytes;

    Router::new()
        .route("/health", get(health::health_handler))
        .route("/relay/callback", post(handlers::handle_callback))
        .route("/relay/talent", post(handlers::handle_talent))
        // Paths the website's forms have always posted to.
        .route("/api/contact", post(handlers::handle_callback))
        .route("/api/talent", post(handlers::handle_talent))
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}

use crate::handlers;
use crate::state::AppState;
use axum::{routing::{get, post}, Router};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/api/charge", post(handlers::log_charge))
        .route("/api/history", get(handlers::get_history))
        .route("/api/effects", get(handlers::get_effects))
        .route("/api/view", post(handlers::set_view))
        .with_state(state)
}

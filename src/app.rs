use crate::handlers;
use crate::state::AppState;
use axum::{routing::{get, post}, Router};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/api/ledger", get(handlers::get_ledger))
        .route("/api/fitness/token", post(handlers::set_token))
        .route("/api/steps/refresh", post(handlers::refresh_steps))
        .route("/api/steps/convert", post(handlers::convert))
        .route("/api/feed", post(handlers::feed))
        .route("/api/emotion", post(handlers::emotion))
        .route("/api/light", post(handlers::light))
        .route("/api/manual", post(handlers::manual))
        .route("/api/hunger", get(handlers::get_hunger))
        .with_state(state)
}

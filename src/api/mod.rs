pub mod messages;
pub mod middleware;
pub mod notifications;
pub mod rooms;
pub mod technicians;

pub use middleware::*;

use axum::{extract::State, response::IntoResponse, routing::get, Json, Router};
use serde_json::json;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

/// Advisory client configuration. The transport is pull: widgets poll
/// messages and unread counts on this cadence.
async fn client_config(State(state): State<AppState>) -> impl IntoResponse {
    Json(json!({
        "poll_interval_seconds": state.poll_interval_seconds
    }))
}

async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/client-config", get(client_config))
        .merge(rooms::routes())
        .merge(messages::routes())
        .merge(notifications::routes())
        .merge(technicians::routes())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

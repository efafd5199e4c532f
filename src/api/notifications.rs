use axum::{
    extract::{Path, State},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};

use crate::{
    api::middleware::{ApiResult, AppState},
    models::{NotificationListResponse, TotalUnreadResponse},
};

/// Full ledger for one technician: one entry per room with unread traffic.
/// The dashboard polls this and re-sorts its sidebar unread-first.
pub async fn list_notifications(
    State(state): State<AppState>,
    Path(technician_id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let entries = state
        .db
        .list_notifications_for_technician(&technician_id)
        .await?;
    let total_unread = state.db.total_unread(&technician_id).await?;

    Ok(Json(NotificationListResponse {
        entries,
        total_unread,
    }))
}

/// Badge total only, for cheap high-frequency polling.
pub async fn total_unread(
    State(state): State<AppState>,
    Path(technician_id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let total_unread = state.db.total_unread(&technician_id).await?;

    Ok(Json(TotalUnreadResponse { total_unread }))
}

#[derive(Debug, serde::Serialize)]
pub struct ReconcileResponse {
    pub unread_count: i64,
}

/// Recompute one cached counter from the message log. Repair endpoint for a
/// counter that drifted after a partial failure.
pub async fn reconcile(
    State(state): State<AppState>,
    Path((technician_id, room_id)): Path<(String, String)>,
) -> ApiResult<impl IntoResponse> {
    let unread_count = state
        .chat_service
        .reconcile_ledger(&technician_id, &room_id)
        .await?;

    Ok(Json(ReconcileResponse { unread_count }))
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/api/technicians/:technician_id/notifications",
            get(list_notifications),
        )
        .route(
            "/api/technicians/:technician_id/notifications/count",
            get(total_unread),
        )
        .route(
            "/api/technicians/:technician_id/notifications/:room_id/reconcile",
            post(reconcile),
        )
}

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, post, put},
    Json, Router,
};
use serde::Deserialize;

use crate::{
    api::middleware::{ApiResult, AppState},
    models::{CreateRoomRequest, PaginationMetadata, RoomListResponse, UpdateRoomStatusRequest},
};

/// First contact from the customer widget. Idempotent: repeated calls for the
/// same customer return the same room.
pub async fn create_or_get_room(
    State(state): State<AppState>,
    Json(request): Json<CreateRoomRequest>,
) -> ApiResult<impl IntoResponse> {
    let room = state
        .chat_service
        .get_or_create_room(&request.customer_id, &request.customer_name)
        .await?;

    Ok((StatusCode::OK, Json(room)))
}

/// Close or reopen a room (technician action).
pub async fn update_room_status(
    State(state): State<AppState>,
    Path(room_id): Path<String>,
    Json(request): Json<UpdateRoomStatusRequest>,
) -> ApiResult<impl IntoResponse> {
    let room = match request.status {
        crate::models::RoomStatus::Closed => state.chat_service.close_room(&room_id).await?,
        crate::models::RoomStatus::Active => state.chat_service.reopen_room(&room_id).await?,
    };

    Ok(Json(room))
}

#[derive(Debug, Deserialize)]
pub struct ListRoomsQuery {
    #[serde(default = "default_page")]
    pub page: i64,
    #[serde(default = "default_per_page")]
    pub per_page: i64,
    /// Substring match on customer name.
    pub q: Option<String>,
    /// When true, return only active rooms ordered by latest traffic.
    #[serde(default)]
    pub active: bool,
}

fn default_page() -> i64 {
    1
}

fn default_per_page() -> i64 {
    20
}

/// Room listing for the technician sidebar. The unread-first re-sort on top
/// of this is a client concern fed by the notifications endpoint.
pub async fn list_rooms(
    State(state): State<AppState>,
    Query(query): Query<ListRoomsQuery>,
) -> ApiResult<impl IntoResponse> {
    if let Some(ref q) = query.q {
        let rooms = state.db.search_rooms_by_customer_name(q).await?;
        let total = rooms.len() as i64;
        return Ok(Json(RoomListResponse {
            rooms,
            pagination: PaginationMetadata::new(1, total.max(1), total),
        }));
    }

    if query.active {
        let rooms = state.db.list_active_rooms().await?;
        let total = rooms.len() as i64;
        return Ok(Json(RoomListResponse {
            rooms,
            pagination: PaginationMetadata::new(1, total.max(1), total),
        }));
    }

    if query.page < 1 || query.per_page < 1 {
        return Err(crate::api::middleware::ApiError::BadRequest(
            "page and per_page must be at least 1".to_string(),
        ));
    }

    let offset = (query.page - 1) * query.per_page;
    let (rooms, total_count) = state.db.list_rooms(query.per_page, offset).await?;

    Ok(Json(RoomListResponse {
        rooms,
        pagination: PaginationMetadata::new(query.page, query.per_page, total_count),
    }))
}

pub async fn get_room(
    State(state): State<AppState>,
    Path(room_id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let room = state
        .db
        .get_room_by_id(&room_id)
        .await?
        .ok_or_else(|| {
            crate::api::middleware::ApiError::NotFound(format!("Chat room {} not found", room_id))
        })?;

    Ok(Json(room))
}

/// Admin-only removal. Rooms are normally closed, never deleted.
pub async fn delete_room(
    State(state): State<AppState>,
    Path(room_id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    state.chat_service.delete_room(&room_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/rooms", post(create_or_get_room))
        .route("/api/rooms", get(list_rooms))
        .route("/api/rooms/:id", get(get_room))
        .route("/api/rooms/:id", delete(delete_room))
        .route("/api/rooms/:id/status", put(update_room_status))
}

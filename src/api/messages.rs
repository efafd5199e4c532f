use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;

use crate::{
    api::middleware::{ApiError, ApiResult, AppState},
    models::{
        MarkReadRequest, MarkReadResponse, MessageListResponse, PaginationMetadata,
        SendMessageRequest,
    },
};

/// Post a message into a room. Either side of the conversation uses this;
/// customer sends additionally fan unread increments out to the roster.
pub async fn send_message(
    State(state): State<AppState>,
    Path(room_id): Path<String>,
    Json(request): Json<SendMessageRequest>,
) -> ApiResult<impl IntoResponse> {
    let message = state.chat_service.send_message(&room_id, request).await?;

    Ok((StatusCode::CREATED, Json(message)))
}

#[derive(Debug, Deserialize)]
pub struct MessageListQuery {
    #[serde(default = "default_page")]
    pub page: i64,
    #[serde(default = "default_limit")]
    pub limit: i64,
}

fn default_page() -> i64 {
    1
}

fn default_limit() -> i64 {
    50
}

/// List a page of messages, oldest first within the page. Page 1 is the most
/// recent window; higher pages walk backward in time.
pub async fn list_messages(
    State(state): State<AppState>,
    Path(room_id): Path<String>,
    Query(query): Query<MessageListQuery>,
) -> ApiResult<impl IntoResponse> {
    if query.page < 1 || query.limit < 1 {
        return Err(ApiError::BadRequest(
            "page and limit must be at least 1".to_string(),
        ));
    }

    let (messages, total) = state
        .chat_service
        .list_messages(&room_id, query.page, query.limit)
        .await?;

    Ok(Json(MessageListResponse {
        messages,
        pagination: PaginationMetadata::new(query.page, query.limit, total),
    }))
}

/// Mark the room read for one side of the conversation.
pub async fn mark_read(
    State(state): State<AppState>,
    Path(room_id): Path<String>,
    Json(request): Json<MarkReadRequest>,
) -> ApiResult<impl IntoResponse> {
    let updated_count = state
        .chat_service
        .mark_read(&room_id, request.reader_type, request.technician_id.as_deref())
        .await?;

    Ok(Json(MarkReadResponse { updated_count }))
}

#[derive(Debug, serde::Serialize)]
pub struct CustomerUnreadResponse {
    pub unread_count: i64,
}

/// Unread technician messages from the customer's point of view, polled by
/// the customer widget for its badge.
pub async fn customer_unread_count(
    State(state): State<AppState>,
    Path(room_id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let room = state.db.get_room_by_id(&room_id).await?;
    if room.is_none() {
        return Err(ApiError::NotFound(format!("Chat room {} not found", room_id)));
    }

    let unread_count = state.db.unread_count_for_customer(&room_id).await?;

    Ok(Json(CustomerUnreadResponse { unread_count }))
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/rooms/:id/messages", post(send_message))
        .route("/api/rooms/:id/messages", get(list_messages))
        .route("/api/rooms/:id/read", post(mark_read))
        .route("/api/rooms/:id/unread", get(customer_unread_count))
}

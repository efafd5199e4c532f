use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoomStatus {
    Active,
    Closed,
}

impl RoomStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RoomStatus::Active => "active",
            RoomStatus::Closed => "closed",
        }
    }
}

impl std::fmt::Display for RoomStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl From<String> for RoomStatus {
    fn from(s: String) -> Self {
        match s.as_str() {
            "closed" => RoomStatus::Closed,
            _ => RoomStatus::Active,
        }
    }
}

/// One chat room per customer. `last_message` / `last_message_at` are a
/// denormalized summary used only for sidebar ordering, never for unread state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRoom {
    pub id: String,
    pub customer_id: String,
    pub customer_name: String,
    pub status: RoomStatus,
    pub last_message: String,
    pub last_message_at: Option<String>, // ISO 8601 timestamp
    pub created_at: String,
    pub updated_at: String,
}

impl ChatRoom {
    pub fn new(customer_id: String, customer_name: String) -> Self {
        let now = time::OffsetDateTime::now_utc()
            .format(&time::format_description::well_known::Rfc3339)
            .unwrap();

        Self {
            id: Uuid::new_v4().to_string(),
            customer_id,
            customer_name,
            status: RoomStatus::Active,
            last_message: String::new(),
            last_message_at: None,
            created_at: now.clone(),
            updated_at: now,
        }
    }
}

// Request DTOs

#[derive(Debug, Clone, Deserialize)]
pub struct CreateRoomRequest {
    pub customer_id: String,
    pub customer_name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateRoomStatusRequest {
    pub status: RoomStatus,
}

// Response DTOs

#[derive(Debug, Clone, Serialize)]
pub struct RoomListResponse {
    pub rooms: Vec<ChatRoom>,
    pub pagination: crate::models::PaginationMetadata,
}

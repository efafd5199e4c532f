use serde::{Deserialize, Serialize};

/// Cached unread counter for one (technician, room) pair. Kept in lockstep
/// with the message log by the chat service: incremented on every customer
/// send, reset to zero (never decremented) when the technician reads the room.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationEntry {
    pub technician_id: String,
    pub chat_room_id: String,
    pub unread_count: i64,
    pub last_message_at: String, // ISO 8601 timestamp
}

#[derive(Debug, Clone, Serialize)]
pub struct NotificationListResponse {
    pub entries: Vec<NotificationEntry>,
    pub total_unread: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct TotalUnreadResponse {
    pub total_unread: i64,
}

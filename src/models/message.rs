use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Who authored a message. Also used as the reader side in mark-read requests:
/// a customer reads technician messages and vice versa.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SenderType {
    Customer,
    Technician,
}

impl SenderType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SenderType::Customer => "customer",
            SenderType::Technician => "technician",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "customer" => Some(SenderType::Customer),
            "technician" => Some(SenderType::Technician),
            _ => None,
        }
    }
}

impl std::fmt::Display for SenderType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl From<String> for SenderType {
    fn from(s: String) -> Self {
        match s.as_str() {
            "technician" => SenderType::Technician,
            _ => SenderType::Customer,
        }
    }
}

/// A single technician's read receipt on a customer-authored message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadReceipt {
    pub technician_id: String,
    pub read_at: String, // ISO 8601 timestamp
}

/// Read state of a message, selected by sender type. Exactly one variant is
/// meaningful per message: technician-authored messages carry a single
/// customer-side flag, customer-authored messages carry per-technician
/// receipts. The variant never changes after creation; only its contents do.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ReadState {
    /// Has the customer seen this technician-authored message.
    Customer { is_read: bool },
    /// Which technicians have seen this customer-authored message.
    Technicians { read_by: Vec<ReadReceipt> },
}

impl ReadState {
    /// Initial read state for a freshly sent message.
    pub fn for_sender(sender_type: SenderType) -> Self {
        match sender_type {
            SenderType::Technician => ReadState::Customer { is_read: false },
            SenderType::Customer => ReadState::Technicians { read_by: Vec::new() },
        }
    }

    pub fn is_read_by_customer(&self) -> bool {
        matches!(self, ReadState::Customer { is_read: true })
    }

    pub fn read_by(&self) -> &[ReadReceipt] {
        match self {
            ReadState::Technicians { read_by } => read_by,
            ReadState::Customer { .. } => &[],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    pub chat_room_id: String,
    pub sender_id: String,
    pub sender_type: SenderType,
    pub sender_name: String,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attachment_url: Option<String>,
    pub read_state: ReadState,
    pub created_at: String, // ISO 8601 timestamp, immutable, defines ordering
}

impl Message {
    pub fn new(
        chat_room_id: String,
        sender_id: String,
        sender_type: SenderType,
        sender_name: String,
        content: String,
        attachment_url: Option<String>,
    ) -> Self {
        let now = time::OffsetDateTime::now_utc()
            .format(&time::format_description::well_known::Rfc3339)
            .unwrap();

        Self {
            id: Uuid::new_v4().to_string(),
            chat_room_id,
            sender_id,
            sender_type,
            sender_name,
            content,
            attachment_url,
            read_state: ReadState::for_sender(sender_type),
            created_at: now,
        }
    }

    pub fn validate_content(content: &str) -> Result<(), String> {
        if content.trim().is_empty() {
            return Err("Message content cannot be empty".to_string());
        }
        if content.len() > 10_000 {
            return Err(format!(
                "Message content too long: {} characters (max 10000)",
                content.len()
            ));
        }
        Ok(())
    }
}

// Request DTOs

#[derive(Debug, Clone, Deserialize)]
pub struct SendMessageRequest {
    pub sender_id: String,
    pub sender_type: SenderType,
    pub sender_name: String,
    pub content: String,
    pub attachment_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MarkReadRequest {
    pub reader_type: SenderType,
    /// Required when reader_type is technician.
    pub technician_id: Option<String>,
}

// Response DTOs

#[derive(Debug, Clone, Serialize)]
pub struct MessageListResponse {
    pub messages: Vec<Message>,
    pub pagination: crate::models::PaginationMetadata,
}

#[derive(Debug, Clone, Serialize)]
pub struct MarkReadResponse {
    pub updated_count: i64,
}

use std::sync::Arc;

use crate::api::middleware::error::{ApiError, ApiResult};
use crate::database::Database;
use crate::models::{ChatRoom, Message, RoomStatus, SendMessageRequest, SenderType};
use crate::services::roster::TechnicianRoster;

/// Longest snippet kept in the room's denormalized summary.
const SUMMARY_SNIPPET_CHARS: usize = 120;

/// Orchestrates the chat domain: room lifecycle, message send with summary
/// update and notification fan-out, read-marking on both sides. The only
/// writer of rooms, messages and ledger entries; HTTP handlers never touch
/// storage directly.
pub struct ChatService {
    db: Database,
    roster: Arc<dyn TechnicianRoster>,
}

impl ChatService {
    pub fn new(db: Database, roster: Arc<dyn TechnicianRoster>) -> Self {
        Self { db, roster }
    }

    /// Idempotent first-contact entry point: one room per customer.
    pub async fn get_or_create_room(
        &self,
        customer_id: &str,
        customer_name: &str,
    ) -> ApiResult<ChatRoom> {
        if customer_id.trim().is_empty() {
            return Err(ApiError::BadRequest("customer_id is required".to_string()));
        }
        if customer_name.trim().is_empty() {
            return Err(ApiError::BadRequest("customer_name is required".to_string()));
        }

        let room = self.db.get_or_create_room(customer_id, customer_name).await?;
        tracing::debug!("Room {} ready for customer {}", room.id, customer_id);
        Ok(room)
    }

    /// Append a message, refresh the room summary, and fan notification
    /// increments out to the roster when the sender is the customer.
    ///
    /// The append must land before the summary or fan-out run, and a failure
    /// in either side effect propagates to the caller: the message itself is
    /// durable and shows up on the next poll, but the caller gets to retry the
    /// side effect rather than silently serving a stale sidebar or badge.
    pub async fn send_message(
        &self,
        chat_room_id: &str,
        request: SendMessageRequest,
    ) -> ApiResult<Message> {
        Message::validate_content(&request.content).map_err(ApiError::BadRequest)?;

        if request.sender_id.trim().is_empty() {
            return Err(ApiError::BadRequest("sender_id is required".to_string()));
        }
        if request.sender_name.trim().is_empty() {
            return Err(ApiError::BadRequest("sender_name is required".to_string()));
        }

        // chat_room_id is not a storage-level foreign key; existence is
        // checked here before the append.
        let _room = self
            .db
            .get_room_by_id(chat_room_id)
            .await?
            .ok_or_else(|| ApiError::NotFound(format!("Chat room {} not found", chat_room_id)))?;

        let message = Message::new(
            chat_room_id.to_string(),
            request.sender_id,
            request.sender_type,
            request.sender_name,
            request.content,
            request.attachment_url,
        );

        self.db.create_message(&message).await?;
        tracing::info!(
            "Message created: id={}, room={}, sender_type={}",
            message.id,
            message.chat_room_id,
            message.sender_type
        );

        self.db
            .update_room_summary(chat_room_id, &snippet(&message.content), &message.created_at)
            .await?;

        if message.sender_type == SenderType::Customer {
            let technician_ids = self.roster.technician_ids().await?;
            if technician_ids.is_empty() {
                tracing::warn!(
                    "No technicians on roster, message {} notifies nobody",
                    message.id
                );
            }
            for technician_id in &technician_ids {
                self.db
                    .increment_unread(technician_id, chat_room_id, &message.created_at)
                    .await?;
            }
            tracing::debug!(
                "Unread fan-out for message {} reached {} technicians",
                message.id,
                technician_ids.len()
            );
        }

        Ok(message)
    }

    pub async fn list_messages(
        &self,
        chat_room_id: &str,
        page: i64,
        limit: i64,
    ) -> ApiResult<(Vec<Message>, i64)> {
        let _room = self
            .db
            .get_room_by_id(chat_room_id)
            .await?
            .ok_or_else(|| ApiError::NotFound(format!("Chat room {} not found", chat_room_id)))?;

        let offset = (page - 1) * limit;
        self.db.list_messages(chat_room_id, limit, offset).await
    }

    /// Dispatch read-marking by reader side. For technicians the ledger entry
    /// is reset afterwards as an independent step: if it lags the flag update
    /// by a poll cycle the badge corrects itself on the next read, which beats
    /// blocking message delivery on it.
    pub async fn mark_read(
        &self,
        chat_room_id: &str,
        reader_type: SenderType,
        technician_id: Option<&str>,
    ) -> ApiResult<i64> {
        let _room = self
            .db
            .get_room_by_id(chat_room_id)
            .await?
            .ok_or_else(|| ApiError::NotFound(format!("Chat room {} not found", chat_room_id)))?;

        match reader_type {
            SenderType::Customer => {
                let updated = self.db.mark_read_by_customer(chat_room_id).await?;
                tracing::debug!(
                    "Customer read room {}, {} messages marked",
                    chat_room_id,
                    updated
                );
                Ok(updated)
            }
            SenderType::Technician => {
                let technician_id = technician_id.ok_or_else(|| {
                    ApiError::BadRequest(
                        "technician_id is required when reader_type is technician".to_string(),
                    )
                })?;

                let updated = self
                    .db
                    .mark_read_by_technician(chat_room_id, technician_id)
                    .await?;
                self.db.reset_unread(technician_id, chat_room_id).await?;
                tracing::debug!(
                    "Technician {} read room {}, {} receipts added",
                    technician_id,
                    chat_room_id,
                    updated
                );
                Ok(updated)
            }
        }
    }

    pub async fn close_room(&self, chat_room_id: &str) -> ApiResult<ChatRoom> {
        self.db.set_room_status(chat_room_id, RoomStatus::Closed).await
    }

    pub async fn reopen_room(&self, chat_room_id: &str) -> ApiResult<ChatRoom> {
        self.db.set_room_status(chat_room_id, RoomStatus::Active).await
    }

    pub async fn delete_room(&self, chat_room_id: &str) -> ApiResult<()> {
        self.db.delete_room(chat_room_id).await?;
        tracing::info!("Room {} deleted", chat_room_id);
        Ok(())
    }

    /// Recompute one ledger counter from the message log. Repair path for a
    /// counter that drifted after a partial send failure.
    pub async fn reconcile_ledger(
        &self,
        technician_id: &str,
        chat_room_id: &str,
    ) -> ApiResult<i64> {
        let actual = self.db.reconcile_unread(technician_id, chat_room_id).await?;
        tracing::info!(
            "Ledger reconciled for technician {} room {}: unread_count={}",
            technician_id,
            chat_room_id,
            actual
        );
        Ok(actual)
    }
}

impl Clone for ChatService {
    fn clone(&self) -> Self {
        Self {
            db: self.db.clone(),
            roster: self.roster.clone(),
        }
    }
}

fn snippet(content: &str) -> String {
    if content.chars().count() <= SUMMARY_SNIPPET_CHARS {
        return content.to_string();
    }
    content.chars().take(SUMMARY_SNIPPET_CHARS).collect()
}

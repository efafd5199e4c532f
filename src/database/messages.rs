use std::collections::HashMap;

use sqlx::Row;

use crate::api::middleware::error::ApiResult;
use crate::database::Database;
use crate::models::{Message, ReadReceipt, ReadState, SenderType};

fn message_from_row(
    row: &sqlx::any::AnyRow,
    receipts: &mut HashMap<String, Vec<ReadReceipt>>,
) -> Result<Message, sqlx::Error> {
    let id: String = row.try_get("id")?;
    let sender_type_str: String = row.try_get("sender_type")?;
    let sender_type = SenderType::from(sender_type_str);
    let is_read_int: i32 = row.try_get("is_read")?;

    let read_state = match sender_type {
        SenderType::Technician => ReadState::Customer {
            is_read: is_read_int != 0,
        },
        SenderType::Customer => ReadState::Technicians {
            read_by: receipts.remove(&id).unwrap_or_default(),
        },
    };

    Ok(Message {
        id,
        chat_room_id: row.try_get("chat_room_id")?,
        sender_id: row.try_get("sender_id")?,
        sender_type,
        sender_name: row.try_get("sender_name")?,
        content: row.try_get("content")?,
        attachment_url: row.try_get::<Option<String>, _>("attachment_url")?,
        read_state,
        created_at: row.try_get("created_at")?,
    })
}

impl Database {
    pub async fn create_message(&self, message: &Message) -> ApiResult<()> {
        sqlx::query(
            "INSERT INTO messages (id, chat_room_id, sender_id, sender_type, sender_name, content, attachment_url, is_read, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&message.id)
        .bind(&message.chat_room_id)
        .bind(&message.sender_id)
        .bind(message.sender_type.as_str())
        .bind(&message.sender_name)
        .bind(&message.content)
        .bind(&message.attachment_url)
        .bind(if message.read_state.is_read_by_customer() { 1 } else { 0 })
        .bind(&message.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn get_message_by_id(&self, id: &str) -> ApiResult<Option<Message>> {
        let row = sqlx::query(
            "SELECT id, chat_room_id, sender_id, sender_type, sender_name, content, attachment_url, is_read, created_at
             FROM messages
             WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        let row = match row {
            Some(row) => row,
            None => return Ok(None),
        };

        let mut receipts = self.read_receipts_for_messages(&[id.to_string()]).await?;
        Ok(Some(message_from_row(&row, &mut receipts)?))
    }

    /// Page 1 is the most recent `limit` messages, returned in chronological
    /// order; increasing the page walks backward in time. Ties on created_at
    /// break by id so repeated reads of the same data stay stable.
    pub async fn list_messages(
        &self,
        chat_room_id: &str,
        limit: i64,
        offset: i64,
    ) -> ApiResult<(Vec<Message>, i64)> {
        let count_row =
            sqlx::query("SELECT COUNT(*) as count FROM messages WHERE chat_room_id = ?")
                .bind(chat_room_id)
                .fetch_one(&self.pool)
                .await?;
        let total_count: i64 = count_row.try_get("count")?;

        let rows = sqlx::query(
            "SELECT id, chat_room_id, sender_id, sender_type, sender_name, content, attachment_url, is_read, created_at
             FROM messages
             WHERE chat_room_id = ?
             ORDER BY created_at DESC, id DESC
             LIMIT ? OFFSET ?",
        )
        .bind(chat_room_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        let mut receipts = self.read_receipts_for_room(chat_room_id).await?;

        let mut messages = Vec::new();
        for row in rows {
            messages.push(message_from_row(&row, &mut receipts)?);
        }

        // Fetched newest-first for the offset window; present oldest-first.
        messages.reverse();

        Ok((messages, total_count))
    }

    /// Flip the customer-side flag on every unread technician message in the
    /// room. Returns how many changed; calling again right away returns 0.
    pub async fn mark_read_by_customer(&self, chat_room_id: &str) -> ApiResult<i64> {
        let result = sqlx::query(
            "UPDATE messages
             SET is_read = 1
             WHERE chat_room_id = ? AND sender_type = 'technician' AND is_read = 0",
        )
        .bind(chat_room_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() as i64)
    }

    /// Append a read receipt for every customer message in the room this
    /// technician has not yet seen. Idempotent per technician; one
    /// technician's receipts never touch another's.
    pub async fn mark_read_by_technician(
        &self,
        chat_room_id: &str,
        technician_id: &str,
    ) -> ApiResult<i64> {
        let now = time::OffsetDateTime::now_utc()
            .format(&time::format_description::well_known::Rfc3339)
            .unwrap();

        let result = sqlx::query(
            "INSERT INTO message_reads (message_id, technician_id, read_at)
             SELECT m.id, ?, ?
             FROM messages m
             WHERE m.chat_room_id = ?
               AND m.sender_type = 'customer'
               AND NOT EXISTS (
                   SELECT 1 FROM message_reads r
                   WHERE r.message_id = m.id AND r.technician_id = ?
               )",
        )
        .bind(technician_id)
        .bind(&now)
        .bind(chat_room_id)
        .bind(technician_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() as i64)
    }

    pub async fn unread_count_for_customer(&self, chat_room_id: &str) -> ApiResult<i64> {
        let row = sqlx::query(
            "SELECT COUNT(*) as count
             FROM messages
             WHERE chat_room_id = ? AND sender_type = 'technician' AND is_read = 0",
        )
        .bind(chat_room_id)
        .fetch_one(&self.pool)
        .await?;

        let count: i64 = row.try_get("count")?;
        Ok(count)
    }

    /// Customer messages in the room this technician has no receipt for.
    /// Source of truth behind the cached ledger counter.
    pub async fn unread_count_for_technician(
        &self,
        chat_room_id: &str,
        technician_id: &str,
    ) -> ApiResult<i64> {
        let row = sqlx::query(
            "SELECT COUNT(*) as count
             FROM messages m
             WHERE m.chat_room_id = ?
               AND m.sender_type = 'customer'
               AND NOT EXISTS (
                   SELECT 1 FROM message_reads r
                   WHERE r.message_id = m.id AND r.technician_id = ?
               )",
        )
        .bind(chat_room_id)
        .bind(technician_id)
        .fetch_one(&self.pool)
        .await?;

        let count: i64 = row.try_get("count")?;
        Ok(count)
    }

    async fn read_receipts_for_room(
        &self,
        chat_room_id: &str,
    ) -> ApiResult<HashMap<String, Vec<ReadReceipt>>> {
        let rows = sqlx::query(
            "SELECT r.message_id, r.technician_id, r.read_at
             FROM message_reads r
             INNER JOIN messages m ON m.id = r.message_id
             WHERE m.chat_room_id = ?
             ORDER BY r.read_at, r.technician_id",
        )
        .bind(chat_room_id)
        .fetch_all(&self.pool)
        .await?;

        let mut receipts: HashMap<String, Vec<ReadReceipt>> = HashMap::new();
        for row in rows {
            let message_id: String = row.try_get("message_id")?;
            receipts.entry(message_id).or_default().push(ReadReceipt {
                technician_id: row.try_get("technician_id")?,
                read_at: row.try_get("read_at")?,
            });
        }

        Ok(receipts)
    }

    async fn read_receipts_for_messages(
        &self,
        message_ids: &[String],
    ) -> ApiResult<HashMap<String, Vec<ReadReceipt>>> {
        let mut receipts: HashMap<String, Vec<ReadReceipt>> = HashMap::new();
        for message_id in message_ids {
            let rows = sqlx::query(
                "SELECT message_id, technician_id, read_at
                 FROM message_reads
                 WHERE message_id = ?
                 ORDER BY read_at, technician_id",
            )
            .bind(message_id)
            .fetch_all(&self.pool)
            .await?;

            for row in rows {
                let message_id: String = row.try_get("message_id")?;
                receipts.entry(message_id).or_default().push(ReadReceipt {
                    technician_id: row.try_get("technician_id")?,
                    read_at: row.try_get("read_at")?,
                });
            }
        }

        Ok(receipts)
    }
}

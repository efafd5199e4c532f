use sqlx::Row;
use time;

use crate::api::middleware::error::{ApiError, ApiResult};
use crate::database::Database;
use crate::models::{ChatRoom, RoomStatus};

fn room_from_row(row: &sqlx::any::AnyRow) -> Result<ChatRoom, sqlx::Error> {
    let status_str: String = row.try_get("status")?;

    Ok(ChatRoom {
        id: row.try_get("id")?,
        customer_id: row.try_get("customer_id")?,
        customer_name: row.try_get("customer_name")?,
        status: RoomStatus::from(status_str),
        last_message: row.try_get("last_message")?,
        last_message_at: row.try_get::<Option<String>, _>("last_message_at")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

impl Database {
    /// Lookup by customer, creating the room on first contact. The UNIQUE
    /// constraint on customer_id makes this safe under concurrent first
    /// contact: both inserts race, one wins, both calls return the same row.
    pub async fn get_or_create_room(
        &self,
        customer_id: &str,
        customer_name: &str,
    ) -> ApiResult<ChatRoom> {
        let candidate = ChatRoom::new(customer_id.to_string(), customer_name.to_string());

        sqlx::query(
            "INSERT INTO chat_rooms (id, customer_id, customer_name, status, last_message, last_message_at, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, NULL, ?, ?)
             ON CONFLICT(customer_id) DO NOTHING",
        )
        .bind(&candidate.id)
        .bind(&candidate.customer_id)
        .bind(&candidate.customer_name)
        .bind(candidate.status.as_str())
        .bind(&candidate.last_message)
        .bind(&candidate.created_at)
        .bind(&candidate.updated_at)
        .execute(&self.pool)
        .await?;

        self.get_room_by_customer_id(customer_id).await?.ok_or_else(|| {
            ApiError::Conflict(format!(
                "Concurrent room creation for customer {}, retry",
                customer_id
            ))
        })
    }

    pub async fn get_room_by_id(&self, id: &str) -> ApiResult<Option<ChatRoom>> {
        let row = sqlx::query(
            "SELECT id, customer_id, customer_name, status, last_message, last_message_at, created_at, updated_at
             FROM chat_rooms
             WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => Ok(Some(room_from_row(&row)?)),
            None => Ok(None),
        }
    }

    pub async fn get_room_by_customer_id(&self, customer_id: &str) -> ApiResult<Option<ChatRoom>> {
        let row = sqlx::query(
            "SELECT id, customer_id, customer_name, status, last_message, last_message_at, created_at, updated_at
             FROM chat_rooms
             WHERE customer_id = ?",
        )
        .bind(customer_id)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => Ok(Some(room_from_row(&row)?)),
            None => Ok(None),
        }
    }

    /// Overwrite the denormalized sidebar summary. No merge logic, but the
    /// write is guarded to be monotonic in message time: concurrent sends to
    /// the same room can reach this in either order, and the summary must end
    /// up on the newest message, not the last UPDATE to land.
    pub async fn update_room_summary(
        &self,
        room_id: &str,
        last_message: &str,
        last_message_at: &str,
    ) -> ApiResult<()> {
        sqlx::query(
            "UPDATE chat_rooms
             SET last_message = ?, last_message_at = ?, updated_at = ?
             WHERE id = ? AND (last_message_at IS NULL OR last_message_at <= ?)",
        )
        .bind(last_message)
        .bind(last_message_at)
        .bind(last_message_at)
        .bind(room_id)
        .bind(last_message_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn set_room_status(&self, room_id: &str, status: RoomStatus) -> ApiResult<ChatRoom> {
        let now = time::OffsetDateTime::now_utc()
            .format(&time::format_description::well_known::Rfc3339)
            .unwrap();

        let result = sqlx::query(
            "UPDATE chat_rooms
             SET status = ?, updated_at = ?
             WHERE id = ?",
        )
        .bind(status.as_str())
        .bind(&now)
        .bind(room_id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(ApiError::NotFound(format!("Chat room {} not found", room_id)));
        }

        self.get_room_by_id(room_id)
            .await?
            .ok_or_else(|| ApiError::NotFound(format!("Chat room {} not found", room_id)))
    }

    /// Active rooms for the technician sidebar, most recent traffic first.
    /// Rooms that have never seen a message sort last (NULL last_message_at).
    pub async fn list_active_rooms(&self) -> ApiResult<Vec<ChatRoom>> {
        let rows = sqlx::query(
            "SELECT id, customer_id, customer_name, status, last_message, last_message_at, created_at, updated_at
             FROM chat_rooms
             WHERE status = 'active'
             ORDER BY last_message_at DESC",
        )
        .fetch_all(&self.pool)
        .await?;

        let mut rooms = Vec::new();
        for row in rows {
            rooms.push(room_from_row(&row)?);
        }

        Ok(rooms)
    }

    pub async fn list_rooms(&self, limit: i64, offset: i64) -> ApiResult<(Vec<ChatRoom>, i64)> {
        let count_row = sqlx::query("SELECT COUNT(*) as count FROM chat_rooms")
            .fetch_one(&self.pool)
            .await?;
        let total_count: i64 = count_row.try_get("count")?;

        let rows = sqlx::query(
            "SELECT id, customer_id, customer_name, status, last_message, last_message_at, created_at, updated_at
             FROM chat_rooms
             ORDER BY last_message_at DESC
             LIMIT ? OFFSET ?",
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        let mut rooms = Vec::new();
        for row in rows {
            rooms.push(room_from_row(&row)?);
        }

        Ok((rooms, total_count))
    }

    pub async fn search_rooms_by_customer_name(&self, substring: &str) -> ApiResult<Vec<ChatRoom>> {
        let rows = sqlx::query(
            "SELECT id, customer_id, customer_name, status, last_message, last_message_at, created_at, updated_at
             FROM chat_rooms
             WHERE customer_name LIKE '%' || ? || '%'
             ORDER BY last_message_at DESC",
        )
        .bind(substring)
        .fetch_all(&self.pool)
        .await?;

        let mut rooms = Vec::new();
        for row in rows {
            rooms.push(room_from_row(&row)?);
        }

        Ok(rooms)
    }

    /// Remove a room and everything hanging off it. Admin action only; rooms
    /// are otherwise never deleted, just closed.
    pub async fn delete_room(&self, room_id: &str) -> ApiResult<()> {
        let existing = self.get_room_by_id(room_id).await?;
        if existing.is_none() {
            return Err(ApiError::NotFound(format!("Chat room {} not found", room_id)));
        }

        sqlx::query(
            "DELETE FROM message_reads
             WHERE message_id IN (SELECT id FROM messages WHERE chat_room_id = ?)",
        )
        .bind(room_id)
        .execute(&self.pool)
        .await?;

        sqlx::query("DELETE FROM messages WHERE chat_room_id = ?")
            .bind(room_id)
            .execute(&self.pool)
            .await?;

        sqlx::query("DELETE FROM chat_notifications WHERE chat_room_id = ?")
            .bind(room_id)
            .execute(&self.pool)
            .await?;

        sqlx::query("DELETE FROM chat_rooms WHERE id = ?")
            .bind(room_id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}

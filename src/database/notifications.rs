use sqlx::Row;

use crate::api::middleware::error::ApiResult;
use crate::database::Database;
use crate::models::NotificationEntry;

impl Database {
    /// Bump the unread counter for one (technician, room) pair, creating the
    /// entry on first contact. A single upsert with an in-database increment:
    /// two concurrent sends both land, neither overwrites the other.
    pub async fn increment_unread(
        &self,
        technician_id: &str,
        chat_room_id: &str,
        message_time: &str,
    ) -> ApiResult<()> {
        sqlx::query(
            "INSERT INTO chat_notifications (technician_id, chat_room_id, unread_count, last_message_at)
             VALUES (?, ?, 1, ?)
             ON CONFLICT(technician_id, chat_room_id)
             DO UPDATE SET unread_count = unread_count + 1, last_message_at = excluded.last_message_at",
        )
        .bind(technician_id)
        .bind(chat_room_id)
        .bind(message_time)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Set the counter back to zero. Reset, not decrement, so an increment
    /// racing in between is re-surfaced on the next poll instead of lost.
    /// Leaves last_message_at alone; unknown pairs are a no-op.
    pub async fn reset_unread(&self, technician_id: &str, chat_room_id: &str) -> ApiResult<()> {
        sqlx::query(
            "UPDATE chat_notifications
             SET unread_count = 0
             WHERE technician_id = ? AND chat_room_id = ?",
        )
        .bind(technician_id)
        .bind(chat_room_id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn total_unread(&self, technician_id: &str) -> ApiResult<i64> {
        let row = sqlx::query(
            "SELECT COALESCE(SUM(unread_count), 0) as total
             FROM chat_notifications
             WHERE technician_id = ?",
        )
        .bind(technician_id)
        .fetch_one(&self.pool)
        .await?;

        let total: i64 = row.try_get("total")?;
        Ok(total)
    }

    pub async fn list_notifications_for_technician(
        &self,
        technician_id: &str,
    ) -> ApiResult<Vec<NotificationEntry>> {
        let rows = sqlx::query(
            "SELECT technician_id, chat_room_id, unread_count, last_message_at
             FROM chat_notifications
             WHERE technician_id = ?
             ORDER BY last_message_at DESC",
        )
        .bind(technician_id)
        .fetch_all(&self.pool)
        .await?;

        let mut entries = Vec::new();
        for row in rows {
            entries.push(NotificationEntry {
                technician_id: row.try_get("technician_id")?,
                chat_room_id: row.try_get("chat_room_id")?,
                unread_count: row.try_get("unread_count")?,
                last_message_at: row.try_get("last_message_at")?,
            });
        }

        Ok(entries)
    }

    /// Recompute the cached counter from the message log and overwrite it.
    /// Repair tool for a counter that drifted under partial failure; returns
    /// the recomputed value.
    pub async fn reconcile_unread(
        &self,
        technician_id: &str,
        chat_room_id: &str,
    ) -> ApiResult<i64> {
        let actual = self
            .unread_count_for_technician(chat_room_id, technician_id)
            .await?;

        let updated = sqlx::query(
            "UPDATE chat_notifications
             SET unread_count = ?
             WHERE technician_id = ? AND chat_room_id = ?",
        )
        .bind(actual)
        .bind(technician_id)
        .bind(chat_room_id)
        .execute(&self.pool)
        .await?;

        if updated.rows_affected() == 0 && actual > 0 {
            // No ledger entry yet for this pair; seed one from the log.
            let row = sqlx::query(
                "SELECT MAX(created_at) as latest
                 FROM messages
                 WHERE chat_room_id = ? AND sender_type = 'customer'",
            )
            .bind(chat_room_id)
            .fetch_one(&self.pool)
            .await?;
            let latest: String = row.try_get("latest")?;

            sqlx::query(
                "INSERT INTO chat_notifications (technician_id, chat_room_id, unread_count, last_message_at)
                 VALUES (?, ?, ?, ?)
                 ON CONFLICT(technician_id, chat_room_id)
                 DO UPDATE SET unread_count = excluded.unread_count",
            )
            .bind(technician_id)
            .bind(chat_room_id)
            .bind(actual)
            .bind(&latest)
            .execute(&self.pool)
            .await?;
        }

        Ok(actual)
    }
}

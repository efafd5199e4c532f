use sqlx::Row;
use time;

use crate::api::middleware::error::ApiResult;
use crate::database::Database;
use crate::models::Technician;

impl Database {
    pub async fn create_technician(&self, id: &str, name: &str) -> ApiResult<Technician> {
        let now = time::OffsetDateTime::now_utc()
            .format(&time::format_description::well_known::Rfc3339)
            .unwrap();

        sqlx::query("INSERT INTO technicians (id, name, created_at) VALUES (?, ?, ?)")
            .bind(id)
            .bind(name)
            .bind(&now)
            .execute(&self.pool)
            .await?;

        Ok(Technician {
            id: id.to_string(),
            name: name.to_string(),
            created_at: now,
        })
    }

    pub async fn delete_technician(&self, id: &str) -> ApiResult<bool> {
        let result = sqlx::query("DELETE FROM technicians WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn list_technician_ids(&self) -> ApiResult<Vec<String>> {
        let rows = sqlx::query("SELECT id FROM technicians ORDER BY created_at, id")
            .fetch_all(&self.pool)
            .await?;

        let mut ids = Vec::new();
        for row in rows {
            ids.push(row.try_get("id")?);
        }

        Ok(ids)
    }

    pub async fn list_technicians(&self) -> ApiResult<Vec<Technician>> {
        let rows =
            sqlx::query("SELECT id, name, created_at FROM technicians ORDER BY created_at, id")
            .fetch_all(&self.pool)
            .await?;

        let mut technicians = Vec::new();
        for row in rows {
            technicians.push(Technician {
                id: row.try_get("id")?,
                name: row.try_get("name")?,
                created_at: row.try_get("created_at")?,
            });
        }

        Ok(technicians)
    }
}

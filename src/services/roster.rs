use std::sync::Arc;

use async_trait::async_trait;

use crate::api::middleware::error::ApiResult;
use crate::database::Database;

/// Source of the technician ids a customer message fans out to. The chat
/// service only sees this trait, so the fan-out policy (everyone, on-duty
/// only, per-team) can change without touching the service.
#[async_trait]
pub trait TechnicianRoster: Send + Sync {
    async fn technician_ids(&self) -> ApiResult<Vec<String>>;
}

/// Roster backed by the technicians table: every registered technician is
/// notified.
pub struct DbRoster {
    db: Database,
}

impl DbRoster {
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

#[async_trait]
impl TechnicianRoster for DbRoster {
    async fn technician_ids(&self) -> ApiResult<Vec<String>> {
        self.db.list_technician_ids().await
    }
}

/// Fixed roster for tests and one-off tooling.
pub struct StaticRoster {
    ids: Vec<String>,
}

impl StaticRoster {
    pub fn new(ids: Vec<String>) -> Self {
        Self { ids }
    }

    pub fn empty() -> Self {
        Self { ids: Vec::new() }
    }
}

#[async_trait]
impl TechnicianRoster for StaticRoster {
    async fn technician_ids(&self) -> ApiResult<Vec<String>> {
        Ok(self.ids.clone())
    }
}

pub type SharedRoster = Arc<dyn TechnicianRoster>;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaginationMetadata {
    pub page: i64,
    pub per_page: i64,
    pub total_count: i64,
    pub total_pages: i64,
}

impl PaginationMetadata {
    pub fn new(page: i64, per_page: i64, total_count: i64) -> Self {
        Self {
            page,
            per_page,
            total_count,
            total_pages: (total_count + per_page - 1) / per_page,
        }
    }
}

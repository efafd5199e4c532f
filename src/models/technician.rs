use serde::{Deserialize, Serialize};

/// A support technician eligible for notification fan-out.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Technician {
    pub id: String,
    pub name: String,
    pub created_at: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateTechnicianRequest {
    pub id: String,
    pub name: String,
}

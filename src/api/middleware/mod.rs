pub mod error;

pub use error::*;

use crate::database::Database;
use crate::services::ChatService;

#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub chat_service: ChatService,
    pub poll_interval_seconds: u64,
}

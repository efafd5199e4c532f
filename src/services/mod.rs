pub mod chat_service;
pub mod roster;

pub use chat_service::*;
pub use roster::*;

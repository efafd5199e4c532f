pub mod chat_room;
pub mod message;
pub mod notification;
pub mod pagination;
pub mod technician;

pub use chat_room::*;
pub use message::*;
pub use notification::*;
pub use pagination::*;
pub use technician::*;

pub mod api;
pub mod transport;

pub use api::{Attachment, Chat, Message, Update, User};
pub use transport::{ChatTransport, TelegramTransport};

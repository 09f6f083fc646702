// Handlers module

pub mod chat;
pub mod chat_stream;
pub mod get_conversation;
pub mod health;

pub use chat::chat_handler;
pub use chat_stream::chat_stream_handler;
pub use get_conversation::get_conversation_handler;
pub use health::health_handler;

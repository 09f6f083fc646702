//! File-backed conversation memory
//!
//! Conversations live in memory as a map of conversation id to ordered
//! messages and are rewritten to a single JSON file after every append.

mod error;
mod store;
mod types;

pub use error::StoreError;
pub use store::{TranscriptStore, DEFAULT_MAX_CONVERSATIONS};
pub use types::{Conversation, HistoryEntry, Message, Role};

//! JSON-file transcript store

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use tokio::fs;
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

use super::error::StoreError;
use super::types::{Conversation, HistoryEntry, Message, Role};

/// Number of conversations kept when no limit is configured
pub const DEFAULT_MAX_CONVERSATIONS: usize = 50;

type ConversationMap = BTreeMap<String, Conversation>;

/// Durable map of conversation id to ordered messages.
///
/// Every mutating call holds the internal lock across the whole
/// mutate-evict-write cycle, so concurrent callers never interleave
/// partial writes. The backing file is replaced atomically (write to a
/// sibling temp file, then rename).
pub struct TranscriptStore {
    path: PathBuf,
    max_conversations: usize,
    conversations: Mutex<ConversationMap>,
}

impl TranscriptStore {
    /// Load the store from `path`.
    ///
    /// A missing file yields an empty store. An unreadable or corrupt file is
    /// logged and also yields an empty store; loading never fails.
    pub async fn load(path: impl Into<PathBuf>, max_conversations: usize) -> Self {
        let path = path.into();

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            if let Err(e) = fs::create_dir_all(parent).await {
                warn!(dir = %parent.display(), error = %e, "Failed to create data directory");
            }
        }

        let conversations = match read_conversations(&path).await {
            Ok(Some(conversations)) => {
                info!(
                    path = %path.display(),
                    conversations = conversations.len(),
                    "Loaded conversation memory"
                );
                conversations
            }
            Ok(None) => {
                debug!(path = %path.display(), "No memory file yet, starting empty");
                ConversationMap::new()
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Failed to load memory, starting empty");
                ConversationMap::new()
            }
        };

        Self {
            path,
            max_conversations: max_conversations.max(1),
            conversations: Mutex::new(conversations),
        }
    }

    /// Path of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append a message, creating the conversation if needed, then rewrite
    /// the backing file.
    ///
    /// Returns `false` when the message is only held in memory because the
    /// write failed. The failure has already been logged.
    pub async fn append(
        &self,
        conversation_id: &str,
        role: Role,
        content: impl Into<String>,
        thinking: Option<String>,
    ) -> bool {
        let mut conversations = self.conversations.lock().await;
        conversations
            .entry(conversation_id.to_string())
            .or_default()
            .push(Message::new(role, content, thinking));

        self.persist(&mut conversations).await
    }

    /// Ordered messages of a conversation, empty if the id is unknown
    pub async fn get(&self, conversation_id: &str) -> Conversation {
        self.conversations
            .lock()
            .await
            .get(conversation_id)
            .cloned()
            .unwrap_or_default()
    }

    /// Role/content pairs to send upstream. Thinking traces are never included.
    pub async fn history_for_model(&self, conversation_id: &str) -> Vec<HistoryEntry> {
        let conversations = self.conversations.lock().await;
        let Some(messages) = conversations.get(conversation_id) else {
            return Vec::new();
        };

        messages
            .iter()
            .filter(|m| m.role.is_conversational())
            .map(|m| HistoryEntry {
                role: m.role.clone(),
                content: m.content.clone(),
            })
            .collect()
    }

    /// Number of conversations currently held
    pub async fn len(&self) -> usize {
        self.conversations.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.conversations.lock().await.is_empty()
    }

    /// Drop every conversation and persist the empty map
    pub async fn clear(&self) -> bool {
        let mut conversations = self.conversations.lock().await;
        conversations.clear();
        self.persist(&mut conversations).await
    }

    /// Rewrite the backing file from memory
    pub async fn flush(&self) -> bool {
        let mut conversations = self.conversations.lock().await;
        self.persist(&mut conversations).await
    }

    async fn persist(&self, conversations: &mut ConversationMap) -> bool {
        evict_least_recent(conversations, self.max_conversations);

        match write_conversations(&self.path, conversations).await {
            Ok(()) => true,
            Err(e) => {
                error!(path = %self.path.display(), error = %e, "Failed to save memory");
                false
            }
        }
    }
}

/// Keep only the `max` conversations with the most recent last message.
/// Conversations without messages rank as least recent.
fn evict_least_recent(conversations: &mut ConversationMap, max: usize) {
    if conversations.len() <= max {
        return;
    }

    let mut ranked: Vec<(String, Option<DateTime<Utc>>)> = conversations
        .iter()
        .map(|(id, messages)| (id.clone(), messages.last().map(|m| m.timestamp)))
        .collect();

    // `None` orders below every `Some`, so a descending sort puts empty
    // conversations last
    ranked.sort_by(|a, b| b.1.cmp(&a.1));

    for (id, _) in ranked.into_iter().skip(max) {
        debug!(conversation_id = %id, "Evicting conversation");
        conversations.remove(&id);
    }
}

async fn read_conversations(path: &Path) -> Result<Option<ConversationMap>, StoreError> {
    let raw = match fs::read_to_string(path).await {
        Ok(raw) => raw,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };

    Ok(Some(serde_json::from_str(&raw)?))
}

async fn write_conversations(path: &Path, conversations: &ConversationMap) -> Result<(), StoreError> {
    let json = serde_json::to_string_pretty(conversations)?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).await?;
    }

    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);

    fs::write(&tmp, json).await?;
    fs::rename(&tmp, path).await?;
    Ok(())
}

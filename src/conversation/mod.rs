//! Chat turn orchestration
//!
//! A turn moves through these steps:
//! - the user message is appended to the transcript store
//! - the upstream request is built from the stored history (which already
//!   contains that message) and sent
//! - every normalized event is relayed to the caller as it arrives
//! - once the upstream stream ends, the assistant message is appended and the
//!   trailing metadata event is relayed
//!
//! An upstream failure is relayed as a terminal error; the user message stays
//! in the store and no assistant message is written.

mod error;

pub use error::ConversationError;

use std::pin::Pin;
use std::sync::Arc;
use std::time::Instant;

use futures::stream::Stream;
use futures::StreamExt;
use pin_utils::pin_mut;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tracing::{debug, error, info, warn};

use crate::llm::claude::mapper::to_messages_request;
use crate::llm::{GenerationConfig, LlmProvider, StreamEvent, StreamTranslator, TurnBuffer};
use crate::transcript::{Role, TranscriptStore};

/// Events of one turn. An `Err` item is terminal.
pub type TurnStream = Pin<Box<dyn Stream<Item = Result<StreamEvent, ConversationError>> + Send + Sync>>;

/// Buffered between the turn task and the caller
const EVENT_BUFFER: usize = 64;

/// Runs chat turns against the model API and records them
#[derive(Clone)]
pub struct ConversationService {
    store: Arc<TranscriptStore>,
    provider: Arc<dyn LlmProvider>,
    config: GenerationConfig,
}

impl ConversationService {
    pub fn new(
        store: Arc<TranscriptStore>,
        provider: Arc<dyn LlmProvider>,
        config: GenerationConfig,
    ) -> Self {
        Self {
            store,
            provider,
            config,
        }
    }

    pub fn config(&self) -> &GenerationConfig {
        &self.config
    }

    pub fn store(&self) -> &Arc<TranscriptStore> {
        &self.store
    }

    /// Start a turn and return its event stream.
    ///
    /// The user message is stored before this returns. The rest of the turn
    /// runs on its own task: dropping the returned stream stops the upstream
    /// read, and whatever text arrived by then is still recorded.
    pub async fn turn(
        &self,
        conversation_id: &str,
        message: &str,
        system_prompt: Option<String>,
    ) -> Result<TurnStream, ConversationError> {
        if conversation_id.trim().is_empty() {
            return Err(ConversationError::Validation(
                "conversation_id must not be empty".to_string(),
            ));
        }
        if message.trim().is_empty() {
            return Err(ConversationError::Validation(
                "Missing required field: message".to_string(),
            ));
        }

        info!(conversation_id = %conversation_id, "Starting turn");
        if !self
            .store
            .append(conversation_id, Role::User, message, None)
            .await
        {
            warn!(conversation_id = %conversation_id, "User message is not durably saved");
        }

        let (tx, rx) = mpsc::channel(EVENT_BUFFER);
        let service = self.clone();
        let conversation_id = conversation_id.to_string();
        tokio::spawn(async move {
            service.drive(conversation_id, system_prompt, tx).await;
        });

        Ok(Box::pin(ReceiverStream::new(rx)))
    }

    /// Run a turn to completion and return everything it produced
    pub async fn complete_turn(
        &self,
        conversation_id: &str,
        message: &str,
        system_prompt: Option<String>,
    ) -> Result<TurnBuffer, ConversationError> {
        let mut events = self.turn(conversation_id, message, system_prompt).await?;
        let mut buffer = TurnBuffer::new();

        while let Some(event) = events.next().await {
            buffer.push(&event?);
        }

        Ok(buffer)
    }

    async fn drive(
        self,
        conversation_id: String,
        system_prompt: Option<String>,
        tx: mpsc::Sender<Result<StreamEvent, ConversationError>>,
    ) {
        let started = Instant::now();

        let history = self.store.history_for_model(&conversation_id).await;
        let request = to_messages_request(history, &self.config, system_prompt);

        let upstream = match self.provider.stream_messages(request).await {
            Ok(upstream) => upstream,
            Err(e) => {
                error!(conversation_id = %conversation_id, error = %e, "Upstream request failed");
                let _ = tx.send(Err(ConversationError::Upstream(e))).await;
                return;
            }
        };

        let mut buffer = TurnBuffer::new();
        {
            let events = StreamTranslator::new(started).translate(upstream);
            pin_mut!(events);

            loop {
                let event = tokio::select! {
                    event = events.next() => event,
                    _ = tx.closed() => {
                        info!(conversation_id = %conversation_id, "Client went away, closing upstream stream");
                        break;
                    }
                };
                let Some(event) = event else {
                    break;
                };

                buffer.push(&event);

                if let StreamEvent::Metadata(metadata) = &event {
                    self.record_assistant(&conversation_id, &buffer).await;
                    info!(
                        conversation_id = %conversation_id,
                        ttft_ms = metadata.time_to_first_token.as_millis() as u64,
                        total_ms = metadata.total_time.as_millis() as u64,
                        "Turn complete"
                    );
                    let _ = tx.send(Ok(event)).await;
                    return;
                }

                if tx.send(Ok(event)).await.is_err() {
                    info!(conversation_id = %conversation_id, "Client went away, closing upstream stream");
                    break;
                }
            }
        }

        // The caller dropped the stream before the turn finished
        if buffer.is_empty() {
            debug!(conversation_id = %conversation_id, "Nothing received before disconnect");
        } else {
            self.record_assistant(&conversation_id, &buffer).await;
        }
    }

    async fn record_assistant(&self, conversation_id: &str, buffer: &TurnBuffer) {
        let (text, thinking) = buffer.assistant_parts();
        if !self
            .store
            .append(conversation_id, Role::Assistant, text, thinking)
            .await
        {
            warn!(conversation_id = %conversation_id, "Assistant message is not durably saved");
        }
    }
}

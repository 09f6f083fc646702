//! Upstream event classification and turn timing
//!
//! [`StreamTranslator`] turns the parsed upstream payloads into the small
//! event vocabulary relayed to clients: thinking deltas, answer deltas and a
//! single trailing [`StreamEvent::Metadata`]. [`TurnBuffer`] accumulates
//! those events into the final assistant message.

use std::time::{Duration, Instant};

use async_stream::stream;
use futures::stream::Stream;
use futures::StreamExt;
use tracing::{debug, warn};

use super::claude::types::{ClaudeContentDelta, ClaudeStreamEvent};
use super::provider::ClaudeEventStream;

/// Normalized event emitted for each turn, in upstream arrival order
#[derive(Debug, Clone, PartialEq)]
pub enum StreamEvent {
    /// Thinking trace delta
    Thinking(String),
    /// Answer text delta
    Text(String),
    /// Always last, exactly once per translated stream
    Metadata(TurnMetadata),
}

/// Timing of one turn, measured from the moment the turn started
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TurnMetadata {
    /// Time until the first content delta; equals `total_time` when none arrived
    pub time_to_first_token: Duration,
    pub total_time: Duration,
}

/// What to do with one upstream payload
#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    Emit(StreamEvent),
    Skip,
    Stop,
}

/// Classifies upstream payloads and tracks first-token latency
#[derive(Debug)]
pub struct StreamTranslator {
    started: Instant,
    first_token: Option<Duration>,
}

impl StreamTranslator {
    /// `started` is the beginning of the turn, before the upstream call
    pub fn new(started: Instant) -> Self {
        Self {
            started,
            first_token: None,
        }
    }

    /// Classify one upstream payload
    pub fn classify(&mut self, event: ClaudeStreamEvent) -> Step {
        match event {
            ClaudeStreamEvent::ContentBlockDelta { delta, .. } => {
                if self.first_token.is_none() {
                    self.first_token = Some(self.started.elapsed());
                }

                match delta {
                    ClaudeContentDelta::ThinkingDelta { thinking } => {
                        Step::Emit(StreamEvent::Thinking(thinking))
                    }
                    ClaudeContentDelta::TextDelta { text } => Step::Emit(StreamEvent::Text(text)),
                    ClaudeContentDelta::Other => Step::Skip,
                }
            }
            ClaudeStreamEvent::MessageStop => Step::Stop,
            ClaudeStreamEvent::Error { error } => {
                warn!(
                    error_type = %error.error_type,
                    message = %error.message,
                    "Upstream reported an error mid-stream, ending turn"
                );
                Step::Stop
            }
            ClaudeStreamEvent::Ping | ClaudeStreamEvent::Other => Step::Skip,
        }
    }

    /// Timing as of now
    pub fn metadata(&self) -> TurnMetadata {
        let total_time = self.started.elapsed();
        TurnMetadata {
            time_to_first_token: self.first_token.unwrap_or(total_time),
            total_time,
        }
    }

    /// Relay `upstream` as normalized events.
    ///
    /// Ends on `message_stop`, on an upstream error event, or when the
    /// connection drops; in every case the last item is `Metadata`.
    pub fn translate(mut self, upstream: ClaudeEventStream) -> impl Stream<Item = StreamEvent> + Send {
        stream! {
            let mut upstream = upstream;

            while let Some(item) = upstream.next().await {
                let event = match item {
                    Ok(event) => event,
                    Err(e) => {
                        warn!(error = %e, "Upstream stream ended before message_stop");
                        break;
                    }
                };

                match self.classify(event) {
                    Step::Emit(event) => yield event,
                    Step::Skip => {}
                    Step::Stop => break,
                }
            }

            let metadata = self.metadata();
            debug!(
                ttft_ms = metadata.time_to_first_token.as_millis() as u64,
                total_ms = metadata.total_time.as_millis() as u64,
                "Upstream stream finished"
            );
            yield StreamEvent::Metadata(metadata);
        }
    }
}

/// Accumulates the thinking and answer deltas of one turn
#[derive(Debug, Default, Clone)]
pub struct TurnBuffer {
    thinking: String,
    text: String,
    metadata: Option<TurnMetadata>,
}

impl TurnBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, event: &StreamEvent) {
        match event {
            StreamEvent::Thinking(delta) => self.thinking.push_str(delta),
            StreamEvent::Text(delta) => self.text.push_str(delta),
            StreamEvent::Metadata(metadata) => self.metadata = Some(*metadata),
        }
    }

    /// Concatenated answer deltas, untrimmed
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Concatenated thinking deltas, untrimmed
    pub fn thinking(&self) -> &str {
        &self.thinking
    }

    pub fn metadata(&self) -> Option<TurnMetadata> {
        self.metadata
    }

    /// True when no content delta has been received
    pub fn is_empty(&self) -> bool {
        self.text.is_empty() && self.thinking.is_empty()
    }

    /// Trimmed answer and trimmed thinking, the latter `None` when blank
    pub fn assistant_parts(&self) -> (String, Option<String>) {
        let thinking = self.thinking.trim();
        let thinking = (!thinking.is_empty()).then(|| thinking.to_string());
        (self.text.trim().to_string(), thinking)
    }
}

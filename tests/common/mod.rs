#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use chat_relay::conversation::ConversationService;
use chat_relay::llm::claude::sse::parse_sse_stream;
use chat_relay::llm::claude::types::MessagesRequest;
use chat_relay::llm::{ClaudeEventStream, GenerationConfig, LlmError, LlmProvider};
use chat_relay::transcript::{Message, TranscriptStore};
use futures::StreamExt;
use tempfile::TempDir;

pub const CONVERSATION_ID: &str = "conv-test";

/// Upstream payloads for a thinking "foo" / answer "bar" turn
pub const THINK_FOO_ANSWER_BAR: &[&str] = &[
    "event: message_start\ndata: {\"type\":\"message_start\",\"message\":{\"id\":\"msg_1\",\"type\":\"message\",\"role\":\"assistant\",\"content\":[],\"model\":\"claude-test\",\"usage\":{\"input_tokens\":5,\"output_tokens\":1}}}\n\n",
    "event: content_block_start\ndata: {\"type\":\"content_block_start\",\"index\":0,\"content_block\":{\"type\":\"thinking\",\"thinking\":\"\"}}\n\n",
    "event: content_block_delta\ndata: {\"type\":\"content_block_delta\",\"index\":0,\"delta\":{\"type\":\"thinking_delta\",\"thinking\":\"foo\"}}\n\n",
    "event: content_block_delta\ndata: {\"type\":\"content_block_delta\",\"index\":0,\"delta\":{\"type\":\"signature_delta\",\"signature\":\"sig\"}}\n\n",
    "event: content_block_stop\ndata: {\"type\":\"content_block_stop\",\"index\":0}\n\n",
    "event: content_block_delta\ndata: {\"type\":\"content_block_delta\",\"index\":1,\"delta\":{\"type\":\"text_delta\",\"text\":\"bar\"}}\n\n",
    "event: message_delta\ndata: {\"type\":\"message_delta\",\"delta\":{\"stop_reason\":\"end_turn\",\"stop_sequence\":null},\"usage\":{\"output_tokens\":12}}\n\n",
    "event: message_stop\ndata: {\"type\":\"message_stop\"}\n\n",
];

/// How the scripted upstream answers
#[derive(Clone)]
pub enum Script {
    /// Stream these raw SSE chunks after `delay`
    Chunks {
        chunks: Vec<&'static str>,
        delay: Duration,
    },
    /// Stream these chunks, then never finish
    ChunksThenHang(Vec<&'static str>),
    /// Fail with this HTTP status and body
    Status(u16, &'static str),
}

/// What the provider observed when it was called
pub struct Call {
    pub request: MessagesRequest,
    /// Stored messages of the conversation at call time
    pub stored: Vec<Message>,
}

/// Provider that replays raw SSE bytes through the real line parser
pub struct ScriptedProvider {
    script: Script,
    store: Arc<TranscriptStore>,
    calls: Arc<Mutex<Vec<Call>>>,
}

#[async_trait]
impl LlmProvider for ScriptedProvider {
    async fn stream_messages(&self, request: MessagesRequest) -> Result<ClaudeEventStream, LlmError> {
        let stored = self.store.get(CONVERSATION_ID).await;
        self.calls.lock().unwrap().push(Call { request, stored });

        let (chunks, delay, hang) = match self.script.clone() {
            Script::Status(status, body) => {
                return Err(LlmError::HttpError {
                    status,
                    body: body.to_string(),
                })
            }
            Script::Chunks { chunks, delay } => (chunks, delay, false),
            Script::ChunksThenHang(chunks) => (chunks, Duration::ZERO, true),
        };

        let bytes = async_stream::stream! {
            tokio::time::sleep(delay).await;
            for chunk in chunks {
                yield Ok::<Bytes, reqwest::Error>(Bytes::from_static(chunk.as_bytes()));
            }
            if hang {
                futures::future::pending::<()>().await;
            }
        };

        Ok(parse_sse_stream(Box::pin(bytes)))
    }
}

pub struct Harness {
    pub service: ConversationService,
    pub store: Arc<TranscriptStore>,
    pub calls: Arc<Mutex<Vec<Call>>>,
    pub dir: TempDir,
}

impl Harness {
    pub fn memory_file(&self) -> std::path::PathBuf {
        self.dir.path().join("chat_memory.json")
    }
}

pub async fn harness(script: Script) -> Harness {
    let dir = TempDir::new().unwrap();
    let store = Arc::new(TranscriptStore::load(dir.path().join("chat_memory.json"), 50).await);
    let calls = Arc::new(Mutex::new(Vec::new()));
    let provider = Arc::new(ScriptedProvider {
        script,
        store: store.clone(),
        calls: calls.clone(),
    });
    let config = GenerationConfig::new("claude-test");

    Harness {
        service: ConversationService::new(store.clone(), provider, config),
        store,
        calls,
        dir,
    }
}

pub fn chunks(chunks: &[&'static str]) -> Script {
    Script::Chunks {
        chunks: chunks.to_vec(),
        delay: Duration::from_millis(5),
    }
}

/// Wait until the store holds `count` messages for the test conversation
pub async fn wait_for_messages(store: &TranscriptStore, count: usize) -> Vec<Message> {
    for _ in 0..200 {
        let messages = store.get(CONVERSATION_ID).await;
        if messages.len() >= count {
            return messages;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    store.get(CONVERSATION_ID).await
}

/// Drain a turn stream, failing on the first error
pub async fn collect_ok(
    mut stream: chat_relay::conversation::TurnStream,
) -> Vec<chat_relay::llm::StreamEvent> {
    let mut events = Vec::new();
    while let Some(event) = stream.next().await {
        events.push(event.expect("turn failed"));
    }
    events
}

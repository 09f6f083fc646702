//! Server-Sent Events (SSE) line parser for Claude responses

use bytes::Bytes;
use futures::stream::Stream;
use futures::StreamExt;
use std::pin::Pin;
use tracing::debug;

use crate::llm::error::LlmError;

use super::types::ClaudeStreamEvent;

/// Parse a stream of bytes as Claude SSE payloads
///
/// The upstream stream is newline-delimited:
/// ```text
/// event: content_block_delta
/// data: {"type":"content_block_delta",...}
///
/// event: message_stop
/// data: {"type":"message_stop"}
/// ```
///
/// Only `data: <json>` lines carry payloads; `event:` lines, comments and
/// blank lines are ignored. A payload that is not valid JSON (or not a known
/// shape) is skipped. Lines may be split across chunks, so bytes are buffered
/// until a newline arrives; a trailing unterminated line is parsed when the
/// byte stream ends. Transport errors are yielded as `LlmError::StreamError`.
pub fn parse_sse_stream(
    byte_stream: Pin<Box<dyn Stream<Item = Result<Bytes, reqwest::Error>> + Send>>,
) -> Pin<Box<dyn Stream<Item = Result<ClaudeStreamEvent, LlmError>> + Send>> {
    let lines = split_lines(
        byte_stream.map(|chunk| chunk.map_err(|e| LlmError::StreamError(e.to_string()))),
    );

    Box::pin(lines.filter_map(|line| async move {
        match line {
            Ok(line) => parse_line(&line).map(Ok),
            Err(e) => Some(Err(e)),
        }
    }))
}

/// Reassemble complete lines from arbitrarily chunked bytes
fn split_lines<S>(byte_stream: S) -> impl Stream<Item = Result<String, LlmError>> + Send
where
    S: Stream<Item = Result<Bytes, LlmError>> + Send + 'static,
{
    async_stream::stream! {
        // Raw bytes so a multi-byte character split across chunks survives
        let mut buffer: Vec<u8> = Vec::new();
        let mut byte_stream = Box::pin(byte_stream);

        while let Some(chunk) = byte_stream.next().await {
            let chunk = match chunk {
                Ok(chunk) => chunk,
                Err(e) => {
                    yield Err(e);
                    return;
                }
            };

            buffer.extend_from_slice(&chunk);

            while let Some(newline) = buffer.iter().position(|b| *b == b'\n') {
                let line: Vec<u8> = buffer.drain(..=newline).collect();
                yield Ok(String::from_utf8_lossy(&line).into_owned());
            }
        }

        if !buffer.is_empty() {
            yield Ok(String::from_utf8_lossy(&buffer).into_owned());
        }
    }
}

/// Parse a single SSE line, returning `None` for anything without a usable payload
fn parse_line(line: &str) -> Option<ClaudeStreamEvent> {
    let data = line.trim().strip_prefix("data:")?.trim();

    if data.is_empty() {
        return None;
    }

    match serde_json::from_str::<ClaudeStreamEvent>(data) {
        Ok(event) => Some(event),
        Err(e) => {
            debug!(error = %e, data = %data, "Skipping malformed SSE payload");
            None
        }
    }
}

//! Upstream model layer
//!
//! This module talks to the Anthropic Messages API with extended thinking
//! enabled and normalizes its token stream into [`StreamEvent`] values.

pub mod claude;
pub mod config;
pub mod error;
pub mod provider;
pub mod translator;

// Re-export commonly used types
pub use config::GenerationConfig;
pub use error::LlmError;
pub use provider::{ClaudeEventStream, LlmProvider};
pub use translator::{StreamEvent, StreamTranslator, TurnBuffer, TurnMetadata};

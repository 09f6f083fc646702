//! Claude provider implementation
//!
//! This module provides a streaming client for the Anthropic Messages API.

pub mod client;
pub mod mapper;
pub mod sse;
pub mod types;

// Re-export commonly used types
pub use client::{ClaudeClient, DEFAULT_API_VERSION, DEFAULT_BASE_URL};

// HTTP Server modules
pub mod error;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod sse;

pub mod config;

// Turn orchestration and file-backed memory
pub mod conversation;
pub mod transcript;

// Upstream model API
pub mod llm;

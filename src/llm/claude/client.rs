//! Claude client implementation

use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

use crate::llm::error::LlmError;
use crate::llm::provider::{ClaudeEventStream, LlmProvider};

use super::sse::parse_sse_stream;
use super::types::MessagesRequest;

/// Public Anthropic API endpoint
pub const DEFAULT_BASE_URL: &str = "https://api.anthropic.com";

/// Protocol version sent in the `anthropic-version` header
pub const DEFAULT_API_VERSION: &str = "2023-06-01";

/// Client for the Anthropic Messages API
pub struct ClaudeClient {
    /// HTTP client for making requests
    http_client: Client,
    /// Secret sent in the `x-api-key` header
    api_key: String,
    /// Scheme and host, without trailing slash
    base_url: String,
    /// Value of the `anthropic-version` header
    api_version: String,
}

impl ClaudeClient {
    /// Create a new Claude client
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(
        api_key: impl Into<String>,
        base_url: impl Into<String>,
        api_version: impl Into<String>,
    ) -> Result<Self, LlmError> {
        let http_client = Client::builder()
            .connect_timeout(std::time::Duration::from_secs(5))
            .build()
            .map_err(|e| LlmError::HttpError {
                status: 0,
                body: format!("Failed to create HTTP client: {}", e),
            })?;

        Ok(Self {
            http_client,
            api_key: api_key.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_version: api_version.into(),
        })
    }

    /// Build the endpoint URL for streaming
    fn build_endpoint_url(&self) -> String {
        format!("{}/v1/messages", self.base_url)
    }
}

#[async_trait]
impl LlmProvider for ClaudeClient {
    async fn stream_messages(&self, request: MessagesRequest) -> Result<ClaudeEventStream, LlmError> {
        let url = self.build_endpoint_url();
        debug!(url = %url, model = %request.model, messages = request.messages.len(), "Sending streaming request");

        let response = self
            .http_client
            .post(&url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", &self.api_version)
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await?;

        // Check status
        let status = response.status();
        if status != reqwest::StatusCode::OK {
            let body = response.text().await.unwrap_or_default();
            return Err(LlmError::HttpError {
                status: status.as_u16(),
                body,
            });
        }

        Ok(parse_sse_stream(Box::pin(response.bytes_stream())))
    }
}

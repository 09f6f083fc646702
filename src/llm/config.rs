//! Generation configuration parameters

use serde::{Deserialize, Serialize};

/// Model used when none is configured
pub const DEFAULT_MODEL: &str = "claude-opus-4-20250514";

/// Parameters sent upstream with every turn
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GenerationConfig {
    /// Model identifier
    pub model: String,
    /// Maximum number of tokens to generate
    pub max_tokens: u32,
    /// Randomness (must be 1.0 while extended thinking is enabled)
    pub temperature: f32,
    /// Token budget for the thinking trace
    pub thinking_budget: u32,
    /// System prompt used when the caller supplies none
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_system_prompt: Option<String>,
}

impl GenerationConfig {
    /// Create a configuration for `model` with the remaining defaults
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            ..Self::default()
        }
    }

    /// Set the max tokens
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Set the temperature
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Set the thinking budget
    pub fn with_thinking_budget(mut self, thinking_budget: u32) -> Self {
        self.thinking_budget = thinking_budget;
        self
    }

    /// Set the fallback system prompt
    pub fn with_default_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.default_system_prompt = Some(prompt.into());
        self
    }

    /// Caller prompt if non-blank, otherwise the configured fallback
    pub fn resolve_system_prompt(&self, requested: Option<String>) -> Option<String> {
        requested
            .filter(|p| !p.trim().is_empty())
            .or_else(|| self.default_system_prompt.clone())
    }
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            max_tokens: 8192,
            temperature: 1.0,
            thinking_budget: 2048,
            default_system_prompt: None,
        }
    }
}

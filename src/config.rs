//! Command line and environment configuration

use std::net::{IpAddr, SocketAddr};
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use thiserror::Error;
use tracing::{info, warn};

use crate::llm::claude::{DEFAULT_API_VERSION, DEFAULT_BASE_URL};
use crate::llm::config::DEFAULT_MODEL;
use crate::llm::GenerationConfig;
use crate::transcript::DEFAULT_MAX_CONVERSATIONS;

/// File name of the backing store inside the data directory
pub const MEMORY_FILE_NAME: &str = "chat_memory.json";

#[derive(Parser, Debug, Clone)]
#[command(author, version, about = "Streaming chat relay with file-backed memory", long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Command>,

    // --- Upstream Args ---
    /// Anthropic API key (required to serve)
    #[arg(long, env = "ANTHROPIC_API_KEY", hide_env_values = true, global = true)]
    pub api_key: Option<String>,

    /// Base URL of the Anthropic API
    #[arg(long, env = "ANTHROPIC_BASE_URL", default_value = DEFAULT_BASE_URL, global = true)]
    pub base_url: String,

    /// Value of the anthropic-version header
    #[arg(long, env = "ANTHROPIC_VERSION", default_value = DEFAULT_API_VERSION, global = true)]
    pub api_version: String,

    /// Model identifier
    #[arg(long, env = "MODEL", default_value = DEFAULT_MODEL, global = true)]
    pub model: String,

    /// Maximum output tokens per turn
    #[arg(long, env = "MAX_TOKENS", default_value_t = 8192, global = true)]
    pub max_tokens: u32,

    /// Sampling temperature (0.0-1.0)
    #[arg(long, env = "TEMPERATURE", default_value_t = 1.0, global = true)]
    pub temperature: f32,

    /// Token budget for extended thinking
    #[arg(long, env = "THINKING_BUDGET", default_value_t = 2048, global = true)]
    pub thinking_budget: u32,

    /// File whose contents become the default system prompt, if it exists
    #[arg(long, env = "SYSTEM_PROMPT_FILE", default_value = "system-prompt-integrated.txt", global = true)]
    pub system_prompt_file: PathBuf,

    // --- Memory Args ---
    /// Directory holding the memory file
    #[arg(long, env = "DATA_DIR", default_value = "data", global = true)]
    pub data_dir: PathBuf,

    /// Memory file path (defaults to <DATA_DIR>/chat_memory.json)
    #[arg(long, env = "MEMORY_FILE", global = true)]
    pub memory_file: Option<PathBuf>,

    /// Maximum number of conversations kept
    #[arg(long, env = "MAX_MEMORY_SIZE", default_value_t = DEFAULT_MAX_CONVERSATIONS, global = true)]
    pub max_memory_size: usize,

    // --- Server Args ---
    /// Address to bind
    #[arg(long, env = "HOST", default_value = "0.0.0.0", global = true)]
    pub host: IpAddr,

    /// Port to listen on
    #[arg(short, long, env = "PORT", default_value_t = 8080, global = true)]
    pub port: u16,

    // --- Logging Args ---
    /// Log level used when RUST_LOG is not set
    #[arg(long, env = "LOG_LEVEL", default_value = "info", global = true)]
    pub log_level: String,

    /// Emit logs as JSON
    #[arg(long, env = "LOG_JSON", global = true)]
    pub log_json: bool,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Run the HTTP gateway (default)
    Serve,
    /// Reset the memory file to an empty store
    ClearMemory,
}

impl Args {
    /// Resolved memory file path
    pub fn memory_path(&self) -> PathBuf {
        self.memory_file
            .clone()
            .unwrap_or_else(|| self.data_dir.join(MEMORY_FILE_NAME))
    }
}

/// Errors that prevent the server from starting
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("ANTHROPIC_API_KEY environment variable not set")]
    MissingApiKey,

    #[error("Invalid value for {name}: {reason}")]
    InvalidValue { name: &'static str, reason: String },
}

/// Validated settings for serving traffic
#[derive(Debug, Clone)]
pub struct Config {
    pub api_key: String,
    pub base_url: String,
    pub api_version: String,
    pub generation: GenerationConfig,
    pub memory_file: PathBuf,
    pub max_conversations: usize,
    pub addr: SocketAddr,
}

impl Config {
    /// Validate `args`. The system prompt file is read separately by
    /// [`load_system_prompt`].
    pub fn from_args(args: &Args) -> Result<Self, ConfigError> {
        let api_key = args
            .api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
            .ok_or(ConfigError::MissingApiKey)?
            .to_string();

        if !(0.0..=1.0).contains(&args.temperature) {
            return Err(ConfigError::InvalidValue {
                name: "TEMPERATURE",
                reason: format!("{} is outside 0.0-1.0", args.temperature),
            });
        }
        if args.max_memory_size == 0 {
            return Err(ConfigError::InvalidValue {
                name: "MAX_MEMORY_SIZE",
                reason: "must be at least 1".to_string(),
            });
        }
        if args.thinking_budget >= args.max_tokens {
            return Err(ConfigError::InvalidValue {
                name: "THINKING_BUDGET",
                reason: format!("must be below MAX_TOKENS ({})", args.max_tokens),
            });
        }

        let generation = GenerationConfig::new(args.model.clone())
            .with_max_tokens(args.max_tokens)
            .with_temperature(args.temperature)
            .with_thinking_budget(args.thinking_budget);

        Ok(Self {
            api_key,
            base_url: args.base_url.clone(),
            api_version: args.api_version.clone(),
            generation,
            memory_file: args.memory_path(),
            max_conversations: args.max_memory_size,
            addr: SocketAddr::new(args.host, args.port),
        })
    }
}

/// Read the default system prompt, if the file exists and is not blank
pub async fn load_system_prompt(path: &Path) -> Option<String> {
    match tokio::fs::read_to_string(path).await {
        Ok(prompt) if !prompt.trim().is_empty() => {
            info!(path = %path.display(), "Loaded default system prompt");
            Some(prompt)
        }
        Ok(_) => None,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Failed to read system prompt file");
            None
        }
    }
}

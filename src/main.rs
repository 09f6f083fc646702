use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use chat_relay::config::{load_system_prompt, Args, Command, Config};
use chat_relay::conversation::ConversationService;
use chat_relay::llm::claude::ClaudeClient;
use chat_relay::routes::configure_routes;
use chat_relay::transcript::TranscriptStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();
    init_logging(&args);

    match args.command.clone().unwrap_or(Command::Serve) {
        Command::Serve => serve(&args).await,
        Command::ClearMemory => clear_memory(&args).await,
    }
}

fn init_logging(args: &Args) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("chat_relay={},warp=warn", args.log_level)));

    if args.log_json {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json())
            .try_init()
            .ok();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer())
            .try_init()
            .ok();
    }
}

async fn serve(args: &Args) -> anyhow::Result<()> {
    let mut config = Config::from_args(args).context("Refusing to start")?;

    if let Some(prompt) = load_system_prompt(&args.system_prompt_file).await {
        config.generation = config.generation.with_default_system_prompt(prompt);
    }

    let store = Arc::new(TranscriptStore::load(&config.memory_file, config.max_conversations).await);
    let client = ClaudeClient::new(
        config.api_key.clone(),
        config.base_url.clone(),
        config.api_version.clone(),
    )
    .context("Failed to build upstream client")?;

    let service = ConversationService::new(store.clone(), Arc::new(client), config.generation.clone());
    let routes = configure_routes(service);

    info!(addr = %config.addr, "Starting chat relay");
    info!(model = %config.generation.model, "Model");
    info!("Features: thinking mode, streaming (SSE), memory");
    info!("Endpoints: POST /chat, POST /chat/stream, GET /conversation/{{id}}, GET /health");

    tokio::select! {
        _ = warp::serve(routes).run(config.addr) => {}
        _ = shutdown_signal() => {
            info!("Shutdown signal received");
        }
    }

    if !store.flush().await {
        warn!(path = %store.path().display(), "Final memory flush failed");
    }
    Ok(())
}

/// Resolves on Ctrl-C, or on SIGTERM where supported
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
}

async fn clear_memory(args: &Args) -> anyhow::Result<()> {
    let store = TranscriptStore::load(args.memory_path(), args.max_memory_size).await;

    if !store.clear().await {
        anyhow::bail!("Failed to clear memory file {}", store.path().display());
    }

    info!(path = %store.path().display(), "Memory cleared");
    Ok(())
}

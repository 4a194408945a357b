//! CLI entrypoint for multichat
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

use anyhow::{Context, Result, anyhow};
use clap::Parser;
use multichat_application::{
    ChannelNotifier, ConversationLogger, LoadModelsUseCase, MessageActions, NoConversationLogger,
    PrepareAttachmentUseCase, SessionManager,
};
use multichat_infrastructure::{
    CommandClipboard, CommandSpeech, ConfigLoader, FileConfig, HttpModelCatalog,
    JsonlConversationLogger, LocalFileReader, WebSocketConnector,
};
use multichat_presentation::{ChatRepl, Cli, ReplConfig};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

const LOG_FILE_PREFIX: &str = "multichat.log";

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.show_config {
        ConfigLoader::print_config_sources(cli.config.as_deref());
        return Ok(());
    }

    let mut config = if cli.no_config {
        ConfigLoader::load_defaults()
    } else {
        ConfigLoader::load(cli.config.as_deref())
            .map_err(|e| anyhow!("Failed to load configuration: {}", e))?
    };
    apply_overrides(&mut config, &cli);
    config.validate()?;

    // Held until exit so buffered file logs are flushed
    let _log_guard = init_logging(cli.verbose, config.logging.log_dir.as_deref().map(Path::new));

    info!(api_url = %config.server.api_url, "Starting multichat");

    // === Dependency Injection ===
    let logger: Arc<dyn ConversationLogger> = match &config.logging.conversation_log {
        Some(path) => Arc::new(
            JsonlConversationLogger::open(path)
                .with_context(|| format!("Failed to open conversation log {}", path))?,
        ),
        None => Arc::new(NoConversationLogger),
    };

    let connector = WebSocketConnector::from_api_url(&config.server.api_url)?
        .with_open_timeout(Duration::from_secs(config.server.open_timeout_seconds));
    info!(endpoint = %connector.endpoint().base(), "Streaming endpoint");

    let (notifier, notifications) = ChannelNotifier::channel();
    let manager = SessionManager::new(
        config.sessions.to_session_config(),
        Arc::new(connector),
        Arc::new(notifier),
        logger,
    )?;

    let catalog = LoadModelsUseCase::new(Arc::new(HttpModelCatalog::new(&config.server.api_url)?));
    let attachments = PrepareAttachmentUseCase::new(Arc::new(LocalFileReader::new()));
    let actions = MessageActions::new(
        Arc::new(CommandClipboard::new(
            config.capabilities.clipboard_command.as_deref(),
        )),
        Arc::new(CommandSpeech::new(config.capabilities.speech_command.as_deref())),
    );

    let repl_config = ReplConfig::default()
        .with_progress(config.repl.show_progress)
        .with_history_file(config.repl.history_file.as_ref().map(PathBuf::from));

    ChatRepl::new(manager, attachments, actions, notifications)
        .with_catalog(catalog)
        .with_config(repl_config)
        .run()
        .await?;

    Ok(())
}

/// CLI flags take precedence over every configuration source.
fn apply_overrides(config: &mut FileConfig, cli: &Cli) {
    if let Some(api_url) = &cli.api_url {
        config.server.api_url = api_url.clone();
    }
    if let Some(max) = cli.max_sessions {
        config.sessions.max = max;
    }
    if let Some(initial) = cli.sessions {
        config.sessions.initial = initial;
    }
    if let Some(model) = &cli.model {
        config.sessions.default_model = model.clone();
    }
    if let Some(language) = &cli.language {
        config.sessions.language = language.clone();
    }
    if let Some(dir) = &cli.log_dir {
        config.logging.log_dir = Some(dir.display().to_string());
    }
    if let Some(path) = &cli.conversation_log {
        config.logging.conversation_log = Some(path.display().to_string());
    }
    if cli.quiet {
        config.repl.show_progress = false;
    }
}

/// Install the tracing subscriber. `RUST_LOG` wins over `-v`.
///
/// With a log directory, output goes to a daily-rotated file instead of
/// stderr so it does not interleave with the REPL.
fn init_logging(verbose: u8, log_dir: Option<&Path>) -> Option<WorkerGuard> {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace", // -vvv or more
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    match log_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, LOG_FILE_PREFIX);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_target(false)
                .with_ansi(false)
                .with_writer(writer)
                .init();
            Some(guard)
        }
        None => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_target(false)
                .with_writer(std::io::stderr)
                .init();
            None
        }
    }
}

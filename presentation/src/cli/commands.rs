//! CLI command definitions

use clap::Parser;
use std::path::PathBuf;

/// CLI arguments for multichat
#[derive(Parser, Debug)]
#[command(name = "multichat")]
#[command(author, version, about = "Chat with several LLMs side by side over streaming connections")]
#[command(long_about = r#"
multichat opens one streaming connection per chat session and sends every
question you type to all of them at once. Answers stream in token by token,
with time-to-first-token and tokens-per-second shown per session.

Configuration files are loaded from (in priority order):
1. --config <path>        Explicit config file
2. ./multichat.toml       Project-level config
3. ~/.config/multichat/config.toml   Global config
Environment variables (MULTICHAT_SECTION__KEY) override all files.

Example:
  multichat --api-url http://localhost:8000/api --sessions 2
  multichat --model granite-3.3-8b --language de
"#)]
pub struct Cli {
    /// HTTP base URL of the backend API (the WebSocket endpoint is derived from it)
    #[arg(long, value_name = "URL")]
    pub api_url: Option<String>,

    /// Number of sessions to open at startup
    #[arg(short, long, value_name = "N")]
    pub sessions: Option<usize>,

    /// Upper bound on concurrent sessions
    #[arg(long, value_name = "N")]
    pub max_sessions: Option<usize>,

    /// Default model for new sessions
    #[arg(short, long, value_name = "MODEL")]
    pub model: Option<String>,

    /// Conversation language code
    #[arg(short, long, value_name = "CODE")]
    pub language: Option<String>,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Replace progress spinners with plain status lines
    #[arg(short, long)]
    pub quiet: bool,

    /// Path to configuration file
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Disable loading of configuration files
    #[arg(long)]
    pub no_config: bool,

    /// Show configuration file locations and exit
    #[arg(long)]
    pub show_config: bool,

    /// Write diagnostic logs to daily files in this directory
    #[arg(long, value_name = "DIR")]
    pub log_dir: Option<PathBuf>,

    /// Append a JSON Lines transcript of session events to this file
    #[arg(long, value_name = "PATH")]
    pub conversation_log: Option<PathBuf>,
}

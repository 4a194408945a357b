//! Configuration file loading for multichat
//!
//! This module handles file I/O and merging of configuration from multiple sources.
//! The priority order (highest to lowest):
//!
//! 1. `MULTICHAT_*` environment variables
//! 2. `--config <path>` specified file
//! 3. Project root: `./multichat.toml` or `./.multichat.toml`
//! 4. XDG config: `$XDG_CONFIG_HOME/multichat/config.toml`
//! 5. Default values

mod file_config;
mod loader;

pub use file_config::{
    ConfigValidationError, FileCapabilitiesConfig, FileConfig, FileLoggingConfig, FileReplConfig,
    FileServerConfig, FileSessionsConfig,
};
pub use loader::ConfigLoader;

//! Clipboard and speech adapters backed by external commands.

mod command;

pub use command::{CommandClipboard, CommandSpeech, ExternalCommand};

//! Interactive chat module
//!
//! Provides a readline-based interactive front-end that fans every message
//! out to all open sessions.

mod command;
mod input;
mod repl;

pub use command::{CommandError, ReplCommand};
pub use repl::{ChatRepl, ReplError};

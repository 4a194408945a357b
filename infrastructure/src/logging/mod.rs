//! Structured conversation transcript.
//!
//! Provides [`JsonlConversationLogger`], which implements the
//! [`ConversationLogger`](multichat_application::ConversationLogger) port.

mod jsonl_logger;

pub use jsonl_logger::JsonlConversationLogger;

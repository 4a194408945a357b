//! Chat domain.
//!
//! - [`entities::Query`] / [`entities::Answer`] - the two kinds of conversation entry
//! - [`history::MessageHistory`] - ordered, append-only conversation log
//! - [`state::SessionState`] - explicit session state machine
//! - [`metrics::StreamMetrics`] - token count, TTFT and TPS for the current turn

pub mod entities;
pub mod history;
pub mod metrics;
pub mod state;

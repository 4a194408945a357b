//! Multi-session chat engine
//!
//! [`ChatSession`](chat_session::ChatSession) owns one streaming connection
//! and its conversation; [`SessionManager`](manager::SessionManager) owns the
//! sessions, fans user actions out to them and routes connection events back.

pub mod chat_session;
pub mod manager;
pub mod update;

#[cfg(test)]
pub(crate) mod testing;

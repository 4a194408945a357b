//! Wire protocol for the streaming query endpoint.
//!
//! # Protocol Overview
//!
//! - **Outbound** (client → server, one text frame per turn): an [`outbound::Envelope`]
//!   carrying the model name, the whole conversation and the query language.
//! - **Inbound** (server → client, one text frame per event):
//!   `{"type":"token","token":…}` or `{"type":"error","message":…}`.
//!
//! There is no end-of-answer frame.

pub mod inbound;
pub mod outbound;

//! Domain layer for multichat
//!
//! This crate contains the conversation entities, the session state machine,
//! streaming metrics and the wire codec. It has no dependencies on transport,
//! runtime or presentation concerns.
//!
//! # Core Concepts
//!
//! ## Turn
//!
//! A turn is one query/answer exchange. Answers stream in token by token and
//! are archived into the [`MessageHistory`] when the *next* query is sent,
//! because the streaming protocol has no end-of-answer frame.
//!
//! ## Envelope
//!
//! Every turn transmits the whole conversation: the [`protocol`] module turns a
//! [`MessageHistory`] into an [`Envelope`] and parses the inbound frames.

pub mod attachment;
pub mod chat;
pub mod core;
pub mod protocol;

// Re-export commonly used types
pub use attachment::{
    Attachment, AttachmentError, FileMetadata, MAX_ATTACHMENT_BYTES, encode_attachment,
    validate_files,
};
pub use chat::{
    entities::{Answer, MessageEntry, Query},
    history::MessageHistory,
    metrics::StreamMetrics,
    state::{InvalidTransition, SessionState, Transition},
};
pub use core::{
    model::{Model, ModelDescriptor},
    string::preview,
};
pub use protocol::{
    inbound::{InboundEvent, ProtocolError, decode_frame},
    outbound::{
        ContentPart, Envelope, ImageUrl, WireContent, WireMessage, WireRole, build_envelope,
        encode_entry,
    },
};

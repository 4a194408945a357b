//! Inbound frame parsing.

use serde::Deserialize;
use thiserror::Error;

/// A malformed inbound frame. The frame is dropped; the session carries on.
#[derive(Error, Debug)]
pub enum ProtocolError {
    #[error("Frame is not valid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("Frame is not a JSON object")]
    NotAnObject,

    #[error("Frame of type {kind:?} is missing its {field:?} field")]
    MissingField {
        kind: &'static str,
        field: &'static str,
    },
}

/// A decoded inbound event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboundEvent {
    /// One fragment of the streaming answer.
    Token(String),
    /// Advisory error reported by the backend.
    Error(String),
    /// Any other (or missing) `type`; ignored by sessions.
    Unrecognized(Option<String>),
}

#[derive(Debug, Deserialize)]
struct RawFrame {
    #[serde(rename = "type")]
    kind: Option<String>,
    token: Option<String>,
    message: Option<String>,
}

/// Decode one text frame.
pub fn decode_frame(text: &str) -> Result<InboundEvent, ProtocolError> {
    let value: serde_json::Value = serde_json::from_str(text)?;
    if !value.is_object() {
        return Err(ProtocolError::NotAnObject);
    }
    let frame: RawFrame = serde_json::from_value(value)?;

    match frame.kind.as_deref() {
        Some("token") => frame
            .token
            .map(InboundEvent::Token)
            .ok_or(ProtocolError::MissingField {
                kind: "token",
                field: "token",
            }),
        Some("error") => frame
            .message
            .map(InboundEvent::Error)
            .ok_or(ProtocolError::MissingField {
                kind: "error",
                field: "message",
            }),
        _ => Ok(InboundEvent::Unrecognized(frame.kind)),
    }
}

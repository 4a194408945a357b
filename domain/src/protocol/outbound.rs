//! Outbound envelope: history → JSON payload.

use crate::chat::entities::{Answer, MessageEntry, Query};
use crate::chat::history::MessageHistory;
use crate::core::model::Model;
use serde::{Deserialize, Serialize};

/// Chat message role on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WireRole {
    User,
    Assistant,
}

/// Image reference inside a multimodal user message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageUrl {
    pub url: String,
}

/// One part of a multimodal message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentPart {
    Text { text: String },
    ImageUrl { image_url: ImageUrl },
}

/// Message content: plain text, or `[text, image]` when a file is attached
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum WireContent {
    Text(String),
    Parts(Vec<ContentPart>),
}

/// Chat message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireMessage {
    pub role: WireRole,
    pub content: WireContent,
}

/// The payload sent on every turn
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope {
    pub model: Model,
    pub messages: Vec<WireMessage>,
    pub language: String,
}

impl Envelope {
    /// Serialize to the JSON text frame.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

fn encode_query(query: &Query) -> WireMessage {
    let content = match query.attachment() {
        Some(attachment) => WireContent::Parts(vec![
            ContentPart::Text {
                text: query.content().to_string(),
            },
            ContentPart::ImageUrl {
                image_url: ImageUrl {
                    url: attachment.encoded_payload().to_string(),
                },
            },
        ]),
        None => WireContent::Text(query.content().to_string()),
    };
    WireMessage {
        role: WireRole::User,
        content,
    }
}

fn encode_answer(answer: &Answer) -> Option<WireMessage> {
    if answer.is_empty() {
        return None;
    }
    Some(WireMessage {
        role: WireRole::Assistant,
        content: WireContent::Text(answer.content().to_string()),
    })
}

/// Encode one history entry. Empty answers encode to `None` and are left out.
pub fn encode_entry(entry: &MessageEntry) -> Option<WireMessage> {
    match entry {
        MessageEntry::Query(query) => Some(encode_query(query)),
        MessageEntry::Answer(answer) => encode_answer(answer),
    }
}

/// Build the envelope for a turn.
///
/// `history` must already contain the query being sent as its last entry.
pub fn build_envelope(model: &Model, history: &MessageHistory, language: &str) -> Envelope {
    Envelope {
        model: model.clone(),
        messages: history.iter().filter_map(encode_entry).collect(),
        language: language.to_string(),
    }
}

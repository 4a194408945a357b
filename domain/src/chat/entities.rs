//! Chat domain entities

use crate::attachment::Attachment;
use chrono::{DateTime, Utc};
use std::sync::Arc;

/// A user query (Value Object)
///
/// Immutable once built: every session receiving a broadcast keeps its own
/// clone, the attachment payload is shared behind an `Arc`.
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    content: String,
    language: String,
    timestamp: DateTime<Utc>,
    attachment: Option<Arc<Attachment>>,
}

impl Query {
    pub fn new(content: impl Into<String>, language: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            language: language.into(),
            timestamp: Utc::now(),
            attachment: None,
        }
    }

    pub fn with_attachment(mut self, attachment: impl Into<Arc<Attachment>>) -> Self {
        self.attachment = Some(attachment.into());
        self
    }

    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn attachment(&self) -> Option<&Attachment> {
        self.attachment.as_deref()
    }

    /// True when there is nothing to send: no text and no attachment.
    pub fn is_empty(&self) -> bool {
        self.content.is_empty() && self.attachment.is_none()
    }
}

/// A model answer
///
/// Grows token by token while its session is streaming. Once archived into a
/// [`MessageHistory`](super::history::MessageHistory) it is never touched again.
#[derive(Debug, Clone, PartialEq)]
pub struct Answer {
    content: String,
    timestamp: DateTime<Utc>,
    attachment: Option<Arc<Attachment>>,
}

impl Answer {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            timestamp: Utc::now(),
            attachment: None,
        }
    }

    /// An empty answer stamped now, the starting point of every turn.
    pub fn empty() -> Self {
        Self::new(String::new())
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn attachment(&self) -> Option<&Attachment> {
        self.attachment.as_deref()
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    /// Append one streamed token fragment.
    pub fn push_token(&mut self, token: &str) {
        self.content.push_str(token);
    }
}

/// One entry of the conversation log
///
/// The variant is fixed at construction.
#[derive(Debug, Clone, PartialEq)]
pub enum MessageEntry {
    Query(Query),
    Answer(Answer),
}

impl MessageEntry {
    pub fn content(&self) -> &str {
        match self {
            MessageEntry::Query(q) => q.content(),
            MessageEntry::Answer(a) => a.content(),
        }
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        match self {
            MessageEntry::Query(q) => q.timestamp(),
            MessageEntry::Answer(a) => a.timestamp(),
        }
    }

    pub fn attachment(&self) -> Option<&Attachment> {
        match self {
            MessageEntry::Query(q) => q.attachment(),
            MessageEntry::Answer(a) => a.attachment(),
        }
    }

    pub fn is_query(&self) -> bool {
        matches!(self, MessageEntry::Query(_))
    }
}

impl From<Query> for MessageEntry {
    fn from(query: Query) -> Self {
        MessageEntry::Query(query)
    }
}

impl From<Answer> for MessageEntry {
    fn from(answer: Answer) -> Self {
        MessageEntry::Answer(answer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_attachment() -> Attachment {
        crate::attachment::encode_attachment("cat.png", b"png", Some("image/png"))
    }

    #[test]
    fn test_empty_query_detection() {
        assert!(Query::new("", "en").is_empty());
        assert!(!Query::new("hi", "en").is_empty());
        assert!(!Query::new("", "en").with_attachment(sample_attachment()).is_empty());
    }

    #[test]
    fn test_answer_accumulates_tokens() {
        let mut answer = Answer::empty();
        assert!(answer.is_empty());
        answer.push_token("Hel");
        answer.push_token("lo");
        assert_eq!(answer.content(), "Hello");
    }

    #[test]
    fn test_entry_tag_is_stable() {
        let entry: MessageEntry = Query::new("q", "fr").into();
        assert!(entry.is_query());
        assert_eq!(entry.content(), "q");

        let entry: MessageEntry = Answer::new("a").into();
        assert!(!entry.is_query());
        assert!(entry.attachment().is_none());
    }

    #[test]
    fn test_query_attachment_is_shared() {
        let query = Query::new("look", "en").with_attachment(sample_attachment());
        let copy = query.clone();
        assert_eq!(
            copy.attachment().map(|a| a.file_name()),
            Some("cat.png")
        );
        assert_eq!(query, copy);
    }
}

//! Conversation log

use super::entities::{Answer, MessageEntry, Query};

/// Ordered, append-only log of conversation entries
///
/// Insertion order is conversation order. The only way to drop entries is
/// [`reset`](Self::reset), which replaces the whole log with a greeting.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MessageHistory {
    entries: Vec<MessageEntry>,
}

impl MessageHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// A log holding a single greeting answer.
    pub fn with_greeting(greeting: impl Into<String>) -> Self {
        Self {
            entries: vec![MessageEntry::Answer(Answer::new(greeting))],
        }
    }

    pub fn entries(&self) -> &[MessageEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&MessageEntry> {
        self.entries.get(index)
    }

    pub fn last(&self) -> Option<&MessageEntry> {
        self.entries.last()
    }

    pub fn push(&mut self, entry: impl Into<MessageEntry>) {
        self.entries.push(entry.into());
    }

    /// Archive a finished turn: the previous answer first, then the new query.
    pub fn push_turn(&mut self, previous_answer: Answer, query: Query) {
        self.entries.push(MessageEntry::Answer(previous_answer));
        self.entries.push(MessageEntry::Query(query));
    }

    /// Replace the log with a single greeting answer.
    pub fn reset(&mut self, greeting: impl Into<String>) {
        self.entries = vec![MessageEntry::Answer(Answer::new(greeting))];
    }

    pub fn iter(&self) -> std::slice::Iter<'_, MessageEntry> {
        self.entries.iter()
    }
}

impl<'a> IntoIterator for &'a MessageHistory {
    type Item = &'a MessageEntry;
    type IntoIter = std::slice::Iter<'a, MessageEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_turn_keeps_causal_order() {
        let mut history = MessageHistory::with_greeting("Hi");
        history.push_turn(Answer::new("previous"), Query::new("next", "en"));

        assert_eq!(history.len(), 3);
        assert!(!history.entries()[1].is_query());
        assert_eq!(history.entries()[1].content(), "previous");
        assert!(history.entries()[2].is_query());
    }

    #[test]
    fn test_reset_leaves_only_greeting() {
        let mut history = MessageHistory::with_greeting("Hi");
        history.push_turn(Answer::empty(), Query::new("one", "en"));
        history.push_turn(Answer::new("two"), Query::new("three", "en"));

        history.reset("Hello again");

        assert_eq!(history.len(), 1);
        match history.last() {
            Some(MessageEntry::Answer(a)) => assert_eq!(a.content(), "Hello again"),
            other => panic!("expected greeting answer, got {:?}", other),
        }
    }

    #[test]
    fn test_iteration_order() {
        let mut history = MessageHistory::new();
        history.push(Query::new("a", "en"));
        history.push(Answer::new("b"));
        let contents: Vec<&str> = history.iter().map(|e| e.content()).collect();
        assert_eq!(contents, vec!["a", "b"]);
    }
}

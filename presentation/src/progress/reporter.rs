//! Progress reporting for streaming sessions

use crate::output::console::ConsoleFormatter;
use colored::Colorize;
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use multichat_application::{ChatSession, SlotId};
use multichat_domain::preview;
use std::collections::HashMap;
use std::time::Duration;

const PREVIEW_WIDTH: usize = 48;

/// Receives stream lifecycle callbacks from the REPL
pub trait SessionProgress: Send {
    /// A query went out; a new answer starts streaming.
    fn on_query_sent(&mut self, session: &ChatSession);

    /// `first` is set on the first token of a turn.
    fn on_token(&mut self, session: &ChatSession, first: bool);

    /// The stream went quiet; the answer is considered complete.
    fn on_stream_idle(&mut self, session: &ChatSession);

    /// The session lost its connection mid-stream.
    fn on_stream_aborted(&mut self, slot: SlotId, reason: &str);

    /// Print a line without corrupting running spinners.
    fn println(&self, line: &str);
}

/// Reports streaming progress with one spinner per session
pub struct ProgressReporter {
    multi: MultiProgress,
    bars: HashMap<SlotId, ProgressBar>,
}

impl ProgressReporter {
    pub fn new() -> Self {
        Self {
            multi: MultiProgress::new(),
            bars: HashMap::new(),
        }
    }

    fn spinner_style() -> ProgressStyle {
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {prefix:.bold} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
    }

    fn status(session: &ChatSession) -> String {
        let tail = session
            .latest_answer_text()
            .map(|text| Self::tail(text, PREVIEW_WIDTH))
            .unwrap_or_default();
        format!(
            "{} · {} tokens · {}  {}",
            session.model().to_string().cyan(),
            session.metrics().token_count(),
            ConsoleFormatter::metrics(session.metrics()),
            tail.dimmed()
        )
    }

    /// Last `width` bytes of the flattened text, on a char boundary.
    fn tail(text: &str, width: usize) -> String {
        let flat = preview(text, usize::MAX);
        if flat.len() <= width {
            return flat;
        }
        let mut start = flat.len() - width;
        while !flat.is_char_boundary(start) {
            start += 1;
        }
        format!("...{}", &flat[start..])
    }
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionProgress for ProgressReporter {
    fn on_query_sent(&mut self, session: &ChatSession) {
        if let Some(old) = self.bars.remove(&session.slot()) {
            old.finish_and_clear();
        }

        let pb = self.multi.add(ProgressBar::new_spinner());
        pb.set_style(Self::spinner_style());
        pb.set_prefix(session.slot().to_string());
        pb.set_message(format!("{} waiting for first token...", session.model()));
        pb.enable_steady_tick(Duration::from_millis(120));
        self.bars.insert(session.slot(), pb);
    }

    fn on_token(&mut self, session: &ChatSession, _first: bool) {
        if let Some(pb) = self.bars.get(&session.slot()) {
            pb.set_message(Self::status(session));
        }
    }

    fn on_stream_idle(&mut self, session: &ChatSession) {
        if let Some(pb) = self.bars.remove(&session.slot()) {
            pb.finish_with_message(format!(
                "{} {} · {} tokens · {}",
                "v".green(),
                session.model(),
                session.metrics().token_count(),
                ConsoleFormatter::metrics(session.metrics())
            ));
        }
    }

    fn on_stream_aborted(&mut self, slot: SlotId, reason: &str) {
        if let Some(pb) = self.bars.remove(&slot) {
            pb.abandon_with_message(format!("{} {}", "x".red(), reason));
        }
    }

    fn println(&self, line: &str) {
        // A hidden target swallows lines, e.g. when stderr is not a terminal
        if self.bars.is_empty() || self.multi.is_hidden() || self.multi.println(line).is_err() {
            println!("{}", line);
        }
    }
}

/// Simple text-based progress (no fancy UI)
#[derive(Default)]
pub struct SimpleProgress;

impl SessionProgress for SimpleProgress {
    fn on_query_sent(&mut self, session: &ChatSession) {
        println!("{} {} {}", "->".cyan(), session.slot(), session.model());
    }

    fn on_token(&mut self, session: &ChatSession, first: bool) {
        if first {
            println!(
                "  {} {} first token after {:.2}s",
                "~".cyan(),
                session.slot(),
                session.metrics().time_to_first_token_seconds()
            );
        }
    }

    fn on_stream_idle(&mut self, session: &ChatSession) {
        println!(
            "  {} {} {} tokens · {}",
            "v".green(),
            session.slot(),
            session.metrics().token_count(),
            ConsoleFormatter::metrics(session.metrics())
        );
    }

    fn on_stream_aborted(&mut self, slot: SlotId, reason: &str) {
        println!("  {} {} {}", "x".red(), slot, reason);
    }

    fn println(&self, line: &str) {
        println!("{}", line);
    }
}

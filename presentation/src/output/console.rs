//! Console output formatting for sessions, histories and alerts

use colored::Colorize;
use multichat_application::{
    BroadcastReport, ChatSession, Notification, SessionManager, Severity, SlotId,
};
use multichat_domain::{Attachment, MessageEntry, ModelDescriptor, SessionState, StreamMetrics};

/// Formats engine state for console display
pub struct ConsoleFormatter;

impl ConsoleFormatter {
    /// `0.42s tft · 12.50 t/s`
    pub fn metrics(metrics: &StreamMetrics) -> String {
        format!(
            "{:.2}s tft · {:.2} t/s",
            metrics.time_to_first_token_seconds(),
            metrics.tokens_per_second()
        )
    }

    /// Slot, model and colored state, used as a prefix everywhere.
    pub fn session_label(session: &ChatSession) -> String {
        format!(
            "{} {} {}",
            session.slot().to_string().bold(),
            session.model().to_string().cyan(),
            Self::state(session.state())
        )
    }

    fn state(state: SessionState) -> String {
        let label = format!("[{}]", state.as_str());
        match state {
            SessionState::Connecting => label.yellow().to_string(),
            SessionState::Idle => label.green().to_string(),
            SessionState::Streaming => label.blue().to_string(),
            SessionState::Closed => label.red().to_string(),
        }
    }

    /// One line per session plus a summary header
    pub fn status(manager: &SessionManager) -> String {
        let mut output = format!(
            "{} {}/{} sessions · language {}\n",
            "Status:".cyan().bold(),
            manager.len(),
            manager.max_sessions(),
            manager.language()
        );
        for session in manager.sessions() {
            output.push_str(&format!(
                "  {} · {} messages · {} tokens · {}\n",
                Self::session_label(session),
                session.history().len(),
                session.metrics().token_count(),
                Self::metrics(session.metrics())
            ));
        }
        output
    }

    /// Full conversation of one session, including the answer in progress
    pub fn history(session: &ChatSession) -> String {
        let mut output = Self::header(&format!("Session {} · {}", session.slot(), session.model()));
        output.push('\n');

        for entry in session.history().iter() {
            output.push_str(&Self::entry(entry));
        }

        let pending = session.pending_answer();
        if !pending.is_empty() {
            output.push_str(&format!(
                "\n{} {}\n{}\n",
                "assistant".yellow().bold(),
                format!("({})", Self::metrics(session.metrics())).dimmed(),
                pending.content()
            ));
        }
        output
    }

    /// Latest answer of one session under its label
    pub fn answer(session: &ChatSession) -> String {
        format!(
            "\n{} {}\n{}\n",
            Self::session_label(session),
            format!("({})", Self::metrics(session.metrics())).dimmed(),
            session.latest_answer_text().unwrap_or_default()
        )
    }

    fn entry(entry: &MessageEntry) -> String {
        let role = match entry {
            MessageEntry::Query(_) => "you".green().bold(),
            MessageEntry::Answer(_) => "assistant".yellow().bold(),
        };
        let mut output = format!(
            "\n{} {}\n",
            role,
            entry.timestamp().format("%H:%M:%S").to_string().dimmed()
        );
        if !entry.content().is_empty() {
            output.push_str(entry.content());
            output.push('\n');
        }
        if let Some(attachment) = entry.attachment() {
            output.push_str(&format!("{}\n", Self::attachment(attachment)));
        }
        output
    }

    /// `[attachment: photo.png (image/png, 12.3 KiB)]`
    pub fn attachment(attachment: &Attachment) -> String {
        format!(
            "[attachment: {} ({}, {})]",
            attachment.file_name(),
            attachment.mime_type(),
            Self::size(attachment.size_bytes())
        )
    }

    fn size(bytes: u64) -> String {
        const KIB: f64 = 1024.0;
        let bytes_f = bytes as f64;
        if bytes_f < KIB {
            format!("{} B", bytes)
        } else if bytes_f < KIB * KIB {
            format!("{:.1} KiB", bytes_f / KIB)
        } else {
            format!("{:.1} MiB", bytes_f / (KIB * KIB))
        }
    }

    /// Alert line; errors in red, warnings in yellow.
    pub fn notification(notification: &Notification) -> String {
        let source = match (notification.slot, notification.model.as_deref()) {
            (Some(slot), Some(model)) => format!(" #{} ({})", slot, model),
            (Some(slot), None) => format!(" #{}", slot),
            _ => String::new(),
        };
        let text = format!(
            "{}{}: {}",
            notification.severity.as_str(),
            source,
            notification.message
        );
        match notification.severity {
            Severity::Error => format!("{} {}", "x".red(), text.red()),
            Severity::Warning => format!("{} {}", "!".yellow(), text.yellow()),
            Severity::Info => format!("{} {}", "-".cyan(), text),
        }
    }

    /// Summary of a broadcast: who got the query and who did not.
    pub fn broadcast(report: &BroadcastReport) -> String {
        let mut output = String::new();
        if !report.sent.is_empty() {
            output.push_str(&format!(
                "{} sent to {}\n",
                "->".cyan(),
                Self::slots(&report.sent)
            ));
        }
        for (slot, reason) in &report.skipped {
            output.push_str(&format!("  {} {} skipped: {}\n", "-".yellow(), slot, reason));
        }
        for (slot, error) in &report.failed {
            output.push_str(&format!("  {} {} failed: {}\n", "x".red(), slot, error));
        }
        if output.is_empty() {
            output.push_str(&format!("{} no sessions\n", "!".yellow()));
        }
        output
    }

    fn slots(slots: &[SlotId]) -> String {
        slots
            .iter()
            .map(|slot| slot.to_string())
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Catalog listing with each session's current selection
    pub fn models(models: &[ModelDescriptor], manager: &SessionManager) -> String {
        if models.is_empty() {
            return format!("{} no models loaded\n", "!".yellow());
        }
        let mut output = format!("{}\n", "Available models:".cyan().bold());
        for descriptor in models {
            let users: Vec<String> = manager
                .sessions()
                .iter()
                .filter(|session| session.model().as_str() == descriptor.name)
                .map(|session| session.slot().to_string())
                .collect();
            if users.is_empty() {
                output.push_str(&format!("  - {}\n", descriptor.name));
            } else {
                output.push_str(&format!(
                    "  - {} {}\n",
                    descriptor.name,
                    format!("({})", users.join(", ")).dimmed()
                ));
            }
        }
        output
    }

    pub fn help() -> String {
        let commands = [
            ("<text>", "Send to every connected session"),
            ("/add", "Open another session"),
            ("/remove", "Close the most recent session"),
            ("/reset", "Clear every conversation"),
            ("/attach <path>", "Stage a file for the next message"),
            ("/detach", "Drop the staged file"),
            ("/send", "Send the staged file without text (or press Enter)"),
            ("/model <slot> <name>", "Select the model of a session"),
            ("/models", "List available models"),
            ("/lang <code>", "Change language (clears conversations)"),
            ("/show [slot]", "Print a conversation"),
            ("/copy <slot>", "Copy the latest answer"),
            ("/say <slot>", "Read the latest answer aloud"),
            ("/status", "Show all sessions"),
            ("/help", "Show this help"),
            ("/quit", "Exit"),
        ];
        let mut output = format!("{}\n", "Commands:".cyan().bold());
        for (usage, description) in commands {
            output.push_str(&format!("  {:<22} {}\n", usage, description));
        }
        output
    }

    fn header(title: &str) -> String {
        let line = "=".repeat(60);
        format!("{}\n{}\n{}", line.cyan(), title.cyan().bold(), line.cyan())
    }
}

//! REPL (Read-Eval-Print Loop) for interactive multi-session chat
//!
//! One task drives everything: input lines, session updates from the
//! [`SessionManager`] event pump and alerts from the notifier channel are
//! multiplexed with `tokio::select!`.

use super::command::ReplCommand;
use super::input::{InputEvent, LineReader};
use crate::config::ReplConfig;
use crate::output::console::ConsoleFormatter;
use crate::progress::reporter::{ProgressReporter, SessionProgress, SimpleProgress};
use colored::Colorize;
use multichat_application::{
    LoadModelsUseCase, MessageActions, Notification, PrepareAttachmentUseCase, SessionManager,
    SessionUpdate, SlotId,
};
use multichat_domain::{Attachment, Model, Query};
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::mpsc;
use tracing::debug;

#[derive(Debug, Error)]
pub enum ReplError {
    #[error("Failed to start line editor: {0}")]
    Spawn(#[from] std::io::Error),

    #[error("Line editor failed: {0}")]
    Input(String),
}

enum Flow {
    Continue,
    Quit,
}

/// Interactive chat REPL
pub struct ChatRepl {
    manager: SessionManager,
    attachments: PrepareAttachmentUseCase,
    actions: MessageActions,
    catalog: Option<LoadModelsUseCase>,
    notifications: mpsc::UnboundedReceiver<Notification>,
    progress: Box<dyn SessionProgress>,
    config: ReplConfig,
    staged: Option<Arc<Attachment>>,
}

impl ChatRepl {
    /// Create a new ChatRepl
    ///
    /// `notifications` is the receiving end of the notifier the manager's
    /// sessions report into.
    pub fn new(
        manager: SessionManager,
        attachments: PrepareAttachmentUseCase,
        actions: MessageActions,
        notifications: mpsc::UnboundedReceiver<Notification>,
    ) -> Self {
        let config = ReplConfig::default();
        Self {
            manager,
            attachments,
            actions,
            catalog: None,
            notifications,
            progress: Self::progress_for(&config),
            config,
            staged: None,
        }
    }

    /// Load the model catalog at startup and on `/models`
    pub fn with_catalog(mut self, catalog: LoadModelsUseCase) -> Self {
        self.catalog = Some(catalog);
        self
    }

    pub fn with_config(mut self, config: ReplConfig) -> Self {
        self.progress = Self::progress_for(&config);
        self.config = config;
        self
    }

    fn progress_for(config: &ReplConfig) -> Box<dyn SessionProgress> {
        if config.show_progress {
            Box::new(ProgressReporter::new())
        } else {
            Box::new(SimpleProgress)
        }
    }

    /// Run the interactive REPL until `/quit` or end of input
    pub async fn run(mut self) -> Result<(), ReplError> {
        self.print_welcome();
        self.refresh_models().await;

        let mut input = LineReader::spawn(self.config.history_path())?;
        let mut result = Ok(());

        loop {
            tokio::select! {
                event = input.next() => {
                    let Some(event) = event else {
                        break;
                    };
                    match event {
                        InputEvent::Line(line) => {
                            if let Flow::Quit = self.handle_line(&line).await {
                                println!("Bye!");
                                break;
                            }
                        }
                        InputEvent::Interrupted => println!("^C"),
                        InputEvent::Eof => {
                            println!("Bye!");
                            break;
                        }
                        InputEvent::Failed(message) => {
                            result = Err(ReplError::Input(message));
                            break;
                        }
                    }
                    input.ready();
                }

                Some(update) = self.manager.next_update() => {
                    self.on_update(update);
                }

                Some(notification) = self.notifications.recv() => {
                    self.progress.println(&ConsoleFormatter::notification(&notification));
                }
            }
        }

        self.manager.shutdown();
        input.finish().await;
        result
    }

    fn print_welcome(&self) {
        println!();
        println!("╭─────────────────────────────────────────────╮");
        println!("│              multichat - Chat Mode          │");
        println!("╰─────────────────────────────────────────────╯");
        println!();
        println!(
            "Sessions: {} of {} · language {}",
            self.manager.len(),
            self.manager.max_sessions(),
            self.manager.language()
        );
        println!("Type a message to send it to every session, /help for commands.");
        println!();
    }

    // ==================== Input ====================

    async fn handle_line(&mut self, line: &str) -> Flow {
        let command = match ReplCommand::parse(line) {
            // Enter on a blank line sends a staged file on its own
            None if self.staged.is_some() => ReplCommand::Send,
            None => return Flow::Continue,
            Some(Ok(command)) => command,
            Some(Err(e)) => {
                self.warn(e.to_string());
                return Flow::Continue;
            }
        };

        match command {
            ReplCommand::Query(text) => self.send_query(text),
            ReplCommand::Add => self.add_session(),
            ReplCommand::Remove => self.remove_session(),
            ReplCommand::Reset => {
                self.manager.reset_all();
                self.info("All conversations cleared");
            }
            ReplCommand::Attach(paths) => self.attach(&paths).await,
            ReplCommand::Send => {
                if self.staged.is_some() {
                    self.send_query(String::new());
                } else {
                    self.warn("No file is staged; type a message to send text");
                }
            }
            ReplCommand::Detach => match self.staged.take() {
                Some(attachment) => self.info(format!("Dropped {}", attachment.file_name())),
                None => self.warn("No file is staged"),
            },
            ReplCommand::Model { slot, name } => {
                let model = Model::new(name);
                if self.manager.select_model(slot, model.clone()) {
                    self.info(format!("{} now uses {}", slot, model));
                } else {
                    self.warn(format!("No session {}", slot));
                }
            }
            ReplCommand::Models => {
                self.refresh_models().await;
                self.progress.println(
                    ConsoleFormatter::models(self.manager.available_models(), &self.manager)
                        .trim_end(),
                );
            }
            ReplCommand::Language(code) => {
                if self.manager.change_language(code.clone()) {
                    self.info(format!("Language set to {}; conversations cleared", code));
                } else {
                    self.info(format!("Language is already {}", code));
                }
            }
            ReplCommand::Show(slot) => self.show(slot),
            ReplCommand::Copy(slot) => self.copy(slot).await,
            ReplCommand::Say(slot) => self.say(slot).await,
            ReplCommand::Status => self
                .progress
                .println(ConsoleFormatter::status(&self.manager).trim_end()),
            ReplCommand::Help => self.progress.println(ConsoleFormatter::help().trim_end()),
            ReplCommand::Quit => return Flow::Quit,
        }
        Flow::Continue
    }

    fn send_query(&mut self, text: String) {
        let mut query = Query::new(text, self.manager.language());
        if let Some(attachment) = self.staged.clone() {
            query = query.with_attachment(attachment);
        }

        let report = self.manager.broadcast_query(&query);
        for slot in &report.sent {
            if let Some(session) = self.manager.session(*slot) {
                self.progress.on_query_sent(session);
            }
        }
        // Keep the file staged when no session took it
        if !report.is_empty() {
            self.staged = None;
        }
        self.progress
            .println(ConsoleFormatter::broadcast(&report).trim_end());
    }

    fn add_session(&mut self) {
        match self.manager.add_session() {
            Ok(Some(slot)) => self.info(format!("Opening session {}", slot)),
            Ok(None) => self.warn(format!(
                "Already at the maximum of {} sessions",
                self.manager.max_sessions()
            )),
            Err(e) => self.error(format!("Could not open a session: {}", e)),
        }
    }

    fn remove_session(&mut self) {
        match self.manager.remove_session() {
            Some(slot) => {
                self.progress.on_stream_aborted(slot, "removed");
                self.info(format!("Closed session {}", slot));
            }
            None => self.warn("The last session cannot be removed"),
        }
    }

    async fn attach(&mut self, paths: &[PathBuf]) {
        match self.attachments.execute(paths).await {
            Ok(attachment) => {
                self.info(format!(
                    "Staged {} for the next message",
                    ConsoleFormatter::attachment(&attachment)
                ));
                self.staged = Some(Arc::new(attachment));
            }
            Err(e) => self.error(e.to_string()),
        }
    }

    async fn refresh_models(&mut self) {
        let Some(catalog) = &self.catalog else {
            return;
        };
        match catalog.execute(&mut self.manager).await {
            Ok(count) => debug!(count, "Model catalog refreshed"),
            Err(e) => self.warn(format!("Could not load models: {}", e)),
        }
    }

    fn show(&self, slot: Option<SlotId>) {
        match slot {
            Some(slot) => match self.manager.session(slot) {
                Some(session) => self.progress.println(&ConsoleFormatter::history(session)),
                None => self.warn(format!("No session {}", slot)),
            },
            None => {
                for session in self.manager.sessions() {
                    self.progress.println(&ConsoleFormatter::history(session));
                }
            }
        }
    }

    async fn copy(&self, slot: SlotId) {
        let Some(text) = self.answer_text(slot) else {
            return;
        };
        match self.actions.copy(&text).await {
            Ok(()) => self.info(format!("Copied the answer of {}", slot)),
            Err(e) => self.error(e.to_string()),
        }
    }

    async fn say(&self, slot: SlotId) {
        let Some(text) = self.answer_text(slot) else {
            return;
        };
        match self.actions.speak(&text, self.manager.language()).await {
            Ok(()) => {}
            Err(e) => self.error(e.to_string()),
        }
    }

    fn answer_text(&self, slot: SlotId) -> Option<String> {
        let Some(session) = self.manager.session(slot) else {
            self.warn(format!("No session {}", slot));
            return None;
        };
        match session.latest_answer_text() {
            Some(text) => Some(text.to_string()),
            None => {
                self.warn(format!("{} has no answer yet", slot));
                None
            }
        }
    }

    // ==================== Session Updates ====================

    fn on_update(&mut self, update: SessionUpdate) {
        match update {
            SessionUpdate::Connected { slot } => {
                if let Some(session) = self.manager.session(slot) {
                    self.progress.println(&format!(
                        "{} {} connected",
                        "+".green(),
                        ConsoleFormatter::session_label(session)
                    ));
                }
            }
            SessionUpdate::Token {
                slot,
                scroll_into_view,
            } => {
                if let Some(session) = self.manager.session(slot) {
                    self.progress.on_token(session, scroll_into_view);
                }
            }
            SessionUpdate::BackendError { slot, message } => {
                // The alert itself arrives through the notifier
                debug!(slot = %slot, "Backend error shown as alert: {}", message);
            }
            SessionUpdate::StreamIdle { slot } => {
                if let Some(session) = self.manager.session(slot) {
                    self.progress.on_stream_idle(session);
                    self.progress.println(&ConsoleFormatter::answer(session));
                }
            }
            SessionUpdate::Disconnected { slot, reason } => {
                let reason = reason.unwrap_or_else(|| "connection closed".to_string());
                self.progress.on_stream_aborted(slot, &reason);
                self.error(format!("{} disconnected: {}", slot, reason));
            }
        }
    }

    // ==================== Messages ====================

    fn info(&self, message: impl AsRef<str>) {
        self.progress
            .println(&format!("{} {}", "-".cyan(), message.as_ref()));
    }

    fn warn(&self, message: impl AsRef<str>) {
        self.progress
            .println(&format!("{} {}", "!".yellow(), message.as_ref().yellow()));
    }

    fn error(&self, message: impl AsRef<str>) {
        self.progress
            .println(&format!("{} {}", "x".red(), message.as_ref().red()));
    }
}

//! Line editor thread
//!
//! rustyline blocks, so it runs on its own thread and hands lines to the
//! async REPL over a channel. After each line the thread waits for
//! [`LineReader::ready`] before prompting again, so command output lands
//! above the next prompt instead of through it.

use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use std::path::PathBuf;
use std::sync::mpsc as std_mpsc;
use std::thread::JoinHandle;
use tokio::sync::mpsc;
use tracing::debug;

const PROMPT: &str = ">>> ";

/// What the line editor produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputEvent {
    Line(String),
    /// Ctrl-C
    Interrupted,
    /// Ctrl-D
    Eof,
    Failed(String),
}

/// Async handle to the line editor thread
pub struct LineReader {
    lines: mpsc::Receiver<InputEvent>,
    ready: Option<std_mpsc::Sender<()>>,
    thread: Option<JoinHandle<()>>,
}

impl LineReader {
    /// Start the editor thread, loading history from `history` if given.
    pub fn spawn(history: Option<PathBuf>) -> std::io::Result<Self> {
        let (lines_tx, lines_rx) = mpsc::channel(1);
        let (ready_tx, ready_rx) = std_mpsc::channel();

        let thread = std::thread::Builder::new()
            .name("multichat-input".to_string())
            .spawn(move || read_lines(history, lines_tx, ready_rx))?;

        Ok(Self {
            lines: lines_rx,
            ready: Some(ready_tx),
            thread: Some(thread),
        })
    }

    /// Next input event; `None` once the thread has stopped.
    pub async fn next(&mut self) -> Option<InputEvent> {
        self.lines.recv().await
    }

    /// Let the editor show the next prompt.
    pub fn ready(&self) {
        if let Some(ready) = &self.ready {
            // Thread already gone after Eof
            let _ = ready.send(());
        }
    }

    /// Stop the thread and wait for it to save history.
    pub async fn finish(mut self) {
        self.ready.take();
        self.lines.close();
        if let Some(thread) = self.thread.take() {
            let _ = tokio::task::spawn_blocking(move || thread.join()).await;
        }
    }
}

fn read_lines(
    history: Option<PathBuf>,
    lines: mpsc::Sender<InputEvent>,
    ready: std_mpsc::Receiver<()>,
) {
    let mut editor = match DefaultEditor::new() {
        Ok(editor) => editor,
        Err(e) => {
            let _ = lines.blocking_send(InputEvent::Failed(e.to_string()));
            return;
        }
    };

    if let Some(ref path) = history {
        if let Some(parent) = path.parent() {
            let _ = std::fs::create_dir_all(parent);
        }
        let _ = editor.load_history(path);
    }

    loop {
        let event = match editor.readline(PROMPT) {
            Ok(line) => {
                let trimmed = line.trim();
                if !trimmed.is_empty() {
                    let _ = editor.add_history_entry(trimmed);
                }
                InputEvent::Line(line)
            }
            Err(ReadlineError::Interrupted) => InputEvent::Interrupted,
            Err(ReadlineError::Eof) => InputEvent::Eof,
            Err(e) => InputEvent::Failed(e.to_string()),
        };

        let last = matches!(event, InputEvent::Eof | InputEvent::Failed(_));
        if lines.blocking_send(event).is_err() || last {
            break;
        }
        if ready.recv().is_err() {
            break;
        }
    }

    if let Some(ref path) = history
        && let Err(e) = editor.save_history(path)
    {
        debug!("Failed to save history to {}: {}", path.display(), e);
    }
}

//! Pipe text into an external program.
//!
//! Commands are split on whitespace and executed directly (no shell), with
//! the text written to stdin. `{lang}` in an argument is replaced by the
//! language code.

use async_trait::async_trait;
use multichat_application::{CapabilityError, ClipboardWriter, TextToSpeech};
use std::io::ErrorKind;
use std::process::Stdio;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::debug;

const CLIPBOARD_CANDIDATES: [&str; 3] = ["wl-copy", "pbcopy", "xclip -selection clipboard"];
const SPEECH_CANDIDATES: [&str; 3] = ["espeak-ng -v {lang}", "espeak -v {lang}", "say"];

/// A program plus arguments, resolved on `PATH`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalCommand {
    program: String,
    args: Vec<String>,
}

impl ExternalCommand {
    /// Parse a command line; `None` if empty.
    pub fn parse(command_line: &str) -> Option<Self> {
        let mut parts = command_line.split_whitespace().map(str::to_string);
        let program = parts.next()?;
        Some(Self {
            program,
            args: parts.collect(),
        })
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn is_available(&self) -> bool {
        which::which(&self.program).is_ok()
    }

    /// First candidate whose program is installed.
    fn detect(candidates: &[&str]) -> Option<Self> {
        candidates
            .iter()
            .filter_map(|line| Self::parse(line))
            .find(Self::is_available)
    }

    fn args_for(&self, language: &str) -> Vec<String> {
        self.args
            .iter()
            .map(|arg| arg.replace("{lang}", language))
            .collect()
    }

    /// Run the command with `input` on stdin and wait for it to exit.
    pub async fn run_with_input(&self, input: &str, language: &str) -> Result<(), CapabilityError> {
        debug!(program = %self.program, "Running capability command");
        let mut child = Command::new(&self.program)
            .args(self.args_for(language))
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()?;

        if let Some(mut stdin) = child.stdin.take() {
            // A program may exit without reading; its exit status decides
            match stdin.write_all(input.as_bytes()).await {
                Err(e) if e.kind() != ErrorKind::BrokenPipe => return Err(e.into()),
                _ => {}
            }
            // dropping stdin sends EOF
        }

        let output = child.wait_with_output().await?;
        if output.status.success() {
            Ok(())
        } else {
            Err(CapabilityError::CommandFailed {
                command: self.program.clone(),
                message: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            })
        }
    }
}

/// Resolve a configured command, or auto-detect one from `candidates`.
fn resolve(configured: Option<&str>, candidates: &[&str]) -> Option<ExternalCommand> {
    match configured {
        Some(line) => ExternalCommand::parse(line),
        None => ExternalCommand::detect(candidates),
    }
}

/// Clipboard writes through `wl-copy`, `pbcopy`, `xclip` or a configured command
pub struct CommandClipboard {
    command: Option<ExternalCommand>,
}

impl CommandClipboard {
    pub fn new(configured: Option<&str>) -> Self {
        Self {
            command: resolve(configured, &CLIPBOARD_CANDIDATES),
        }
    }

    pub fn command(&self) -> Option<&ExternalCommand> {
        self.command.as_ref()
    }
}

#[async_trait]
impl ClipboardWriter for CommandClipboard {
    fn is_available(&self) -> bool {
        self.command.as_ref().is_some_and(ExternalCommand::is_available)
    }

    async fn write_text(&self, text: &str) -> Result<(), CapabilityError> {
        let command = self
            .command
            .as_ref()
            .ok_or_else(|| CapabilityError::Unavailable("clipboard".to_string()))?;
        command.run_with_input(text, "").await
    }
}

/// Speech through `espeak-ng`, `espeak`, `say` or a configured command
pub struct CommandSpeech {
    command: Option<ExternalCommand>,
}

impl CommandSpeech {
    pub fn new(configured: Option<&str>) -> Self {
        Self {
            command: resolve(configured, &SPEECH_CANDIDATES),
        }
    }

    pub fn command(&self) -> Option<&ExternalCommand> {
        self.command.as_ref()
    }
}

#[async_trait]
impl TextToSpeech for CommandSpeech {
    fn is_available(&self) -> bool {
        self.command.as_ref().is_some_and(ExternalCommand::is_available)
    }

    async fn speak(&self, text: &str, language: &str) -> Result<(), CapabilityError> {
        let command = self
            .command
            .as_ref()
            .ok_or_else(|| CapabilityError::Unavailable("speech".to_string()))?;
        command.run_with_input(text, language).await
    }
}

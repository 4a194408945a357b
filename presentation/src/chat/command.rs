//! REPL input parsing

use multichat_application::SlotId;
use std::path::PathBuf;
use thiserror::Error;

/// One line of user input, parsed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplCommand {
    /// Plain text, broadcast to every session.
    Query(String),
    Add,
    Remove,
    Reset,
    /// Every whitespace-separated path; the attachment rules decide.
    Attach(Vec<PathBuf>),
    Detach,
    /// Send the staged file without text.
    Send,
    Model { slot: SlotId, name: String },
    Models,
    Language(String),
    Show(Option<SlotId>),
    Copy(SlotId),
    Say(SlotId),
    Status,
    Help,
    Quit,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommandError {
    #[error("Unknown command: {0} (type /help for available commands)")]
    Unknown(String),

    #[error("Usage: {0}")]
    Usage(&'static str),

    #[error("Invalid slot '{0}': slots are numbered from 1")]
    InvalidSlot(String),
}

impl ReplCommand {
    /// Parse a trimmed input line. `None` for blank input.
    pub fn parse(line: &str) -> Option<Result<Self, CommandError>> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }
        if !line.starts_with('/') {
            return Some(Ok(ReplCommand::Query(line.to_string())));
        }

        let (name, rest) = match line.split_once(char::is_whitespace) {
            Some((name, rest)) => (name, rest.trim()),
            None => (line, ""),
        };

        Some(Self::parse_command(name, rest))
    }

    fn parse_command(name: &str, rest: &str) -> Result<Self, CommandError> {
        match name {
            "/quit" | "/exit" | "/q" => Ok(ReplCommand::Quit),
            "/help" | "/h" | "/?" => Ok(ReplCommand::Help),
            "/add" => Ok(ReplCommand::Add),
            "/remove" => Ok(ReplCommand::Remove),
            "/reset" => Ok(ReplCommand::Reset),
            "/detach" => Ok(ReplCommand::Detach),
            "/send" => Ok(ReplCommand::Send),
            "/models" => Ok(ReplCommand::Models),
            "/status" => Ok(ReplCommand::Status),
            "/attach" => {
                let paths: Vec<PathBuf> = rest.split_whitespace().map(PathBuf::from).collect();
                if paths.is_empty() {
                    return Err(CommandError::Usage("/attach <path>"));
                }
                Ok(ReplCommand::Attach(paths))
            }
            "/model" => {
                let (slot, model) = rest
                    .split_once(char::is_whitespace)
                    .ok_or(CommandError::Usage("/model <slot> <name>"))?;
                Ok(ReplCommand::Model {
                    slot: parse_slot(slot)?,
                    name: model.trim().to_string(),
                })
            }
            "/lang" => {
                if rest.is_empty() || rest.contains(char::is_whitespace) {
                    return Err(CommandError::Usage("/lang <code>"));
                }
                Ok(ReplCommand::Language(rest.to_string()))
            }
            "/show" => {
                if rest.is_empty() {
                    Ok(ReplCommand::Show(None))
                } else {
                    Ok(ReplCommand::Show(Some(parse_slot(rest)?)))
                }
            }
            "/copy" => {
                if rest.is_empty() {
                    return Err(CommandError::Usage("/copy <slot>"));
                }
                Ok(ReplCommand::Copy(parse_slot(rest)?))
            }
            "/say" => {
                if rest.is_empty() {
                    return Err(CommandError::Usage("/say <slot>"));
                }
                Ok(ReplCommand::Say(parse_slot(rest)?))
            }
            other => Err(CommandError::Unknown(other.to_string())),
        }
    }
}

/// Slots are typed 1-based, optionally with a leading `#`.
fn parse_slot(text: &str) -> Result<SlotId, CommandError> {
    let trimmed = text.trim();
    trimmed
        .trim_start_matches('#')
        .parse::<usize>()
        .ok()
        .and_then(SlotId::from_number)
        .ok_or_else(|| CommandError::InvalidSlot(trimmed.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(line: &str) -> Result<ReplCommand, CommandError> {
        ReplCommand::parse(line).expect("non-blank input")
    }

    #[test]
    fn test_blank_input_is_ignored() {
        assert!(ReplCommand::parse("").is_none());
        assert!(ReplCommand::parse("   \t").is_none());
    }

    #[test]
    fn test_plain_text_is_a_query() {
        assert_eq!(
            parse("  what is rust?  "),
            Ok(ReplCommand::Query("what is rust?".to_string()))
        );
    }

    #[test]
    fn test_simple_commands_and_aliases() {
        assert_eq!(parse("/add"), Ok(ReplCommand::Add));
        assert_eq!(parse("/remove"), Ok(ReplCommand::Remove));
        assert_eq!(parse("/reset"), Ok(ReplCommand::Reset));
        assert_eq!(parse("/detach"), Ok(ReplCommand::Detach));
        assert_eq!(parse("/send"), Ok(ReplCommand::Send));
        assert_eq!(parse("/models"), Ok(ReplCommand::Models));
        assert_eq!(parse("/status"), Ok(ReplCommand::Status));
        assert_eq!(parse("/h"), Ok(ReplCommand::Help));
        assert_eq!(parse("/exit"), Ok(ReplCommand::Quit));
    }

    #[test]
    fn test_model_takes_slot_and_name() {
        assert_eq!(
            parse("/model 2 granite-3.3-8b"),
            Ok(ReplCommand::Model {
                slot: SlotId(1),
                name: "granite-3.3-8b".to_string()
            })
        );
        assert_eq!(
            parse("/model #1 llama"),
            Ok(ReplCommand::Model {
                slot: SlotId(0),
                name: "llama".to_string()
            })
        );
        assert_eq!(
            parse("/model 2"),
            Err(CommandError::Usage("/model <slot> <name>"))
        );
    }

    #[test]
    fn test_slot_zero_is_invalid() {
        assert_eq!(
            parse("/copy 0"),
            Err(CommandError::InvalidSlot("0".to_string()))
        );
        assert_eq!(
            parse("/say two"),
            Err(CommandError::InvalidSlot("two".to_string()))
        );
    }

    #[test]
    fn test_show_with_and_without_slot() {
        assert_eq!(parse("/show"), Ok(ReplCommand::Show(None)));
        assert_eq!(parse("/show 3"), Ok(ReplCommand::Show(Some(SlotId(2)))));
    }

    #[test]
    fn test_attach_collects_every_path() {
        assert_eq!(
            parse("/attach a.png b.png"),
            Ok(ReplCommand::Attach(vec![
                PathBuf::from("a.png"),
                PathBuf::from("b.png")
            ]))
        );
        assert_eq!(parse("/attach"), Err(CommandError::Usage("/attach <path>")));
    }

    #[test]
    fn test_lang_requires_single_code() {
        assert_eq!(parse("/lang de"), Ok(ReplCommand::Language("de".to_string())));
        assert_eq!(parse("/lang"), Err(CommandError::Usage("/lang <code>")));
        assert_eq!(parse("/lang de fr"), Err(CommandError::Usage("/lang <code>")));
    }

    #[test]
    fn test_unknown_command() {
        assert_eq!(
            parse("/frobnicate now"),
            Err(CommandError::Unknown("/frobnicate".to_string()))
        );
    }
}

//! Host capability commands (`[capabilities]` section)
//!
//! Text is piped to the command's stdin. For speech, `{lang}` in the
//! command is replaced by the conversation language.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileCapabilitiesConfig {
    /// e.g. `"wl-copy"`, `"xclip -selection clipboard"`, `"pbcopy"`
    pub clipboard_command: Option<String>,
    /// e.g. `"espeak-ng -v {lang}"`, `"say"`
    pub speech_command: Option<String>,
}

//! Session state published to views.

use quicksense_chat::ChatMessage;
use quicksense_core::{Error, ErrorKind};
use serde::Serialize;

/// Where the session is in its request cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum SessionPhase {
    #[default]
    Idle,
    Extracting,
    Summarizing,
    AwaitingAnswer,
}

/// User-visible error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PanelError {
    pub kind: ErrorKind,
    pub message: String,
}

impl PanelError {
    /// Whether the view should offer to open the options page.
    pub fn needs_options(&self) -> bool {
        self.kind == ErrorKind::NotConfigured
    }
}

impl From<&Error> for PanelError {
    fn from(e: &Error) -> Self {
        Self {
            kind: e.kind(),
            message: e.to_string(),
        }
    }
}

/// Everything a view needs to render the panel.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PanelSessionState {
    pub phase: SessionPhase,
    /// A gateway call is outstanding.
    pub loading: bool,
    /// The outstanding call is a summary.
    pub summarizing: bool,
    pub error: Option<PanelError>,
    #[serde(rename = "chatHistory")]
    pub chat_history: Vec<ChatMessage>,
    #[serde(rename = "pendingQuestion")]
    pub pending_question: String,
    #[serde(rename = "hasSnapshot")]
    pub has_snapshot: bool,
}

/// Result of a `summarize`/`ask` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Completed,
    /// The request ran and failed; the error is in the state.
    Failed(ErrorKind),
    /// The request was not started.
    Rejected(Rejection),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    /// Another gateway call is in flight.
    Busy,
    BlankQuestion,
}

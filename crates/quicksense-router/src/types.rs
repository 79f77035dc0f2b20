//! Router types: wire messages, triggers and panel state.

use quicksense_core::{TabId, WindowId};
use serde::{Deserialize, Serialize};

/// Keyboard command that toggles the panel.
pub const COMMAND_TOGGLE_PANEL: &str = "toggle_side_panel";
/// Keyboard command that opens the options page.
pub const COMMAND_OPEN_OPTIONS: &str = "open_options";

/// One-shot message exchanged between contexts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum RuntimeMessage {
    /// Panel/background → content: extract the page text.
    #[serde(rename = "GET_CONTENT")]
    GetContent,
    /// Content → requester: the extracted text.
    #[serde(rename = "PAGE_CONTENT")]
    PageContent { content: String },
    /// Content → background: toggle the panel for the sender's window.
    #[serde(rename = "TOGGLE_SIDE_PANEL")]
    ToggleSidePanel,
    /// Any → background: open the options page.
    #[serde(rename = "OPEN_OPTIONS")]
    OpenOptions,
}

/// Tab as reported by the host with a trigger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TabInfo {
    pub id: TabId,
    #[serde(rename = "windowId")]
    pub window_id: WindowId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// Why the host fired the installed event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InstallReason {
    Install,
    Update,
    ChromeUpdate,
    SharedModuleUpdate,
}

/// Host event that may map to a router action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Trigger {
    IconClicked(TabInfo),
    Command { name: String, tab: Option<TabInfo> },
    Installed(InstallReason),
    Message {
        message: RuntimeMessage,
        sender: Option<TabInfo>,
    },
}

/// Logical action every trigger resolves to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    TogglePanel(WindowId),
    OpenOptions,
}

/// Panel status of one window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PanelStatus {
    Open,
    #[default]
    Closed,
}

/// Result of dispatching a trigger. Failures are already logged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    PanelOpened(WindowId),
    PanelClosed(WindowId),
    OptionsOpened,
    Ignored,
    Failed(String),
}

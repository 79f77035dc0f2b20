//! Message router: trigger fan-in, per-window panel state, content requests.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::RwLock;
use quicksense_core::{Error, PageSnapshot, Result, TabId, WindowId};
use tracing::{debug, error, info, warn};

use crate::host::ExtensionHost;
use crate::types::*;

/// Background-context coordinator.
pub struct MessageRouter {
    host: Arc<dyn ExtensionHost>,
    /// Panel status per window. Absent means closed.
    panels: RwLock<HashMap<WindowId, PanelStatus>>,
    /// Most recent snapshot per tab (ephemeral).
    snapshots: RwLock<HashMap<TabId, PageSnapshot>>,
    /// Held across the host call so toggles never interleave.
    toggle_lock: tokio::sync::Mutex<()>,
    content_timeout: Duration,
}

impl MessageRouter {
    pub fn new(host: Arc<dyn ExtensionHost>, content_timeout: Duration) -> Self {
        Self {
            host,
            panels: RwLock::new(HashMap::new()),
            snapshots: RwLock::new(HashMap::new()),
            toggle_lock: tokio::sync::Mutex::new(()),
            content_timeout,
        }
    }

    // ---------------------------------------------------------------
    // Panel
    // ---------------------------------------------------------------

    pub fn panel_status(&self, window: WindowId) -> PanelStatus {
        self.panels.read().get(&window).copied().unwrap_or_default()
    }

    /// Open the panel if closed, close it if open.
    ///
    /// Any host failure leaves the window marked closed. Concurrent toggles
    /// run one after another, each seeing the status the previous one left.
    pub async fn toggle_panel(&self, window: WindowId) -> Result<PanelStatus> {
        let _toggling = self.toggle_lock.lock().await;
        let current = self.panel_status(window);
        let result = match current {
            PanelStatus::Closed => self
                .host
                .open_panel(window)
                .await
                .map(|_| PanelStatus::Open),
            PanelStatus::Open => self
                .host
                .close_panel(window)
                .await
                .map(|_| PanelStatus::Closed),
        };

        match result {
            Ok(next) => {
                self.panels.write().insert(window, next);
                info!("Panel in window {} is now {:?}", window, next);
                Ok(next)
            }
            Err(e) => {
                error!("Error toggling panel in window {}: {}", window, e);
                self.panels.write().insert(window, PanelStatus::Closed);
                Err(e)
            }
        }
    }

    /// Record that the host closed the panel on its own (user dismissed it).
    pub fn mark_panel_closed(&self, window: WindowId) {
        self.panels.write().insert(window, PanelStatus::Closed);
    }

    // ---------------------------------------------------------------
    // Options
    // ---------------------------------------------------------------

    pub async fn open_options(&self) -> Result<()> {
        self.host.open_options().await.map_err(|e| {
            error!("Failed to open options page: {}", e);
            e
        })
    }

    // ---------------------------------------------------------------
    // Content
    // ---------------------------------------------------------------

    /// Ask the tab's content script for a snapshot.
    ///
    /// Fails with `ContentUnavailable` when the script is missing, gone,
    /// answers with the wrong message, or does not answer in time.
    pub async fn request_content(&self, tab: &TabInfo) -> Result<PageSnapshot> {
        let reply = tokio::time::timeout(
            self.content_timeout,
            self.host.send_to_tab(tab.id, RuntimeMessage::GetContent),
        )
        .await;

        let content = match reply {
            Ok(Ok(RuntimeMessage::PageContent { content })) => content,
            Ok(Ok(other)) => {
                warn!("Tab {} answered GET_CONTENT with {:?}", tab.id, other);
                return Err(Error::ContentUnavailable(format!(
                    "unexpected reply from tab {}",
                    tab.id
                )));
            }
            Ok(Err(e)) => {
                warn!("Content request to tab {} failed: {}", tab.id, e);
                return Err(match e {
                    Error::ContentUnavailable(_) => e,
                    other => Error::ContentUnavailable(other.to_string()),
                });
            }
            Err(_) => {
                warn!(
                    "Tab {} did not answer within {:?}",
                    tab.id, self.content_timeout
                );
                return Err(Error::ContentUnavailable(format!(
                    "tab {} did not answer in time",
                    tab.id
                )));
            }
        };

        let mut snapshot = PageSnapshot::new(content);
        snapshot.url = tab.url.clone();
        debug!("Tab {}: snapshot of {} chars", tab.id, snapshot.text.len());
        self.snapshots.write().insert(tab.id, snapshot.clone());
        Ok(snapshot)
    }

    pub fn cached_snapshot(&self, tab: TabId) -> Option<PageSnapshot> {
        self.snapshots.read().get(&tab).cloned()
    }

    /// Drop cached state for a closed or navigated tab.
    pub fn forget_tab(&self, tab: TabId) {
        self.snapshots.write().remove(&tab);
    }

    // ---------------------------------------------------------------
    // Trigger fan-in
    // ---------------------------------------------------------------

    /// Map a host trigger to its single logical action.
    pub fn resolve(trigger: &Trigger) -> Option<Action> {
        match trigger {
            Trigger::IconClicked(tab) => Some(Action::TogglePanel(tab.window_id)),
            Trigger::Command { name, tab } => match name.as_str() {
                COMMAND_TOGGLE_PANEL => tab.as_ref().map(|t| Action::TogglePanel(t.window_id)),
                COMMAND_OPEN_OPTIONS => Some(Action::OpenOptions),
                _ => None,
            },
            Trigger::Installed(InstallReason::Install) => Some(Action::OpenOptions),
            Trigger::Installed(_) => None,
            Trigger::Message { message, sender } => match message {
                RuntimeMessage::ToggleSidePanel => {
                    sender.as_ref().map(|t| Action::TogglePanel(t.window_id))
                }
                RuntimeMessage::OpenOptions => Some(Action::OpenOptions),
                _ => None,
            },
        }
    }

    /// Handle a host trigger. Never fails; errors are logged and reported.
    pub async fn dispatch(&self, trigger: Trigger) -> DispatchOutcome {
        match Self::resolve(&trigger) {
            Some(action) => self.execute(action).await,
            None => {
                debug!("No action for {:?}", trigger);
                DispatchOutcome::Ignored
            }
        }
    }

    async fn execute(&self, action: Action) -> DispatchOutcome {
        match action {
            Action::TogglePanel(window) => match self.toggle_panel(window).await {
                Ok(PanelStatus::Open) => DispatchOutcome::PanelOpened(window),
                Ok(PanelStatus::Closed) => DispatchOutcome::PanelClosed(window),
                Err(e) => DispatchOutcome::Failed(e.to_string()),
            },
            Action::OpenOptions => match self.open_options().await {
                Ok(()) => DispatchOutcome::OptionsOpened,
                Err(e) => DispatchOutcome::Failed(e.to_string()),
            },
        }
    }
}

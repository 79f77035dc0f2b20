//! Browser host abstraction.

use async_trait::async_trait;
use quicksense_core::{Result, TabId, WindowId};

use crate::types::RuntimeMessage;

/// Operations the router needs from the browser.
///
/// Every call may fail if the receiving context is gone (tab navigated
/// away, window closed); callers must not assume delivery.
#[async_trait]
pub trait ExtensionHost: Send + Sync {
    async fn open_panel(&self, window: WindowId) -> Result<()>;

    async fn close_panel(&self, window: WindowId) -> Result<()>;

    async fn open_options(&self) -> Result<()>;

    /// Deliver a message to the content context of `tab` and await its reply.
    async fn send_to_tab(&self, tab: TabId, message: RuntimeMessage) -> Result<RuntimeMessage>;
}

//! Terminal implementation of the browser host.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use quicksense_core::{Error, Result, TabId, WindowId};
use quicksense_router::{ContentHub, ExtensionHost, RuntimeMessage};
use tracing::debug;

/// The only window the terminal has.
pub const TERMINAL_WINDOW: WindowId = 1;

/// Host whose panel is the terminal and whose tabs are loaded pages.
pub struct TerminalHost {
    hub: Arc<ContentHub>,
    options_opened: AtomicUsize,
}

impl TerminalHost {
    pub fn new(hub: Arc<ContentHub>) -> Self {
        Self {
            hub,
            options_opened: AtomicUsize::new(0),
        }
    }

    pub fn options_opened(&self) -> usize {
        self.options_opened.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ExtensionHost for TerminalHost {
    async fn open_panel(&self, window: WindowId) -> Result<()> {
        if window != TERMINAL_WINDOW {
            return Err(Error::Panel(format!("no window {}", window)));
        }
        debug!("Panel opened");
        Ok(())
    }

    async fn close_panel(&self, window: WindowId) -> Result<()> {
        if window != TERMINAL_WINDOW {
            return Err(Error::Panel(format!("no window {}", window)));
        }
        debug!("Panel closed");
        Ok(())
    }

    async fn open_options(&self) -> Result<()> {
        self.options_opened.fetch_add(1, Ordering::SeqCst);
        eprintln!("QuickSense options");
        eprintln!("  Add an API key:    quicksense options set-key <tongyi|openai> <key>");
        eprintln!("  Pick a provider:   quicksense options use <tongyi|openai> [model]");
        eprintln!("  Check the key:     quicksense options verify");
        Ok(())
    }

    async fn send_to_tab(&self, tab: TabId, message: RuntimeMessage) -> Result<RuntimeMessage> {
        self.hub.send(tab, message).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quicksense_router::ContentScript;

    #[tokio::test]
    async fn test_send_reaches_content_script() {
        let hub = Arc::new(ContentHub::new());
        let host = TerminalHost::new(hub.clone());
        ContentScript::new(7, "https://example.com/", "<main>Hello  world</main>")
            .inject(&hub, None)
            .unwrap();

        let reply = host.send_to_tab(7, RuntimeMessage::GetContent).await.unwrap();
        assert_eq!(
            reply,
            RuntimeMessage::PageContent {
                content: "Hello world".into()
            }
        );
        assert!(host.send_to_tab(8, RuntimeMessage::GetContent).await.is_err());
    }

    #[tokio::test]
    async fn test_only_terminal_window() {
        let host = TerminalHost::new(Arc::new(ContentHub::new()));
        assert!(host.open_panel(TERMINAL_WINDOW).await.is_ok());
        assert!(host.open_panel(2).await.is_err());
        host.open_options().await.unwrap();
        assert_eq!(host.options_opened(), 1);
    }
}

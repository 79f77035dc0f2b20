//! Content context: a content script per tab, reachable through the hub.

use std::collections::HashMap;

use parking_lot::RwLock;
use quicksense_core::{Error, Result, TabId};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::types::RuntimeMessage;

const CONTENT_QUEUE_DEPTH: usize = 8;

/// A message for a content script with its reply slot.
pub struct ContentRequest {
    pub message: RuntimeMessage,
    pub reply: oneshot::Sender<RuntimeMessage>,
}

/// Registry of live content scripts, keyed by tab.
#[derive(Default)]
pub struct ContentHub {
    tabs: RwLock<HashMap<TabId, mpsc::Sender<ContentRequest>>>,
}

impl ContentHub {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, tab: TabId, sender: mpsc::Sender<ContentRequest>) {
        if self.tabs.write().insert(tab, sender).is_some() {
            debug!("Replaced content script for tab {}", tab);
        }
    }

    pub fn unregister(&self, tab: TabId) -> bool {
        self.tabs.write().remove(&tab).is_some()
    }

    pub fn is_injected(&self, tab: TabId) -> bool {
        self.tabs.read().contains_key(&tab)
    }

    /// Send a message to the tab's content script and await the reply.
    pub async fn send(&self, tab: TabId, message: RuntimeMessage) -> Result<RuntimeMessage> {
        let sender = self
            .tabs
            .read()
            .get(&tab)
            .cloned()
            .ok_or_else(|| Error::ContentUnavailable(format!("no content script in tab {}", tab)))?;

        let (reply_tx, reply_rx) = oneshot::channel();
        sender
            .send(ContentRequest {
                message,
                reply: reply_tx,
            })
            .await
            .map_err(|_| {
                Error::ContentUnavailable(format!("content script in tab {} has stopped", tab))
            })?;

        reply_rx.await.map_err(|_| {
            Error::ContentUnavailable(format!("content script in tab {} did not reply", tab))
        })
    }
}

/// The content context of one page.
pub struct ContentScript {
    tab: TabId,
    url: String,
    html: String,
}

impl ContentScript {
    pub fn new(tab: TabId, url: impl Into<String>, html: impl Into<String>) -> Self {
        Self {
            tab,
            url: url.into(),
            html: html.into(),
        }
    }

    /// Start the script and register it with the hub.
    ///
    /// Returns `None` without registering on the extension's own pages.
    pub fn inject(self, hub: &ContentHub, extension_origin: Option<&str>) -> Option<JoinHandle<()>> {
        if quicksense_extract::is_extension_page(&self.url, extension_origin) {
            info!("Skipping content script on extension page {}", self.url);
            return None;
        }

        let (tx, rx) = mpsc::channel(CONTENT_QUEUE_DEPTH);
        hub.register(self.tab, tx);
        debug!("Content script injected into tab {} ({})", self.tab, self.url);
        Some(tokio::spawn(self.run(rx)))
    }

    async fn run(self, mut rx: mpsc::Receiver<ContentRequest>) {
        while let Some(request) = rx.recv().await {
            match request.message {
                RuntimeMessage::GetContent => {
                    let content = quicksense_extract::extract(&self.html);
                    debug!("Tab {}: extracted {} chars", self.tab, content.len());
                    if request
                        .reply
                        .send(RuntimeMessage::PageContent { content })
                        .is_err()
                    {
                        warn!("Tab {}: requester went away before the reply", self.tab);
                    }
                }
                other => {
                    debug!("Tab {}: ignoring {:?}", self.tab, other);
                }
            }
        }
        debug!("Content script for tab {} stopped", self.tab);
    }
}

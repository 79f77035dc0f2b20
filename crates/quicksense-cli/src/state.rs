//! Shared application state for one CLI run.

use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

use quicksense_chat::{Gateway, JsonFileStore, ProviderSettings, SettingsStore};
use quicksense_core::QuickSenseConfig;
use quicksense_router::{
    ContentHub, ContentScript, DispatchOutcome, InstallReason, MessageRouter, TabInfo, Trigger,
};
use tracing::{info, warn};

use crate::host::{TerminalHost, TERMINAL_WINDOW};
use crate::page::{self, LoadedPage};

pub struct AppState {
    pub config: QuickSenseConfig,
    pub hub: Arc<ContentHub>,
    pub host: Arc<TerminalHost>,
    pub router: MessageRouter,
    /// Settings as the panel sees them (environment keys fill gaps).
    pub settings: Arc<JsonFileStore>,
    pub gateway: Arc<Gateway>,
    pub http: reqwest::Client,
    next_tab: AtomicI64,
}

impl AppState {
    pub fn new(config: QuickSenseConfig) -> anyhow::Result<Self> {
        let hub = Arc::new(ContentHub::new());
        let host = Arc::new(TerminalHost::new(hub.clone()));
        let router = MessageRouter::new(host.clone(), config.content_timeout());
        let settings = Arc::new(JsonFileStore::new(&config.data_paths.settings_file));
        let gateway = Arc::new(Gateway::new(config.request_timeout())?);
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .user_agent(concat!("quicksense/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            config,
            hub,
            host,
            router,
            settings,
            gateway,
            http,
            next_tab: AtomicI64::new(1),
        })
    }

    /// Store used by the options commands. Never picks up environment keys,
    /// so saving does not persist them.
    pub fn options_store(&self) -> JsonFileStore {
        JsonFileStore::new(self.settings.path()).without_env_fallback()
    }

    /// Fire the install trigger when no settings were ever saved.
    pub async fn first_run(&self) -> anyhow::Result<bool> {
        if self.settings.exists() {
            return Ok(false);
        }
        info!("First run, no settings at {}", self.settings.path().display());
        if let DispatchOutcome::Failed(e) = self
            .router
            .dispatch(Trigger::Installed(InstallReason::Install))
            .await
        {
            warn!("Install trigger failed: {}", e);
        }
        self.options_store().save(&ProviderSettings::default())?;
        Ok(true)
    }

    /// Load a page into a new tab and inject its content script.
    pub async fn open_tab(&self, source: &str) -> anyhow::Result<TabInfo> {
        let LoadedPage { url, html } = page::load(&self.http, source).await?;
        Ok(self.open_tab_with(url, html))
    }

    pub fn open_tab_with(&self, url: String, html: String) -> TabInfo {
        let id = self.next_tab.fetch_add(1, Ordering::SeqCst);
        let tab = TabInfo {
            id,
            window_id: TERMINAL_WINDOW,
            url: Some(url.clone()),
        };
        ContentScript::new(id, url, html).inject(&self.hub, self.config.extension_origin.as_deref());
        tab
    }

    /// Close a tab: its content script stops and cached content is dropped.
    pub fn close_tab(&self, tab: &TabInfo) {
        self.hub.unregister(tab.id);
        self.router.forget_tab(tab.id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state() -> (tempfile::TempDir, AppState) {
        let dir = tempfile::tempdir().unwrap();
        let config = QuickSenseConfig::from_env(dir.path()).unwrap();
        let state = AppState::new(config).unwrap();
        (dir, state)
    }

    #[tokio::test]
    async fn test_first_run_opens_options_once() {
        let (_dir, state) = state();
        assert!(state.first_run().await.unwrap());
        assert_eq!(state.host.options_opened(), 1);
        assert!(state.settings.exists());

        assert!(!state.first_run().await.unwrap());
        assert_eq!(state.host.options_opened(), 1);
    }

    #[tokio::test]
    async fn test_tab_content_round_trip() {
        let (_dir, state) = state();
        let tab = state.open_tab_with(
            "https://example.com/a".into(),
            "<body><nav>Menu</nav><p>Hello</p></body>".into(),
        );
        let snapshot = state.router.request_content(&tab).await.unwrap();
        assert_eq!(snapshot.text, "Hello");
        assert_eq!(snapshot.url.as_deref(), Some("https://example.com/a"));

        state.close_tab(&tab);
        assert!(state.router.cached_snapshot(tab.id).is_none());
        assert!(state.router.request_content(&tab).await.is_err());
    }

    #[tokio::test]
    async fn test_extension_pages_have_no_content() {
        let (_dir, state) = state();
        let tab = state.open_tab_with(
            "chrome-extension://abc/options.html".into(),
            "<main>Settings</main>".into(),
        );
        assert!(!state.hub.is_injected(tab.id));
        let err = state.router.request_content(&tab).await.unwrap_err();
        assert_eq!(err.kind(), quicksense_core::ErrorKind::ContentUnavailable);
    }
}

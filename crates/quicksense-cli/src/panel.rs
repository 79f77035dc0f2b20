//! The panel as a terminal transcript.

use std::sync::Arc;

use quicksense_chat::{ChatMessage, Role};
use quicksense_core::ErrorKind;
use quicksense_router::{DispatchOutcome, TabInfo, Trigger};
use quicksense_session::{
    prompts::SUMMARIZE_REQUEST, Outcome, PanelError, PanelSession, PanelSessionState,
};
use tokio::sync::watch;
use tracing::{debug, warn};

use crate::state::AppState;

/// A line of panel output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Line {
    User(String),
    Assistant(String),
    Error(PanelError),
}

/// Tracks what part of the session state has already been shown.
#[derive(Debug, Default)]
pub struct Transcript {
    shown: usize,
    last_error: Option<PanelError>,
}

impl Transcript {
    /// Lines that are new since the previous call.
    pub fn advance(&mut self, state: &PanelSessionState) -> Vec<Line> {
        // A shorter history means the session was reset.
        if state.chat_history.len() < self.shown {
            self.shown = 0;
        }
        let mut lines: Vec<Line> = state.chat_history[self.shown..]
            .iter()
            .map(|m: &ChatMessage| match m.role {
                Role::Assistant => Line::Assistant(m.content.clone()),
                _ => Line::User(m.content.clone()),
            })
            .collect();
        self.shown = state.chat_history.len();

        if state.error != self.last_error {
            if let Some(e) = &state.error {
                lines.push(Line::Error(e.clone()));
            }
            self.last_error = state.error.clone();
        }
        lines
    }
}

/// An open panel bound to one tab.
pub struct Panel {
    pub session: Arc<PanelSession>,
    tab: TabInfo,
    updates: watch::Receiver<PanelSessionState>,
    transcript: Transcript,
    /// Echo user messages (off when the user just typed them).
    echo_user: bool,
}

impl Panel {
    /// Open the panel for `tab` and load the page content into its session.
    pub async fn open(app: &AppState, tab: TabInfo, echo_user: bool) -> anyhow::Result<Self> {
        match app.router.dispatch(Trigger::IconClicked(tab.clone())).await {
            DispatchOutcome::PanelOpened(_) => {}
            other => anyhow::bail!("Could not open the panel: {:?}", other),
        }

        let session = Arc::new(PanelSession::new(app.gateway.clone(), app.settings.clone()));
        let updates = session.subscribe();
        let mut panel = Self {
            session,
            tab,
            updates,
            transcript: Transcript::default(),
            echo_user,
        };
        panel.load_content(app).await;
        Ok(panel)
    }

    /// Load the tab's content into the session, reusing the router's
    /// snapshot when the tab was already extracted.
    pub async fn load_content(&mut self, app: &AppState) {
        if let Some(snapshot) = app.router.cached_snapshot(self.tab.id) {
            debug!("Tab {}: using cached snapshot", self.tab.id);
            self.session.on_page_content_received(snapshot);
            self.render();
            return;
        }
        self.reload_content(app).await;
    }

    /// Extract the tab's content again.
    pub async fn reload_content(&mut self, app: &AppState) {
        if !self.session.begin_extraction() {
            debug!("Extraction skipped, request in flight");
            return;
        }
        match app.router.request_content(&self.tab).await {
            Ok(snapshot) => self.session.on_page_content_received(snapshot),
            Err(e) => self.session.extraction_failed(&e),
        }
        self.render();
    }

    pub async fn summarize(&mut self) -> Outcome {
        let Some(snapshot) = self.session.snapshot() else {
            return Outcome::Failed(ErrorKind::ContentUnavailable);
        };
        eprintln!("Summarizing...");
        let outcome = self.session.summarize(snapshot).await;
        self.render();
        outcome
    }

    pub async fn ask(&mut self, question: &str) -> Outcome {
        let outcome = self.session.ask(question).await;
        self.render();
        outcome
    }

    /// Ask whatever is in the session's input field.
    pub async fn submit(&mut self) -> Outcome {
        let outcome = self.session.submit_pending().await;
        self.render();
        outcome
    }

    /// Close the panel and discard the session.
    pub async fn close(self, app: &AppState) {
        self.session.reset();
        if let DispatchOutcome::Failed(e) =
            app.router.dispatch(Trigger::IconClicked(self.tab.clone())).await
        {
            warn!("Closing panel failed: {}", e);
        }
    }

    /// The user dismissed the panel without a toggle (stdin closed).
    pub fn dismiss(self, app: &AppState) {
        self.session.reset();
        app.router.mark_panel_closed(self.tab.window_id);
    }

    fn render(&mut self) {
        if !self.updates.has_changed().unwrap_or(false) {
            return;
        }
        let state = self.updates.borrow_and_update().clone();
        for line in self.transcript.advance(&state) {
            print_line(&line, self.echo_user);
        }
    }
}

fn print_line(line: &Line, echo_user: bool) {
    match line {
        Line::User(text) if text == SUMMARIZE_REQUEST => {}
        Line::User(text) => {
            if echo_user {
                println!("> {}\n", text);
            }
        }
        Line::Assistant(text) => println!("{}\n", text),
        Line::Error(e) => {
            eprintln!("Error: {}", e.message);
            if e.needs_options() {
                eprintln!("Run 'quicksense options set-key <provider> <key>' to add one.");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::TERMINAL_WINDOW;
    use quicksense_core::{Error, QuickSenseConfig};
    use quicksense_router::PanelStatus;

    fn app() -> (tempfile::TempDir, AppState) {
        let dir = tempfile::tempdir().unwrap();
        let config = QuickSenseConfig::from_env(dir.path()).unwrap();
        let app = AppState::new(config).unwrap();
        (dir, app)
    }

    fn page_tab(app: &AppState) -> TabInfo {
        app.open_tab_with(
            "https://example.com/post".into(),
            "<article>Cached body</article>".into(),
        )
    }

    #[tokio::test]
    async fn test_open_uses_cached_snapshot() {
        let (_dir, app) = app();
        let tab = page_tab(&app);
        app.router.request_content(&tab).await.unwrap();
        // The content script is gone; only the cache can supply the text.
        app.hub.unregister(tab.id);

        let panel = Panel::open(&app, tab, false).await.unwrap();
        assert_eq!(panel.session.snapshot().unwrap().text, "Cached body");
        assert!(panel.session.state().error.is_none());
    }

    #[tokio::test]
    async fn test_reload_extracts_again() {
        let (_dir, app) = app();
        let tab = page_tab(&app);
        let mut panel = Panel::open(&app, tab.clone(), false).await.unwrap();
        assert!(panel.session.state().has_snapshot);

        app.hub.unregister(tab.id);
        panel.load_content(&app).await;
        assert!(panel.session.state().error.is_none());

        panel.reload_content(&app).await;
        let error = panel.session.state().error.unwrap();
        assert_eq!(error.kind, ErrorKind::ContentUnavailable);
    }

    #[tokio::test]
    async fn test_dismiss_marks_window_closed() {
        let (_dir, app) = app();
        let tab = page_tab(&app);
        let panel = Panel::open(&app, tab.clone(), false).await.unwrap();
        assert_eq!(app.router.panel_status(TERMINAL_WINDOW), PanelStatus::Open);

        panel.dismiss(&app);
        assert_eq!(app.router.panel_status(TERMINAL_WINDOW), PanelStatus::Closed);

        // The next open is an open, not a close.
        let again = Panel::open(&app, tab, false).await.unwrap();
        assert_eq!(app.router.panel_status(TERMINAL_WINDOW), PanelStatus::Open);
        again.close(&app).await;
        assert_eq!(app.router.panel_status(TERMINAL_WINDOW), PanelStatus::Closed);
    }

    fn state_with(history: Vec<ChatMessage>, error: Option<PanelError>) -> PanelSessionState {
        PanelSessionState {
            chat_history: history,
            error,
            ..Default::default()
        }
    }

    #[test]
    fn test_transcript_shows_only_new_messages() {
        let mut transcript = Transcript::default();
        let first = state_with(
            vec![ChatMessage::user("q"), ChatMessage::assistant("a")],
            None,
        );
        assert_eq!(
            transcript.advance(&first),
            vec![Line::User("q".into()), Line::Assistant("a".into())]
        );
        assert!(transcript.advance(&first).is_empty());

        let mut second = first.clone();
        second.chat_history.push(ChatMessage::user("q2"));
        assert_eq!(transcript.advance(&second), vec![Line::User("q2".into())]);
    }

    #[test]
    fn test_transcript_error_shown_once() {
        let mut transcript = Transcript::default();
        let error = PanelError::from(&Error::NotConfigured("tongyi".into()));
        let failed = state_with(vec![ChatMessage::user(SUMMARIZE_REQUEST)], Some(error.clone()));

        let lines = transcript.advance(&failed);
        assert_eq!(lines.last(), Some(&Line::Error(error)));
        assert!(transcript.advance(&failed).is_empty());
    }

    #[test]
    fn test_transcript_after_reset() {
        let mut transcript = Transcript::default();
        transcript.advance(&state_with(
            vec![ChatMessage::user("q"), ChatMessage::assistant("a")],
            None,
        ));
        assert!(transcript.advance(&PanelSessionState::default()).is_empty());
        assert_eq!(
            transcript.advance(&state_with(vec![ChatMessage::user("new")], None)),
            vec![Line::User("new".into())]
        );
    }
}

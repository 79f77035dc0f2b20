//! Panel session: summary and question flows over a single gateway slot.

use std::sync::Arc;

use parking_lot::Mutex;
use quicksense_chat::{ChatMessage, Completer, ProviderConfig, SettingsStore};
use quicksense_core::{Error, PageSnapshot, Result};
use tokio::sync::watch;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::prompts::{self, SUMMARIZE_REQUEST};
use crate::state::*;
use crate::summary::{self, SummaryResult};

struct Inner {
    state: PanelSessionState,
    snapshot: Option<PageSnapshot>,
    /// Bumped by `reset`; replies started under an older epoch are dropped.
    epoch: u64,
}

/// Chat/summary session owned by one panel.
pub struct PanelSession {
    id: Uuid,
    completer: Arc<dyn Completer>,
    settings: Arc<dyn SettingsStore>,
    inner: Mutex<Inner>,
    updates: watch::Sender<PanelSessionState>,
}

impl PanelSession {
    pub fn new(completer: Arc<dyn Completer>, settings: Arc<dyn SettingsStore>) -> Self {
        let state = PanelSessionState::default();
        let (updates, _) = watch::channel(state.clone());
        Self {
            id: Uuid::new_v4(),
            completer,
            settings,
            inner: Mutex::new(Inner {
                state,
                snapshot: None,
                epoch: 0,
            }),
            updates,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Current state.
    pub fn state(&self) -> PanelSessionState {
        self.inner.lock().state.clone()
    }

    /// State-change notifications for a view layer.
    pub fn subscribe(&self) -> watch::Receiver<PanelSessionState> {
        self.updates.subscribe()
    }

    pub fn snapshot(&self) -> Option<PageSnapshot> {
        self.inner.lock().snapshot.clone()
    }

    fn publish(&self, state: &PanelSessionState) {
        self.updates.send_replace(state.clone());
    }

    // ---------------------------------------------------------------
    // Page content
    // ---------------------------------------------------------------

    /// Enter `Extracting` while content is fetched. Ignored while a request is in flight.
    pub fn begin_extraction(&self) -> bool {
        let mut inner = self.inner.lock();
        if inner.state.loading {
            return false;
        }
        inner.state.phase = SessionPhase::Extracting;
        inner.state.error = None;
        self.publish(&inner.state);
        true
    }

    /// Content could not be fetched.
    pub fn extraction_failed(&self, error: &Error) {
        warn!("Session {}: extraction failed: {}", self.id, error);
        let mut inner = self.inner.lock();
        if inner.state.phase == SessionPhase::Extracting {
            inner.state.phase = SessionPhase::Idle;
        }
        inner.state.error = Some(PanelError::from(error));
        self.publish(&inner.state);
    }

    /// Store a snapshot for later summary and question requests.
    pub fn on_page_content_received(&self, snapshot: PageSnapshot) {
        debug!(
            "Session {}: received {} chars of page content",
            self.id,
            snapshot.text.len()
        );
        let mut inner = self.inner.lock();
        inner.snapshot = Some(snapshot);
        inner.state.has_snapshot = true;
        if inner.state.phase == SessionPhase::Extracting {
            inner.state.phase = SessionPhase::Idle;
        }
        self.publish(&inner.state);
    }

    // ---------------------------------------------------------------
    // Summary
    // ---------------------------------------------------------------

    /// Request a structured summary of `snapshot`.
    ///
    /// The synthetic user message is appended before the gateway call and
    /// stays in the history whatever the outcome.
    pub async fn summarize(&self, snapshot: PageSnapshot) -> Outcome {
        let epoch = {
            let mut inner = self.inner.lock();
            if inner.state.loading {
                debug!("Session {}: summarize rejected, request in flight", self.id);
                return Outcome::Rejected(Rejection::Busy);
            }
            inner.snapshot = Some(snapshot.clone());
            let state = &mut inner.state;
            state.has_snapshot = true;
            state.phase = SessionPhase::Summarizing;
            state.loading = true;
            state.summarizing = true;
            state.error = None;
            state.chat_history.push(ChatMessage::user(SUMMARIZE_REQUEST));
            self.publish(&inner.state);
            inner.epoch
        };

        info!("Session {}: summarizing {} chars", self.id, snapshot.text.len());
        let result = self.request_summary(&snapshot).await;
        self.finish(epoch, result.map(|s| s.render()))
    }

    async fn request_summary(&self, snapshot: &PageSnapshot) -> Result<SummaryResult> {
        if snapshot.is_empty() {
            return Err(Error::ContentUnavailable("the page has no readable text".into()));
        }
        let config = self.provider_config()?;
        let reply = self
            .completer
            .complete(&prompts::summary_messages(snapshot), &config)
            .await?;
        summary::parse_summary(&reply)
    }

    // ---------------------------------------------------------------
    // Questions
    // ---------------------------------------------------------------

    /// Ask a free-form question about the page.
    pub async fn ask(&self, question: &str) -> Outcome {
        let question = question.trim();
        if question.is_empty() {
            return Outcome::Rejected(Rejection::BlankQuestion);
        }

        let (epoch, snapshot, history) = {
            let mut inner = self.inner.lock();
            if inner.state.loading {
                debug!("Session {}: question rejected, request in flight", self.id);
                return Outcome::Rejected(Rejection::Busy);
            }
            let state = &mut inner.state;
            state.chat_history.push(ChatMessage::user(question));
            state.pending_question.clear();
            state.phase = SessionPhase::AwaitingAnswer;
            state.loading = true;
            state.error = None;
            let history = state.chat_history.clone();
            self.publish(&inner.state);
            (inner.epoch, inner.snapshot.clone(), history)
        };

        info!("Session {}: asking question", self.id);
        let result = self.request_answer(snapshot.as_ref(), &history).await;
        self.finish(epoch, result)
    }

    async fn request_answer(
        &self,
        snapshot: Option<&PageSnapshot>,
        history: &[ChatMessage],
    ) -> Result<String> {
        let snapshot = snapshot.ok_or_else(|| {
            Error::ContentUnavailable("no page content has been received yet".into())
        })?;
        let config = self.provider_config()?;
        self.completer
            .complete(&prompts::question_messages(snapshot, history), &config)
            .await
    }

    /// Update the input field.
    pub fn set_pending_question(&self, text: impl Into<String>) {
        let mut inner = self.inner.lock();
        inner.state.pending_question = text.into();
        self.publish(&inner.state);
    }

    /// Ask whatever is in the input field.
    pub async fn submit_pending(&self) -> Outcome {
        let question = self.inner.lock().state.pending_question.clone();
        self.ask(&question).await
    }

    // ---------------------------------------------------------------
    // Lifecycle
    // ---------------------------------------------------------------

    /// Panel closed or reloaded: forget the transcript and the page.
    ///
    /// An in-flight request keeps its slot until it returns, then its
    /// reply is discarded.
    pub fn reset(&self) {
        let mut inner = self.inner.lock();
        inner.epoch += 1;
        inner.snapshot = None;
        let loading = inner.state.loading;
        let summarizing = inner.state.summarizing;
        let phase = inner.state.phase;
        inner.state = PanelSessionState {
            loading,
            summarizing,
            phase: if loading { phase } else { SessionPhase::Idle },
            ..Default::default()
        };
        info!("Session {}: reset", self.id);
        self.publish(&inner.state);
    }

    fn provider_config(&self) -> Result<ProviderConfig> {
        self.settings.load()?.resolve()
    }

    /// Leave the loading state, recording either the reply or the error.
    fn finish(&self, epoch: u64, result: Result<String>) -> Outcome {
        let mut inner = self.inner.lock();
        let stale = inner.epoch != epoch;
        let state = &mut inner.state;
        state.loading = false;
        state.summarizing = false;
        state.phase = SessionPhase::Idle;

        let outcome = if stale {
            debug!("Session {}: discarding reply from before reset", self.id);
            match result {
                Ok(_) => Outcome::Completed,
                Err(e) => Outcome::Failed(e.kind()),
            }
        } else {
            match result {
                Ok(reply) => {
                    state.chat_history.push(ChatMessage::assistant(reply));
                    state.error = None;
                    Outcome::Completed
                }
                Err(e) => {
                    warn!("Session {}: request failed: {}", self.id, e);
                    let kind = e.kind();
                    state.error = Some(PanelError::from(&e));
                    Outcome::Failed(kind)
                }
            }
        };

        self.publish(&inner.state);
        outcome
    }
}

//! Types shared between the content, background and panel contexts.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Browser window identifier.
pub type WindowId = i64;

/// Browser tab identifier.
pub type TabId = i64;

/// Plain-text snapshot of a page at extraction time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageSnapshot {
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(rename = "capturedAt")]
    pub captured_at: DateTime<Utc>,
}

impl PageSnapshot {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            url: None,
            captured_at: Utc::now(),
        }
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

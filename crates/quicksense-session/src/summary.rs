//! Structured summary parsing and rendering.

use once_cell::sync::Lazy;
use quicksense_core::{Error, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};

static FENCE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)^```[\w-]*\s*(.*?)\s*```$").unwrap());

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyPoint {
    pub title: String,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryResult {
    #[serde(default)]
    pub overview: String,
    #[serde(default, rename = "keyPoints")]
    pub key_points: Vec<KeyPoint>,
}

impl SummaryResult {
    /// Render as chat text: overview, blank line, one bullet per key point.
    pub fn render(&self) -> String {
        let bullets: Vec<String> = self
            .key_points
            .iter()
            .map(|p| format!("- **{}**: {}", p.title.trim(), p.content.trim()))
            .collect();
        format!("{}\n\n{}", self.overview.trim(), bullets.join("\n"))
    }
}

/// Parse a model reply into a summary.
///
/// Any failure (not JSON, wrong field types, blank overview, no key
/// points) is `MalformedSummary`.
pub fn parse_summary(reply: &str) -> Result<SummaryResult> {
    let body = strip_code_fences(reply);
    let summary: SummaryResult = serde_json::from_str(body)
        .map_err(|e| Error::MalformedSummary(format!("reply is not a summary object: {}", e)))?;

    if summary.overview.trim().is_empty() {
        return Err(Error::MalformedSummary("missing overview".into()));
    }
    if summary.key_points.is_empty() {
        return Err(Error::MalformedSummary("no key points".into()));
    }
    Ok(summary)
}

fn strip_code_fences(reply: &str) -> &str {
    let trimmed = reply.trim();
    FENCE_RE
        .captures(trimmed)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
        .unwrap_or(trimmed)
}

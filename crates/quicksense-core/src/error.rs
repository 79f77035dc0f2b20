//! Error types for QuickSense.

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Page content unavailable: {0}")]
    ContentUnavailable(String),

    #[error("No API key configured for {0}. Open the options page to add one.")]
    NotConfigured(String),

    #[error("Provider error: {0}")]
    Provider(String),

    #[error("Malformed summary: {0}")]
    MalformedSummary(String),

    #[error("Panel error: {0}")]
    Panel(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(String),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Coarse classification used by the panel session to render errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ErrorKind {
    ContentUnavailable,
    NotConfigured,
    Provider,
    MalformedSummary,
    Other,
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::ContentUnavailable(_) => ErrorKind::ContentUnavailable,
            Self::NotConfigured(_) => ErrorKind::NotConfigured,
            Self::Provider(_) | Self::Http(_) => ErrorKind::Provider,
            Self::MalformedSummary(_) => ErrorKind::MalformedSummary,
            _ => ErrorKind::Other,
        }
    }

    /// Whether the user should be pointed at the options surface.
    pub fn needs_options(&self) -> bool {
        self.kind() == ErrorKind::NotConfigured
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_mapping() {
        assert_eq!(
            Error::ContentUnavailable("tab 1".into()).kind(),
            ErrorKind::ContentUnavailable
        );
        assert_eq!(Error::Http("reset".into()).kind(), ErrorKind::Provider);
        assert_eq!(Error::Panel("gone".into()).kind(), ErrorKind::Other);
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        assert_eq!(Error::from(io).kind(), ErrorKind::Other);
    }

    #[test]
    fn test_not_configured_points_to_options() {
        let err = Error::NotConfigured("tongyi".into());
        assert!(err.needs_options());
        assert!(err.to_string().contains("options page"));
        assert!(!Error::Provider("401".into()).needs_options());
    }
}

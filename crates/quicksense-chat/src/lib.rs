//! LLM gateway with external provider APIs (Tongyi/OpenAI).
//!
//! Translates a provider-agnostic chat request into one of the supported
//! HTTP dialects and extracts the single textual reply. Also owns the
//! persisted provider settings written by the options surface.

pub mod config;
pub mod providers;
pub mod types;

pub use config::{JsonFileStore, MemoryStore, ProviderSettings, SettingsStore};
pub use providers::{CompletionBackend, Completer, Gateway};
pub use types::*;

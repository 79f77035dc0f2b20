//! Provider settings persistence and provider selection.

use std::path::{Path, PathBuf};

use parking_lot::RwLock;
use quicksense_core::{Error, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::types::{LLMProvider, ProviderConfig, SettingsUpdate, SettingsView};

pub const DEFAULT_TONGYI_MODEL: &str = "qwen-turbo";
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4o-mini";

/// Stored provider settings (persisted to settings.json).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderSettings {
    #[serde(default = "default_provider", rename = "selectedProvider")]
    pub selected_provider: LLMProvider,
    #[serde(default, rename = "tongyiApiKey")]
    pub tongyi_api_key: Option<String>,
    #[serde(default, rename = "openaiApiKey")]
    pub openai_api_key: Option<String>,
    #[serde(default = "default_tongyi_model", rename = "tongyiModel")]
    pub tongyi_model: String,
    #[serde(default = "default_openai_model", rename = "openaiModel")]
    pub openai_model: String,
}

fn default_provider() -> LLMProvider {
    LLMProvider::Tongyi
}
fn default_tongyi_model() -> String {
    DEFAULT_TONGYI_MODEL.into()
}
fn default_openai_model() -> String {
    DEFAULT_OPENAI_MODEL.into()
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            selected_provider: LLMProvider::Tongyi,
            tongyi_api_key: None,
            openai_api_key: None,
            tongyi_model: DEFAULT_TONGYI_MODEL.into(),
            openai_model: DEFAULT_OPENAI_MODEL.into(),
        }
    }
}

impl ProviderSettings {
    /// API key for a provider, if one is set and non-blank.
    pub fn api_key(&self, provider: LLMProvider) -> Option<&str> {
        let key = match provider {
            LLMProvider::Tongyi => self.tongyi_api_key.as_deref(),
            LLMProvider::OpenAI => self.openai_api_key.as_deref(),
        };
        key.map(str::trim).filter(|k| !k.is_empty())
    }

    pub fn model(&self, provider: LLMProvider) -> &str {
        match provider {
            LLMProvider::Tongyi => &self.tongyi_model,
            LLMProvider::OpenAI => &self.openai_model,
        }
    }

    /// Resolve the selected provider into a callable config.
    ///
    /// A missing key is `NotConfigured`; no provider is substituted.
    pub fn resolve(&self) -> Result<ProviderConfig> {
        let provider = self.selected_provider;
        let api_key = self
            .api_key(provider)
            .ok_or_else(|| Error::NotConfigured(provider.to_string()))?;
        Ok(ProviderConfig {
            provider,
            api_key: api_key.to_string(),
            model: self.model(provider).to_string(),
        })
    }

    /// Apply an update, merging with existing settings.
    pub fn apply_update(&mut self, update: &SettingsUpdate) {
        if let Some(p) = update.selected_provider {
            self.selected_provider = p;
        }
        if let Some(k) = &update.tongyi_api_key {
            self.tongyi_api_key = Some(k.trim().to_string()).filter(|k| !k.is_empty());
        }
        if let Some(k) = &update.openai_api_key {
            self.openai_api_key = Some(k.trim().to_string()).filter(|k| !k.is_empty());
        }
        if let Some(m) = &update.tongyi_model {
            self.tongyi_model = m.clone();
        }
        if let Some(m) = &update.openai_model {
            self.openai_model = m.clone();
        }
    }

    /// Build the public settings view (no API keys exposed).
    pub fn to_view(&self) -> SettingsView {
        SettingsView {
            selected_provider: self.selected_provider,
            tongyi_configured: self.api_key(LLMProvider::Tongyi).is_some(),
            openai_configured: self.api_key(LLMProvider::OpenAI).is_some(),
            tongyi_model: self.tongyi_model.clone(),
            openai_model: self.openai_model.clone(),
        }
    }
}

/// Durable key-value store holding the provider settings.
///
/// Read at gateway-call time; written only by the options surface.
pub trait SettingsStore: Send + Sync {
    fn load(&self) -> Result<ProviderSettings>;
    fn save(&self, settings: &ProviderSettings) -> Result<()>;
}

/// Settings persisted as a JSON file, re-read on every load.
pub struct JsonFileStore {
    path: PathBuf,
    env_fallback: bool,
}

impl JsonFileStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            env_fallback: true,
        }
    }

    /// Disable the `DASHSCOPE_API_KEY` / `OPENAI_API_KEY` fallback.
    pub fn without_env_fallback(mut self) -> Self {
        self.env_fallback = false;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether settings were ever saved (false on first install).
    pub fn exists(&self) -> bool {
        self.path.exists()
    }
}

impl SettingsStore for JsonFileStore {
    fn load(&self) -> Result<ProviderSettings> {
        let mut settings: ProviderSettings = match std::fs::read_to_string(&self.path) {
            Ok(s) => serde_json::from_str(&s)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("No settings at {}, using defaults", self.path.display());
                ProviderSettings::default()
            }
            Err(e) => return Err(e.into()),
        };

        if self.env_fallback {
            if settings.tongyi_api_key.is_none() {
                settings.tongyi_api_key = std::env::var("DASHSCOPE_API_KEY").ok();
            }
            if settings.openai_api_key.is_none() {
                settings.openai_api_key = std::env::var("OPENAI_API_KEY").ok();
            }
        }

        Ok(settings)
    }

    fn save(&self, settings: &ProviderSettings) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(settings)?;
        std::fs::write(&self.path, json)?;
        info!("Saved provider settings to {}", self.path.display());
        Ok(())
    }
}

/// In-memory settings store.
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<ProviderSettings>,
}

impl MemoryStore {
    pub fn new(settings: ProviderSettings) -> Self {
        Self {
            inner: RwLock::new(settings),
        }
    }
}

impl SettingsStore for MemoryStore {
    fn load(&self) -> Result<ProviderSettings> {
        Ok(self.inner.read().clone())
    }

    fn save(&self, settings: &ProviderSettings) -> Result<()> {
        *self.inner.write() = settings.clone();
        Ok(())
    }
}

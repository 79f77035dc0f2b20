//! Chat and provider types.

use serde::{Deserialize, Serialize};

/// LLM provider identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LLMProvider {
    /// Alibaba DashScope text-generation API (Qwen models).
    Tongyi,
    #[serde(rename = "openai")]
    OpenAI,
}

impl LLMProvider {
    pub fn all() -> &'static [LLMProvider] {
        &[Self::Tongyi, Self::OpenAI]
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Tongyi => "tongyi",
            Self::OpenAI => "openai",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "tongyi" | "qwen" | "dashscope" => Some(Self::Tongyi),
            "openai" => Some(Self::OpenAI),
            _ => None,
        }
    }
}

impl std::fmt::Display for LLMProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Author of a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// Chat message in conversation history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Everything a gateway call needs to reach one provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderConfig {
    pub provider: LLMProvider,
    pub api_key: String,
    pub model: String,
}

/// Settings view for the options surface (keys masked).
#[derive(Debug, Clone, Serialize)]
pub struct SettingsView {
    #[serde(rename = "selectedProvider")]
    pub selected_provider: LLMProvider,
    #[serde(rename = "tongyiConfigured")]
    pub tongyi_configured: bool,
    #[serde(rename = "openaiConfigured")]
    pub openai_configured: bool,
    #[serde(rename = "tongyiModel")]
    pub tongyi_model: String,
    #[serde(rename = "openaiModel")]
    pub openai_model: String,
}

/// Partial settings update from the options surface.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SettingsUpdate {
    #[serde(rename = "selectedProvider")]
    pub selected_provider: Option<LLMProvider>,
    #[serde(rename = "tongyiApiKey")]
    pub tongyi_api_key: Option<String>,
    #[serde(rename = "openaiApiKey")]
    pub openai_api_key: Option<String>,
    #[serde(rename = "tongyiModel")]
    pub tongyi_model: Option<String>,
    #[serde(rename = "openaiModel")]
    pub openai_model: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_names() {
        assert_eq!(LLMProvider::from_name("Tongyi"), Some(LLMProvider::Tongyi));
        assert_eq!(LLMProvider::from_name("qwen"), Some(LLMProvider::Tongyi));
        assert_eq!(LLMProvider::from_name(" openai "), Some(LLMProvider::OpenAI));
        assert_eq!(LLMProvider::from_name("groq"), None);
        for p in LLMProvider::all() {
            assert_eq!(LLMProvider::from_name(p.name()), Some(*p));
        }
    }

    #[test]
    fn test_provider_serde() {
        assert_eq!(serde_json::to_value(LLMProvider::OpenAI).unwrap(), "openai");
        let p: LLMProvider = serde_json::from_str("\"tongyi\"").unwrap();
        assert_eq!(p, LLMProvider::Tongyi);
    }

    #[test]
    fn test_message_wire_shape() {
        let json = serde_json::to_value(ChatMessage::assistant("hi")).unwrap();
        assert_eq!(json, serde_json::json!({"role": "assistant", "content": "hi"}));
    }

    #[test]
    fn test_update_partial() {
        let update: SettingsUpdate =
            serde_json::from_value(serde_json::json!({"openaiApiKey": "sk-1"})).unwrap();
        assert_eq!(update.openai_api_key.as_deref(), Some("sk-1"));
        assert!(update.selected_provider.is_none());
    }
}

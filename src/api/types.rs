//! api::types
//!
//! Data models for the instance REST contract. The wire shapes are dictated
//! by the external Dify service; nothing here is our design.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// An assistant/agent configuration exposed by an instance.
///
/// This is the canonical shape for both wire responses and the locally
/// persisted apps list. The older locally-entered shape ([`LegacyApp`]) is a
/// conversion target, not a parallel format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct App {
    /// Instance-assigned identifier (or minted locally during migration).
    pub id: String,

    /// Display name.
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// App mode as reported by the instance ("chat", "completion", ...).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon_background: Option<String>,

    /// API endpoint carried over from a legacy locally-entered app.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_url: Option<String>,

    /// App API key carried over from a legacy locally-entered app.
    /// Never logged; redaction is the caller's responsibility when printing.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
}

/// The older locally-entered app shape: `{id, appId, appKey, apiUrl}`.
///
/// Exists only so stored lists written by earlier clients migrate cleanly.
#[derive(Debug, Clone, Deserialize)]
pub struct LegacyApp {
    #[serde(default)]
    pub id: Option<String>,

    #[serde(rename = "appId")]
    pub app_id: String,

    #[serde(rename = "appKey")]
    pub app_key: String,

    #[serde(rename = "apiUrl")]
    pub api_url: String,
}

impl From<LegacyApp> for App {
    fn from(legacy: LegacyApp) -> Self {
        App {
            id: legacy
                .id
                .unwrap_or_else(|| uuid::Uuid::new_v4().to_string()),
            name: legacy.app_id,
            description: None,
            mode: None,
            icon: None,
            icon_background: None,
            api_url: Some(legacy.api_url),
            api_key: Some(legacy.app_key),
        }
    }
}

/// A conversation held with an app.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Conversation {
    pub id: String,

    #[serde(default)]
    pub name: String,

    /// Unix timestamp of the last update.
    #[serde(default)]
    pub updated_at: i64,

    /// Prompt variable values the conversation was started with.
    #[serde(default)]
    pub inputs: Value,
}

/// Prompt parameters advertised by an app.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppParameters {
    #[serde(default)]
    pub opening_statement: Option<String>,

    /// Prompt variable definitions, kept as raw values: the form schema is
    /// the instance's business and only rendered, never interpreted, here.
    #[serde(default)]
    pub user_input_form: Vec<Value>,
}

/// Request body for `POST /chat-messages`.
#[derive(Debug, Clone, Serialize)]
pub struct ChatMessageRequest {
    /// Prompt variable values.
    pub inputs: Value,

    /// The user's message text.
    pub query: String,

    /// Continue an existing conversation when set; a new conversation is
    /// created server-side otherwise.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conversation_id: Option<String>,

    /// Stable end-user identifier.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,

    /// Always "blocking"; streaming is out of scope for this client.
    pub response_mode: &'static str,
}

impl ChatMessageRequest {
    /// A blocking chat message with no prompt variables.
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            inputs: Value::Object(serde_json::Map::new()),
            query: query.into(),
            conversation_id: None,
            user: None,
            response_mode: "blocking",
        }
    }
}

/// Response body for a blocking `POST /chat-messages`.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatMessageResponse {
    #[serde(default)]
    pub id: Option<String>,

    /// The conversation the message landed in. Present even for the first
    /// message, which creates the conversation as a side effect.
    pub conversation_id: String,

    pub answer: String,
}

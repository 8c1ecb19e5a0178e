//! Chat Model Seam
//!
//! The trait boundary between the conversation layer and whichever model
//! backs it. Production uses Gemini; tests script replies.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// Who produced a conversation turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
    /// Result of an executed operation, shown inline in the conversation
    Function,
}

/// One turn of the conversation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatTurn {
    pub role: ChatRole,
    pub content: String,
    pub at: DateTime<Utc>,
}

impl ChatTurn {
    pub fn new(role: ChatRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            at: Utc::now(),
        }
    }
}

/// A function invocation requested by the model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionCall {
    pub name: String,
    #[serde(default)]
    pub args: Map<String, Value>,
}

impl FunctionCall {
    /// A call without arguments is a suggestion, not something to execute
    pub fn has_args(&self) -> bool {
        !self.args.is_empty()
    }

    /// Argument as a string; numbers are stringified the way the model
    /// sometimes sends amounts.
    pub fn arg(&self, name: &str) -> Option<String> {
        match self.args.get(name)? {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }
}

/// Declaration of a callable function, in the schema shape Gemini expects
#[derive(Debug, Clone, Serialize)]
pub struct FunctionDecl {
    pub name: String,
    pub description: String,
    pub parameters: Value,
}

/// What the model answered
#[derive(Debug, Clone, Default)]
pub struct ModelReply {
    pub text: String,
    pub function_call: Option<FunctionCall>,
}

/// Errors from a model backend
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("Model unavailable")]
    Unavailable,

    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Model API error {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Failed to decode model response: {0}")]
    Decode(String),

    #[error("No API key configured")]
    NotConfigured,
}

/// A conversational model that can request function calls
#[async_trait]
pub trait ChatModel: Send + Sync {
    async fn generate(
        &self,
        system_prompt: &str,
        history: &[ChatTurn],
        functions: &[FunctionDecl],
    ) -> Result<ModelReply, ModelError>;
}

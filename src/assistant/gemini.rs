//! Gemini REST Client
//!
//! Speaks the `generateContent` API. Gemini has no system role and no
//! assistant role: the system prompt goes in as a leading `model` turn and
//! assistant history is mapped to `model`. Function results never travel
//! back to the model, only user and assistant text does.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::model::{ChatModel, ChatRole, ChatTurn, FunctionCall, FunctionDecl, ModelError, ModelReply};

/// Configuration for the Gemini client
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub api_key: String,
    pub model: String,
    pub base_url: String,
    pub timeout_secs: u64,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            model: "gemini-1.5-flash".to_string(),
            base_url: "https://generativelanguage.googleapis.com".to_string(),
            timeout_secs: 30,
        }
    }
}

/// Gemini `generateContent` client
pub struct GeminiClient {
    client: Client,
    config: GeminiConfig,
}

impl GeminiClient {
    pub fn new(config: GeminiConfig) -> Self {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .expect("Failed to create HTTP client");

        Self { client, config }
    }

    pub fn is_configured(&self) -> bool {
        !self.config.api_key.is_empty()
    }

    fn url(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent?key={}",
            self.config.base_url.trim_end_matches('/'),
            self.config.model,
            urlencoding::encode(&self.config.api_key)
        )
    }

    fn build_request(
        &self,
        system_prompt: &str,
        history: &[ChatTurn],
        functions: &[FunctionDecl],
    ) -> GenerateRequest {
        let mut contents = Vec::with_capacity(history.len() + 1);
        contents.push(Content {
            role: "model".to_string(),
            parts: vec![Part::text(system_prompt)],
        });

        for turn in history {
            let role = match turn.role {
                ChatRole::User => "user",
                ChatRole::Assistant => "model",
                // Operation results stay in the dashboard conversation only
                ChatRole::Function => continue,
            };
            contents.push(Content {
                role: role.to_string(),
                parts: vec![Part::text(&turn.content)],
            });
        }

        GenerateRequest {
            contents,
            tools: vec![Tool {
                function_declarations: functions.to_vec(),
            }],
            generation_config: GenerationConfig {
                temperature: 0.7,
                top_p: 0.8,
                top_k: 40,
                max_output_tokens: 1024,
            },
        }
    }
}

#[async_trait]
impl ChatModel for GeminiClient {
    async fn generate(
        &self,
        system_prompt: &str,
        history: &[ChatTurn],
        functions: &[FunctionDecl],
    ) -> Result<ModelReply, ModelError> {
        if !self.is_configured() {
            return Err(ModelError::NotConfigured);
        }

        let request = self.build_request(system_prompt, history, functions);

        let response = self
            .client
            .post(self.url())
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() || e.is_connect() {
                    ModelError::Unavailable
                } else {
                    ModelError::Request(e)
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorEnvelope>(&text)
                .map(|e| e.error.message)
                .unwrap_or(text);
            return Err(ModelError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body: GenerateResponse = response
            .json()
            .await
            .map_err(|e| ModelError::Decode(e.to_string()))?;

        Ok(parse_reply(body))
    }
}

/// First candidate's text plus any function call among its parts
fn parse_reply(body: GenerateResponse) -> ModelReply {
    let parts = body
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .map(|c| c.parts)
        .unwrap_or_default();

    let text = parts
        .first()
        .and_then(|p| p.text.clone())
        .unwrap_or_default();

    let function_call = parts.into_iter().find_map(|p| p.function_call).map(|fc| {
        FunctionCall {
            name: fc.name,
            args: fc.args.unwrap_or_default(),
        }
    });

    ModelReply {
        text,
        function_call,
    }
}

// ============================================
// Wire DTOs
// ============================================

#[derive(Debug, Serialize)]
struct GenerateRequest {
    contents: Vec<Content>,
    tools: Vec<Tool>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(default)]
    role: String,
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize, Default)]
struct Part {
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(rename = "functionCall", skip_serializing_if = "Option::is_none")]
    function_call: Option<WireFunctionCall>,
}

impl Part {
    fn text(s: &str) -> Self {
        Self {
            text: Some(s.to_string()),
            function_call: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct WireFunctionCall {
    name: String,
    #[serde(default)]
    args: Option<Map<String, Value>>,
}

#[derive(Debug, Serialize)]
struct Tool {
    #[serde(rename = "functionDeclarations")]
    function_declarations: Vec<FunctionDecl>,
}

#[derive(Debug, Serialize)]
struct GenerationConfig {
    temperature: f32,
    #[serde(rename = "topP")]
    top_p: f32,
    #[serde(rename = "topK")]
    top_k: u32,
    #[serde(rename = "maxOutputTokens")]
    max_output_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    message: String,
}

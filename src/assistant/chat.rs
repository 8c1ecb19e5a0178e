//! Assistant Conversations
//!
//! Per-session chat state and the send loop: append the user turn, ask
//! the model, execute a requested function when the wallet allows it,
//! and record everything so the dashboard can re-render the thread.
//! Model failures degrade to an apology instead of surfacing an error.

use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::functions::{function_declarations, FunctionExecutor, FunctionResult};
use super::model::{ChatModel, ChatRole, ChatTurn, FunctionCall, FunctionDecl};

const GREETING: &str =
    "Hello! I'm your DSC AI assistant. How can I help you with your decentralized stablecoin today?";

const MODEL_ERROR_REPLY: &str =
    "I'm sorry, I encountered an error while processing your request. Please try again later.";

const EMPTY_REPLY: &str = "I'm sorry, I couldn't generate a proper response. Please try again.";

const WALLET_REQUIRED: &str = "Please connect your wallet to perform this action.";

/// Turns shown to the model per request. Older turns stay in the stored
/// thread but fall out of the model's view.
const MODEL_HISTORY_LIMIT: usize = 20;

/// One answered message
#[derive(Debug, Clone, Serialize)]
pub struct ChatReply {
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub function_call: Option<FunctionCall>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub function_result: Option<FunctionResult>,
}

/// Conversation manager for the AI assistant
pub struct ChatService {
    model: Arc<dyn ChatModel>,
    executor: FunctionExecutor,
    system_prompt: String,
    functions: Vec<FunctionDecl>,
    histories: RwLock<HashMap<Uuid, Vec<ChatTurn>>>,
}

impl ChatService {
    pub fn new(model: Arc<dyn ChatModel>, executor: FunctionExecutor, system_prompt: String) -> Self {
        Self {
            model,
            executor,
            system_prompt,
            functions: function_declarations(),
            histories: RwLock::new(HashMap::new()),
        }
    }

    /// Answer one user message for a session
    ///
    /// A function call with arguments runs immediately when a wallet is
    /// connected. Without arguments the call is returned as a suggestion
    /// for the dashboard to complete.
    pub async fn send(&self, session: Uuid, wallet: Option<&str>, message: &str) -> ChatReply {
        let model_view = {
            let mut histories = self.histories.write().await;
            let history = thread(&mut histories, session);
            history.push(ChatTurn::new(ChatRole::User, message));
            recent_model_turns(history)
        };

        let reply = match self
            .model
            .generate(&self.system_prompt, &model_view, &self.functions)
            .await
        {
            Ok(reply) => reply,
            Err(e) => {
                tracing::error!("Assistant model call failed: {}", e);
                self.append(session, ChatRole::Assistant, MODEL_ERROR_REPLY).await;
                return ChatReply {
                    text: MODEL_ERROR_REPLY.to_string(),
                    function_call: None,
                    function_result: None,
                };
            }
        };

        let text = if reply.text.is_empty() {
            EMPTY_REPLY.to_string()
        } else {
            reply.text
        };
        self.append(session, ChatRole::Assistant, text.as_str()).await;

        let call = match reply.function_call {
            Some(call) => call,
            None => {
                return ChatReply {
                    text,
                    function_call: None,
                    function_result: None,
                }
            }
        };

        if !call.has_args() {
            return ChatReply {
                text,
                function_call: Some(call),
                function_result: None,
            };
        }

        let result = match wallet {
            Some(address) => {
                let result = self.executor.execute(&call, address).await;
                self.append(session, ChatRole::Function, result.result.as_str())
                    .await;
                result
            }
            None => FunctionResult {
                success: false,
                result: WALLET_REQUIRED.to_string(),
                tx_hash: None,
            },
        };

        ChatReply {
            text,
            function_call: Some(call),
            function_result: Some(result),
        }
    }

    /// Full stored thread for a session, seeding the greeting on first
    /// access
    pub async fn history(&self, session: Uuid) -> Vec<ChatTurn> {
        let mut histories = self.histories.write().await;
        thread(&mut histories, session).clone()
    }

    /// Drop a session's thread, as on wallet disconnect
    pub async fn clear(&self, session: &Uuid) {
        self.histories.write().await.remove(session);
    }

    async fn append(&self, session: Uuid, role: ChatRole, content: &str) {
        let mut histories = self.histories.write().await;
        thread(&mut histories, session).push(ChatTurn::new(role, content));
    }
}

fn thread(histories: &mut HashMap<Uuid, Vec<ChatTurn>>, session: Uuid) -> &mut Vec<ChatTurn> {
    histories
        .entry(session)
        .or_insert_with(|| vec![ChatTurn::new(ChatRole::Assistant, GREETING)])
}

/// The model sees user and assistant turns only. Function results stay in
/// the stored thread for the dashboard.
fn recent_model_turns(history: &[ChatTurn]) -> Vec<ChatTurn> {
    let mut turns: Vec<ChatTurn> = history
        .iter()
        .filter(|t| t.role != ChatRole::Function)
        .rev()
        .take(MODEL_HISTORY_LIMIT)
        .cloned()
        .collect();
    turns.reverse();
    turns
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assistant::model::{ModelError, ModelReply};
    use crate::config::{ContractsConfig, NetworkConfig};
    use crate::engine::{EngineClient, EngineConfig};
    use crate::ops::Operations;
    use crate::wallet::{PortfolioService, TokenRegistry};
    use async_trait::async_trait;
    use axum::routing::post;
    use axum::{Json, Router};
    use std::collections::VecDeque;
    use std::sync::Mutex;

    const USER: &str = "0x1234567890abcdef1234567890abcdef12345678";

    /// Plays back canned replies and records what the model was shown
    struct ScriptedModel {
        replies: Mutex<VecDeque<Result<ModelReply, ModelError>>>,
        views: Mutex<Vec<Vec<ChatTurn>>>,
    }

    impl ScriptedModel {
        fn new(replies: Vec<Result<ModelReply, ModelError>>) -> Arc<Self> {
            Arc::new(Self {
                replies: Mutex::new(replies.into()),
                views: Mutex::new(Vec::new()),
            })
        }

        fn last_view(&self) -> Vec<ChatTurn> {
            self.views.lock().unwrap().last().cloned().unwrap()
        }
    }

    #[async_trait]
    impl ChatModel for ScriptedModel {
        async fn generate(
            &self,
            _system_prompt: &str,
            history: &[ChatTurn],
            _functions: &[FunctionDecl],
        ) -> Result<ModelReply, ModelError> {
            self.views.lock().unwrap().push(history.to_vec());
            self.replies
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Ok(ModelReply::default()))
        }
    }

    fn text_reply(text: &str) -> Result<ModelReply, ModelError> {
        Ok(ModelReply {
            text: text.to_string(),
            function_call: None,
        })
    }

    fn call_reply(text: &str, name: &str, args: serde_json::Value) -> Result<ModelReply, ModelError> {
        Ok(ModelReply {
            text: text.to_string(),
            function_call: Some(
                serde_json::from_value(serde_json::json!({"name": name, "args": args})).unwrap(),
            ),
        })
    }

    async fn executor_at(app: Router) -> FunctionExecutor {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        let engine = Arc::new(EngineClient::new(EngineConfig {
            base_url: format!("http://{}", addr),
            timeout_secs: 5,
            max_retries: 0,
        }));
        let contracts = ContractsConfig::default();
        let ops = Arc::new(Operations::new(
            engine.clone(),
            contracts.clone(),
            &NetworkConfig::default(),
        ));
        let portfolio = Arc::new(PortfolioService::new(engine, TokenRegistry::new(&contracts)));
        FunctionExecutor::new(ops, portfolio)
    }

    async fn service(model: Arc<ScriptedModel>) -> ChatService {
        let executor = executor_at(Router::new().route(
            "/mint-weth",
            post(|| async { Json(serde_json::json!({"tx_hash": "0xaa"})) }),
        ))
        .await;
        ChatService::new(model, executor, "You are a test assistant.".to_string())
    }

    #[tokio::test]
    async fn test_history_starts_with_greeting() {
        let svc = service(ScriptedModel::new(vec![])).await;

        let history = svc.history(Uuid::new_v4()).await;
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].role, ChatRole::Assistant);
        assert_eq!(history[0].content, GREETING);
    }

    #[tokio::test]
    async fn test_send_appends_user_and_assistant_turns() {
        let model = ScriptedModel::new(vec![text_reply("DSC is a stablecoin.")]);
        let svc = service(model.clone()).await;
        let session = Uuid::new_v4();

        let reply = svc.send(session, Some(USER), "What is DSC?").await;
        assert_eq!(reply.text, "DSC is a stablecoin.");
        assert!(reply.function_call.is_none());

        let history = svc.history(session).await;
        let roles: Vec<ChatRole> = history.iter().map(|t| t.role).collect();
        assert_eq!(roles, vec![ChatRole::Assistant, ChatRole::User, ChatRole::Assistant]);
        assert_eq!(history[1].content, "What is DSC?");

        // The model saw the greeting plus the new user turn
        let view = model.last_view();
        assert_eq!(view.len(), 2);
        assert_eq!(view[1].content, "What is DSC?");
    }

    #[tokio::test]
    async fn test_empty_model_text_falls_back() {
        let model = ScriptedModel::new(vec![text_reply("")]);
        let svc = service(model).await;
        let session = Uuid::new_v4();

        let reply = svc.send(session, None, "hello").await;
        assert_eq!(reply.text, EMPTY_REPLY);

        let history = svc.history(session).await;
        assert_eq!(history.last().unwrap().content, EMPTY_REPLY);
    }

    #[tokio::test]
    async fn test_model_error_degrades_to_apology() {
        let model = ScriptedModel::new(vec![Err(ModelError::Unavailable)]);
        let svc = service(model).await;
        let session = Uuid::new_v4();

        let reply = svc.send(session, Some(USER), "hello").await;
        assert_eq!(reply.text, MODEL_ERROR_REPLY);
        assert!(reply.function_call.is_none());

        let history = svc.history(session).await;
        assert_eq!(history.last().unwrap().role, ChatRole::Assistant);
        assert_eq!(history.last().unwrap().content, MODEL_ERROR_REPLY);
    }

    #[tokio::test]
    async fn test_function_call_executes_with_wallet() {
        let model = ScriptedModel::new(vec![call_reply(
            "Minting WETH for you.",
            "mintWETH",
            serde_json::json!({"amount": "2"}),
        )]);
        let svc = service(model).await;
        let session = Uuid::new_v4();

        let reply = svc.send(session, Some(USER), "mint 2 weth").await;
        assert_eq!(reply.text, "Minting WETH for you.");
        let result = reply.function_result.unwrap();
        assert!(result.success);
        assert_eq!(result.result, "Successfully minted 2 WETH");

        let history = svc.history(session).await;
        let last = history.last().unwrap();
        assert_eq!(last.role, ChatRole::Function);
        assert_eq!(last.content, "Successfully minted 2 WETH");
    }

    #[tokio::test]
    async fn test_function_call_without_wallet_is_refused() {
        let model = ScriptedModel::new(vec![call_reply(
            "Minting WETH for you.",
            "mintWETH",
            serde_json::json!({"amount": "2"}),
        )]);
        let svc = service(model).await;
        let session = Uuid::new_v4();

        let reply = svc.send(session, None, "mint 2 weth").await;
        let result = reply.function_result.unwrap();
        assert!(!result.success);
        assert_eq!(result.result, WALLET_REQUIRED);

        // Nothing ran, so no function turn is recorded
        let history = svc.history(session).await;
        assert_eq!(history.last().unwrap().role, ChatRole::Assistant);
    }

    #[tokio::test]
    async fn test_function_call_without_args_is_a_suggestion() {
        let model = ScriptedModel::new(vec![call_reply(
            "How much WETH would you like to mint?",
            "mintWETH",
            serde_json::json!({}),
        )]);
        let svc = service(model).await;
        let session = Uuid::new_v4();

        let reply = svc.send(session, Some(USER), "mint weth").await;
        assert_eq!(reply.function_call.unwrap().name, "mintWETH");
        assert!(reply.function_result.is_none());

        let history = svc.history(session).await;
        assert_eq!(history.len(), 3);
    }

    #[tokio::test]
    async fn test_function_turns_hidden_from_model() {
        let model = ScriptedModel::new(vec![
            call_reply("Minting.", "mintWETH", serde_json::json!({"amount": "1"})),
            text_reply("Anything else?"),
        ]);
        let svc = service(model.clone()).await;
        let session = Uuid::new_v4();

        svc.send(session, Some(USER), "mint 1 weth").await;
        svc.send(session, Some(USER), "thanks").await;

        let view = model.last_view();
        assert!(view.iter().all(|t| t.role != ChatRole::Function));
        assert_eq!(view.last().unwrap().content, "thanks");
    }

    #[tokio::test]
    async fn test_model_view_is_capped() {
        let replies = (0..15).map(|i| text_reply(&format!("reply {}", i))).collect();
        let model = ScriptedModel::new(replies);
        let svc = service(model.clone()).await;
        let session = Uuid::new_v4();

        for i in 0..15 {
            svc.send(session, Some(USER), &format!("message {}", i)).await;
        }

        let view = model.last_view();
        assert_eq!(view.len(), MODEL_HISTORY_LIMIT);
        assert_eq!(view.last().unwrap().content, "message 14");

        // The stored thread keeps everything
        let history = svc.history(session).await;
        assert_eq!(history.len(), 31);
    }

    #[tokio::test]
    async fn test_clear_resets_thread() {
        let model = ScriptedModel::new(vec![text_reply("hi")]);
        let svc = service(model).await;
        let session = Uuid::new_v4();

        svc.send(session, None, "hello").await;
        assert_eq!(svc.history(session).await.len(), 3);

        svc.clear(&session).await;
        assert_eq!(svc.history(session).await.len(), 1);
    }
}

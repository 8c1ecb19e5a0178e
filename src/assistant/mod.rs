//! AI Assistant
//!
//! Chat assistant for the dashboard. A Gemini-backed model receives the
//! conversation plus declarations of the wallet operations it may invoke;
//! complete function calls are executed against the operation layer and
//! their results folded back into the conversation.

mod chat;
mod functions;
mod gemini;
mod model;

pub use chat::{ChatReply, ChatService};
pub use functions::{function_declarations, system_prompt, FunctionExecutor, FunctionResult};
pub use gemini::{GeminiClient, GeminiConfig};
pub use model::{ChatModel, ChatRole, ChatTurn, FunctionCall, FunctionDecl, ModelError, ModelReply};

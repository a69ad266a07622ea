//! LLM client abstraction for the orchestration loop.
//!
//! The loop depends on a callable that takes the conversation and returns
//! assistant text plus any tool invocation requests. Implementations:
//! [`MockLlm`] (tests) and [`ChatOpenAI`] (real API via `async-openai`).
//! Calls are synchronous request/response; no streaming in this core.

mod mock;
mod openai;

pub use mock::MockLlm;
pub use openai::ChatOpenAI;

use async_trait::async_trait;

use crate::error::AgentError;
use crate::message::Message;

/// Tool choice mode when tools are bound: the model may choose (auto), must
/// not call tools (none), or must call at least one (required).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum ToolChoiceMode {
    #[default]
    Auto,
    None,
    Required,
}

/// A single tool invocation requested by the model.
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
pub struct ToolCall {
    /// Tool name as registered in the dispatcher.
    pub name: String,
    /// Arguments as a raw JSON string; parsed at dispatch time.
    pub arguments: String,
    /// Provider-assigned call id, when available.
    pub id: Option<String>,
}

/// Token usage for one model call.
#[derive(Clone, Debug, Default, serde::Serialize, serde::Deserialize)]
pub struct LlmUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

/// One model turn: assistant text and zero or more tool requests.
pub struct LlmResponse {
    pub content: String,
    /// Empty means the model produced a final answer.
    pub tool_calls: Vec<ToolCall>,
    pub usage: Option<LlmUsage>,
}

/// Chat model client: given messages, return text and optional tool calls.
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Model identifier, reported in dispatch outcomes.
    fn model(&self) -> &str;

    /// One turn: read the conversation, return the next assistant step.
    async fn invoke(&self, messages: &[Message]) -> Result<LlmResponse, AgentError>;
}

//! Mock LLM for tests.
//!
//! Returns scripted responses: fixed text, fixed tool calls, a two-phase
//! "tools first, then answer" sequence, tool calls on every turn, or a
//! permanent error. Counts invocations so tests can assert round bounds.

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use crate::error::AgentError;
use crate::llm::{LlmClient, LlmResponse, ToolCall};
use crate::message::Message;

enum Script {
    /// Same response every turn.
    Fixed { content: String, tool_calls: Vec<ToolCall> },
    /// First turn returns tool calls, every later turn returns final text.
    ToolsThenAnswer {
        first_content: String,
        tool_calls: Vec<ToolCall>,
        final_content: String,
    },
    /// Every turn fails.
    Failing { message: String },
}

pub struct MockLlm {
    script: Script,
    invocations: AtomicUsize,
}

impl MockLlm {
    /// Answers directly with no tool calls.
    pub fn answering(content: impl Into<String>) -> Self {
        Self {
            script: Script::Fixed {
                content: content.into(),
                tool_calls: vec![],
            },
            invocations: AtomicUsize::new(0),
        }
    }

    /// Requests the given tool calls on the first turn, then answers.
    pub fn tools_then_answer(
        tool_calls: Vec<ToolCall>,
        final_content: impl Into<String>,
    ) -> Self {
        Self {
            script: Script::ToolsThenAnswer {
                first_content: String::new(),
                tool_calls,
                final_content: final_content.into(),
            },
            invocations: AtomicUsize::new(0),
        }
    }

    /// Requests the given tool calls on every turn (never answers).
    pub fn always_tools(tool_calls: Vec<ToolCall>) -> Self {
        Self {
            script: Script::Fixed {
                content: String::new(),
                tool_calls,
            },
            invocations: AtomicUsize::new(0),
        }
    }

    /// Fails every turn with the given message.
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            script: Script::Failing {
                message: message.into(),
            },
            invocations: AtomicUsize::new(0),
        }
    }

    /// One scripted request for `get_circuit_image` with the given location.
    pub fn circuit_call(location: &str) -> ToolCall {
        ToolCall {
            name: crate::tools::TOOL_GET_CIRCUIT_IMAGE.to_string(),
            arguments: format!(r#"{{"location":"{}"}}"#, location),
            id: Some("call-1".to_string()),
        }
    }

    /// Number of `invoke` calls made so far.
    pub fn invocations(&self) -> usize {
        self.invocations.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LlmClient for MockLlm {
    fn model(&self) -> &str {
        "mock-llm"
    }

    async fn invoke(&self, _messages: &[Message]) -> Result<LlmResponse, AgentError> {
        let turn = self.invocations.fetch_add(1, Ordering::SeqCst);
        match &self.script {
            Script::Fixed {
                content,
                tool_calls,
            } => Ok(LlmResponse {
                content: content.clone(),
                tool_calls: tool_calls.clone(),
                usage: None,
            }),
            Script::ToolsThenAnswer {
                first_content,
                tool_calls,
                final_content,
            } => {
                if turn == 0 {
                    Ok(LlmResponse {
                        content: first_content.clone(),
                        tool_calls: tool_calls.clone(),
                        usage: None,
                    })
                } else {
                    Ok(LlmResponse {
                        content: final_content.clone(),
                        tool_calls: vec![],
                        usage: None,
                    })
                }
            }
            Script::Failing { message } => {
                Err(AgentError::ExecutionFailed(message.clone()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn answering_mock_never_requests_tools() {
        let llm = MockLlm::answering("hello");
        let r = llm.invoke(&[]).await.unwrap();
        assert_eq!(r.content, "hello");
        assert!(r.tool_calls.is_empty());
        assert_eq!(llm.invocations(), 1);
    }

    #[tokio::test]
    async fn tools_then_answer_switches_after_first_turn() {
        let llm = MockLlm::tools_then_answer(vec![MockLlm::circuit_call("monaco")], "done");
        let first = llm.invoke(&[]).await.unwrap();
        assert_eq!(first.tool_calls.len(), 1);
        let second = llm.invoke(&[]).await.unwrap();
        assert!(second.tool_calls.is_empty());
        assert_eq!(second.content, "done");
    }

    #[tokio::test]
    async fn failing_mock_returns_error() {
        let llm = MockLlm::failing("offline");
        assert!(llm.invoke(&[]).await.is_err());
    }
}

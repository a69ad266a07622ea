//! Agent-level error types.
//!
//! Returned by [`LlmClient::invoke`](crate::llm::LlmClient::invoke); the
//! orchestration loop converts these into an `Errored` outcome rather than
//! letting them reach the caller.

use std::time::Duration;

use thiserror::Error;

/// Error from one model turn.
#[derive(Debug, Error)]
pub enum AgentError {
    /// The model call failed (request build, API error, empty response).
    #[error("execution failed: {0}")]
    ExecutionFailed(String),

    /// The model call exceeded its wall-clock budget.
    #[error("model call timed out after {0:?}")]
    Timeout(Duration),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_message() {
        let err = AgentError::ExecutionFailed("boom".to_string());
        let s = err.to_string();
        assert!(s.contains("execution failed"), "{}", s);
        assert!(s.contains("boom"), "{}", s);
    }

    #[test]
    fn timeout_display_mentions_duration() {
        let s = AgentError::Timeout(Duration::from_secs(15)).to_string();
        assert!(s.contains("timed out"), "{}", s);
        assert!(s.contains("15"), "{}", s);
    }
}

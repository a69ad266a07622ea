//! Orchestration loop: bounded tool-calling dispatch against the chat model.
//!
//! One `process_query` call drives at most [`MAX_DISPATCH_ROUNDS`] model turns:
//! the first may request tools, the second is forced to synthesize a final
//! answer from the tool results. The loop always returns a structured
//! [`DispatchOutcome`]; model failures and exhaustion become outcome statuses,
//! never errors at the caller.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use crate::dispatch::ToolDispatcher;
use crate::llm::LlmClient;
use crate::message::Message;
use crate::tools::ToolOutput;

/// Hard bound on model turns per query: one for tool selection, one for the
/// forced final synthesis. Bounds worst-case latency and cost against a slow
/// or flaky external model.
pub const MAX_DISPATCH_ROUNDS: u32 = 2;

const DEFAULT_HISTORY_LIMIT: usize = 10;
const DEFAULT_MODEL_TIMEOUT: Duration = Duration::from_secs(15);

/// System instruction seeded at the start of every dispatch.
pub const SYSTEM_PROMPT: &str = "\
You are an F1 assistant answering questions about Formula 1 circuits and regulations.
Decide immediately which tools you need and call them all in one turn:
- get_circuit_image when the user wants to see a circuit, track layout, or map;
- query_regulations for questions about rules, penalties, points, or procedures.
Do not deliberate and do not ask follow-up questions. If no tool applies, answer directly and briefly.";

/// Instruction appended after tool results to force the final turn.
const FORCE_FINAL_PROMPT: &str = "\
Produce the final answer now using the tool results above. Be terse. Do not request more tools.";

const EXHAUSTED_APOLOGY: &str =
    "I could not finish answering within the allotted tool rounds; here is what I found.";

/// Terminal state of one dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeStatus {
    /// The model produced a tool-free final answer.
    Answered,
    /// The round bound was reached before a tool-free answer.
    MaxRoundsReached,
    /// A model call failed or timed out.
    Errored,
}

/// Structured result of one `process_query` call.
#[derive(Debug, Clone, serde::Serialize)]
pub struct DispatchOutcome {
    /// Final (or partial, or error) response text.
    pub response: String,
    pub status: OutcomeStatus,
    /// Tool names in order of first use.
    pub tools_used: Vec<String>,
    /// Last result per tool name.
    pub tool_results: HashMap<String, ToolOutput>,
    /// Model turns taken; never exceeds the configured maximum.
    pub rounds: u32,
    /// Identifier of the model that drove the dispatch.
    pub model: String,
}

/// Drives bounded tool-calling conversations. Owns its collaborators by
/// injection; construct the tools and model client once at startup and share
/// the orchestrator across queries.
pub struct Orchestrator {
    llm: Arc<dyn LlmClient>,
    dispatcher: ToolDispatcher,
    max_rounds: u32,
    history_limit: usize,
    model_timeout: Duration,
}

impl Orchestrator {
    pub fn new(llm: Arc<dyn LlmClient>, dispatcher: ToolDispatcher) -> Self {
        Self {
            llm,
            dispatcher,
            max_rounds: MAX_DISPATCH_ROUNDS,
            history_limit: DEFAULT_HISTORY_LIMIT,
            model_timeout: DEFAULT_MODEL_TIMEOUT,
        }
    }

    pub fn with_max_rounds(mut self, max_rounds: u32) -> Self {
        self.max_rounds = max_rounds.max(1);
        self
    }

    /// Number of trailing history messages kept when seeding a dispatch.
    pub fn with_history_limit(mut self, history_limit: usize) -> Self {
        self.history_limit = history_limit;
        self
    }

    /// Wall-clock budget for each model call.
    pub fn with_model_timeout(mut self, timeout: Duration) -> Self {
        self.model_timeout = timeout;
        self
    }

    fn seed_messages(&self, query: &str, history: &[Message]) -> Vec<Message> {
        let tail = history.len().saturating_sub(self.history_limit);
        let mut messages = Vec::with_capacity(history.len() - tail + 2);
        messages.push(Message::system(SYSTEM_PROMPT));
        messages.extend_from_slice(&history[tail..]);
        messages.push(Message::user(query));
        messages
    }

    /// Processes one user query against the optional prior conversation.
    ///
    /// History is read-only here; callers that want multi-turn continuity
    /// append the query and the returned response to their own copy.
    pub async fn process_query(&self, query: &str, history: &[Message]) -> DispatchOutcome {
        debug!(query = %query, history_len = history.len(), "processing query");

        let mut messages = self.seed_messages(query, history);
        let mut tools_used: Vec<String> = Vec::new();
        let mut tool_results: HashMap<String, ToolOutput> = HashMap::new();
        let mut rounds = 0u32;

        while rounds < self.max_rounds {
            rounds += 1;

            let response =
                match tokio::time::timeout(self.model_timeout, self.llm.invoke(&messages)).await {
                    Ok(Ok(response)) => response,
                    Ok(Err(e)) => {
                        warn!(error = %e, round = rounds, "model call failed");
                        return self.errored(e.to_string(), tools_used, tool_results, rounds);
                    }
                    Err(_) => {
                        let e = crate::error::AgentError::Timeout(self.model_timeout);
                        warn!(round = rounds, "model call timed out");
                        return self.errored(e.to_string(), tools_used, tool_results, rounds);
                    }
                };

            if let Some(usage) = &response.usage {
                debug!(round = rounds, total_tokens = usage.total_tokens, "model turn usage");
            }

            messages.push(Message::assistant(response.content.clone()));

            if response.tool_calls.is_empty() {
                debug!(rounds, tools = ?tools_used, "final answer produced");
                return DispatchOutcome {
                    response: response.content,
                    status: OutcomeStatus::Answered,
                    tools_used,
                    tool_results,
                    rounds,
                    model: self.llm.model().to_string(),
                };
            }

            // Requested tools have no ordering dependency; run them together.
            let executions = response.tool_calls.iter().map(|tc| {
                let name = tc.name.clone();
                let args = tc.arguments.clone();
                async move { (name.clone(), self.dispatcher.execute(&name, &args).await) }
            });
            for (name, output) in futures::future::join_all(executions).await {
                messages.push(Message::tool(&name, output.render()));
                if !tools_used.contains(&name) {
                    tools_used.push(name.clone());
                }
                tool_results.insert(name, output);
            }

            messages.push(Message::user(FORCE_FINAL_PROMPT));
        }

        warn!(rounds, "dispatch rounds exhausted without a final answer");
        let mut response = String::from(EXHAUSTED_APOLOGY);
        for name in &tools_used {
            if let Some(output) = tool_results.get(name) {
                response.push_str(&format!("\n{}: {}", name, output.render()));
            }
        }
        DispatchOutcome {
            response,
            status: OutcomeStatus::MaxRoundsReached,
            tools_used,
            tool_results,
            rounds,
            model: self.llm.model().to_string(),
        }
    }

    fn errored(
        &self,
        message: String,
        tools_used: Vec<String>,
        tool_results: HashMap<String, ToolOutput>,
        rounds: u32,
    ) -> DispatchOutcome {
        DispatchOutcome {
            response: format!("Error processing query: {}", message),
            status: OutcomeStatus::Errored,
            tools_used,
            tool_results,
            rounds,
            model: self.llm.model().to_string(),
        }
    }
}

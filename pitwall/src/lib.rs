//! # Pitwall
//!
//! An F1 assistant agent: natural-language questions are routed by a
//! tool-calling chat model to one of two capabilities, circuit-map image
//! lookup by location name or regulations answers from a hosted
//! retrieve-and-generate backend.
//!
//! ## Design
//!
//! - **Catalog-first location resolution**: [`CircuitCatalog::resolve`] maps
//!   free text to a canonical circuit identifier through three deterministic
//!   tiers (exact, substring, token); catalog order settles ambiguity.
//! - **Tools as a tagged-union contract**: every tool execution yields a
//!   [`ToolOutput`] (`Image | Text | Error`) with a metadata map; contract
//!   failures are data, not errors.
//! - **Contained dispatch**: [`ToolDispatcher::execute`] never panics or
//!   propagates; unknown names and tool failures come back as error outputs.
//! - **Bounded orchestration**: [`Orchestrator::process_query`] runs at most
//!   [`MAX_DISPATCH_ROUNDS`] model turns (tool selection, then forced
//!   synthesis) and always returns a structured [`DispatchOutcome`].
//!
//! ## Main modules
//!
//! - [`catalog`]: [`CircuitCatalog`], [`SEASON_CIRCUITS`].
//! - [`tools`]: [`Tool`], [`ToolRegistry`], [`CircuitMapTool`], [`RegulationsTool`].
//! - [`dispatch`]: [`ToolDispatcher`].
//! - [`agent`]: [`Orchestrator`], [`DispatchOutcome`], [`OutcomeStatus`].
//! - [`llm`]: [`LlmClient`] trait, [`ChatOpenAI`], [`MockLlm`].
//! - [`message`]: [`Message`] (System / User / Assistant / Tool).
//! - [`retry`]: [`RetryPolicy`] for transient backend failures.

pub mod agent;
pub mod catalog;
pub mod dispatch;
pub mod error;
pub mod llm;
pub mod message;
pub mod retry;
pub mod tools;

pub use agent::{
    DispatchOutcome, Orchestrator, OutcomeStatus, MAX_DISPATCH_ROUNDS, SYSTEM_PROMPT,
};
pub use catalog::{CircuitCatalog, SEASON_CIRCUITS};
pub use dispatch::ToolDispatcher;
pub use error::AgentError;
pub use llm::{ChatOpenAI, LlmClient, LlmResponse, LlmUsage, MockLlm, ToolCall, ToolChoiceMode};
pub use message::Message;
pub use retry::RetryPolicy;
pub use tools::{
    Citation, CircuitMapTool, Metadata, RegulationsTool, Tool, ToolError, ToolOutput,
    ToolRegistry, ToolSpec, TOOL_GET_CIRCUIT_IMAGE, TOOL_QUERY_REGULATIONS,
};

/// When running `cargo test -p pitwall`, initializes tracing from `RUST_LOG`
/// so unit tests in `src/**` can print logs with `--nocapture`.
#[cfg(test)]
mod test_logging {
    use ctor::ctor;
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;
    use tracing_subscriber::EnvFilter;
    use tracing_subscriber::Layer;

    #[ctor]
    fn init() {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
        let _ = tracing_subscriber::registry()
            .with(
                tracing_subscriber::fmt::layer()
                    .with_test_writer()
                    .with_filter(filter),
            )
            .try_init();
    }
}

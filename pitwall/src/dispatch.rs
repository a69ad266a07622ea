//! Tool dispatcher: executes model-issued tool calls, containing every failure.
//!
//! The dispatcher is the error boundary between the untrusted tool calls the
//! model emits and the rest of the system: unknown names, malformed argument
//! payloads, and tool `Err`s all come back as error [`ToolOutput`]s, never as
//! panics or propagated errors.

use serde_json::Value;
use tracing::{debug, trace, warn};

use crate::tools::{metadata_from, ToolOutput, ToolRegistry, ToolSpec};

/// Truncates a string for logging, appending "..." past `max_len`.
fn truncate_for_log(s: &str, max_len: usize) -> String {
    if s.len() <= max_len {
        s.to_string()
    } else {
        format!("{}...", s.chars().take(max_len).collect::<String>())
    }
}

/// Parses a raw tool-argument string to JSON. Malformed payloads degrade to an
/// empty object; a JSON-encoded string containing JSON is unwrapped once.
fn parse_arguments(raw: &str) -> Value {
    let value = if raw.trim().is_empty() {
        serde_json::json!({})
    } else {
        match serde_json::from_str(raw) {
            Ok(v) => v,
            Err(e) => {
                warn!(error = %e, arguments = %raw, "tool arguments parse failed, using empty object");
                serde_json::json!({})
            }
        }
    };
    if let Some(inner) = value.as_str() {
        if let Ok(nested) = serde_json::from_str(inner) {
            return nested;
        }
    }
    value
}

pub struct ToolDispatcher {
    registry: ToolRegistry,
}

impl ToolDispatcher {
    pub fn new(registry: ToolRegistry) -> Self {
        Self { registry }
    }

    /// Specs of all dispatchable tools, for binding to the model client.
    pub fn specs(&self) -> Vec<ToolSpec> {
        self.registry.specs()
    }

    /// Executes one named tool with the model's raw argument string.
    pub async fn execute(&self, name: &str, raw_args: &str) -> ToolOutput {
        let Some(tool) = self.registry.get(name) else {
            warn!(tool = %name, "unknown tool requested");
            return ToolOutput::error(
                format!("Unknown tool: {}", name),
                metadata_from(serde_json::json!({
                    "status": "unknown_tool",
                    "tool": name,
                })),
            );
        };

        let args = parse_arguments(raw_args);
        debug!(tool = %name, args = ?args, "calling tool");

        match tool.call(args).await {
            Ok(output) => {
                trace!(
                    tool = %name,
                    status = ?output.status(),
                    preview = %truncate_for_log(&output.render(), 200),
                    "tool returned"
                );
                output
            }
            Err(e) => {
                warn!(tool = %name, error = %e, "tool call failed");
                ToolOutput::error(
                    e.to_string(),
                    metadata_from(serde_json::json!({
                        "status": "error",
                        "tool": name,
                    })),
                )
            }
        }
    }
}

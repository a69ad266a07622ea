//! Tool abstraction: spec, tagged-union output, trait, and registry.
//!
//! Each tool has a unique name, a [`ToolSpec`] (description plus JSON schema
//! for the model), and async call logic. Tools are registered in a
//! [`ToolRegistry`]; the dispatcher executes them by the name the model
//! supplies and contains every failure as an error [`ToolOutput`].

mod circuit_map;
mod regulations;

pub use circuit_map::{CircuitMapTool, TOOL_GET_CIRCUIT_IMAGE};
pub use regulations::{Citation, RegulationsTool, TOOL_QUERY_REGULATIONS};

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

/// Tool specification shown to the tool-calling model.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct ToolSpec {
    /// Tool name the model uses to invoke it.
    pub name: String,
    /// Human-readable description for the model.
    pub description: Option<String>,
    /// JSON Schema for the arguments.
    pub input_schema: Value,
}

/// Metadata attached to every tool output (status, identifiers, latency,
/// citations, ...).
pub type Metadata = serde_json::Map<String, Value>;

/// Result of one tool execution: an image asset, generated text, or an error.
///
/// Failures that are part of a tool's contract (unknown location, missing
/// asset, exhausted backend retries) are expressed as the `Error` variant,
/// not as `Err`; the dispatcher and the loop treat them as data.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ToolOutput {
    Image { path: PathBuf, metadata: Metadata },
    Text { content: String, metadata: Metadata },
    Error { message: String, metadata: Metadata },
}

impl ToolOutput {
    pub fn image(path: impl Into<PathBuf>, metadata: Metadata) -> Self {
        Self::Image {
            path: path.into(),
            metadata,
        }
    }

    pub fn text(content: impl Into<String>, metadata: Metadata) -> Self {
        Self::Text {
            content: content.into(),
            metadata,
        }
    }

    pub fn error(message: impl Into<String>, metadata: Metadata) -> Self {
        Self::Error {
            message: message.into(),
            metadata,
        }
    }

    pub fn metadata(&self) -> &Metadata {
        match self {
            Self::Image { metadata, .. }
            | Self::Text { metadata, .. }
            | Self::Error { metadata, .. } => metadata,
        }
    }

    /// The `status` metadata entry, when present.
    pub fn status(&self) -> Option<&str> {
        self.metadata().get("status").and_then(Value::as_str)
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error { .. })
    }

    /// Text form folded back into the conversation for the model's next turn.
    pub fn render(&self) -> String {
        match self {
            Self::Image { path, metadata } => {
                let location = metadata
                    .get("location")
                    .and_then(Value::as_str)
                    .unwrap_or("circuit");
                format!("Circuit map for {} available at {}", location, path.display())
            }
            Self::Text { content, .. } => content.clone(),
            Self::Error { message, .. } => format!("Error: {}", message),
        }
    }
}

/// Converts a `json!({...})` literal into a [`Metadata`] map.
pub(crate) fn metadata_from(value: Value) -> Metadata {
    match value {
        Value::Object(map) => map,
        _ => Metadata::new(),
    }
}

/// Failure inside a tool that is not part of its result contract
/// (bad arguments, unreachable transport). Contained by the dispatcher.
#[derive(Debug, Error)]
pub enum ToolError {
    #[error("invalid arguments: {0}")]
    InvalidInput(String),
    #[error("transport error: {0}")]
    Transport(String),
}

/// A single tool callable by the model.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Unique name, as exposed in the tool schema.
    fn name(&self) -> &str;

    /// Specification for the model (description and argument schema).
    fn spec(&self) -> ToolSpec;

    /// Executes the tool with already-parsed JSON arguments.
    async fn call(&self, args: Value) -> Result<ToolOutput, ToolError>;
}

/// Ordered collection of tools, looked up by name.
#[derive(Default)]
pub struct ToolRegistry {
    tools: Vec<Arc<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a tool; a later tool with the same name shadows an earlier one.
    pub fn register(mut self, tool: Arc<dyn Tool>) -> Self {
        self.tools.retain(|t| t.name() != tool.name());
        self.tools.push(tool);
        self
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn Tool>> {
        self.tools.iter().find(|t| t.name() == name)
    }

    /// Specs of all registered tools, in registration order.
    pub fn specs(&self) -> Vec<ToolSpec> {
        self.tools.iter().map(|t| t.spec()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct EchoTool;

    #[async_trait]
    impl Tool for EchoTool {
        fn name(&self) -> &str {
            "echo"
        }

        fn spec(&self) -> ToolSpec {
            ToolSpec {
                name: "echo".to_string(),
                description: Some("Echo the input".to_string()),
                input_schema: json!({"type": "object"}),
            }
        }

        async fn call(&self, args: Value) -> Result<ToolOutput, ToolError> {
            Ok(ToolOutput::text(
                args.to_string(),
                metadata_from(json!({"status": "success"})),
            ))
        }
    }

    #[test]
    fn registry_lookup_and_specs_follow_registration_order() {
        let registry = ToolRegistry::new().register(Arc::new(EchoTool));
        assert!(registry.get("echo").is_some());
        assert!(registry.get("nope").is_none());
        assert_eq!(registry.specs().len(), 1);
        assert_eq!(registry.specs()[0].name, "echo");
    }

    #[test]
    fn output_accessors_cover_all_variants() {
        let img = ToolOutput::image(
            "/maps/Monaco_Circuit.png",
            metadata_from(json!({"status": "success", "location": "Monaco"})),
        );
        assert_eq!(img.status(), Some("success"));
        assert!(!img.is_error());
        assert!(img.render().contains("Monaco"));

        let text = ToolOutput::text("42 points", Metadata::new());
        assert_eq!(text.status(), None);
        assert_eq!(text.render(), "42 points");

        let err = ToolOutput::error("no such circuit", metadata_from(json!({"status": "not_found"})));
        assert!(err.is_error());
        assert_eq!(err.status(), Some("not_found"));
        assert!(err.render().starts_with("Error:"));
    }

    #[test]
    fn output_serde_roundtrip_keeps_tag() {
        let out = ToolOutput::error("x", metadata_from(json!({"status": "unknown_tool"})));
        let json = serde_json::to_value(&out).unwrap();
        assert_eq!(json["type"], "error");
        let back: ToolOutput = serde_json::from_value(json).unwrap();
        assert!(back.is_error());
    }

    #[tokio::test]
    async fn echo_tool_round_trips_arguments() {
        let tool = EchoTool;
        let out = tool.call(json!({"k": "v"})).await.unwrap();
        assert!(out.render().contains("\"k\""));
    }
}

//! Circuit image lookup tool.
//!
//! Resolves a free-text location with the catalog, then checks for the
//! asset `<Canonical>_Circuit.<ext>` in the configured maps directory.
//! Read-only; repeated calls against an unchanged filesystem return the
//! same output.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::debug;

use crate::catalog::CircuitCatalog;
use crate::tools::{metadata_from, Tool, ToolError, ToolOutput, ToolSpec};

/// Tool name: retrieve a circuit map image by location.
pub const TOOL_GET_CIRCUIT_IMAGE: &str = "get_circuit_image";

/// Extensions probed for the asset file, in order.
const IMAGE_EXTENSIONS: [&str; 4] = ["png", "jpg", "jpeg", "webp"];

pub struct CircuitMapTool {
    catalog: CircuitCatalog,
    maps_dir: PathBuf,
}

impl CircuitMapTool {
    /// Tool over the season catalog and the given asset directory.
    pub fn new(maps_dir: impl Into<PathBuf>) -> Self {
        Self::with_catalog(CircuitCatalog::season(), maps_dir)
    }

    pub fn with_catalog(catalog: CircuitCatalog, maps_dir: impl Into<PathBuf>) -> Self {
        Self {
            catalog,
            maps_dir: maps_dir.into(),
        }
    }

    fn asset_path(&self, canonical: &str) -> Option<PathBuf> {
        IMAGE_EXTENSIONS.iter().find_map(|ext| {
            let candidate = self.maps_dir.join(format!("{}_Circuit.{}", canonical, ext));
            candidate.is_file().then_some(candidate)
        })
    }

    /// Looks up the map image for a location; all failures are error outputs.
    pub fn lookup(&self, location: &str) -> ToolOutput {
        debug!(location = %location, "circuit map lookup");

        let Some(canonical) = self.catalog.resolve(location) else {
            return ToolOutput::error(
                format!("No circuit matches '{}'", location),
                metadata_from(json!({
                    "status": "not_found",
                    "available_circuits": self.catalog.entries(),
                })),
            );
        };

        match self.asset_path(canonical) {
            Some(path) => {
                let absolute = absolutize(&path);
                ToolOutput::image(
                    absolute,
                    metadata_from(json!({
                        "status": "success",
                        "location": canonical,
                    })),
                )
            }
            None => ToolOutput::error(
                format!("Circuit map for {} is not on disk", canonical),
                metadata_from(json!({
                    "status": "file_missing",
                    "expected_file": format!("{}_Circuit.{}", canonical, IMAGE_EXTENSIONS[0]),
                })),
            ),
        }
    }
}

fn absolutize(path: &Path) -> PathBuf {
    path.canonicalize().unwrap_or_else(|_| path.to_path_buf())
}

#[async_trait]
impl Tool for CircuitMapTool {
    fn name(&self) -> &str {
        TOOL_GET_CIRCUIT_IMAGE
    }

    fn spec(&self) -> ToolSpec {
        ToolSpec {
            name: TOOL_GET_CIRCUIT_IMAGE.to_string(),
            description: Some(
                "Retrieve the track map image for an F1 circuit. \
                 Use when the user asks to see a circuit, track layout, or map. \
                 Pass the circuit's host country or city as the location."
                    .to_string(),
            ),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "location": {
                        "type": "string",
                        "description": "Circuit location, e.g. 'Monaco' or 'Las Vegas'."
                    }
                },
                "required": ["location"]
            }),
        }
    }

    async fn call(&self, args: Value) -> Result<ToolOutput, ToolError> {
        let location = args
            .get("location")
            .and_then(Value::as_str)
            .ok_or_else(|| ToolError::InvalidInput("missing location".to_string()))?;
        Ok(self.lookup(location))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn maps_dir_with(files: &[&str]) -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        for f in files {
            std::fs::write(dir.path().join(f), b"png bytes").unwrap();
        }
        dir
    }

    #[test]
    fn resolved_location_with_asset_returns_absolute_path() {
        let dir = maps_dir_with(&["Monaco_Circuit.png"]);
        let tool = CircuitMapTool::new(dir.path());

        let out = tool.lookup("show me monaco");
        assert_eq!(out.status(), Some("success"));
        match &out {
            ToolOutput::Image { path, metadata } => {
                assert!(path.is_absolute());
                assert!(path.ends_with("Monaco_Circuit.png"));
                assert_eq!(metadata["location"], "Monaco");
            }
            other => panic!("expected image output, got {:?}", other),
        }
    }

    #[test]
    fn later_extensions_are_probed() {
        let dir = maps_dir_with(&["Japan_Circuit.webp"]);
        let tool = CircuitMapTool::new(dir.path());

        let out = tool.lookup("japan");
        assert_eq!(out.status(), Some("success"));
    }

    #[test]
    fn unresolved_location_lists_available_circuits() {
        let dir = maps_dir_with(&[]);
        let tool = CircuitMapTool::new(dir.path());

        let out = tool.lookup("narnia");
        assert_eq!(out.status(), Some("not_found"));
        let circuits = out.metadata()["available_circuits"].as_array().unwrap();
        assert_eq!(circuits.len(), 24);
    }

    #[test]
    fn missing_asset_reports_expected_file() {
        let dir = maps_dir_with(&[]);
        let tool = CircuitMapTool::new(dir.path());

        let out = tool.lookup("monaco");
        assert_eq!(out.status(), Some("file_missing"));
        assert_eq!(out.metadata()["expected_file"], "Monaco_Circuit.png");
    }

    #[test]
    fn lookup_is_idempotent_for_unchanged_filesystem() {
        let dir = maps_dir_with(&["Bahrain_Circuit.jpg"]);
        let tool = CircuitMapTool::new(dir.path());

        let first = tool.lookup("bahrain");
        let second = tool.lookup("bahrain");
        assert_eq!(
            serde_json::to_value(&first).unwrap(),
            serde_json::to_value(&second).unwrap()
        );
    }

    #[tokio::test]
    async fn call_requires_location_argument() {
        let dir = maps_dir_with(&[]);
        let tool = CircuitMapTool::new(dir.path());

        let err = tool.call(json!({})).await.unwrap_err();
        assert!(err.to_string().contains("location"), "{}", err);
    }
}

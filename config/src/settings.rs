//! Typed application settings read from the process environment.
//!
//! Call [`crate::load_and_apply`] first so a project `.env` is visible, then
//! [`Settings::from_env`] to validate and capture the keys the agent needs.

use std::path::PathBuf;
use thiserror::Error;

const DEFAULT_MODEL: &str = "gpt-4o-mini";
const DEFAULT_CIRCUIT_MAPS_DIR: &str = "circuit_maps";

#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("missing required environment variable: {0}")]
    Missing(&'static str),
}

/// Application configuration, one field per environment key.
///
/// Required: `OPENAI_API_KEY`, `REGULATIONS_ENDPOINT`, `REGULATIONS_API_KEY`,
/// `REGULATIONS_KB_ID`, `REGULATIONS_MODEL_ID`.
/// Optional: `PITWALL_MODEL` (chat model id), `CIRCUIT_MAPS_DIR` (asset dir).
#[derive(Debug, Clone)]
pub struct Settings {
    /// API key for the tool-calling chat model.
    pub openai_api_key: String,
    /// Chat model id used by the orchestrator.
    pub model: String,
    /// Base URL of the regulations retrieve-and-generate backend.
    pub regulations_endpoint: String,
    /// Credential for the regulations backend.
    pub regulations_api_key: String,
    /// Knowledge-base id the backend retrieves from.
    pub knowledge_base_id: String,
    /// Generation model id the backend answers with.
    pub generation_model_id: String,
    /// Directory holding one circuit-map image per canonical location.
    pub circuit_maps_dir: PathBuf,
}

fn required(key: &'static str) -> Result<String, SettingsError> {
    match std::env::var(key) {
        Ok(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(SettingsError::Missing(key)),
    }
}

fn optional(key: &str, default: &str) -> String {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty()).unwrap_or_else(|| default.to_string())
}

impl Settings {
    /// Reads and validates settings from the environment.
    pub fn from_env() -> Result<Self, SettingsError> {
        Ok(Self {
            openai_api_key: required("OPENAI_API_KEY")?,
            model: optional("PITWALL_MODEL", DEFAULT_MODEL),
            regulations_endpoint: required("REGULATIONS_ENDPOINT")?,
            regulations_api_key: required("REGULATIONS_API_KEY")?,
            knowledge_base_id: required("REGULATIONS_KB_ID")?,
            generation_model_id: required("REGULATIONS_MODEL_ID")?,
            circuit_maps_dir: PathBuf::from(optional("CIRCUIT_MAPS_DIR", DEFAULT_CIRCUIT_MAPS_DIR)),
        })
    }
}

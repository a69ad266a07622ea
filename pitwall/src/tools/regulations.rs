//! Regulations query tool: client for the hosted retrieve-and-generate backend.
//!
//! One POST per question; the backend retrieves passages from a knowledge base
//! and generates a grounded answer with citations. Transient failures (429,
//! 5xx, transport) are retried with exponential backoff; everything the
//! backend can do wrong is reported as an error [`ToolOutput`], never as `Err`.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::retry::RetryPolicy;
use crate::tools::{metadata_from, Tool, ToolError, ToolOutput, ToolSpec};

/// Tool name: answer a regulations question from the knowledge base.
pub const TOOL_QUERY_REGULATIONS: &str = "query_regulations";

const DEFAULT_NUM_RESULTS: u32 = 5;
const DEFAULT_MAX_TOKENS: u32 = 1500;
// Low temperature: factual answers over creative ones.
const DEFAULT_TEMPERATURE: f32 = 0.3;
const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// One retrieved passage backing part of the generated answer.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Citation {
    /// Source text snippet.
    pub text: String,
    /// Where the snippet came from (backend-defined shape).
    pub source_location: Value,
    /// Source metadata (backend-defined shape).
    pub metadata: Value,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    query: &'a str,
    knowledge_base_id: &'a str,
    generation_model_id: &'a str,
    number_of_results: u32,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct GenerateResponse {
    answer_text: String,
    citations: Vec<Citation>,
}

enum BackendError {
    /// Worth retrying: rate limit, server error, transport failure.
    Transient { code: String, message: String },
    /// Not worth retrying: client error, undecodable response.
    Permanent { code: String, message: String },
}

pub struct RegulationsTool {
    http: reqwest::Client,
    endpoint: String,
    api_key: String,
    knowledge_base_id: String,
    generation_model_id: String,
    num_results: u32,
    max_tokens: u32,
    temperature: f32,
    retry: RetryPolicy,
}

impl RegulationsTool {
    /// Client for the given backend endpoint and knowledge base.
    ///
    /// Defaults: 5 retrieved passages, 1500 answer tokens, temperature 0.3,
    /// 10s request timeout, 3 attempts with exponential backoff.
    pub fn new(
        endpoint: impl Into<String>,
        api_key: impl Into<String>,
        knowledge_base_id: impl Into<String>,
        generation_model_id: impl Into<String>,
    ) -> Self {
        let http = reqwest::Client::builder()
            .timeout(DEFAULT_REQUEST_TIMEOUT)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self {
            http,
            endpoint: endpoint.into(),
            api_key: api_key.into(),
            knowledge_base_id: knowledge_base_id.into(),
            generation_model_id: generation_model_id.into(),
            num_results: DEFAULT_NUM_RESULTS,
            max_tokens: DEFAULT_MAX_TOKENS,
            temperature: DEFAULT_TEMPERATURE,
            retry: RetryPolicy::exponential(
                3,
                Duration::from_secs(1),
                Duration::from_secs(10),
                2.0,
            ),
        }
    }

    /// Custom HTTP client (timeouts, proxies).
    pub fn with_http_client(mut self, client: reqwest::Client) -> Self {
        self.http = client;
        self
    }

    pub fn with_num_results(mut self, num_results: u32) -> Self {
        self.num_results = num_results;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    async fn send(&self, question: &str) -> Result<GenerateResponse, BackendError> {
        let body = GenerateRequest {
            query: question,
            knowledge_base_id: &self.knowledge_base_id,
            generation_model_id: &self.generation_model_id,
            number_of_results: self.num_results,
            max_tokens: self.max_tokens,
            temperature: self.temperature,
        };

        let res = self
            .http
            .post(&self.endpoint)
            .header("x-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| BackendError::Transient {
                code: "transport".to_string(),
                message: e.to_string(),
            })?;

        let status = res.status();
        if !status.is_success() {
            let code = status.as_u16().to_string();
            let message = res.text().await.unwrap_or_default();
            return Err(if status.as_u16() == 429 || status.is_server_error() {
                BackendError::Transient { code, message }
            } else {
                BackendError::Permanent { code, message }
            });
        }

        res.json().await.map_err(|e| BackendError::Permanent {
            code: "invalid_response".to_string(),
            message: e.to_string(),
        })
    }

    /// Answers a regulations question; all backend failures become error outputs.
    pub async fn query(&self, question: &str) -> ToolOutput {
        debug!(question = %question, "regulations query");
        let started = Instant::now();
        let total_attempts = self.retry.max_attempts();
        let mut last_failure: Option<(String, String)> = None;

        for attempt in 0..total_attempts {
            match self.send(question).await {
                Ok(response) => {
                    let latency = started.elapsed().as_secs_f64();
                    debug!(
                        latency_seconds = latency,
                        citations = response.citations.len(),
                        "regulations query answered"
                    );
                    return ToolOutput::text(
                        response.answer_text,
                        metadata_from(json!({
                            "status": "success",
                            "question": question,
                            "latency_seconds": latency,
                            "citations": response.citations,
                            "num_results": self.num_results,
                            "model": self.generation_model_id,
                        })),
                    );
                }
                Err(BackendError::Permanent { code, message }) => {
                    warn!(code = %code, "regulations backend rejected request");
                    return ToolOutput::error(
                        format!("Regulations backend error: {}", message),
                        metadata_from(json!({
                            "status": "error",
                            "error_code": code,
                            "error_message": message,
                            "question": question,
                            "attempts": attempt + 1,
                        })),
                    );
                }
                Err(BackendError::Transient { code, message }) => {
                    warn!(
                        attempt = attempt + 1,
                        code = %code,
                        "transient regulations backend failure"
                    );
                    last_failure = Some((code, message));
                    if attempt + 1 < total_attempts {
                        tokio::time::sleep(self.retry.delay(attempt)).await;
                    }
                }
            }
        }

        let (code, message) =
            last_failure.unwrap_or_else(|| ("unknown".to_string(), "no attempt made".to_string()));
        ToolOutput::error(
            format!("Regulations backend unavailable: {}", message),
            metadata_from(json!({
                "status": "error",
                "error_code": code,
                "error_message": message,
                "question": question,
                "attempts": total_attempts,
            })),
        )
    }
}

#[async_trait]
impl Tool for RegulationsTool {
    fn name(&self) -> &str {
        TOOL_QUERY_REGULATIONS
    }

    fn spec(&self) -> ToolSpec {
        ToolSpec {
            name: TOOL_QUERY_REGULATIONS.to_string(),
            description: Some(
                "Answer a question about F1 sporting or technical regulations \
                 (rules, penalties, points, procedures, DRS, safety car) from the \
                 official regulations knowledge base."
                    .to_string(),
            ),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "question": {
                        "type": "string",
                        "description": "The regulations question, verbatim."
                    }
                },
                "required": ["question"]
            }),
        }
    }

    async fn call(&self, args: Value) -> Result<ToolOutput, ToolError> {
        let question = args
            .get("question")
            .and_then(Value::as_str)
            .ok_or_else(|| ToolError::InvalidInput("missing question".to_string()))?;
        Ok(self.query(question).await)
    }
}

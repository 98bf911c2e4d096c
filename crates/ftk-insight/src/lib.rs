//! ftk-insight
//!
//! Free-text commentary over committed reconciliation records, produced
//! by a pluggable generative backend.
//!
//! Architectural decisions:
//! - Commentary is a one-way, best-effort enrichment. The fetch wrapper
//!   bounds every call with a deadline and degrades to a fixed
//!   placeholder on any failure; an insight problem is never an engine
//!   fault.
//! - Providers are object-safe (`Box<dyn InsightProvider>`) so callers
//!   can swap the hosted backend for a canned one without knowing the
//!   concrete type.
//! - Output is opaque display text. Nothing in this crate feeds back
//!   into reconciliation figures.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use ftk_schemas::Reconciliation;

// ---------------------------------------------------------------------------
// Prompt construction
// ---------------------------------------------------------------------------

/// Instruction prepended to the serialized record batch.
pub const PROMPT_PREFIX: &str = "Analyze this fuel reconciliation data and provide a brief \
     executive summary regarding stock losses, variance trends, and potential meter \
     inaccuracies: ";

/// Placeholder shown when commentary cannot be produced in time.
pub const FALLBACK_INSIGHT: &str = "Unable to generate insights at this time.";

/// Serializes a record batch as the compact JSON handed to the backend.
///
/// JSON has no NaN or infinity; any non-finite figure renders as
/// `null`. Validated, committed records only carry finite figures.
pub fn insight_request_json(records: &[Reconciliation]) -> Result<String, InsightError> {
    serde_json::to_string(records).map_err(|e| InsightError::Decode(e.to_string()))
}

/// Full prompt for a record batch: instruction plus JSON payload.
pub fn insight_prompt(records: &[Reconciliation]) -> Result<String, InsightError> {
    Ok(format!("{PROMPT_PREFIX}{}", insight_request_json(records)?))
}

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

/// Errors an [`InsightProvider`] implementation may return.
#[derive(Debug)]
pub enum InsightError {
    /// Network or transport failure.
    Transport(String),
    /// The upstream API returned an application-level error.
    Api { code: Option<i64>, message: String },
    /// A payload could not be encoded or decoded.
    Decode(String),
    /// A required configuration value (e.g. API key) is missing or invalid.
    Config(String),
}

impl fmt::Display for InsightError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InsightError::Transport(msg) => write!(f, "transport error: {msg}"),
            InsightError::Api {
                code: Some(c),
                message,
            } => {
                write!(f, "insight api error code={c}: {message}")
            }
            InsightError::Api {
                code: None,
                message,
            } => {
                write!(f, "insight api error: {message}")
            }
            InsightError::Decode(msg) => write!(f, "decode error: {msg}"),
            InsightError::Config(msg) => write!(f, "config error: {msg}"),
        }
    }
}

impl std::error::Error for InsightError {}

// ---------------------------------------------------------------------------
// Provider trait
// ---------------------------------------------------------------------------

/// Generative commentary backend contract.
///
/// Implementations must be `Send + Sync` so the fetch wrapper can await
/// them across task boundaries.
#[async_trait::async_trait]
pub trait InsightProvider: Send + Sync {
    /// Human-readable name identifying this backend (e.g. `"genai"`).
    fn source_name(&self) -> &'static str;

    /// Produce free-text commentary for the given prompt.
    async fn generate(&self, prompt: &str) -> Result<String, InsightError>;
}

// ---------------------------------------------------------------------------
// Canned provider
// ---------------------------------------------------------------------------

/// Provider that returns a fixed text without touching the network.
///
/// Used for offline runs and tests.
#[derive(Debug, Clone)]
pub struct StaticInsight {
    text: String,
}

impl StaticInsight {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

#[async_trait::async_trait]
impl InsightProvider for StaticInsight {
    fn source_name(&self) -> &'static str {
        "static"
    }

    async fn generate(&self, _prompt: &str) -> Result<String, InsightError> {
        Ok(self.text.clone())
    }
}

// ---------------------------------------------------------------------------
// Hosted provider
// ---------------------------------------------------------------------------

/// Default hosted model identifier.
pub const DEFAULT_MODEL: &str = "gemini-3-flash-preview";

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Hosted generative-API backend.
///
/// API key is read by the caller and passed in; do not log it.
#[derive(Debug, Clone)]
pub struct GenAiInsight {
    api_key: String,
    http: reqwest::Client,
    base_url: String,
    model: String,
}

impl GenAiInsight {
    pub fn new(api_key: String) -> Self {
        Self::new_with_base_url(api_key, DEFAULT_BASE_URL.to_string())
    }

    pub fn new_with_base_url(api_key: String, base_url: String) -> Self {
        Self {
            api_key,
            http: reqwest::Client::new(),
            base_url,
            model: DEFAULT_MODEL.to_string(),
        }
    }

    fn generate_url(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url.trim_end_matches('/'),
            self.model
        )
    }
}

#[async_trait::async_trait]
impl InsightProvider for GenAiInsight {
    fn source_name(&self) -> &'static str {
        "genai"
    }

    async fn generate(&self, prompt: &str) -> Result<String, InsightError> {
        if self.api_key.is_empty() {
            return Err(InsightError::Config("api key is empty".to_string()));
        }

        let body = GenerateRequest {
            contents: vec![RequestContent {
                parts: vec![RequestPart { text: prompt }],
            }],
        };

        let resp = self
            .http
            .post(self.generate_url())
            .query(&[("key", self.api_key.as_str())])
            .json(&body)
            .send()
            .await
            .map_err(|e| InsightError::Transport(e.to_string()))?;

        let status = resp.status();
        let decoded: GenerateResponse = resp
            .json()
            .await
            .map_err(|e| InsightError::Decode(e.to_string()))?;

        if !status.is_success() || decoded.error.is_some() {
            let (code, message) = match decoded.error {
                Some(e) => (
                    e.code.or(Some(i64::from(status.as_u16()))),
                    e.message.unwrap_or_else(|| "unknown".to_string()),
                ),
                None => (Some(i64::from(status.as_u16())), "unknown".to_string()),
            };
            return Err(InsightError::Api { code, message });
        }

        let text: String = decoded
            .candidates
            .into_iter()
            .find_map(|c| c.content)
            .map(|c| {
                c.parts
                    .into_iter()
                    .map(|p| p.text)
                    .collect::<Vec<_>>()
                    .join("")
            })
            .unwrap_or_default();

        if text.is_empty() {
            return Err(InsightError::Decode(
                "response carried no commentary text".to_string(),
            ));
        }
        Ok(text)
    }
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<RequestContent<'a>>,
}

#[derive(Debug, Serialize)]
struct RequestContent<'a> {
    parts: Vec<RequestPart<'a>>,
}

#[derive(Debug, Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    error: Option<ApiErrorBody>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    code: Option<i64>,
    message: Option<String>,
}

// ---------------------------------------------------------------------------
// Bounded fetch
// ---------------------------------------------------------------------------

/// Fetches commentary for a record batch within `budget`.
///
/// Any failure (serialization, provider error, deadline) degrades to
/// [`FALLBACK_INSIGHT`]. This call never returns an error: the caller's
/// reconciliation flow must not depend on commentary succeeding.
pub async fn fetch_insights(
    provider: &dyn InsightProvider,
    records: &[Reconciliation],
    budget: Duration,
) -> String {
    let prompt = match insight_prompt(records) {
        Ok(p) => p,
        Err(_) => return FALLBACK_INSIGHT.to_string(),
    };
    match tokio::time::timeout(budget, provider.generate(&prompt)).await {
        Ok(Ok(text)) => text,
        Ok(Err(_)) | Err(_) => FALLBACK_INSIGHT.to_string(),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

//! Recommendation generation via the Gemini REST API

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, instrument, warn};

use crate::error::{ServiceError, ServiceResult};

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
const DEFAULT_MODEL: &str = "gemini-1.5-flash";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(20);

/// Trait for producing a health recommendation from recent metric readings
#[async_trait]
pub trait RecommendationClient: Send + Sync {
    /// Generate a short recommendation text for the given metric.
    ///
    /// `recent_values` must be non-empty; `target` is an optional goal value
    /// for the metric.
    async fn generate_recommendation(
        &self,
        metric: &str,
        recent_values: &[f64],
        target: Option<f64>,
    ) -> ServiceResult<String>;
}

/// Gemini API configuration
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub api_key: String,
    pub model: String,
    pub base_url: String,
}

impl GeminiConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

/// Recommendation client backed by Gemini's generateContent endpoint
pub struct GeminiClient {
    config: GeminiConfig,
    http: reqwest::Client,
}

#[derive(Serialize)]
struct GenerateContentRequest {
    contents: Vec<Content>,
}

#[derive(Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Serialize)]
struct Part {
    text: String,
}

#[derive(Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: CandidateContent,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: String,
}

impl GeminiClient {
    pub fn new(config: GeminiConfig) -> ServiceResult<Self> {
        if config.api_key.is_empty() {
            return Err(ServiceError::InvalidInput(
                "gemini api key must not be empty".to_string(),
            ));
        }
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| ServiceError::Internal(format!("http client: {e}")))?;
        Ok(Self { config, http })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.config.base_url.trim_end_matches('/'),
            self.config.model
        )
    }
}

/// Build the prompt sent to the model
pub(crate) fn build_prompt(metric: &str, recent_values: &[f64], target: Option<f64>) -> String {
    let values = recent_values
        .iter()
        .map(|v| format!("{v:.1}"))
        .collect::<Vec<_>>()
        .join(", ");
    let mut prompt = format!(
        "You are a health coach. A user has recorded these recent {metric} readings: {values}."
    );
    if let Some(target) = target {
        prompt.push_str(&format!(" Their target {metric} is {target:.1}."));
    }
    prompt.push_str(
        " In two or three sentences, give a practical, encouraging recommendation. \
         Do not diagnose any condition.",
    );
    prompt
}

#[async_trait]
impl RecommendationClient for GeminiClient {
    #[instrument(skip(self, recent_values), fields(count = recent_values.len()))]
    async fn generate_recommendation(
        &self,
        metric: &str,
        recent_values: &[f64],
        target: Option<f64>,
    ) -> ServiceResult<String> {
        if recent_values.is_empty() {
            return Err(ServiceError::InvalidInput(
                "at least one recent value is required".to_string(),
            ));
        }

        let body = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: build_prompt(metric, recent_values, target),
                }],
            }],
        };

        let response = self
            .http
            .post(self.endpoint())
            .query(&[("key", self.config.api_key.as_str())])
            .json(&body)
            .send()
            .await
            .map_err(|e| ServiceError::Unavailable(format!("gemini request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            warn!(status = status.as_u16(), "gemini returned an error status");
            return Err(ServiceError::Unavailable(format!(
                "gemini returned status {status}"
            )));
        }

        let parsed: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| ServiceError::Unavailable(format!("gemini response decode: {e}")))?;

        let text = parsed
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content.parts.into_iter().next())
            .map(|p| p.text)
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| {
                ServiceError::Unavailable("gemini returned no candidates".to_string())
            })?;

        debug!(len = text.len(), "recommendation generated");
        Ok(text)
    }
}

/// Canned recommendation client for tests and local development
pub struct StaticRecommendationClient {
    text: String,
}

impl StaticRecommendationClient {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

impl Default for StaticRecommendationClient {
    fn default() -> Self {
        Self::new("Keep up your current routine and stay hydrated.")
    }
}

#[async_trait]
impl RecommendationClient for StaticRecommendationClient {
    async fn generate_recommendation(
        &self,
        _metric: &str,
        recent_values: &[f64],
        _target: Option<f64>,
    ) -> ServiceResult<String> {
        if recent_values.is_empty() {
            return Err(ServiceError::InvalidInput(
                "at least one recent value is required".to_string(),
            ));
        }
        Ok(self.text.clone())
    }
}

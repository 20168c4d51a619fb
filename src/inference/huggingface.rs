//! Hugging Face Inference API client.
//!
//! One generic client parameterized by model path and request shaping; the
//! four capabilities are plain methods over it rather than per-capability
//! subclasses.

use super::{truncate_chars, InferenceError, InferenceGateway, LabelScore, TopicClassification};
use crate::config::InferenceSettings;
use async_trait::async_trait;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::debug;

const API_BASE_URL: &str = "https://api-inference.huggingface.co";

const CLASSIFICATION_INPUT_CAP: usize = 512;
const SUMMARY_INPUT_CAP: usize = 1024;

/// Candidate labels for zero-shot topic classification, common themes in
/// popular music.
const TOPIC_LABELS: [&str; 10] = [
    "romantic love",
    "breakup and heartache",
    "party and dancing",
    "personal empowerment",
    "social commentary",
    "life struggles",
    "sex and desire",
    "nostalgia and memories",
    "fame and success",
    "rebellion and defiance",
];

const TOPIC_HYPOTHESIS_TEMPLATE: &str = "This text is about {}.";

pub struct HuggingFaceClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    settings: InferenceSettings,
}

impl HuggingFaceClient {
    pub fn new(api_key: impl Into<String>, settings: InferenceSettings) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: API_BASE_URL.to_string(),
            api_key: api_key.into(),
            settings,
        }
    }

    fn timeout(&self) -> Duration {
        Duration::from_secs(self.settings.timeout_secs)
    }

    /// POST a payload to a model endpoint and return the raw JSON value.
    async fn post_model(&self, model: &str, payload: &Value) -> Result<Value, InferenceError> {
        let url = format!("{}/models/{}", self.base_url, model);
        debug!(model, "Sending inference request");

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(payload)
            .timeout(self.timeout())
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    InferenceError::Timeout
                } else {
                    InferenceError::Connection(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(InferenceError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        response
            .json()
            .await
            .map_err(|e| InferenceError::InvalidResponse(e.to_string()))
    }
}

#[async_trait]
impl InferenceGateway for HuggingFaceClient {
    async fn sentiment(&self, text: &str) -> Result<Vec<LabelScore>, InferenceError> {
        let input = truncate_chars(text, CLASSIFICATION_INPUT_CAP);
        let value = self
            .post_model(&self.settings.sentiment_model, &json!({ "inputs": input }))
            .await?;
        parse_classification(&value)
    }

    async fn emotions(&self, text: &str) -> Result<Vec<LabelScore>, InferenceError> {
        let input = truncate_chars(text, CLASSIFICATION_INPUT_CAP);
        let value = self
            .post_model(&self.settings.emotion_model, &json!({ "inputs": input }))
            .await?;
        parse_classification(&value)
    }

    async fn summarize(&self, text: &str) -> Result<String, InferenceError> {
        let input = truncate_chars(text, SUMMARY_INPUT_CAP);
        let payload = json!({
            "inputs": input,
            "parameters": {
                "min_length": self.settings.summary_min_length,
                "max_length": self.settings.summary_max_length,
            }
        });
        let value = self
            .post_model(&self.settings.summary_model, &payload)
            .await?;
        parse_summary(&value)
    }

    async fn topics(&self, text: &str) -> Result<TopicClassification, InferenceError> {
        let input = truncate_chars(text, CLASSIFICATION_INPUT_CAP);
        let payload = json!({
            "inputs": input,
            "parameters": {
                "candidate_labels": TOPIC_LABELS,
                "multi_label": true,
                "hypothesis_template": TOPIC_HYPOTHESIS_TEMPLATE,
            }
        });
        let value = self
            .post_model(&self.settings.zero_shot_model, &payload)
            .await?;
        parse_zero_shot(&value)
    }
}

/// Classification responses come back as `[[{label, score}, ...]]` (or the
/// flat single-input form `[{label, score}, ...]`).
fn parse_classification(value: &Value) -> Result<Vec<LabelScore>, InferenceError> {
    let outer = value
        .as_array()
        .ok_or_else(|| invalid(value, "expected array"))?;

    let entries = match outer.first().and_then(|first| first.as_array()) {
        Some(inner) => inner,
        None => outer,
    };

    entries
        .iter()
        .map(|entry| {
            serde_json::from_value::<LabelScore>(entry.clone())
                .map_err(|e| InferenceError::InvalidResponse(e.to_string()))
        })
        .collect()
}

/// Summarization responses come back as `[{summary_text}]`.
fn parse_summary(value: &Value) -> Result<String, InferenceError> {
    value
        .as_array()
        .and_then(|arr| arr.first())
        .and_then(|entry| entry.get("summary_text"))
        .and_then(|text| text.as_str())
        .map(|text| text.to_string())
        .ok_or_else(|| invalid(value, "missing summary_text"))
}

/// Zero-shot responses come back as `{sequence, labels, scores}`.
fn parse_zero_shot(value: &Value) -> Result<TopicClassification, InferenceError> {
    serde_json::from_value(value.clone()).map_err(|e| InferenceError::InvalidResponse(e.to_string()))
}

fn invalid(value: &Value, reason: &str) -> InferenceError {
    InferenceError::InvalidResponse(format!("{}: {}", reason, value))
}

//! Remote text-inference gateway.
//!
//! Four independent capabilities (sentiment, emotion, summarization,
//! zero-shot topics) over a single generic classification/generation
//! provider. Capability calls are isolated from one another: each returns its
//! own `Result` and a failure on one never propagates across the boundary.

mod huggingface;

pub use huggingface::HuggingFaceClient;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A classified label with its confidence score.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LabelScore {
    pub label: String,
    pub score: f64,
}

/// Zero-shot multi-label classification output; `labels` and `scores` are
/// parallel, ordered by descending score.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TopicClassification {
    pub labels: Vec<String>,
    pub scores: Vec<f64>,
}

/// Errors from a single inference capability call.
#[derive(Debug, Error)]
pub enum InferenceError {
    #[error("connection error: {0}")]
    Connection(String),

    #[error("api error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("invalid response: {0}")]
    InvalidResponse(String),

    #[error("request timeout")]
    Timeout,
}

/// Gateway over the remote inference provider. Each method is one independent
/// capability with its own input cap and timeout.
#[cfg_attr(any(test, feature = "mock"), mockall::automock)]
#[async_trait]
pub trait InferenceGateway: Send + Sync {
    /// Sentiment classification. Input capped at 512 characters.
    async fn sentiment(&self, text: &str) -> Result<Vec<LabelScore>, InferenceError>;

    /// Emotion classification. Input capped at 512 characters.
    async fn emotions(&self, text: &str) -> Result<Vec<LabelScore>, InferenceError>;

    /// Abstractive summarization. Input capped at 1024 characters; the cut is
    /// not word-boundary aware.
    async fn summarize(&self, text: &str) -> Result<String, InferenceError>;

    /// Zero-shot multi-label topic classification over the fixed lyric topic
    /// set. Input capped at 512 characters.
    async fn topics(&self, text: &str) -> Result<TopicClassification, InferenceError>;
}

/// Truncate to at most `max` characters, on a character boundary.
pub(crate) fn truncate_chars(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((byte_index, _)) => &text[..byte_index],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_chars_shorter_input_untouched() {
        assert_eq!(truncate_chars("short", 512), "short");
    }

    #[test]
    fn test_truncate_chars_cuts_at_limit() {
        let long: String = "ab".repeat(600);
        let cut = truncate_chars(&long, 512);
        assert_eq!(cut.chars().count(), 512);
    }

    #[test]
    fn test_truncate_chars_multibyte_safe() {
        let text = "é".repeat(600);
        let cut = truncate_chars(&text, 512);
        assert_eq!(cut.chars().count(), 512);
        assert!(cut.chars().all(|c| c == 'é'));
    }
}

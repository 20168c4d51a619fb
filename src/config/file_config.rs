//! TOML file configuration.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

/// Configuration loaded from a TOML file. All fields are optional; values
/// present in the file override CLI arguments during resolution.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FileConfig {
    pub db_dir: Option<String>,
    pub port: Option<u16>,
    pub credentials: Option<CredentialsConfig>,
    pub inference: Option<InferenceConfig>,
    pub trending: Option<TrendingConfig>,
}

/// Provider credentials section. Any field left out falls back to the
/// corresponding environment variable.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CredentialsConfig {
    pub spotify_client_id: Option<String>,
    pub spotify_client_secret: Option<String>,
    pub genius_token: Option<String>,
    pub huggingface_api_key: Option<String>,
}

/// Inference gateway section.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct InferenceConfig {
    pub sentiment_model: Option<String>,
    pub emotion_model: Option<String>,
    pub summary_model: Option<String>,
    pub zero_shot_model: Option<String>,
    pub summary_min_length: Option<u32>,
    pub summary_max_length: Option<u32>,
    pub timeout_secs: Option<u64>,
}

/// Trending store section.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TrendingConfig {
    pub window_days: Option<u32>,
    pub limit: Option<usize>,
}

impl FileConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file {:?}", path.as_ref()))?;
        toml::from_str(&content).context("Failed to parse config file")
    }
}

mod file_config;

pub use file_config::{CredentialsConfig, FileConfig, InferenceConfig, TrendingConfig};

use anyhow::{bail, Result};
use std::path::PathBuf;

/// CLI arguments that participate in config resolution.
/// Mirrors the CLI surface; TOML file values override these.
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    pub db_dir: Option<PathBuf>,
    pub port: u16,
}

/// Fully resolved application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub db_dir: PathBuf,
    pub port: u16,
    pub credentials: ProviderCredentials,
    pub inference: InferenceSettings,
    pub trending: TrendingSettings,
}

/// Credentials for the external providers. Injected at process start from the
/// config file or environment; never embedded in the binary.
#[derive(Debug, Clone)]
pub struct ProviderCredentials {
    pub spotify_client_id: String,
    pub spotify_client_secret: String,
    pub genius_token: String,
    pub huggingface_api_key: String,
}

/// Settings for the inference gateway.
#[derive(Debug, Clone)]
pub struct InferenceSettings {
    pub sentiment_model: String,
    pub emotion_model: String,
    pub summary_model: String,
    pub zero_shot_model: String,
    pub summary_min_length: u32,
    pub summary_max_length: u32,
    pub timeout_secs: u64,
}

impl Default for InferenceSettings {
    fn default() -> Self {
        Self {
            sentiment_model: "nlptown/bert-base-multilingual-uncased-sentiment".to_string(),
            emotion_model: "j-hartmann/emotion-english-distilroberta-base".to_string(),
            summary_model: "facebook/bart-large-cnn".to_string(),
            zero_shot_model: "facebook/bart-large-mnli".to_string(),
            summary_min_length: 50,
            summary_max_length: 150,
            timeout_secs: 30,
        }
    }
}

/// Settings for the trending ranking window.
#[derive(Debug, Clone)]
pub struct TrendingSettings {
    pub window_days: u32,
    pub limit: usize,
}

impl Default for TrendingSettings {
    fn default() -> Self {
        Self {
            window_days: 7,
            limit: 10,
        }
    }
}

impl AppConfig {
    /// Resolve configuration from CLI arguments and optional TOML file config.
    /// TOML values override CLI values where present; credentials fall back to
    /// environment variables when absent from the file.
    pub fn resolve(cli: &CliConfig, file_config: Option<FileConfig>) -> Result<Self> {
        let file = file_config.unwrap_or_default();

        let db_dir = file
            .db_dir
            .map(PathBuf::from)
            .or_else(|| cli.db_dir.clone())
            .ok_or_else(|| {
                anyhow::anyhow!("db_dir must be specified via --db-dir or in config file")
            })?;

        if !db_dir.exists() {
            bail!("Database directory does not exist: {:?}", db_dir);
        }
        if !db_dir.is_dir() {
            bail!("db_dir is not a directory: {:?}", db_dir);
        }

        let port = file.port.unwrap_or(cli.port);

        let creds_file = file.credentials.unwrap_or_default();
        let credentials = ProviderCredentials {
            spotify_client_id: resolve_secret(creds_file.spotify_client_id, "SPOTIFY_CLIENT_ID")?,
            spotify_client_secret: resolve_secret(
                creds_file.spotify_client_secret,
                "SPOTIFY_CLIENT_SECRET",
            )?,
            genius_token: resolve_secret(creds_file.genius_token, "GENIUS_TOKEN")?,
            huggingface_api_key: resolve_secret(
                creds_file.huggingface_api_key,
                "HUGGINGFACE_API_KEY",
            )?,
        };

        let inference_file = file.inference.unwrap_or_default();
        let inference_defaults = InferenceSettings::default();
        let inference = InferenceSettings {
            sentiment_model: inference_file
                .sentiment_model
                .unwrap_or(inference_defaults.sentiment_model),
            emotion_model: inference_file
                .emotion_model
                .unwrap_or(inference_defaults.emotion_model),
            summary_model: inference_file
                .summary_model
                .unwrap_or(inference_defaults.summary_model),
            zero_shot_model: inference_file
                .zero_shot_model
                .unwrap_or(inference_defaults.zero_shot_model),
            summary_min_length: inference_file
                .summary_min_length
                .unwrap_or(inference_defaults.summary_min_length),
            summary_max_length: inference_file
                .summary_max_length
                .unwrap_or(inference_defaults.summary_max_length),
            timeout_secs: inference_file
                .timeout_secs
                .unwrap_or(inference_defaults.timeout_secs),
        };

        let trending_file = file.trending.unwrap_or_default();
        let trending_defaults = TrendingSettings::default();
        let trending = TrendingSettings {
            window_days: trending_file
                .window_days
                .unwrap_or(trending_defaults.window_days),
            limit: trending_file.limit.unwrap_or(trending_defaults.limit),
        };

        Ok(Self {
            db_dir,
            port,
            credentials,
            inference,
            trending,
        })
    }

    pub fn trending_db_path(&self) -> PathBuf {
        self.db_dir.join("trending.db")
    }
}

fn resolve_secret(file_value: Option<String>, env_var: &str) -> Result<String> {
    if let Some(value) = file_value {
        if !value.is_empty() {
            return Ok(value);
        }
    }
    match std::env::var(env_var) {
        Ok(value) if !value.is_empty() => Ok(value),
        _ => bail!(
            "Missing credential: set it in the [credentials] config section or via {}",
            env_var
        ),
    }
}

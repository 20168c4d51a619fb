use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, level_filters::LevelFilter};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use lyricscope_server::config;
use lyricscope_server::inference::HuggingFaceClient;
use lyricscope_server::lyrics::GeniusClient;
use lyricscope_server::pipeline::SearchPipeline;
use lyricscope_server::server::{run_server, AppState};
use lyricscope_server::spotify::SpotifyClient;
use lyricscope_server::trending_store::{SqliteTrendingStore, TrendingStore};

fn parse_path(s: &str) -> Result<PathBuf, String> {
    let path_buf = PathBuf::from(s);
    let original_path = match path_buf.canonicalize() {
        Ok(path) => path,
        Err(msg) => {
            if msg.kind() == std::io::ErrorKind::NotFound {
                path_buf
            } else {
                return Err(format!("Error resolving path '{}': {}", s, msg));
            }
        }
    };
    if original_path.is_absolute() {
        return Ok(original_path);
    }
    let cwd = std::env::current_dir().map_err(|e| format!("Failed to get current dir: {}", e))?;
    Ok(cwd.join(original_path))
}

fn parse_dir(s: &str) -> Result<PathBuf, String> {
    let path = parse_path(s)?;
    if !path.exists() {
        return Err(format!("Directory does not exist: {}", s));
    }
    if !path.is_dir() {
        return Err(format!("Path is not a directory: {}", s));
    }
    Ok(path)
}

#[derive(Parser, Debug)]
struct CliArgs {
    /// Path to TOML configuration file. Values in the file override CLI arguments.
    #[clap(long, value_parser = parse_path)]
    pub config: Option<PathBuf>,

    /// Directory containing database files (trending.db).
    /// Can also be specified in config file.
    #[clap(long, value_parser = parse_dir)]
    pub db_dir: Option<PathBuf>,

    /// The port to listen on.
    #[clap(short, long, default_value_t = 3001)]
    pub port: u16,
}

impl From<&CliArgs> for config::CliConfig {
    fn from(args: &CliArgs) -> Self {
        config::CliConfig {
            db_dir: args.db_dir.clone(),
            port: args.port,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli_args = CliArgs::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .with_env_var("LOG_LEVEL")
                .from_env_lossy(),
        )
        .init();

    let file_config = match &cli_args.config {
        Some(path) => {
            info!("Loading configuration from {:?}", path);
            Some(config::FileConfig::load(path)?)
        }
        None => None,
    };

    let cli_config: config::CliConfig = (&cli_args).into();
    let app_config = config::AppConfig::resolve(&cli_config, file_config)?;

    info!("Configuration loaded:");
    info!("  db_dir: {:?}", app_config.db_dir);
    info!("  port: {}", app_config.port);

    if !app_config.trending_db_path().exists() {
        info!(
            "Creating new trending database at {:?}",
            app_config.trending_db_path()
        );
    }
    let trending_store = Arc::new(SqliteTrendingStore::new(app_config.trending_db_path())?);

    let spotify = Arc::new(SpotifyClient::new(
        app_config.credentials.spotify_client_id.clone(),
        app_config.credentials.spotify_client_secret.clone(),
    ));
    let genius = Arc::new(GeniusClient::new(app_config.credentials.genius_token.clone()));
    let inference = Arc::new(HuggingFaceClient::new(
        app_config.credentials.huggingface_api_key.clone(),
        app_config.inference.clone(),
    ));

    let pipeline = Arc::new(SearchPipeline::new(
        spotify,
        genius,
        inference,
        trending_store.clone(),
    ));

    let state = AppState {
        pipeline,
        trending: trending_store as Arc<dyn TrendingStore>,
        trending_settings: app_config.trending.clone(),
    };

    tokio::select! {
        result = run_server(app_config.port, state) => {
            result?;
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Shutting down");
        }
    }

    Ok(())
}

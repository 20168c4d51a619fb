//! Lyrics resolution.
//!
//! Providers are polymorphic behind [`LyricsProvider`]: the primary
//! Genius-backed implementation (search + page extraction + annotations) and a
//! lyrics.ovh fallback that looks lyrics up directly by artist and title.
//! A provider miss is a hard `NotFound`; a transient failure is retried once
//! with a short backoff before surfacing.

mod genius;
mod lyrics_ovh;

pub use genius::GeniusClient;
pub use lyrics_ovh::LyricsOvhClient;

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;
use tracing::warn;

const RETRY_BACKOFF: Duration = Duration::from_millis(500);

/// Raw lyric text for a resolved track, before sanitization.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchedLyrics {
    pub raw: String,
    /// Canonical page URL at the provider, when it has one.
    pub source_url: Option<String>,
    /// Provider-side song reference used for annotation lookup.
    pub song_id: Option<u64>,
}

#[derive(Debug, Error)]
pub enum LyricsError {
    #[error("no lyrics found for this track")]
    NotFound,

    #[error("lyrics provider error (status {status:?}): {message}")]
    Provider {
        status: Option<u16>,
        message: String,
    },
}

impl LyricsError {
    /// Connection failures, 429s and 5xx responses are worth one retry.
    pub fn is_transient(&self) -> bool {
        match self {
            LyricsError::NotFound => false,
            LyricsError::Provider { status, .. } => match status {
                None => true,
                Some(code) => *code == 429 || *code >= 500,
            },
        }
    }
}

/// A source of lyric text for a resolved (artist, title) pair.
#[cfg_attr(any(test, feature = "mock"), mockall::automock)]
#[async_trait]
pub trait LyricsProvider: Send + Sync {
    fn name(&self) -> &'static str;

    async fn fetch(&self, artist: &str, title: &str) -> Result<FetchedLyrics, LyricsError>;

    /// Annotation bodies for a previously fetched song, in provider order.
    /// Finite, non-restartable; providers without annotation support return
    /// an empty sequence.
    async fn annotations(&self, _song: &FetchedLyrics) -> Result<Vec<String>, LyricsError> {
        Ok(Vec::new())
    }
}

/// Fetch lyrics, retrying once after a backoff on a transient provider error.
pub async fn fetch_with_retry(
    provider: &dyn LyricsProvider,
    artist: &str,
    title: &str,
) -> Result<FetchedLyrics, LyricsError> {
    match provider.fetch(artist, title).await {
        Err(e) if e.is_transient() => {
            warn!(
                provider = provider.name(),
                error = %e,
                "Transient lyrics provider error, retrying once"
            );
            tokio::time::sleep(RETRY_BACKOFF).await;
            provider.fetch(artist, title).await
        }
        other => other,
    }
}

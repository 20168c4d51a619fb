//! Fallback lyrics provider: direct lyrics-by-artist-and-title lookup.
//!
//! No search step and no annotations; the provider either has the song or it
//! doesn't.

use super::{FetchedLyrics, LyricsError, LyricsProvider};
use async_trait::async_trait;
use serde::Deserialize;

const API_BASE_URL: &str = "https://api.lyrics.ovh/v1";

pub struct LyricsOvhClient {
    client: reqwest::Client,
    api_base_url: String,
}

impl LyricsOvhClient {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
            api_base_url: API_BASE_URL.to_string(),
        }
    }
}

impl Default for LyricsOvhClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LyricsProvider for LyricsOvhClient {
    fn name(&self) -> &'static str {
        "lyrics.ovh"
    }

    async fn fetch(&self, artist: &str, title: &str) -> Result<FetchedLyrics, LyricsError> {
        let url = format!(
            "{}/{}/{}",
            self.api_base_url,
            urlencoding::encode(artist),
            urlencoding::encode(title)
        );

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| LyricsError::Provider {
                status: None,
                message: e.to_string(),
            })?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(LyricsError::NotFound);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LyricsError::Provider {
                status: Some(status.as_u16()),
                message: body,
            });
        }

        let body: LyricsResponse = response.json().await.map_err(|e| LyricsError::Provider {
            status: None,
            message: format!("malformed response: {}", e),
        })?;

        if body.lyrics.trim().is_empty() {
            return Err(LyricsError::NotFound);
        }

        Ok(FetchedLyrics {
            raw: body.lyrics,
            source_url: None,
            song_id: None,
        })
    }
}

#[derive(Debug, Deserialize)]
struct LyricsResponse {
    lyrics: String,
}

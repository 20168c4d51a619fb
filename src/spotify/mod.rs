//! Track resolver backed by the Spotify Web API.
//!
//! Maps a free-text query to a canonical track via the track search endpoint.
//! The client owns its bearer credential together with its expiry and
//! refreshes it lazily under a lock, so concurrent searches never stampede
//! the token endpoint and an expired token never leaks into a request.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, info};

const ACCOUNTS_TOKEN_URL: &str = "https://accounts.spotify.com/api/token";
const API_BASE_URL: &str = "https://api.spotify.com";

/// Refresh the token this long before its advertised expiry.
const TOKEN_EXPIRY_MARGIN: Duration = Duration::from_secs(30);

/// Canonical track resolved from a free-text query. Immutable once resolved;
/// every downstream stage consumes it as-is.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct TrackIdentity {
    pub name: String,
    pub artist: String,
    pub album: String,
    pub spotify_url: String,
    pub album_art: Option<String>,
}

/// Errors from track resolution.
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("no track matched the query")]
    NotFound,

    #[error("spotify error (status {status:?}): {message}")]
    Provider {
        status: Option<u16>,
        message: String,
    },
}

/// Resolves a free-text query to a canonical track.
#[cfg_attr(any(test, feature = "mock"), mockall::automock)]
#[async_trait]
pub trait TrackResolver: Send + Sync {
    async fn resolve(&self, query: &str) -> Result<TrackIdentity, ResolveError>;
}

struct CachedToken {
    access_token: String,
    expires_at: Instant,
}

impl CachedToken {
    fn is_valid(&self, now: Instant) -> bool {
        now + TOKEN_EXPIRY_MARGIN < self.expires_at
    }
}

/// Spotify Web API client holding a lazily refreshed client-credentials token.
pub struct SpotifyClient {
    client: reqwest::Client,
    client_id: String,
    client_secret: String,
    token_url: String,
    api_base_url: String,
    token: Mutex<Option<CachedToken>>,
}

impl SpotifyClient {
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            token_url: ACCOUNTS_TOKEN_URL.to_string(),
            api_base_url: API_BASE_URL.to_string(),
            token: Mutex::new(None),
        }
    }

    /// Return a valid bearer token, refreshing it first if it is missing or
    /// inside the expiry margin. The lock is held across the refresh so only
    /// one caller hits the token endpoint.
    async fn bearer_token(&self, force_refresh: bool) -> Result<String, ResolveError> {
        let mut guard = self.token.lock().await;
        let now = Instant::now();
        if !force_refresh {
            if let Some(cached) = guard.as_ref() {
                if cached.is_valid(now) {
                    return Ok(cached.access_token.clone());
                }
            }
        }

        debug!("Refreshing Spotify client-credentials token");
        let response = self
            .client
            .post(&self.token_url)
            .basic_auth(&self.client_id, Some(&self.client_secret))
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await
            .map_err(connection_error)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ResolveError::Provider {
                status: Some(status.as_u16()),
                message: format!("token exchange failed: {}", body),
            });
        }

        let token: TokenResponse = response.json().await.map_err(|e| ResolveError::Provider {
            status: None,
            message: format!("malformed token response: {}", e),
        })?;

        let cached = CachedToken {
            access_token: token.access_token.clone(),
            expires_at: now + Duration::from_secs(token.expires_in),
        };
        info!(expires_in = token.expires_in, "Spotify token refreshed");
        *guard = Some(cached);
        Ok(token.access_token)
    }

    async fn search_tracks(&self, query: &str, token: &str) -> Result<reqwest::Response, ResolveError> {
        self.client
            .get(format!("{}/v1/search", self.api_base_url))
            .bearer_auth(token)
            .query(&[("q", query), ("type", "track"), ("limit", "1")])
            .send()
            .await
            .map_err(connection_error)
    }
}

#[async_trait]
impl TrackResolver for SpotifyClient {
    async fn resolve(&self, query: &str) -> Result<TrackIdentity, ResolveError> {
        let token = self.bearer_token(false).await?;
        let mut response = self.search_tracks(query, &token).await?;

        // A 401 means the cached token was revoked or expired server-side
        // despite the margin. Refresh once and retry.
        if response.status() == reqwest::StatusCode::UNAUTHORIZED {
            debug!("Spotify rejected token, refreshing and retrying");
            let token = self.bearer_token(true).await?;
            response = self.search_tracks(query, &token).await?;
        }

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ResolveError::Provider {
                status: Some(status.as_u16()),
                message: body,
            });
        }

        let search: SearchResponse =
            response.json().await.map_err(|e| ResolveError::Provider {
                status: None,
                message: format!("malformed search response: {}", e),
            })?;

        track_from_search(search)
    }
}

fn connection_error(e: reqwest::Error) -> ResolveError {
    ResolveError::Provider {
        status: None,
        message: e.to_string(),
    }
}

/// Take the first hit only; no disambiguation or re-ranking.
fn track_from_search(search: SearchResponse) -> Result<TrackIdentity, ResolveError> {
    let track = search
        .tracks
        .items
        .into_iter()
        .next()
        .ok_or(ResolveError::NotFound)?;

    let artist = track
        .artists
        .into_iter()
        .next()
        .map(|a| a.name)
        .ok_or_else(|| ResolveError::Provider {
            status: None,
            message: "track has no artists".to_string(),
        })?;

    Ok(TrackIdentity {
        name: track.name,
        artist,
        album: track.album.name,
        spotify_url: track.external_urls.spotify,
        album_art: track.album.images.into_iter().next().map(|i| i.url),
    })
}

// Spotify API types

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: u64,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    tracks: TracksPage,
}

#[derive(Debug, Deserialize)]
struct TracksPage {
    items: Vec<TrackItem>,
}

#[derive(Debug, Deserialize)]
struct TrackItem {
    name: String,
    artists: Vec<ArtistItem>,
    album: AlbumItem,
    external_urls: ExternalUrls,
}

#[derive(Debug, Deserialize)]
struct ArtistItem {
    name: String,
}

#[derive(Debug, Deserialize)]
struct AlbumItem {
    name: String,
    #[serde(default)]
    images: Vec<ImageItem>,
}

#[derive(Debug, Deserialize)]
struct ImageItem {
    url: String,
}

#[derive(Debug, Deserialize)]
struct ExternalUrls {
    spotify: String,
}

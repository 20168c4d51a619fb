//! Genius-backed lyrics provider.
//!
//! Uses the Genius API to locate the song, scrapes the lyric text out of the
//! song page's lyrics containers, and exposes referent annotations for the
//! summarization input.

use super::{FetchedLyrics, LyricsError, LyricsProvider};
use async_trait::async_trait;
use lazy_static::lazy_static;
use regex::Regex;
use serde::Deserialize;
use tracing::debug;

const API_BASE_URL: &str = "https://api.genius.com";
const ANNOTATIONS_PER_PAGE: usize = 20;

lazy_static! {
    static ref LYRICS_CONTAINER_RE: Regex =
        Regex::new(r#"(?s)<div[^>]+data-lyrics-container="true"[^>]*>(.*?)</div>"#).unwrap();
    static ref LINE_BREAK_RE: Regex = Regex::new(r"(?i)<br\s*/?>").unwrap();
    static ref TAG_RE: Regex = Regex::new(r"<[^>]+>").unwrap();
}

pub struct GeniusClient {
    client: reqwest::Client,
    token: String,
    api_base_url: String,
}

impl GeniusClient {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            token: token.into(),
            api_base_url: API_BASE_URL.to_string(),
        }
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, &str)],
    ) -> Result<T, LyricsError> {
        let response = self
            .client
            .get(url)
            .bearer_auth(&self.token)
            .query(query)
            .send()
            .await
            .map_err(connection_error)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LyricsError::Provider {
                status: Some(status.as_u16()),
                message: body,
            });
        }

        response.json().await.map_err(|e| LyricsError::Provider {
            status: None,
            message: format!("malformed response: {}", e),
        })
    }

    async fn find_song(&self, artist: &str, title: &str) -> Result<SongHit, LyricsError> {
        let query = format!("{} {}", title, artist);
        let url = format!("{}/search", self.api_base_url);
        let search: SearchResponse = self.get_json(&url, &[("q", query.as_str())]).await?;

        search
            .response
            .hits
            .into_iter()
            .map(|h| h.result)
            .next()
            .ok_or(LyricsError::NotFound)
    }

    async fn fetch_song_page(&self, url: &str) -> Result<String, LyricsError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(connection_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(LyricsError::Provider {
                status: Some(status.as_u16()),
                message: "failed to fetch song page".to_string(),
            });
        }

        response.text().await.map_err(connection_error)
    }
}

#[async_trait]
impl LyricsProvider for GeniusClient {
    fn name(&self) -> &'static str {
        "genius"
    }

    async fn fetch(&self, artist: &str, title: &str) -> Result<FetchedLyrics, LyricsError> {
        let hit = self.find_song(artist, title).await?;
        debug!(song_id = hit.id, url = %hit.url, "Genius search hit");

        let html = self.fetch_song_page(&hit.url).await?;
        let raw = extract_lyrics(&html);
        if raw.trim().is_empty() {
            return Err(LyricsError::NotFound);
        }

        Ok(FetchedLyrics {
            raw,
            source_url: Some(hit.url),
            song_id: Some(hit.id),
        })
    }

    async fn annotations(&self, song: &FetchedLyrics) -> Result<Vec<String>, LyricsError> {
        let Some(song_id) = song.song_id else {
            return Ok(Vec::new());
        };

        let url = format!("{}/referents", self.api_base_url);
        let song_id_str = song_id.to_string();
        let per_page = ANNOTATIONS_PER_PAGE.to_string();
        let referents: ReferentsResponse = self
            .get_json(
                &url,
                &[
                    ("song_id", song_id_str.as_str()),
                    ("text_format", "plain"),
                    ("per_page", per_page.as_str()),
                ],
            )
            .await?;

        let bodies = referents
            .response
            .referents
            .into_iter()
            .flat_map(|r| r.annotations)
            .filter_map(|a| a.body.map(|b| b.plain))
            .filter(|text| !text.trim().is_empty())
            .collect();
        Ok(bodies)
    }
}

fn connection_error(e: reqwest::Error) -> LyricsError {
    LyricsError::Provider {
        status: None,
        message: e.to_string(),
    }
}

/// Extract lyric text from a Genius song page. Each lyrics container div
/// contributes a block; `<br>` tags become newlines, remaining markup is
/// stripped and HTML entities are decoded.
fn extract_lyrics(html: &str) -> String {
    let mut blocks = Vec::new();
    for captures in LYRICS_CONTAINER_RE.captures_iter(html) {
        let inner = &captures[1];
        let with_newlines = LINE_BREAK_RE.replace_all(inner, "\n");
        let stripped = TAG_RE.replace_all(&with_newlines, "");
        let decoded = decode_entities(&stripped);
        let trimmed = decoded.trim().to_string();
        if !trimmed.is_empty() {
            blocks.push(trimmed);
        }
    }
    blocks.join("\n")
}

fn decode_entities(text: &str) -> String {
    text.replace("&quot;", "\"")
        .replace("&#x27;", "'")
        .replace("&#39;", "'")
        .replace("&apos;", "'")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&")
}

// Genius API types

#[derive(Debug, Deserialize)]
struct SearchResponse {
    response: SearchBody,
}

#[derive(Debug, Deserialize)]
struct SearchBody {
    hits: Vec<Hit>,
}

#[derive(Debug, Deserialize)]
struct Hit {
    result: SongHit,
}

#[derive(Debug, Deserialize)]
struct SongHit {
    id: u64,
    url: String,
}

#[derive(Debug, Deserialize)]
struct ReferentsResponse {
    response: ReferentsBody,
}

#[derive(Debug, Deserialize)]
struct ReferentsBody {
    referents: Vec<Referent>,
}

#[derive(Debug, Deserialize)]
struct Referent {
    #[serde(default)]
    annotations: Vec<Annotation>,
}

#[derive(Debug, Deserialize)]
struct Annotation {
    body: Option<AnnotationBody>,
}

#[derive(Debug, Deserialize)]
struct AnnotationBody {
    plain: String,
}

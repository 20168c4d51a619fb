//! Search pipeline orchestration.
//!
//! Drives one search request through its stages: resolve the track, fetch and
//! sanitize lyrics, compute local statistics, fan out to the inference
//! capabilities concurrently, and count the search in the trending store.
//! Track and lyrics resolution are required stages whose failures terminate
//! the request; inference capabilities and trending persistence degrade
//! per-field instead.

use crate::analysis::{self, SongStatistics};
use crate::error::SearchError;
use crate::inference::{InferenceGateway, LabelScore, TopicClassification};
use crate::lyrics::{fetch_with_retry, LyricsError, LyricsProvider};
use crate::spotify::{ResolveError, TrackIdentity, TrackResolver};
use crate::trending_store::TrendingStore;
use serde::Serialize;
use std::fmt::Display;
use std::sync::Arc;
use tracing::{debug, warn};

/// Stages a request moves through, in order. `NotFound` and `Failed` are the
/// terminal error states; `Done` is the terminal success state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStage {
    ResolvingTrack,
    ResolvingLyrics,
    Sanitizing,
    Analyzing,
    Persisting,
    Done,
    NotFound,
    Failed,
}

impl PipelineStage {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            PipelineStage::Done | PipelineStage::NotFound | PipelineStage::Failed
        )
    }
}

/// Per-capability result embedded in the response: either the capability's
/// value or a failure marker carrying the error message. Serializes untagged,
/// so a success is the bare value and a failure is `{"error": "..."}`.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(untagged)]
pub enum CapabilityOutcome<T> {
    Ok(T),
    Failed { error: String },
}

impl<T> CapabilityOutcome<T> {
    fn from_result<E: Display>(capability: &str, result: Result<T, E>) -> Self {
        match result {
            Ok(value) => CapabilityOutcome::Ok(value),
            Err(e) => {
                warn!(capability, error = %e, "Inference capability failed");
                CapabilityOutcome::Failed {
                    error: e.to_string(),
                }
            }
        }
    }

    pub fn is_ok(&self) -> bool {
        matches!(self, CapabilityOutcome::Ok(_))
    }
}

/// Lyric text in both its fetched and sanitized forms.
#[derive(Debug, Clone, PartialEq)]
pub struct LyricsDocument {
    pub raw: String,
    pub cleaned: String,
}

/// Complete analysis for a resolved track. Field-level failure markers stand
/// in for capabilities that failed; the rest of the result is still valid.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisResult {
    pub track: TrackIdentity,
    /// Sanitized lyric text.
    pub lyrics: String,
    pub summary: CapabilityOutcome<String>,
    pub stats: SongStatistics,
    pub sentiment: CapabilityOutcome<Vec<LabelScore>>,
    pub emotions: CapabilityOutcome<Vec<LabelScore>>,
    pub topics: CapabilityOutcome<TopicClassification>,
    pub word_frequency: Vec<(String, usize)>,
}

/// The search pipeline with its injected collaborators.
pub struct SearchPipeline {
    tracks: Arc<dyn TrackResolver>,
    lyrics: Arc<dyn LyricsProvider>,
    inference: Arc<dyn InferenceGateway>,
    trending: Arc<dyn TrendingStore>,
}

impl SearchPipeline {
    pub fn new(
        tracks: Arc<dyn TrackResolver>,
        lyrics: Arc<dyn LyricsProvider>,
        inference: Arc<dyn InferenceGateway>,
        trending: Arc<dyn TrendingStore>,
    ) -> Self {
        Self {
            tracks,
            lyrics,
            inference,
            trending,
        }
    }

    /// Run one search end to end.
    pub async fn run(&self, query: &str) -> Result<AnalysisResult, SearchError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(SearchError::Validation(
                "Query must not be empty".to_string(),
            ));
        }

        debug!(stage = ?PipelineStage::ResolvingTrack, query, "Resolving track");
        let track = self.tracks.resolve(query).await.map_err(|e| match e {
            ResolveError::NotFound => SearchError::TrackNotFound,
            ResolveError::Provider { status, message } => SearchError::Provider {
                service: "spotify",
                status,
                message,
            },
        })?;

        debug!(
            stage = ?PipelineStage::ResolvingLyrics,
            track = %track.name,
            artist = %track.artist,
            "Fetching lyrics"
        );
        let fetched = fetch_with_retry(self.lyrics.as_ref(), &track.artist, &track.name)
            .await
            .map_err(lyrics_error)?;

        // Annotations are fetched once, without retry. The song reference they
        // need only exists while this fetch is current.
        let annotations = self
            .lyrics
            .annotations(&fetched)
            .await
            .map_err(lyrics_error)?;

        debug!(stage = ?PipelineStage::Sanitizing, "Sanitizing lyrics");
        let document = LyricsDocument {
            cleaned: analysis::clean(&fetched.raw),
            raw: fetched.raw,
        };

        debug!(stage = ?PipelineStage::Analyzing, "Computing stats and running inference");
        let stats = analysis::compute(&document.cleaned);
        let word_frequency = analysis::word_frequency(&document.cleaned);
        let summary_input = build_summary_input(&document.cleaned, &annotations);

        let (summary, sentiment, emotions, topics) = tokio::join!(
            self.inference.summarize(&summary_input),
            self.inference.sentiment(&document.cleaned),
            self.inference.emotions(&document.cleaned),
            self.inference.topics(&document.cleaned),
        );

        debug!(stage = ?PipelineStage::Persisting, "Recording search");
        if let Err(e) = self.trending.record_search(&track) {
            // Best effort: a counter miss must not fail the search.
            warn!(error = %e, "Failed to record search in trending store");
        }

        debug!(stage = ?PipelineStage::Done, "Search complete");
        Ok(AnalysisResult {
            track,
            lyrics: document.cleaned,
            summary: CapabilityOutcome::from_result("summary", summary),
            stats,
            sentiment: CapabilityOutcome::from_result("sentiment", sentiment),
            emotions: CapabilityOutcome::from_result("emotions", emotions),
            topics: CapabilityOutcome::from_result("topics", topics),
            word_frequency,
        })
    }
}

fn lyrics_error(e: LyricsError) -> SearchError {
    match e {
        LyricsError::NotFound => SearchError::LyricsNotFound,
        LyricsError::Provider { status, message } => SearchError::Provider {
            service: "genius",
            status,
            message,
        },
    }
}

/// Combined summarization input: sanitized lyrics followed by the annotation
/// bodies under a fixed header. The header is appended even when no
/// annotations came back.
fn build_summary_input(cleaned: &str, annotations: &[String]) -> String {
    let mut input = format!("{}\n\nSong Annotations:\n", cleaned);
    for body in annotations {
        input.push('\n');
        input.push_str(body);
    }
    input
}

//! Trending store data models.

use serde::Serialize;

/// One persistently counted track, keyed by (track_name, artist).
///
/// Created on the first search for a track; every later search increments
/// `search_count` and advances `last_searched_at`. Rows are never deleted.
/// Invariant: `last_searched_at >= created_at`.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct TrendingRecord {
    pub track_name: String,
    pub artist: String,
    pub album: String,
    pub spotify_url: String,
    pub album_art: Option<String>,
    pub search_count: i64,
    /// Unix seconds; not part of the public JSON shape.
    #[serde(skip)]
    pub last_searched_at: i64,
    /// Unix seconds; not part of the public JSON shape.
    #[serde(skip)]
    pub created_at: i64,
}

//! Trending storage trait.

use super::models::TrendingRecord;
use crate::spotify::TrackIdentity;
use anyhow::Result;

/// Persistent search counters keyed by (track_name, artist).
#[cfg_attr(any(test, feature = "mock"), mockall::automock)]
pub trait TrendingStore: Send + Sync {
    /// Count one search for a track: atomically increment the existing row's
    /// counter and advance its `last_searched_at`, or create a fresh row with
    /// `search_count = 1`. Safe under concurrent callers for the same key.
    fn record_search(&self, track: &TrackIdentity) -> Result<()>;

    /// Records searched within the last `window_days`, ordered by
    /// `search_count` descending, capped at `limit`.
    fn top_trending(&self, window_days: u32, limit: usize) -> Result<Vec<TrendingRecord>>;
}

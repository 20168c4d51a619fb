//! Deterministic, pure text analysis over lyric text.

pub mod sanitizer;
pub mod stats;

pub use sanitizer::clean;
pub use stats::{compute, word_frequency, SongStatistics};

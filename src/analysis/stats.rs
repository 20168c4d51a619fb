//! Word/line statistics and word-frequency ranking.

use lazy_static::lazy_static;
use serde::Serialize;
use std::collections::{HashMap, HashSet};

/// How many entries a word-frequency ranking carries at most.
const TOP_WORDS_LIMIT: usize = 10;

lazy_static! {
    /// Common English function words excluded from frequency ranking.
    static ref STOP_WORDS: HashSet<&'static str> = [
        "the", "be", "to", "of", "and", "a", "in", "that", "have", "i", "it",
        "for", "not", "on", "with", "he", "as", "you", "do", "at", "this",
        "but", "his", "by", "from", "they", "we", "say", "her", "she", "or",
        "an", "will", "my", "one", "all", "would", "there", "their", "what",
        "so", "up", "out", "if", "about", "who", "get", "which", "go", "me",
        "when", "make", "can", "like", "time", "no", "just", "him", "know",
        "take", "people", "into", "year", "your", "good", "some", "could",
        "them", "see", "other", "than", "then", "now", "look", "only",
        "come", "its", "over", "think", "also", "back", "after", "use",
        "two", "how", "our", "work", "first", "well", "way", "even",
        "new", "want", "because", "any", "these", "give", "day",
        "most", "us", "is", "am", "are", "was", "were", "been",
    ]
    .into_iter()
    .collect();
}

/// Aggregate statistics over cleaned lyric text.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SongStatistics {
    pub word_count: usize,
    pub unique_word_count: usize,
    pub line_count: usize,
    /// Percentage of unique words among total words, 2 decimals; 0 for empty
    /// text.
    pub vocabulary_density: f64,
}

/// Compute statistics for a text. Words are whitespace-delimited; lines are
/// newline-delimited with blank lines excluded.
pub fn compute(text: &str) -> SongStatistics {
    let words: Vec<&str> = text.split_whitespace().collect();
    let unique: HashSet<&str> = words.iter().copied().collect();
    let line_count = text.lines().filter(|l| !l.trim().is_empty()).count();

    let word_count = words.len();
    let unique_word_count = unique.len();
    let vocabulary_density = if word_count > 0 {
        round2(unique_word_count as f64 / word_count as f64 * 100.0)
    } else {
        0.0
    };

    SongStatistics {
        word_count,
        unique_word_count,
        line_count,
        vocabulary_density,
    }
}

/// Rank the most frequent meaningful words in a text.
///
/// Tokens are lowercased with non-alphanumeric characters removed before
/// splitting; single-character tokens and stop words are discarded. Returns
/// the 10 highest counts, ties broken by first occurrence in the source text.
pub fn word_frequency(text: &str) -> Vec<(String, usize)> {
    let normalized: String = text
        .to_lowercase()
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == '_' || c.is_whitespace())
        .collect();

    // word -> (count, first occurrence index)
    let mut counts: HashMap<String, (usize, usize)> = HashMap::new();
    for (index, word) in normalized.split_whitespace().enumerate() {
        if word.chars().count() <= 1 || STOP_WORDS.contains(word) {
            continue;
        }
        let entry = counts.entry(word.to_string()).or_insert((0, index));
        entry.0 += 1;
    }

    let mut ranked: Vec<(String, usize, usize)> = counts
        .into_iter()
        .map(|(word, (count, first))| (word, count, first))
        .collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.2.cmp(&b.2)));
    ranked.truncate(TOP_WORDS_LIMIT);
    ranked.into_iter().map(|(word, count, _)| (word, count)).collect()
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compute_counts() {
        let text = "first line here\n\nsecond line here\n   \nthird";
        let stats = compute(text);
        assert_eq!(stats.word_count, 7);
        // "line" and "here" repeat
        assert_eq!(stats.unique_word_count, 5);
        assert_eq!(stats.line_count, 3);
    }

    #[test]
    fn test_vocabulary_density_hundred_words_forty_unique() {
        // 40 distinct words, then 60 repetitions of the first word: 100 total.
        let mut words: Vec<String> = (0..40).map(|i| format!("word{}", i)).collect();
        for _ in 0..60 {
            words.push("word0".to_string());
        }
        let text = words.join(" ");
        let stats = compute(&text);
        assert_eq!(stats.word_count, 100);
        assert_eq!(stats.unique_word_count, 40);
        assert_eq!(stats.vocabulary_density, 40.00);
    }

    #[test]
    fn test_vocabulary_density_empty_text() {
        let stats = compute("");
        assert_eq!(stats.word_count, 0);
        assert_eq!(stats.vocabulary_density, 0.0);
    }

    #[test]
    fn test_vocabulary_density_rounding() {
        // 2 unique out of 3 words: 66.666... -> 66.67
        let stats = compute("repeat repeat once");
        assert_eq!(stats.vocabulary_density, 66.67);
    }

    #[test]
    fn test_word_frequency_excludes_stop_words_and_short_tokens() {
        let text = "the fire and the flame, I burn in fire";
        let freq = word_frequency(text);
        let words: Vec<&str> = freq.iter().map(|(w, _)| w.as_str()).collect();
        assert!(words.contains(&"fire"));
        assert!(words.contains(&"flame"));
        assert!(words.contains(&"burn"));
        assert!(!words.contains(&"the"));
        assert!(!words.contains(&"and"));
        assert!(!words.contains(&"in"));
        assert!(!words.contains(&"i"));
        assert_eq!(freq[0], ("fire".to_string(), 2));
    }

    #[test]
    fn test_word_frequency_strips_punctuation() {
        let freq = word_frequency("don't stop, don't stop believing!");
        // Apostrophes and commas removed before splitting: "don't" -> "dont".
        assert_eq!(freq[0], ("dont".to_string(), 2));
        assert_eq!(freq[1], ("stop".to_string(), 2));
        assert_eq!(freq[2], ("believing".to_string(), 1));
    }

    #[test]
    fn test_word_frequency_ties_in_first_occurrence_order() {
        let text = "alpha beta gamma alpha beta gamma delta";
        let freq = word_frequency(text);
        assert_eq!(
            freq,
            vec![
                ("alpha".to_string(), 2),
                ("beta".to_string(), 2),
                ("gamma".to_string(), 2),
                ("delta".to_string(), 1),
            ]
        );
    }

    #[test]
    fn test_word_frequency_caps_at_ten() {
        let text: String = (0..15)
            .map(|i| format!("unique{}", i))
            .collect::<Vec<_>>()
            .join(" ");
        let freq = word_frequency(&text);
        assert_eq!(freq.len(), 10);
        // First occurrence order among the all-tied entries.
        assert_eq!(freq[0].0, "unique0");
        assert_eq!(freq[9].0, "unique9");
    }

    #[test]
    fn test_word_frequency_empty_text() {
        assert!(word_frequency("").is_empty());
    }
}

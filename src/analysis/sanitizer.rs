//! Lyric text cleanup.

/// Remove contributor/translation boilerplate that lyric pages prepend to the
/// actual lyrics.
///
/// Everything before the first structural section marker (a `[...]` tag like
/// `[Verse 1]` or `[Chorus]`) is discarded. Text without any marker is
/// returned unchanged apart from trimming surrounding whitespace.
///
/// Pure and idempotent: `clean(clean(x)) == clean(x)` for all inputs.
pub fn clean(raw: &str) -> String {
    match raw.find('[') {
        Some(idx) => raw[idx..].trim().to_string(),
        None => raw.trim().to_string(),
    }
}

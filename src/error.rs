//! Error taxonomy for the search pipeline.

use thiserror::Error;

/// Errors a `search` request can terminate with.
///
/// Required-stage provider failures (track and lyrics resolution) surface
/// through here; per-capability inference failures never do, they are captured
/// as field-level markers on the response instead.
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("{0}")]
    Validation(String),

    #[error("Song not found")]
    TrackNotFound,

    #[error("Lyrics not found")]
    LyricsNotFound,

    #[error("{service} error (status {}): {message}", display_status(.status))]
    Provider {
        service: &'static str,
        status: Option<u16>,
        message: String,
    },

    #[error("persistence error: {0}")]
    Persistence(String),
}

fn display_status(status: &Option<u16>) -> String {
    match status {
        Some(code) => code.to_string(),
        None => "unknown".to_string(),
    }
}

impl SearchError {
    /// True for errors that map to a 4xx response.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            SearchError::Validation(_) | SearchError::TrackNotFound | SearchError::LyricsNotFound
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_error_classification() {
        assert!(SearchError::Validation("empty query".into()).is_client_error());
        assert!(SearchError::TrackNotFound.is_client_error());
        assert!(SearchError::LyricsNotFound.is_client_error());
        assert!(!SearchError::Provider {
            service: "spotify",
            status: Some(503),
            message: "unavailable".into()
        }
        .is_client_error());
        assert!(!SearchError::Persistence("disk full".into()).is_client_error());
    }

    #[test]
    fn test_not_found_messages_match_api_contract() {
        assert_eq!(SearchError::TrackNotFound.to_string(), "Song not found");
        assert_eq!(SearchError::LyricsNotFound.to_string(), "Lyrics not found");
    }

    #[test]
    fn test_provider_status_renders_plainly() {
        let with_status = SearchError::Provider {
            service: "spotify",
            status: Some(503),
            message: "unavailable".into(),
        };
        assert_eq!(
            with_status.to_string(),
            "spotify error (status 503): unavailable"
        );

        let without_status = SearchError::Provider {
            service: "genius",
            status: None,
            message: "connection reset".into(),
        };
        assert_eq!(
            without_status.to_string(),
            "genius error (status unknown): connection reset"
        );
    }
}

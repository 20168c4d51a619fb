//! HTTP surface: the search endpoint, the trending listing, and a health
//! probe. Handlers stay thin; all search semantics live in the pipeline.

use crate::config::TrendingSettings;
use crate::error::SearchError;
use crate::pipeline::SearchPipeline;
use crate::trending_store::TrendingStore;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::json;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<SearchPipeline>,
    pub trending: Arc<dyn TrendingStore>,
    pub trending_settings: TrendingSettings,
}

pub fn make_router(state: AppState) -> Router {
    Router::new()
        .route("/search", post(search))
        .route("/api/trending", get(trending))
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind and serve until the listener fails.
pub async fn run_server(port: u16, state: AppState) -> anyhow::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Listening on {}", addr);
    axum::serve(listener, make_router(state)).await?;
    Ok(())
}

#[derive(Debug, Deserialize)]
struct SearchRequest {
    #[serde(default)]
    query: String,
}

async fn search(State(state): State<AppState>, Json(request): Json<SearchRequest>) -> Response {
    match state.pipeline.run(&request.query).await {
        Ok(result) => (StatusCode::OK, Json(result)).into_response(),
        Err(e) => error_response(e),
    }
}

async fn trending(State(state): State<AppState>) -> Response {
    let settings = &state.trending_settings;
    match state
        .trending
        .top_trending(settings.window_days, settings.limit)
    {
        Ok(records) => (StatusCode::OK, Json(records)).into_response(),
        Err(e) => {
            error!(error = %e, "Failed to load trending tracks");
            error_response(SearchError::Persistence(e.to_string()))
        }
    }
}

async fn health() -> Response {
    (StatusCode::OK, Json(json!({"status": "ok"}))).into_response()
}

fn error_response(e: SearchError) -> Response {
    let status = match &e {
        SearchError::Validation(_) => StatusCode::BAD_REQUEST,
        SearchError::TrackNotFound | SearchError::LyricsNotFound => StatusCode::NOT_FOUND,
        SearchError::Provider { .. } | SearchError::Persistence(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    if status.is_server_error() {
        error!(error = %e, "Search request failed");
    }
    (status, Json(json!({"error": e.to_string()}))).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inference::{InferenceError, MockInferenceGateway};
    use crate::lyrics::{FetchedLyrics, LyricsError, MockLyricsProvider};
    use crate::spotify::{MockTrackResolver, ResolveError, TrackIdentity};
    use crate::trending_store::{MockTrendingStore, TrendingRecord};
    use axum::body::Body;
    use axum::http::Request;
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    fn make_track() -> TrackIdentity {
        TrackIdentity {
            name: "Believer".to_string(),
            artist: "Imagine Dragons".to_string(),
            album: "Evolve".to_string(),
            spotify_url: "https://open.spotify.com/track/abc".to_string(),
            album_art: Some("https://img/640.jpg".to_string()),
        }
    }

    fn make_record(name: &str, count: i64) -> TrendingRecord {
        TrendingRecord {
            track_name: name.to_string(),
            artist: "Artist".to_string(),
            album: "Album".to_string(),
            spotify_url: "https://open.spotify.com/track/x".to_string(),
            album_art: None,
            search_count: count,
            last_searched_at: 1_700_000_000,
            created_at: 1_700_000_000,
        }
    }

    fn resolver_with_track() -> MockTrackResolver {
        let mut resolver = MockTrackResolver::new();
        resolver.expect_resolve().returning(|_| Ok(make_track()));
        resolver
    }

    fn provider_with_lyrics(raw: &'static str) -> MockLyricsProvider {
        let mut provider = MockLyricsProvider::new();
        provider.expect_fetch().returning(move |_, _| {
            Ok(FetchedLyrics {
                raw: raw.to_string(),
                source_url: None,
                song_id: Some(1),
            })
        });
        provider.expect_annotations().returning(|_| Ok(Vec::new()));
        provider
    }

    fn healthy_gateway() -> MockInferenceGateway {
        let mut gateway = MockInferenceGateway::new();
        gateway
            .expect_summarize()
            .returning(|_| Ok("A song about perseverance.".to_string()));
        gateway.expect_sentiment().returning(|_| {
            Ok(vec![crate::inference::LabelScore {
                label: "4 stars".to_string(),
                score: 0.71,
            }])
        });
        gateway.expect_emotions().returning(|_| {
            Ok(vec![crate::inference::LabelScore {
                label: "joy".to_string(),
                score: 0.64,
            }])
        });
        gateway.expect_topics().returning(|_| {
            Ok(crate::inference::TopicClassification {
                labels: vec!["personal empowerment".to_string()],
                scores: vec![0.88],
            })
        });
        gateway
    }

    fn unhealthy_gateway() -> MockInferenceGateway {
        fn down() -> InferenceError {
            InferenceError::Api {
                status: 503,
                message: "model loading".to_string(),
            }
        }
        let mut gateway = MockInferenceGateway::new();
        gateway.expect_summarize().returning(|_| Err(down()));
        gateway.expect_sentiment().returning(|_| Err(down()));
        gateway.expect_emotions().returning(|_| Err(down()));
        gateway.expect_topics().returning(|_| Err(down()));
        gateway
    }

    fn accepting_store() -> MockTrendingStore {
        let mut store = MockTrendingStore::new();
        store.expect_record_search().returning(|_| Ok(()));
        store
    }

    fn listing_store() -> MockTrendingStore {
        let mut store = MockTrendingStore::new();
        store.expect_top_trending().returning(|_, limit| {
            Ok(vec![make_record("Believer", 5), make_record("Thunder", 3)]
                .into_iter()
                .take(limit)
                .collect())
        });
        store
    }

    fn make_test_router(
        resolver: MockTrackResolver,
        provider: MockLyricsProvider,
        gateway: MockInferenceGateway,
        listing: MockTrendingStore,
    ) -> Router {
        let pipeline = SearchPipeline::new(
            Arc::new(resolver),
            Arc::new(provider),
            Arc::new(gateway),
            Arc::new(accepting_store()),
        );
        make_router(AppState {
            pipeline: Arc::new(pipeline),
            trending: Arc::new(listing),
            trending_settings: TrendingSettings::default(),
        })
    }

    fn happy_router() -> Router {
        make_test_router(
            resolver_with_track(),
            provider_with_lyrics("[Verse 1]\nPain, you made me a believer"),
            healthy_gateway(),
            listing_store(),
        )
    }

    fn search_request(body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/search")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_search_ok() {
        let response = happy_router()
            .oneshot(search_request(r#"{"query": "believer"}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let json = body_json(response).await;
        assert_eq!(json["track"]["name"], "Believer");
        assert_eq!(json["track"]["artist"], "Imagine Dragons");
        assert!(json["lyrics"].as_str().unwrap().starts_with("[Verse 1]"));
        assert!(json["stats"]["word_count"].as_u64().unwrap() > 0);
        assert!(json["summary"].is_string());
    }

    #[tokio::test]
    async fn test_search_empty_query_is_400() {
        let response = happy_router()
            .oneshot(search_request(r#"{"query": "  "}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = body_json(response).await;
        assert!(json["error"].is_string());
    }

    #[tokio::test]
    async fn test_search_missing_query_field_is_400() {
        let response = happy_router()
            .oneshot(search_request(r#"{}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_search_track_not_found_is_404() {
        let mut resolver = MockTrackResolver::new();
        resolver
            .expect_resolve()
            .returning(|_| Err(ResolveError::NotFound));
        let router = make_test_router(
            resolver,
            MockLyricsProvider::new(),
            MockInferenceGateway::new(),
            MockTrendingStore::new(),
        );
        let response = router
            .oneshot(search_request(r#"{"query": "gibberish"}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let json = body_json(response).await;
        assert_eq!(json["error"], "Song not found");
    }

    #[tokio::test]
    async fn test_search_lyrics_not_found_is_404() {
        let mut provider = MockLyricsProvider::new();
        provider
            .expect_fetch()
            .returning(|_, _| Err(LyricsError::NotFound));
        let router = make_test_router(
            resolver_with_track(),
            provider,
            MockInferenceGateway::new(),
            MockTrendingStore::new(),
        );
        let response = router
            .oneshot(search_request(r#"{"query": "believer"}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let json = body_json(response).await;
        assert_eq!(json["error"], "Lyrics not found");
    }

    #[tokio::test]
    async fn test_search_capability_failure_still_200() {
        let router = make_test_router(
            resolver_with_track(),
            provider_with_lyrics("[Chorus]\nla la la"),
            unhealthy_gateway(),
            MockTrendingStore::new(),
        );

        let response = router
            .oneshot(search_request(r#"{"query": "believer"}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert!(json["summary"]["error"].is_string());
        assert!(json["sentiment"]["error"].is_string());
        // Local analysis still present.
        assert_eq!(json["stats"]["line_count"], 2);
    }

    #[tokio::test]
    async fn test_trending_listing() {
        let response = happy_router()
            .oneshot(
                Request::builder()
                    .uri("/api/trending")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let json = body_json(response).await;
        let records = json.as_array().unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0]["track_name"], "Believer");
        assert_eq!(records[0]["search_count"], 5);
        assert!(records[0].get("last_searched_at").is_none());
    }

    #[tokio::test]
    async fn test_trending_store_failure_is_500() {
        let mut listing = MockTrendingStore::new();
        listing
            .expect_top_trending()
            .returning(|_, _| Err(anyhow::anyhow!("database is locked")));
        let router = make_test_router(
            MockTrackResolver::new(),
            MockLyricsProvider::new(),
            MockInferenceGateway::new(),
            listing,
        );

        let response = router
            .oneshot(
                Request::builder()
                    .uri("/api/trending")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn test_health() {
        let response = happy_router()
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["status"], "ok");
    }
}

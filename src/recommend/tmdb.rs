//! TMDB discover client.

use std::time::Duration;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use tracing::{info, warn};

use super::mapper::DiscoverParams;
use super::model::{DiscoverResponse, TmdbMovie};
use crate::error::{ConfigError, RecommendError};

/// Default TMDB API root.
pub const DEFAULT_BASE_URL: &str = "https://api.themoviedb.org/3";

/// Default request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(20);

/// A source of movie recommendations.
#[async_trait]
pub trait MovieCatalog: Send + Sync {
    /// Run a discover query and return the raw results in ranking order.
    async fn discover(&self, params: &DiscoverParams) -> Result<Vec<TmdbMovie>, RecommendError>;
}

/// TMDB connection settings.
#[derive(Debug, Clone)]
pub struct TmdbConfig {
    /// `None` when `TMDB_API_KEY` is unset; requests then fail with
    /// `MissingCredential` before touching the network.
    pub api_key: Option<SecretString>,
    pub base_url: String,
    pub timeout: Duration,
}

impl Default for TmdbConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

/// HTTP client for TMDB `/discover/movie`.
pub struct TmdbClient {
    client: reqwest::Client,
    config: TmdbConfig,
}

impl TmdbClient {
    pub fn new(config: TmdbConfig) -> Result<Self, ConfigError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ConfigError::HttpClient(e.to_string()))?;
        Ok(Self { client, config })
    }

    pub fn has_credential(&self) -> bool {
        self.config.api_key.is_some()
    }

    fn discover_url(&self) -> String {
        format!("{}/discover/movie", self.config.base_url.trim_end_matches('/'))
    }

    /// Map a reqwest failure to an upstream error, keeping the API key
    /// (part of the request URL) out of the message.
    fn upstream_error(&self, e: reqwest::Error) -> RecommendError {
        if e.is_timeout() {
            RecommendError::UpstreamFailure(format!(
                "request timed out after {}s",
                self.config.timeout.as_secs()
            ))
        } else {
            RecommendError::UpstreamFailure(e.without_url().to_string())
        }
    }
}

#[async_trait]
impl MovieCatalog for TmdbClient {
    async fn discover(&self, params: &DiscoverParams) -> Result<Vec<TmdbMovie>, RecommendError> {
        let api_key = self
            .config
            .api_key
            .as_ref()
            .ok_or(RecommendError::MissingCredential)?;

        let mut query = params.query_pairs();
        query.push(("api_key", api_key.expose_secret().to_string()));

        info!(
            genres = %params.genre_ids(),
            sort_by = params.sort_by.as_str(),
            min_votes = params.min_vote_count,
            "Querying TMDB discover"
        );

        let resp = self
            .client
            .get(self.discover_url())
            .query(&query)
            .send()
            .await
            .map_err(|e| self.upstream_error(e))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            let detail = serde_json::from_str::<serde_json::Value>(&body)
                .ok()
                .and_then(|v| {
                    v.get("status_message")
                        .and_then(|m| m.as_str())
                        .map(String::from)
                })
                .unwrap_or(body);
            warn!(status = %status, detail = %detail, "TMDB returned an error");
            return Err(RecommendError::UpstreamFailure(format!("{status}: {detail}")));
        }

        let data: DiscoverResponse = resp.json().await.map_err(|e| self.upstream_error(e))?;
        info!(results = data.results.len(), "TMDB discover complete");
        Ok(data.results)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    use axum::extract::{Query, State};
    use axum::http::StatusCode;
    use axum::response::IntoResponse;
    use axum::routing::get;
    use axum::{Json, Router};
    use tokio::net::TcpListener;

    use super::*;
    use crate::quiz::Category;
    use crate::recommend::mapper::bundle;

    type Seen = Arc<Mutex<Vec<HashMap<String, String>>>>;

    /// Start a stub TMDB server; returns its base URL and the captured queries.
    async fn start_stub(status: StatusCode, body: serde_json::Value) -> (String, Seen) {
        let seen: Seen = Arc::new(Mutex::new(Vec::new()));
        let app = Router::new()
            .route(
                "/3/discover/movie",
                get(
                    move |State(seen): State<Seen>,
                          Query(q): Query<HashMap<String, String>>| {
                        let body = body.clone();
                        async move {
                            seen.lock().unwrap().push(q);
                            (status, Json(body)).into_response()
                        }
                    },
                ),
            )
            .with_state(Arc::clone(&seen));

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        (format!("http://127.0.0.1:{port}/3"), seen)
    }

    fn client(base_url: String, key: Option<&str>) -> TmdbClient {
        TmdbClient::new(TmdbConfig {
            api_key: key.map(SecretString::from),
            base_url,
            timeout: Duration::from_secs(5),
        })
        .unwrap()
    }

    #[tokio::test]
    async fn missing_key_fails_before_any_request() {
        let (base, seen) = start_stub(StatusCode::OK, serde_json::json!({"results": []})).await;
        let tmdb = client(base, None);
        assert!(!tmdb.has_credential());

        let err = tmdb.discover(&bundle(Category::Dark)).await.unwrap_err();
        assert!(matches!(err, RecommendError::MissingCredential));
        assert!(seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn sends_bundle_params_and_parses_results() {
        let body = serde_json::json!({
            "page": 1,
            "results": [
                {"title": "Se7en", "release_date": "1995-09-22", "vote_average": 8.4},
                {"title": "Zodiac", "poster_path": "/z.jpg"}
            ]
        });
        let (base, seen) = start_stub(StatusCode::OK, body).await;
        let tmdb = client(format!("{base}/"), Some("k-123"));

        let movies = tmdb.discover(&bundle(Category::Dark)).await.unwrap();
        assert_eq!(movies.len(), 2);
        assert_eq!(movies[0].title.as_deref(), Some("Se7en"));

        let seen = seen.lock().unwrap();
        let q = &seen[0];
        assert_eq!(q["api_key"], "k-123");
        assert_eq!(q["with_genres"], "53,27,9648");
        assert_eq!(q["sort_by"], "vote_average.desc");
        assert_eq!(q["vote_count.gte"], "800");
        assert_eq!(q["page"], "1");
    }

    #[tokio::test]
    async fn error_status_surfaces_upstream_message() {
        let body = serde_json::json!({"status_code": 7, "status_message": "Invalid API key"});
        let (base, _seen) = start_stub(StatusCode::UNAUTHORIZED, body).await;
        let tmdb = client(base, Some("bad"));

        let err = tmdb.discover(&bundle(Category::Healing)).await.unwrap_err();
        match err {
            RecommendError::UpstreamFailure(msg) => {
                assert!(msg.contains("401"), "{msg}");
                assert!(msg.contains("Invalid API key"), "{msg}");
            }
            other => panic!("expected UpstreamFailure, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn slow_upstream_times_out_as_upstream_failure() {
        let app = Router::new().route(
            "/3/discover/movie",
            get(|| async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                Json(serde_json::json!({"results": []}))
            }),
        );
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        let tmdb = TmdbClient::new(TmdbConfig {
            api_key: Some(SecretString::from("k")),
            base_url: format!("http://127.0.0.1:{port}/3"),
            timeout: Duration::from_secs(1),
        })
        .unwrap();

        let started = std::time::Instant::now();
        let err = tmdb.discover(&bundle(Category::Motivation)).await.unwrap_err();
        assert!(started.elapsed() < Duration::from_secs(4));
        match err {
            RecommendError::UpstreamFailure(msg) => {
                assert!(msg.contains("timed out"), "{msg}");
                assert!(msg.contains("1s"), "{msg}");
            }
            other => panic!("expected UpstreamFailure, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn unreachable_host_is_upstream_failure_without_key_in_message() {
        // Bind then drop to get a port nothing listens on.
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let tmdb = client(format!("http://127.0.0.1:{port}/3"), Some("secret-key"));
        let err = tmdb.discover(&bundle(Category::Fantasy)).await.unwrap_err();
        match err {
            RecommendError::UpstreamFailure(msg) => assert!(!msg.contains("secret-key"), "{msg}"),
            other => panic!("expected UpstreamFailure, got {other:?}"),
        }
    }
}

//! Route definitions

use super::handlers;
use super::state::AppState;
use axum::{routing::get, Router};
use tower_http::compression::CompressionLayer;
use tower_http::cors::{Any, CorsLayer};

/// Create the application router with all routes
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(handlers::index))
        .route("/search", get(handlers::search))
        .route("/live", get(handlers::live))
        .route("/stats", get(handlers::stats))
        .route("/health", get(handlers::health))
        .layer(CompressionLayer::new())
        .layer(cors)
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Settings;
    use crate::metrics::Metrics;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use serde_json::{json, Value};
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::time::timeout;
    use tower::ServiceExt;
    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn state(server: &MockServer) -> AppState {
        let mut settings = Settings::default();
        settings.github.api_url = format!("{}/graphql", server.uri());
        settings.search.debounce_ms = 0;

        let metrics = Arc::new(Metrics::new());
        let aggregator = crate::build_aggregator(&settings, metrics.clone()).unwrap();
        AppState::new(&settings, aggregator, metrics).unwrap()
    }

    fn app(server: &MockServer) -> (Router, Arc<Metrics>) {
        let state = state(server);
        let metrics = state.metrics.clone();
        (create_router(state), metrics)
    }

    async fn get_text(app: Router, uri: &str) -> (StatusCode, String) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }

    async fn get_json(app: Router, uri: &str) -> (StatusCode, Value) {
        let (status, body) = get_text(app, uri).await;
        (status, serde_json::from_str(&body).unwrap())
    }

    async fn mount_single_page(server: &MockServer, delay: Duration) {
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_delay(delay)
                    .set_body_json(json!({
                        "data": { "search": {
                            "edges": [
                                { "node": { "login": "octocat", "followers": { "totalCount": 42 } } }
                            ],
                            "pageInfo": { "hasNextPage": false, "endCursor": null }
                        } }
                    })),
            )
            .expect(1)
            .mount(server)
            .await;
    }

    async fn wait_until_idle(state: &AppState) -> crate::search::SearchView {
        let mut updates = state.session.subscribe();
        let view = timeout(Duration::from_secs(5), updates.wait_for(|view| !view.loading))
            .await
            .expect("search did not finish")
            .unwrap()
            .clone();
        view
    }

    #[tokio::test]
    async fn test_search_json() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": { "search": {
                    "edges": [
                        { "node": { "login": "small", "followers": { "totalCount": 1 } } },
                        { "node": { "login": "big", "followers": { "totalCount": 50 } } }
                    ],
                    "pageInfo": { "hasNextPage": false, "endCursor": null }
                } }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let (app, metrics) = app(&server);
        let (status, body) = get_json(app, "/search?q=s&format=json").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["number_of_results"], 2);
        assert_eq!(body["results"][0]["identifier"], "big");
        assert_eq!(body["results"][1]["rank"], 1);
        assert_eq!(metrics.snapshot().successes, 1);
    }

    #[tokio::test]
    async fn test_search_empty_term_skips_backend() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500))
            .expect(0)
            .mount(&server)
            .await;

        let (app, _) = app(&server);
        let (status, body) = get_json(app, "/search?q=&format=json").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["number_of_results"], 0);
    }

    #[tokio::test]
    async fn test_search_failure_reports_generic_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let (app, metrics) = app(&server);
        let (status, body) = get_json(app, "/search?q=x&format=json").await;

        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body["error"], "search failed");
        assert_eq!(metrics.snapshot().failures.get("http_status"), Some(&1));
    }

    #[tokio::test]
    async fn test_health() {
        let server = MockServer::start().await;
        let (app, _) = app(&server);
        let (status, body) = get_json(app, "/health").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn test_live_without_term_returns_idle_view() {
        let server = MockServer::start().await;
        let (app, _) = app(&server);
        let (status, body) = get_json(app, "/live").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["loading"], false);
        assert_eq!(body["generation"], 0);
    }

    #[tokio::test]
    async fn test_live_submits_term_and_commits() {
        let server = MockServer::start().await;
        mount_single_page(&server, Duration::from_millis(50)).await;

        let state = state(&server);
        let (status, body) = get_json(create_router(state.clone()), "/live?q=octo").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["term"], "octo");
        assert_eq!(body["loading"], true);
        assert_eq!(body["generation"], 1);

        let view = wait_until_idle(&state).await;
        assert_eq!(view.generation, 1);
        assert_eq!(view.records.len(), 1);
        assert_eq!(view.records[0].identifier, "octocat");
        assert!(view.last_completed.is_some());

        let (_, body) = get_json(create_router(state.clone()), "/live").await;
        assert_eq!(body["loading"], false);
        assert_eq!(body["records"][0]["rank"], 42);
    }

    #[tokio::test]
    async fn test_index_shows_loading_then_skips_same_term() {
        let server = MockServer::start().await;
        mount_single_page(&server, Duration::from_millis(50)).await;

        let state = state(&server);
        let (status, page) = get_text(create_router(state.clone()), "/?q=octo").await;
        assert_eq!(status, StatusCode::OK);
        assert!(page.contains("Loading..."));

        wait_until_idle(&state).await;

        let (status, page) = get_text(create_router(state.clone()), "/?q=octo").await;
        assert_eq!(status, StatusCode::OK);
        assert!(!page.contains("Loading..."));
        assert!(page.contains("octocat"));
        assert_eq!(state.session.snapshot().generation, 1);
        assert_eq!(state.metrics.snapshot().total_searches, 1);
    }
}

//! HTTP request handlers

use super::state::AppState;
use crate::search::ResultRecord;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use tera::Context;

/// Query parameters for search
#[derive(Debug, Deserialize)]
pub struct SearchParams {
    /// Search term
    pub q: Option<String>,
    /// Output format
    pub format: Option<String>,
}

/// Search results response for JSON format
#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub query: String,
    pub number_of_results: usize,
    pub pages_fetched: u32,
    pub results: Vec<ResultRecord>,
}

/// Live view: submitting `q` supersedes any search in flight
pub async fn index(State(state): State<AppState>, Query(params): Query<SearchParams>) -> Response {
    if let Some(term) = params.q {
        if term != state.session.snapshot().term {
            state.session.submit(term);
        }
    }

    let view = state.session.snapshot();

    let mut ctx = Context::new();
    ctx.insert("term", &view.term);
    ctx.insert("loading", &view.loading);
    ctx.insert("records", &view.records);

    render(&state, "index.html", &ctx)
}

/// JSON view of the live search, optionally submitting a new term
pub async fn live(State(state): State<AppState>, Query(params): Query<SearchParams>) -> impl IntoResponse {
    if let Some(term) = params.q {
        state.session.submit(term);
    }
    Json(state.session.snapshot())
}

/// One-shot search handler
pub async fn search(State(state): State<AppState>, Query(params): Query<SearchParams>) -> Response {
    let term = params.q.unwrap_or_default();
    let outcome = state.aggregator.aggregate(term.as_str()).await;

    match params.format.as_deref() {
        Some("json") => match outcome {
            Ok(set) => Json(SearchResponse {
                query: term,
                number_of_results: set.len(),
                pages_fetched: set.pages_fetched,
                results: set.records,
            })
            .into_response(),
            Err(e) => (
                StatusCode::BAD_GATEWAY,
                Json(serde_json::json!({ "query": term, "error": e.user_message() })),
            )
                .into_response(),
        },
        _ => {
            let failed = outcome.is_err();
            let records = outcome.map(|set| set.records).unwrap_or_default();

            let mut ctx = Context::new();
            ctx.insert("term", &term);
            ctx.insert("records", &records);
            ctx.insert("failed", &failed);

            let page = render(&state, "search.html", &ctx);
            if failed {
                (StatusCode::BAD_GATEWAY, page).into_response()
            } else {
                page
            }
        }
    }
}

/// Metrics handler
pub async fn stats(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.metrics.snapshot())
}

/// Health check handler
pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "version": crate::VERSION
    }))
}

fn render(state: &AppState, template: &str, ctx: &Context) -> Response {
    match state.templates.render_with_context(template, ctx) {
        Ok(html) => Html(html).into_response(),
        Err(e) => {
            tracing::error!("Template error: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Template error").into_response()
        }
    }
}

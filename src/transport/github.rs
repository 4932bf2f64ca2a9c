//! GitHub user search transport
//!
//! Uses the GraphQL API to page through users matched by login, reading
//! each user's follower count as the rank.

use super::traits::*;
use crate::config::{Credential, GitHubSettings};
use crate::error::SearchError;
use crate::network::{HttpClient, HttpResponse};
use crate::search::is_stripped;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use url::Url;

/// GitHub's hard limit on `first`
pub const MAX_PAGE_SIZE: u32 = 100;

/// The search text, page size and cursor always travel as variables
const SEARCH_USERS_QUERY: &str = r#"
query SearchUsers($query: String!, $first: Int!, $after: String) {
  search(query: $query, type: USER, first: $first, after: $after) {
    edges {
      node {
        ... on User {
          login
          followers {
            totalCount
          }
        }
      }
    }
    pageInfo {
      hasNextPage
      endCursor
    }
  }
}
"#;

/// GraphQL error types that mean the credential or quota is the problem
const AUTH_ERROR_TYPES: &[&str] = &["RATE_LIMITED", "FORBIDDEN", "UNAUTHORIZED", "INSUFFICIENT_SCOPES"];

/// GitHub GraphQL user search
pub struct GitHubTransport {
    client: HttpClient,
    api_url: Url,
    page_size: u32,
    credential: Option<Credential>,
}

impl GitHubTransport {
    /// Create a transport against `api_url`
    pub fn new(client: HttpClient, api_url: &str) -> anyhow::Result<Self> {
        Ok(Self {
            client,
            api_url: Url::parse(api_url)?,
            page_size: MAX_PAGE_SIZE,
            credential: None,
        })
    }

    /// Create a transport from the `github` settings section
    pub fn from_settings(client: HttpClient, settings: &GitHubSettings) -> anyhow::Result<Self> {
        let mut transport = Self::new(client, &settings.api_url)?.with_page_size(settings.page_size);
        if let Some(ref token) = settings.token {
            transport = transport.with_credential(token.clone());
        }
        Ok(transport)
    }

    /// Attach the bearer credential sent with every request
    pub fn with_credential(mut self, credential: Credential) -> Self {
        self.credential = Some(credential);
        self
    }

    /// Set results per page, clamped to what the API accepts
    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size.clamp(1, MAX_PAGE_SIZE);
        self
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    fn request_body<'a>(&self, term: &str, cursor: Option<&'a str>) -> GraphQlRequest<'a> {
        GraphQlRequest {
            query: SEARCH_USERS_QUERY,
            variables: SearchVariables {
                query: search_text(term),
                first: self.page_size,
                after: cursor,
            },
        }
    }

    fn parse_page(&self, response: HttpResponse) -> Result<Page, SearchError> {
        if response.is_auth_or_rate_limited() {
            let remaining = response.header("X-RateLimit-Remaining").unwrap_or("unknown");
            warn!("GitHub refused request: HTTP {}, rate limit remaining {}", response.status, remaining);
            return Err(SearchError::RateLimitOrAuth(format!(
                "HTTP {}: {} (rate limit remaining: {})",
                response.status,
                error_message(&response),
                remaining
            )));
        }
        if !response.is_success() {
            return Err(SearchError::Status {
                status: response.status,
                message: error_message(&response),
            });
        }

        let body: GraphQlResponse = response.json()?;

        if !body.errors.is_empty() {
            let messages = body
                .errors
                .iter()
                .map(|e| e.message.as_str())
                .collect::<Vec<_>>()
                .join("; ");

            let auth_failure = body.errors.iter().any(|e| {
                e.kind
                    .as_deref()
                    .map(|k| AUTH_ERROR_TYPES.contains(&k))
                    .unwrap_or(false)
            });
            if auth_failure {
                return Err(SearchError::RateLimitOrAuth(messages));
            }
            warn!("GraphQL errors alongside data: {}", messages);
        }

        let search = body
            .data
            .and_then(|d| d.search)
            .ok_or_else(|| SearchError::MalformedPage("response has no search data".to_string()))?;

        let page_info = search
            .page_info
            .ok_or_else(|| SearchError::MalformedPage("missing pageInfo".to_string()))?;
        let has_next_page = page_info
            .has_next_page
            .ok_or_else(|| SearchError::MalformedPage("missing pageInfo.hasNextPage".to_string()))?;

        let entries = search
            .edges
            .unwrap_or_default()
            .into_iter()
            .map(|edge| {
                let node = edge.and_then(|e| e.node).unwrap_or_default();
                RawEntry {
                    identifier: node.login,
                    rank: node.followers.and_then(|f| f.total_count),
                }
            })
            .collect();

        Ok(Page {
            entries,
            has_next_page,
            end_cursor: page_info.end_cursor,
        })
    }
}

#[async_trait]
impl SearchTransport for GitHubTransport {
    fn name(&self) -> &str {
        "github"
    }

    async fn fetch_page(&self, term: &str, cursor: Option<&str>) -> Result<Page, SearchError> {
        let mut headers = Vec::with_capacity(1);
        if let Some(ref credential) = self.credential {
            headers.push(("Authorization", credential.bearer()));
        }

        let body = self.request_body(term, cursor);
        debug!("POST {} after={:?}", self.api_url, cursor);

        let response = self
            .client
            .post_json(self.api_url.as_str(), &headers, &body)
            .await?;

        self.parse_page(response)
    }
}

/// Build the GitHub search text for a login search.
///
/// Quotes and backslashes are always removed. Terms that could smuggle in
/// search qualifiers (whitespace, `:` or quotes) are then wrapped in quotes.
pub fn search_text(term: &str) -> String {
    let term = term.trim();
    let needs_quoting = term
        .chars()
        .any(|c| c.is_whitespace() || c == ':' || c == '"');
    let cleaned: String = term.chars().filter(|c| !is_stripped(*c)).collect();

    if needs_quoting {
        format!("\"{}\" in:login", cleaned.trim())
    } else {
        format!("{} in:login", cleaned)
    }
}

fn error_message(response: &HttpResponse) -> String {
    #[derive(Deserialize)]
    struct ErrorBody {
        message: String,
    }

    match response.json::<ErrorBody>() {
        Ok(body) => body.message,
        Err(_) => response.text.chars().take(200).collect(),
    }
}

#[derive(Debug, Serialize)]
struct GraphQlRequest<'a> {
    query: &'static str,
    variables: SearchVariables<'a>,
}

#[derive(Debug, Serialize)]
struct SearchVariables<'a> {
    query: String,
    first: u32,
    after: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
struct GraphQlResponse {
    data: Option<SearchData>,
    #[serde(default)]
    errors: Vec<GraphQlError>,
}

#[derive(Debug, Deserialize)]
struct GraphQlError {
    #[serde(rename = "type")]
    kind: Option<String>,
    #[serde(default)]
    message: String,
}

#[derive(Debug, Deserialize)]
struct SearchData {
    search: Option<SearchConnection>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchConnection {
    edges: Option<Vec<Option<SearchEdge>>>,
    page_info: Option<PageInfo>,
}

#[derive(Debug, Deserialize)]
struct SearchEdge {
    node: Option<UserNode>,
}

#[derive(Debug, Default, Deserialize)]
struct UserNode {
    login: Option<String>,
    followers: Option<FollowerConnection>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FollowerConnection {
    total_count: Option<i64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PageInfo {
    has_next_page: Option<bool>,
    end_cursor: Option<String>,
}

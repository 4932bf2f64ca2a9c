//! Error types for the search core

/// Errors raised while fetching or aggregating search pages
#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    #[error("transport error: {0}")]
    Transport(String),

    #[error("HTTP error {status}: {message}")]
    Status { status: u16, message: String },

    #[error("authorization or rate limit failure: {0}")]
    RateLimitOrAuth(String),

    #[error("malformed page: {0}")]
    MalformedPage(String),

    #[error("page limit of {0} exceeded")]
    PageLimitExceeded(u32),
}

impl SearchError {
    /// Stable label for logs and metrics
    pub fn kind(&self) -> &'static str {
        match self {
            SearchError::Transport(_) => "transport",
            SearchError::Status { .. } => "http_status",
            SearchError::RateLimitOrAuth(_) => "rate_limit_or_auth",
            SearchError::MalformedPage(_) => "malformed_page",
            SearchError::PageLimitExceeded(_) => "page_limit",
        }
    }

    /// Message shown to end users. Every failure reads the same.
    pub fn user_message(&self) -> &'static str {
        "search failed"
    }
}

impl From<reqwest::Error> for SearchError {
    fn from(err: reqwest::Error) -> Self {
        match err.status() {
            Some(status) => SearchError::Status {
                status: status.as_u16(),
                message: err.to_string(),
            },
            None => SearchError::Transport(err.to_string()),
        }
    }
}

impl From<serde_json::Error> for SearchError {
    fn from(err: serde_json::Error) -> Self {
        SearchError::MalformedPage(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kinds_are_distinct() {
        let errors = [
            SearchError::Transport("down".into()),
            SearchError::Status {
                status: 500,
                message: "boom".into(),
            },
            SearchError::RateLimitOrAuth("quota".into()),
            SearchError::MalformedPage("no pageInfo".into()),
            SearchError::PageLimitExceeded(3),
        ];

        let kinds: std::collections::HashSet<_> = errors.iter().map(|e| e.kind()).collect();
        assert_eq!(kinds.len(), errors.len());
        assert!(errors.iter().all(|e| e.user_message() == "search failed"));
    }

    #[test]
    fn test_json_error_is_malformed_page() {
        let err: SearchError = serde_json::from_str::<serde_json::Value>("{")
            .unwrap_err()
            .into();
        assert_eq!(err.kind(), "malformed_page");
    }
}

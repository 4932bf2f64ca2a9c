//! github-user-search: find GitHub users by login, ranked by followers
//!
//! Pages through GitHub's GraphQL user search, keeps users that expose a
//! follower count and returns them sorted by that count.

pub mod config;
pub mod error;
pub mod metrics;
pub mod network;
pub mod search;
pub mod transport;
pub mod web;

pub use config::Settings;
pub use error::SearchError;
pub use search::{PaginatedSearchAggregator, ResultRecord, ResultSet, SearchQuery, SearchSession};
pub use transport::{GitHubTransport, SearchTransport};

use network::HttpClient;
use std::sync::Arc;
use std::time::Duration;

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Wire the GitHub transport and aggregator from settings
pub fn build_aggregator(
    settings: &Settings,
    metrics: Arc<metrics::Metrics>,
) -> anyhow::Result<PaginatedSearchAggregator> {
    let client = HttpClient::with_settings(&settings.outgoing)?;
    let transport = GitHubTransport::from_settings(client, &settings.github)?;

    Ok(PaginatedSearchAggregator::new(Arc::new(transport))
        .with_max_pages(settings.search.max_pages)
        .with_metrics(metrics))
}

/// Debounce interval configured for live sessions
pub fn debounce(settings: &Settings) -> Duration {
    Duration::from_millis(settings.search.debounce_ms)
}

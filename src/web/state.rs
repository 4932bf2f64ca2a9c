//! Application state shared across handlers

use crate::config::Settings;
use crate::metrics::Metrics;
use crate::search::{PaginatedSearchAggregator, SearchSession};
use std::sync::Arc;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// One-shot searches
    pub aggregator: Arc<PaginatedSearchAggregator>,
    /// Live search box state
    pub session: Arc<SearchSession>,
    /// Search metrics
    pub metrics: Arc<Metrics>,
    /// Template renderer
    pub templates: Arc<super::Templates>,
}

impl AppState {
    /// Create new application state
    pub fn new(
        settings: &Settings,
        aggregator: PaginatedSearchAggregator,
        metrics: Arc<Metrics>,
    ) -> anyhow::Result<Self> {
        let aggregator = Arc::new(aggregator);
        let session = SearchSession::new(aggregator.clone(), crate::debounce(settings));
        let templates = Arc::new(super::Templates::new()?);

        Ok(Self {
            aggregator,
            session,
            metrics,
            templates,
        })
    }
}

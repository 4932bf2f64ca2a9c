//! Live search state fed by term changes
//!
//! Every `submit` bumps a generation counter. A run commits its results
//! only while its generation is still the newest, so a slow search for an
//! older term can never overwrite a newer one.

use super::aggregator::PaginatedSearchAggregator;
use super::models::{ResultRecord, SearchQuery};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, error};

/// Caller-visible search state
#[derive(Debug, Clone, Default, Serialize)]
pub struct SearchView {
    /// Most recently submitted term
    pub term: String,
    /// Results of the newest completed run
    pub records: Vec<ResultRecord>,
    /// A run for `term` is still in flight
    pub loading: bool,
    /// Generation of the newest submitted run
    pub generation: u64,
    /// When `records` were last committed
    pub last_completed: Option<DateTime<Utc>>,
}

/// Handle to one submitted run
pub struct SearchTicket {
    pub generation: u64,
    handle: Option<JoinHandle<()>>,
}

impl SearchTicket {
    /// Wait for the run to finish, whether it committed or was superseded
    pub async fn finished(self) {
        if let Some(handle) = self.handle {
            if let Err(e) = handle.await {
                error!("Search task {} panicked: {}", self.generation, e);
            }
        }
    }
}

/// Shared result slot with "last call wins" commits
pub struct SearchSession {
    aggregator: Arc<PaginatedSearchAggregator>,
    view: watch::Sender<SearchView>,
    debounce: Duration,
}

impl SearchSession {
    pub fn new(aggregator: Arc<PaginatedSearchAggregator>, debounce: Duration) -> Arc<Self> {
        let (view, _) = watch::channel(SearchView::default());
        Arc::new(Self {
            aggregator,
            view,
            debounce,
        })
    }

    /// Current state
    pub fn snapshot(&self) -> SearchView {
        self.view.borrow().clone()
    }

    /// Receive every state change
    pub fn subscribe(&self) -> watch::Receiver<SearchView> {
        self.view.subscribe()
    }

    fn current_generation(&self) -> u64 {
        self.view.borrow().generation
    }

    /// Start a search for `term`, superseding any run in flight.
    ///
    /// A blank term clears the results immediately and issues no request.
    pub fn submit(self: &Arc<Self>, term: impl Into<String>) -> SearchTicket {
        let query = SearchQuery::new(term);
        let blank = query.is_empty();

        let mut generation = 0;
        self.view.send_modify(|view| {
            view.generation += 1;
            generation = view.generation;
            view.term = query.term.clone();
            view.loading = !blank;
            if blank {
                view.records.clear();
            }
        });

        if blank {
            return SearchTicket {
                generation,
                handle: None,
            };
        }

        let session = Arc::clone(self);
        let handle = tokio::spawn(async move {
            session.run(generation, query).await;
        });

        SearchTicket {
            generation,
            handle: Some(handle),
        }
    }

    async fn run(&self, generation: u64, query: SearchQuery) {
        if !self.debounce.is_zero() {
            tokio::time::sleep(self.debounce).await;
        }
        if self.current_generation() != generation {
            debug!("Search {} for '{}' superseded before fetching", generation, query.term);
            return;
        }

        let outcome = self.aggregator.aggregate(query.clone()).await;

        let committed = self.view.send_if_modified(|view| {
            if view.generation != generation {
                return false;
            }
            view.loading = false;
            // On failure the previous records stay visible; the aggregator already logged it
            if let Ok(ref set) = outcome {
                view.records = set.records.clone();
                view.last_completed = Some(Utc::now());
            }
            true
        });

        if !committed {
            debug!("Discarding stale results of search {} for '{}'", generation, query.term);
        }
    }
}

//! Search orchestration module
//!
//! Runs the pagination loop against a transport, ranks the results and
//! keeps the caller-visible state of the latest search.

mod aggregator;
mod models;
mod session;

pub use aggregator::PaginatedSearchAggregator;
pub use models::*;
pub(crate) use models::is_stripped;
pub use session::{SearchSession, SearchTicket, SearchView};

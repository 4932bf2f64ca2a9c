//! Web server module
//!
//! Serves the search box, the live result table and the JSON API.

mod handlers;
mod routes;
mod state;
mod templates;

pub use routes::create_router;
pub use state::AppState;
pub use templates::Templates;

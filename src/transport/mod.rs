//! Search transport module
//!
//! Defines the SearchTransport trait and the GitHub GraphQL implementation.

mod traits;

pub mod github;

#[cfg(test)]
pub(crate) mod testing;

pub use github::GitHubTransport;
pub use traits::*;

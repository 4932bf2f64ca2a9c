//! HTTP networking module
//!
//! Provides the HTTP client used by search transports.

mod client;

pub use client::{HttpClient, HttpResponse};

//! HTTP client used by the remote fetchers.

mod client;

pub use client::HttpClient;

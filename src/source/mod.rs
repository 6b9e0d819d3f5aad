//! Strategies for checking a library against its upstream source.
//!
//! - `github` - fetch each checked file from raw.githubusercontent.com
//! - `nuget` - download the package once and compare extracted entries

mod github;
mod nuget;

use anyhow::Result;
use async_trait::async_trait;

use crate::library::LibraryDescriptor;

pub use github::{DEFAULT_GITHUB_RAW_URL, GitHubRawVerifier};
pub use nuget::{DEFAULT_NUGET_URL, NugetPackageVerifier};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SourceVerifier: Send + Sync {
    /// Check every entry of the library's check list against the upstream copy.
    /// Stops at the first failure.
    async fn verify(&self, library: &LibraryDescriptor) -> Result<()>;
}

/// Join a base URL and path segments with single slashes.
pub(crate) fn join_url(base: &str, segments: &[&str]) -> String {
    let mut url = base.trim_end_matches('/').to_string();
    for segment in segments {
        url.push('/');
        url.push_str(segment.trim_start_matches('/'));
    }
    url
}

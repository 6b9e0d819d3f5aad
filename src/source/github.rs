//! GitHub raw-file verifier.

use anyhow::{Result, bail};
use async_trait::async_trait;
use log::{debug, info};
use std::sync::Arc;

use crate::compare::compare_local_to_remote_bytes;
use crate::http::HttpClient;
use crate::library::{LibraryDescriptor, RemoteSource, RepoId};
use crate::runtime::Runtime;

use super::{SourceVerifier, join_url};

pub const DEFAULT_GITHUB_RAW_URL: &str = "https://raw.githubusercontent.com";

/// Fetches every checked file individually from
/// `{raw_url}/{owner}/{repo}/{version}/{remote_path}`.
pub struct GitHubRawVerifier<R: Runtime> {
    runtime: Arc<R>,
    http_client: HttpClient,
    raw_url: String,
}

impl<R: Runtime> GitHubRawVerifier<R> {
    pub fn new(runtime: Arc<R>, http_client: HttpClient, raw_url: Option<String>) -> Self {
        Self {
            runtime,
            http_client,
            raw_url: raw_url.unwrap_or_else(|| DEFAULT_GITHUB_RAW_URL.to_string()),
        }
    }

    pub fn file_url(&self, repository: &RepoId, version: &str, remote_path: &str) -> String {
        join_url(
            &self.raw_url,
            &[repository.owner.as_str(), repository.repo.as_str(), version, remote_path],
        )
    }
}

#[async_trait]
impl<R: Runtime + 'static> SourceVerifier for GitHubRawVerifier<R> {
    #[tracing::instrument(
        level = "trace",
        skip(self, library),
        fields(library = %library.internal_name)
    )]
    async fn verify(&self, library: &LibraryDescriptor) -> Result<()> {
        let RemoteSource::GitHub { repository } = &library.source else {
            bail!("Library '{}' is not hosted on GitHub", library.internal_name);
        };
        debug!("Remote file location: {} ({})", library.source.kind(), repository);

        for entry in &library.check {
            info!("  File: {}", entry.local);
            let url = self.file_url(repository, &library.version, &entry.remote);
            let remote_bytes = self.http_client.get_bytes(&url).await?;
            compare_local_to_remote_bytes(
                self.runtime.as_ref(),
                &library.local_path(entry),
                &remote_bytes,
                &url,
            )?;
        }
        Ok(())
    }
}

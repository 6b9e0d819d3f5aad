//! NuGet package verifier.
//!
//! NuGet only serves whole packages, so the `.nupkg` (a zip archive) is
//! downloaded once per library and every checked entry is extracted from it.

use anyhow::{Context, Result, bail};
use async_trait::async_trait;
use log::{debug, info};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::{Builder, NamedTempFile, TempDir};

use crate::archive::ZipPackage;
use crate::compare::compare_local_files;
use crate::http::HttpClient;
use crate::library::{LibraryDescriptor, RemoteSource};
use crate::runtime::Runtime;

use super::{SourceVerifier, join_url};

pub const DEFAULT_NUGET_URL: &str = "https://www.nuget.org";

const TEMP_PREFIX: &str = "vendorcheck-";

pub struct NugetPackageVerifier<R: Runtime> {
    runtime: Arc<R>,
    http_client: HttpClient,
    base_url: String,
    temp_root: Option<PathBuf>,
}

impl<R: Runtime> NugetPackageVerifier<R> {
    pub fn new(runtime: Arc<R>, http_client: HttpClient, base_url: Option<String>) -> Self {
        Self {
            runtime,
            http_client,
            base_url: base_url.unwrap_or_else(|| DEFAULT_NUGET_URL.to_string()),
            temp_root: None,
        }
    }

    /// Create the downloaded package and extracted entries under `root`
    /// instead of the system temporary directory.
    pub fn with_temp_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.temp_root = Some(root.into());
        self
    }

    pub fn package_url(&self, package: &str, version: &str) -> String {
        join_url(&self.base_url, &["api/v2/package", package, version])
    }

    fn temp_dir(&self) -> Result<TempDir> {
        let mut builder = Builder::new();
        builder.prefix(TEMP_PREFIX);
        let dir = match &self.temp_root {
            Some(root) => builder.tempdir_in(root),
            None => builder.tempdir(),
        };
        dir.context("Failed to create temporary extraction directory")
    }

    fn temp_file(&self) -> Result<NamedTempFile> {
        let mut builder = Builder::new();
        builder.prefix(TEMP_PREFIX).suffix(".nupkg");
        let file = match &self.temp_root {
            Some(root) => builder.tempfile_in(root),
            None => builder.tempfile(),
        };
        file.context("Failed to create temporary package file")
    }

    fn check_entries(
        &self,
        library: &LibraryDescriptor,
        archive_path: &Path,
        extract_to: &Path,
        url: &str,
    ) -> Result<()> {
        let runtime = self.runtime.as_ref();
        let mut package = ZipPackage::open(runtime, archive_path, url)?;

        for entry in &library.check {
            info!("  File: {}", entry.local);
            let extracted = package.extract_entry(runtime, &entry.remote, extract_to)?;
            compare_local_files(runtime, &library.local_path(entry), &extracted)?;
        }
        Ok(())
    }
}

#[async_trait]
impl<R: Runtime + 'static> SourceVerifier for NugetPackageVerifier<R> {
    #[tracing::instrument(
        level = "trace",
        skip(self, library),
        fields(library = %library.internal_name)
    )]
    async fn verify(&self, library: &LibraryDescriptor) -> Result<()> {
        let RemoteSource::NuGet { package } = &library.source else {
            bail!("Library '{}' is not a NuGet package", library.internal_name);
        };
        debug!("Remote file location: {} ({})", library.source.kind(), package);

        let url = self.package_url(package, &library.version);

        // Both are removed when dropped, whichever way this function returns.
        let extract_dir = self.temp_dir()?;
        let archive_file = self.temp_file()?;
        debug!(
            "Using temporary package {:?} and extraction directory {:?}",
            archive_file.path(),
            extract_dir.path()
        );

        debug!("Retrieving remote file: {}", url);
        let archive_path = archive_file.path().to_path_buf();
        self.http_client
            .download_file(&url, || {
                self.runtime
                    .create_file(&archive_path)
                    .with_context(|| format!("Failed to create temporary file at {:?}", archive_path))
            })
            .await?;

        self.check_entries(library, &archive_path, extract_dir.path(), &url)
    }
}

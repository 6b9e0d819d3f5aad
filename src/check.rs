//! Runs every library through the verifier matching its remote source.

use anyhow::{Context, Result};
use log::{debug, info, warn};

use crate::config::Config;
use crate::error::CheckError;
use crate::library::{LibraryDescriptor, RemoteSource, load_all_libraries};
use crate::runtime::Runtime;
use crate::source::SourceVerifier;

pub struct Checker<G: SourceVerifier, N: SourceVerifier> {
    github: G,
    nuget: N,
}

impl<G: SourceVerifier, N: SourceVerifier> Checker<G, N> {
    pub fn new(github: G, nuget: N) -> Self {
        Self { github, nuget }
    }

    /// Verify a single library. A library without a remote source is a
    /// configuration error even when it has nothing to check.
    pub async fn check_library(&self, library: &LibraryDescriptor) -> Result<()> {
        info!("Library: {} ({})", library.name, library.version);

        let verifier: &dyn SourceVerifier = match &library.source {
            RemoteSource::GitHub { .. } => &self.github,
            RemoteSource::NuGet { .. } => &self.nuget,
            RemoteSource::Unknown => {
                return Err(CheckError::Configuration {
                    library: library.internal_name.clone(),
                }
                .into());
            }
        };

        // The NuGet package is still fetched so a wrong id or version fails.
        if library.check.is_empty() && matches!(library.source, RemoteSource::GitHub { .. }) {
            warn!(
                "Library '{}' has no [check] entries, nothing to verify",
                library.internal_name
            );
            return Ok(());
        }

        verifier.verify(library).await
    }

    /// Verify libraries in order, stopping at the first failure.
    #[tracing::instrument(level = "trace", skip(self, libraries))]
    pub async fn check_all(&self, libraries: &[LibraryDescriptor]) -> Result<()> {
        for library in libraries {
            self.check_library(library)
                .await
                .with_context(|| format!("Library '{}' failed verification", library.internal_name))?;
        }
        debug!("All {} library(s) match their upstream sources", libraries.len());
        Ok(())
    }
}

/// Load every descriptor under the configured libraries root, then verify them.
/// All descriptors are parsed before the first request is made.
#[tracing::instrument(level = "trace", skip(config))]
pub async fn run<R: Runtime + 'static>(config: Config<R>) -> Result<()> {
    let libraries = load_all_libraries(config.runtime.as_ref(), &config.libs_root)?;
    config.checker().check_all(&libraries).await
}

use anyhow::Result;
use log::debug;
use reqwest::Client;
use std::path::PathBuf;
use std::sync::Arc;

use crate::{
    check::Checker,
    http::HttpClient,
    runtime::Runtime,
    source::{GitHubRawVerifier, NugetPackageVerifier},
};

const USER_AGENT: &str = concat!("vendorcheck/", env!("CARGO_PKG_VERSION"));

pub struct Config<R: Runtime> {
    pub runtime: Arc<R>,
    pub http_client: HttpClient,
    pub libs_root: PathBuf,
    /// Overrides `https://raw.githubusercontent.com`.
    pub github_raw_url: Option<String>,
    /// Overrides `https://www.nuget.org`.
    pub nuget_url: Option<String>,
}

impl<R: Runtime + 'static> Config<R> {
    pub fn new(
        runtime: R,
        libs_root: PathBuf,
        github_raw_url: Option<String>,
        nuget_url: Option<String>,
    ) -> Result<Self> {
        let client = Client::builder().user_agent(USER_AGENT).build()?;
        debug!("Checking libraries under {:?}", libs_root);

        Ok(Self {
            runtime: Arc::new(runtime),
            http_client: HttpClient::new(client),
            libs_root,
            github_raw_url,
            nuget_url,
        })
    }

    pub fn checker(&self) -> Checker<GitHubRawVerifier<R>, NugetPackageVerifier<R>> {
        Checker::new(
            GitHubRawVerifier::new(
                Arc::clone(&self.runtime),
                self.http_client.clone(),
                self.github_raw_url.clone(),
            ),
            NugetPackageVerifier::new(
                Arc::clone(&self.runtime),
                self.http_client.clone(),
                self.nuget_url.clone(),
            ),
        )
    }
}

//! Vendored library descriptors.
//!
//! Each library lives in `<libs_root>/<internal_name>/` next to a `meta.txt`
//! descriptor naming its version, where the upstream copy lives, and which
//! files must match it.

mod descriptor;
mod discovery;

use anyhow::Result;
use log::debug;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::error::CheckError;
use crate::runtime::Runtime;

pub use descriptor::{Descriptor, Section, SyntaxError};
pub use discovery::{find_all_libraries, load_all_libraries};

pub const DESCRIPTOR_FILE: &str = "meta.txt";

/// GitHub repository identifier (`owner/repo`).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RepoId {
    pub owner: String,
    pub repo: String,
}

impl fmt::Display for RepoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.repo)
    }
}

impl FromStr for RepoId {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split('/').collect();
        if parts.len() != 2 || parts[0].is_empty() || parts[1].is_empty() {
            anyhow::bail!("Invalid repository format '{}'. Expected 'owner/repo'.", s)
        } else {
            Ok(RepoId {
                owner: parts[0].to_string(),
                repo: parts[1].to_string(),
            })
        }
    }
}

/// Where the upstream copy of a library's files is fetched from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteSource {
    GitHub { repository: RepoId },
    NuGet { package: String },
    Unknown,
}

impl RemoteSource {
    pub fn kind(&self) -> &'static str {
        match self {
            RemoteSource::GitHub { .. } => "GitHub",
            RemoteSource::NuGet { .. } => "NuGet",
            RemoteSource::Unknown => "unknown",
        }
    }
}

/// A vendored file and the path of its upstream counterpart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckEntry {
    /// Relative to the library's directory.
    pub local: String,
    /// Relative to the root of the remote artifact.
    pub remote: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LibraryDescriptor {
    pub internal_name: String,
    pub name: String,
    pub version: String,
    pub source: RemoteSource,
    pub check: Vec<CheckEntry>,
    /// Directory holding `meta.txt` and the vendored files.
    pub dir: PathBuf,
}

impl LibraryDescriptor {
    /// Build a descriptor from parsed `meta.txt` contents.
    ///
    /// `path` is only used to name the file in errors.
    pub fn from_descriptor(
        internal_name: &str,
        dir: &Path,
        path: &Path,
        desc: &Descriptor,
    ) -> Result<Self> {
        let meta = desc
            .section("meta")
            .ok_or_else(|| CheckError::parse(path, "missing [meta] section"))?;
        let required = |key: &str| -> Result<String> {
            meta.get(key)
                .map(str::to_string)
                .ok_or_else(|| CheckError::parse(path, format!("missing '{}' in [meta]", key)).into())
        };
        let name = required("name")?;
        let version = required("version")?;

        // GitHub is consulted first when both sections are present.
        let source = if let Some(github) = desc.section("github") {
            let repository = github
                .get("repository")
                .ok_or_else(|| CheckError::parse(path, "missing 'repository' in [github]"))?
                .parse::<RepoId>()
                .map_err(|e| CheckError::parse(path, e.to_string()))?;
            RemoteSource::GitHub { repository }
        } else if let Some(nuget) = desc.section("nuget") {
            let package = nuget
                .get("package")
                .filter(|p| !p.is_empty())
                .ok_or_else(|| CheckError::parse(path, "missing 'package' in [nuget]"))?;
            RemoteSource::NuGet {
                package: package.to_string(),
            }
        } else {
            RemoteSource::Unknown
        };

        let check = desc
            .section("check")
            .map(|s| {
                s.entries()
                    .iter()
                    .map(|(local, remote)| CheckEntry {
                        local: local.clone(),
                        remote: remote.clone(),
                    })
                    .collect()
            })
            .unwrap_or_default();

        Ok(LibraryDescriptor {
            internal_name: internal_name.to_string(),
            name,
            version,
            source,
            check,
            dir: dir.to_path_buf(),
        })
    }

    /// Absolute location of a vendored file.
    pub fn local_path(&self, entry: &CheckEntry) -> PathBuf {
        self.dir.join(&entry.local)
    }
}

/// Load `<libs_root>/<internal_name>/meta.txt`.
#[tracing::instrument(level = "trace", skip(runtime))]
pub fn load_library<R: Runtime>(
    runtime: &R,
    libs_root: &Path,
    internal_name: &str,
) -> Result<LibraryDescriptor> {
    let dir = libs_root.join(internal_name);
    let path = dir.join(DESCRIPTOR_FILE);
    debug!("Loading descriptor from {:?}", path);

    if !runtime.exists(&path) {
        return Err(CheckError::parse(&path, "descriptor file not found").into());
    }
    let content = runtime
        .read_to_string(&path)
        .map_err(|e| CheckError::parse(&path, format!("{:#}", e)))?;
    let desc = content
        .parse::<Descriptor>()
        .map_err(|e| CheckError::parse(&path, e.to_string()))?;

    LibraryDescriptor::from_descriptor(internal_name, &dir, &path, &desc)
}

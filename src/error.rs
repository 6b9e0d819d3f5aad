//! Failure kinds that abort a verification run.
//!
//! Each kind is raised as the root cause of an `anyhow::Error` so callers can
//! tell them apart with `downcast_ref::<CheckError>()`.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CheckError {
    /// `meta.txt` is missing, unreadable, or lacks a required key.
    #[error("Invalid descriptor {}: {reason}", .path.display())]
    DescriptorParse { path: PathBuf, reason: String },

    /// The descriptor has neither a `[github]` nor a `[nuget]` section.
    #[error(
        "Library '{library}' has no remote source: need to know the remote location of the files to check"
    )]
    Configuration { library: String },

    /// A request failed, returned a non-success status, or an archive entry is missing.
    #[error("Failed to fetch {url}: {reason}")]
    Fetch { url: String, reason: String },

    #[error("File mismatch: '{}' doesn't match '{remote}'", .local.display())]
    Mismatch { local: PathBuf, remote: String },
}

impl CheckError {
    pub(crate) fn parse(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        CheckError::DescriptorParse {
            path: path.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn fetch(url: impl Into<String>, reason: impl ToString) -> Self {
        CheckError::Fetch {
            url: url.into(),
            reason: reason.to_string(),
        }
    }
}

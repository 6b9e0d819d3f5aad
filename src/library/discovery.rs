use anyhow::{Context, Result};
use log::debug;
use std::path::Path;

use super::{LibraryDescriptor, load_library};
use crate::runtime::Runtime;

/// Find all vendored libraries under the libraries root.
///
/// Directory structure: `<root>/<library>/meta.txt`. Every subdirectory is a
/// library; plain files at the root are skipped. Names are sorted so runs
/// visit libraries in the same order.
#[tracing::instrument(level = "trace", skip(runtime, root))]
pub fn find_all_libraries<R: Runtime>(runtime: &R, root: &Path) -> Result<Vec<String>> {
    if !runtime.is_dir(root) {
        anyhow::bail!("Libraries directory {:?} does not exist", root);
    }

    let mut names = Vec::new();
    for path in runtime.read_dir(root)? {
        if !runtime.is_dir(&path) {
            debug!("Skipping non-directory entry {:?}", path);
            continue;
        }
        match path.file_name().and_then(|n| n.to_str()) {
            Some(name) => names.push(name.to_string()),
            None => debug!("Skipping entry with non UTF-8 name {:?}", path),
        }
    }

    names.sort();
    debug!("Found {} library(s)", names.len());
    Ok(names)
}

/// Load every library under `root`. The first bad descriptor aborts.
#[tracing::instrument(level = "trace", skip(runtime, root))]
pub fn load_all_libraries<R: Runtime>(runtime: &R, root: &Path) -> Result<Vec<LibraryDescriptor>> {
    find_all_libraries(runtime, root)?
        .iter()
        .map(|name| {
            load_library(runtime, root, name)
                .with_context(|| format!("Failed to load library '{}'", name))
        })
        .collect()
}

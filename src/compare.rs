//! Byte-exact comparison of vendored files against their upstream copies.
//!
//! No normalization happens: line endings and encodings must match exactly.

use anyhow::Result;
use log::debug;
use std::path::Path;

use crate::error::CheckError;
use crate::runtime::Runtime;

/// Compare a local file with bytes fetched from `remote_label` (usually a URL).
#[tracing::instrument(level = "trace", skip(runtime, remote_bytes))]
pub fn compare_local_to_remote_bytes<R: Runtime>(
    runtime: &R,
    local_path: &Path,
    remote_bytes: &[u8],
    remote_label: &str,
) -> Result<()> {
    let local_bytes = runtime.read(local_path)?;
    if local_bytes != remote_bytes {
        return Err(CheckError::Mismatch {
            local: local_path.to_path_buf(),
            remote: remote_label.to_string(),
        }
        .into());
    }
    debug!(
        "Local file '{}' matches remote file '{}'",
        local_path.display(),
        remote_label
    );
    Ok(())
}

/// Compare two local files, e.g. a vendored file and a freshly extracted archive entry.
#[tracing::instrument(level = "trace", skip(runtime))]
pub fn compare_local_files<R: Runtime>(runtime: &R, first: &Path, second: &Path) -> Result<()> {
    let first_bytes = runtime.read(first)?;
    let second_bytes = runtime.read(second)?;
    if first_bytes != second_bytes {
        return Err(CheckError::Mismatch {
            local: first.to_path_buf(),
            remote: second.display().to_string(),
        }
        .into());
    }
    debug!(
        "Local file '{}' matches local file '{}'",
        first.display(),
        second.display()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::{MockRuntime, RealRuntime};
    use mockall::predicate::eq;
    use std::fs;
    use std::path::PathBuf;
    use tempfile::tempdir;

    fn is_mismatch(err: &anyhow::Error) -> bool {
        matches!(
            err.downcast_ref::<CheckError>(),
            Some(CheckError::Mismatch { .. })
        )
    }

    #[test]
    fn test_remote_bytes_match() {
        let mut runtime = MockRuntime::new();
        runtime
            .expect_read()
            .with(eq(PathBuf::from("/libs/foo/src/foo.c")))
            .returning(|_| Ok(b"int x;".to_vec()));

        compare_local_to_remote_bytes(
            &runtime,
            Path::new("/libs/foo/src/foo.c"),
            b"int x;",
            "https://example.com/foo.c",
        )
        .unwrap();
    }

    #[test]
    fn test_remote_bytes_single_byte_differs() {
        let mut runtime = MockRuntime::new();
        runtime
            .expect_read()
            .returning(|_| Ok(b"int x;".to_vec()));

        let err = compare_local_to_remote_bytes(
            &runtime,
            Path::new("/libs/foo/src/foo.c"),
            b"int y;",
            "https://example.com/foo.c",
        )
        .unwrap_err();

        assert!(is_mismatch(&err));
        let msg = err.to_string();
        assert!(msg.contains("src/foo.c"));
        assert!(msg.contains("https://example.com/foo.c"));
    }

    #[test]
    fn test_line_endings_are_not_normalized() {
        let mut runtime = MockRuntime::new();
        runtime
            .expect_read()
            .returning(|_| Ok(b"line\r\n".to_vec()));

        let err = compare_local_to_remote_bytes(&runtime, Path::new("a.txt"), b"line\n", "remote")
            .unwrap_err();
        assert!(is_mismatch(&err));
    }

    #[test]
    fn test_truncated_local_file_mismatches() {
        let mut runtime = MockRuntime::new();
        runtime.expect_read().returning(|_| Ok(b"int".to_vec()));

        let err = compare_local_to_remote_bytes(&runtime, Path::new("a.c"), b"int x;", "remote")
            .unwrap_err();
        assert!(is_mismatch(&err));
    }

    #[test]
    fn test_missing_local_file_is_not_a_mismatch() {
        let dir = tempdir().unwrap();
        let err = compare_local_to_remote_bytes(
            &RealRuntime,
            &dir.path().join("absent.c"),
            b"int x;",
            "remote",
        )
        .unwrap_err();
        assert!(!is_mismatch(&err));
        assert!(err.to_string().contains("absent.c"));
    }

    #[test]
    fn test_local_files_match() {
        let dir = tempdir().unwrap();
        let first = dir.path().join("bar.dll");
        let second = dir.path().join("extracted.dll");
        fs::write(&first, [0u8, 1, 2, 255]).unwrap();
        fs::write(&second, [0u8, 1, 2, 255]).unwrap();

        compare_local_files(&RealRuntime, &first, &second).unwrap();
    }

    #[test]
    fn test_local_files_mismatch_names_both_paths() {
        let dir = tempdir().unwrap();
        let first = dir.path().join("bar.dll");
        let second = dir.path().join("extracted.dll");
        fs::write(&first, [0u8, 1, 2, 255]).unwrap();
        fs::write(&second, [0u8, 1, 3, 255]).unwrap();

        let err = compare_local_files(&RealRuntime, &first, &second).unwrap_err();
        assert!(is_mismatch(&err));
        let msg = err.to_string();
        assert!(msg.contains("bar.dll"));
        assert!(msg.contains("extracted.dll"));
    }
}

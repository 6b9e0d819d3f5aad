use anyhow::{Context, Result};
use log::debug;
use std::io::{Cursor, Read, Write};
use std::path::{Path, PathBuf};
use zip::ZipArchive;
use zip::result::ZipError;

use crate::error::CheckError;
use crate::runtime::Runtime;

/// A downloaded package archive from which individual entries are extracted.
pub struct ZipPackage {
    archive: ZipArchive<Cursor<Vec<u8>>>,
    /// Where the archive came from, used in error messages.
    origin: String,
}

impl ZipPackage {
    #[tracing::instrument(level = "trace", skip(runtime))]
    pub fn open<R: Runtime>(runtime: &R, archive_path: &Path, origin: &str) -> Result<Self> {
        let mut reader = runtime
            .open(archive_path)
            .with_context(|| format!("Failed to open archive at {:?}", archive_path))?;

        // ZipArchive needs Read + Seek
        let mut buffer = Vec::new();
        reader
            .read_to_end(&mut buffer)
            .with_context(|| format!("Failed to read archive {:?}", archive_path))?;

        let archive = ZipArchive::new(Cursor::new(buffer))
            .map_err(|e| CheckError::fetch(origin, format!("not a valid zip archive: {}", e)))?;
        debug!("Opened archive with {} entries", archive.len());

        Ok(Self {
            archive,
            origin: origin.to_string(),
        })
    }

    /// Extract the entry named `name` below `extract_to`, keeping its relative path.
    /// Returns the path of the extracted file.
    #[tracing::instrument(level = "trace", skip(self, runtime))]
    pub fn extract_entry<R: Runtime>(
        &mut self,
        runtime: &R,
        name: &str,
        extract_to: &Path,
    ) -> Result<PathBuf> {
        let mut entry = match self.archive.by_name(name) {
            Ok(entry) => entry,
            Err(ZipError::FileNotFound) => {
                return Err(CheckError::fetch(
                    &self.origin,
                    format!("entry '{}' not found in archive", name),
                )
                .into());
            }
            Err(e) => {
                return Err(CheckError::fetch(
                    &self.origin,
                    format!("failed to read entry '{}': {}", name, e),
                )
                .into());
            }
        };

        if entry.is_dir() {
            return Err(CheckError::fetch(
                &self.origin,
                format!("entry '{}' is a directory", name),
            )
            .into());
        }

        let relative = entry.enclosed_name().ok_or_else(|| {
            CheckError::fetch(
                &self.origin,
                format!("entry '{}' has an unsafe path", name),
            )
        })?;
        let full_path = extract_to.join(relative);

        if let Some(parent) = full_path.parent() {
            runtime.create_dir_all(parent)?;
        }
        let mut dest_file = runtime.create_file(&full_path)?;
        std::io::copy(&mut entry, &mut dest_file)
            .with_context(|| format!("Failed to extract file {:?}", full_path))?;
        dest_file
            .flush()
            .with_context(|| format!("Failed to flush {:?}", full_path))?;

        debug!("Extracted '{}' to {:?}", name, full_path);
        Ok(full_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::RealRuntime;
    use std::fs::{self, File};
    use std::io::Write;
    use tempfile::tempdir;
    use zip::CompressionMethod;
    use zip::ZipWriter;
    use zip::write::FileOptions;

    fn create_test_archive(path: &Path, files: &[(&str, &[u8])]) -> Result<()> {
        let file = File::create(path)?;
        let mut zip = ZipWriter::new(file);
        let options: FileOptions<()> =
            FileOptions::default().compression_method(CompressionMethod::Deflated);

        for (name, content) in files {
            zip.start_file(*name, options)?;
            zip.write_all(content)?;
        }

        zip.finish()?;
        Ok(())
    }

    fn fetch_reason(err: &anyhow::Error) -> String {
        match err.downcast_ref::<CheckError>() {
            Some(CheckError::Fetch { reason, .. }) => reason.clone(),
            other => panic!("Expected Fetch error, got {:?}", other),
        }
    }

    #[test]
    fn test_extract_nested_entry() -> Result<()> {
        let dir = tempdir()?;
        let archive_path = dir.path().join("bar.nupkg");
        let extract_path = dir.path().join("extracted");

        create_test_archive(
            &archive_path,
            &[
                ("lib/net45/bar.dll", b"\x4d\x5a\x90\x00".as_slice()),
                ("Bar.Pkg.nuspec", b"<package/>".as_slice()),
            ],
        )?;

        let mut package = ZipPackage::open(&RealRuntime, &archive_path, "test")?;

        let extracted = package.extract_entry(&RealRuntime, "lib/net45/bar.dll", &extract_path)?;
        assert_eq!(extracted, extract_path.join("lib/net45/bar.dll"));
        assert_eq!(fs::read(extracted)?, b"\x4d\x5a\x90\x00");

        // Only the requested entry is written
        assert!(!extract_path.join("Bar.Pkg.nuspec").exists());
        Ok(())
    }

    #[test]
    fn test_extract_missing_entry() -> Result<()> {
        let dir = tempdir()?;
        let archive_path = dir.path().join("bar.nupkg");
        create_test_archive(&archive_path, &[("lib/net45/bar.dll", b"x".as_slice())])?;

        let mut package = ZipPackage::open(&RealRuntime, &archive_path, "https://nuget/bar")?;
        let err = package
            .extract_entry(&RealRuntime, "lib/net46/bar.dll", dir.path())
            .unwrap_err();

        assert!(fetch_reason(&err).contains("'lib/net46/bar.dll' not found"));
        assert!(err.to_string().contains("https://nuget/bar"));
        Ok(())
    }

    #[test]
    fn test_entry_names_are_case_sensitive() -> Result<()> {
        let dir = tempdir()?;
        let archive_path = dir.path().join("pkg.zip");
        create_test_archive(&archive_path, &[("build/WebView2.h", b"x".as_slice())])?;

        let mut package = ZipPackage::open(&RealRuntime, &archive_path, "test")?;
        assert!(
            package
                .extract_entry(&RealRuntime, "build/webview2.h", dir.path())
                .is_err()
        );
        Ok(())
    }

    #[test]
    fn test_open_corrupted_archive() {
        let dir = tempdir().unwrap();
        let archive_path = dir.path().join("bar.nupkg");
        fs::write(&archive_path, "corrupted data").unwrap();

        let err = ZipPackage::open(&RealRuntime, &archive_path, "test")
            .err()
            .unwrap();
        assert!(fetch_reason(&err).contains("not a valid zip archive"));
    }

    #[test]
    fn test_open_nonexistent_archive() {
        let dir = tempdir().unwrap();
        let result = ZipPackage::open(&RealRuntime, &dir.path().join("nope.zip"), "test");
        assert!(result.is_err());
        assert!(
            result
                .err()
                .unwrap()
                .to_string()
                .contains("Failed to open archive")
        );
    }

    #[test]
    fn test_empty_archive() -> Result<()> {
        let dir = tempdir()?;
        let archive_path = dir.path().join("empty.zip");
        create_test_archive(&archive_path, &[])?;

        let mut package = ZipPackage::open(&RealRuntime, &archive_path, "test")?;
        let err = package
            .extract_entry(&RealRuntime, "lib/net45/bar.dll", dir.path())
            .unwrap_err();
        assert!(fetch_reason(&err).contains("not found"));
        Ok(())
    }
}

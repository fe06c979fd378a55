//! Package archive reader (component B).
//!
//! A package archive is a zip file with a `package.json` manifest at its
//! root describing, per framework moniker, the dependency group for that
//! framework; everything else in the archive is asset/content files
//! addressed by slash-separated path.

use crate::package::framework::FrameworkMoniker;
use crate::utils::split_entry_path;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::io::{Cursor, Read};
use std::path::Path;

#[derive(Debug, thiserror::Error)]
pub enum ArchiveError {
    #[error("not a valid package archive: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("package archive is missing its package.json manifest")]
    MissingManifest,

    #[error("package archive manifest is malformed: {0}")]
    Manifest(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("archive entry `{0}` not found")]
    EntryNotFound(String),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DependencyEntry {
    pub id: String,
    pub min_version: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Manifest {
    #[serde(default)]
    pub frameworks: IndexMap<String, Vec<DependencyEntry>>,
}

/// A read-only view over a package archive. Owns the in-memory zip stream
/// for the duration of extraction; dropping it (on every exit path,
/// including failure, since Rust runs destructors on unwind and on early
/// `?` returns alike) releases it.
pub struct PackageArchive {
    frameworks: IndexMap<FrameworkMoniker, Vec<(String, String)>>,
    entries: Vec<String>,
    zip: zip::ZipArchive<Cursor<Vec<u8>>>,
}

impl PackageArchive {
    /// Opens a package archive from its raw compressed bytes.
    pub fn open(bytes: Vec<u8>) -> Result<Self, ArchiveError> {
        let mut zip = zip::ZipArchive::new(Cursor::new(bytes))?;

        let manifest: Manifest = {
            let mut file = zip.by_name("package.json").map_err(|_| ArchiveError::MissingManifest)?;
            let mut contents = String::new();
            file.read_to_string(&mut contents)?;
            serde_json::from_str(&contents)?
        };

        let mut entries = Vec::with_capacity(zip.len());
        for i in 0..zip.len() {
            let entry = zip.by_index(i)?;
            if !entry.is_dir() {
                entries.push(entry.name().to_string());
            }
        }

        let frameworks = manifest
            .frameworks
            .into_iter()
            .map(|(moniker, deps)| {
                let deps = deps.into_iter().map(|d| (d.id, d.min_version)).collect();
                (FrameworkMoniker::new(moniker), deps)
            })
            .collect();

        Ok(Self { frameworks, entries, zip })
    }

    pub fn supported_frameworks(&self) -> Vec<FrameworkMoniker> {
        self.frameworks.keys().cloned().collect()
    }

    /// The dependency group declared for `framework`; empty if no such
    /// group exists.
    pub fn dependencies_for(&self, framework: &FrameworkMoniker) -> Vec<(String, String)> {
        self.frameworks.get(framework).cloned().unwrap_or_default()
    }

    /// Archive entry paths whose containing folder equals `prefix` exactly.
    pub fn files_under(&self, prefix: &str) -> Vec<String> {
        self.entries
            .iter()
            .filter(|path| split_entry_path(path).0 == prefix)
            .cloned()
            .collect()
    }

    /// Writes `entry_path`'s bytes to `destination`, creating intermediate
    /// directories as needed.
    pub fn extract(&mut self, entry_path: &str, destination: &Path) -> Result<(), ArchiveError> {
        let mut entry = self
            .zip
            .by_name(entry_path)
            .map_err(|_| ArchiveError::EntryNotFound(entry_path.to_string()))?;
        if let Some(parent) = destination.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let mut out = std::fs::File::create(destination)?;
        std::io::copy(&mut entry, &mut out)?;
        Ok(())
    }
}

#[cfg(feature = "project-util")]
pub mod fixtures {
    //! In-memory archive builder used only by tests/fixtures.
    use super::*;
    use std::io::Write;

    pub fn build_archive(manifest: &Manifest, files: &[(&str, &[u8])]) -> Vec<u8> {
        let cursor = Cursor::new(Vec::new());
        let mut writer = zip::ZipWriter::new(cursor);
        let options = zip::write::FileOptions::default().compression_method(zip::CompressionMethod::Stored);

        writer.start_file("package.json", options).expect("start package.json");
        let manifest_bytes = serde_json::to_vec(manifest).expect("serialize manifest");
        writer.write_all(&manifest_bytes).expect("write package.json");

        for (name, data) in files {
            writer.start_file(*name, options).expect("start entry");
            writer.write_all(data).expect("write entry");
        }

        writer.finish().expect("finish archive").into_inner()
    }
}

#[cfg(all(test, feature = "project-util"))]
mod tests {
    use super::fixtures::build_archive;
    use super::*;

    #[test]
    fn reads_frameworks_and_files() {
        let mut manifest = Manifest::default();
        manifest.frameworks.insert(
            "netstandard2.0".to_string(),
            vec![DependencyEntry { id: "Other.Pkg".into(), min_version: "1.0.0".into() }],
        );
        let bytes = build_archive(&manifest, &[("lib/netstandard2.0/Widgets.wasm", b"\0asm")]);

        let archive = PackageArchive::open(bytes).unwrap();
        let moniker = FrameworkMoniker::new("netstandard2.0");
        assert_eq!(archive.supported_frameworks(), vec![moniker.clone()]);
        assert_eq!(archive.dependencies_for(&moniker), vec![("Other.Pkg".to_string(), "1.0.0".to_string())]);
        assert_eq!(archive.files_under("lib/netstandard2.0"), vec!["lib/netstandard2.0/Widgets.wasm".to_string()]);
    }

    #[test]
    fn extract_writes_entry_bytes() {
        let manifest = Manifest::default();
        let bytes = build_archive(&manifest, &[("lib/netstandard2.0/Widgets.wasm", b"\0asm-body")]);
        let mut archive = PackageArchive::open(bytes).unwrap();

        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("Widgets.wasm");
        archive.extract("lib/netstandard2.0/Widgets.wasm", &dest).unwrap();

        assert_eq!(std::fs::read(&dest).unwrap(), b"\0asm-body");
    }
}

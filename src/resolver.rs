//! Reference set builder (component E) — the core of this crate.
//!
//! Maintains the growing ordered reference list and drives the depth-first,
//! pre-order, working-set-guarded walk of the package dependency graph.

use crate::assembly_ref::parse_local_reference;
use crate::coordinate::PackageCoordinate;
use crate::error::ScriptHostError;
use crate::package::{select_asset_folder, select_framework, PackageSource};
use crate::reference::{Reference, ReferenceSet};
use crate::registry::is_provided_by_runtime;
use crate::utils::split_entry_path;
use std::collections::HashSet;
use std::path::Path;

/// Builds the ordered, deduplicated reference list consumed by the compile
/// step.
#[derive(Default)]
pub struct ReferenceSetBuilder {
    refs: ReferenceSet,
    /// (lowercased id, lowercased version) coordinates currently being
    /// resolved on the active call stack — guards against re-entering a
    /// coordinate that is already in flight.
    in_progress: HashSet<(String, String)>,
    /// Lowercased ids that have already contributed references. Once a
    /// package id has been resolved, later encounters of the same id (any
    /// version, any framework) are treated as already satisfied: first
    /// occurrence wins.
    completed_ids: HashSet<String>,
}

impl ReferenceSetBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Normalizes and inserts user-supplied precompiled references.
    pub fn add_local_assemblies(&mut self, references: &[String]) {
        for raw in references {
            if let Reference::Path(path) = parse_local_reference(raw) {
                self.refs.insert_path(path);
            }
        }
    }

    /// Resolves and inserts each package's assets, recursing through
    /// dependencies. Fails fatally on the first unresolvable top-level
    /// coordinate.
    pub fn add_packages<S: PackageSource>(
        &mut self,
        coordinates: &[String],
        temp_path: &Path,
        source: &S,
    ) -> Result<(), ScriptHostError> {
        for raw in coordinates {
            if !self.resolve_coordinate(raw, temp_path, source)? {
                return Err(ScriptHostError::PackageUnresolvable {
                    coordinate: raw.clone(),
                    reason: "could not be fetched, parsed, or matched to a framework".to_string(),
                });
            }
        }
        Ok(())
    }

    pub fn build(self) -> Vec<Reference> {
        self.refs.into_vec()
    }

    /// Resolves a single coordinate string, returning whether it (and its
    /// transitive dependencies) were satisfied. Never returns `Err` on its
    /// own account — unresolvable coordinates are reported via `Ok(false)`
    /// so callers can retry with a different coordinate form (see §4.E
    /// step 4's pinned-then-unpinned retry).
    fn resolve_coordinate<S: PackageSource>(
        &mut self,
        raw: &str,
        temp_path: &Path,
        source: &S,
    ) -> Result<bool, ScriptHostError> {
        let Some(coordinate) = PackageCoordinate::parse(raw) else {
            tracing::debug!(raw, "malformed package coordinate");
            return Ok(false);
        };

        if coordinate.parsed_version().is_none() {
            tracing::trace!(coordinate = %coordinate, "package version is not a semantic version, matching it literally");
        }

        let id_key = coordinate.id.to_ascii_lowercase();
        if self.completed_ids.contains(&id_key) {
            tracing::trace!(id = %coordinate.id, "id already satisfied, skipping");
            return Ok(true);
        }

        let version_key = (id_key.clone(), coordinate.version.to_ascii_lowercase());
        if self.in_progress.contains(&version_key) {
            tracing::trace!(coordinate = %coordinate, "coordinate already in-flight, treating as satisfied");
            return Ok(true);
        }

        self.in_progress.insert(version_key.clone());
        let result = self.resolve_coordinate_inner(&coordinate, temp_path, source);
        self.in_progress.remove(&version_key);

        if matches!(result, Ok(true)) {
            self.completed_ids.insert(id_key);
        }
        result
    }

    fn resolve_coordinate_inner<S: PackageSource>(
        &mut self,
        coordinate: &PackageCoordinate,
        temp_path: &Path,
        source: &S,
    ) -> Result<bool, ScriptHostError> {
        let mut archive = match source.fetch(&coordinate.id, &coordinate.version) {
            Ok(Some(archive)) => archive,
            Ok(None) => {
                tracing::debug!(coordinate = %coordinate, "package not found at source");
                return Ok(false);
            }
            Err(err) => {
                tracing::warn!(coordinate = %coordinate, error = %err, "package fetch failed");
                return Ok(false);
            }
        };

        let Some(framework) = select_framework(&archive, coordinate.framework()) else {
            tracing::debug!(coordinate = %coordinate, "no matching framework in archive");
            return Ok(false);
        };

        // Pre-order: this package's own assets are inserted before its
        // dependencies' assets, at every level of the walk (Testable
        // Property 5; see DESIGN.md for why this differs from the §4.E
        // step numbering).
        if let Some(asset_folder) = select_asset_folder(&archive, &framework) {
            for entry in archive.files_under(&asset_folder) {
                let (_, leaf) = split_entry_path(&entry);
                if is_non_binary_leaf(leaf) {
                    continue;
                }
                if !leaf.to_ascii_lowercase().ends_with(".wasm") {
                    continue;
                }

                if is_provided_by_runtime(leaf) {
                    self.refs.insert_runtime(leaf.to_string());
                    continue;
                }

                let destination = temp_path.join(leaf);
                if !destination.exists() {
                    archive.extract(&entry, &destination)?;
                }
                self.refs.insert_path(destination);
            }
        }

        for (dep_id, dep_min_version) in archive.dependencies_for(&framework) {
            let pinned = format!("{dep_id},{dep_min_version},{}", framework.as_str());
            if !self.resolve_coordinate(&pinned, temp_path, source)? {
                let unpinned = format!("{dep_id},{dep_min_version}");
                if !self.resolve_coordinate(&unpinned, temp_path, source)? {
                    tracing::debug!(dep_id, dep_min_version, "dependency unresolvable in either form");
                    return Ok(false);
                }
            }
        }

        Ok(true)
    }
}

/// `_._`, `.xml`, and `.targets` entries (case-insensitive) are non-binary
/// marker/metadata files and are never extracted.
fn is_non_binary_leaf(leaf: &str) -> bool {
    let lower = leaf.to_ascii_lowercase();
    lower == "_._" || lower.ends_with(".xml") || lower.ends_with(".targets")
}

#[cfg(all(test, feature = "project-util"))]
mod tests {
    use super::*;
    use crate::package::{FetchError, PackageArchive};
    use std::cell::RefCell;
    use std::collections::HashMap;

    /// An in-memory [`PackageSource`] for tests: archives are built on
    /// demand from a table of `(id, version) -> bytes`, and fetches are
    /// counted so tests can assert on first-wins/in-flight behavior.
    struct FakeSource {
        archives: HashMap<(String, String), Vec<u8>>,
        fetch_counts: RefCell<HashMap<(String, String), u32>>,
    }

    impl FakeSource {
        fn new() -> Self {
            Self { archives: HashMap::new(), fetch_counts: RefCell::new(HashMap::new()) }
        }

        fn with_archive(mut self, id: &str, version: &str, bytes: Vec<u8>) -> Self {
            self.archives.insert((id.to_string(), version.to_string()), bytes);
            self
        }

        fn fetch_count(&self, id: &str, version: &str) -> u32 {
            *self.fetch_counts.borrow().get(&(id.to_string(), version.to_string())).unwrap_or(&0)
        }
    }

    impl PackageSource for FakeSource {
        fn fetch(&self, id: &str, version: &str) -> Result<Option<PackageArchive>, FetchError> {
            let key = (id.to_string(), version.to_string());
            *self.fetch_counts.borrow_mut().entry(key.clone()).or_default() += 1;
            match self.archives.get(&key) {
                Some(bytes) => {
                    let archive = PackageArchive::open(bytes.clone()).map_err(FetchError::from)?;
                    Ok(Some(archive))
                }
                None => Ok(None),
            }
        }
    }

    fn simple_archive(asset_name: &str, deps: Vec<(&str, &str)>) -> Vec<u8> {
        use crate::package::archive::fixtures::build_archive;
        use crate::package::archive::{DependencyEntry, Manifest};
        let mut manifest = Manifest::default();
        manifest.frameworks.insert(
            "netstandard2.0".to_string(),
            deps.into_iter()
                .map(|(id, v)| DependencyEntry { id: id.to_string(), min_version: v.to_string() })
                .collect(),
        );
        build_archive(&manifest, &[(&format!("lib/netstandard2.0/{asset_name}"), b"\0asm")])
    }

    #[test]
    fn resolves_transitive_dependency_in_pre_order() {
        let source = FakeSource::new()
            .with_archive("Root", "1.0", simple_archive("Root.wasm", vec![("Dep", "1.0")]))
            .with_archive("Dep", "1.0", simple_archive("Dep.wasm", vec![]));

        let dir = tempfile::tempdir().unwrap();
        let mut builder = ReferenceSetBuilder::new();
        builder.add_packages(&["Root,1.0,netstandard2.0".to_string()], dir.path(), &source).unwrap();

        let names: Vec<_> = builder
            .build()
            .into_iter()
            .map(|r| match r {
                Reference::Path(p) => p.file_name().unwrap().to_string_lossy().to_string(),
                Reference::RuntimeProvided(n) => n,
            })
            .collect();

        assert_eq!(names, vec!["Root.wasm", "Dep.wasm"]);
    }

    #[test]
    fn unresolvable_top_level_coordinate_is_fatal() {
        let source = FakeSource::new();
        let dir = tempfile::tempdir().unwrap();
        let mut builder = ReferenceSetBuilder::new();
        let err = builder.add_packages(&["Missing,1.0".to_string()], dir.path(), &source).unwrap_err();
        assert!(matches!(err, ScriptHostError::PackageUnresolvable { .. }));
    }

    #[test]
    fn malformed_coordinate_is_unresolvable() {
        let source = FakeSource::new();
        let dir = tempfile::tempdir().unwrap();
        let mut builder = ReferenceSetBuilder::new();
        let err = builder.add_packages(&["OnlyOneField".to_string()], dir.path(), &source).unwrap_err();
        assert!(matches!(err, ScriptHostError::PackageUnresolvable { .. }));
    }

    #[test]
    fn first_occurrence_of_an_id_wins_and_is_not_refetched() {
        let source = FakeSource::new()
            .with_archive("Root", "1.0", simple_archive("Root.wasm", vec![("Shared", "1.0")]))
            .with_archive("Other", "1.0", simple_archive("Other.wasm", vec![("Shared", "2.0")]))
            .with_archive("Shared", "1.0", simple_archive("Shared.wasm", vec![]));

        let dir = tempfile::tempdir().unwrap();
        let mut builder = ReferenceSetBuilder::new();
        builder
            .add_packages(
                &["Root,1.0,netstandard2.0".to_string(), "Other,1.0,netstandard2.0".to_string()],
                dir.path(),
                &source,
            )
            .unwrap();

        // Shared,2.0 is never fetched because Shared,1.0 (pulled in by Root)
        // already satisfied the `Shared` id.
        assert_eq!(source.fetch_count("Shared", "2.0"), 0);
        assert_eq!(source.fetch_count("Shared", "1.0"), 1);
    }

    #[test]
    fn runtime_provided_entries_are_not_extracted() {
        let source = FakeSource::new().with_archive(
            "Root",
            "1.0",
            simple_archive("env.wasm", vec![]),
        );

        let dir = tempfile::tempdir().unwrap();
        let mut builder = ReferenceSetBuilder::new();
        builder.add_packages(&["Root,1.0,netstandard2.0".to_string()], dir.path(), &source).unwrap();

        assert!(!dir.path().join("env.wasm").exists());
        let refs = builder.build();
        assert!(matches!(refs.as_slice(), [Reference::RuntimeProvided(name)] if name == "env.wasm"));
    }
}

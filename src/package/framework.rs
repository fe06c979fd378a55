//! Framework monikers and selection (component D).

use super::PackageArchive;
use serde::{Deserialize, Serialize};
use std::fmt;

/// An opaque token identifying an ABI/stdlib profile a package asset folder
/// targets. Equality is plain string equality against the monikers an
/// archive declares; [`Self::short_folder_name`] derives the archive-internal
/// folder suffix used to locate assets.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FrameworkMoniker(pub String);

impl FrameworkMoniker {
    pub fn new(moniker: impl Into<String>) -> Self {
        Self(moniker.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The folder-safe short name used under `lib/` and `build/`, e.g.
    /// `.NETStandard,Version=v2.0` -> `netstandardversionv2.0`. Real
    /// deployments seed a proper moniker -> short-name table for their
    /// platform; this crate's defaults just fold to a safe lowercase
    /// alphanumeric-and-dot slug.
    pub fn short_folder_name(&self) -> String {
        self.0
            .chars()
            .filter(|c| c.is_ascii_alphanumeric() || *c == '.')
            .map(|c| c.to_ascii_lowercase())
            .collect()
    }
}

impl fmt::Display for FrameworkMoniker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Selects the best asset subfolder's framework for a requested moniker:
///
/// 1. If the caller supplied a non-empty framework, return the first archive
///    framework that string-equals it.
/// 2. Otherwise, return the first archive framework in declared order.
/// 3. If no frameworks are declared, fail (`None`).
pub fn select_framework(archive: &PackageArchive, requested: Option<&str>) -> Option<FrameworkMoniker> {
    let frameworks = archive.supported_frameworks();
    match requested.filter(|f| !f.is_empty()) {
        Some(req) => frameworks.iter().find(|f| f.as_str() == req).cloned(),
        None => frameworks.first().cloned(),
    }
}

/// Locates the asset folder for a selected framework inside an archive:
/// `lib/<short>` if non-empty, else `build/<short>`, else `None` (the
/// package contributes no assets; its dependencies are still processed).
pub fn select_asset_folder(archive: &PackageArchive, framework: &FrameworkMoniker) -> Option<String> {
    let short = framework.short_folder_name();

    let lib = format!("lib/{short}");
    if !archive.files_under(&lib).is_empty() {
        return Some(lib);
    }

    let build = format!("build/{short}");
    if !archive.files_under(&build).is_empty() {
        return Some(build);
    }

    None
}

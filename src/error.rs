//! Crate-wide error type.
//!
//! Mirrors the split the rest of the crate relies on: argument preconditions
//! and package-resolution failures are raised as [`ScriptHostError`];
//! compiler diagnostics are data and never appear here (see
//! [`crate::result::CompilationResult`]).

use crate::package::{ArchiveError, FetchError};

pub type Result<T, E = ScriptHostError> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum ScriptHostError {
    /// Raised when `source` is empty.
    #[error("`source` must not be empty")]
    MissingSource,

    /// A top-level package reference could not be fetched, parsed, or matched
    /// to a framework.
    #[error("package reference `{coordinate}` could not be resolved: {reason}")]
    PackageUnresolvable { coordinate: String, reason: String },

    #[error(transparent)]
    Archive(#[from] ArchiveError),

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// The loader raised while materializing emitted bytes into a module.
    /// Propagated unchanged, never downgraded to a diagnostic.
    #[error("failed to load compiled module: {0}")]
    Load(#[source] Box<dyn std::error::Error + Send + Sync>),
}

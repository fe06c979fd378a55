//! Small internal helpers shared across modules.

use std::future::Future;

/// Drives a future to completion from a synchronous call site, using a
/// handle to an already-running Tokio runtime if one is available on this
/// thread, or spinning up a throwaway multi-thread runtime otherwise.
///
/// This exists so that [`crate::package::fetcher::PackageFetcher`] can use
/// `reqwest`'s async client (required by its `rustls-tls` feature stack)
/// while presenting a blocking call to [`crate::resolver::ReferenceSetBuilder`],
/// the same way `compilers::solc::version_manager::install` drives
/// `svm::install` to completion without exposing a `Future` to its caller.
pub(crate) enum RuntimeOrHandle {
    Handle(tokio::runtime::Handle),
    Runtime(tokio::runtime::Runtime),
}

impl RuntimeOrHandle {
    pub(crate) fn new() -> Self {
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => Self::Handle(handle),
            Err(_) => Self::Runtime(
                tokio::runtime::Builder::new_multi_thread()
                    .enable_all()
                    .build()
                    .expect("failed to start a fallback tokio runtime"),
            ),
        }
    }

    pub(crate) fn block_on<F: Future>(&self, future: F) -> F::Output {
        match self {
            Self::Handle(handle) => tokio::task::block_in_place(|| handle.block_on(future)),
            Self::Runtime(rt) => rt.block_on(future),
        }
    }
}

/// Splits a slash-separated archive entry path into `(parent_folder, leaf_name)`.
///
/// Archive entries always use `/` regardless of host platform, per the
/// package archive contract.
pub(crate) fn split_entry_path(entry_path: &str) -> (&str, &str) {
    match entry_path.rsplit_once('/') {
        Some((parent, leaf)) => (parent, leaf),
        None => ("", entry_path),
    }
}

//! Host-runtime asset registry (component A).
//!
//! A static, process-lifetime set of module file names assumed to be
//! supplied by the host wasm embedding already — the WASI shim modules most
//! runtimes bundle — so the reference builder never re-extracts or
//! re-references them.

use once_cell::sync::Lazy;
use std::collections::HashSet;

/// Seeded from the module names a typical WASI-capable embedding provides
/// out of the box. Real deployments seed this from their own host's
/// canonical manifest; this list is this crate's default.
static HOST_RUNTIME_MODULES: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "env.wasm",
        "wasi_snapshot_preview1.wasm",
        "wasi_snapshot_preview2.wasm",
        "wasi_unstable.wasm",
    ]
    .into_iter()
    .collect()
});

/// Returns `true` if `filename` (matched case-insensitively, bare file name
/// only) is assumed to be already loaded by the host runtime.
pub fn is_provided_by_runtime(filename: &str) -> bool {
    let lower = filename.to_ascii_lowercase();
    HOST_RUNTIME_MODULES.contains(lower.as_str())
}

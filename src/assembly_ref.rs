//! Normalizes caller-supplied precompiled-module reference strings into
//! file-path references (component F).

use crate::reference::Reference;
use std::path::PathBuf;

/// Normalizes a single caller-supplied reference string:
///
/// - If it contains a comma, it is treated as a strong-name-like token (e.g.
///   `"Widgets.Core, Version=1.0.0.0, Culture=neutral, PublicKeyToken=null"`);
///   the substring before the first comma becomes the module name and
///   `.wasm` is appended.
/// - Otherwise it is treated as a filesystem path and used verbatim.
pub fn parse_local_reference(raw: &str) -> Reference {
    match raw.find(',') {
        Some(idx) => Reference::Path(PathBuf::from(format!("{}.wasm", &raw[..idx]))),
        None => Reference::Path(PathBuf::from(raw)),
    }
}

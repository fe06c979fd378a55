//! Collaborator traits for the compile/emit/load step (component G's
//! external collaborators) and the diagnostic data model (component H).

#[cfg(feature = "wasm-backend")]
pub mod wasm;

use crate::reference::Reference;
use auto_impl::auto_impl;
use serde::{Deserialize, Serialize};
use std::fmt;
use yansi::{Color, Paint};

/// An opaque parsed representation of the caller's source, produced by
/// [`LanguageFrontend::parse`] and consumed by [`LanguageFrontend::compile`].
#[derive(Debug, Clone)]
pub struct SyntaxUnit {
    pub(crate) source: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Hidden,
    Info,
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Hidden => "hidden",
            Self::Info => "info",
            Self::Warning => "warning",
            Self::Error => "error",
        };
        f.write_str(s)
    }
}

impl Severity {
    /// The color used to format this severity at a terminal.
    pub const fn color(&self) -> Color {
        match self {
            Self::Hidden => Color::White,
            Self::Info => Color::Blue,
            Self::Warning => Color::Yellow,
            Self::Error => Color::Red,
        }
    }
}

/// A location within the compiled source, if the frontend can report one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceSpan {
    pub line: u32,
    pub column: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Diagnostic {
    pub severity: Severity,
    /// Whether this diagnostic has been elevated to an error regardless of
    /// its nominal severity.
    pub warning_as_error: bool,
    pub message: String,
    pub location: Option<SourceSpan>,
}

impl Diagnostic {
    pub fn error(message: impl Into<String>) -> Self {
        Self { severity: Severity::Error, warning_as_error: false, message: message.into(), location: None }
    }

    /// Errors are the subset where severity is `Error` or the
    /// warning-as-error flag is set.
    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error || self.warning_as_error
    }
}

/// Tests the same criterion as [`Diagnostic::is_error`] over a whole
/// sequence.
pub fn has_errors(diagnostics: &[Diagnostic]) -> bool {
    diagnostics.iter().any(Diagnostic::is_error)
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if Paint::is_enabled() {
            let style = self.severity.color().style().bold();
            style.fmt_prefix(f)?;
            write!(f, "{}", self.severity)?;
            style.fmt_suffix(f)?;
        } else {
            write!(f, "{}", self.severity)?;
        }

        if let Some(loc) = &self.location {
            write!(f, " at {}:{}", loc.line, loc.column)?;
        }
        write!(f, ": {}", self.message)
    }
}

/// Options threaded into [`LanguageFrontend::compile`].
#[derive(Debug, Clone)]
pub struct CompileOptions {
    /// Analogous to naming a compilation unit `ScriptAssembly<N>`: a unique,
    /// process-monotonic name for this compile call.
    pub unit_name: String,
}

/// The host-language compiler library, abstracted to its contract surface.
/// Out of scope for this crate's core logic beyond this seam — see
/// [`wasm::WatFrontend`] for the default concrete implementation.
#[auto_impl(&, Box, Arc)]
pub trait LanguageFrontend: Send + Sync {
    fn parse(&self, source: &str) -> Result<SyntaxUnit, crate::error::ScriptHostError>;

    /// Compiles a parsed unit against the accumulated reference list,
    /// returning the full diagnostic sequence and, on success, the emitted
    /// module bytes.
    fn compile(
        &self,
        unit: &SyntaxUnit,
        references: &[Reference],
        options: &CompileOptions,
    ) -> (Vec<Diagnostic>, Option<Vec<u8>>);
}

/// The isolation loader, abstracted to its contract surface: materialize
/// module bytes into a callable module within a host-chosen scope. Out of
/// scope for this crate's core logic beyond this seam — see
/// [`wasm::WasmerLoader`] for the default concrete implementation.
///
/// Unlike [`LanguageFrontend`], this trait carries associated types, so it
/// is not blanket-implemented for `&L`/`Box<L>`/`Arc<L>` via `auto_impl`.
pub trait ModuleLoader: Send + Sync {
    /// A loaded, callable module. Outlives the compile call; owned by the
    /// caller once returned.
    type Handle;
    /// The pluggable isolation scope this loader materializes modules into.
    type Scope;

    fn load(
        &self,
        bytes: &[u8],
        references: &[Reference],
        scope: Option<&Self::Scope>,
    ) -> Result<Self::Handle, Box<dyn std::error::Error + Send + Sync>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn diagnostic_display_includes_severity_location_and_message() {
        let diagnostic = Diagnostic {
            severity: Severity::Warning,
            warning_as_error: false,
            message: "unused import".to_string(),
            location: Some(SourceSpan { line: 3, column: 1 }),
        };
        yansi::Paint::disable();
        let rendered = diagnostic.to_string();
        yansi::Paint::enable();
        assert_eq!(rendered, "warning at 3:1: unused import");
    }

    #[test]
    fn has_errors_counts_warning_as_error_elevated_diagnostics() {
        let elevated = Diagnostic {
            severity: Severity::Warning,
            warning_as_error: true,
            message: "treated as fatal".to_string(),
            location: None,
        };
        assert!(has_errors(&[elevated]));
    }
}

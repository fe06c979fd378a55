//! Compile & emit driver (component G) and the primary entry point.

use crate::compiler::{has_errors, CompileOptions, LanguageFrontend, ModuleLoader};
use crate::error::{Result, ScriptHostError};
use crate::package::PackageFetcher;
use crate::resolver::ReferenceSetBuilder;
use crate::result::CompilationResult;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};

#[cfg(feature = "wasm-backend")]
use crate::compiler::wasm::{WasmerLoader, WatFrontend};

/// Process-wide monotonic counter backing each compile call's unit name
/// (`ScriptAssembly<N>` in the original design's terms). A counter is used
/// instead of a wall-clock timestamp so unit names stay deterministic and
/// collision-free within a process without depending on system time.
static UNIT_COUNTER: AtomicU64 = AtomicU64::new(0);

fn next_unit_name() -> String {
    format!("ScriptAssembly{}", UNIT_COUNTER.fetch_add(1, Ordering::Relaxed))
}

/// All inputs to [`ScriptHost::compile_script_to_memory`].
pub struct CompileRequest<'a> {
    pub source: &'a str,
    pub referenced_assemblies: &'a [String],
    pub package_references: &'a [String],
    pub temp_path: Option<&'a Path>,
    pub package_source_url: Option<&'a str>,
}

impl<'a> CompileRequest<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            referenced_assemblies: &[],
            package_references: &[],
            temp_path: None,
            package_source_url: None,
        }
    }

    pub fn with_referenced_assemblies(mut self, refs: &'a [String]) -> Self {
        self.referenced_assemblies = refs;
        self
    }

    pub fn with_package_references(mut self, refs: &'a [String]) -> Self {
        self.package_references = refs;
        self
    }

    pub fn with_temp_path(mut self, path: &'a Path) -> Self {
        self.temp_path = Some(path);
        self
    }

    pub fn with_package_source_url(mut self, url: &'a str) -> Self {
        self.package_source_url = Some(url);
        self
    }
}

/// Compiles a single string of source code into an in-memory executable
/// module, resolving both locally supplied precompiled module references
/// and external package references, then loads the result into a
/// host-chosen isolation scope.
///
/// Generic over the compiler frontend and the isolation loader, mirroring
/// how `Project<C: Compiler, T: ArtifactOutput>` lets callers swap compiler
/// backends in the teacher crate this one is grounded on.
pub struct ScriptHost<F, L> {
    frontend: F,
    loader: L,
}

impl<F, L> ScriptHost<F, L>
where
    F: LanguageFrontend,
    L: ModuleLoader,
{
    pub fn new(frontend: F, loader: L) -> Self {
        Self { frontend, loader }
    }

    /// `LoadScriptToMemory`'s Rust-idiomatic name: compiles `request.source`,
    /// resolving `referenced_assemblies` and the transitive closure of
    /// `package_references`, and loads the emitted bytes into `scope` (or
    /// the loader's default scope).
    ///
    /// Blocking: returns only once the module is loaded or the compilation
    /// has failed. Package resolution may use the network internally but
    /// never exposes a `Future`/poll surface here.
    pub fn compile_script_to_memory(
        &self,
        request: CompileRequest<'_>,
        scope: Option<&L::Scope>,
    ) -> Result<CompilationResult<L::Handle>> {
        if request.source.is_empty() {
            return Err(ScriptHostError::MissingSource);
        }

        let mut builder = ReferenceSetBuilder::new();
        builder.add_local_assemblies(request.referenced_assemblies);

        if !request.package_references.is_empty() {
            let temp_path = match request.temp_path {
                Some(path) => path.to_path_buf(),
                None => std::env::temp_dir(),
            };
            std::fs::create_dir_all(&temp_path)?;

            let fetcher = PackageFetcher::new(request.package_source_url)?;
            builder.add_packages(request.package_references, &temp_path, &fetcher)?;
        }

        let references = builder.build();

        let unit = self.frontend.parse(request.source)?;
        let options = CompileOptions { unit_name: next_unit_name() };
        let (diagnostics, bytes) = self.frontend.compile(&unit, &references, &options);

        if bytes.is_none() || has_errors(&diagnostics) {
            return Ok(CompilationResult::failed(diagnostics));
        }

        let handle = self
            .loader
            .load(&bytes.expect("checked above"), &references, scope)
            .map_err(ScriptHostError::Load)?;

        Ok(CompilationResult::succeeded(diagnostics, handle))
    }
}

#[cfg(feature = "wasm-backend")]
impl Default for ScriptHost<WatFrontend, WasmerLoader> {
    fn default() -> Self {
        Self::new(WatFrontend, WasmerLoader)
    }
}

/// The default `wat` + `wasmer` script host.
#[cfg(feature = "wasm-backend")]
pub type DefaultScriptHost = ScriptHost<WatFrontend, WasmerLoader>;

#[cfg(feature = "wasm-backend")]
pub use crate::compiler::wasm::IsolationScope as DefaultIsolationScope;

#![doc = include_str!("../README.md")]
#![warn(rustdoc::all)]
#![cfg_attr(not(test), warn(unused_crate_dependencies))]
#![deny(unused_must_use, rust_2018_idioms)]

#[macro_use]
extern crate tracing;

pub mod error;
pub use error::{Result, ScriptHostError};

mod assembly_ref;
pub mod compiler;
pub use compiler::{CompileOptions, Diagnostic, Severity, SourceSpan};

mod compile;
pub use compile::{CompileRequest, ScriptHost};
#[cfg(feature = "wasm-backend")]
pub use compile::{DefaultIsolationScope, DefaultScriptHost};

pub mod coordinate;
pub use coordinate::PackageCoordinate;

pub mod package;

pub mod reference;
pub use reference::{Reference, ReferenceSet};

pub mod registration;
pub use registration::ServiceRegistry;

pub mod registry;

pub mod resolver;
pub use resolver::ReferenceSetBuilder;

pub mod result;
pub use result::CompilationResult;

mod utils;

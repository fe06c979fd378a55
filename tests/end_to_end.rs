//! Scenario tests exercising the full compile/resolve/load pipeline through
//! the real `wat` + `wasmer` backend. No network access: every scenario
//! either supplies no package references or points at a package source
//! whose host rejects the placeholder default registry, so only the
//! reference-free and local-assembly paths are driven end to end here.

use wasm_script_host::{CompileRequest, DefaultScriptHost};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init()
        .ok();
}

#[test]
fn compiles_and_invokes_a_self_contained_module() {
    init_tracing();
    let host = DefaultScriptHost::default();
    let request = CompileRequest::new(
        "(module (func (export \"answer\") (result i32) i32.const 42))",
    );

    let result = host.compile_script_to_memory(request, None).unwrap();

    assert!(result.success, "diagnostics: {:?}", result.diagnostics);
    let mut handle = result.module;
    let handle = handle.as_mut().expect("successful compile carries a module");
    let outputs = handle.invoke("answer", &[]).unwrap();
    assert_eq!(outputs.len(), 1);
    assert_eq!(outputs[0].unwrap_i32(), 42);
}

#[test]
fn syntax_error_yields_a_failed_result_with_no_module() {
    init_tracing();
    let host = DefaultScriptHost::default();
    let request = CompileRequest::new("(module (func $broken");

    let result = host.compile_script_to_memory(request, None).unwrap();

    assert!(!result.success);
    assert!(result.errors().count() > 0);
}

#[test]
fn empty_source_is_rejected_before_any_compilation_is_attempted() {
    init_tracing();
    let host = DefaultScriptHost::default();
    let request = CompileRequest::new("");

    let err = host.compile_script_to_memory(request, None).unwrap_err();
    assert!(matches!(err, wasm_script_host::ScriptHostError::MissingSource));
}

#[test]
fn local_module_reference_is_linked_and_callable_through_its_namespace() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    let dep_path = dir.path().join("Dep.wasm");
    let dep_bytes = wat::parse_str("(module (func (export \"value\") (result i32) i32.const 7))").unwrap();
    std::fs::write(&dep_path, dep_bytes).unwrap();

    let referenced = vec![dep_path.to_string_lossy().to_string()];
    let host = DefaultScriptHost::default();
    let request = CompileRequest::new(
        "(module (import \"Dep\" \"value\" (func $value (result i32))) \
         (func (export \"doubled\") (result i32) call $value i32.const 2 i32.mul))",
    )
    .with_referenced_assemblies(&referenced);

    let result = host.compile_script_to_memory(request, None).unwrap();

    assert!(result.success, "diagnostics: {:?}", result.diagnostics);
    let mut handle = result.module;
    let handle = handle.as_mut().unwrap();
    let outputs = handle.invoke("doubled", &[]).unwrap();
    assert_eq!(outputs[0].unwrap_i32(), 14);
}

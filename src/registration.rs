//! Service registration surface: a thin adapter binding the script-host
//! capability into a caller's dependency-injection container under
//! singleton lifetime. Carries no core logic.

/// A minimal dependency-injection container surface: register a singleton
/// instance under its concrete type.
pub trait ServiceRegistry {
    fn register_singleton<T: 'static + Send + Sync>(&mut self, instance: T);
}

/// Registers the default `wat` + `wasmer` script host as a singleton.
#[cfg(feature = "wasm-backend")]
pub fn register_script_host<R: ServiceRegistry>(registry: &mut R) {
    use crate::compile::DefaultScriptHost;
    registry.register_singleton(DefaultScriptHost::default());
}

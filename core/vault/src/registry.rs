//! Backend registry for resolving vault backends by name.
//!
//! An explicit compile-time registry: backend names map to factory
//! functions, and unknown names fail with a typed configuration error
//! instead of a runtime load failure.

use std::collections::HashMap;

use crate::backend::Vault;
use crate::file::FileVault;
use crate::null::NullVault;
use keyfold_common::{Error, Result};

/// Factory function type for creating backends.
pub type BackendFactory = Box<dyn Fn() -> Box<dyn Vault> + Send + Sync>;

/// Namespace that unqualified backend names resolve against:
/// `file` and `keyfold.file` name the same backend.
pub const DEFAULT_NAMESPACE: &str = "keyfold";

/// Registry of vault backend factories.
///
/// Allows registration and resolution of storage backends by name.
pub struct BackendRegistry {
    factories: HashMap<String, BackendFactory>,
}

impl BackendRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self {
            factories: HashMap::new(),
        }
    }

    /// Register a backend factory under an unqualified name.
    ///
    /// # Preconditions
    /// - `name` must be unique within the registry
    ///
    /// # Errors
    /// - Configuration error if the name is already registered
    pub fn register(&mut self, name: impl Into<String>, factory: BackendFactory) -> Result<()> {
        let name = name.into();
        if self.factories.contains_key(&name) {
            return Err(Error::Config(format!(
                "Backend '{}' is already registered",
                name
            )));
        }
        self.factories.insert(name, factory);
        Ok(())
    }

    /// Resolve a backend by name and instantiate it.
    ///
    /// Unqualified names are looked up directly; names qualified with
    /// the default namespace (`keyfold.<name>`) are accepted and
    /// stripped. Any other qualifier is unknown.
    ///
    /// # Errors
    /// - Configuration error for an unregistered or non-conforming name
    pub fn resolve(&self, name: &str) -> Result<Box<dyn Vault>> {
        let unqualified = name
            .strip_prefix(DEFAULT_NAMESPACE)
            .and_then(|rest| rest.strip_prefix('.'))
            .unwrap_or(name);

        let factory = self.factories.get(unqualified).ok_or_else(|| {
            Error::Config(format!("Backend '{}' is not registered", name))
        })?;
        Ok(factory())
    }

    /// Names of all registered backends.
    pub fn backends(&self) -> Vec<String> {
        self.factories.keys().cloned().collect()
    }

    /// Check whether a backend is registered.
    pub fn has_backend(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }
}

impl Default for BackendRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Create a registry with the built-in backends.
pub fn create_default_registry() -> BackendRegistry {
    let mut registry = BackendRegistry::new();

    registry
        .register("file", Box::new(|| Box::new(FileVault::new())))
        .expect("Failed to register file backend");

    registry
        .register("null", Box::new(|| Box::new(NullVault::new())))
        .expect("Failed to register null backend");

    registry
}

//! Name to native-function table consulted when parsing function calls.

use crate::builtins;
use crate::error::{InvokeError, RegistryError};
use crate::function::Function;
use crate::value::Value;
use once_cell::sync::{Lazy, OnceCell};
use regex::Regex;
use std::collections::HashMap;
use tracing::debug;

static NAME_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-z][a-zA-Z0-9_]*$").unwrap_or_else(|e| panic!("invalid name pattern: {e}"))
});

static GLOBAL: OnceCell<Registry> = OnceCell::new();

/// Function table. Populated during startup, read-only afterwards.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    functions: HashMap<String, Function>,
}

impl Registry {
    /// An empty registry. Operators will not parse until their functions
    /// are registered.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding the built-in library.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        builtins::install(&mut registry);
        registry
    }

    pub fn try_register(&mut self, function: Function) -> Result<(), RegistryError> {
        let name = function.name();
        if name.is_empty() {
            return Err(RegistryError::Unnamed);
        }
        if !NAME_PATTERN.is_match(name) {
            return Err(RegistryError::InvalidName(name.to_string()));
        }
        if self.functions.contains_key(name) {
            return Err(RegistryError::Duplicate(name.to_string()));
        }
        debug!(function = name, signature = ?function.signature(), "registered function");
        self.functions.insert(name.to_string(), function);
        Ok(())
    }

    /// Registers `function`.
    ///
    /// # Panics
    ///
    /// If the name is empty, invalid or already taken. Registration is a
    /// startup step and a bad table is a programming error.
    pub fn register(&mut self, function: Function) -> &mut Self {
        if let Err(e) = self.try_register(function) {
            panic!("{e}");
        }
        self
    }

    pub fn resolve(&self, name: &str) -> Result<Function, RegistryError> {
        self.functions
            .get(name)
            .cloned()
            .ok_or_else(|| RegistryError::NotFound(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.functions.contains_key(name)
    }

    pub fn invoke(&self, function: &Function, args: Vec<Value>) -> Result<Vec<Value>, InvokeError> {
        function.invoke(args)
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.functions.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn get(&self, name: &str) -> Option<&Function> {
        self.functions.get(name)
    }
}

/// Installs the process-wide registry used by [`crate::parse`].
///
/// Fails if a registry is already installed or [`global`] was already used.
pub fn install(registry: Registry) -> Result<(), RegistryError> {
    GLOBAL
        .set(registry)
        .map_err(|_| RegistryError::AlreadyInstalled)
}

/// The process-wide registry, defaulting to [`Registry::with_builtins`].
pub fn global() -> &'static Registry {
    GLOBAL.get_or_init(Registry::with_builtins)
}

//! The built-in function library.

pub mod collections;
pub mod core;
pub mod numbers;
pub mod strings;

use crate::function::Function;
use crate::registry::Registry;

/// Every built-in function.
pub fn all_functions() -> Vec<Function> {
    let mut functions = Vec::new();
    functions.extend(core::functions());
    functions.extend(numbers::functions());
    functions.extend(strings::functions());
    functions.extend(collections::functions());
    functions
}

/// Registers every built-in function in `registry`.
///
/// # Panics
///
/// If `registry` already holds a function with a built-in's name.
pub fn install(registry: &mut Registry) {
    for function in all_functions() {
        registry.register(function);
    }
}

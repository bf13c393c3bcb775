/// Built-in Tools
///
/// Tool implementations registered with the in-process provider. Each
/// module exports a `register` function called during startup.

pub mod echo;

use crate::core::provider::ToolRegistry;

/// Build the registry with every built-in tool registered.
pub fn build_registry() -> ToolRegistry {
    let mut registry = ToolRegistry::new();
    echo::register(&mut registry);
    registry
}

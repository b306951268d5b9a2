//! Admonition type registry.

/// Built-in admonition types.
pub mod defaults;
/// Registry type definitions.
pub mod types;

pub use defaults::{DEFAULT_ADMONITION_NAMES, default_admonition_types, shared_default_registry};
pub use types::{AdmonitionType, TypeRegistry};

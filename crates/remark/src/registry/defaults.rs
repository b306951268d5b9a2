//! Built-in admonition types.
//!
//! The default registry is built once per process and shared; rewriters that
//! are not given their own types hold a clone of the same `Arc`.

use super::types::{AdmonitionType, TypeRegistry};
use once_cell::sync::Lazy;
use std::sync::Arc;

/// Directive names registered by default.
pub const DEFAULT_ADMONITION_NAMES: [&str; 10] = [
    "admonition",
    "attention",
    "caution",
    "danger",
    "error",
    "hint",
    "important",
    "note",
    "tip",
    "warning",
];

static DEFAULT_REGISTRY: Lazy<Arc<TypeRegistry>> = Lazy::new(|| Arc::new(default_admonition_types()));

/// Builds the default registry: each name labeled with its capitalized form,
/// no element or property overrides.
///
/// # Example
///
/// ```
/// use blogmark_remark::registry::default_admonition_types;
///
/// let registry = default_admonition_types();
/// assert_eq!(
///     registry.get("note").and_then(|t| t.default_label.as_deref()),
///     Some("Note")
/// );
/// ```
pub fn default_admonition_types() -> TypeRegistry {
    DEFAULT_ADMONITION_NAMES
        .iter()
        .map(|name| (*name, AdmonitionType::labeled(capitalize(name))))
        .collect()
}

/// The process-wide default registry.
pub fn shared_default_registry() -> Arc<TypeRegistry> {
    Arc::clone(&DEFAULT_REGISTRY)
}

fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

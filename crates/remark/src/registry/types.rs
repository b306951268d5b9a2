//! Registry type definitions for admonition directives.

use blogmark_core::{Properties, PropertyValue};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Rendering rule for one admonition directive name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdmonitionType {
    /// Label shown when the author gives none.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_label: Option<String>,
    /// Output element override (falls back to the rewriter default).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub element: Option<String>,
    /// Output attributes, merged over the rewriter's default properties.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub properties: Properties,
}

impl AdmonitionType {
    /// A type with only a default label.
    pub fn labeled(label: impl Into<String>) -> Self {
        Self {
            default_label: Some(label.into()),
            ..Default::default()
        }
    }

    /// Sets the output element.
    pub fn with_element(mut self, element: impl Into<String>) -> Self {
        self.element = Some(element.into());
        self
    }

    /// Adds one output attribute.
    pub fn with_property(mut self, name: impl Into<String>, value: impl Into<PropertyValue>) -> Self {
        self.properties.insert(name.into(), value.into());
        self
    }
}

/// Directive name to [`AdmonitionType`] mapping.
///
/// Built up front and never mutated once handed to a rewriter; share it
/// through `Arc` across threads. Lookups are exact and case-sensitive.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TypeRegistry {
    types: BTreeMap<String, AdmonitionType>,
}

impl TypeRegistry {
    /// An empty registry; every directive passes through untouched.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds (or replaces) a type, consuming the registry.
    pub fn with_type(mut self, name: impl Into<String>, admonition: AdmonitionType) -> Self {
        self.types.insert(name.into(), admonition);
        self
    }

    /// Looks up a directive name.
    pub fn get(&self, name: &str) -> Option<&AdmonitionType> {
        self.types.get(name)
    }

    /// Check if a directive name is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.types.contains_key(name)
    }

    /// Registered names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.types.keys().map(String::as_str)
    }

    /// Number of registered types.
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// True when nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

impl From<BTreeMap<String, AdmonitionType>> for TypeRegistry {
    fn from(types: BTreeMap<String, AdmonitionType>) -> Self {
        Self { types }
    }
}

impl<K: Into<String>> FromIterator<(K, AdmonitionType)> for TypeRegistry {
    fn from_iter<I: IntoIterator<Item = (K, AdmonitionType)>>(iter: I) -> Self {
        Self {
            types: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}

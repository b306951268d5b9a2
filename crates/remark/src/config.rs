//! Serde configuration for the rewriter and the processor.
//!
//! Every field is optional so a config file only names what it changes:
//!
//! ```yaml
//! admonitions:
//!   defaultElement: aside
//!   defaultProperties:
//!     class: admonition
//!   types:
//!     note: { defaultLabel: Note }
//! parse:
//!   math: false
//! html:
//!   headingAutolinks: false
//! ```

use crate::registry::AdmonitionType;
use crate::renderer::RenderOptions;
use blogmark_core::{ParseOptions, Properties};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

/// Errors emitted while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// JSON failed to parse or did not match the schema.
    #[error("Invalid JSON config: {0}")]
    Json(#[from] serde_json::Error),
    /// YAML failed to parse or did not match the schema.
    #[error("Invalid YAML config: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Options for [`DirectiveBlockRewriter`](crate::DirectiveBlockRewriter).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct RewriterConfig {
    /// Element used when a type names none (`div` when unset).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_element: Option<String>,
    /// Lowest-priority output attributes for every recognized directive.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub default_properties: Properties,
    /// Replaces the built-in registry when set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub types: Option<BTreeMap<String, AdmonitionType>>,
}

impl RewriterConfig {
    /// Parse from a JSON string.
    pub fn from_json_str(input: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(input)?)
    }

    /// Parse from a YAML string.
    pub fn from_yaml_str(input: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(input)?)
    }
}

/// Parser switches; unset fields keep the blog defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ParseFlags {
    /// GitHub Flavored Markdown.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gfm: Option<bool>,
    /// YAML frontmatter.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frontmatter: Option<bool>,
    /// `$` / `$$` math.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub math: Option<bool>,
    /// Container directives.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub directives: Option<bool>,
    /// Raw HTML passthrough.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_html: Option<bool>,
}

impl ParseFlags {
    /// Applies the flags over [`ParseOptions::markdown`].
    pub fn to_options(&self) -> ParseOptions {
        let defaults = ParseOptions::markdown();
        ParseOptions {
            gfm: self.gfm.unwrap_or(defaults.gfm),
            frontmatter: self.frontmatter.unwrap_or(defaults.frontmatter),
            math: self.math.unwrap_or(defaults.math),
            directives: self.directives.unwrap_or(defaults.directives),
            raw_html: self.raw_html.unwrap_or(defaults.raw_html),
        }
    }
}

/// HTML stage switches; every unset field is on.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct HtmlFlags {
    /// Render directives no transform claimed as elements named after them.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub directive_elements: Option<bool>,
    /// Give headings slug ids.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub heading_ids: Option<bool>,
    /// Wrap heading content in a link to its id. Needs `headingIds`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub heading_autolinks: Option<bool>,
    /// Append the `$`-delimited source to math output.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub math_copy_text: Option<bool>,
}

impl HtmlFlags {
    /// Whether unclaimed directives get `hName = name`.
    pub fn directive_elements(&self) -> bool {
        self.directive_elements.unwrap_or(true)
    }

    /// Whether headings get ids.
    pub fn heading_ids(&self) -> bool {
        self.heading_ids.unwrap_or(true)
    }

    /// Whether headings link to themselves.
    pub fn heading_autolinks(&self) -> bool {
        self.heading_autolinks.unwrap_or(true)
    }

    /// Renderer options derived from the flags.
    pub fn render_options(&self) -> RenderOptions {
        RenderOptions {
            math_copy_text: self.math_copy_text.unwrap_or(true),
        }
    }
}

/// Full pipeline configuration for a [`Processor`](crate::Processor).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ProcessorConfig {
    /// Parser switches.
    #[serde(default)]
    pub parse: ParseFlags,
    /// Admonition rewriting.
    #[serde(default)]
    pub admonitions: RewriterConfig,
    /// HTML stage.
    #[serde(default)]
    pub html: HtmlFlags,
}

impl ProcessorConfig {
    /// Parse from a JSON string.
    pub fn from_json_str(input: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(input)?)
    }

    /// Parse from a YAML string.
    pub fn from_yaml_str(input: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(input)?)
    }
}

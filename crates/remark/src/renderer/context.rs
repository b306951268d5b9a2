//! Rendering context for the HTML emitter.

use blogmark_core::{Properties, PropertyValue};

/// Switches for the HTML emitter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderOptions {
    /// Append an `<mjx-copytext>` element holding the `$`-delimited source to
    /// every math node.
    pub math_copy_text: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            math_copy_text: true,
        }
    }
}

/// Output buffer with escaping helpers.
#[derive(Debug, Default)]
pub struct Context {
    out: String,
    options: RenderOptions,
}

impl Context {
    /// Creates an empty context with default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty context.
    pub fn with_options(options: RenderOptions) -> Self {
        Self {
            out: String::new(),
            options,
        }
    }

    /// Options in effect.
    pub fn options(&self) -> &RenderOptions {
        &self.options
    }

    /// Appends markup verbatim.
    pub fn push_raw(&mut self, html: &str) {
        self.out.push_str(html);
    }

    /// Appends escaped text content.
    pub fn push_text(&mut self, text: &str) {
        html_escape::encode_text_to_string(text, &mut self.out);
    }

    /// Appends ` name="value"` with the value escaped.
    pub fn push_attr(&mut self, name: &str, value: &str) {
        self.out.push(' ');
        self.out.push_str(name);
        self.out.push_str("=\"");
        html_escape::encode_double_quoted_attribute_to_string(value, &mut self.out);
        self.out.push('"');
    }

    /// Appends every property in key order.
    ///
    /// `true` renders as a bare attribute, `false` is omitted, lists are
    /// space-joined. Names that are not valid attribute names are dropped.
    pub fn push_properties(&mut self, properties: &Properties) {
        for (name, value) in properties {
            if !is_valid_attribute_name(name) {
                log::warn!("Dropping invalid attribute name {:?}", name);
                continue;
            }
            match value {
                PropertyValue::Bool(true) => {
                    self.out.push(' ');
                    self.out.push_str(name);
                }
                PropertyValue::Bool(false) => {}
                PropertyValue::Text(text) => self.push_attr(name, text),
                PropertyValue::List(items) => self.push_attr(name, &items.join(" ")),
            }
        }
    }

    /// Consumes the context, returning the HTML.
    pub fn finish(self) -> String {
        self.out
    }
}

fn is_valid_attribute_name(name: &str) -> bool {
    !name.is_empty()
        && name.chars().all(|c| {
            !c.is_whitespace() && !c.is_control() && !matches!(c, '"' | '\'' | '>' | '/' | '=' | '<')
        })
}

//! Directive-to-admonition rewriting.
//!
//! A registered container directive such as
//!
//! ```text
//! :::note[Careful]
//! Body
//! :::
//! ```
//!
//! keeps its place in the tree but gains `hName`/`hProperties` for the HTML
//! stage, and its children are normalized to `[label, ...content]`. Directives
//! whose name is not registered are left exactly as parsed.

use std::sync::Arc;

use blogmark_core::{
    AstTransform, BlogmarkError, ContainerDirective, Node, Properties, PropertyValue, visit_mut,
};

use crate::config::RewriterConfig;
use crate::registry::{AdmonitionType, TypeRegistry, shared_default_registry};

/// Attribute naming the directive on every rewritten block. Always set last.
pub const ADMONITION_ATTRIBUTE: &str = "data-admonition";

/// Element used when neither the type nor the config names one.
pub const DEFAULT_ELEMENT: &str = "div";

/// Counts from one [`DirectiveBlockRewriter::rewrite`] call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RewriteSummary {
    /// Directives rewritten into admonitions.
    pub rewritten: usize,
    /// Directives left untouched because their name is not registered.
    pub skipped: usize,
}

/// Rewrites registered container directives into labeled admonition blocks.
///
/// Configuration is fixed at construction. The registry sits behind an `Arc`
/// and is only read, so one rewriter can serve many threads at once.
#[derive(Debug, Clone)]
pub struct DirectiveBlockRewriter {
    default_element: String,
    default_properties: Properties,
    types: Arc<TypeRegistry>,
}

impl Default for DirectiveBlockRewriter {
    fn default() -> Self {
        Self::new()
    }
}

impl DirectiveBlockRewriter {
    /// `div` elements, no default properties, built-in types.
    pub fn new() -> Self {
        Self {
            default_element: DEFAULT_ELEMENT.to_string(),
            default_properties: Properties::new(),
            types: shared_default_registry(),
        }
    }

    /// Builds a rewriter from deserialized options.
    pub fn from_config(config: &RewriterConfig) -> Self {
        let mut rewriter = Self::new().with_default_properties(config.default_properties.clone());
        if let Some(element) = &config.default_element {
            rewriter = rewriter.with_default_element(element.clone());
        }
        if let Some(types) = &config.types {
            rewriter = rewriter.with_types(TypeRegistry::from(types.clone()));
        }
        rewriter
    }

    /// Sets the fallback output element.
    pub fn with_default_element(mut self, element: impl Into<String>) -> Self {
        self.default_element = element.into();
        self
    }

    /// Sets the lowest-priority output attributes.
    pub fn with_default_properties(mut self, properties: Properties) -> Self {
        self.default_properties = properties;
        self
    }

    /// Replaces the type registry.
    pub fn with_types(mut self, types: impl Into<Arc<TypeRegistry>>) -> Self {
        self.types = types.into();
        self
    }

    /// The registry in use.
    pub fn types(&self) -> &TypeRegistry {
        &self.types
    }

    /// The fallback output element.
    pub fn default_element(&self) -> &str {
        &self.default_element
    }

    /// Rewrites every registered directive in `tree`, at any depth, pre-order.
    ///
    /// Fails with [`BlogmarkError::MalformedTree`] on a directive with an empty
    /// name. Directives visited before the failing one stay rewritten.
    pub fn rewrite(&self, tree: &mut Node) -> Result<RewriteSummary, BlogmarkError> {
        let mut summary = RewriteSummary::default();
        visit_mut(tree, &mut |node: &mut Node| {
            if let Node::ContainerDirective(directive) = node {
                if directive.name.trim().is_empty() {
                    return Err(BlogmarkError::malformed(
                        "containerDirective node has an empty name",
                    ));
                }
                if self.rewrite_directive(directive) {
                    summary.rewritten += 1;
                } else {
                    summary.skipped += 1;
                }
            }
            Ok(())
        })?;
        log::debug!(
            "admonitions: rewrote {}, skipped {}",
            summary.rewritten,
            summary.skipped
        );
        Ok(summary)
    }

    /// Rewrites one directive node in place. Returns false when the name is not
    /// registered, in which case the node is untouched.
    pub fn rewrite_directive(&self, directive: &mut ContainerDirective) -> bool {
        let Some(admonition) = self.types.get(&directive.name) else {
            log::debug!("leaving unregistered directive ':::{}' as is", directive.name);
            return false;
        };

        let mut content = std::mem::take(&mut directive.children)
            .into_iter()
            .peekable();
        let label = content
            .next_if(Node::is_directive_label)
            .unwrap_or_else(|| default_label(&directive.name, admonition));

        directive.data.h_name = Some(
            admonition
                .element
                .clone()
                .unwrap_or_else(|| self.default_element.clone()),
        );
        directive.data.h_properties = Some(self.properties_for(&directive.name, admonition));
        directive.children = std::iter::once(label).chain(content).collect();
        true
    }

    /// Default properties, then type properties, then the reserved attribute.
    fn properties_for(&self, name: &str, admonition: &AdmonitionType) -> Properties {
        let mut properties = self.default_properties.clone();
        properties.extend(
            admonition
                .properties
                .iter()
                .map(|(key, value)| (key.clone(), value.clone())),
        );
        properties.insert(
            ADMONITION_ATTRIBUTE.to_string(),
            PropertyValue::Text(name.to_string()),
        );
        properties
    }
}

/// Synthesized label paragraph. It carries the label marker so that a second
/// rewrite pass picks it up instead of adding another one.
fn default_label(name: &str, admonition: &AdmonitionType) -> Node {
    let text = match &admonition.default_label {
        Some(label) => label.clone(),
        None => {
            log::debug!("':::{}' has no default label; using an empty one", name);
            String::new()
        }
    };
    Node::label(vec![Node::text(text)])
}

impl AstTransform for DirectiveBlockRewriter {
    fn transform(&self, root: &mut Node) -> Result<(), BlogmarkError> {
        self.rewrite(root).map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn para(text: &str) -> Node {
        Node::paragraph(vec![Node::text(text)])
    }

    fn props(pairs: &[(&str, &str)]) -> Properties {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), PropertyValue::from(*v)))
            .collect()
    }

    fn only_directive(tree: &Node) -> &ContainerDirective {
        match &tree.children().unwrap()[0] {
            Node::ContainerDirective(directive) => directive,
            other => panic!("expected directive, got {}", other.kind()),
        }
    }

    #[test]
    fn synthesizes_default_label() {
        let mut tree = Node::root(vec![Node::directive("note", vec![para("body")])]);
        let summary = DirectiveBlockRewriter::new().rewrite(&mut tree).unwrap();
        assert_eq!(summary, RewriteSummary { rewritten: 1, skipped: 0 });

        let directive = only_directive(&tree);
        assert_eq!(
            directive.children,
            vec![Node::label(vec![Node::text("Note")]), para("body")]
        );
        assert_eq!(directive.data.h_name.as_deref(), Some("div"));
        assert_eq!(
            directive.data.h_properties,
            Some(props(&[("data-admonition", "note")]))
        );
    }

    #[test]
    fn extracts_explicit_label() {
        let label = Node::label(vec![Node::text("Custom")]);
        let mut tree = Node::root(vec![Node::directive(
            "tip",
            vec![label.clone(), para("a"), para("b")],
        )]);
        DirectiveBlockRewriter::new().rewrite(&mut tree).unwrap();

        let directive = only_directive(&tree);
        assert_eq!(directive.children, vec![label, para("a"), para("b")]);
    }

    #[test]
    fn unlabeled_first_paragraph_is_content() {
        let mut tree = Node::root(vec![Node::directive("tip", vec![para("first")])]);
        DirectiveBlockRewriter::new().rewrite(&mut tree).unwrap();
        let directive = only_directive(&tree);
        assert_eq!(directive.children.len(), 2);
        assert_eq!(directive.children[0].text_content(), "Tip");
        assert_eq!(directive.children[1], para("first"));
    }

    #[test]
    fn property_precedence() {
        let types = TypeRegistry::new().with_type(
            "custom",
            AdmonitionType::labeled("Custom")
                .with_property("class", "y")
                .with_property("data-foo", "z"),
        );
        let rewriter = DirectiveBlockRewriter::new()
            .with_default_properties(props(&[("class", "x")]))
            .with_types(types);
        let mut tree = Node::root(vec![Node::directive("custom", vec![])]);
        rewriter.rewrite(&mut tree).unwrap();

        assert_eq!(
            only_directive(&tree).data.h_properties,
            Some(props(&[
                ("class", "y"),
                ("data-foo", "z"),
                ("data-admonition", "custom")
            ]))
        );
    }

    #[test]
    fn reserved_attribute_cannot_be_overridden() {
        let types = TypeRegistry::new().with_type(
            "note",
            AdmonitionType::labeled("Note").with_property(ADMONITION_ATTRIBUTE, "other"),
        );
        let rewriter = DirectiveBlockRewriter::new()
            .with_default_properties(props(&[(ADMONITION_ATTRIBUTE, "default")]))
            .with_types(types);
        let mut tree = Node::root(vec![Node::directive("note", vec![])]);
        rewriter.rewrite(&mut tree).unwrap();

        let properties = only_directive(&tree).data.h_properties.clone().unwrap();
        assert_eq!(properties[ADMONITION_ATTRIBUTE], PropertyValue::from("note"));
    }

    #[test]
    fn element_resolution() {
        let types = TypeRegistry::new()
            .with_type("quote", AdmonitionType::labeled("Quote").with_element("aside"))
            .with_type("plain", AdmonitionType::labeled("Plain"));
        let rewriter = DirectiveBlockRewriter::new()
            .with_default_element("section")
            .with_types(types);
        let mut tree = Node::root(vec![
            Node::directive("quote", vec![]),
            Node::directive("plain", vec![]),
        ]);
        rewriter.rewrite(&mut tree).unwrap();

        let names: Vec<_> = tree
            .children()
            .unwrap()
            .iter()
            .map(|node| match node {
                Node::ContainerDirective(d) => d.data.h_name.clone(),
                _ => None,
            })
            .collect();
        assert_eq!(names, vec![Some("aside".to_string()), Some("section".to_string())]);
    }

    #[test]
    fn unknown_directive_passes_through() {
        let original = Node::root(vec![Node::directive("spoiler", vec![Node::text("hi")])]);
        let mut tree = original.clone();
        let summary = DirectiveBlockRewriter::new()
            .with_types(TypeRegistry::new())
            .rewrite(&mut tree)
            .unwrap();
        assert_eq!(tree, original);
        assert_eq!(summary, RewriteSummary { rewritten: 0, skipped: 1 });
    }

    #[test]
    fn nested_directives_rewrite_like_top_level_ones() {
        let directive = Node::directive("warning", vec![para("deep")]);
        let mut top = Node::root(vec![directive.clone()]);
        let mut nested = Node::root(vec![Node::Blockquote(blogmark_core::tree::Parent {
            children: vec![Node::List(blogmark_core::tree::List {
                children: vec![Node::ListItem(blogmark_core::tree::ListItem {
                    children: vec![directive],
                    ..Default::default()
                })],
                ..Default::default()
            })],
        })]);

        let rewriter = DirectiveBlockRewriter::new();
        rewriter.rewrite(&mut top).unwrap();
        rewriter.rewrite(&mut nested).unwrap();

        let mut found = None;
        blogmark_core::visit(&nested, &mut |node| {
            if let Node::ContainerDirective(d) = node {
                found = Some(d.clone());
            }
        });
        assert_eq!(found.as_ref(), Some(only_directive(&top)));
    }

    #[test]
    fn directive_inside_directive_is_rewritten_too() {
        let inner = Node::directive("tip", vec![para("inner")]);
        let mut tree = Node::root(vec![Node::directive("note", vec![inner])]);
        let summary = DirectiveBlockRewriter::new().rewrite(&mut tree).unwrap();
        assert_eq!(summary.rewritten, 2);

        let outer = only_directive(&tree);
        let Node::ContainerDirective(inner) = &outer.children[1] else {
            panic!("expected nested directive after the label");
        };
        assert_eq!(inner.children[0].text_content(), "Tip");
    }

    #[test]
    fn empty_directive_still_gets_label() {
        let mut tree = Node::root(vec![Node::directive("danger", vec![])]);
        DirectiveBlockRewriter::new().rewrite(&mut tree).unwrap();
        assert_eq!(
            only_directive(&tree).children,
            vec![Node::label(vec![Node::text("Danger")])]
        );
    }

    #[test]
    fn missing_default_label_becomes_empty_text() {
        let rewriter = DirectiveBlockRewriter::new()
            .with_types(TypeRegistry::new().with_type("bare", AdmonitionType::default()));
        let mut tree = Node::root(vec![Node::directive("bare", vec![para("x")])]);
        rewriter.rewrite(&mut tree).unwrap();
        assert_eq!(only_directive(&tree).children[0], Node::label(vec![Node::text("")]));
    }

    #[test]
    fn second_pass_is_a_no_op() {
        let mut tree = Node::root(vec![
            Node::directive("note", vec![para("body")]),
            Node::directive("tip", vec![Node::label(vec![Node::text("Mine")])]),
        ]);
        let rewriter = DirectiveBlockRewriter::new();
        rewriter.rewrite(&mut tree).unwrap();
        let once = tree.clone();
        rewriter.rewrite(&mut tree).unwrap();
        assert_eq!(tree, once);
    }

    #[test]
    fn existing_data_keys_survive() {
        let mut directive = ContainerDirective::new("note", vec![]);
        directive
            .data
            .extra
            .insert("source".to_string(), serde_json::json!("remark"));
        directive.data.h_name = Some("span".to_string());
        let mut tree = Node::root(vec![Node::ContainerDirective(directive)]);
        DirectiveBlockRewriter::new().rewrite(&mut tree).unwrap();

        let data = &only_directive(&tree).data;
        assert_eq!(data.extra["source"], serde_json::json!("remark"));
        assert_eq!(data.h_name.as_deref(), Some("div"));
    }

    #[test]
    fn empty_name_is_malformed() {
        let mut tree = Node::root(vec![Node::directive("  ", vec![])]);
        let err = DirectiveBlockRewriter::new().rewrite(&mut tree).unwrap_err();
        assert!(matches!(err, BlogmarkError::MalformedTree { .. }));
    }

    #[test]
    fn from_config_replaces_types() {
        let config = RewriterConfig::from_json_str(
            r#"{"defaultElement": "aside", "types": {"spoiler": {"defaultLabel": "Spoiler"}}}"#,
        )
        .unwrap();
        let rewriter = DirectiveBlockRewriter::from_config(&config);
        assert_eq!(rewriter.default_element(), "aside");
        assert!(rewriter.types().contains("spoiler"));
        assert!(!rewriter.types().contains("note"));
    }

    #[test]
    fn rewriter_is_shareable_across_threads() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<DirectiveBlockRewriter>();
    }
}

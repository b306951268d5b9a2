//! Document tree model.
//!
//! The tree follows the unist/mdast JSON shape: every node is an object with a
//! `type` tag, container nodes carry an ordered `children` array, and nodes that
//! feed the HTML stage carry a `data` object with `hName`/`hProperties` hints.
//! Trees produced by an external parser can be loaded with [`Node::from_json`].

use crate::BlogmarkError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Output attributes for the HTML stage, ordered by attribute name.
pub type Properties = BTreeMap<String, PropertyValue>;

/// A single output attribute value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropertyValue {
    /// Boolean attribute: `true` renders bare, `false` is omitted.
    Bool(bool),
    /// Plain string attribute.
    Text(String),
    /// Space-separated list, e.g. class names.
    List(Vec<String>),
}

impl From<&str> for PropertyValue {
    fn from(value: &str) -> Self {
        PropertyValue::Text(value.to_string())
    }
}

impl From<String> for PropertyValue {
    fn from(value: String) -> Self {
        PropertyValue::Text(value)
    }
}

impl From<bool> for PropertyValue {
    fn from(value: bool) -> Self {
        PropertyValue::Bool(value)
    }
}

impl From<Vec<String>> for PropertyValue {
    fn from(value: Vec<String>) -> Self {
        PropertyValue::List(value)
    }
}

fn is_false(value: &bool) -> bool {
    !*value
}

/// Auxiliary node metadata.
///
/// `hName` and `hProperties` are read by the HTML stage; `directiveLabel` marks
/// the explicit label paragraph of a directive. Any other keys are kept as-is.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Data {
    /// Output element name override.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub h_name: Option<String>,
    /// Output attributes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub h_properties: Option<Properties>,
    /// Set on a paragraph that is a directive's label.
    #[serde(default, skip_serializing_if = "is_false")]
    pub directive_label: bool,
    /// Unknown keys, preserved opaquely.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Data {
    /// True when no key is set.
    pub fn is_empty(&self) -> bool {
        self.h_name.is_none()
            && self.h_properties.is_none()
            && !self.directive_label
            && self.extra.is_empty()
    }
}

/// Generic container node.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Parent {
    /// Child nodes.
    pub children: Vec<Node>,
}

/// Leaf node holding text.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Literal {
    /// Text value.
    pub value: String,
}

/// Paragraph node; may be marked as a directive label through `data`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Paragraph {
    /// Phrasing children.
    pub children: Vec<Node>,
    /// Metadata.
    #[serde(default, skip_serializing_if = "Data::is_empty")]
    pub data: Data,
}

/// Heading node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Heading {
    /// Rank (1-6).
    pub depth: u8,
    /// Phrasing children.
    pub children: Vec<Node>,
    /// Metadata; `hProperties.id` holds the anchor once assigned.
    #[serde(default, skip_serializing_if = "Data::is_empty")]
    pub data: Data,
}

/// List node.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct List {
    /// Ordered (`<ol>`) or not (`<ul>`).
    #[serde(default)]
    pub ordered: bool,
    /// Start number of an ordered list.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<u32>,
    /// Whether items are separated by blank lines.
    #[serde(default)]
    pub spread: bool,
    /// List items.
    pub children: Vec<Node>,
}

/// List item node.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ListItem {
    /// Task list state.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checked: Option<bool>,
    /// Whether the item content is separated by blank lines.
    #[serde(default)]
    pub spread: bool,
    /// Flow children.
    pub children: Vec<Node>,
}

/// Link node.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Link {
    /// Destination.
    pub url: String,
    /// Advisory title.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Phrasing children.
    pub children: Vec<Node>,
}

/// Image node.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Image {
    /// Source.
    pub url: String,
    /// Alternative text.
    #[serde(default)]
    pub alt: String,
    /// Advisory title.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

/// Fenced or indented code block.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Code {
    /// Language from the info string.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lang: Option<String>,
    /// Rest of the info string.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<String>,
    /// Code contents.
    pub value: String,
}

/// Column alignment of a table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Align {
    /// `:---`
    Left,
    /// `---:`
    Right,
    /// `:---:`
    Center,
}

/// GFM table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Table {
    /// Per-column alignment (`null` when unaligned).
    #[serde(default)]
    pub align: Vec<Option<Align>>,
    /// Table rows; the first row is the header.
    pub children: Vec<Node>,
}

/// Container directive (`:::name[label]{attrs}` ... `:::`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContainerDirective {
    /// Directive name, case preserved.
    pub name: String,
    /// Attributes from the `{...}` part of the fence.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: BTreeMap<String, String>,
    /// Block children. The first may be a label paragraph.
    pub children: Vec<Node>,
    /// Metadata for the HTML stage.
    #[serde(default, skip_serializing_if = "Data::is_empty")]
    pub data: Data,
}

impl ContainerDirective {
    /// Creates a directive with no attributes or metadata.
    pub fn new(name: impl Into<String>, children: Vec<Node>) -> Self {
        Self {
            name: name.into(),
            children,
            ..Default::default()
        }
    }

    /// True when the first child is an explicit label paragraph.
    pub fn has_label(&self) -> bool {
        self.children.first().is_some_and(Node::is_directive_label)
    }
}

/// A node of the document tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Node {
    /// Document root.
    Root(Parent),
    /// Paragraph.
    Paragraph(Paragraph),
    /// ATX or setext heading.
    Heading(Heading),
    /// Block quote.
    Blockquote(Parent),
    /// Ordered or unordered list.
    List(List),
    /// Item of a list.
    ListItem(ListItem),
    /// Emphasis.
    Emphasis(Parent),
    /// Strong emphasis.
    Strong(Parent),
    /// GFM strikethrough.
    Delete(Parent),
    /// Link.
    Link(Link),
    /// Image.
    Image(Image),
    /// Text.
    Text(Literal),
    /// Code span.
    InlineCode(Literal),
    /// Code block.
    Code(Code),
    /// Raw HTML.
    Html(Literal),
    /// Display math (`$$`).
    Math(Literal),
    /// Inline math (`$`).
    InlineMath(Literal),
    /// YAML frontmatter.
    Yaml(Literal),
    /// Hard line break.
    Break,
    /// Thematic break.
    ThematicBreak,
    /// GFM table.
    Table(Table),
    /// Table row.
    TableRow(Parent),
    /// Table cell.
    TableCell(Parent),
    /// Container directive.
    ContainerDirective(ContainerDirective),
}

impl Node {
    /// Root node.
    pub fn root(children: Vec<Node>) -> Self {
        Node::Root(Parent { children })
    }

    /// Plain paragraph.
    pub fn paragraph(children: Vec<Node>) -> Self {
        Node::Paragraph(Paragraph {
            children,
            data: Data::default(),
        })
    }

    /// Paragraph marked as a directive label.
    pub fn label(children: Vec<Node>) -> Self {
        Node::Paragraph(Paragraph {
            children,
            data: Data {
                directive_label: true,
                ..Default::default()
            },
        })
    }

    /// Text leaf.
    pub fn text(value: impl Into<String>) -> Self {
        Node::Text(Literal {
            value: value.into(),
        })
    }

    /// Container directive without attributes.
    pub fn directive(name: impl Into<String>, children: Vec<Node>) -> Self {
        Node::ContainerDirective(ContainerDirective::new(name, children))
    }

    /// The `type` tag as it appears in JSON.
    pub fn kind(&self) -> &'static str {
        match self {
            Node::Root(_) => "root",
            Node::Paragraph(_) => "paragraph",
            Node::Heading(_) => "heading",
            Node::Blockquote(_) => "blockquote",
            Node::List(_) => "list",
            Node::ListItem(_) => "listItem",
            Node::Emphasis(_) => "emphasis",
            Node::Strong(_) => "strong",
            Node::Delete(_) => "delete",
            Node::Link(_) => "link",
            Node::Image(_) => "image",
            Node::Text(_) => "text",
            Node::InlineCode(_) => "inlineCode",
            Node::Code(_) => "code",
            Node::Html(_) => "html",
            Node::Math(_) => "math",
            Node::InlineMath(_) => "inlineMath",
            Node::Yaml(_) => "yaml",
            Node::Break => "break",
            Node::ThematicBreak => "thematicBreak",
            Node::Table(_) => "table",
            Node::TableRow(_) => "tableRow",
            Node::TableCell(_) => "tableCell",
            Node::ContainerDirective(_) => "containerDirective",
        }
    }

    /// Children of a container node, `None` for leaves.
    pub fn children(&self) -> Option<&Vec<Node>> {
        match self {
            Node::Root(p)
            | Node::Blockquote(p)
            | Node::Emphasis(p)
            | Node::Strong(p)
            | Node::Delete(p)
            | Node::TableRow(p)
            | Node::TableCell(p) => Some(&p.children),
            Node::Paragraph(p) => Some(&p.children),
            Node::Heading(h) => Some(&h.children),
            Node::List(l) => Some(&l.children),
            Node::ListItem(i) => Some(&i.children),
            Node::Link(l) => Some(&l.children),
            Node::Table(t) => Some(&t.children),
            Node::ContainerDirective(d) => Some(&d.children),
            Node::Image(_)
            | Node::Text(_)
            | Node::InlineCode(_)
            | Node::Code(_)
            | Node::Html(_)
            | Node::Math(_)
            | Node::InlineMath(_)
            | Node::Yaml(_)
            | Node::Break
            | Node::ThematicBreak => None,
        }
    }

    /// Mutable children of a container node, `None` for leaves.
    pub fn children_mut(&mut self) -> Option<&mut Vec<Node>> {
        match self {
            Node::Root(p)
            | Node::Blockquote(p)
            | Node::Emphasis(p)
            | Node::Strong(p)
            | Node::Delete(p)
            | Node::TableRow(p)
            | Node::TableCell(p) => Some(&mut p.children),
            Node::Paragraph(p) => Some(&mut p.children),
            Node::Heading(h) => Some(&mut h.children),
            Node::List(l) => Some(&mut l.children),
            Node::ListItem(i) => Some(&mut i.children),
            Node::Link(l) => Some(&mut l.children),
            Node::Table(t) => Some(&mut t.children),
            Node::ContainerDirective(d) => Some(&mut d.children),
            Node::Image(_)
            | Node::Text(_)
            | Node::InlineCode(_)
            | Node::Code(_)
            | Node::Html(_)
            | Node::Math(_)
            | Node::InlineMath(_)
            | Node::Yaml(_)
            | Node::Break
            | Node::ThematicBreak => None,
        }
    }

    /// True for a paragraph carrying the `directiveLabel` marker.
    pub fn is_directive_label(&self) -> bool {
        matches!(self, Node::Paragraph(p) if p.data.directive_label)
    }

    /// Concatenated text of all descendant text-like leaves.
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        collect_text(self, &mut out);
        out
    }

    /// Loads a tree from unist/mdast-shaped JSON.
    pub fn from_json(input: &str) -> Result<Node, BlogmarkError> {
        serde_json::from_str(input).map_err(|err| BlogmarkError::malformed(err.to_string()))
    }

    /// Converts a JSON value into a tree.
    pub fn from_value(value: Value) -> Result<Node, BlogmarkError> {
        serde_json::from_value(value).map_err(|err| BlogmarkError::malformed(err.to_string()))
    }

    /// Serializes the tree to compact JSON.
    pub fn to_json(&self) -> Result<String, BlogmarkError> {
        Ok(serde_json::to_string(self)?)
    }
}

fn collect_text(node: &Node, out: &mut String) {
    match node {
        Node::Text(t) | Node::InlineCode(t) | Node::InlineMath(t) => out.push_str(&t.value),
        Node::Image(img) => out.push_str(&img.alt),
        _ => {
            if let Some(children) = node.children() {
                for child in children {
                    collect_text(child, out);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn directive_json_shape() {
        let node = Node::directive("note", vec![Node::paragraph(vec![Node::text("hi")])]);
        let value = serde_json::to_value(&node).unwrap();
        assert_eq!(
            value,
            json!({
                "type": "containerDirective",
                "name": "note",
                "children": [
                    { "type": "paragraph", "children": [{ "type": "text", "value": "hi" }] }
                ]
            })
        );
    }

    #[test]
    fn label_marker_round_trips_through_json() {
        let input = json!({
            "type": "containerDirective",
            "name": "tip",
            "children": [
                {
                    "type": "paragraph",
                    "data": { "directiveLabel": true },
                    "children": [{ "type": "text", "value": "Custom" }]
                }
            ]
        });
        let node = Node::from_value(input).unwrap();
        let Node::ContainerDirective(directive) = &node else {
            panic!("expected directive, got {:?}", node.kind());
        };
        assert!(directive.has_label());
        assert_eq!(directive.children[0].text_content(), "Custom");
    }

    #[test]
    fn unknown_data_keys_are_preserved() {
        let input = json!({
            "type": "containerDirective",
            "name": "spoiler",
            "data": { "custom": { "a": 1 } },
            "children": []
        });
        let node = Node::from_value(input.clone()).unwrap();
        assert_eq!(serde_json::to_value(&node).unwrap(), input);
    }

    #[test]
    fn missing_children_is_malformed() {
        let err = Node::from_json(r#"{"type":"containerDirective","name":"note"}"#).unwrap_err();
        assert!(matches!(err, BlogmarkError::MalformedTree { .. }), "{err:?}");
        assert!(err.to_string().contains("children"));
    }

    #[test]
    fn unknown_type_is_malformed() {
        let err = Node::from_json(r#"{"type":"leafDirective","name":"x"}"#).unwrap_err();
        assert!(matches!(err, BlogmarkError::MalformedTree { .. }));
    }

    #[test]
    fn extra_fields_such_as_position_are_ignored() {
        let node = Node::from_json(
            r#"{"type":"text","value":"x","position":{"start":{"line":1,"column":1}}}"#,
        )
        .unwrap();
        assert_eq!(node, Node::text("x"));
    }

    #[test]
    fn children_accessors_cover_leaves() {
        let mut node = Node::root(vec![Node::text("a"), Node::Break]);
        assert_eq!(node.children().map(Vec::len), Some(2));
        node.children_mut().unwrap().push(Node::ThematicBreak);
        assert_eq!(node.children().map(Vec::len), Some(3));
        assert!(Node::text("a").children().is_none());
        assert_eq!(Node::ThematicBreak.kind(), "thematicBreak");
    }

    #[test]
    fn text_content_joins_descendants() {
        let node = Node::paragraph(vec![
            Node::text("a "),
            Node::Strong(Parent {
                children: vec![Node::text("b")],
            }),
            Node::InlineCode(Literal {
                value: " c".to_string(),
            }),
        ]);
        assert_eq!(node.text_content(), "a b c");
    }

    #[test]
    fn property_values_deserialize_untagged() {
        let props: Properties =
            serde_json::from_value(json!({ "hidden": true, "class": ["a", "b"], "id": "x" }))
                .unwrap();
        assert_eq!(props["hidden"], PropertyValue::Bool(true));
        assert_eq!(
            props["class"],
            PropertyValue::List(vec!["a".to_string(), "b".to_string()])
        );
        assert_eq!(props["id"], PropertyValue::from("x"));
    }
}

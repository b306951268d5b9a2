use blogmark_core::{BlogmarkError, Node};
use blogmark_remark::{
    BatchInput, BatchOptions, DirectiveBlockRewriter, Processor, ProcessorConfig, TypeRegistry,
    process_batch,
};
use insta::assert_snapshot;

fn render(source: &str) -> String {
    Processor::default()
        .process(source)
        .expect("document should process")
        .html
}

#[test]
fn note_with_markdown_label() {
    let html = render(":::note[Read *this*]\nBody text.\n:::\n");
    assert_snapshot!(html, @r#"<div data-admonition="note"><p>Read <em>this</em></p><p>Body text.</p></div>"#);
}

#[test]
fn empty_label_falls_back_to_default() {
    let html = render(":::tip[]\nBody\n:::");
    assert_snapshot!(html, @r#"<div data-admonition="tip"><p>Tip</p><p>Body</p></div>"#);
}

#[test]
fn nested_admonitions() {
    let html = render("::::warning\nOuter\n\n:::tip\nInner\n:::\n::::\n");
    assert_snapshot!(html, @r#"<div data-admonition="warning"><p>Warning</p><p>Outer</p><div data-admonition="tip"><p>Tip</p><p>Inner</p></div></div>"#);
}

#[test]
fn admonition_inside_unknown_directive() {
    let html = render(":::::details\n:::note\nx\n:::\n:::::\n");
    assert_snapshot!(html, @r#"<details><div data-admonition="note"><p>Note</p><p>x</p></div></details>"#);
}

#[test]
fn unknown_directive_keeps_its_attributes() {
    let html = render(":::details{.fancy #d1}\nx\n:::\n");
    assert_snapshot!(html, @r#"<details class="fancy" id="d1"><p>x</p></details>"#);
}

#[test]
fn bare_attribute_renders_as_boolean() {
    let html = render(":::details{open}\n:::summary\nMore\n:::\nHidden\n:::\n");
    assert_snapshot!(html, @"<details open><summary><p>More</p></summary><p>Hidden</p></details>");
}

#[test]
fn headings_inside_admonitions_are_linked() {
    let html = render("# Day 1\n\n:::note\n## Day 1\n:::\n");
    assert_snapshot!(html, @r##"<h1 id="day-1"><a href="#day-1">Day 1</a></h1><div data-admonition="note"><p>Note</p><h2 id="day-1-1"><a href="#day-1-1">Day 1</a></h2></div>"##);
}

#[test]
fn math_carries_copyable_source() {
    let html = render("Area $\\pi r^2$.\n\n$$\nE = mc^2\n$$\n");
    assert_eq!(
        html,
        concat!(
            r#"<p>Area <span class="math math-inline"><code class="language-math math-inline">\pi r^2</code>"#,
            r#"<mjx-copytext aria-hidden="true" style="white-space: pre-wrap">$\pi r^2$</mjx-copytext></span>.</p>"#,
            r#"<div class="math math-display"><pre><code class="language-math math-display">E = mc^2</code></pre>"#,
            "<mjx-copytext aria-hidden=\"true\" style=\"white-space: pre-wrap\">$$\nE = mc^2\n$$</mjx-copytext></div>",
        )
    );
}

#[test]
fn fenced_code_is_not_split() {
    let html = render("```md\n:::note\nx\n:::\n```\n");
    assert_eq!(
        html,
        "<pre><code class=\"language-md\">:::note\nx\n:::\n</code></pre>"
    );
}

#[test]
fn body_text_is_escaped() {
    let html = render(":::danger\na < b & c\n:::");
    assert_snapshot!(html, @r#"<div data-admonition="danger"><p>Danger</p><p>a &lt; b &amp; c</p></div>"#);
}

#[test]
fn configured_attribute_precedence() {
    let config = ProcessorConfig::from_json_str(
        r#"{
            "admonitions": {
                "defaultProperties": { "class": "x" },
                "types": {
                    "note": {
                        "defaultLabel": "Note",
                        "properties": { "class": "y", "data-foo": "z", "data-admonition": "spoofed" }
                    }
                }
            }
        }"#,
    )
    .unwrap();
    let html = Processor::new(config).process(":::note\nbody\n:::").unwrap().html;
    assert_snapshot!(html, @r#"<div class="y" data-admonition="note" data-foo="z"><p>Note</p><p>body</p></div>"#);
}

#[test]
fn yaml_config_sets_element_and_defaults() {
    let config = ProcessorConfig::from_yaml_str(
        "admonitions:\n  defaultElement: aside\n  defaultProperties:\n    class: [callout, boxed]\n",
    )
    .unwrap();
    let html = Processor::new(config).process(":::hint\nbody\n:::").unwrap().html;
    assert_snapshot!(html, @r#"<aside class="callout boxed" data-admonition="hint"><p>Hint</p><p>body</p></aside>"#);
}

#[test]
fn type_without_label_gets_empty_label() {
    let config = ProcessorConfig::from_json_str(r#"{"admonitions": {"types": {"aside": {}}}}"#)
        .unwrap();
    let html = Processor::new(config).process(":::aside\nbody\n:::").unwrap().html;
    assert_snapshot!(html, @r#"<div data-admonition="aside"><p></p><p>body</p></div>"#);
}

#[test]
fn empty_registry_leaves_every_directive() {
    let rewriter = DirectiveBlockRewriter::new().with_types(TypeRegistry::new());
    let processor = Processor::with_rewriter(&ProcessorConfig::default(), rewriter);
    let rendered = processor.process(":::note\nbody\n:::").unwrap();
    assert_eq!(rendered.summary.rewritten, 0);
    assert_eq!(rendered.summary.skipped, 1);
    assert_snapshot!(rendered.html, @"<note><p>body</p></note>");
}

#[test]
fn json_round_trip_is_stable_under_rewrite() {
    let rendered = Processor::default()
        .process(":::caution[Heads up]\nOne\n\n- two\n:::\n\n:::attention\nThree\n:::")
        .unwrap();
    let json = rendered.tree.to_json().unwrap();

    let mut reloaded = Node::from_json(&json).unwrap();
    assert_eq!(reloaded, rendered.tree);

    let summary = DirectiveBlockRewriter::new().rewrite(&mut reloaded).unwrap();
    assert_eq!(summary.rewritten, 2);
    assert_eq!(reloaded, rendered.tree);
}

#[test]
fn tree_missing_children_is_malformed() {
    let err = Node::from_json(r#"{"type":"root","children":[{"type":"containerDirective","name":"note"}]}"#)
        .unwrap_err();
    assert!(matches!(err, BlogmarkError::MalformedTree { .. }), "{err:?}");
}

#[test]
fn batch_processes_documents_independently() {
    let inputs = vec![
        BatchInput::new("a.md", ":::important\nA\n:::"),
        BatchInput::new("b.md", "plain"),
        BatchInput::new("c.md", ":::error[Oops]\nC\n:::"),
    ];
    let output = process_batch(&Processor::default(), inputs, &BatchOptions::default());
    assert_eq!(output.stats.succeeded, 3);

    let html: Vec<&str> = output
        .results
        .iter()
        .map(|r| r.html.as_deref().unwrap_or_default())
        .collect();
    assert_eq!(
        html,
        [
            "<div data-admonition=\"important\"><p>Important</p><p>A</p></div>",
            "<p>plain</p>",
            "<div data-admonition=\"error\"><p>Oops</p><p>C</p></div>",
        ]
    );
}

//! HTML fragment parsing into the node tree, and serialization back out.
//!
//! Parsing goes through html5ever so that whatever an editor or a prior save
//! produced is read the way a browser would read it. Serialization is done by
//! hand because the two output forms (editor and persisted) differ only in
//! how conditional blocks are written.

use std::cell::RefCell;

use html5ever::tendril::TendrilSink;
use html5ever::{ParseOpts, parse_fragment};
use markup5ever::{Attribute, LocalName, Namespace, QualName};
use markup5ever_rcdom::{Handle, NodeData, RcDom};

use super::markers::escape_condition;
use super::node::{ConditionalBlock, Element, Node, new_block_id};

const HTML_NAMESPACE: &str = "http://www.w3.org/1999/xhtml";

/// `data-type` value identifying a conditional block in editor HTML.
pub const CONDITIONAL_BLOCK_TYPE: &str = "conditional-block";

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

/// Which representation to write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Form {
    /// Conditional blocks as `<div data-type="conditional-block" …>`.
    Editor,
    /// Conditional blocks as `[[IF:…]]` / `[[ENDIF]]` markers.
    Persisted,
}

/// Parse an HTML fragment into nodes.
///
/// Conditional blocks already present as editor elements are recognized;
/// blocks missing a color get `default_color`, blocks missing an id get a
/// fresh one. Markers in text are left untouched here.
pub fn parse_nodes(html: &str, default_color: &str) -> Vec<Node> {
    let context = QualName::new(
        None,
        Namespace::from(HTML_NAMESPACE),
        LocalName::from("body"),
    );
    let dom = parse_fragment(RcDom::default(), ParseOpts::default(), context, Vec::new()).one(html);

    // Fragment parsing hangs everything under a synthetic <html> root
    let roots = dom.document.children.borrow();
    roots
        .iter()
        .flat_map(|root| convert_children(root, default_color))
        .collect()
}

fn convert_children(handle: &Handle, default_color: &str) -> Vec<Node> {
    handle
        .children
        .borrow()
        .iter()
        .filter_map(|child| convert_node(child, default_color))
        .collect()
}

fn convert_node(handle: &Handle, default_color: &str) -> Option<Node> {
    match &handle.data {
        NodeData::Text { contents } => Some(Node::Text(contents.borrow().to_string())),
        NodeData::Element { name, attrs, .. } => {
            let tag = name.local.as_ref().to_ascii_lowercase();
            let attrs = collect_attrs(attrs);
            let children = convert_children(handle, default_color);

            let is_conditional = attrs
                .iter()
                .any(|(k, v)| k == "data-type" && v == CONDITIONAL_BLOCK_TYPE);
            if is_conditional {
                let get = |key: &str| {
                    attrs
                        .iter()
                        .find(|(k, _)| k == key)
                        .map(|(_, v)| v.clone())
                        .filter(|v| !v.is_empty())
                };
                return Some(Node::Conditional(ConditionalBlock {
                    condition: get("data-condition").unwrap_or_default(),
                    color: get("data-color").unwrap_or_else(|| default_color.to_string()),
                    id: get("data-id").unwrap_or_else(new_block_id),
                    children,
                }));
            }

            Some(Node::Element(Element {
                tag,
                attrs,
                children,
            }))
        }
        // Comments, doctypes and processing instructions carry no content
        _ => None,
    }
}

fn collect_attrs(attrs: &RefCell<Vec<Attribute>>) -> Vec<(String, String)> {
    attrs
        .borrow()
        .iter()
        .map(|attr| (attr.name.local.to_string(), attr.value.to_string()))
        .collect()
}

/// Serialize nodes in the requested form.
///
/// Persisted output assumes conditions were validated as embeddable.
pub fn write_nodes(nodes: &[Node], form: Form) -> String {
    let mut out = String::new();
    for node in nodes {
        write_node(node, form, &mut out);
    }
    out
}

fn write_node(node: &Node, form: Form, out: &mut String) {
    match node {
        Node::Text(text) => out.push_str(&html_escape::encode_text(text)),
        Node::Element(el) => {
            out.push('<');
            out.push_str(&el.tag);
            write_attrs(el.attrs.iter().map(|(k, v)| (k.as_str(), v.as_str())), out);
            out.push('>');
            if VOID_ELEMENTS.contains(&el.tag.as_str()) {
                return;
            }
            for child in &el.children {
                write_node(child, form, out);
            }
            out.push_str("</");
            out.push_str(&el.tag);
            out.push('>');
        }
        Node::Conditional(block) => match form {
            Form::Persisted => {
                out.push_str("[[IF:");
                out.push_str(&escape_condition(&block.condition));
                out.push_str("]]");
                for child in &block.children {
                    write_node(child, form, out);
                }
                out.push_str("[[ENDIF]]");
            }
            Form::Editor => {
                // A <div> inside a <p> would be split apart by any HTML parser
                let tag = if node.is_inline() { "span" } else { "div" };
                out.push('<');
                out.push_str(tag);
                write_attrs(
                    [
                        ("data-type", CONDITIONAL_BLOCK_TYPE),
                        ("data-condition", block.condition.as_str()),
                        ("data-color", block.color.as_str()),
                        ("data-id", block.id.as_str()),
                    ],
                    out,
                );
                out.push('>');
                for child in &block.children {
                    write_node(child, form, out);
                }
                out.push_str("</");
                out.push_str(tag);
                out.push('>');
            }
        },
    }
}

fn write_attrs<'a>(attrs: impl IntoIterator<Item = (&'a str, &'a str)>, out: &mut String) {
    for (key, value) in attrs {
        out.push(' ');
        out.push_str(key);
        out.push_str("=\"");
        out.push_str(&html_escape::encode_double_quoted_attribute(value));
        out.push('"');
    }
}

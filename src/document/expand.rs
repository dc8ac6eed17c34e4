//! Persisted form → structured form.
//!
//! Markers are paired per sibling list with a stack, so nested conditionals
//! work and a marker pair never straddles two parents. Anything that does not
//! pair stays as literal text.

use super::markers::{Segment, lone_marker, split_markers};
use super::node::{ConditionalBlock, Element, Node, merge_text_runs};

/// Containers whose structure must survive even when they only hold a
/// marker (dropping a `<td>` would break its row).
const STRUCTURAL_TAGS: &[&str] = &[
    "li", "ol", "table", "tbody", "td", "tfoot", "th", "thead", "tr", "ul",
];

enum Item {
    Node(Node),
    Open { condition: String, literal: Node },
    Close { literal: Node },
}

struct Frame {
    condition: String,
    literal: Node,
    nodes: Vec<Node>,
}

/// Pairs markers into conditional blocks, counting what it did.
pub(crate) struct MarkerPairer<'a> {
    color: &'a str,
    pub paired: usize,
    pub unmatched: usize,
}

impl<'a> MarkerPairer<'a> {
    pub fn new(color: &'a str) -> Self {
        Self {
            color,
            paired: 0,
            unmatched: 0,
        }
    }

    /// Replace every marker pair in `nodes` (recursively) with a block.
    pub fn pair(&mut self, nodes: Vec<Node>) -> Vec<Node> {
        let items = self.tokenize(nodes);

        let mut base: Vec<Node> = Vec::new();
        let mut open: Vec<Frame> = Vec::new();

        for item in items {
            match item {
                Item::Node(node) => current(&mut base, &mut open).push(node),
                Item::Open { condition, literal } => open.push(Frame {
                    condition,
                    literal,
                    nodes: Vec::new(),
                }),
                Item::Close { literal } => match open.pop() {
                    Some(frame) => {
                        self.paired += 1;
                        let block = ConditionalBlock::with_color(
                            frame.condition,
                            self.color,
                            trim_block_edges(merge_text_runs(frame.nodes)),
                        );
                        current(&mut base, &mut open).push(Node::Conditional(block));
                    }
                    None => {
                        self.unmatched += 1;
                        base.push(literal);
                    }
                },
            }
        }

        // Openers that never closed degrade to their literal text
        while let Some(frame) = open.pop() {
            self.unmatched += 1;
            let target = current(&mut base, &mut open);
            target.push(frame.literal);
            target.extend(frame.nodes);
        }

        merge_text_runs(base)
    }

    fn tokenize(&mut self, nodes: Vec<Node>) -> Vec<Item> {
        let mut items = Vec::with_capacity(nodes.len());
        for node in nodes {
            match node {
                Node::Text(text) => {
                    for segment in split_markers(&text) {
                        items.push(match segment {
                            Segment::Text(t) => Item::Node(Node::text(t)),
                            Segment::Open { condition, raw } => Item::Open {
                                condition,
                                literal: Node::text(raw),
                            },
                            Segment::Close { raw } => Item::Close {
                                literal: Node::text(raw),
                            },
                        });
                    }
                }
                Node::Element(el) => match wrapped_marker(&el) {
                    Some(Segment::Open { condition, .. }) => items.push(Item::Open {
                        condition,
                        literal: Node::Element(el),
                    }),
                    Some(Segment::Close { .. }) => items.push(Item::Close {
                        literal: Node::Element(el),
                    }),
                    _ => {
                        let Element {
                            tag,
                            attrs,
                            children,
                        } = el;
                        items.push(Item::Node(Node::Element(Element {
                            tag,
                            attrs,
                            children: self.pair(children),
                        })));
                    }
                },
                Node::Conditional(mut block) => {
                    block.children = self.pair(block.children);
                    items.push(Item::Node(Node::Conditional(block)));
                }
            }
        }
        items
    }
}

fn current<'v>(base: &'v mut Vec<Node>, open: &'v mut [Frame]) -> &'v mut Vec<Node> {
    match open.last_mut() {
        Some(frame) => &mut frame.nodes,
        None => base,
    }
}

/// A marker that is the only content of an element, like `<p>[[IF:X]]</p>`.
/// The wrapping element is discarded when the marker pairs.
fn wrapped_marker(el: &Element) -> Option<Segment<'static>> {
    if STRUCTURAL_TAGS.contains(&el.tag.as_str()) || !only_text_and_marks(&el.children) {
        return None;
    }
    let text = el
        .children
        .iter()
        .map(Node::text_content)
        .collect::<String>();
    match lone_marker(&text)? {
        Segment::Open { condition, .. } => Some(Segment::Open { condition, raw: "" }),
        Segment::Close { .. } => Some(Segment::Close { raw: "" }),
        Segment::Text(_) => None,
    }
}

fn only_text_and_marks(nodes: &[Node]) -> bool {
    nodes.iter().all(|node| match node {
        Node::Text(_) => true,
        Node::Element(el) => {
            !matches!(el.tag.as_str(), "img" | "table" | "hr") && only_text_and_marks(&el.children)
        }
        Node::Conditional(_) => false,
    })
}

/// Block-level content loses the whitespace runs that separated it from the
/// markers; inline content keeps them.
fn trim_block_edges(mut nodes: Vec<Node>) -> Vec<Node> {
    if nodes.iter().all(Node::is_inline) {
        return nodes;
    }
    while matches!(nodes.last(), Some(Node::Text(t)) if t.trim().is_empty()) {
        nodes.pop();
    }
    let leading = nodes
        .iter()
        .take_while(|node| matches!(node, Node::Text(t) if t.trim().is_empty()))
        .count();
    nodes.drain(..leading);
    nodes
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn pair(nodes: Vec<Node>) -> (Vec<Node>, usize, usize) {
        let mut pairer = MarkerPairer::new("#000");
        let out = pairer.pair(nodes);
        (out, pairer.paired, pairer.unmatched)
    }

    fn shape(nodes: Vec<Node>) -> Vec<Node> {
        super::super::Document::new(nodes).normalized().nodes
    }

    #[test]
    fn test_pair_inline_markers() {
        let (out, paired, unmatched) = pair(vec![Node::text("a [[IF:X]]b[[ENDIF]] c")]);
        assert_eq!((paired, unmatched), (1, 0));
        assert_eq!(
            shape(out),
            shape(vec![
                Node::text("a "),
                Node::conditional("X", vec![Node::text("b")]),
                Node::text(" c"),
            ])
        );
    }

    #[test]
    fn test_pair_wrapped_markers() {
        let (out, paired, _) = pair(vec![
            Node::paragraph("[[IF:X]]"),
            Node::text("\n"),
            Node::paragraph("cuerpo"),
            Node::text("\n"),
            Node::element("p", vec![Node::element("strong", vec![Node::text(" [[ENDIF]] ")])]),
        ]);
        assert_eq!(paired, 1);
        assert_eq!(
            shape(out),
            shape(vec![Node::conditional("X", vec![Node::paragraph("cuerpo")])])
        );
    }

    #[test]
    fn test_pair_nested() {
        let (out, paired, _) = pair(vec![Node::text(
            "[[IF:A]]x[[IF:B]]y[[ENDIF]]z[[ENDIF]]",
        )]);
        assert_eq!(paired, 2);
        assert_eq!(
            shape(out),
            shape(vec![Node::conditional(
                "A",
                vec![
                    Node::text("x"),
                    Node::conditional("B", vec![Node::text("y")]),
                    Node::text("z"),
                ]
            )])
        );
    }

    #[test]
    fn test_unmatched_open_stays_literal() {
        let (out, paired, unmatched) = pair(vec![
            Node::paragraph("[[IF:X]]"),
            Node::paragraph("resto"),
        ]);
        assert_eq!((paired, unmatched), (0, 1));
        assert_eq!(out, vec![Node::paragraph("[[IF:X]]"), Node::paragraph("resto")]);
    }

    #[test]
    fn test_stray_close_stays_literal() {
        let (out, _, unmatched) = pair(vec![Node::text("a [[ENDIF]] b")]);
        assert_eq!(unmatched, 1);
        assert_eq!(out, vec![Node::text("a [[ENDIF]] b")]);
    }

    #[test]
    fn test_markers_in_table_cells_keep_cells() {
        let cell = Node::element("td", vec![Node::text("[[IF:X]]")]);
        let (out, paired, _) = pair(vec![cell.clone()]);
        assert_eq!(paired, 0);
        assert_eq!(out, vec![cell]);
    }
}

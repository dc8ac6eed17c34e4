//! The structured (editing-time) document tree.
//!
//! A document is a list of nodes. Conditional regions are explicit
//! [`ConditionalBlock`] nodes here; they only become `[[IF:…]]` / `[[ENDIF]]`
//! markers when the tree is flattened for persistence.

/// Color given to conditional blocks that have none of their own.
pub const DEFAULT_BLOCK_COLOR: &str = "#3b82f6";

/// Elements that render inline when they wrap a conditional region.
const INLINE_TAGS: &[&str] = &[
    "a", "b", "br", "code", "em", "font", "i", "img", "mark", "s", "small", "span", "strong",
    "sub", "sup", "u",
];

/// A structured document: an ordered list of top-level nodes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Document {
    pub nodes: Vec<Node>,
}

/// A node of the structured document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    /// A regular HTML element (paragraph, table, inline mark, ...).
    Element(Element),
    /// A run of text. May contain `{{VAR}}` tokens.
    Text(String),
    /// A region shown only when `condition` holds.
    Conditional(ConditionalBlock),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    /// Lowercase tag name.
    pub tag: String,
    /// Attributes in source order.
    pub attrs: Vec<(String, String)>,
    pub children: Vec<Node>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConditionalBlock {
    /// Condition text, stored unescaped (`EDAD > 18`, not `EDAD &gt; 18`).
    pub condition: String,
    /// Display color used by editors.
    pub color: String,
    /// Editor identity. Not preserved across a flatten/expand cycle.
    pub id: String,
    pub children: Vec<Node>,
}

impl Document {
    pub fn new(nodes: Vec<Node>) -> Self {
        Self { nodes }
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.iter().all(Node::is_blank)
    }

    /// Concatenated text of the whole document, markers excluded.
    pub fn text_content(&self) -> String {
        let mut text = String::new();
        for node in &self.nodes {
            node.collect_text(&mut text);
        }
        text
    }

    /// Copy of this document with block identities cleared and adjacent
    /// text runs merged. Two documents with equal normal forms have the same
    /// conditional boundaries, conditions and text.
    pub fn normalized(&self) -> Document {
        Document::new(normalize_nodes(&self.nodes))
    }

    /// Structural equality, ignoring block ids and colors.
    pub fn same_structure(&self, other: &Document) -> bool {
        self.normalized() == other.normalized()
    }

    /// All conditional blocks in document order (outer before inner).
    pub fn conditionals(&self) -> Vec<&ConditionalBlock> {
        let mut blocks = Vec::new();
        collect_conditionals(&self.nodes, &mut blocks);
        blocks
    }
}

impl Node {
    pub fn text(text: impl Into<String>) -> Self {
        Node::Text(text.into())
    }

    pub fn element(tag: impl Into<String>, children: Vec<Node>) -> Self {
        Node::Element(Element {
            tag: tag.into(),
            attrs: Vec::new(),
            children,
        })
    }

    pub fn paragraph(text: impl Into<String>) -> Self {
        Node::element("p", vec![Node::text(text)])
    }

    pub fn conditional(condition: impl Into<String>, children: Vec<Node>) -> Self {
        Node::Conditional(ConditionalBlock::new(condition, children))
    }

    /// True for whitespace-only text and for elements or blocks that only
    /// contain such text.
    pub fn is_blank(&self) -> bool {
        match self {
            Node::Text(text) => text.trim().is_empty(),
            Node::Element(el) => {
                !matches!(el.tag.as_str(), "img" | "hr" | "table")
                    && el.children.iter().all(Node::is_blank)
            }
            Node::Conditional(_) => false,
        }
    }

    /// True if this node renders inline (text, phrasing elements, or a
    /// conditional wrapping only inline content).
    pub fn is_inline(&self) -> bool {
        match self {
            Node::Text(_) => true,
            Node::Element(el) => {
                INLINE_TAGS.contains(&el.tag.as_str()) && el.children.iter().all(Node::is_inline)
            }
            Node::Conditional(block) => block.children.iter().all(Node::is_inline),
        }
    }

    /// Concatenated text of this node and its descendants; `<br>` reads as
    /// a line break.
    pub fn text_content(&self) -> String {
        let mut text = String::new();
        self.collect_text(&mut text);
        text
    }

    pub fn children(&self) -> &[Node] {
        match self {
            Node::Text(_) => &[],
            Node::Element(el) => &el.children,
            Node::Conditional(block) => &block.children,
        }
    }

    fn collect_text(&self, out: &mut String) {
        match self {
            Node::Text(text) => out.push_str(text),
            Node::Element(el) if el.tag == "br" => out.push('\n'),
            _ => {
                for child in self.children() {
                    child.collect_text(out);
                }
            }
        }
    }
}

impl Element {
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }
}

impl ConditionalBlock {
    /// Create a block with a fresh id and the default color.
    pub fn new(condition: impl Into<String>, children: Vec<Node>) -> Self {
        Self::with_color(condition, DEFAULT_BLOCK_COLOR, children)
    }

    pub fn with_color(
        condition: impl Into<String>,
        color: impl Into<String>,
        children: Vec<Node>,
    ) -> Self {
        Self {
            condition: condition.into(),
            color: color.into(),
            id: new_block_id(),
            children,
        }
    }
}

/// Fresh identity for a conditional block.
pub fn new_block_id() -> String {
    format!("cond-{}", uuid::Uuid::new_v4().simple())
}

/// Merge adjacent text nodes and drop empty ones.
pub(crate) fn merge_text_runs(nodes: Vec<Node>) -> Vec<Node> {
    let mut merged: Vec<Node> = Vec::with_capacity(nodes.len());
    for node in nodes {
        match node {
            Node::Text(text) if text.is_empty() => {}
            Node::Text(text) => {
                if let Some(Node::Text(prev)) = merged.last_mut() {
                    prev.push_str(&text);
                } else {
                    merged.push(Node::Text(text));
                }
            }
            other => merged.push(other),
        }
    }
    merged
}

fn normalize_nodes(nodes: &[Node]) -> Vec<Node> {
    let normalized = nodes
        .iter()
        .map(|node| match node {
            Node::Text(text) => Node::Text(text.clone()),
            Node::Element(el) => Node::Element(Element {
                tag: el.tag.clone(),
                attrs: el.attrs.clone(),
                children: normalize_nodes(&el.children),
            }),
            Node::Conditional(block) => Node::Conditional(ConditionalBlock {
                condition: block.condition.trim().to_string(),
                color: String::new(),
                id: String::new(),
                children: normalize_nodes(&block.children),
            }),
        })
        .collect();
    merge_text_runs(normalized)
}

fn collect_conditionals<'a>(nodes: &'a [Node], out: &mut Vec<&'a ConditionalBlock>) {
    for node in nodes {
        if let Node::Conditional(block) = node {
            out.push(block);
        }
        collect_conditionals(node.children(), out);
    }
}

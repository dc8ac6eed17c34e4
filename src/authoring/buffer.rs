//! The document body being edited.
//!
//! Selections are char offsets into the concatenated text of the document's
//! text nodes, in document order. `<br>` and other empty elements take no
//! room.

use std::ops::Range;

use crate::document::{Document, Node, Translator};
use crate::util::byte_offset;

/// What the authoring surface needs from the editor holding the document.
pub trait DocumentBody {
    fn document(&self) -> &Document;

    /// Structural edits only; text offsets must stay valid.
    fn document_mut(&mut self) -> &mut Document;

    fn selection(&self) -> Range<usize>;

    /// Move the selection. Out-of-range selections are refused.
    fn select(&mut self, range: Range<usize>) -> bool;

    /// The selected text, or `None` when the selection is collapsed.
    fn selected_text(&self) -> Option<String>;

    /// Insert `text` at the selection, replacing it when non-empty, and
    /// collapse the selection after the inserted text.
    fn insert_text(&mut self, text: &str) -> bool;

    /// Replace the selected text with `transform(selected)`, keeping the
    /// element structure (and so the inline marks) around it.
    fn transform_selection(&mut self, transform: &dyn Fn(&str) -> String) -> bool;

    /// Indexes of the top-level nodes touched by the selection.
    fn selected_blocks(&self) -> Option<Range<usize>>;

    fn focus(&mut self);
}

// =============================================================================
// Text leaves
// =============================================================================

/// A text node located by its child-index path.
#[derive(Debug, Clone)]
struct Leaf {
    path: Vec<usize>,
    /// Char offset of the leaf's first char.
    start: usize,
    /// Length in chars.
    len: usize,
}

impl Leaf {
    fn end(&self) -> usize {
        self.start + self.len
    }

    /// The part of `range` inside this leaf, in leaf-local char offsets.
    fn overlap(&self, range: &Range<usize>) -> Option<Range<usize>> {
        let start = range.start.max(self.start);
        let end = range.end.min(self.end());
        (start < end).then(|| start - self.start..end - self.start)
    }
}

fn text_leaves(nodes: &[Node]) -> Vec<Leaf> {
    fn walk(nodes: &[Node], path: &mut Vec<usize>, offset: &mut usize, out: &mut Vec<Leaf>) {
        for (i, node) in nodes.iter().enumerate() {
            path.push(i);
            match node {
                Node::Text(text) => {
                    let len = text.chars().count();
                    out.push(Leaf {
                        path: path.clone(),
                        start: *offset,
                        len,
                    });
                    *offset += len;
                }
                other => walk(other.children(), path, offset, out),
            }
            path.pop();
        }
    }

    let mut leaves = Vec::new();
    walk(nodes, &mut Vec::new(), &mut 0, &mut leaves);
    leaves
}

fn leaf_mut<'a>(nodes: &'a mut [Node], path: &[usize]) -> Option<&'a mut String> {
    let (first, rest) = path.split_first()?;
    match nodes.get_mut(*first)? {
        Node::Text(text) if rest.is_empty() => Some(text),
        Node::Element(el) => leaf_mut(&mut el.children, rest),
        Node::Conditional(block) => leaf_mut(&mut block.children, rest),
        Node::Text(_) => None,
    }
}

/// Replace chars `range` of `text` with `replacement`.
fn replace_chars(text: &mut String, range: Range<usize>, replacement: &str) {
    let start = byte_offset(text, range.start);
    let end = byte_offset(text, range.end);
    text.replace_range(start..end, replacement);
}

fn char_slice(text: &str, range: Range<usize>) -> &str {
    &text[byte_offset(text, range.start)..byte_offset(text, range.end)]
}

// =============================================================================
// TextBuffer
// =============================================================================

/// An in-memory document body.
#[derive(Debug, Clone, Default)]
pub struct TextBuffer {
    doc: Document,
    selection: Range<usize>,
    focused: bool,
}

impl TextBuffer {
    /// A buffer over `doc` with the cursor at the end.
    pub fn new(doc: Document) -> Self {
        let end = doc_len(&doc);
        Self {
            doc,
            selection: end..end,
            focused: false,
        }
    }

    /// A buffer over the expanded form of persisted HTML.
    pub fn from_html(persisted: &str, translator: &Translator) -> Self {
        Self::new(translator.expand(persisted))
    }

    pub fn is_focused(&self) -> bool {
        self.focused
    }

    pub fn len(&self) -> usize {
        doc_len(&self.doc)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn into_document(self) -> Document {
        self.doc
    }

    /// The selection clamped to the current text.
    fn clamped_selection(&self) -> Range<usize> {
        let len = self.len();
        self.selection.start.min(len)..self.selection.end.min(len)
    }

    fn delete(&mut self, range: &Range<usize>) {
        for leaf in text_leaves(&self.doc.nodes).iter().rev() {
            if let Some(local) = leaf.overlap(range)
                && let Some(text) = leaf_mut(&mut self.doc.nodes, &leaf.path)
            {
                replace_chars(text, local, "");
            }
        }
    }
}

fn doc_len(doc: &Document) -> usize {
    text_leaves(&doc.nodes).last().map_or(0, Leaf::end)
}

impl DocumentBody for TextBuffer {
    fn document(&self) -> &Document {
        &self.doc
    }

    fn document_mut(&mut self) -> &mut Document {
        &mut self.doc
    }

    fn selection(&self) -> Range<usize> {
        self.clamped_selection()
    }

    fn select(&mut self, range: Range<usize>) -> bool {
        if range.start > range.end || range.end > self.len() {
            return false;
        }
        self.selection = range;
        true
    }

    fn selected_text(&self) -> Option<String> {
        let selection = self.clamped_selection();
        if selection.is_empty() {
            return None;
        }
        let mut selected = String::new();
        for leaf in text_leaves(&self.doc.nodes) {
            if let Some(local) = leaf.overlap(&selection)
                && let Some(Node::Text(text)) = node_at(&self.doc.nodes, &leaf.path)
            {
                selected.push_str(char_slice(text, local));
            }
        }
        Some(selected)
    }

    fn insert_text(&mut self, text: &str) -> bool {
        if text.is_empty() {
            return false;
        }
        let selection = self.clamped_selection();
        self.delete(&selection);

        let at = selection.start;
        let inserted = text.chars().count();
        let leaves = text_leaves(&self.doc.nodes);
        let target = leaves
            .iter()
            .find(|leaf| leaf.start <= at && at <= leaf.end());

        match target {
            Some(leaf) => {
                let local = at - leaf.start;
                let Some(leaf_text) = leaf_mut(&mut self.doc.nodes, &leaf.path) else {
                    return false;
                };
                replace_chars(leaf_text, local..local, text);
            }
            None => self.doc.nodes.push(Node::paragraph(text)),
        }

        self.selection = at + inserted..at + inserted;
        true
    }

    fn transform_selection(&mut self, transform: &dyn Fn(&str) -> String) -> bool {
        let selection = self.clamped_selection();
        if selection.is_empty() {
            return false;
        }

        let pieces: Vec<(Vec<usize>, Range<usize>)> = text_leaves(&self.doc.nodes)
            .into_iter()
            .filter_map(|leaf| leaf.overlap(&selection).map(|local| (leaf.path, local)))
            .collect();
        let Some(original) = self.selected_text() else {
            return false;
        };
        let transformed = transform(&original);

        // Redistribute the transformed text over the original runs when the
        // length allows it, so words split across marks transform as one.
        let whole = transformed.chars().count() == original.chars().count();
        let mut rest = transformed.as_str();
        let mut new_len = 0;
        for (path, local) in pieces {
            let Some(text) = leaf_mut(&mut self.doc.nodes, &path) else {
                continue;
            };
            let replacement = if whole {
                let split = byte_offset(rest, local.len());
                let (head, tail) = rest.split_at(split);
                rest = tail;
                head.to_string()
            } else {
                transform(char_slice(text, local.clone()))
            };
            new_len += replacement.chars().count();
            replace_chars(text, local, &replacement);
        }

        self.selection = selection.start..selection.start + new_len;
        true
    }

    fn selected_blocks(&self) -> Option<Range<usize>> {
        let selection = self.clamped_selection();
        let leaves = text_leaves(&self.doc.nodes);

        let touched: Vec<usize> = if selection.is_empty() {
            leaves
                .iter()
                .find(|leaf| leaf.start <= selection.start && selection.start <= leaf.end())
                .map(|leaf| leaf.path[0])
                .into_iter()
                .collect()
        } else {
            leaves
                .iter()
                .filter(|leaf| leaf.overlap(&selection).is_some())
                .map(|leaf| leaf.path[0])
                .collect()
        };

        let first = *touched.iter().min()?;
        let last = *touched.iter().max()?;
        Some(first..last + 1)
    }

    fn focus(&mut self) {
        self.focused = true;
    }
}

fn node_at<'a>(nodes: &'a [Node], path: &[usize]) -> Option<&'a Node> {
    let (first, rest) = path.split_first()?;
    let node = nodes.get(*first)?;
    if rest.is_empty() {
        Some(node)
    } else {
        node_at(node.children(), rest)
    }
}

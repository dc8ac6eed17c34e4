//! Creating, editing and removing conditional blocks in a node tree.

use std::ops::Range;

use crate::config::EditorConfig;
use crate::document::{ConditionalBlock, DEFAULT_BLOCK_COLOR, Node, merge_text_runs};

/// Wrap `nodes[range]` in a new conditional block, returning its id.
///
/// Empty or out-of-range ranges leave the tree untouched.
pub fn wrap_range(
    nodes: &mut Vec<Node>,
    range: Range<usize>,
    condition: &str,
    color: &str,
) -> Option<String> {
    if range.is_empty() || range.end > nodes.len() {
        return None;
    }
    let children: Vec<Node> = nodes.drain(range.clone()).collect();
    let block = ConditionalBlock::with_color(condition.trim(), color, children);
    let id = block.id.clone();
    nodes.insert(range.start, Node::Conditional(block));
    Some(id)
}

pub fn find_block<'a>(nodes: &'a [Node], id: &str) -> Option<&'a ConditionalBlock> {
    for node in nodes {
        match node {
            Node::Conditional(block) if block.id == id => return Some(block),
            Node::Text(_) => {}
            other => {
                if let Some(found) = find_block(other.children(), id) {
                    return Some(found);
                }
            }
        }
    }
    None
}

pub fn find_block_mut<'a>(nodes: &'a mut [Node], id: &str) -> Option<&'a mut ConditionalBlock> {
    for node in nodes {
        match node {
            Node::Conditional(block) => {
                if block.id == id {
                    return Some(block);
                }
                if let Some(found) = find_block_mut(&mut block.children, id) {
                    return Some(found);
                }
            }
            Node::Element(el) => {
                if let Some(found) = find_block_mut(&mut el.children, id) {
                    return Some(found);
                }
            }
            Node::Text(_) => {}
        }
    }
    None
}

/// Replace the condition of block `id`. Blank conditions are refused.
pub fn set_condition(nodes: &mut [Node], id: &str, condition: &str) -> bool {
    let condition = condition.trim();
    if condition.is_empty() {
        return false;
    }
    match find_block_mut(nodes, id) {
        Some(block) => {
            block.condition = condition.to_string();
            true
        }
        None => false,
    }
}

/// Remove block `id`, keeping its content in place.
pub fn unwrap_block(nodes: &mut Vec<Node>, id: &str) -> bool {
    let position = nodes
        .iter()
        .position(|node| matches!(node, Node::Conditional(block) if block.id == id));

    if let Some(pos) = position {
        if let Node::Conditional(block) = nodes.remove(pos) {
            nodes.splice(pos..pos, block.children);
        }
        *nodes = merge_text_runs(std::mem::take(nodes));
        return true;
    }

    nodes.iter_mut().any(|node| match node {
        Node::Element(el) => unwrap_block(&mut el.children, id),
        Node::Conditional(block) => unwrap_block(&mut block.children, id),
        Node::Text(_) => false,
    })
}

/// Cycles through the configured colors for new blocks.
#[derive(Debug, Clone)]
pub struct BlockPalette {
    colors: Vec<String>,
    next: usize,
}

impl BlockPalette {
    pub fn new(colors: Vec<String>) -> Self {
        Self { colors, next: 0 }
    }

    pub fn from_config(config: &EditorConfig) -> Self {
        Self::new(config.block_palette.clone())
    }

    pub fn next_color(&mut self) -> String {
        if self.colors.is_empty() {
            return DEFAULT_BLOCK_COLOR.to_string();
        }
        let color = self.colors[self.next % self.colors.len()].clone();
        self.next = (self.next + 1) % self.colors.len();
        color
    }
}

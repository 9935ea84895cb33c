//! Flattened text index
//!
//! A rendering is a sequence of text nodes. The index records where each node
//! starts in the plain text, so a (node, offset) pair from a selection maps to
//! an absolute character offset no matter how the nodes are wrapped in markup.

use crate::render::Segment;

/// Reference to one text node of a specific rendering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeRef {
    generation: u64,
    index: usize,
}

impl NodeRef {
    /// Rendering this node belongs to
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Position of the node in document order
    pub fn index(&self) -> usize {
        self.index
    }
}

/// A node's place in the plain text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextNode {
    pub start: usize,
    pub len: usize,
}

/// Text nodes of one rendering with their absolute offsets
#[derive(Debug, Clone, Default)]
pub struct TextIndex {
    generation: u64,
    nodes: Vec<TextNode>,
    len: usize,
}

impl TextIndex {
    /// Build from node lengths (in characters), in document order
    pub fn from_lengths(generation: u64, lengths: impl IntoIterator<Item = usize>) -> Self {
        let mut nodes = Vec::new();
        let mut position = 0;
        for len in lengths {
            nodes.push(TextNode {
                start: position,
                len,
            });
            position += len;
        }
        Self {
            generation,
            nodes,
            len: position,
        }
    }

    /// One node per rendered segment
    pub fn from_segments(generation: u64, segments: &[Segment]) -> Self {
        Self::from_lengths(generation, segments.iter().map(Segment::len))
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Total characters across all nodes
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn nodes(&self) -> &[TextNode] {
        &self.nodes
    }

    /// Reference to the node at `index`, if it exists in this rendering
    pub fn node(&self, index: usize) -> Option<NodeRef> {
        (index < self.nodes.len()).then_some(NodeRef {
            generation: self.generation,
            index,
        })
    }

    /// Absolute character offset of `offset` within `node`.
    ///
    /// `None` when the node belongs to another rendering, does not exist, or
    /// the offset runs past the node's end.
    pub fn resolve_position(&self, node: NodeRef, offset: usize) -> Option<usize> {
        if node.generation != self.generation {
            tracing::debug!(
                "Stale node reference from rendering {} (current {})",
                node.generation,
                self.generation
            );
            return None;
        }
        let text_node = self.nodes.get(node.index)?;
        if offset > text_node.len {
            return None;
        }
        Some(text_node.start + offset)
    }

    /// Node and local offset holding an absolute position.
    ///
    /// A position on a boundary belongs to the node that starts there; the end
    /// of the text belongs to the last node.
    pub fn locate(&self, position: usize) -> Option<(NodeRef, usize)> {
        if position > self.len || self.nodes.is_empty() {
            return None;
        }
        let idx = self
            .nodes
            .partition_point(|n| n.start + n.len <= position)
            .min(self.nodes.len() - 1);
        let node = self.nodes[idx];
        Some((
            NodeRef {
                generation: self.generation,
                index: idx,
            },
            position - node.start,
        ))
    }
}

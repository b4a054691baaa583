//! Arena-backed clade tree.
//!
//! Nodes own their children through arena indices; the parent link is a
//! plain index and never an ownership edge.

use std::collections::VecDeque;

use generational_arena::{Arena, Index};
use tracing::instrument;

use crate::domain::entities::CladeData;

/// Tree node in the arena-based hierarchy structure.
#[derive(Debug)]
pub struct CladeNode {
    pub data: CladeData,
    /// Index of parent node in the arena, None for the root
    pub parent: Option<Index>,
    /// Indices of child nodes in document order
    pub children: Vec<Index>,
}

impl CladeNode {
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}

/// One phylogenetic tree with a single root.
#[derive(Debug)]
pub struct CladeTree {
    arena: Arena<CladeNode>,
    root: Option<Index>,
}

impl Default for CladeTree {
    fn default() -> Self {
        Self::new()
    }
}

impl CladeTree {
    pub fn new() -> Self {
        Self {
            arena: Arena::new(),
            root: None,
        }
    }

    /// Create a tree holding a single root node.
    pub fn with_root(data: CladeData) -> (Self, Index) {
        let mut tree = Self::new();
        let root = tree.insert_node(data, None);
        (tree, root)
    }

    /// Insert a node. A node without parent becomes the root if none is set yet.
    #[instrument(level = "trace", skip(self, data))]
    pub fn insert_node(&mut self, data: CladeData, parent: Option<Index>) -> Index {
        let node = CladeNode {
            data,
            parent,
            children: Vec::new(),
        };
        let node_idx = self.arena.insert(node);

        if let Some(parent_idx) = parent {
            if let Some(parent) = self.arena.get_mut(parent_idx) {
                parent.children.push(node_idx);
            }
        } else if self.root.is_none() {
            self.root = Some(node_idx);
        }

        node_idx
    }

    pub fn get_node(&self, idx: Index) -> Option<&CladeNode> {
        self.arena.get(idx)
    }

    pub fn get_node_mut(&mut self, idx: Index) -> Option<&mut CladeNode> {
        self.arena.get_mut(idx)
    }

    pub fn root(&self) -> Option<Index> {
        self.root
    }

    pub fn root_node(&self) -> Option<&CladeNode> {
        self.root.and_then(|idx| self.arena.get(idx))
    }

    /// Number of nodes in the tree.
    pub fn len(&self) -> usize {
        self.arena.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }

    pub fn is_leaf(&self, idx: Index) -> bool {
        self.get_node(idx).is_some_and(CladeNode::is_leaf)
    }

    /// Pre-order traversal, children left to right.
    pub fn iter(&self) -> TreeIterator<'_> {
        TreeIterator::new(self)
    }

    /// Breadth-first traversal starting at the root.
    pub fn iter_bfs(&self) -> BreadthFirstIterator<'_> {
        BreadthFirstIterator::new(self)
    }

    /// Height of the tree in nodes (a lone root has depth 1).
    #[instrument(level = "debug", skip(self))]
    pub fn depth(&self) -> usize {
        if let Some(root) = self.root {
            self.calculate_depth(root)
        } else {
            0
        }
    }

    fn calculate_depth(&self, node_idx: Index) -> usize {
        if let Some(node) = self.get_node(node_idx) {
            1 + node
                .children
                .iter()
                .map(|&child| self.calculate_depth(child))
                .max()
                .unwrap_or(0)
        } else {
            0
        }
    }

    /// Names of all leaves in document order.
    pub fn leaf_names(&self) -> Vec<String> {
        self.iter()
            .filter(|(_, node)| node.is_leaf())
            .map(|(_, node)| node.data.name.clone())
            .collect()
    }

    /// Names of the direct children of `idx`.
    pub fn child_names(&self, idx: Index) -> Vec<String> {
        self.get_node(idx)
            .map(|node| {
                node.children
                    .iter()
                    .filter_map(|&c| self.get_node(c))
                    .map(|c| c.data.name.clone())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Move every node of `donor` under `parent`, keeping the donor's shape.
    /// The donor is consumed.
    #[instrument(level = "trace", skip(self, donor))]
    pub fn graft(&mut self, parent: Index, mut donor: CladeTree) {
        if let Some(donor_root) = donor.root {
            self.adopt(&mut donor.arena, donor_root, parent);
        }
    }

    /// Move the children of `from` (a node of `donor`) under `parent`.
    /// `from` itself and everything above it are dropped with the donor.
    #[instrument(level = "trace", skip(self, donor))]
    pub fn graft_children(&mut self, parent: Index, mut donor: CladeTree, from: Index) {
        let children = match donor.arena.get(from) {
            Some(node) => node.children.clone(),
            None => return,
        };
        for child in children {
            self.adopt(&mut donor.arena, child, parent);
        }
    }

    fn adopt(&mut self, donor: &mut Arena<CladeNode>, donor_idx: Index, parent: Index) {
        let Some(node) = donor.remove(donor_idx) else {
            return;
        };
        let idx = self.insert_node(node.data, Some(parent));
        for child in node.children {
            self.adopt(donor, child, idx);
        }
    }
}

pub struct TreeIterator<'a> {
    tree: &'a CladeTree,
    stack: Vec<Index>,
}

impl<'a> TreeIterator<'a> {
    fn new(tree: &'a CladeTree) -> Self {
        let mut stack = Vec::new();
        if let Some(root) = tree.root() {
            stack.push(root);
        }
        Self { tree, stack }
    }
}

impl<'a> Iterator for TreeIterator<'a> {
    type Item = (Index, &'a CladeNode);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(current_idx) = self.stack.pop() {
            if let Some(node) = self.tree.get_node(current_idx) {
                // Push children in reverse order for left-to-right traversal
                for &child in node.children.iter().rev() {
                    self.stack.push(child);
                }
                return Some((current_idx, node));
            }
        }
        None
    }
}

pub struct BreadthFirstIterator<'a> {
    tree: &'a CladeTree,
    queue: VecDeque<Index>,
}

impl<'a> BreadthFirstIterator<'a> {
    fn new(tree: &'a CladeTree) -> Self {
        let mut queue = VecDeque::new();
        if let Some(root) = tree.root() {
            queue.push_back(root);
        }
        Self { tree, queue }
    }
}

impl<'a> Iterator for BreadthFirstIterator<'a> {
    type Item = (Index, &'a CladeNode);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(current_idx) = self.queue.pop_front() {
            if let Some(node) = self.tree.get_node(current_idx) {
                self.queue.extend(node.children.iter().copied());
                return Some((current_idx, node));
            }
        }
        None
    }
}

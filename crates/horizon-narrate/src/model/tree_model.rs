//! Hierarchical tree model with lazy children and a flattened visible sequence.
//!
//! `TreeModel` stores every node of a menu in a single arena. Parents and
//! children refer to each other by [`NodeId`], so the parent link is plain
//! navigation data and dropping the model frees the whole forest.
//!
//! The model also owns the *visible sequence*: the depth-first flattening of
//! every node whose ancestors are all expanded. It is recomputed from scratch
//! by [`TreeModel::rebuild_visible`] after any structural or expansion change
//! and is never patched incrementally.

use horizon_narrate_core::PerfSpan;
use horizon_narrate_core::logging::{span_names, targets};
use slotmap::SlotMap;

use super::node::{NodeId, NodeSpec, SpecChildren, TreeNode};
use crate::error::ProviderError;

/// Result of asking a node to produce its children.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Materialized {
    /// Children were already present; nothing ran.
    Present(usize),
    /// The loader ran and produced this many children.
    Loaded(usize),
    /// The node turned out to have no children and is now terminal.
    Empty,
}

impl Materialized {
    /// Number of children now present.
    pub fn child_count(self) -> usize {
        match self {
            Self::Present(n) | Self::Loaded(n) => n,
            Self::Empty => 0,
        }
    }
}

/// An arena-backed forest of navigable nodes.
///
/// # Example
///
/// ```
/// use horizon_narrate::model::{NodeSpec, TreeModel};
///
/// let mut model = TreeModel::from_specs(vec![
///     NodeSpec::branch("A", vec![NodeSpec::leaf("A1"), NodeSpec::leaf("A2")]),
///     NodeSpec::leaf("B"),
/// ]);
/// assert_eq!(model.visible_len(), 2);
///
/// let a = model.roots()[0];
/// model.set_expanded(a, true);
/// model.rebuild_visible();
/// assert_eq!(model.visible_labels(), vec!["A", "A1", "A2", "B"]);
/// ```
#[derive(Debug, Default)]
pub struct TreeModel {
    nodes: SlotMap<NodeId, TreeNode>,
    roots: Vec<NodeId>,
    visible: Vec<NodeId>,
}

impl TreeModel {
    /// Creates a new empty tree model.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a model holding `specs` as top-level nodes.
    pub fn from_specs(specs: Vec<NodeSpec>) -> Self {
        let mut model = Self::new();
        model.set_roots(specs);
        model
    }

    /// Replaces the entire forest with `specs`.
    pub fn set_roots(&mut self, specs: Vec<NodeSpec>) {
        self.clear();
        for spec in &specs {
            self.insert(None, spec);
        }
        self.rebuild_visible();
    }

    /// Removes every node.
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.roots.clear();
        self.visible.clear();
    }

    /// Adds a child to `parent`, making the parent expandable.
    ///
    /// Returns `None` if the parent doesn't exist. The visible sequence is
    /// not rebuilt.
    pub fn add_child(&mut self, parent: NodeId, spec: &NodeSpec) -> Option<NodeId> {
        let node = self.nodes.get_mut(parent)?;
        node.expandable = true;
        node.materialized = true;
        node.loader = None;
        Some(self.insert(Some(parent), spec))
    }

    fn insert(&mut self, parent: Option<NodeId>, spec: &NodeSpec) -> NodeId {
        let depth = match parent {
            Some(parent_id) => self.nodes.get(parent_id).map_or(0, |p| p.depth + 1),
            None => 0,
        };
        let id = self.nodes.insert(TreeNode::from_spec(spec, parent, depth));

        match parent.and_then(|parent_id| self.nodes.get_mut(parent_id)) {
            Some(parent_node) => parent_node.children.push(id),
            None => self.roots.push(id),
        }

        if let SpecChildren::Static(children) = &spec.children {
            for child in children {
                self.insert(Some(id), child);
            }
        }
        id
    }

    /// Removes a node and all its descendants.
    ///
    /// Returns `false` if the node doesn't exist. A parent left without
    /// children becomes terminal. The visible sequence is not rebuilt.
    pub fn remove(&mut self, id: NodeId) -> bool {
        let Some(node) = self.nodes.get(id) else {
            return false;
        };

        match node.parent {
            Some(parent_id) => {
                if let Some(parent) = self.nodes.get_mut(parent_id) {
                    parent.children.retain(|&child| child != id);
                    if parent.children.is_empty() {
                        parent.demote();
                    }
                }
            }
            None => self.roots.retain(|&root| root != id),
        }

        self.remove_subtree(id);
        true
    }

    fn remove_subtree(&mut self, id: NodeId) {
        if let Some(node) = self.nodes.remove(id) {
            for child in node.children {
                self.remove_subtree(child);
            }
        }
    }

    /// Looks up a node.
    pub fn node(&self, id: NodeId) -> Option<&TreeNode> {
        self.nodes.get(id)
    }

    /// Top-level nodes in display order.
    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    /// Returns `true` if the model has no nodes.
    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    /// Total number of materialized nodes.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Children of `parent`, or the top-level nodes for `None`.
    pub fn children_of(&self, parent: Option<NodeId>) -> &[NodeId] {
        match parent {
            None => &self.roots,
            Some(id) => self
                .nodes
                .get(id)
                .map(|n| n.children.as_slice())
                .unwrap_or(&[]),
        }
    }

    /// The parent of a node.
    pub fn parent_of(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.get(id).and_then(|n| n.parent)
    }

    /// The sibling set of a node: its parent's children, or the roots.
    pub fn siblings_of(&self, id: NodeId) -> &[NodeId] {
        self.children_of(self.parent_of(id))
    }

    /// `(1-based position, sibling count)` of a node among its siblings.
    pub fn sibling_position(&self, id: NodeId) -> Option<(usize, usize)> {
        let siblings = self.siblings_of(id);
        siblings
            .iter()
            .position(|&sibling| sibling == id)
            .map(|row| (row + 1, siblings.len()))
    }

    /// The closest ancestor that is expandable.
    pub fn nearest_expandable_ancestor(&self, id: NodeId) -> Option<NodeId> {
        let mut current = self.parent_of(id);
        while let Some(ancestor) = current {
            if self.nodes.get(ancestor).is_some_and(|n| n.expandable) {
                return Some(ancestor);
            }
            current = self.parent_of(ancestor);
        }
        None
    }

    /// Labels from the top-level ancestor down to `id`.
    pub fn label_path(&self, id: NodeId) -> Vec<String> {
        let mut path = Vec::new();
        let mut current = Some(id);
        while let Some(node_id) = current {
            let Some(node) = self.nodes.get(node_id) else {
                break;
            };
            path.push(node.label.clone());
            current = node.parent;
        }
        path.reverse();
        path
    }

    /// Finds a materialized node by its label path.
    ///
    /// Among siblings with equal labels the first one wins.
    pub fn find_by_label_path<S: AsRef<str>>(&self, path: &[S]) -> Option<NodeId> {
        let mut parent = None;
        let mut found = None;
        for label in path {
            let id = self
                .children_of(parent)
                .iter()
                .copied()
                .find(|&child| self.nodes.get(child).is_some_and(|n| n.label == label.as_ref()))?;
            parent = Some(id);
            found = Some(id);
        }
        found
    }

    /// Label paths of every expanded node, parents before children.
    pub fn expanded_paths(&self) -> Vec<Vec<String>> {
        let mut paths = Vec::new();
        let mut stack: Vec<NodeId> = self.roots.iter().rev().copied().collect();
        while let Some(id) = stack.pop() {
            let Some(node) = self.nodes.get(id) else {
                continue;
            };
            if node.expanded {
                paths.push(self.label_path(id));
                stack.extend(node.children.iter().rev().copied());
            }
        }
        paths
    }

    /// Ensures a node's children exist, running its lazy loader at most once.
    ///
    /// A loader that fails, or that produces no children, demotes the node to
    /// terminal for the rest of the session. Failures are logged on the
    /// provider target and returned to the caller.
    pub fn materialize(&mut self, id: NodeId) -> Result<Materialized, ProviderError> {
        let Some(node) = self.nodes.get(id) else {
            return Ok(Materialized::Empty);
        };
        if !node.expandable {
            return Ok(Materialized::Empty);
        }
        if node.materialized {
            return Ok(Materialized::Present(node.children.len()));
        }
        let Some(loader) = node.loader.clone() else {
            return Ok(Materialized::Present(node.children.len()));
        };

        let specs = match loader() {
            Ok(specs) => specs,
            Err(err) => {
                tracing::warn!(
                    target: targets::PROVIDER,
                    label = %node_label(&self.nodes, id),
                    error = %err,
                    "child loader failed; node demoted to terminal"
                );
                if let Some(node) = self.nodes.get_mut(id) {
                    node.demote();
                }
                return Err(err);
            }
        };

        // Guard against a loader that populated children some other way.
        if let Some(node) = self.nodes.get_mut(id) {
            node.materialized = true;
            node.loader = None;
            if !node.children.is_empty() {
                return Ok(Materialized::Present(node.children.len()));
            }
        }

        for spec in &specs {
            self.insert(Some(id), spec);
        }

        if specs.is_empty() {
            tracing::debug!(
                target: targets::TREE,
                label = %node_label(&self.nodes, id),
                "loader produced no children; node is terminal"
            );
            if let Some(node) = self.nodes.get_mut(id) {
                node.demote();
            }
            return Ok(Materialized::Empty);
        }

        tracing::trace!(target: targets::TREE, count = specs.len(), "materialized children");
        Ok(Materialized::Loaded(specs.len()))
    }

    /// Sets a node's expanded flag.
    ///
    /// Only expandable nodes can be expanded. Returns `true` if the flag
    /// changed. The visible sequence is not rebuilt.
    pub fn set_expanded(&mut self, id: NodeId, expanded: bool) -> bool {
        match self.nodes.get_mut(id) {
            Some(node) if node.expandable && node.expanded != expanded => {
                node.expanded = expanded;
                true
            }
            _ => false,
        }
    }

    /// Recomputes the visible sequence from scratch.
    pub fn rebuild_visible(&mut self) {
        let _span = PerfSpan::new(span_names::REBUILD);
        let mut visible = Vec::with_capacity(self.visible.len());
        let mut stack: Vec<NodeId> = self.roots.iter().rev().copied().collect();
        while let Some(id) = stack.pop() {
            let Some(node) = self.nodes.get(id) else {
                continue;
            };
            visible.push(id);
            if node.expanded {
                stack.extend(node.children.iter().rev().copied());
            }
        }
        self.visible = visible;
    }

    /// The visible sequence.
    pub fn visible(&self) -> &[NodeId] {
        &self.visible
    }

    /// Length of the visible sequence.
    pub fn visible_len(&self) -> usize {
        self.visible.len()
    }

    /// The node at a visible index.
    pub fn visible_at(&self, index: usize) -> Option<NodeId> {
        self.visible.get(index).copied()
    }

    /// The visible index of a node, if it is visible.
    pub fn visible_index_of(&self, id: NodeId) -> Option<usize> {
        self.visible.iter().position(|&visible| visible == id)
    }

    /// Labels of the visible sequence, in order.
    pub fn visible_labels(&self) -> Vec<&str> {
        self.visible
            .iter()
            .filter_map(|&id| self.nodes.get(id).map(|n| n.label.as_str()))
            .collect()
    }
}

fn node_label(nodes: &SlotMap<NodeId, TreeNode>, id: NodeId) -> &str {
    nodes.get(id).map_or("", |n| n.label.as_str())
}

static_assertions::assert_impl_all!(TreeModel: Send, Sync);

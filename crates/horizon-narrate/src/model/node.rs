//! Tree nodes and the declarative specs providers build them from.

use std::fmt;
use std::sync::Arc;

use slotmap::new_key_type;

use crate::error::ProviderError;

new_key_type! {
    /// Handle to a node stored in a [`TreeModel`](super::TreeModel) arena.
    ///
    /// Handles stay valid until the node (or one of its ancestors) is removed
    /// or the model is rebuilt.
    pub struct NodeId;
}

/// Lazily produces the children of a node the first time it is expanded.
pub type ChildLoader = Arc<dyn Fn() -> Result<Vec<NodeSpec>, ProviderError> + Send + Sync>;

/// Leaf action invoked when the user activates a node (Enter); says whether
/// the menu must rebuild.
pub type ActivateFn = Arc<dyn Fn() -> Result<ActionOutcome, ProviderError> + Send + Sync>;

/// Delete handler; mutates provider state and says whether to rebuild.
pub type DeleteFn = Arc<dyn Fn() -> Result<ActionOutcome, ProviderError> + Send + Sync>;

/// What a leaf action or delete handler did to the provider's data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionOutcome {
    /// Provider state changed; the menu must rebuild its nodes.
    Rebuild,
    /// Nothing changed that the menu shows.
    Unchanged,
}

/// Expansion state of a single node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpansionState {
    /// No children, now or ever in this session.
    Terminal,
    /// Has (or may lazily have) children that are hidden.
    Collapsed,
    /// Children are materialized and visible.
    Expanded,
}

/// Where a spec's children come from.
#[derive(Clone, Default)]
pub(crate) enum SpecChildren {
    #[default]
    None,
    Static(Vec<NodeSpec>),
    Lazy(ChildLoader),
}

/// Declarative description of a node, produced by data providers.
///
/// # Example
///
/// ```
/// use horizon_narrate::model::NodeSpec;
///
/// let gear = NodeSpec::branch(
///     "Apparel",
///     vec![NodeSpec::leaf("Duster"), NodeSpec::leaf("Cowboy hat")],
/// );
/// let needs = NodeSpec::lazy("Needs", || {
///     Ok(vec![NodeSpec::leaf("Food: 80%"), NodeSpec::leaf("Rest: 45%")])
/// });
/// assert_eq!(gear.label(), "Apparel");
/// assert!(needs.is_lazy());
/// ```
#[derive(Clone)]
pub struct NodeSpec {
    pub(crate) label: String,
    pub(crate) children: SpecChildren,
    pub(crate) on_activate: Option<ActivateFn>,
    pub(crate) on_delete: Option<DeleteFn>,
}

impl NodeSpec {
    /// A node without children.
    pub fn leaf(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            children: SpecChildren::None,
            on_activate: None,
            on_delete: None,
        }
    }

    /// A node whose children are known up front.
    ///
    /// An empty `children` list yields a terminal node.
    pub fn branch(label: impl Into<String>, children: Vec<NodeSpec>) -> Self {
        Self {
            children: SpecChildren::Static(children),
            ..Self::leaf(label)
        }
    }

    /// A node whose children are produced by `loader` on first expansion.
    pub fn lazy<F>(label: impl Into<String>, loader: F) -> Self
    where
        F: Fn() -> Result<Vec<NodeSpec>, ProviderError> + Send + Sync + 'static,
    {
        Self {
            children: SpecChildren::Lazy(Arc::new(loader)),
            ..Self::leaf(label)
        }
    }

    /// Attach a leaf action, run when the node is activated.
    ///
    /// Return [`ActionOutcome::Rebuild`] when the action changed anything the
    /// menu shows, such as a label.
    pub fn with_action<F>(mut self, action: F) -> Self
    where
        F: Fn() -> Result<ActionOutcome, ProviderError> + Send + Sync + 'static,
    {
        self.on_activate = Some(Arc::new(action));
        self
    }

    /// Attach a delete handler.
    pub fn with_delete<F>(mut self, handler: F) -> Self
    where
        F: Fn() -> Result<ActionOutcome, ProviderError> + Send + Sync + 'static,
    {
        self.on_delete = Some(Arc::new(handler));
        self
    }

    /// Append a static child, turning a leaf into a branch.
    ///
    /// Has no effect on lazy nodes, whose children belong to their loader.
    pub fn with_child(mut self, child: NodeSpec) -> Self {
        match &mut self.children {
            SpecChildren::None => self.children = SpecChildren::Static(vec![child]),
            SpecChildren::Static(children) => children.push(child),
            SpecChildren::Lazy(_) => {}
        }
        self
    }

    /// The display label.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Whether children are loaded on demand.
    pub fn is_lazy(&self) -> bool {
        matches!(self.children, SpecChildren::Lazy(_))
    }
}

impl fmt::Debug for NodeSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let children = match &self.children {
            SpecChildren::None => "none".to_string(),
            SpecChildren::Static(children) => format!("{} static", children.len()),
            SpecChildren::Lazy(_) => "lazy".to_string(),
        };
        f.debug_struct("NodeSpec")
            .field("label", &self.label)
            .field("children", &children)
            .field("on_activate", &self.on_activate.is_some())
            .field("on_delete", &self.on_delete.is_some())
            .finish()
    }
}

/// A node stored in the tree arena.
pub struct TreeNode {
    pub(crate) label: String,
    pub(crate) depth: usize,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
    pub(crate) expandable: bool,
    pub(crate) expanded: bool,
    pub(crate) materialized: bool,
    pub(crate) loader: Option<ChildLoader>,
    pub(crate) on_activate: Option<ActivateFn>,
    pub(crate) on_delete: Option<DeleteFn>,
}

impl TreeNode {
    pub(crate) fn from_spec(
        spec: &NodeSpec,
        parent: Option<NodeId>,
        depth: usize,
    ) -> Self {
        let (expandable, loader) = match &spec.children {
            SpecChildren::None => (false, None),
            SpecChildren::Static(children) => (!children.is_empty(), None),
            SpecChildren::Lazy(loader) => (true, Some(loader.clone())),
        };
        Self {
            label: spec.label.clone(),
            depth,
            parent,
            children: Vec::new(),
            expandable,
            expanded: false,
            // Static children are inserted eagerly by the model.
            materialized: loader.is_none(),
            loader,
            on_activate: spec.on_activate.clone(),
            on_delete: spec.on_delete.clone(),
        }
    }

    /// The display label.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Nesting depth; top-level nodes are at depth 0.
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// The parent node, or `None` for top-level nodes.
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Materialized children in display order.
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// Whether the node has (or may lazily have) children.
    pub fn is_expandable(&self) -> bool {
        self.expandable
    }

    /// Whether the node is currently expanded.
    pub fn is_expanded(&self) -> bool {
        self.expanded
    }

    /// Whether children have been produced (always true for static nodes).
    pub fn is_materialized(&self) -> bool {
        self.materialized
    }

    /// Whether the node carries a leaf action.
    pub fn has_action(&self) -> bool {
        self.on_activate.is_some()
    }

    /// Whether the node can be deleted.
    pub fn is_deletable(&self) -> bool {
        self.on_delete.is_some()
    }

    /// The node's expansion state.
    pub fn state(&self) -> ExpansionState {
        if !self.expandable {
            ExpansionState::Terminal
        } else if self.expanded {
            ExpansionState::Expanded
        } else {
            ExpansionState::Collapsed
        }
    }

    /// Drop to terminal for the rest of the session.
    pub(crate) fn demote(&mut self) {
        self.expandable = false;
        self.expanded = false;
        self.materialized = true;
        self.loader = None;
    }
}

impl fmt::Debug for TreeNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TreeNode")
            .field("label", &self.label)
            .field("depth", &self.depth)
            .field("state", &self.state())
            .field("children", &self.children.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_branch_is_terminal() {
        let node = TreeNode::from_spec(&NodeSpec::branch("Empty", Vec::new()), None, 0);
        assert_eq!(node.state(), ExpansionState::Terminal);
    }

    #[test]
    fn test_lazy_node_starts_collapsed_and_unmaterialized() {
        let spec = NodeSpec::lazy("Skills", || Ok(Vec::new()));
        let node = TreeNode::from_spec(&spec, None, 2);
        assert_eq!(node.state(), ExpansionState::Collapsed);
        assert!(!node.is_materialized());
        assert_eq!(node.depth(), 2);
    }

    #[test]
    fn test_with_child_promotes_leaf() {
        let spec = NodeSpec::leaf("Pawn").with_child(NodeSpec::leaf("Health"));
        let node = TreeNode::from_spec(&spec, None, 0);
        assert!(node.is_expandable());
        assert!(!node.has_action());
    }

    #[test]
    fn test_demote() {
        let spec = NodeSpec::lazy("Broken", || Err(ProviderError::new("gone")));
        let mut node = TreeNode::from_spec(&spec, None, 0);
        node.expanded = true;
        node.demote();
        assert_eq!(node.state(), ExpansionState::Terminal);
        assert!(node.loader.is_none());
    }
}

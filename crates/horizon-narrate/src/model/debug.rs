//! Text dumps of a [`TreeModel`] for diagnostics.
//!
//! Sighted developers debugging a menu need to see what the screen-reader
//! user is walking through. [`TreeDebug`] renders the forest with expansion
//! markers and an optional cursor marker:
//!
//! ```text
//! [-] Colonists
//! ├── [ ] Ari
//! └── [+] Rex  <
//! [ ] Animals
//! ```

use super::node::{ExpansionState, NodeId};
use super::tree_model::TreeModel;

/// Style options for tree visualization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TreeStyle {
    /// ASCII characters for tree branches.
    Ascii,
    /// Unicode box-drawing characters.
    #[default]
    Unicode,
    /// Compact single-line indentation.
    Compact,
}

/// Configuration for tree debug output.
#[derive(Debug, Clone)]
pub struct TreeFormatOptions {
    /// The style of tree visualization.
    pub style: TreeStyle,
    /// Whether to prefix nodes with `[+]`, `[-]` or `[ ]`.
    pub show_state: bool,
    /// Whether to walk into collapsed but materialized children.
    pub include_hidden: bool,
    /// Maximum depth to traverse (None for unlimited).
    pub max_depth: Option<usize>,
    /// Indent size for each level.
    pub indent_size: usize,
}

impl Default for TreeFormatOptions {
    fn default() -> Self {
        Self {
            style: TreeStyle::default(),
            show_state: true,
            include_hidden: false,
            max_depth: None,
            indent_size: 2,
        }
    }
}

impl TreeFormatOptions {
    /// Everything that is materialized, visible or not.
    pub fn detailed() -> Self {
        Self {
            include_hidden: true,
            ..Default::default()
        }
    }

    /// Labels only.
    pub fn minimal() -> Self {
        Self {
            show_state: false,
            ..Default::default()
        }
    }
}

/// Debug utility for visualizing navigation trees.
#[derive(Debug, Clone, Default)]
pub struct TreeDebug {
    options: TreeFormatOptions,
}

impl TreeDebug {
    /// Create a debug visualizer with default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a debug visualizer with custom options.
    pub fn with_options(options: TreeFormatOptions) -> Self {
        Self { options }
    }

    /// Format the whole forest, marking `cursor` if given.
    pub fn format(&self, model: &TreeModel, cursor: Option<NodeId>) -> String {
        let mut output = String::new();
        if model.is_empty() {
            output.push_str("(empty)\n");
            return output;
        }
        for &root in model.roots() {
            self.format_subtree_into(model, root, 0, true, cursor, &mut output);
        }
        output
    }

    fn format_subtree_into(
        &self,
        model: &TreeModel,
        id: NodeId,
        depth: usize,
        is_last: bool,
        cursor: Option<NodeId>,
        output: &mut String,
    ) {
        if self.options.max_depth.is_some_and(|max| depth > max) {
            return;
        }
        let Some(node) = model.node(id) else {
            return;
        };

        output.push_str(&self.build_prefix(depth, is_last));
        if self.options.show_state {
            output.push_str(match node.state() {
                ExpansionState::Terminal => "[ ] ",
                ExpansionState::Collapsed => "[+] ",
                ExpansionState::Expanded => "[-] ",
            });
        }
        output.push_str(node.label());
        if cursor == Some(id) {
            output.push_str("  <");
        }
        output.push('\n');

        if !node.is_expanded() && !self.options.include_hidden {
            return;
        }
        let child_count = node.children().len();
        for (i, &child) in node.children().iter().enumerate() {
            self.format_subtree_into(model, child, depth + 1, i + 1 == child_count, cursor, output);
        }
    }

    fn build_prefix(&self, depth: usize, is_last: bool) -> String {
        if depth == 0 {
            return String::new();
        }

        let (branch, tee, corner) = match self.options.style {
            TreeStyle::Ascii => ("|", "+-- ", "`-- "),
            TreeStyle::Unicode => ("\u{2502}", "\u{251c}\u{2500}\u{2500} ", "\u{2514}\u{2500}\u{2500} "),
            TreeStyle::Compact => ("", "- ", "- "),
        };

        let mut prefix = String::new();
        for _ in 0..(depth - 1) {
            prefix.push_str(branch);
            prefix.extend(std::iter::repeat_n(' ', self.options.indent_size));
        }
        prefix.push_str(if is_last { corner } else { tee });
        prefix
    }
}

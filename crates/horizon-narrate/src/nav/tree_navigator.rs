//! Keyboard navigation over a [`TreeModel`].
//!
//! The navigator follows the WAI-ARIA tree view pattern:
//!
//! | Action   | On a collapsed node | On an expanded node | On a leaf           |
//! |----------|---------------------|---------------------|---------------------|
//! | Expand   | expand, stay        | move to first child | reject              |
//! | Collapse | move to parent      | collapse, stay      | move to parent      |
//!
//! Moving to the parent never collapses it. Expand and collapse are
//! structural changes and end any typeahead search; plain cursor movement
//! keeps it.

use horizon_narrate_core::logging::targets;

use super::{NavEvent, NavResult, wrap_next, wrap_previous};
use crate::announce::{ItemDescription, SearchContext};
use crate::error::Rejection;
use crate::model::{Materialized, NodeId, NodeSpec, TreeDebug, TreeModel, TreeNode};
use crate::search::{SearchStep, TypeaheadSearch};

/// Cursor, expansion and typeahead state for one tree menu.
///
/// # Example
///
/// ```
/// use horizon_narrate::model::NodeSpec;
/// use horizon_narrate::nav::{NavEvent, TreeNavigator};
///
/// let mut nav = TreeNavigator::new(vec![
///     NodeSpec::branch("A", vec![NodeSpec::leaf("A1"), NodeSpec::leaf("A2")]),
///     NodeSpec::leaf("B"),
/// ]);
///
/// assert_eq!(nav.expand(), Ok(NavEvent::Expanded));
/// assert_eq!(nav.cursor(), 0);
/// assert_eq!(nav.expand(), Ok(NavEvent::Moved));
/// assert_eq!(nav.current().map(|n| n.label()), Some("A1"));
/// ```
#[derive(Debug, Default)]
pub struct TreeNavigator {
    model: TreeModel,
    cursor: usize,
    search: TypeaheadSearch,
}

impl TreeNavigator {
    /// Creates a navigator over a fresh model built from `specs`.
    pub fn new(specs: Vec<NodeSpec>) -> Self {
        Self::from_model(TreeModel::from_specs(specs))
    }

    /// Creates a navigator over an existing model, cursor on the first item.
    pub fn from_model(mut model: TreeModel) -> Self {
        model.rebuild_visible();
        Self {
            model,
            cursor: 0,
            search: TypeaheadSearch::new(),
        }
    }

    /// The underlying model.
    pub fn model(&self) -> &TreeModel {
        &self.model
    }

    /// Index of the cursor in the visible sequence.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Whether there is nothing to navigate.
    pub fn is_empty(&self) -> bool {
        self.model.visible_len() == 0
    }

    /// The node under the cursor.
    pub fn current_node(&self) -> Option<NodeId> {
        self.model.visible_at(self.cursor)
    }

    /// The node data under the cursor.
    pub fn current(&self) -> Option<&TreeNode> {
        self.current_node().and_then(|id| self.model.node(id))
    }

    /// The typeahead state.
    pub fn search(&self) -> &TypeaheadSearch {
        &self.search
    }

    /// `(1-based position, sibling count)` of the current node.
    pub fn sibling_position(&self) -> Option<(usize, usize)> {
        self.current_node()
            .and_then(|id| self.model.sibling_position(id))
    }

    /// Everything needed to announce the current node.
    pub fn describe(&self) -> Option<ItemDescription<'_>> {
        let node = self.current()?;
        let (position, sibling_count) = self.sibling_position()?;
        let search = self
            .search
            .match_position(self.cursor)
            .filter(|_| self.search.is_active())
            .map(|(match_number, match_count)| SearchContext {
                buffer: self.search.buffer(),
                match_number,
                match_count,
            });
        Some(ItemDescription {
            label: node.label(),
            state: node.state(),
            position,
            sibling_count,
            depth: node.depth(),
            search,
        })
    }

    /// Moves the cursor to `index`, clamped to the visible sequence.
    pub fn set_cursor(&mut self, index: usize) -> NavEvent {
        let len = self.model.visible_len();
        if len == 0 {
            self.cursor = 0;
            return NavEvent::Unchanged;
        }
        self.move_to(index.min(len - 1))
    }

    fn move_to(&mut self, index: usize) -> NavEvent {
        self.cursor = index;
        tracing::trace!(target: targets::TREE, cursor = index, "cursor moved");
        NavEvent::Moved
    }

    /// Moves down one item, wrapping from the last to the first.
    pub fn select_next(&mut self) -> NavResult {
        let len = self.model.visible_len();
        if len == 0 {
            return Ok(NavEvent::Unchanged);
        }
        Ok(self.move_to(wrap_next(self.cursor, len)))
    }

    /// Moves up one item, wrapping from the first to the last.
    pub fn select_previous(&mut self) -> NavResult {
        let len = self.model.visible_len();
        if len == 0 {
            return Ok(NavEvent::Unchanged);
        }
        Ok(self.move_to(wrap_previous(self.cursor, len)))
    }

    /// Moves to the first visible item.
    pub fn jump_first(&mut self) -> NavResult {
        Ok(self.set_cursor(0))
    }

    /// Moves to the last visible item.
    pub fn jump_last(&mut self) -> NavResult {
        Ok(self.set_cursor(usize::MAX))
    }

    /// Expands the current node, or steps into it if already expanded.
    pub fn expand(&mut self) -> NavResult {
        let Some(id) = self.current_node() else {
            return Ok(NavEvent::Unchanged);
        };
        let Some(node) = self.model.node(id) else {
            return Ok(NavEvent::Unchanged);
        };
        if !node.is_expandable() {
            return Err(Rejection::CannotExpand);
        }

        if node.is_expanded() {
            return if node.children().is_empty() {
                Err(Rejection::CannotExpand)
            } else {
                Ok(self.move_to(self.cursor + 1))
            };
        }

        let label = node.label().to_string();
        let outcome = self.model.materialize(id);
        let result = match outcome {
            Ok(Materialized::Empty) => Err(Rejection::CannotExpand),
            Ok(_) => {
                self.model.set_expanded(id, true);
                Ok(NavEvent::Expanded)
            }
            Err(err) => Err(Rejection::provider_failed(label, &err)),
        };
        // Materializing may have demoted the node, so rebuild either way.
        self.restructure(id);
        result
    }

    /// Collapses the current node, or moves to its parent.
    pub fn collapse(&mut self) -> NavResult {
        let Some(id) = self.current_node() else {
            return Ok(NavEvent::Unchanged);
        };
        let Some(node) = self.model.node(id) else {
            return Ok(NavEvent::Unchanged);
        };

        if node.is_expanded() {
            self.model.set_expanded(id, false);
            self.restructure(id);
            return Ok(NavEvent::Collapsed);
        }

        let target = self
            .model
            .nearest_expandable_ancestor(id)
            .and_then(|ancestor| self.model.visible_index_of(ancestor));
        match target {
            Some(index) => Ok(self.move_to(index)),
            None => Err(Rejection::AtTopLevel),
        }
    }

    /// Expands every collapsed sibling of the current node.
    ///
    /// The cursor stays on the current node. Returns the number of
    /// siblings that were expanded.
    pub fn expand_all_siblings(&mut self) -> NavResult {
        let Some(id) = self.current_node() else {
            return Ok(NavEvent::Unchanged);
        };

        let siblings = self.model.siblings_of(id).to_vec();
        let expandable: Vec<NodeId> = siblings
            .into_iter()
            .filter(|&s| self.model.node(s).is_some_and(|n| n.is_expandable()))
            .collect();
        if expandable.is_empty() {
            return Err(Rejection::NoExpandableSiblings);
        }

        let collapsed: Vec<NodeId> = expandable
            .into_iter()
            .filter(|&s| self.model.node(s).is_some_and(|n| !n.is_expanded()))
            .collect();
        if collapsed.is_empty() {
            return Err(Rejection::AllSiblingsExpanded);
        }

        let mut count = 0;
        for sibling in collapsed {
            // Failures are logged by the model and demote the sibling.
            if let Ok(Materialized::Present(_) | Materialized::Loaded(_)) =
                self.model.materialize(sibling)
                && self.model.set_expanded(sibling, true)
            {
                count += 1;
            }
        }
        self.restructure(id);

        tracing::debug!(target: targets::TREE, count, "expanded siblings");
        if count == 0 {
            Err(Rejection::NoExpandableSiblings)
        } else {
            Ok(NavEvent::SiblingsExpanded(count))
        }
    }

    /// Expands a collapsed node, or runs a leaf action.
    pub fn activate(&mut self) -> NavResult {
        let Some(node) = self.current() else {
            return Ok(NavEvent::Unchanged);
        };

        if node.is_expandable() && !node.is_expanded() {
            return self.expand();
        }

        let Some(action) = node.on_activate.clone() else {
            return Err(Rejection::NothingToActivate);
        };
        let label = node.label().to_string();
        match action() {
            Ok(outcome) => {
                tracing::debug!(target: targets::TREE, label = %label, ?outcome, "activated");
                Ok(NavEvent::Activated(outcome))
            }
            Err(err) => {
                tracing::warn!(target: targets::PROVIDER, label = %label, error = %err, "leaf action failed");
                Err(Rejection::provider_failed(label, &err))
            }
        }
    }

    /// Runs the current node's delete handler.
    ///
    /// The navigator does not rebuild itself; when the handler reports
    /// [`ActionOutcome::Rebuild`](crate::model::ActionOutcome::Rebuild) the
    /// caller fetches fresh specs and calls [`rebuild`](Self::rebuild).
    pub fn delete(&mut self) -> NavResult {
        let Some(node) = self.current() else {
            return Ok(NavEvent::Unchanged);
        };
        let Some(handler) = node.on_delete.clone() else {
            return Err(Rejection::NotDeletable);
        };
        let label = node.label().to_string();
        match handler() {
            Ok(outcome) => {
                tracing::debug!(target: targets::TREE, label = %label, ?outcome, "deleted");
                Ok(NavEvent::Deleted(outcome))
            }
            Err(err) => {
                tracing::warn!(target: targets::PROVIDER, label = %label, error = %err, "delete handler failed");
                Err(Rejection::provider_failed(label, &err))
            }
        }
    }

    /// Appends a character to the typeahead buffer and jumps to a match.
    pub fn typeahead_char(&mut self, c: char) -> NavResult {
        if self.is_empty() {
            return Ok(NavEvent::Unchanged);
        }
        let labels = self.model.visible_labels();
        let index = self.search.push_char(c, &labels, self.cursor)?;
        self.cursor = index;
        Ok(NavEvent::SearchUpdated)
    }

    /// Removes the last character of the typeahead buffer.
    pub fn backspace(&mut self) -> NavResult {
        if self.is_empty() {
            return Ok(NavEvent::Unchanged);
        }
        let labels = self.model.visible_labels();
        match self.search.backspace(&labels, self.cursor)? {
            SearchStep::Matched(index) => {
                self.cursor = index;
                Ok(NavEvent::SearchUpdated)
            }
            SearchStep::Cleared => Ok(NavEvent::SearchCleared),
        }
    }

    /// Jumps to the next typeahead match, wrapping around.
    pub fn next_match(&mut self) -> NavResult {
        if !self.search.is_active() {
            return Err(Rejection::NoActiveSearch);
        }
        match self.search.next_match(self.cursor) {
            Some(index) => {
                self.cursor = index;
                Ok(NavEvent::SearchUpdated)
            }
            None => Err(Rejection::NoActiveSearch),
        }
    }

    /// Jumps to the previous typeahead match, wrapping around.
    pub fn previous_match(&mut self) -> NavResult {
        if !self.search.is_active() {
            return Err(Rejection::NoActiveSearch);
        }
        match self.search.previous_match(self.cursor) {
            Some(index) => {
                self.cursor = index;
                Ok(NavEvent::SearchUpdated)
            }
            None => Err(Rejection::NoActiveSearch),
        }
    }

    /// Ends the typeahead search. Returns whether one was active.
    pub fn clear_search(&mut self) -> bool {
        let active = self.search.is_active();
        self.search.clear();
        active
    }

    /// Replaces the forest with freshly built `specs`.
    ///
    /// Nodes are matched to their predecessors by label path. Expanded
    /// nodes stay expanded (lazy ones are loaded again), and the cursor
    /// returns to the same node, or else its nearest surviving ancestor,
    /// or else the same index clamped to the new sequence.
    pub fn rebuild(&mut self, specs: Vec<NodeSpec>) -> NavEvent {
        let expanded = self.model.expanded_paths();
        let cursor_path = self.current_node().map(|id| self.model.label_path(id));
        let old_cursor = self.cursor;

        self.model.set_roots(specs);
        for path in &expanded {
            let Some(id) = self.model.find_by_label_path(path) else {
                continue;
            };
            if let Ok(Materialized::Present(_) | Materialized::Loaded(_)) =
                self.model.materialize(id)
            {
                self.model.set_expanded(id, true);
            }
        }
        self.model.rebuild_visible();
        self.search.clear();

        let restored = cursor_path.and_then(|path| {
            (1..=path.len()).rev().find_map(|len| {
                self.model
                    .find_by_label_path(&path[..len])
                    .and_then(|id| self.model.visible_index_of(id))
            })
        });
        let len = self.model.visible_len();
        self.cursor = match restored {
            Some(index) => index,
            None => old_cursor.min(len.saturating_sub(1)),
        };

        tracing::debug!(
            target: targets::TREE,
            visible = len,
            cursor = self.cursor,
            restored = restored.is_some(),
            "rebuilt tree"
        );
        if tracing::enabled!(target: targets::TREE, tracing::Level::TRACE) {
            let dump = TreeDebug::new().format(&self.model, self.current_node());
            tracing::trace!(target: targets::TREE, "tree after rebuild:\n{dump}");
        }
        NavEvent::Rebuilt
    }

    /// Rebuilds the visible sequence after an expansion change and puts the
    /// cursor back on `anchor`.
    fn restructure(&mut self, anchor: NodeId) {
        self.model.rebuild_visible();
        self.search.clear();
        let len = self.model.visible_len();
        self.cursor = self
            .model
            .visible_index_of(anchor)
            .unwrap_or_else(|| self.cursor.min(len.saturating_sub(1)));
    }
}

static_assertions::assert_impl_all!(TreeNavigator: Send, Sync);

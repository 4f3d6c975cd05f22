//! Cursor state machines over tree and grid models.
//!
//! Every navigator operation returns `Result<NavEvent, Rejection>`: either
//! what changed, or why nothing did. Operations never panic on an empty
//! model or an out-of-range cursor; they return [`NavEvent::Unchanged`].

mod grid_navigator;
mod tree_navigator;

pub use grid_navigator::GridNavigator;
pub use tree_navigator::TreeNavigator;

use crate::model::ActionOutcome;

/// What a navigator operation did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavEvent {
    /// Nothing happened; the model is empty.
    Unchanged,
    /// The cursor moved to another item.
    Moved,
    /// The item under the cursor was expanded; the cursor stayed.
    Expanded,
    /// The item under the cursor was collapsed; the cursor stayed.
    Collapsed,
    /// This many siblings of the current item were expanded.
    SiblingsExpanded(usize),
    /// The item's leaf action ran.
    Activated(ActionOutcome),
    /// The item's delete handler ran.
    Deleted(ActionOutcome),
    /// The search buffer changed and the cursor is on a match.
    SearchUpdated,
    /// The search ended.
    SearchCleared,
    /// The model was replaced and the cursor restored.
    Rebuilt,
    /// The grid column cursor moved.
    ColumnChanged,
    /// The grid was re-sorted.
    Sorted { column: usize, descending: bool },
    /// An interactive cell's handler ran.
    CellActivated,
    /// Activation of a non-interactive cell; say the cell again.
    Reannounce,
}

/// Result of a navigator operation.
pub type NavResult = Result<NavEvent, crate::error::Rejection>;

pub(crate) fn wrap_next(index: usize, len: usize) -> usize {
    if index + 1 >= len { 0 } else { index + 1 }
}

pub(crate) fn wrap_previous(index: usize, len: usize) -> usize {
    if index == 0 || index > len { len.saturating_sub(1) } else { index - 1 }
}

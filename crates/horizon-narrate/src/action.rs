//! Inbound key actions.
//!
//! The host maps raw keys to these actions; sessions consume them one at a
//! time. Mapping keys is up to the host.

/// A resolved keyboard action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyAction {
    /// Next item or row.
    Next,
    /// Previous item or row.
    Previous,
    /// Expand, or step into an expanded node.
    Expand,
    /// Collapse, or step out to the parent.
    Collapse,
    /// Enter: expand a collapsed node, run a leaf action, or activate a cell.
    Activate,
    /// Delete the current item.
    Delete,
    /// Expand all collapsed siblings of the current node.
    ExpandAllSiblings,
    /// A printable character for typeahead search.
    TypeaheadChar(char),
    /// Remove the last typeahead character.
    Backspace,
    /// First item or row.
    JumpFirst,
    /// Last item or row.
    JumpLast,
    /// Clear the search, or close the session if there is none.
    Cancel,
    /// Next typeahead match.
    NextMatch,
    /// Previous typeahead match.
    PreviousMatch,
    /// Next grid column.
    NextColumn,
    /// Previous grid column.
    PreviousColumn,
    /// Sort the grid by the current column, or flip its direction.
    ToggleSort,
}

//! Row and column navigation over a [`GridModel`].

use horizon_narrate_core::logging::targets;

use super::{NavEvent, NavResult, wrap_next, wrap_previous};
use crate::announce::SearchContext;
use crate::error::Rejection;
use crate::model::GridModel;
use crate::search::{SearchStep, TypeaheadSearch};

/// Two-axis cursor over a sortable grid.
///
/// The row cursor addresses display order. Re-sorting or refreshing the
/// rows keeps the cursor on the same entity rather than the same index.
///
/// # Example
///
/// ```
/// use horizon_narrate::model::{ColumnSpec, GridModel};
/// use horizon_narrate::nav::GridNavigator;
///
/// struct Animal {
///     name: String,
///     size: f32,
/// }
///
/// let model = GridModel::new(
///     vec![
///         Animal { name: "Rex".into(), size: 1.2 },
///         Animal { name: "Ari".into(), size: 3.4 },
///     ],
///     vec![
///         ColumnSpec::new("Name", |a: &Animal| a.name.clone()),
///         ColumnSpec::new("Size", |a: &Animal| format!("{:.1}", a.size)),
///     ],
/// );
/// let mut nav = GridNavigator::new(model);
/// nav.toggle_sort_by_current_column().ok();
/// assert_eq!(nav.current_row().map(|a| a.name.as_str()), Some("Rex"));
/// assert_eq!(nav.row(), 1);
/// ```
#[derive(Debug)]
pub struct GridNavigator<E> {
    model: GridModel<E>,
    row: usize,
    column: usize,
    search: TypeaheadSearch,
    search_column: usize,
}

impl<E> GridNavigator<E> {
    /// Creates a navigator with the cursor on the first cell.
    pub fn new(model: GridModel<E>) -> Self {
        Self {
            model,
            row: 0,
            column: 0,
            search: TypeaheadSearch::new(),
            search_column: 0,
        }
    }

    /// Typeahead matches against this column instead of the first one.
    pub fn with_search_column(mut self, column: usize) -> Self {
        self.search_column = column;
        self
    }

    /// The underlying model.
    pub fn model(&self) -> &GridModel<E> {
        &self.model
    }

    /// Current display row.
    pub fn row(&self) -> usize {
        self.row
    }

    /// Current column.
    pub fn column(&self) -> usize {
        self.column
    }

    /// The column typeahead matches against.
    pub fn search_column(&self) -> usize {
        self.search_column
    }

    /// The typeahead state.
    pub fn search(&self) -> &TypeaheadSearch {
        &self.search
    }

    /// Whether there are no rows.
    pub fn is_empty(&self) -> bool {
        self.model.is_empty()
    }

    /// The entity under the row cursor.
    pub fn current_row(&self) -> Option<&E> {
        self.model.row_at(self.row)
    }

    /// Name of the current column.
    pub fn current_column_name(&self) -> Option<&str> {
        self.model.column(self.column).map(|c| c.name())
    }

    /// Text of the current cell.
    pub fn current_cell_text(&self) -> Option<String> {
        self.model.cell_text(self.row, self.column)
    }

    /// Label of the current row: its text in the search column.
    pub fn current_row_label(&self) -> Option<String> {
        self.model.cell_text(self.row, self.search_column)
    }

    /// Typeahead context when the row cursor is on a match.
    pub fn search_context(&self) -> Option<SearchContext<'_>> {
        if !self.search.is_active() {
            return None;
        }
        self.search
            .match_position(self.row)
            .map(|(match_number, match_count)| SearchContext {
                buffer: self.search.buffer(),
                match_number,
                match_count,
            })
    }

    fn move_to_row(&mut self, row: usize) -> NavEvent {
        self.row = row;
        tracing::trace!(target: targets::GRID, row, column = self.column, "cursor moved");
        NavEvent::Moved
    }

    /// Moves down one row, wrapping around.
    pub fn select_next_row(&mut self) -> NavResult {
        let len = self.model.row_count();
        if len == 0 {
            return Ok(NavEvent::Unchanged);
        }
        Ok(self.move_to_row(wrap_next(self.row, len)))
    }

    /// Moves up one row, wrapping around.
    pub fn select_previous_row(&mut self) -> NavResult {
        let len = self.model.row_count();
        if len == 0 {
            return Ok(NavEvent::Unchanged);
        }
        Ok(self.move_to_row(wrap_previous(self.row, len)))
    }

    /// Moves to the first row.
    pub fn jump_first_row(&mut self) -> NavResult {
        if self.is_empty() {
            return Ok(NavEvent::Unchanged);
        }
        Ok(self.move_to_row(0))
    }

    /// Moves to the last row.
    pub fn jump_last_row(&mut self) -> NavResult {
        let len = self.model.row_count();
        if len == 0 {
            return Ok(NavEvent::Unchanged);
        }
        Ok(self.move_to_row(len - 1))
    }

    /// Moves right one column, wrapping around.
    pub fn select_next_column(&mut self) -> NavResult {
        let count = self.model.column_count();
        if count == 0 {
            return Err(Rejection::NoColumns);
        }
        if self.is_empty() {
            return Ok(NavEvent::Unchanged);
        }
        self.column = wrap_next(self.column, count);
        Ok(NavEvent::ColumnChanged)
    }

    /// Moves left one column, wrapping around.
    pub fn select_previous_column(&mut self) -> NavResult {
        let count = self.model.column_count();
        if count == 0 {
            return Err(Rejection::NoColumns);
        }
        if self.is_empty() {
            return Ok(NavEvent::Unchanged);
        }
        self.column = wrap_previous(self.column, count);
        Ok(NavEvent::ColumnChanged)
    }

    /// Sorts by the current column, or flips the direction if the grid is
    /// already sorted by it. The row cursor follows its entity.
    pub fn toggle_sort_by_current_column(&mut self) -> NavResult {
        if self.column >= self.model.column_count() {
            return Err(Rejection::NoColumns);
        }
        if self.is_empty() {
            return Ok(NavEvent::Unchanged);
        }

        let descending = match self.model.sort_column() {
            Some(column) if column == self.column => !self.model.is_descending(),
            _ => false,
        };
        let source = self.model.source_index(self.row);
        self.model.sort_by(self.column, descending);
        self.row = source
            .and_then(|s| self.model.view_index(s))
            .unwrap_or(0);
        self.search.clear();

        Ok(NavEvent::Sorted {
            column: self.column,
            descending,
        })
    }

    /// Activates the current cell.
    ///
    /// Interactive cells run their handler; others are just re-announced.
    pub fn activate_cell(&mut self) -> NavResult {
        let Some(entity) = self.model.row_at(self.row) else {
            return Ok(NavEvent::Unchanged);
        };
        let Some(column) = self.model.column(self.column) else {
            return Err(Rejection::NoColumns);
        };
        if !column.is_interactive() {
            return Ok(NavEvent::Reannounce);
        }
        match column.activate(entity) {
            Ok(()) => Ok(NavEvent::CellActivated),
            Err(err) => {
                tracing::warn!(
                    target: targets::PROVIDER,
                    column = column.name(),
                    row = self.row,
                    error = %err,
                    "cell action failed"
                );
                Err(Rejection::provider_failed(column.name(), &err))
            }
        }
    }

    /// Appends a character to the typeahead buffer and jumps to a match.
    pub fn typeahead_char(&mut self, c: char) -> NavResult {
        if self.is_empty() {
            return Ok(NavEvent::Unchanged);
        }
        let labels = self.model.column_texts(self.search_column);
        let row = self.search.push_char(c, &labels, self.row)?;
        self.move_to_row(row);
        Ok(NavEvent::SearchUpdated)
    }

    /// Removes the last character of the typeahead buffer.
    pub fn backspace(&mut self) -> NavResult {
        if self.is_empty() {
            return Ok(NavEvent::Unchanged);
        }
        let labels = self.model.column_texts(self.search_column);
        match self.search.backspace(&labels, self.row)? {
            SearchStep::Matched(row) => {
                self.move_to_row(row);
                Ok(NavEvent::SearchUpdated)
            }
            SearchStep::Cleared => Ok(NavEvent::SearchCleared),
        }
    }

    /// Jumps to the next typeahead match, wrapping around.
    pub fn next_match(&mut self) -> NavResult {
        match self.search.next_match(self.row) {
            Some(row) => {
                self.move_to_row(row);
                Ok(NavEvent::SearchUpdated)
            }
            None => Err(Rejection::NoActiveSearch),
        }
    }

    /// Jumps to the previous typeahead match, wrapping around.
    pub fn previous_match(&mut self) -> NavResult {
        match self.search.previous_match(self.row) {
            Some(row) => {
                self.move_to_row(row);
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

    /// Replaces the rows, keeping the current sort.
    ///
    /// With an identity function on the model the cursor stays on the same
    /// entity if it survived; otherwise the row index is clamped.
    pub fn replace_rows(&mut self, rows: Vec<E>) -> NavEvent {
        let identity = self.model.identity_at(self.row);
        self.model.replace_rows(rows);
        self.search.clear();

        let len = self.model.row_count();
        self.row = identity
            .and_then(|key| self.model.find_identity(key))
            .unwrap_or_else(|| self.row.min(len.saturating_sub(1)));
        tracing::debug!(target: targets::GRID, rows = len, row = self.row, "rows replaced");
        NavEvent::Rebuilt
    }
}

//! Grid model for flat tabular data with per-column sorting.
//!
//! `GridModel` holds the provider's row handles in provider order and a
//! separate row mapping that gives the current display order. Sorting only
//! rewrites the mapping, so a row keeps its *source index* (its identity for
//! the lifetime of the row set) no matter how often the grid is re-sorted.

use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

use horizon_narrate_core::PerfSpan;
use horizon_narrate_core::logging::{span_names, targets};

use crate::error::ProviderError;

/// Extracts the display text of a cell.
pub type ValueFn<E> = Arc<dyn Fn(&E) -> String + Send + Sync>;

/// Compares two rows for a column sort.
pub type CompareFn<E> = Arc<dyn Fn(&E, &E) -> Ordering + Send + Sync>;

/// Handler invoked when an interactive cell is activated.
pub type CellActionFn<E> = Arc<dyn Fn(&E) -> Result<(), ProviderError> + Send + Sync>;

/// Stable identity of a row across row-set refreshes.
pub type IdentityFn<E> = Arc<dyn Fn(&E) -> u64 + Send + Sync>;

/// Describes one column of a grid.
///
/// # Example
///
/// ```
/// use horizon_narrate::model::ColumnSpec;
///
/// struct Animal {
///     name: String,
///     body_size: f32,
/// }
///
/// let name = ColumnSpec::new("Name", |a: &Animal| a.name.clone());
/// let size = ColumnSpec::new("Size", |a: &Animal| format!("{:.1}", a.body_size))
///     .with_compare(|a, b| a.body_size.total_cmp(&b.body_size));
/// assert_eq!(size.name(), "Size");
/// assert!(!name.is_interactive());
/// ```
pub struct ColumnSpec<E> {
    name: String,
    value: ValueFn<E>,
    compare: Option<CompareFn<E>>,
    on_activate: Option<CellActionFn<E>>,
}

impl<E> Clone for ColumnSpec<E> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            value: self.value.clone(),
            compare: self.compare.clone(),
            on_activate: self.on_activate.clone(),
        }
    }
}

impl<E> ColumnSpec<E> {
    /// Creates a non-interactive column sorted by its display text.
    pub fn new<F>(name: impl Into<String>, value: F) -> Self
    where
        F: Fn(&E) -> String + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            value: Arc::new(value),
            compare: None,
            on_activate: None,
        }
    }

    /// Sorts this column with a custom comparator instead of display text.
    pub fn with_compare<F>(mut self, compare: F) -> Self
    where
        F: Fn(&E, &E) -> Ordering + Send + Sync + 'static,
    {
        self.compare = Some(Arc::new(compare));
        self
    }

    /// Marks the column interactive; `action` runs when a cell is activated.
    pub fn interactive<F>(mut self, action: F) -> Self
    where
        F: Fn(&E) -> Result<(), ProviderError> + Send + Sync + 'static,
    {
        self.on_activate = Some(Arc::new(action));
        self
    }

    /// The column header.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The display text of this column for `row`.
    pub fn value(&self, row: &E) -> String {
        (self.value)(row)
    }

    /// Whether cells in this column can be activated.
    pub fn is_interactive(&self) -> bool {
        self.on_activate.is_some()
    }

    /// Runs the cell action. Non-interactive columns do nothing.
    pub fn activate(&self, row: &E) -> Result<(), ProviderError> {
        match &self.on_activate {
            Some(action) => action(row),
            None => Ok(()),
        }
    }

    /// Orders two rows by this column, ascending.
    pub fn compare(&self, a: &E, b: &E) -> Ordering {
        match &self.compare {
            Some(compare) => compare(a, b),
            None => compare_text(&self.value(a), &self.value(b)),
        }
    }
}

impl<E> fmt::Debug for ColumnSpec<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ColumnSpec")
            .field("name", &self.name)
            .field("custom_compare", &self.compare.is_some())
            .field("interactive", &self.is_interactive())
            .finish()
    }
}

/// Compares cell text as a total order.
///
/// Numbers sort before everything else and compare by value. Other text
/// compares case-insensitively with a case-sensitive tie break.
pub fn compare_text(a: &str, b: &str) -> Ordering {
    match (a.trim().parse::<f64>(), b.trim().parse::<f64>()) {
        (Ok(fa), Ok(fb)) => fa.total_cmp(&fb),
        (Ok(_), Err(_)) => Ordering::Less,
        (Err(_), Ok(_)) => Ordering::Greater,
        (Err(_), Err(_)) => a
            .to_lowercase()
            .cmp(&b.to_lowercase())
            .then_with(|| a.cmp(b)),
    }
}

/// Internal row mapping between display order and provider order.
#[derive(Debug, Default)]
struct RowMapping {
    /// Display row -> source row.
    view_to_source: Vec<usize>,
    /// Source row -> display row.
    source_to_view: Vec<usize>,
}

impl RowMapping {
    fn identity(len: usize) -> Self {
        Self {
            view_to_source: (0..len).collect(),
            source_to_view: (0..len).collect(),
        }
    }

    fn from_order(view_to_source: Vec<usize>) -> Self {
        let mut source_to_view = vec![0; view_to_source.len()];
        for (view, &source) in view_to_source.iter().enumerate() {
            source_to_view[source] = view;
        }
        Self {
            view_to_source,
            source_to_view,
        }
    }
}

/// A sortable table of provider-owned row handles.
///
/// `E` is whatever the provider uses to refer to an entity: an id, an `Arc`,
/// or a small snapshot struct.
pub struct GridModel<E> {
    rows: Vec<E>,
    columns: Vec<ColumnSpec<E>>,
    mapping: RowMapping,
    sort_column: Option<usize>,
    sort_descending: bool,
    identity: Option<IdentityFn<E>>,
}

impl<E> GridModel<E> {
    /// Creates an unsorted grid in provider order.
    pub fn new(rows: Vec<E>, columns: Vec<ColumnSpec<E>>) -> Self {
        Self {
            mapping: RowMapping::identity(rows.len()),
            rows,
            columns,
            sort_column: None,
            sort_descending: false,
            identity: None,
        }
    }

    /// Supplies a stable identity so refreshes can keep track of rows.
    pub fn with_identity<F>(mut self, identity: F) -> Self
    where
        F: Fn(&E) -> u64 + Send + Sync + 'static,
    {
        self.identity = Some(Arc::new(identity));
        self
    }

    /// Number of rows.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Number of columns.
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Returns `true` if there are no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Column descriptions in provider order.
    pub fn columns(&self) -> &[ColumnSpec<E>] {
        &self.columns
    }

    /// One column.
    pub fn column(&self, column: usize) -> Option<&ColumnSpec<E>> {
        self.columns.get(column)
    }

    /// The row shown at display position `row`.
    pub fn row_at(&self, row: usize) -> Option<&E> {
        self.source_index(row).and_then(|source| self.rows.get(source))
    }

    /// Rows in display order.
    pub fn rows_in_order(&self) -> impl Iterator<Item = &E> + '_ {
        self.mapping
            .view_to_source
            .iter()
            .filter_map(|&source| self.rows.get(source))
    }

    /// Maps a display row to its provider index.
    pub fn source_index(&self, row: usize) -> Option<usize> {
        self.mapping.view_to_source.get(row).copied()
    }

    /// Maps a provider index to its display row.
    pub fn view_index(&self, source: usize) -> Option<usize> {
        self.mapping.source_to_view.get(source).copied()
    }

    /// Display text of a cell.
    pub fn cell_text(&self, row: usize, column: usize) -> Option<String> {
        let entity = self.row_at(row)?;
        Some(self.columns.get(column)?.value(entity))
    }

    /// Display texts of one column, in display order.
    pub fn column_texts(&self, column: usize) -> Vec<String> {
        match self.columns.get(column) {
            Some(spec) => self.rows_in_order().map(|row| spec.value(row)).collect(),
            None => Vec::new(),
        }
    }

    /// The current sort column, if sorted.
    pub fn sort_column(&self) -> Option<usize> {
        self.sort_column
    }

    /// Whether the current sort is descending.
    pub fn is_descending(&self) -> bool {
        self.sort_descending
    }

    /// Sorts by `column`. The sort is stable: equal rows keep provider order.
    ///
    /// Returns `false` if the column doesn't exist.
    pub fn sort_by(&mut self, column: usize, descending: bool) -> bool {
        if column >= self.columns.len() {
            return false;
        }
        self.sort_column = Some(column);
        self.sort_descending = descending;
        self.rebuild_mapping();
        true
    }

    /// Restores provider order.
    pub fn clear_sort(&mut self) {
        self.sort_column = None;
        self.sort_descending = false;
        self.rebuild_mapping();
    }

    /// Stable identity of the row at display position `row`.
    pub fn identity_at(&self, row: usize) -> Option<u64> {
        let identity = self.identity.as_ref()?;
        self.row_at(row).map(|entity| identity(entity))
    }

    /// Display position of the row with the given identity.
    pub fn find_identity(&self, key: u64) -> Option<usize> {
        let identity = self.identity.as_ref()?;
        let source = self.rows.iter().position(|entity| identity(entity) == key)?;
        self.view_index(source)
    }

    /// Replaces the row set, re-applying the current sort.
    pub fn replace_rows(&mut self, rows: Vec<E>) {
        self.rows = rows;
        self.rebuild_mapping();
    }

    fn rebuild_mapping(&mut self) {
        let _span = PerfSpan::new(span_names::SORT);
        let mut order: Vec<usize> = (0..self.rows.len()).collect();

        if let Some(spec) = self.sort_column.and_then(|c| self.columns.get(c)) {
            let rows = &self.rows;
            let descending = self.sort_descending;
            order.sort_by(|&a, &b| {
                let cmp = spec.compare(&rows[a], &rows[b]);
                if descending { cmp.reverse() } else { cmp }
            });
            tracing::debug!(
                target: targets::GRID,
                column = spec.name(),
                descending,
                rows = order.len(),
                "sorted grid"
            );
        }

        self.mapping = RowMapping::from_order(order);
    }
}

impl<E> fmt::Debug for GridModel<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GridModel")
            .field("rows", &self.rows.len())
            .field("columns", &self.columns)
            .field("sort_column", &self.sort_column)
            .field("sort_descending", &self.sort_descending)
            .finish()
    }
}

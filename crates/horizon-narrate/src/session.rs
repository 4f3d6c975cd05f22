//! Menu sessions: the glue between key actions, navigators and sinks.
//!
//! A session is created when a menu opens and dropped when it closes. It
//! owns its navigator, its formatter state and its signals, so two menus
//! never share state and nothing outlives the menu.
//!
//! ```
//! use std::sync::Arc;
//! use horizon_narrate::announce::{Outputs, RecordingSink};
//! use horizon_narrate::model::NodeSpec;
//! use horizon_narrate::session::{StaticTree, TreeSession};
//! use horizon_narrate::{KeyAction, NarrationConfig};
//!
//! let sink = Arc::new(RecordingSink::new());
//! let provider = Arc::new(StaticTree::new(
//!     "Orders",
//!     vec![NodeSpec::leaf("Hunt"), NodeSpec::leaf("Tame")],
//! ));
//! let mut session =
//!     TreeSession::open(provider, Outputs::shared(sink.clone()), NarrationConfig::default())
//!         .unwrap();
//! assert_eq!(sink.last_announcement().as_deref(), Some("Orders. Hunt. 1 of 2, level 1."));
//!
//! session.handle(KeyAction::Next);
//! assert_eq!(sink.last_announcement().as_deref(), Some("Tame. 2 of 2."));
//!
//! assert!(!session.handle(KeyAction::Cancel));
//! assert!(!session.is_open());
//! ```

use std::fmt;
use std::sync::Arc;

use horizon_narrate_core::logging::{span_names, targets};
use horizon_narrate_core::{Error, PerfSpan, Result, Signal};

use crate::action::KeyAction;
use crate::announce::{AnnouncementFormatter, FeedbackCue, Outputs, Priority};
use crate::config::NarrationConfig;
use crate::error::{ProviderError, Rejection};
use crate::model::{ActionOutcome, ColumnSpec, GridModel, IdentityFn, NodeId, NodeSpec};
use crate::nav::{GridNavigator, NavEvent, NavResult, TreeNavigator};

const SEARCH_CLEARED: &str = "Search cleared";

/// Supplies the nodes of a tree menu.
pub trait TreeProvider: Send + Sync {
    /// Menu title; also the formatter context.
    fn title(&self) -> String;

    /// Builds the top-level nodes from current game state.
    ///
    /// Called on open and again whenever the menu must rebuild.
    fn build_roots(&self) -> std::result::Result<Vec<NodeSpec>, ProviderError>;
}

/// Supplies the rows and columns of a grid menu.
pub trait GridProvider<E>: Send + Sync {
    /// Menu title; also the formatter context.
    fn title(&self) -> String;

    /// Column descriptions, in display order.
    fn columns(&self) -> Vec<ColumnSpec<E>>;

    /// Current rows, in provider order.
    fn rows(&self) -> std::result::Result<Vec<E>, ProviderError>;

    /// Stable row identity, used to keep the cursor across refreshes.
    fn identity(&self) -> Option<IdentityFn<E>> {
        None
    }

    /// Sort applied on open, as `(column, descending)`.
    fn initial_sort(&self) -> Option<(usize, bool)> {
        None
    }

    /// Column used for typeahead and as the row label.
    fn search_column(&self) -> usize {
        0
    }
}

/// A tree provider over a fixed list of specs.
#[derive(Debug, Clone)]
pub struct StaticTree {
    title: String,
    specs: Vec<NodeSpec>,
}

impl StaticTree {
    /// Creates a provider that always returns `specs`.
    pub fn new(title: impl Into<String>, specs: Vec<NodeSpec>) -> Self {
        Self {
            title: title.into(),
            specs,
        }
    }
}

impl TreeProvider for StaticTree {
    fn title(&self) -> String {
        self.title.clone()
    }

    fn build_roots(&self) -> std::result::Result<Vec<NodeSpec>, ProviderError> {
        Ok(self.specs.clone())
    }
}

/// An open tree menu.
pub struct TreeSession {
    title: String,
    provider: Arc<dyn TreeProvider>,
    navigator: TreeNavigator,
    formatter: AnnouncementFormatter,
    outputs: Outputs,
    open: bool,

    /// Emitted with the new visible index when the cursor moves.
    pub cursor_changed: Signal<usize>,
    /// Emitted when a node is expanded.
    pub expanded: Signal<NodeId>,
    /// Emitted when a node is collapsed.
    pub collapsed: Signal<NodeId>,
    /// Emitted when a leaf action ran.
    pub activated: Signal<NodeId>,
    /// Emitted with the new visible length after a rebuild.
    pub rebuilt: Signal<usize>,
    /// Emitted once when the session closes.
    pub closed: Signal<()>,
}

impl TreeSession {
    /// Opens a menu: builds the nodes and announces the title and first item.
    ///
    /// An empty menu still opens; it announces "`<title>`: Empty" and every
    /// action is a no-op.
    pub fn open(
        provider: Arc<dyn TreeProvider>,
        outputs: Outputs,
        config: NarrationConfig,
    ) -> Result<Self> {
        let title = provider.title();
        let specs = provider.build_roots().map_err(|err| {
            tracing::warn!(target: targets::PROVIDER, title = %title, error = %err, "failed to build menu");
            Error::from(err)
        })?;

        let mut session = Self {
            navigator: TreeNavigator::new(specs),
            formatter: AnnouncementFormatter::new(config),
            title,
            provider,
            outputs,
            open: true,
            cursor_changed: Signal::new(),
            expanded: Signal::new(),
            collapsed: Signal::new(),
            activated: Signal::new(),
            rebuilt: Signal::new(),
            closed: Signal::new(),
        };
        tracing::info!(
            target: targets::SESSION,
            title = %session.title,
            visible = session.navigator.model().visible_len(),
            "tree menu opened"
        );

        let text = match session.current_text() {
            Some(item) => format!("{}. {item}", session.title),
            None => format!("{}: {}", session.title, Rejection::EmptyModel),
        };
        session.outputs.speak(&text, Priority::Normal);
        Ok(session)
    }

    /// The menu title.
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Whether the session still accepts actions.
    pub fn is_open(&self) -> bool {
        self.open
    }

    /// The navigator, for inspection.
    pub fn navigator(&self) -> &TreeNavigator {
        &self.navigator
    }

    /// Handles one key action. Returns `false` once the session is closed.
    pub fn handle(&mut self, action: KeyAction) -> bool {
        if !self.open {
            return false;
        }
        let _span = PerfSpan::new(span_names::DISPATCH);
        let before = self.navigator.cursor();
        let node = self.navigator.current_node();

        let result: NavResult = match action {
            KeyAction::Next => self.navigator.select_next(),
            KeyAction::Previous => self.navigator.select_previous(),
            KeyAction::JumpFirst => self.navigator.jump_first(),
            KeyAction::JumpLast => self.navigator.jump_last(),
            KeyAction::Expand => self.navigator.expand(),
            KeyAction::Collapse => self.navigator.collapse(),
            KeyAction::Activate => self.navigator.activate(),
            KeyAction::Delete => self.navigator.delete(),
            KeyAction::ExpandAllSiblings => self.navigator.expand_all_siblings(),
            KeyAction::TypeaheadChar(c) => self.navigator.typeahead_char(c),
            KeyAction::Backspace => self.navigator.backspace(),
            KeyAction::NextMatch => self.navigator.next_match(),
            KeyAction::PreviousMatch => self.navigator.previous_match(),
            KeyAction::Cancel => {
                if self.navigator.clear_search() {
                    Ok(NavEvent::SearchCleared)
                } else {
                    self.close();
                    return false;
                }
            }
            KeyAction::NextColumn | KeyAction::PreviousColumn | KeyAction::ToggleSort => {
                tracing::trace!(target: targets::SESSION, ?action, "grid action ignored by tree menu");
                Ok(NavEvent::Unchanged)
            }
        };

        match result {
            Ok(event) => self.apply(event, node),
            Err(rejection) => reject(&self.outputs, &self.formatter, &rejection),
        }

        if self.open && self.navigator.cursor() != before {
            self.cursor_changed.emit(self.navigator.cursor());
        }
        self.open
    }

    fn apply(&mut self, event: NavEvent, node: Option<NodeId>) {
        match event {
            NavEvent::Unchanged => {}
            NavEvent::Moved
            | NavEvent::SearchUpdated
            | NavEvent::Rebuilt
            | NavEvent::Reannounce
            | NavEvent::ColumnChanged
            | NavEvent::Sorted { .. }
            | NavEvent::CellActivated => self.announce_current(),
            NavEvent::Expanded => {
                self.cue(FeedbackCue::ExpandOpen);
                if let Some(id) = node {
                    self.expanded.emit(id);
                }
                self.announce_current();
            }
            NavEvent::Collapsed => {
                self.cue(FeedbackCue::ExpandClose);
                if let Some(id) = node {
                    self.collapsed.emit(id);
                }
                self.announce_current();
            }
            NavEvent::SiblingsExpanded(count) => {
                self.cue(FeedbackCue::ExpandOpen);
                let text = self.formatter.format_expanded_count(count);
                self.outputs.speak(&text, Priority::Normal);
            }
            NavEvent::Activated(outcome) => {
                self.cue(FeedbackCue::Click);
                if let Some(id) = node {
                    self.activated.emit(id);
                }
                if outcome == ActionOutcome::Rebuild {
                    self.refresh();
                }
            }
            NavEvent::Deleted(ActionOutcome::Rebuild) => {
                self.cue(FeedbackCue::Click);
                self.refresh();
            }
            NavEvent::Deleted(ActionOutcome::Unchanged) => {
                self.cue(FeedbackCue::Click);
                self.announce_current();
            }
            NavEvent::SearchCleared => {
                self.cue(FeedbackCue::Tick);
                self.outputs.speak(SEARCH_CLEARED, Priority::Normal);
            }
        }
    }

    /// Rebuilds the menu from the provider, keeping expansion and focus.
    ///
    /// Returns `false` if the provider failed; the old nodes stay in place.
    pub fn refresh(&mut self) -> bool {
        if !self.open {
            return false;
        }
        match self.provider.build_roots() {
            Ok(specs) => {
                self.navigator.rebuild(specs);
                self.rebuilt.emit(self.navigator.model().visible_len());
                self.announce_current();
                true
            }
            Err(err) => {
                tracing::warn!(target: targets::PROVIDER, title = %self.title, error = %err, "rebuild failed");
                let rejection = Rejection::provider_failed(self.title.clone(), &err);
                reject(&self.outputs, &self.formatter, &rejection);
                false
            }
        }
    }

    /// Speaks the current item again, or "Empty".
    pub fn announce_current(&mut self) {
        let text = self
            .current_text()
            .unwrap_or_else(|| Rejection::EmptyModel.to_string());
        self.outputs.speak(&text, Priority::Normal);
    }

    fn current_text(&mut self) -> Option<String> {
        let item = self.navigator.describe()?;
        Some(self.formatter.format(&self.title, &item))
    }

    fn cue(&self, cue: FeedbackCue) {
        if self.formatter.config().feedback_cues {
            self.outputs.cue(cue);
        }
    }

    /// Closes the session and drops every signal connection.
    pub fn close(&mut self) {
        if !self.open {
            return;
        }
        self.open = false;
        self.navigator.clear_search();
        tracing::info!(target: targets::SESSION, title = %self.title, "tree menu closed");
        self.closed.emit(());
        self.disconnect_all();
    }

    fn disconnect_all(&self) {
        self.cursor_changed.disconnect_all();
        self.expanded.disconnect_all();
        self.collapsed.disconnect_all();
        self.activated.disconnect_all();
        self.rebuilt.disconnect_all();
        self.closed.disconnect_all();
    }
}

impl fmt::Debug for TreeSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TreeSession")
            .field("title", &self.title)
            .field("open", &self.open)
            .field("navigator", &self.navigator)
            .finish_non_exhaustive()
    }
}

/// An open grid menu.
pub struct GridSession<E: Send + Sync + 'static> {
    title: String,
    provider: Arc<dyn GridProvider<E>>,
    navigator: GridNavigator<E>,
    formatter: AnnouncementFormatter,
    outputs: Outputs,
    open: bool,

    /// Emitted with `(row, column)` when either cursor moves.
    pub cursor_changed: Signal<(usize, usize)>,
    /// Emitted with `(column, descending)` after a sort.
    pub sorted: Signal<(usize, bool)>,
    /// Emitted once when the session closes.
    pub closed: Signal<()>,
}

impl<E: Send + Sync + 'static> GridSession<E> {
    /// Opens a grid: fetches rows, applies the initial sort and announces
    /// the title and first row.
    pub fn open(
        provider: Arc<dyn GridProvider<E>>,
        outputs: Outputs,
        config: NarrationConfig,
    ) -> Result<Self> {
        let title = provider.title();
        let rows = provider.rows().map_err(|err| {
            tracing::warn!(target: targets::PROVIDER, title = %title, error = %err, "failed to fetch rows");
            Error::from(err)
        })?;

        let mut model = GridModel::new(rows, provider.columns());
        if let Some(identity) = provider.identity() {
            model = model.with_identity(move |row| identity(row));
        }
        if let Some((column, descending)) = provider.initial_sort() {
            model.sort_by(column, descending);
        }
        let navigator = GridNavigator::new(model).with_search_column(provider.search_column());

        let session = Self {
            formatter: AnnouncementFormatter::new(config),
            navigator,
            title,
            provider,
            outputs,
            open: true,
            cursor_changed: Signal::new(),
            sorted: Signal::new(),
            closed: Signal::new(),
        };
        tracing::info!(
            target: targets::SESSION,
            title = %session.title,
            rows = session.navigator.model().row_count(),
            "grid menu opened"
        );

        let text = match session.row_text() {
            Some(row) => format!("{}. {row}", session.title),
            None => format!("{}: {}", session.title, Rejection::EmptyModel),
        };
        session.outputs.speak(&text, Priority::Normal);
        Ok(session)
    }

    /// The menu title.
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Whether the session still accepts actions.
    pub fn is_open(&self) -> bool {
        self.open
    }

    /// The navigator, for inspection.
    pub fn navigator(&self) -> &GridNavigator<E> {
        &self.navigator
    }

    /// Handles one key action. Returns `false` once the session is closed.
    pub fn handle(&mut self, action: KeyAction) -> bool {
        if !self.open {
            return false;
        }
        let _span = PerfSpan::new(span_names::DISPATCH);
        let before = (self.navigator.row(), self.navigator.column());

        let result: NavResult = match action {
            KeyAction::Next => self.navigator.select_next_row(),
            KeyAction::Previous => self.navigator.select_previous_row(),
            KeyAction::JumpFirst => self.navigator.jump_first_row(),
            KeyAction::JumpLast => self.navigator.jump_last_row(),
            KeyAction::NextColumn => self.navigator.select_next_column(),
            KeyAction::PreviousColumn => self.navigator.select_previous_column(),
            KeyAction::ToggleSort => self.navigator.toggle_sort_by_current_column(),
            KeyAction::Activate => self.navigator.activate_cell(),
            KeyAction::TypeaheadChar(c) => self.navigator.typeahead_char(c),
            KeyAction::Backspace => self.navigator.backspace(),
            KeyAction::NextMatch => self.navigator.next_match(),
            KeyAction::PreviousMatch => self.navigator.previous_match(),
            KeyAction::Cancel => {
                if self.navigator.clear_search() {
                    Ok(NavEvent::SearchCleared)
                } else {
                    self.close();
                    return false;
                }
            }
            KeyAction::Expand
            | KeyAction::Collapse
            | KeyAction::Delete
            | KeyAction::ExpandAllSiblings => {
                tracing::trace!(target: targets::SESSION, ?action, "tree action ignored by grid menu");
                Ok(NavEvent::Unchanged)
            }
        };

        match result {
            Ok(event) => self.apply(event),
            Err(rejection) => reject(&self.outputs, &self.formatter, &rejection),
        }

        let after = (self.navigator.row(), self.navigator.column());
        if self.open && after != before {
            self.cursor_changed.emit(after);
        }
        self.open
    }

    fn apply(&mut self, event: NavEvent) {
        match event {
            NavEvent::Unchanged => {}
            NavEvent::ColumnChanged => self.announce_cell(),
            NavEvent::Sorted { column, descending } => {
                self.cue(FeedbackCue::Click);
                self.sorted.emit((column, descending));
                let name = self.navigator.current_column_name().unwrap_or_default();
                let text = self.formatter.format_sort(name, descending);
                self.outputs.speak(&text, Priority::Normal);
            }
            NavEvent::CellActivated => {
                self.cue(FeedbackCue::Click);
                self.announce_cell();
            }
            NavEvent::SearchCleared => {
                self.cue(FeedbackCue::Tick);
                self.outputs.speak(SEARCH_CLEARED, Priority::Normal);
            }
            NavEvent::Moved
            | NavEvent::SearchUpdated
            | NavEvent::Rebuilt
            | NavEvent::Reannounce
            | NavEvent::Expanded
            | NavEvent::Collapsed
            | NavEvent::SiblingsExpanded(_)
            | NavEvent::Activated(_)
            | NavEvent::Deleted(_) => self.announce_current(),
        }
    }

    /// Fetches fresh rows from the provider, keeping sort and focus.
    ///
    /// Returns `false` if the provider failed; the old rows stay in place.
    pub fn refresh(&mut self) -> bool {
        if !self.open {
            return false;
        }
        match self.provider.rows() {
            Ok(rows) => {
                self.navigator.replace_rows(rows);
                self.announce_current();
                true
            }
            Err(err) => {
                tracing::warn!(target: targets::PROVIDER, title = %self.title, error = %err, "refresh failed");
                let rejection = Rejection::provider_failed(self.title.clone(), &err);
                reject(&self.outputs, &self.formatter, &rejection);
                false
            }
        }
    }

    /// Speaks the current row again, or "Empty".
    pub fn announce_current(&self) {
        let text = self
            .row_text()
            .unwrap_or_else(|| Rejection::EmptyModel.to_string());
        self.outputs.speak(&text, Priority::Normal);
    }

    fn announce_cell(&self) {
        let (Some(column), Some(value)) = (
            self.navigator.current_column_name(),
            self.navigator.current_cell_text(),
        ) else {
            return;
        };
        let text = self.formatter.format_cell(column, &value);
        self.outputs.speak(&text, Priority::Normal);
    }

    fn row_text(&self) -> Option<String> {
        let column = self.navigator.current_column_name()?;
        let value = self.navigator.current_cell_text()?;
        let label = if self.navigator.column() == self.navigator.search_column() {
            None
        } else {
            self.navigator.current_row_label()
        };
        Some(self.formatter.format_row(
            label.as_deref(),
            column,
            &value,
            self.navigator.row() + 1,
            self.navigator.model().row_count(),
            self.navigator.search_context(),
        ))
    }

    fn cue(&self, cue: FeedbackCue) {
        if self.formatter.config().feedback_cues {
            self.outputs.cue(cue);
        }
    }

    /// Closes the session and drops every signal connection.
    pub fn close(&mut self) {
        if !self.open {
            return;
        }
        self.open = false;
        self.navigator.clear_search();
        tracing::info!(target: targets::SESSION, title = %self.title, "grid menu closed");
        self.closed.emit(());
        self.cursor_changed.disconnect_all();
        self.sorted.disconnect_all();
        self.closed.disconnect_all();
    }
}

impl<E: Send + Sync + 'static> fmt::Debug for GridSession<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GridSession")
            .field("title", &self.title)
            .field("open", &self.open)
            .field("row", &self.navigator.row())
            .field("column", &self.navigator.column())
            .finish_non_exhaustive()
    }
}

/// Speaks a rejection with the reject cue.
fn reject(outputs: &Outputs, formatter: &AnnouncementFormatter, rejection: &Rejection) {
    let config = formatter.config();
    tracing::debug!(target: targets::SESSION, %rejection, "action rejected");
    if config.feedback_cues {
        outputs.cue(FeedbackCue::Reject);
    }
    outputs.speak(&rejection.to_string(), config.reject_priority);
}

static_assertions::assert_impl_all!(TreeSession: Send, Sync);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::announce::RecordingSink;
    use parking_lot::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn open(specs: Vec<NodeSpec>) -> (TreeSession, Arc<RecordingSink>) {
        let sink = Arc::new(RecordingSink::new());
        let session = TreeSession::open(
            Arc::new(StaticTree::new("Menu", specs)),
            Outputs::shared(sink.clone()),
            NarrationConfig::default(),
        )
        .unwrap();
        (session, sink)
    }

    #[test]
    fn test_open_empty_announces_once() {
        let (mut session, sink) = open(Vec::new());
        assert_eq!(sink.announcements(), vec!["Menu: Empty"]);
        assert!(session.handle(KeyAction::Next));
        assert!(session.handle(KeyAction::Expand));
        assert_eq!(sink.announcements().len(), 1);
        assert!(sink.cues().is_empty());
    }

    #[test]
    fn test_reject_speaks_with_cue_and_priority() {
        let (mut session, sink) = open(vec![NodeSpec::leaf("Hay")]);
        session.handle(KeyAction::Expand);
        assert_eq!(sink.last(), Some(("Cannot expand".to_string(), Priority::High)));
        assert_eq!(sink.cues(), vec![FeedbackCue::Reject]);
    }

    #[test]
    fn test_signals_fire() {
        let (mut session, _sink) = open(vec![
            NodeSpec::branch("Stock", vec![NodeSpec::leaf("Rice")]),
            NodeSpec::leaf("Medicine"),
        ]);
        let moves = Arc::new(Mutex::new(Vec::new()));
        let recorded = moves.clone();
        session.cursor_changed.connect(move |index| recorded.lock().push(*index));
        let expansions = Arc::new(AtomicUsize::new(0));
        let counter = expansions.clone();
        session.expanded.connect(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        session.handle(KeyAction::Expand);
        session.handle(KeyAction::Expand);
        session.handle(KeyAction::Next);
        assert_eq!(*moves.lock(), vec![1, 2]);
        assert_eq!(expansions.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_cancel_clears_search_before_closing() {
        let (mut session, sink) = open(vec![NodeSpec::leaf("Rice"), NodeSpec::leaf("Corn")]);
        let closed = Arc::new(AtomicUsize::new(0));
        let counter = closed.clone();
        session.closed.connect(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        session.handle(KeyAction::TypeaheadChar('c'));
        assert_eq!(
            sink.last_announcement().as_deref(),
            Some("Corn. match 1 of 1 for 'c'.")
        );
        assert!(session.handle(KeyAction::Cancel));
        assert_eq!(sink.last_announcement().as_deref(), Some("Search cleared"));
        assert!(!session.handle(KeyAction::Cancel));
        assert!(!session.handle(KeyAction::Next));
        assert_eq!(closed.load(Ordering::SeqCst), 1);
        assert_eq!(session.closed.connection_count(), 0);
    }

    #[test]
    fn test_cues_can_be_disabled() {
        let sink = Arc::new(RecordingSink::new());
        let mut session = TreeSession::open(
            Arc::new(StaticTree::new("Menu", vec![NodeSpec::leaf("Hay")])),
            Outputs::shared(sink.clone()),
            NarrationConfig {
                feedback_cues: false,
                ..Default::default()
            },
        )
        .unwrap();
        session.handle(KeyAction::Expand);
        assert!(sink.cues().is_empty());
    }

    struct FailingTree;

    impl TreeProvider for FailingTree {
        fn title(&self) -> String {
            "Broken".into()
        }

        fn build_roots(&self) -> std::result::Result<Vec<NodeSpec>, ProviderError> {
            Err(ProviderError::new("no map loaded"))
        }
    }

    #[test]
    fn test_open_fails_when_provider_fails() {
        let sink = Arc::new(RecordingSink::new());
        let result = TreeSession::open(
            Arc::new(FailingTree),
            Outputs::shared(sink.clone()),
            NarrationConfig::default(),
        );
        assert!(matches!(result, Err(Error::Provider(message)) if message == "no map loaded"));
        assert!(sink.announcements().is_empty());
    }
}

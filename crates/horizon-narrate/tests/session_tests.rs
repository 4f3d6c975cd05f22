//! Menu session tests with recording sinks.

use std::sync::Arc;

use parking_lot::Mutex;

use horizon_narrate::announce::{FeedbackCue, Outputs, Priority, RecordingSink};
use horizon_narrate::model::{
    ActionOutcome, Choice, ColumnSpec, IdentityFn, NodeSpec, choice_nodes,
};
use horizon_narrate::session::{GridProvider, GridSession, StaticTree, TreeProvider, TreeSession};
use horizon_narrate::{KeyAction, NarrationConfig, ProviderError};

/// A work queue whose bills can be deleted.
struct BillQueue {
    bills: Arc<Mutex<Vec<String>>>,
}

impl TreeProvider for BillQueue {
    fn title(&self) -> String {
        "Bills".to_string()
    }

    fn build_roots(&self) -> Result<Vec<NodeSpec>, ProviderError> {
        let bills = self.bills.lock().clone();
        let children = bills
            .into_iter()
            .map(|bill| {
                let queue = self.bills.clone();
                let name = bill.clone();
                NodeSpec::leaf(bill).with_delete(move || {
                    queue.lock().retain(|b| *b != name);
                    Ok(ActionOutcome::Rebuild)
                })
            })
            .collect();
        Ok(vec![NodeSpec::branch("Stove", children), NodeSpec::leaf("Butcher table")])
    }
}

fn open_tree(provider: Arc<dyn TreeProvider>) -> (TreeSession, Arc<RecordingSink>) {
    let sink = Arc::new(RecordingSink::new());
    let session =
        TreeSession::open(provider, Outputs::shared(sink.clone()), NarrationConfig::default())
            .unwrap();
    (session, sink)
}

#[test]
fn test_tree_announcements() {
    let (mut session, sink) = open_tree(Arc::new(StaticTree::new(
        "Inspect",
        vec![
            NodeSpec::branch("Health.", vec![NodeSpec::leaf("Torso"), NodeSpec::leaf("Head")]),
            NodeSpec::leaf("Mood"),
        ],
    )));
    assert_eq!(
        sink.last_announcement().as_deref(),
        Some("Inspect. Health, collapsed. 1 of 2, level 1.")
    );

    session.handle(KeyAction::Expand);
    assert_eq!(sink.last_announcement().as_deref(), Some("Health, expanded. 1 of 2."));

    session.handle(KeyAction::Expand);
    assert_eq!(sink.last_announcement().as_deref(), Some("Torso. 1 of 2, level 2."));

    session.handle(KeyAction::Next);
    assert_eq!(sink.last_announcement().as_deref(), Some("Head. 2 of 2."));

    session.handle(KeyAction::Collapse);
    assert_eq!(
        sink.last_announcement().as_deref(),
        Some("Health, expanded. 1 of 2, level 1.")
    );

    assert_eq!(sink.cues(), vec![FeedbackCue::ExpandOpen]);
}

#[test]
fn test_expand_all_siblings_speech() {
    let (mut session, sink) = open_tree(Arc::new(StaticTree::new(
        "Inspect",
        vec![
            NodeSpec::branch("Health", vec![NodeSpec::leaf("Torso")]),
            NodeSpec::leaf("Mood"),
            NodeSpec::branch("Needs", vec![NodeSpec::leaf("Food")]),
            NodeSpec::leaf("Age"),
        ],
    )));
    session.handle(KeyAction::ExpandAllSiblings);
    assert_eq!(sink.last_announcement().as_deref(), Some("Expanded 2 categories"));

    session.handle(KeyAction::ExpandAllSiblings);
    assert_eq!(
        sink.last(),
        Some((
            "All categories already expanded at this level".to_string(),
            Priority::High
        ))
    );
    assert_eq!(sink.cues(), vec![FeedbackCue::ExpandOpen, FeedbackCue::Reject]);
}

#[test]
fn test_delete_rebuilds_and_keeps_place() {
    let bills = Arc::new(Mutex::new(vec![
        "Simple meal".to_string(),
        "Fine meal".to_string(),
        "Pemmican".to_string(),
    ]));
    let (mut session, sink) = open_tree(Arc::new(BillQueue {
        bills: bills.clone(),
    }));
    let rebuilds = Arc::new(Mutex::new(Vec::new()));
    let recorded = rebuilds.clone();
    session.rebuilt.connect(move |len| recorded.lock().push(*len));

    session.handle(KeyAction::Expand);
    session.handle(KeyAction::Expand);
    session.handle(KeyAction::Next);
    assert_eq!(session.navigator().current().map(|n| n.label()), Some("Fine meal"));

    session.handle(KeyAction::Delete);
    assert_eq!(*bills.lock(), vec!["Simple meal", "Pemmican"]);
    assert_eq!(*rebuilds.lock(), vec![4]);
    // The deleted bill is gone; focus falls back to its parent.
    assert_eq!(session.navigator().current().map(|n| n.label()), Some("Stove"));
    assert_eq!(
        sink.last_announcement().as_deref(),
        Some("Stove, expanded. 1 of 2, level 1.")
    );

    session.handle(KeyAction::Collapse);
    session.handle(KeyAction::Delete);
    assert_eq!(sink.last_announcement().as_deref(), Some("Cannot delete this item"));
}

#[test]
fn test_typeahead_speech() {
    let (mut session, sink) = open_tree(Arc::new(StaticTree::new(
        "Fruit",
        vec![
            NodeSpec::leaf("Apple"),
            NodeSpec::leaf("Apricot"),
            NodeSpec::leaf("Banana"),
        ],
    )));
    session.handle(KeyAction::TypeaheadChar('a'));
    session.handle(KeyAction::TypeaheadChar('p'));
    assert_eq!(
        sink.last_announcement().as_deref(),
        Some("Apple. match 1 of 2 for 'ap'.")
    );

    session.handle(KeyAction::TypeaheadChar('z'));
    assert_eq!(sink.last_announcement().as_deref(), Some("No matches for 'apz'"));
    assert_eq!(session.navigator().search().buffer(), "ap");

    session.handle(KeyAction::NextMatch);
    assert_eq!(
        sink.last_announcement().as_deref(),
        Some("Apricot. match 2 of 2 for 'ap'.")
    );

    session.handle(KeyAction::Next);
    assert_eq!(sink.last_announcement().as_deref(), Some("Banana. 3 of 3."));
    assert!(session.navigator().search().is_active());
}

#[test]
fn test_choice_menu_applies_selection() {
    let applied = Arc::new(Mutex::new(None));
    let target = applied.clone();
    let nodes = choice_nodes(
        vec![
            Choice::None,
            Choice::Entity("Stockpile zone 1"),
            Choice::value("Home area", 0),
        ],
        move |choice| {
            *target.lock() = Some(choice.label());
            Ok(ActionOutcome::Unchanged)
        },
    );
    let (mut session, sink) = open_tree(Arc::new(StaticTree::new("Allowed area", nodes)));
    let activations = Arc::new(Mutex::new(0));
    let counter = activations.clone();
    session.activated.connect(move |_| *counter.lock() += 1);

    session.handle(KeyAction::JumpLast);
    session.handle(KeyAction::Activate);
    assert_eq!(applied.lock().as_deref(), Some("Home area"));
    assert_eq!(*activations.lock(), 1);
    assert_eq!(sink.cues(), vec![FeedbackCue::Click]);
}

/// Designation toggles whose labels show the current state.
struct Designations {
    hunting: Arc<Mutex<bool>>,
}

impl TreeProvider for Designations {
    fn title(&self) -> String {
        "Designations".to_string()
    }

    fn build_roots(&self) -> Result<Vec<NodeSpec>, ProviderError> {
        let state = if *self.hunting.lock() { "on" } else { "off" };
        let hunting = self.hunting.clone();
        Ok(vec![
            NodeSpec::leaf("Cut plants").with_action(|| Ok(ActionOutcome::Unchanged)),
            NodeSpec::leaf(format!("Hunt: {state}")).with_action(move || {
                let mut flag = hunting.lock();
                *flag = !*flag;
                Ok(ActionOutcome::Rebuild)
            }),
        ])
    }
}

#[test]
fn test_action_requesting_rebuild_speaks_new_label() {
    let hunting = Arc::new(Mutex::new(false));
    let (mut session, sink) = open_tree(Arc::new(Designations {
        hunting: hunting.clone(),
    }));
    let rebuilds = Arc::new(Mutex::new(0));
    let counter = rebuilds.clone();
    session.rebuilt.connect(move |_| *counter.lock() += 1);

    session.handle(KeyAction::JumpLast);
    assert_eq!(sink.last_announcement().as_deref(), Some("Hunt: off. 2 of 2."));

    session.handle(KeyAction::Activate);
    assert!(*hunting.lock());
    assert_eq!(*rebuilds.lock(), 1);
    assert_eq!(session.navigator().cursor(), 1);
    assert_eq!(sink.last_announcement().as_deref(), Some("Hunt: on. 2 of 2."));

    // An action that changes nothing visible does not rebuild.
    session.handle(KeyAction::JumpFirst);
    session.handle(KeyAction::Activate);
    assert_eq!(*rebuilds.lock(), 1);
    assert_eq!(sink.cues(), vec![FeedbackCue::Click, FeedbackCue::Click]);
}

#[derive(Clone)]
struct Pet {
    id: u64,
    name: &'static str,
    size: f32,
}

struct Roster {
    pets: Arc<Mutex<Vec<Pet>>>,
    sorted: Option<(usize, bool)>,
}

impl GridProvider<Pet> for Roster {
    fn title(&self) -> String {
        "Animals".to_string()
    }

    fn columns(&self) -> Vec<ColumnSpec<Pet>> {
        vec![
            ColumnSpec::new("Name", |p: &Pet| p.name.to_string()),
            ColumnSpec::new("Size", |p: &Pet| format!("{:.1}", p.size)),
            ColumnSpec::new("Follow", |_p: &Pet| "No".to_string()).interactive(|_| Ok(())),
        ]
    }

    fn rows(&self) -> Result<Vec<Pet>, ProviderError> {
        Ok(self.pets.lock().clone())
    }

    fn identity(&self) -> Option<IdentityFn<Pet>> {
        Some(Arc::new(|p: &Pet| p.id))
    }

    fn initial_sort(&self) -> Option<(usize, bool)> {
        self.sorted
    }
}

fn pets() -> Vec<Pet> {
    vec![
        Pet { id: 1, name: "Rex", size: 1.2 },
        Pet { id: 2, name: "Ari", size: 3.4 },
        Pet { id: 3, name: "Bo", size: 0.8 },
    ]
}

#[test]
fn test_grid_session_speech() {
    let sink = Arc::new(RecordingSink::new());
    let roster = Arc::new(Roster {
        pets: Arc::new(Mutex::new(pets())),
        sorted: Some((0, false)),
    });
    let mut session =
        GridSession::open(roster, Outputs::shared(sink.clone()), NarrationConfig::default())
            .unwrap();
    assert_eq!(
        sink.last_announcement().as_deref(),
        Some("Animals. Name: Ari. Row 1 of 3")
    );

    session.handle(KeyAction::NextColumn);
    assert_eq!(sink.last_announcement().as_deref(), Some("Size: 3.4"));

    session.handle(KeyAction::Next);
    assert_eq!(sink.last_announcement().as_deref(), Some("Bo, Size: 0.8. Row 2 of 3"));

    session.handle(KeyAction::ToggleSort);
    assert_eq!(sink.last_announcement().as_deref(), Some("Sorted by Size, ascending"));
    assert_eq!(session.navigator().current_row().map(|p| p.name), Some("Bo"));
    assert_eq!(session.navigator().row(), 0);

    session.handle(KeyAction::ToggleSort);
    assert_eq!(sink.last_announcement().as_deref(), Some("Sorted by Size, descending"));
    assert_eq!(session.navigator().row(), 2);

    session.handle(KeyAction::Activate);
    assert_eq!(sink.last_announcement().as_deref(), Some("Bo, Size: 0.8. Row 3 of 3"));

    session.handle(KeyAction::NextColumn);
    session.handle(KeyAction::Activate);
    assert_eq!(sink.last_announcement().as_deref(), Some("Follow: No"));
    assert_eq!(sink.cues(), vec![FeedbackCue::Click, FeedbackCue::Click, FeedbackCue::Click]);
}

#[test]
fn test_grid_session_signals_and_refresh() {
    let sink = Arc::new(RecordingSink::new());
    let pets_state = Arc::new(Mutex::new(pets()));
    let roster = Arc::new(Roster {
        pets: pets_state.clone(),
        sorted: None,
    });
    let mut session =
        GridSession::open(roster, Outputs::shared(sink.clone()), NarrationConfig::default())
            .unwrap();

    let moves = Arc::new(Mutex::new(Vec::new()));
    let recorded = moves.clone();
    session.cursor_changed.connect(move |cell| recorded.lock().push(*cell));
    let sorts = Arc::new(Mutex::new(Vec::new()));
    let recorded_sorts = sorts.clone();
    session.sorted.connect(move |sort| recorded_sorts.lock().push(*sort));

    session.handle(KeyAction::JumpLast);
    session.handle(KeyAction::ToggleSort);
    assert_eq!(*moves.lock(), vec![(2, 0), (1, 0)]);
    assert_eq!(*sorts.lock(), vec![(0, false)]);

    pets_state.lock().insert(0, Pet { id: 4, name: "Ace", size: 2.0 });
    assert!(session.refresh());
    assert_eq!(session.navigator().current_row().map(|p| p.name), Some("Bo"));
    assert_eq!(session.navigator().row(), 2);

    session.handle(KeyAction::Expand);
    assert_eq!(sink.last_announcement().as_deref(), Some("Name: Bo. Row 3 of 4"));

    assert!(!session.handle(KeyAction::Cancel));
    assert!(!session.is_open());
}

#[test]
fn test_empty_grid_session() {
    let sink = Arc::new(RecordingSink::new());
    let roster = Arc::new(Roster {
        pets: Arc::new(Mutex::new(Vec::new())),
        sorted: None,
    });
    let mut session =
        GridSession::open(roster, Outputs::shared(sink.clone()), NarrationConfig::default())
            .unwrap();
    assert_eq!(sink.announcements(), vec!["Animals: Empty"]);
    for action in [
        KeyAction::Next,
        KeyAction::NextColumn,
        KeyAction::Activate,
        KeyAction::TypeaheadChar('r'),
        KeyAction::ToggleSort,
    ] {
        assert!(session.handle(action));
    }
    assert_eq!(sink.announcements(), vec!["Animals: Empty"]);
    assert!(sink.cues().is_empty());
    assert_eq!(session.navigator().model().sort_column(), None);
}

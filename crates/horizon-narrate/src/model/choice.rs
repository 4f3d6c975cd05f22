//! Option choices for submenus.
//!
//! Many menus end in a short list of options to pick from: "no area",
//! a specific stockpile zone, or one value of a small enumeration.
//! [`Choice`] captures those kinds as a closed sum type so labeling and
//! applying an option is a single exhaustive match.

use std::fmt;
use std::sync::Arc;

use super::node::{ActionOutcome, NodeSpec};
use crate::error::ProviderError;

/// One selectable option in a submenu.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Choice<E> {
    /// The explicit "nothing" option.
    None,
    /// A reference to a provider entity.
    Entity(E),
    /// One value of an enumeration, by display name and ordinal.
    Value { name: String, index: usize },
}

impl<E: fmt::Display> Choice<E> {
    /// The spoken label of this option.
    pub fn label(&self) -> String {
        match self {
            Choice::None => "None".to_string(),
            Choice::Entity(entity) => entity.to_string(),
            Choice::Value { name, .. } => name.clone(),
        }
    }
}

impl<E> Choice<E> {
    /// Creates an enumeration value choice.
    pub fn value(name: impl Into<String>, index: usize) -> Self {
        Choice::Value {
            name: name.into(),
            index,
        }
    }

    /// Returns `true` for [`Choice::None`].
    pub fn is_none(&self) -> bool {
        matches!(self, Choice::None)
    }
}

/// Turns a list of choices into leaf nodes.
///
/// Activating a leaf calls `apply` with the choice it was built from; its
/// outcome decides whether the menu rebuilds.
///
/// # Example
///
/// ```
/// use horizon_narrate::model::{choice_nodes, ActionOutcome, Choice};
///
/// let nodes = choice_nodes(
///     vec![Choice::None, Choice::Entity("Stockpile 1"), Choice::value("Home area", 0)],
///     |_choice| Ok(ActionOutcome::Rebuild),
/// );
/// let labels: Vec<_> = nodes.iter().map(|n| n.label()).collect();
/// assert_eq!(labels, vec!["None", "Stockpile 1", "Home area"]);
/// ```
pub fn choice_nodes<E, F>(choices: Vec<Choice<E>>, apply: F) -> Vec<NodeSpec>
where
    E: fmt::Display + Clone + Send + Sync + 'static,
    F: Fn(&Choice<E>) -> Result<ActionOutcome, ProviderError> + Send + Sync + 'static,
{
    let apply = Arc::new(apply);
    choices
        .into_iter()
        .map(|choice| {
            let apply = apply.clone();
            let label = choice.label();
            NodeSpec::leaf(label).with_action(move || apply(&choice))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    #[derive(Debug, Clone, PartialEq)]
    struct Zone(u32);

    impl fmt::Display for Zone {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "Zone {}", self.0)
        }
    }

    #[test]
    fn test_choice_labels() {
        assert_eq!(Choice::<Zone>::None.label(), "None");
        assert_eq!(Choice::Entity(Zone(4)).label(), "Zone 4");
        assert_eq!(Choice::<Zone>::value("Unrestricted", 2).label(), "Unrestricted");
        assert!(Choice::<Zone>::None.is_none());
    }

    #[test]
    fn test_choice_nodes_apply_selected() {
        let applied = Arc::new(Mutex::new(Vec::new()));
        let sink = applied.clone();
        let nodes = choice_nodes(vec![Choice::None, Choice::Entity(Zone(1))], move |choice| {
            sink.lock().push(choice.clone());
            Ok(ActionOutcome::Unchanged)
        });

        assert_eq!(nodes.len(), 2);
        let action = nodes[1].on_activate.clone();
        assert!(action.is_some_and(|action| action().is_ok()));
        assert_eq!(*applied.lock(), vec![Choice::Entity(Zone(1))]);
    }
}

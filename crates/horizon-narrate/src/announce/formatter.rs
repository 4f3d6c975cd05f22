//! Turns navigation state into spoken text.

use std::collections::HashMap;

use horizon_narrate_core::logging::targets;

use crate::config::NarrationConfig;
use crate::model::ExpansionState;
use crate::search::strip_markup;

/// Typeahead state to speak instead of the sibling position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchContext<'a> {
    /// The search buffer.
    pub buffer: &'a str,
    /// 1-based number of the current match.
    pub match_number: usize,
    /// Total number of matches.
    pub match_count: usize,
}

/// Everything the formatter needs to describe one tree item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ItemDescription<'a> {
    /// Display label; markup and trailing punctuation are removed.
    pub label: &'a str,
    /// Expansion state of the item.
    pub state: ExpansionState,
    /// 1-based position among siblings.
    pub position: usize,
    /// Number of siblings, including the item.
    pub sibling_count: usize,
    /// Nesting depth; 0 for top-level items.
    pub depth: usize,
    /// Active search, when the item is one of its matches.
    pub search: Option<SearchContext<'a>>,
}

/// Formats announcements and remembers the last depth spoken per context.
///
/// A context is usually the menu title. Keeping the depth per context stops
/// one menu's level from suppressing the level in another.
///
/// # Example
///
/// ```
/// use horizon_narrate::announce::{AnnouncementFormatter, ItemDescription};
/// use horizon_narrate::model::ExpansionState;
///
/// let mut formatter = AnnouncementFormatter::default();
/// let mut item = ItemDescription {
///     label: "Apple.",
///     state: ExpansionState::Collapsed,
///     position: 1,
///     sibling_count: 3,
///     depth: 1,
///     search: None,
/// };
/// assert_eq!(formatter.format("Fruit", &item), "Apple, collapsed. 1 of 3, level 2.");
///
/// item.position = 2;
/// item.state = ExpansionState::Terminal;
/// item.label = "Pear";
/// assert_eq!(formatter.format("Fruit", &item), "Pear. 2 of 3.");
/// ```
#[derive(Debug, Clone, Default)]
pub struct AnnouncementFormatter {
    config: NarrationConfig,
    last_depth: HashMap<String, usize>,
}

impl AnnouncementFormatter {
    /// Creates a formatter honoring `config`.
    pub fn new(config: NarrationConfig) -> Self {
        Self {
            config,
            last_depth: HashMap::new(),
        }
    }

    /// The settings in effect.
    pub fn config(&self) -> &NarrationConfig {
        &self.config
    }

    /// Forgets the last depth of `context`; the next item states its level.
    pub fn reset_context(&mut self, context: &str) {
        self.last_depth.remove(context);
    }

    /// Describes a tree item.
    pub fn format(&mut self, context: &str, item: &ItemDescription<'_>) -> String {
        let mut text = clean_label(item.label);

        if self.config.announce_expansion_state {
            match item.state {
                ExpansionState::Expanded => text.push_str(", expanded"),
                ExpansionState::Collapsed => text.push_str(", collapsed"),
                ExpansionState::Terminal => {}
            }
        }

        let mut suffix = Vec::new();
        match item.search {
            Some(search) => suffix.push(format!(
                "match {} of {} for '{}'",
                search.match_number, search.match_count, search.buffer
            )),
            None if self.config.announce_position => {
                suffix.push(format!("{} of {}", item.position, item.sibling_count));
            }
            None => {}
        }

        let level_changed = self.last_depth.insert(context.to_string(), item.depth) != Some(item.depth);
        if level_changed && self.config.announce_level_changes {
            suffix.push(format!("level {}", item.depth + 1));
        }

        if suffix.is_empty() {
            text.push('.');
        } else {
            text.push_str(". ");
            text.push_str(&suffix.join(", "));
            text.push('.');
        }
        tracing::trace!(target: targets::ANNOUNCE, context, depth = item.depth, level_changed, "formatted item");
        text
    }

    /// "`<column>: <value>`", spoken when the column cursor moves.
    pub fn format_cell(&self, column: &str, value: &str) -> String {
        format!("{}: {}", clean_label(column), clean_label(value))
    }

    /// Describes a grid row from the current column.
    ///
    /// The row label is left out when the current column is the one that
    /// labels the row, so the name is not read twice.
    pub fn format_row(
        &self,
        row_label: Option<&str>,
        column: &str,
        value: &str,
        row: usize,
        row_count: usize,
        search: Option<SearchContext<'_>>,
    ) -> String {
        let mut text = String::new();
        if let Some(label) = row_label {
            text.push_str(&clean_label(label));
            text.push_str(", ");
        }
        text.push_str(&self.format_cell(column, value));
        match search {
            Some(search) => text.push_str(&format!(
                ". match {} of {} for '{}'",
                search.match_number, search.match_count, search.buffer
            )),
            None if self.config.announce_position => {
                text.push_str(&format!(". Row {row} of {row_count}"));
            }
            None => {}
        }
        text
    }

    /// "Sorted by `<column>`, ascending|descending".
    pub fn format_sort(&self, column: &str, descending: bool) -> String {
        let direction = if descending { "descending" } else { "ascending" };
        format!("Sorted by {}, {direction}", clean_label(column))
    }

    /// "Expanded N categories".
    pub fn format_expanded_count(&self, count: usize) -> String {
        if count == 1 {
            "Expanded 1 category".to_string()
        } else {
            format!("Expanded {count} categories")
        }
    }
}

/// Strips markup and trailing sentence punctuation.
fn clean_label(label: &str) -> String {
    strip_markup(label)
        .trim()
        .trim_end_matches(['.', '!', '?', ',', ';', ':'])
        .trim_end()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(label: &str, depth: usize) -> ItemDescription<'_> {
        ItemDescription {
            label,
            state: ExpansionState::Terminal,
            position: 2,
            sibling_count: 3,
            depth,
            search: None,
        }
    }

    #[test]
    fn test_trailing_punctuation_stripped() {
        let mut formatter = AnnouncementFormatter::default();
        assert_eq!(formatter.format("Menu", &item("Foo..", 0)), "Foo. 2 of 3, level 1.");
    }

    #[test]
    fn test_level_only_on_change() {
        let mut formatter = AnnouncementFormatter::default();
        formatter.format("Menu", &item("A", 0));
        assert_eq!(formatter.format("Menu", &item("B", 0)), "B. 2 of 3.");
        assert_eq!(formatter.format("Menu", &item("B1", 1)), "B1. 2 of 3, level 2.");
        assert_eq!(formatter.format("Menu", &item("C", 0)), "C. 2 of 3, level 1.");
    }

    #[test]
    fn test_contexts_are_independent() {
        let mut formatter = AnnouncementFormatter::default();
        formatter.format("Inspect", &item("Health", 1));
        assert_eq!(
            formatter.format("Animals", &item("Rex", 1)),
            "Rex. 2 of 3, level 2."
        );
        formatter.reset_context("Inspect");
        assert_eq!(
            formatter.format("Inspect", &item("Needs", 1)),
            "Needs. 2 of 3, level 2."
        );
    }

    #[test]
    fn test_search_replaces_position() {
        let mut formatter = AnnouncementFormatter::default();
        let mut described = item("Apricot", 0);
        described.state = ExpansionState::Expanded;
        described.search = Some(SearchContext {
            buffer: "ap",
            match_number: 2,
            match_count: 2,
        });
        assert_eq!(
            formatter.format("Fruit", &described),
            "Apricot, expanded. match 2 of 2 for 'ap', level 1."
        );
    }

    #[test]
    fn test_config_switches() {
        let mut formatter = AnnouncementFormatter::new(NarrationConfig {
            announce_position: false,
            announce_level_changes: false,
            announce_expansion_state: false,
            ..Default::default()
        });
        let mut described = item("<b>Rex</b>", 3);
        described.state = ExpansionState::Collapsed;
        assert_eq!(formatter.format("Menu", &described), "Rex.");
    }

    #[test]
    fn test_grid_texts() {
        let formatter = AnnouncementFormatter::default();
        assert_eq!(formatter.format_cell("Size", "1.2"), "Size: 1.2");
        assert_eq!(
            formatter.format_row(Some("Rex"), "Size", "1.2", 2, 3, None),
            "Rex, Size: 1.2. Row 2 of 3"
        );
        assert_eq!(
            formatter.format_row(None, "Name", "Ari", 1, 3, None),
            "Name: Ari. Row 1 of 3"
        );
        assert_eq!(formatter.format_sort("Size", true), "Sorted by Size, descending");
        assert_eq!(formatter.format_expanded_count(2), "Expanded 2 categories");
    }
}

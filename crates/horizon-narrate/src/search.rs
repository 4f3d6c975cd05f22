//! Typeahead search over a sequence of labels.
//!
//! Typing characters accumulates a buffer that is prefix-matched,
//! case-insensitively, against the labels of the current visible sequence.
//! The search holds no reference to the tree: every call receives the
//! labels as they are *now*, and matches are always recomputed from the
//! buffer, never patched.
//!
//! A keystroke that would leave zero matches is refused and the buffer is
//! rolled back, so an applied search always has at least one match.

use std::borrow::Cow;
use std::sync::LazyLock;

use horizon_narrate_core::logging::targets;
use regex::Regex;
use unicode_segmentation::UnicodeSegmentation;

use crate::error::Rejection;

static MARKUP: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(r"<[^>]*>").ok());

/// Removes `<...>` rich-text tags from a label.
///
/// ```
/// use horizon_narrate::search::strip_markup;
///
/// assert_eq!(strip_markup("<color=#ff0000>Rex</color> (bonded)"), "Rex (bonded)");
/// assert_eq!(strip_markup("plain"), "plain");
/// ```
pub fn strip_markup(label: &str) -> Cow<'_, str> {
    match MARKUP.as_ref() {
        Some(re) => re.replace_all(label, ""),
        None => Cow::Borrowed(label),
    }
}

/// Outcome of a backspace.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchStep {
    /// The shorter buffer still matches; the cursor should go here.
    Matched(usize),
    /// The buffer became empty and the search ended.
    Cleared,
}

/// Incremental typeahead state.
#[derive(Debug, Clone, Default)]
pub struct TypeaheadSearch {
    buffer: String,
    matches: Vec<usize>,
    current: usize,
}

impl TypeaheadSearch {
    /// Creates an inactive search.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a search buffer is active.
    pub fn is_active(&self) -> bool {
        !self.buffer.is_empty()
    }

    /// The accumulated search text.
    pub fn buffer(&self) -> &str {
        &self.buffer
    }

    /// Indices of all matching labels, in sequence order.
    pub fn matches(&self) -> &[usize] {
        &self.matches
    }

    /// The index of the current match, if the search is active.
    pub fn current_match(&self) -> Option<usize> {
        self.matches.get(self.current).copied()
    }

    /// Ends the search.
    pub fn clear(&mut self) {
        if self.is_active() {
            tracing::trace!(target: targets::SEARCH, buffer = %self.buffer, "search cleared");
        }
        self.buffer.clear();
        self.matches.clear();
        self.current = 0;
    }

    /// Appends a character and moves to the match at or after `cursor`.
    ///
    /// Returns the index to move the cursor to. With zero matches the
    /// buffer is left as it was and [`Rejection::NoMatches`] quotes the
    /// attempted buffer.
    pub fn push_char<S: AsRef<str>>(
        &mut self,
        c: char,
        labels: &[S],
        cursor: usize,
    ) -> Result<usize, Rejection> {
        let mut candidate = self.buffer.clone();
        candidate.push(c);

        let matches = find_matches(&candidate, labels);
        if matches.is_empty() {
            tracing::debug!(target: targets::SEARCH, buffer = %candidate, "no matches; rolled back");
            return Err(Rejection::NoMatches(candidate));
        }

        self.buffer = candidate;
        self.matches = matches;
        self.current = nearest_at_or_after(&self.matches, cursor);
        tracing::trace!(
            target: targets::SEARCH,
            buffer = %self.buffer,
            matches = self.matches.len(),
            "search updated"
        );
        Ok(self.matches[self.current])
    }

    /// Removes the last character (grapheme) and recomputes the matches.
    pub fn backspace<S: AsRef<str>>(
        &mut self,
        labels: &[S],
        cursor: usize,
    ) -> Result<SearchStep, Rejection> {
        if !self.is_active() {
            return Err(Rejection::NoActiveSearch);
        }

        if let Some((offset, _)) = self.buffer.grapheme_indices(true).next_back() {
            self.buffer.truncate(offset);
        }
        if self.buffer.is_empty() {
            self.clear();
            return Ok(SearchStep::Cleared);
        }

        self.matches = find_matches(&self.buffer, labels);
        if self.matches.is_empty() {
            // Labels changed under the search without a rebuild notification.
            self.clear();
            return Ok(SearchStep::Cleared);
        }
        self.current = nearest_at_or_after(&self.matches, cursor);
        Ok(SearchStep::Matched(self.matches[self.current]))
    }

    /// Steps to the first match after `cursor`, wrapping around.
    pub fn next_match(&mut self, cursor: usize) -> Option<usize> {
        if self.matches.is_empty() {
            return None;
        }
        self.current = self
            .matches
            .iter()
            .position(|&m| m > cursor)
            .unwrap_or(0);
        self.current_match()
    }

    /// Steps to the last match before `cursor`, wrapping around.
    pub fn previous_match(&mut self, cursor: usize) -> Option<usize> {
        if self.matches.is_empty() {
            return None;
        }
        self.current = self
            .matches
            .iter()
            .rposition(|&m| m < cursor)
            .unwrap_or(self.matches.len() - 1);
        self.current_match()
    }

    /// `(1-based match number, match count)` if `cursor` is on a match.
    pub fn match_position(&self, cursor: usize) -> Option<(usize, usize)> {
        self.matches
            .iter()
            .position(|&m| m == cursor)
            .map(|i| (i + 1, self.matches.len()))
    }
}

fn find_matches<S: AsRef<str>>(buffer: &str, labels: &[S]) -> Vec<usize> {
    let needle = buffer.to_lowercase();
    labels
        .iter()
        .enumerate()
        .filter(|(_, label)| {
            strip_markup(label.as_ref())
                .trim_start()
                .to_lowercase()
                .starts_with(&needle)
        })
        .map(|(i, _)| i)
        .collect()
}

fn nearest_at_or_after(matches: &[usize], cursor: usize) -> usize {
    matches.iter().position(|&m| m >= cursor).unwrap_or(0)
}

//! Rejections and provider failures.
//!
//! Navigation is total: every key action either does something or is
//! rejected with a [`Rejection`], which the session turns into a reject cue
//! plus a short spoken explanation. Provider callbacks report failures with
//! [`ProviderError`]; the engine contains them per node and per call.

/// An error returned by a provider callback.
///
/// Lazy child loaders, leaf actions, delete handlers and interactive cell
/// handlers return this when the game state they wrap refuses the request.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct ProviderError {
    message: String,
}

impl ProviderError {
    /// Create a provider error with the given message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// The failure message.
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<ProviderError> for horizon_narrate_core::Error {
    fn from(err: ProviderError) -> Self {
        Self::Provider(err.message)
    }
}

/// Why a well-formed key action did not apply.
///
/// The `Display` text is what gets spoken to the user.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Rejection {
    /// The menu has nothing in it.
    #[error("Empty")]
    EmptyModel,

    /// Expand on a node with no children.
    #[error("Cannot expand")]
    CannotExpand,

    /// Collapse on a top-level node that is already collapsed.
    #[error("Already at top level")]
    AtTopLevel,

    /// Delete on a node without a delete handler.
    #[error("Cannot delete this item")]
    NotDeletable,

    /// Activate on a node with neither children nor an action.
    #[error("Nothing to activate")]
    NothingToActivate,

    /// Expand-all-siblings where no sibling has children.
    #[error("No expandable categories at this level")]
    NoExpandableSiblings,

    /// Expand-all-siblings where every expandable sibling is already open.
    #[error("All categories already expanded at this level")]
    AllSiblingsExpanded,

    /// Typeahead found nothing; the buffer was rolled back.
    #[error("No matches for '{0}'")]
    NoMatches(String),

    /// Match stepping or backspace without an active search.
    #[error("No active search")]
    NoActiveSearch,

    /// A grid with no columns cannot move its column cursor or sort.
    #[error("No columns")]
    NoColumns,

    /// A provider callback failed; the affected node was demoted or the
    /// request dropped.
    #[error("{label}: {message}")]
    ProviderFailed { label: String, message: String },
}

impl Rejection {
    pub(crate) fn provider_failed(label: impl Into<String>, err: &ProviderError) -> Self {
        Self::ProviderFailed {
            label: label.into(),
            message: err.message().to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejection_messages() {
        assert_eq!(
            Rejection::NoMatches("apz".into()).to_string(),
            "No matches for 'apz'"
        );
        assert_eq!(
            Rejection::AllSiblingsExpanded.to_string(),
            "All categories already expanded at this level"
        );
        let failed = Rejection::provider_failed("Stockpile", &ProviderError::new("zone removed"));
        assert_eq!(failed.to_string(), "Stockpile: zone removed");
    }

    #[test]
    fn test_provider_error_into_core_error() {
        let err: horizon_narrate_core::Error = ProviderError::new("no pawn selected").into();
        assert_eq!(err.to_string(), "Provider failure: no pawn selected");
    }
}

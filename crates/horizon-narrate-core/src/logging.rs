//! Logging facilities for Horizon Narrate.
//!
//! Horizon Narrate uses the `tracing` crate for instrumentation. Nothing is
//! printed unless the host installs a subscriber:
//!
//! ```ignore
//! fn main() {
//!     tracing_subscriber::fmt()
//!         .with_env_filter("horizon_narrate::provider=warn")
//!         .init();
//! }
//! ```
//!
//! Provider callback failures are reported on [`targets::PROVIDER`]; this is
//! the diagnostic channel a host should keep enabled in release builds.

/// Span names used throughout Horizon Narrate for tracing.
pub mod span_names {
    /// Visible sequence rebuild span.
    pub const REBUILD: &str = "horizon_narrate::rebuild";
    /// Grid re-sort span.
    pub const SORT: &str = "horizon_narrate::sort";
    /// Key action dispatch span.
    pub const DISPATCH: &str = "horizon_narrate::dispatch";
}

/// Target names for log filtering.
///
/// Use these with `tracing` directives to filter logs by subsystem.
pub mod targets {
    /// Core framework target.
    pub const CORE: &str = "horizon_narrate_core";
    /// Signal emission target.
    pub const SIGNAL: &str = "horizon_narrate_core::signal";
    /// Tree model and navigator target.
    pub const TREE: &str = "horizon_narrate::tree";
    /// Grid model and navigator target.
    pub const GRID: &str = "horizon_narrate::grid";
    /// Typeahead search target.
    pub const SEARCH: &str = "horizon_narrate::search";
    /// Menu session lifecycle target.
    pub const SESSION: &str = "horizon_narrate::session";
    /// Provider callback failures.
    pub const PROVIDER: &str = "horizon_narrate::provider";
    /// Text handed to the speech sink.
    pub const ANNOUNCE: &str = "horizon_narrate::announce";
}

/// A guard that keeps a tracing span entered until dropped.
///
/// This is useful for tracking the duration of operations.
#[derive(Debug)]
pub struct PerfSpan {
    _span: tracing::span::EnteredSpan,
}

impl PerfSpan {
    /// Create a new performance span.
    pub fn new(name: &'static str) -> Self {
        let span = tracing::debug_span!(target: "horizon_narrate::perf", "perf", operation = name);
        Self {
            _span: span.entered(),
        }
    }
}

/// Trace-level log on the core target.
#[macro_export]
macro_rules! narrate_trace {
    ($($arg:tt)*) => {
        tracing::trace!(target: "horizon_narrate_core", $($arg)*)
    };
}

/// Debug-level log on the core target.
#[macro_export]
macro_rules! narrate_debug {
    ($($arg:tt)*) => {
        tracing::debug!(target: "horizon_narrate_core", $($arg)*)
    };
}

/// Info-level log on the core target.
#[macro_export]
macro_rules! narrate_info {
    ($($arg:tt)*) => {
        tracing::info!(target: "horizon_narrate_core", $($arg)*)
    };
}

/// Warn-level log on the core target.
#[macro_export]
macro_rules! narrate_warn {
    ($($arg:tt)*) => {
        tracing::warn!(target: "horizon_narrate_core", $($arg)*)
    };
}

/// Error-level log on the core target.
#[macro_export]
macro_rules! narrate_error {
    ($($arg:tt)*) => {
        tracing::error!(target: "horizon_narrate_core", $($arg)*)
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_perf_span() {
        let _guard = tracing::subscriber::set_default(
            tracing_subscriber::fmt().with_test_writer().finish(),
        );
        let _span = PerfSpan::new("test_operation");
        narrate_debug!("inside perf span");
    }

    #[test]
    fn test_targets_are_namespaced() {
        for target in [
            targets::TREE,
            targets::GRID,
            targets::SEARCH,
            targets::SESSION,
            targets::PROVIDER,
            targets::ANNOUNCE,
        ] {
            assert!(target.starts_with("horizon_narrate::"));
        }
    }
}

//! Error types for Horizon Narrate.
//!
//! Navigation operations never fail with these errors: a key press that does
//! not apply is a rejection, reported to the user and not to the caller's
//! `?`. The types here cover host-facing plumbing such as loading narration
//! settings or a provider that cannot produce its initial data.

use std::path::PathBuf;

/// Result type alias for Horizon Narrate operations.
pub type Result<T> = std::result::Result<T, Error>;

/// The main error type for Horizon Narrate.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Reading or writing a settings file failed.
    #[error("Failed to access settings file '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A settings document could not be parsed or serialized.
    #[error("Invalid {format} settings: {message}")]
    Config {
        format: &'static str,
        message: String,
    },

    /// A data provider failed outside of a navigation operation.
    #[error("Provider failure: {0}")]
    Provider(String),
}

impl Error {
    /// Create an I/O error for a settings path.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Create a configuration format error.
    pub fn config(format: &'static str, message: impl Into<String>) -> Self {
        Self::Config {
            format,
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::config("TOML", "expected a boolean");
        assert_eq!(err.to_string(), "Invalid TOML settings: expected a boolean");

        let err = Error::io(
            "narration.toml",
            std::io::Error::new(std::io::ErrorKind::NotFound, "missing"),
        );
        assert!(err.to_string().contains("narration.toml"));
        assert!(std::error::Error::source(&err).is_some());
    }
}

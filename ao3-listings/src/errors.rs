//! Error types for archive listing traversal.
//!
//! Transient server conditions (edge overload, "Retry later") never reach
//! this type; they are absorbed by the fetcher's retry policy. Deleted and
//! locked list items are not errors either; they are counted in the
//! traversal outcome.

use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, ArchiveError>;

/// The main error type for archive operations.
#[derive(Debug, Error)]
pub enum ArchiveError {
    /// The server answered with a status that is neither success nor a
    /// recognised transient condition.
    #[error("Error getting url {url}: {status}, {reason}")]
    Fetch {
        /// The requested URL, including its page number.
        url: String,
        /// HTTP status code.
        status: u16,
        /// Reason phrase reported with the status.
        reason: String,
    },

    /// The request never produced a response (connect, TLS, reset).
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// A list item is missing fields and carries no known anomaly marker.
    #[error("Unexpected listing markup: {reason}{}", item_suffix(.item))]
    UnexpectedMarkup {
        /// What was missing or malformed.
        reason: String,
        /// The `id` attribute of the offending item, when it has one.
        item: Option<String>,
    },

    /// Caller-supplied input could not be interpreted.
    #[error("{input:?} is not a recognised {expected}")]
    BadInput {
        /// The offending input.
        input: String,
        /// What the input was expected to be.
        expected: &'static str,
    },

    /// A CSS selector in the markup table failed to compile.
    #[error("Invalid selector: {0}")]
    Selector(String),

    /// A regular expression in the markup table failed to compile.
    #[error("Invalid pattern: {0}")]
    Pattern(#[from] regex::Error),

    /// The traversal was cancelled through its token.
    #[error("Traversal cancelled: {0}")]
    Cancelled(String),

    /// A traversal was driven again after it had already failed.
    #[error("Traversal aborted by an earlier error")]
    Aborted,

    /// Session or client construction failed.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

fn item_suffix(item: &Option<String>) -> String {
    item.as_deref()
        .map(|i| format!(" (item {i})"))
        .unwrap_or_default()
}

impl ArchiveError {
    /// Creates an unexpected-markup error.
    #[must_use]
    pub fn markup(reason: impl Into<String>, item: Option<&str>) -> Self {
        Self::UnexpectedMarkup {
            reason: reason.into(),
            item: item.map(String::from),
        }
    }

    /// Whether this error came from the fetch layer.
    #[must_use]
    pub const fn is_fetch_error(&self) -> bool {
        matches!(self, Self::Fetch { .. } | Self::Transport(_))
    }

    /// Whether this error was caused by cancellation.
    #[must_use]
    pub const fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled(_))
    }

    /// The HTTP status carried by a fatal fetch error.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Fetch { status, .. } => Some(*status),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_error_display() {
        let err = ArchiveError::Fetch {
            url: "https://archiveofourown.org/works?page=2".to_string(),
            status: 404,
            reason: "Not Found".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Error getting url https://archiveofourown.org/works?page=2: 404, Not Found"
        );
        assert!(err.is_fetch_error());
        assert_eq!(err.status(), Some(404));
    }

    #[test]
    fn test_markup_error_display() {
        let err = ArchiveError::markup("list item has no heading", Some("work_123"));
        assert_eq!(
            err.to_string(),
            "Unexpected listing markup: list item has no heading (item work_123)"
        );

        let anonymous = ArchiveError::markup("heading link has no href", None);
        assert_eq!(
            anonymous.to_string(),
            "Unexpected listing markup: heading link has no href"
        );
        assert!(!anonymous.is_fetch_error());
        assert_eq!(anonymous.status(), None);
    }

    #[test]
    fn test_bad_input_names_input() {
        let err = ArchiveError::BadInput {
            input: "https://example.com/works/1".to_string(),
            expected: "AO3 work URL",
        };
        assert_eq!(
            err.to_string(),
            "\"https://example.com/works/1\" is not a recognised AO3 work URL"
        );
    }

    #[test]
    fn test_cancelled() {
        let err = ArchiveError::Cancelled("shutdown".to_string());
        assert!(err.is_cancelled());
        assert_eq!(err.to_string(), "Traversal cancelled: shutdown");
    }
}

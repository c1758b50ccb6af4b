//! Error handling for rosterd
//!
//! This module provides the error taxonomy for the roster pipeline and user-friendly
//! error reporting for the CLI. The error system is built around two ideas:
//! 1. **Strongly-typed errors** so the pipeline can tell fatal failures from recoverable ones
//! 2. **User-friendly messages** with actionable suggestions when the CLI surfaces them
//!
//! # Architecture
//!
//! - [`RosterError`] - Enumerated failures for every pipeline stage and collaborator
//! - [`SkipRecord`] - Typed signal that a remote record lacks a required property shape
//! - [`ErrorContext`] - Wrapper that adds user-friendly details and suggestions
//!
//! # Propagation Policy
//!
//! | Error | Raised by | Policy |
//! |-------|-----------|--------|
//! | [`RosterError::SourceUnavailable`] | content reads | fatal at the top of the pipeline, member-local inside the join |
//! | [`RosterError::NotFound`] | named-node resolution | fatal |
//! | [`RosterError::MediaFetchFailed`] | media sync | member dropped |
//! | [`RosterError::UnknownTeamLabel`] | roster assembly | fatal |
//! | [`RosterError::StorageWriteFailed`] | blob writes | logged and swallowed |
//!
//! # Examples
//!
//! ```rust,no_run
//! use rosterd::core::{RosterError, user_friendly_error};
//!
//! let error = RosterError::NotFound {
//!     kind: "collection".to_string(),
//!     title: "Members".to_string(),
//!     parent: "period page".to_string(),
//! };
//! assert!(error.is_fatal());
//!
//! let context = user_friendly_error(anyhow::Error::from(error));
//! context.display();
//! ```

use colored::Colorize;
use std::fmt;
use thiserror::Error;

/// The main error type for roster pipeline operations.
///
/// Every variant carries plain strings so errors can be cloned into logs and
/// responses without holding on to transport types.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RosterError {
    /// A read from the remote content source failed.
    ///
    /// Covers transport errors, non-success responses and undecodable payloads.
    /// `transient` records whether the failure was worth retrying at the
    /// transport boundary (timeouts, 429, 5xx).
    #[error("Content source unavailable during {operation}: {reason}")]
    SourceUnavailable {
        /// The remote operation that failed (e.g., "query collection abc")
        operation: String,
        /// Reason for the failure
        reason: String,
        /// Whether the failure is eligible for retry
        transient: bool,
    },

    /// An expected named node was absent beneath its parent.
    #[error("No {kind} titled '{title}' found under {parent}")]
    NotFound {
        /// The kind of child that was searched for ("page" or "collection")
        kind: String,
        /// The exact title that was requested
        title: String,
        /// Description of the parent node that was searched
        parent: String,
    },

    /// An uploaded profile image could not be fetched from its source.
    #[error("Failed to fetch media from {url}: {reason}")]
    MediaFetchFailed {
        /// The source URL of the image
        url: String,
        /// Reason for the failure
        reason: String,
    },

    /// A membership record names a team with no metadata entry.
    #[error("Membership references unknown team '{team}'")]
    UnknownTeamLabel {
        /// The team label found on the membership record
        team: String,
    },

    /// Writing an object to the blob store failed.
    #[error("Failed to write '{key}' to blob store: {reason}")]
    StorageWriteFailed {
        /// Bucket-qualified key of the object
        key: String,
        /// Reason for the failure
        reason: String,
        /// Whether the failure is eligible for retry
        transient: bool,
    },

    /// Reading an object from the blob store failed for a reason other than absence.
    #[error("Failed to read '{key}' from blob store: {reason}")]
    StorageReadFailed {
        /// Bucket-qualified key of the object
        key: String,
        /// Reason for the failure
        reason: String,
        /// Whether the failure is eligible for retry
        transient: bool,
    },

    /// The snapshot template could not be rendered.
    #[error("Failed to render snapshot: {reason}")]
    RenderFailed {
        /// Reason reported by the template engine
        reason: String,
    },

    /// Configuration is missing or invalid.
    #[error("Configuration error: {message}")]
    ConfigError {
        /// Description of the configuration problem
        message: String,
    },
}

impl RosterError {
    /// Whether this error aborts a pipeline run when it reaches the top level.
    ///
    /// Media failures and storage writes are recovered locally; everything else
    /// stops the run and prevents the snapshot from being cached.
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        !matches!(
            self,
            Self::MediaFetchFailed { .. }
                | Self::StorageWriteFailed { .. }
                | Self::StorageReadFailed { .. }
        )
    }

    /// Whether a retry at the transport boundary could succeed.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        match self {
            Self::SourceUnavailable { transient, .. }
            | Self::StorageWriteFailed { transient, .. }
            | Self::StorageReadFailed { transient, .. } => *transient,
            _ => false,
        }
    }

    /// Shorthand for a non-transient [`RosterError::SourceUnavailable`].
    pub fn source(operation: impl Into<String>, reason: impl fmt::Display) -> Self {
        Self::SourceUnavailable {
            operation: operation.into(),
            reason: reason.to_string(),
            transient: false,
        }
    }
}

/// Signal that a remote record does not have the property shape a parser needs.
///
/// Parsers return this instead of [`RosterError`]: a malformed record is skipped
/// and logged, it never aborts the run.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("skipping record {record_id}: {reason}")]
pub struct SkipRecord {
    /// Identifier of the offending record
    pub record_id: String,
    /// What was missing or malformed
    pub reason: String,
}

impl SkipRecord {
    /// Create a new skip signal for `record_id`.
    pub fn new(record_id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            record_id: record_id.into(),
            reason: reason.into(),
        }
    }
}

/// Error context wrapper that provides user-friendly error information
///
/// Wraps a [`RosterError`] with optional details and a suggestion, which the CLI
/// prints in color on stderr.
///
/// # Examples
///
/// ```rust,no_run
/// use rosterd::core::{ErrorContext, RosterError};
///
/// let context = ErrorContext::new(RosterError::ConfigError {
///     message: "NOTION_INTEGRATION_KEY is not set".to_string(),
/// })
/// .with_suggestion("Export NOTION_INTEGRATION_KEY or add it to .env");
///
/// context.display();
/// ```
#[derive(Debug)]
pub struct ErrorContext {
    /// The underlying error
    pub error: RosterError,
    /// Optional suggestion for resolving the error
    pub suggestion: Option<String>,
    /// Optional additional details about the error
    pub details: Option<String>,
}

impl ErrorContext {
    /// Create a new error context without suggestion or details.
    #[must_use]
    pub const fn new(error: RosterError) -> Self {
        Self {
            error,
            suggestion: None,
            details: None,
        }
    }

    /// Add a suggestion for resolving the error.
    #[must_use]
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Add additional details explaining the error.
    #[must_use]
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Display the error context to stderr with terminal colors
    ///
    /// - Error message: Red and bold
    /// - Details: Yellow
    /// - Suggestion: Green
    pub fn display(&self) {
        eprintln!("{}: {}", "error".red().bold(), self.error);

        if let Some(details) = &self.details {
            eprintln!("{}: {}", "details".yellow(), details);
        }

        if let Some(suggestion) = &self.suggestion {
            eprintln!("{}: {}", "suggestion".green(), suggestion);
        }
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.error)?;

        if let Some(details) = &self.details {
            write!(f, "\nDetails: {details}")?;
        }

        if let Some(suggestion) = &self.suggestion {
            write!(f, "\nSuggestion: {suggestion}")?;
        }

        Ok(())
    }
}

impl std::error::Error for ErrorContext {}

/// Convert any error to a user-friendly [`ErrorContext`] with actionable suggestions
///
/// Recognizes [`RosterError`] anywhere in the `anyhow` chain and attaches guidance
/// for the failure. Other errors are wrapped with their full context chain as details.
#[must_use]
pub fn user_friendly_error(error: anyhow::Error) -> ErrorContext {
    if let Some(roster_error) = error.chain().find_map(|e| e.downcast_ref::<RosterError>()) {
        let mut context = create_error_context(roster_error.clone());
        let outer = error.to_string();
        if context.details.is_none() && outer != roster_error.to_string() {
            context = context.with_details(outer);
        }
        return context;
    }

    let details = error.chain().skip(1).map(ToString::to_string).collect::<Vec<_>>().join(": ");
    let context = ErrorContext::new(RosterError::ConfigError {
        message: error.to_string(),
    });
    if details.is_empty() { context } else { context.with_details(details) }
}

fn create_error_context(error: RosterError) -> ErrorContext {
    match &error {
        RosterError::SourceUnavailable { .. } => ErrorContext::new(error)
            .with_suggestion(
                "Check NOTION_INTEGRATION_KEY and that the integration is shared with the root database",
            ),
        RosterError::NotFound { .. } => ErrorContext::new(error).with_suggestion(
            "Check the [navigation] titles in rosterd.toml against the workspace; matching is exact and case-sensitive",
        ),
        RosterError::UnknownTeamLabel { .. } => ErrorContext::new(error)
            .with_suggestion("Add a row for this team to the teams collection with a positive order"),
        RosterError::StorageWriteFailed { .. } | RosterError::StorageReadFailed { .. } => {
            ErrorContext::new(error)
                .with_suggestion("Check STORAGE_URL, STORAGE_SERVICE_KEY and that the bucket exists")
        }
        RosterError::ConfigError { .. } => ErrorContext::new(error)
            .with_suggestion("Run 'rosterd config check' to see the effective configuration"),
        RosterError::RenderFailed { .. } => ErrorContext::new(error)
            .with_suggestion("Check the custom template configured under [render]"),
        RosterError::MediaFetchFailed { .. } => ErrorContext::new(error),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context;

    #[test]
    fn test_fatal_classification() {
        assert!(RosterError::UnknownTeamLabel { team: "x".into() }.is_fatal());
        assert!(RosterError::source("query", "boom").is_fatal());
        assert!(
            !RosterError::MediaFetchFailed {
                url: "u".into(),
                reason: "r".into()
            }
            .is_fatal()
        );
        assert!(
            !RosterError::StorageWriteFailed {
                key: "k".into(),
                reason: "r".into(),
                transient: false
            }
            .is_fatal()
        );
    }

    #[test]
    fn test_transient_classification() {
        let transient = RosterError::SourceUnavailable {
            operation: "query".into(),
            reason: "HTTP 503".into(),
            transient: true,
        };
        assert!(transient.is_transient());
        assert!(!RosterError::source("query", "HTTP 400").is_transient());
        assert!(!RosterError::RenderFailed { reason: "x".into() }.is_transient());
    }

    #[test]
    fn test_user_friendly_error_finds_roster_error_in_chain() {
        let result: anyhow::Result<()> = Err(RosterError::UnknownTeamLabel {
            team: "Events".into(),
        })
        .context("Roster pipeline failed");

        let context = user_friendly_error(result.unwrap_err());
        assert_eq!(
            context.error,
            RosterError::UnknownTeamLabel {
                team: "Events".into()
            }
        );
        assert!(context.suggestion.is_some());
        assert_eq!(context.details.as_deref(), Some("Roster pipeline failed"));
    }

    #[test]
    fn test_user_friendly_error_generic() {
        let context = user_friendly_error(anyhow::anyhow!("something odd"));
        assert!(context.to_string().contains("something odd"));
    }

    #[test]
    fn test_skip_record_display() {
        let skip = SkipRecord::new("abc", "missing 'Team' select");
        assert_eq!(skip.to_string(), "skipping record abc: missing 'Team' select");
    }
}

//! Error handling for git-depend
//!
//! This module provides the strongly-typed error enum used across the crate and
//! the user-facing presentation layer built on top of it. Every fallible
//! operation in git-depend returns [`anyhow::Result`]; failures are raised as
//! [`DependError`] variants so that callers (and tests) can recover the precise
//! failure with [`anyhow::Error::downcast_ref`].
//!
//! # Error Categories
//!
//! - **Input**: [`DependError::InvalidSpec`], [`DependError::DuplicateKey`],
//!   [`DependError::MissingDependency`], [`DependError::UnknownNode`],
//!   [`DependError::DuplicateRequest`]
//! - **Structural**: [`DependError::Cycle`], [`DependError::Unreachable`]
//! - **Git driver**: [`DependError::GitCommandError`], [`DependError::GitLaunchFailed`]
//! - **Notes protocol**: [`DependError::MultipleLocks`], [`DependError::MultipleNotes`],
//!   [`DependError::MalformedNotes`], [`DependError::NoLock`]
//! - **Aggregates**: [`DependError::LockRelease`] and [`crate::cache::CacheError`]
//!
//! Use [`user_friendly_error`] to turn any error into an [`ErrorContext`] with a
//! suggestion suitable for the command line.
//!
//! # Examples
//!
//! ```rust,no_run
//! use git_depend::core::{DependError, user_friendly_error};
//!
//! let err = anyhow::Error::from(DependError::NoLock {
//!     repository: "foo".to_string(),
//! });
//! user_friendly_error(err).display();
//! ```

use colored::Colorize;
use std::fmt;
use thiserror::Error;

use crate::cache::CacheError;

/// The main error type for git-depend operations.
///
/// Variants carry the names, URLs and captured git diagnostics needed to act
/// on the failure. Aggregated failures (the cache fan-out and lock release)
/// keep every entry rather than just the first.
#[derive(Error, Debug)]
pub enum DependError {
    /// The spec document could not be parsed.
    #[error("Invalid repository spec: {reason}")]
    InvalidSpec {
        /// Parser diagnostics
        reason: String,
    },

    /// Two specs share the same name.
    #[error("Duplicate key: {name}")]
    DuplicateKey {
        /// The repeated name
        name: String,
    },

    /// A spec lists a dependency that was never declared.
    #[error("Repository '{referrer}' depends on undeclared repository '{missing}'")]
    MissingDependency {
        /// The spec holding the dangling reference
        referrer: String,
        /// The name that could not be resolved
        missing: String,
    },

    /// The dependency relation contains a cycle.
    ///
    /// `ancestor` is the node found again on the current walk path and `node`
    /// is the node whose dependency closed the loop. For a self-loop both are
    /// the same name.
    #[error("Cycle detected: {ancestor} -> {node} -> {ancestor}")]
    Cycle {
        /// Node whose dependency list closes the cycle
        node: String,
        /// Node revisited on the current path
        ancestor: String,
    },

    /// Some declared nodes cannot be reached from any root.
    #[error(
        "Unreachable repositories: {roots} roots and {descendants} descendants cover only part of {total} declared repositories"
    )]
    Unreachable {
        /// Number of root nodes
        roots: usize,
        /// Number of distinct descendants of the roots
        descendants: usize,
        /// Number of declared nodes
        total: usize,
    },

    /// A request names a node absent from the graph.
    #[error("Unknown repository '{name}'")]
    UnknownNode {
        /// Requested name
        name: String,
    },

    /// A node already carries a pending merge request.
    #[error("Repository '{name}' already has a pending merge request")]
    DuplicateRequest {
        /// Requested name
        name: String,
    },

    /// Git exited with a non-zero status.
    #[error("Git operation failed: {operation}")]
    GitCommandError {
        /// The git subcommand that failed (e.g. "clone", "notes", "push")
        operation: String,
        /// Full argument vector passed to git
        args: Vec<String>,
        /// Captured error stream
        stderr: String,
    },

    /// The git binary could not be started.
    #[error("Failed to launch git: {reason}")]
    GitLaunchFailed {
        /// OS-level reason
        reason: String,
    },

    /// The lock ref holds more than one note.
    #[error("Multiple locks found on repository '{repository}' ({count} notes)")]
    MultipleLocks {
        /// Node name of the locked repository
        repository: String,
        /// Number of notes present on the lock ref
        count: usize,
    },

    /// A single-record notes ref holds more than one note.
    #[error("Multiple notes found on ref '{notes_ref}' of repository '{repository}' ({count} notes)")]
    MultipleNotes {
        /// Node name of the repository
        repository: String,
        /// The notes ref that was inspected
        notes_ref: String,
        /// Number of notes present
        count: usize,
    },

    /// A notes listing line could not be parsed.
    #[error("Malformed notes listing line: '{line}'")]
    MalformedNotes {
        /// The offending line
        line: String,
    },

    /// A lock was expected on the repository but none was found.
    #[error("No lock present on repository '{repository}'")]
    NoLock {
        /// Node name of the repository
        repository: String,
    },

    /// One or more locks could not be released.
    #[error("Failed to release {} lock(s): {}", failures.len(), format_failures(failures))]
    LockRelease {
        /// Node name and error message for every failed release
        failures: Vec<(String, String)>,
    },

    /// Clone/update failures of a cache fan-out.
    #[error(transparent)]
    Cache(#[from] CacheError),

    /// Configuration error
    #[error("Configuration error: {message}")]
    ConfigError {
        /// Description of the configuration error
        message: String,
    },
}

fn format_failures(failures: &[(String, String)]) -> String {
    failures.iter().map(|(name, err)| format!("{name}: {err}")).collect::<Vec<_>>().join("; ")
}

/// Error context wrapper that provides user-friendly error information
///
/// Holds the original error message together with optional details and an
/// actionable suggestion. [`ErrorContext::display`] prints it to stderr with
/// colors:
/// - Error message: Red and bold
/// - Details: Yellow
/// - Suggestion: Green
#[derive(Debug)]
pub struct ErrorContext {
    /// The rendered error
    pub message: String,
    /// Optional suggestion for resolving the error
    pub suggestion: Option<String>,
    /// Optional additional details about the error
    pub details: Option<String>,
}

impl ErrorContext {
    /// Create a new error context from a message.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            suggestion: None,
            details: None,
        }
    }

    /// Add a suggestion for resolving the error
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Add additional details explaining the error
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Display the error context to stderr with terminal colors
    pub fn display(&self) {
        eprintln!("{}: {}", "error".red().bold(), self.message);

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
        write!(f, "{}", self.message)?;

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

/// Converts any error into a user-friendly [`ErrorContext`].
///
/// Known [`DependError`] variants anywhere in the error chain get a tailored
/// suggestion; everything else is reported with its full cause chain.
#[must_use]
pub fn user_friendly_error(error: anyhow::Error) -> ErrorContext {
    let chain = format!("{error:#}");

    let Some(depend_error) = error.chain().find_map(|e| e.downcast_ref::<DependError>()) else {
        return ErrorContext::new(chain);
    };

    let context = ErrorContext::new(chain);
    match depend_error {
        DependError::InvalidSpec { .. } => context
            .with_suggestion("Check that the spec file is a JSON array of {\"Name\", \"Url\", \"Deps\"} objects"),
        DependError::DuplicateKey { name } => context
            .with_suggestion(format!("Rename or remove one of the '{name}' entries in the spec file")),
        DependError::MissingDependency { missing, .. } => context
            .with_suggestion(format!("Declare '{missing}' in the spec file or drop it from the Deps list")),
        DependError::Cycle { .. } => context
            .with_details("Repositories cannot depend on themselves, directly or transitively")
            .with_suggestion("Break the cycle by removing one of the listed dependencies"),
        DependError::Unreachable { .. } => context
            .with_suggestion("Every declared repository must be a root or a dependency of one"),
        DependError::UnknownNode { name } => context
            .with_suggestion(format!("Add '{name}' to the spec file or check the spelling")),
        DependError::DuplicateRequest { .. } => {
            context.with_suggestion("Request each repository only once per merge run")
        }
        DependError::GitCommandError { args, stderr, .. } => context
            .with_details(if stderr.trim().is_empty() {
                format!("git {}", args.join(" "))
            } else {
                format!("git {}\n{}", args.join(" "), stderr.trim())
            })
            .with_suggestion("Run the git command manually to inspect the failure"),
        DependError::GitLaunchFailed { .. } => context
            .with_suggestion("Install git from https://git-scm.com/ and make sure it is in your PATH"),
        DependError::MultipleLocks { repository, .. } => context
            .with_details("Another git-depend run is holding, or recently held, this repository")
            .with_suggestion(format!(
                "Wait for the other run to finish, or clear every lock note with 'git-dep unlock --all <specs> {repository}'"
            )),
        DependError::MultipleNotes { .. } | DependError::MalformedNotes { .. } => context
            .with_details("The notes ref is in an unexpected state")
            .with_suggestion("Inspect the ref with 'git notes --ref <ref> list' and remove stray notes"),
        DependError::NoLock { .. } => {
            context.with_suggestion("The lock may already have been released by another run")
        }
        DependError::LockRelease { .. } => context
            .with_details("Locks that could not be removed stay on the remote")
            .with_suggestion("Clear them with 'git-dep unlock <specs> <name>'"),
        DependError::Cache(_) => context
            .with_suggestion("Check the listed URLs are reachable, then run 'git-dep sync' again"),
        DependError::ConfigError { .. } => {
            context.with_suggestion("Set the missing values with 'git-dep config --author <name> --email <email>'")
        }
    }
}

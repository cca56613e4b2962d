//! Test utilities for git-depend
//!
//! Helpers for unit and integration tests: one-time logging setup, git
//! plumbing ([`TestGit`]) and temporary origin repositories
//! ([`GitFixture`]).
//!
//! # Example
//!
//! ```rust,no_run
//! use git_depend::test_utils::GitFixture;
//!
//! let fixture = GitFixture::new().unwrap();
//! let origin = fixture.origin("foo").unwrap();
//! assert!(!origin.url.is_empty());
//! ```

pub mod fixtures;
pub mod git_helper;

pub use fixtures::{DEFAULT_BRANCH, GitFixture, Origin};
pub use git_helper::TestGit;

use std::sync::Once;
use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Global flag to ensure logging is only initialized once in tests
static INIT_LOGGING: Once = Once::new();

/// Initialize logging for tests.
///
/// Installs the tracing subscriber once per process. Uses `level` when given,
/// otherwise `RUST_LOG`; with neither, logging stays off.
///
/// ```bash
/// RUST_LOG=notes=debug,git=debug cargo test
/// ```
pub fn init_test_logging(level: Option<Level>) {
    INIT_LOGGING.call_once(|| {
        let filter = if let Some(level) = level {
            EnvFilter::new(level.to_string())
        } else if std::env::var("RUST_LOG").is_ok() {
            EnvFilter::from_default_env()
        } else {
            return;
        };

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_target(true)
            .with_thread_ids(false)
            .try_init();
    });
}

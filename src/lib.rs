//! git-depend - dependency tracking and coordinated merges across git repositories
//!
//! Projects split over several repositories often need a change to land in
//! all of them together. git-depend records, inside each repository, which
//! other repositories it depends on, and merges feature branches across a
//! set of repositories while holding a lock on each.
//!
//! Everything is stored in git notes, so no server is needed beyond the
//! repositories' own remotes:
//!
//! - `refs/notes/git-depend` carries the durable dependency record
//! - `refs/notes/git-depend-lock` carries an ephemeral lock that is empty at rest
//!
//! # Modules
//!
//! - [`graph`] - spec parsing, validation and traversal of the dependency graph
//! - [`cache`] - content-addressed mirror cache with concurrent clone/update
//! - [`git`] - thin async wrapper over the system `git` binary
//! - [`notes`] - lock protocol and dependency records on notes refs
//! - [`request`] - multi-repository merge orchestration
//! - [`config`] - user configuration file
//! - [`cli`] - the `git-dep` command line
//! - [`core`] - error types and user-facing error formatting
//! - [`constants`] - shared ref, remote and environment names
//!
//! # Example
//!
//! ```rust,no_run
//! use git_depend::cache::Cache;
//! use git_depend::graph::Graph;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let graph = Graph::from_json(
//!     r#"[{"Name":"foo","Url":"https://example.com/foo.git","Deps":["bar"]},
//!         {"Name":"bar","Url":"https://example.com/bar.git"}]"#,
//! )?;
//! let cache = Cache::new("/tmp/git-depend-cache")?;
//! cache.clone_or_update_many(&graph.all_urls()).await?;
//! # Ok(())
//! # }
//! ```

pub mod cache;
pub mod cli;
pub mod config;
pub mod constants;
pub mod core;
pub mod git;
pub mod graph;
pub mod notes;
pub mod request;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

//! Git operations wrapper for git-depend
//!
//! git-depend drives the system `git` binary rather than an embedded library,
//! so that existing credentials, SSH agents and git configuration keep
//! working. Every operation goes through [`command_builder::GitCommand`];
//! this module layers a repository handle ([`GitRepo`]) on top of it with one
//! method per subcommand the core needs: clone, fetch, checkout, commit,
//! merge, rebase, push and the `git notes` family.
//!
//! # Identity
//!
//! Notes and merge commits need an author and committer. A [`GitRepo`] may
//! carry an [`Identity`]; when present it is exported as `GIT_AUTHOR_*` and
//! `GIT_COMMITTER_*` for every command run through the handle, so the mirrors
//! in the cache never depend on the user's global git configuration.
//!
//! # Examples
//!
//! ```rust,no_run
//! use git_depend::git::{GitRepo, Identity};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let repo = GitRepo::new("/path/to/mirror")
//!     .with_identity(Identity::new("Eric", "eric@example.com"));
//! repo.fetch().await?;
//! repo.notes_add("git-depend-lock", "{\"Id\":\"foo\"}", false).await?;
//! repo.push_notes("origin", "git-depend-lock").await?;
//! # Ok(())
//! # }
//! ```

pub mod command_builder;
pub mod notes;

use crate::git::command_builder::GitCommand;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

pub use notes::{NoteRecord, NotesListing};

/// Author and committer identity used for commits created by git-depend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    /// Display name
    pub name: String,
    /// Email address
    pub email: String,
}

impl Identity {
    /// Creates an identity from a name and email.
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
        }
    }
}

/// A Git repository handle providing async operations via CLI commands.
///
/// The handle holds only the path (and an optional identity) and asks git for
/// everything else, so it stays consistent with changes made by other
/// processes.
#[derive(Debug, Clone)]
pub struct GitRepo {
    path: PathBuf,
    identity: Option<Identity>,
}

impl GitRepo {
    /// Creates a handle for an existing local repository.
    ///
    /// No validation is performed; use [`GitRepo::is_git_repo`] if needed.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            identity: None,
        }
    }

    /// Attaches an author/committer identity to every command of this handle.
    #[must_use]
    pub fn with_identity(mut self, identity: Identity) -> Self {
        self.identity = Some(identity);
        self
    }

    /// Attaches an identity if one is given.
    #[must_use]
    pub fn with_optional_identity(mut self, identity: Option<Identity>) -> Self {
        self.identity = identity;
        self
    }

    /// Local filesystem path of the repository.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns true if the path holds a non-bare git checkout.
    #[must_use]
    pub fn is_git_repo(&self) -> bool {
        self.path.join(".git").exists()
    }

    /// Base command bound to this repository and identity.
    fn git(&self, cmd: GitCommand) -> GitCommand {
        let cmd = cmd.current_dir(&self.path);
        match &self.identity {
            Some(identity) => cmd
                .env("GIT_AUTHOR_NAME", identity.name.as_str())
                .env("GIT_AUTHOR_EMAIL", identity.email.as_str())
                .env("GIT_COMMITTER_NAME", identity.name.as_str())
                .env("GIT_COMMITTER_EMAIL", identity.email.as_str()),
            None => cmd,
        }
    }

    /// Clones `url` into `target`, configured to mirror notes refs on fetch.
    ///
    /// The clone itself does not bring notes along, so callers that need them
    /// must [`fetch`](GitRepo::fetch) afterwards.
    pub async fn clone(url: &str, target: impl AsRef<Path>) -> Result<Self> {
        let target = target.as_ref();
        GitCommand::clone(url, target).with_context(url).execute_success().await?;
        Ok(Self::new(target))
    }

    /// Fetches branches, tags and notes from origin.
    pub async fn fetch(&self) -> Result<()> {
        self.git(GitCommand::fetch()).execute_success().await
    }

    /// Checks out `branch` at `start_point`, discarding where it was before.
    pub async fn checkout_reset(&self, branch: &str, start_point: &str) -> Result<()> {
        self.git(GitCommand::checkout_reset(branch, start_point)).execute_success().await
    }

    /// Stages the given paths.
    pub async fn add(&self, paths: &[&str]) -> Result<()> {
        self.git(GitCommand::add(paths.iter().copied())).execute_success().await
    }

    /// Commits staged changes.
    pub async fn commit(&self, message: &str) -> Result<()> {
        self.git(GitCommand::commit(message)).execute_success().await
    }

    /// Creates a commit without changes carrying `message`.
    pub async fn empty_commit(&self, message: &str) -> Result<()> {
        self.git(GitCommand::empty_commit(message)).execute_success().await
    }

    /// Merges `branch` into the current branch.
    ///
    /// With `ff_only` the merge fails outright on divergent history.
    pub async fn merge(&self, branch: &str, ff_only: bool) -> Result<()> {
        self.git(GitCommand::merge(branch, ff_only)).execute_success().await
    }

    /// Rebases the current branch onto `upstream`.
    pub async fn rebase(&self, upstream: &str) -> Result<()> {
        self.git(GitCommand::rebase(upstream)).execute_success().await
    }

    /// Pushes `refspec` to `remote`.
    pub async fn push(&self, remote: &str, refspec: &str) -> Result<()> {
        self.git(GitCommand::push(remote, refspec)).execute_success().await
    }

    /// Resolves a revision to its object id.
    pub async fn rev_parse(&self, ref_name: &str) -> Result<String> {
        self.git(GitCommand::rev_parse(ref_name)).execute_stdout().await
    }

    /// Adds a note to HEAD; with `force` an existing note on HEAD is replaced.
    pub async fn notes_add(&self, notes_ref: &str, message: &str, force: bool) -> Result<()> {
        self.git(GitCommand::notes_add(notes_ref, message, force)).execute_success().await
    }

    /// Appends `message` to the note on HEAD.
    pub async fn notes_append(&self, notes_ref: &str, message: &str) -> Result<()> {
        self.git(GitCommand::notes_append(notes_ref, message)).execute_success().await
    }

    /// Returns the raw `git notes list` output for `notes_ref`.
    pub async fn notes_list(&self, notes_ref: &str) -> Result<String> {
        let output = self.git(GitCommand::notes_list(notes_ref)).execute().await?;
        Ok(output.stdout)
    }

    /// Lists and parses the notes on `notes_ref`.
    pub async fn notes_listing(&self, notes_ref: &str) -> Result<NotesListing> {
        let raw = self.notes_list(notes_ref).await?;
        NotesListing::parse(&raw)
            .with_context(|| format!("Failed to parse notes on ref '{notes_ref}' in {}", self.path.display()))
    }

    /// Returns the note payload attached to `object` (HEAD when `None`).
    pub async fn notes_show(&self, notes_ref: &str, object: Option<&str>) -> Result<String> {
        let output = self.git(GitCommand::notes_show(notes_ref, object)).execute().await?;
        Ok(output.stdout)
    }

    /// Removes the note attached to `object`.
    pub async fn notes_remove(&self, notes_ref: &str, object: &str) -> Result<()> {
        self.git(GitCommand::notes_remove(notes_ref, object)).execute_success().await
    }

    /// Pushes `refs/notes/<notes_ref>` to `remote`.
    pub async fn push_notes(&self, remote: &str, notes_ref: &str) -> Result<()> {
        self.push(remote, &format!("refs/notes/{notes_ref}")).await
    }
}

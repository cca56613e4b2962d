//! Type-safe Git command builder for consistent command execution
//!
//! This module provides a fluent API for building and executing Git commands,
//! so that every git invocation in git-depend goes through the same logging
//! and error reporting path. A command that exits non-zero becomes
//! [`DependError::GitCommandError`] carrying the argv and captured stderr; a
//! command that cannot be spawned at all becomes
//! [`DependError::GitLaunchFailed`].
//!
//! Commands run without a deadline: a git call runs to completion or to git's
//! own failure.

use anyhow::Result;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;

use crate::core::DependError;

/// Name of the git executable for the current platform.
#[must_use]
pub const fn git_binary() -> &'static str {
    if cfg!(windows) { "git.exe" } else { "git" }
}

/// Builder for Git commands with a fluent interface.
///
/// # Examples
///
/// ```rust,no_run
/// use git_depend::git::command_builder::GitCommand;
///
/// # async fn example() -> anyhow::Result<()> {
/// let listing = GitCommand::notes_list("git-depend-lock")
///     .current_dir("/path/to/mirror")
///     .execute_stdout()
///     .await?;
/// # Ok(())
/// # }
/// ```
pub struct GitCommand {
    /// Command arguments passed to git, excluding the `-C <dir>` prefix
    args: Vec<String>,

    /// Working directory, passed to git via `-C`
    current_dir: Option<PathBuf>,

    /// Environment variables to set for the command
    env_vars: Vec<(String, String)>,

    /// Context for logging (e.g. node name)
    context: Option<String>,
}

impl Default for GitCommand {
    fn default() -> Self {
        Self::new()
    }
}

impl GitCommand {
    /// Creates an empty git command.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            args: Vec::new(),
            current_dir: None,
            env_vars: Vec::new(),
            context: None,
        }
    }

    /// Sets the working directory for the command.
    pub fn current_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.current_dir = Some(dir.as_ref().to_path_buf());
        self
    }

    /// Adds a single argument.
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Adds multiple arguments.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Sets an environment variable for the command.
    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env_vars.push((key.into(), value.into()));
        self
    }

    /// Sets a context label shown in log lines for this command.
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    /// Returns the arguments that will be passed to git (without `-C <dir>`).
    #[must_use]
    pub fn arguments(&self) -> &[String] {
        &self.args
    }

    /// Executes the command and returns its captured output.
    ///
    /// # Errors
    ///
    /// - [`DependError::GitLaunchFailed`] if git cannot be spawned
    /// - [`DependError::GitCommandError`] if git exits with a non-zero status
    pub async fn execute(self) -> Result<GitCommandOutput> {
        let start = std::time::Instant::now();
        let git = git_binary();
        let mut cmd = Command::new(git);

        let mut full_args = Vec::with_capacity(self.args.len() + 2);
        if let Some(ref dir) = self.current_dir {
            full_args.push("-C".to_string());
            full_args.push(dir.display().to_string());
        }
        full_args.extend(self.args.iter().cloned());
        cmd.args(&full_args);

        let label = self.context.as_deref().map(|ctx| format!("({ctx}) ")).unwrap_or_default();
        tracing::debug!(target: "git", "{}Executing command: {} {}", label, git, full_args.join(" "));

        for (key, value) in &self.env_vars {
            tracing::trace!(target: "git", "Setting env var: {}", key);
            cmd.env(key, value);
        }

        cmd.stdin(Stdio::null());
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());

        let output = cmd.output().await.map_err(|e| DependError::GitLaunchFailed {
            reason: format!("{git}: {e}"),
        })?;

        let operation = self.args.first().cloned().unwrap_or_else(|| "unknown".to_string());

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).to_string();
            tracing::debug!(
                target: "git",
                "{}Command failed with exit code {:?}: {}",
                label,
                output.status.code(),
                stderr.trim()
            );
            return Err(DependError::GitCommandError {
                operation,
                args: self.args,
                stderr,
            }
            .into());
        }

        let stdout = String::from_utf8_lossy(&output.stdout).to_string();
        let stderr = String::from_utf8_lossy(&output.stderr).to_string();

        if !stdout.is_empty() {
            tracing::trace!(target: "git", "{}{}", label, stdout.trim());
        }
        if !stderr.is_empty() {
            tracing::debug!(target: "git", "{}{}", label, stderr.trim());
        }

        let elapsed = start.elapsed();
        if elapsed.as_secs() > 1 {
            tracing::info!(target: "git::perf", "{}Git {} took {:.2}s", label, operation, elapsed.as_secs_f64());
        } else if elapsed.as_millis() > 100 {
            tracing::debug!(target: "git::perf", "{}Git {} took {}ms", label, operation, elapsed.as_millis());
        }

        Ok(GitCommandOutput {
            stdout,
            stderr,
        })
    }

    /// Executes the command and returns trimmed stdout.
    pub async fn execute_stdout(self) -> Result<String> {
        let output = self.execute().await?;
        Ok(output.stdout.trim().to_string())
    }

    /// Executes the command, discarding its output.
    pub async fn execute_success(self) -> Result<()> {
        self.execute().await?;
        Ok(())
    }
}

/// Output from a Git command
pub struct GitCommandOutput {
    /// Standard output from the command
    pub stdout: String,
    /// Standard error from the command
    pub stderr: String,
}

// Convenience builders for the git operations git-depend relies on

impl GitCommand {
    /// `git clone` that also mirrors every notes ref on later fetches.
    pub fn clone(url: &str, target: impl AsRef<Path>) -> Self {
        Self::new().args([
            "clone",
            "--config",
            "remote.origin.fetch=+refs/notes/*:refs/notes/*",
            url,
        ])
        .arg(target.as_ref().display().to_string())
    }

    /// Fetches branches, tags and (via the clone refspec) notes from origin.
    pub fn fetch() -> Self {
        Self::new().args(["fetch", "origin", "--tags", "--force"])
    }

    /// Checks out `branch`, creating it or resetting it to `start_point`.
    pub fn checkout_reset(branch: &str, start_point: &str) -> Self {
        Self::new().args(["checkout", "-B", branch, start_point])
    }

    /// Stages the given paths.
    pub fn add<I, S>(paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new().arg("add").args(paths)
    }

    /// Commits staged changes.
    pub fn commit(message: &str) -> Self {
        Self::new().args(["commit", "-m", message])
    }

    /// Records a commit without changes, used to carry a message.
    pub fn empty_commit(message: &str) -> Self {
        Self::new().args(["commit", "--allow-empty", "-m", message])
    }

    /// Merges `branch` into the current branch.
    pub fn merge(branch: &str, ff_only: bool) -> Self {
        let cmd = Self::new().arg("merge");
        let cmd = if ff_only {
            cmd.arg("--ff-only")
        } else {
            cmd
        };
        cmd.arg(branch)
    }

    /// Rebases the current branch onto `upstream`.
    pub fn rebase(upstream: &str) -> Self {
        Self::new().args(["rebase", upstream])
    }

    /// Pushes `refspec` to `remote`.
    pub fn push(remote: &str, refspec: &str) -> Self {
        Self::new().args(["push", remote, refspec])
    }

    /// Adds a note to HEAD on `notes_ref`.
    pub fn notes_add(notes_ref: &str, message: &str, force: bool) -> Self {
        let cmd = Self::new().args(["notes", "--ref", notes_ref, "add"]);
        let cmd = if force {
            cmd.arg("-f")
        } else {
            cmd
        };
        cmd.args(["-m", message])
    }

    /// Appends to the note on HEAD on `notes_ref`.
    pub fn notes_append(notes_ref: &str, message: &str) -> Self {
        Self::new().args(["notes", "--ref", notes_ref, "append", "-m", message])
    }

    /// Lists `<note-id> <object-id>` pairs on `notes_ref`.
    pub fn notes_list(notes_ref: &str) -> Self {
        Self::new().args(["notes", "--ref", notes_ref, "list"])
    }

    /// Shows the note attached to `object` (HEAD when `None`).
    pub fn notes_show(notes_ref: &str, object: Option<&str>) -> Self {
        let cmd = Self::new().args(["notes", "--ref", notes_ref, "show"]);
        match object {
            Some(object) => cmd.arg(object),
            None => cmd,
        }
    }

    /// Removes the note attached to `object`.
    pub fn notes_remove(notes_ref: &str, object: &str) -> Self {
        Self::new().args(["notes", "--ref", notes_ref, "remove", object])
    }

    /// Resolves a revision to a full object id.
    pub fn rev_parse(ref_name: &str) -> Self {
        Self::new().args(["rev-parse", ref_name])
    }
}

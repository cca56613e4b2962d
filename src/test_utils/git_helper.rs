//! Git test helper utilities
//!
//! Synchronous git plumbing for building fixtures. Library code goes through
//! [`crate::git::GitRepo`]; tests use [`TestGit`] to set up and inspect the
//! repositories it operates on.

use anyhow::{Context, Result, bail};
use std::path::{Path, PathBuf};
use std::process::Command;

/// Git command runner for tests
///
/// Every command runs with `current_dir` set to the repository and fails
/// with the captured stderr on a non-zero exit.
pub struct TestGit {
    repo_path: PathBuf,
}

impl TestGit {
    /// Create a new TestGit instance for the given repository path
    pub fn new(repo_path: impl Into<PathBuf>) -> Self {
        Self {
            repo_path: repo_path.into(),
        }
    }

    /// Run git with `args` and return its trimmed stdout
    pub fn run(&self, args: &[&str]) -> Result<String> {
        let output = Command::new("git")
            .args(args)
            .current_dir(&self.repo_path)
            .output()
            .with_context(|| format!("Failed to run git {}", args.join(" ")))?;

        if !output.status.success() {
            bail!("git {} failed: {}", args.join(" "), String::from_utf8_lossy(&output.stderr));
        }

        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }

    /// Initialize a repository whose initial branch is `branch`
    pub fn init(&self, branch: &str) -> Result<()> {
        std::fs::create_dir_all(&self.repo_path)?;
        self.run(&["init", "--quiet"])?;
        self.run(&["symbolic-ref", "HEAD", &format!("refs/heads/{branch}")])?;
        Ok(())
    }

    /// Configure git user for tests
    pub fn config_user(&self) -> Result<()> {
        self.run(&["config", "user.email", "test@git-depend.example"])?;
        self.run(&["config", "user.name", "Test User"])?;
        Ok(())
    }

    /// Accept pushes to the checked-out branch, updating the worktree
    pub fn accept_pushes(&self) -> Result<()> {
        self.run(&["config", "receive.denyCurrentBranch", "updateInstead"])?;
        Ok(())
    }

    /// Write `contents` to `file`, stage it and commit
    pub fn commit_file(&self, file: &str, contents: &str, message: &str) -> Result<()> {
        std::fs::write(self.repo_path.join(file), contents)
            .with_context(|| format!("Failed to write {file}"))?;
        self.run(&["add", file])?;
        self.run(&["commit", "--quiet", "-m", message])?;
        Ok(())
    }

    /// Create and checkout a branch
    pub fn create_branch(&self, branch_name: &str) -> Result<()> {
        self.run(&["checkout", "--quiet", "-b", branch_name])?;
        Ok(())
    }

    /// Checkout a branch or commit
    pub fn checkout(&self, ref_name: &str) -> Result<()> {
        self.run(&["checkout", "--quiet", ref_name])?;
        Ok(())
    }

    /// Resolve a revision to its object id
    pub fn rev_parse(&self, ref_name: &str) -> Result<String> {
        self.run(&["rev-parse", ref_name])
    }

    /// Subject line of the commit at `ref_name`
    pub fn subject(&self, ref_name: &str) -> Result<String> {
        self.run(&["log", "-1", "--format=%s", ref_name])
    }

    /// Raw `git notes list` output for `notes_ref`
    pub fn notes_list(&self, notes_ref: &str) -> Result<String> {
        self.run(&["notes", "--ref", notes_ref, "list"])
    }

    /// Number of notes on `notes_ref`
    pub fn notes_count(&self, notes_ref: &str) -> Result<usize> {
        Ok(self.notes_list(notes_ref)?.lines().filter(|line| !line.trim().is_empty()).count())
    }

    /// Return the repository path
    pub fn repo_path(&self) -> &Path {
        &self.repo_path
    }
}

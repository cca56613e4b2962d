//! Repository fixtures for tests
//!
//! A [`GitFixture`] owns a temporary directory holding any number of "origin"
//! repositories (the remotes git-depend mirrors) plus a scratch area for
//! caches and clones. Origins are regular repositories on branch `main` with
//! one commit, configured to accept pushes to their checked-out branch so
//! merge and notes pushes from mirrors land.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use super::git_helper::TestGit;

/// Branch every origin starts on.
pub const DEFAULT_BRANCH: &str = "main";

/// Temporary directory of origin repositories.
pub struct GitFixture {
    temp: TempDir,
    scratch: PathBuf,
}

/// An origin repository created by [`GitFixture::origin`].
pub struct Origin {
    /// Name the origin was created with
    pub name: String,
    /// URL to clone it from (a local path)
    pub url: String,
    /// Plumbing on the origin itself
    pub git: TestGit,
}

impl GitFixture {
    /// Create an empty fixture
    pub fn new() -> Result<Self> {
        let temp = TempDir::new().context("Failed to create fixture directory")?;
        let scratch = temp.path().join("scratch");
        std::fs::create_dir_all(&scratch)?;
        Ok(Self {
            temp,
            scratch,
        })
    }

    /// Root of the fixture
    pub fn root(&self) -> &Path {
        self.temp.path()
    }

    /// Directory for caches, clones and other test output
    pub fn scratch(&self) -> &Path {
        &self.scratch
    }

    /// Create an origin repository named `name` with one commit on `main`
    pub fn origin(&self, name: &str) -> Result<Origin> {
        let path = self.temp.path().join("origins").join(name);
        let git = TestGit::new(&path);
        git.init(DEFAULT_BRANCH)?;
        git.config_user()?;
        git.accept_pushes()?;
        git.commit_file("README.md", &format!("# {name}\n"), "Initial commit")?;

        Ok(Origin {
            name: name.to_string(),
            url: path.display().to_string(),
            git,
        })
    }

    /// Create one origin per name, in order
    pub fn origins(&self, names: &[&str]) -> Result<Vec<Origin>> {
        names.iter().map(|name| self.origin(name)).collect()
    }
}

impl Origin {
    /// Create `branch` from `main` with one extra commit, then return to `main`
    pub fn feature_branch(&self, branch: &str) -> Result<()> {
        self.git.create_branch(branch)?;
        self.git.commit_file(&format!("{branch}.txt"), branch, &format!("Work on {branch}"))?;
        self.git.checkout(DEFAULT_BRANCH)?;
        Ok(())
    }
}

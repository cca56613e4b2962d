//! Shared helpers for the integration suite.
//!
//! A [`TestWorkspace`] wraps a [`GitFixture`] with a configuration file, a
//! cache directory and a spec file, so library and CLI tests can set up the
//! same repositories the same way.

#![allow(dead_code)]

use anyhow::Result;
use assert_cmd::Command;
use std::path::{Path, PathBuf};

use git_depend::cache::Cache;
use git_depend::constants::CACHE_DIR_ENV;
use git_depend::git::Identity;
use git_depend::graph::{Graph, RepoSpec};
use git_depend::test_utils::{GitFixture, Origin};

pub const AUTHOR: &str = "Eric";
pub const EMAIL: &str = "eric@example.com";

pub struct TestWorkspace {
    pub fixture: GitFixture,
    config_path: PathBuf,
    cache_dir: PathBuf,
    specs_path: PathBuf,
}

impl TestWorkspace {
    pub fn new() -> Result<Self> {
        let fixture = GitFixture::new()?;
        let config_path = fixture.scratch().join("config.toml");
        let cache_dir = fixture.scratch().join("cache");
        let specs_path = fixture.scratch().join("specs.json");
        Ok(Self {
            fixture,
            config_path,
            cache_dir,
            specs_path,
        })
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    pub fn specs_path(&self) -> &Path {
        &self.specs_path
    }

    /// Writes a configuration carrying the test identity.
    pub fn write_config(&self) -> Result<()> {
        std::fs::write(&self.config_path, format!("author = \"{AUTHOR}\"\nemail = \"{EMAIL}\"\n"))?;
        Ok(())
    }

    /// Creates one origin per `(name, deps)` pair and writes the spec file
    /// describing them.
    pub fn origins_with_specs(&self, layout: &[(&str, &[&str])]) -> Result<Vec<Origin>> {
        let mut origins = Vec::new();
        let mut specs = Vec::new();
        for (name, deps) in layout {
            let origin = self.fixture.origin(name)?;
            specs.push(RepoSpec::new(*name, origin.url.clone(), deps.iter().copied()));
            origins.push(origin);
        }
        std::fs::write(&self.specs_path, serde_json::to_string_pretty(&specs)?)?;
        Ok(origins)
    }

    pub fn graph(&self) -> Result<Graph> {
        Graph::from_file(&self.specs_path)
    }

    /// A cache in the workspace's cache directory with the test identity.
    pub fn cache(&self) -> Result<Cache> {
        Ok(Cache::new(&self.cache_dir)?.with_identity(Identity::new(AUTHOR, EMAIL)))
    }

    /// A second, independent cache, as another user's machine would have.
    pub fn other_cache(&self, name: &str) -> Result<Cache> {
        Ok(Cache::new(self.fixture.scratch().join(name))?.with_identity(Identity::new("Other", "other@example.com")))
    }

    /// `git-dep` pointed at this workspace's configuration and cache.
    pub fn git_dep(&self) -> Command {
        let mut cmd = Command::cargo_bin("git-dep").unwrap();
        cmd.arg("--config")
            .arg(&self.config_path)
            .env(CACHE_DIR_ENV, &self.cache_dir)
            .env("NO_COLOR", "1")
            .env_remove("RUST_LOG")
            .current_dir(self.fixture.scratch());
        cmd
    }
}

//! Content-addressed mirror cache for dependency repositories
//!
//! Every git operation git-depend performs runs against a local mirror of the
//! remote repository. The [`Cache`] owns those mirrors and hands out paths
//! (or [`GitRepo`] handles) for them.
//!
//! # Cache Directory Structure
//!
//! ```text
//! ~/.cache/git-depend/
//! ├── 3f2a…c81e/          # sha256(url) of the first repository
//! ├── 9b07…12d4/          # sha256(url) of the second repository
//! └── tmp/                # staging area, only populated while cloning
//!     └── 5e1c…aa90/
//! ```
//!
//! The directory name is the SHA-256 hex digest of the URL, so the same URL
//! always lands in the same directory across invocations.
//!
//! # Clone or Update
//!
//! - **Absent**: clone into `tmp/<hash>`, fetch (clone alone does not bring
//!   notes along), then rename into place. A half-finished clone is never
//!   visible under the final name.
//! - **Present**: fetch in place.
//!
//! # Concurrency
//!
//! [`Cache::clone_or_update_many`] spawns one task per distinct URL and
//! waits for all of them, even when some fail. The URL map is behind a mutex
//! held only for each individual read or write, never across git work.
//!
//! Two concurrent [`Cache::get_repository_directory`] calls for the same URL
//! outside a batch can both miss the map and race into two clones of the same
//! staging directory. Batch through [`Cache::clone_or_update_many`] when the
//! URL set is known up front.

use anyhow::{Context, Result};
use futures::future::join_all;
use sha2::{Digest, Sha256};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::constants::STAGING_DIR;
use crate::core::DependError;
use crate::git::{GitRepo, Identity};

/// Aggregated failures of a [`Cache::clone_or_update_many`] run.
///
/// Holds one entry per failing URL, in input order.
#[derive(Debug)]
pub struct CacheError {
    failures: Vec<(String, anyhow::Error)>,
}

impl CacheError {
    /// Failing URLs with their errors.
    #[must_use]
    pub fn failures(&self) -> &[(String, anyhow::Error)] {
        &self.failures
    }

    /// URLs that failed, in input order.
    pub fn urls(&self) -> impl Iterator<Item = &str> {
        self.failures.iter().map(|(url, _)| url.as_str())
    }
}

impl fmt::Display for CacheError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Failed to clone or update {} repositories", self.failures.len())?;
        for (url, error) in &self.failures {
            write!(f, "\n  URL: {url}\n  Error: {error:#}")?;
        }
        Ok(())
    }
}

impl std::error::Error for CacheError {}

/// SHA-256 hex digest of a repository URL, used as its mirror directory name.
#[must_use]
pub fn url_hash(url: &str) -> String {
    hex::encode(Sha256::digest(url.as_bytes()))
}

/// Mirror cache rooted at a directory.
///
/// Cloning the cache is cheap and shares the URL map, which is how the
/// per-URL tasks of a batch report back.
#[derive(Debug, Clone)]
pub struct Cache {
    /// Root directory holding one mirror per repository
    root: PathBuf,

    /// URL -> hash of every mirror touched by this instance
    repositories: Arc<Mutex<HashMap<String, String>>>,

    /// Author/committer for notes and merge commits made in the mirrors
    identity: Option<Identity>,
}

impl Cache {
    /// Opens a cache at `root`, creating the directory if necessary.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created.
    pub fn new(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        std::fs::create_dir_all(&root)
            .with_context(|| format!("Failed to create cache directory {}", root.display()))?;
        tracing::debug!(target: "cache", "Using cache at {}", root.display());

        Ok(Self {
            root,
            repositories: Arc::new(Mutex::new(HashMap::new())),
            identity: None,
        })
    }

    /// Sets the identity used by handles returned from [`Cache::repo`].
    #[must_use]
    pub fn with_identity(mut self, identity: Identity) -> Self {
        self.identity = Some(identity);
        self
    }

    /// Root directory of the cache.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Identity attached to repository handles, if any.
    #[must_use]
    pub fn identity(&self) -> Option<&Identity> {
        self.identity.as_ref()
    }

    /// Path the mirror of `url` lives at, whether or not it exists yet.
    #[must_use]
    pub fn repository_path(&self, url: &str) -> PathBuf {
        self.root.join(url_hash(url))
    }

    /// Clones `url` into the cache, or fetches it if already present.
    ///
    /// Returns the mirror directory.
    ///
    /// # Errors
    ///
    /// Returns the git or filesystem error of the failing step. A failed clone
    /// leaves no directory under the final name.
    pub async fn clone_or_update(&self, url: &str) -> Result<PathBuf> {
        let hash = url_hash(url);
        let directory = self.root.join(&hash);

        if directory.exists() {
            tracing::debug!(target: "cache", "Updating {} in {}", url, directory.display());
            GitRepo::new(&directory)
                .fetch()
                .await
                .with_context(|| format!("Failed to update repository {url}"))?;
        } else {
            tracing::debug!(target: "cache", "Cloning {} into {}", url, directory.display());
            self.clone_into(url, &hash, &directory).await?;
        }

        self.repositories.lock().await.insert(url.to_string(), hash);
        Ok(directory)
    }

    async fn clone_into(&self, url: &str, hash: &str, directory: &Path) -> Result<()> {
        let staging_root = self.root.join(STAGING_DIR);
        let staging = staging_root.join(hash);

        if staging.exists() {
            tokio::fs::remove_dir_all(&staging)
                .await
                .with_context(|| format!("Failed to clear staging directory {}", staging.display()))?;
        }
        tokio::fs::create_dir_all(&staging_root)
            .await
            .with_context(|| format!("Failed to create staging directory {}", staging_root.display()))?;

        let result = async {
            let repo = GitRepo::clone(url, &staging).await?;
            repo.fetch().await?;
            tokio::fs::rename(&staging, directory)
                .await
                .with_context(|| format!("Failed to move clone into {}", directory.display()))?;
            Ok::<(), anyhow::Error>(())
        }
        .await;

        if let Err(error) = result {
            if staging.exists() {
                if let Err(cleanup) = tokio::fs::remove_dir_all(&staging).await {
                    tracing::warn!(
                        target: "cache",
                        "Failed to remove staging directory {}: {}",
                        staging.display(),
                        cleanup
                    );
                }
            }
            return Err(error.context(format!("Failed to clone repository {url}")));
        }

        Ok(())
    }

    /// Clones or updates every URL concurrently.
    ///
    /// Duplicate URLs are collapsed (first occurrence wins). Every task runs
    /// to completion; the returned paths follow the deduplicated input order.
    ///
    /// # Errors
    ///
    /// Returns [`DependError::Cache`] listing every URL that failed.
    pub async fn clone_or_update_many(&self, urls: &[String]) -> Result<Vec<PathBuf>> {
        let mut seen = HashSet::new();
        let unique: Vec<String> = urls.iter().filter(|url| seen.insert(*url)).cloned().collect();

        tracing::info!(target: "cache", "Syncing {} repositories", unique.len());

        let handles: Vec<_> = unique
            .iter()
            .map(|url| {
                let cache = self.clone();
                let url = url.clone();
                tokio::spawn(async move { cache.clone_or_update(&url).await })
            })
            .collect();

        let results = join_all(handles).await;

        let mut paths = Vec::with_capacity(unique.len());
        let mut failures = Vec::new();
        for (url, result) in unique.into_iter().zip(results) {
            match result {
                Ok(Ok(path)) => paths.push(path),
                Ok(Err(error)) => {
                    tracing::debug!(target: "cache", "Sync of {} failed: {:#}", url, error);
                    failures.push((url, error));
                }
                Err(join_error) => {
                    failures.push((url, anyhow::Error::new(join_error).context("Sync task did not complete")));
                }
            }
        }

        if failures.is_empty() {
            Ok(paths)
        } else {
            Err(DependError::Cache(CacheError {
                failures,
            })
            .into())
        }
    }

    /// Returns the mirror directory for `url`, cloning or updating it first if
    /// this instance has not seen the URL yet.
    pub async fn get_repository_directory(&self, url: &str) -> Result<PathBuf> {
        let known = self.repositories.lock().await.get(url).cloned();
        match known {
            Some(hash) => Ok(self.root.join(hash)),
            None => self.clone_or_update(url).await,
        }
    }

    /// Repository handle on the mirror of `url`, carrying the cache identity.
    pub async fn repo(&self, url: &str) -> Result<GitRepo> {
        let directory = self.get_repository_directory(url).await?;
        Ok(GitRepo::new(directory).with_optional_identity(self.identity.clone()))
    }

    /// URLs mapped by this instance, sorted.
    pub async fn repositories(&self) -> Vec<String> {
        let mut urls: Vec<String> = self.repositories.lock().await.keys().cloned().collect();
        urls.sort();
        urls
    }

    /// Deletes every mirror and forgets all mappings.
    ///
    /// # Errors
    ///
    /// Returns an error if the root cannot be removed.
    pub async fn clean(&self) -> Result<()> {
        if self.root.exists() {
            tokio::fs::remove_dir_all(&self.root)
                .await
                .with_context(|| format!("Failed to remove cache {}", self.root.display()))?;
            tracing::info!(target: "cache", "Removed cache at {}", self.root.display());
        }
        self.repositories.lock().await.clear();
        Ok(())
    }
}

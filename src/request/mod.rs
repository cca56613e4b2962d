//! Multi-repository merge requests.
//!
//! A [`Requests`] set collects merge intents (merge branch `from` into branch
//! `to` of a named repository), locks every requested repository together
//! with everything it depends on, merges each requested repository in request
//! order and releases the locks.
//!
//! # Merge sequence
//!
//! For each request, in the repository's mirror:
//!
//! ```text
//! checkout -B <from> origin/<from>
//! rebase origin/<to>
//! checkout -B <to> origin/<to>
//! merge --ff-only <from>
//! commit --allow-empty -m <request JSON>
//! push origin <to>
//! ```
//!
//! The empty commit records who asked for the merge. A failure stops the run;
//! repositories merged before the failure keep their new state.
//!
//! # Lock release
//!
//! Every acquired lock is released on every exit path of [`Requests::merge`].
//! Release failures are collected into [`DependError::LockRelease`]; when the
//! merge itself failed they are attached to its error as context.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::cache::Cache;
use crate::constants::REMOTE;
use crate::core::DependError;
use crate::git::{GitRepo, Identity};
use crate::graph::Graph;
use crate::notes::{HeldLock, remove_lock, write_lock};

/// One merge intent, also the message of the recorded merge commit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Request {
    /// Node to merge in
    pub name: String,
    /// Branch merged from
    pub from: String,
    /// Branch merged into
    pub to: String,
    /// Requesting author
    pub author: String,
    /// Requesting author's email
    pub email: String,
}

/// Progress of a merge run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeState {
    /// Nothing started
    Idle,
    /// Writing locks
    LocksAcquiring,
    /// Every lock written
    LocksHeld,
    /// Running merge sequences
    Merging,
    /// Removing locks
    LocksReleasing,
    /// Merged and unlocked
    Done,
    /// Stopped on a failure
    Aborted,
}

/// Working set of one merge run.
pub struct Requests<'a> {
    graph: &'a Graph,
    cache: &'a Cache,
    /// Pending requests in the order they were added
    requests: Vec<Request>,
    /// Locks held by this run, in acquisition order
    locks: Vec<HeldLock>,
    state: MergeState,
}

impl<'a> Requests<'a> {
    /// Creates an empty request set over `graph`, using mirrors from `cache`.
    #[must_use]
    pub fn new(graph: &'a Graph, cache: &'a Cache) -> Self {
        Self {
            graph,
            cache,
            requests: Vec::new(),
            locks: Vec::new(),
            state: MergeState::Idle,
        }
    }

    /// Adds a request to merge `from` into `to` on node `name`.
    ///
    /// # Errors
    ///
    /// [`DependError::UnknownNode`] if `name` is not in the graph,
    /// [`DependError::DuplicateRequest`] if it already has a request.
    pub fn add_request(&mut self, name: &str, from: &str, to: &str, author: &str, email: &str) -> Result<()> {
        self.graph.require(name)?;
        if self.requests.iter().any(|r| r.name == name) {
            return Err(DependError::DuplicateRequest {
                name: name.to_string(),
            }
            .into());
        }

        self.requests.push(Request {
            name: name.to_string(),
            from: from.to_string(),
            to: to.to_string(),
            author: author.to_string(),
            email: email.to_string(),
        });
        Ok(())
    }

    /// Pending requests in request order.
    #[must_use]
    pub fn requests(&self) -> &[Request] {
        &self.requests
    }

    /// Locks currently held by this run.
    #[must_use]
    pub fn held_locks(&self) -> &[HeldLock] {
        &self.locks
    }

    /// Current state of the run.
    #[must_use]
    pub fn state(&self) -> MergeState {
        self.state
    }

    /// Locks every requested node and every node below it, once each.
    ///
    /// Each lock's Id is the name of the node it locks. Locks acquired before
    /// a failure stay recorded so [`Requests::remove_locks`] can release them.
    pub async fn write_locks(&mut self) -> Result<()> {
        self.state = MergeState::LocksAcquiring;

        let graph = self.graph;
        for request in &self.requests {
            let node = graph.require(&request.name)?;
            for target in std::iter::once(node).chain(graph.children(node)) {
                if self.locks.iter().any(|held| held.node == target.name()) {
                    continue;
                }
                match write_lock(self.cache, target.name(), target).await {
                    Ok(held) => self.locks.push(held),
                    Err(error) => {
                        self.state = MergeState::Aborted;
                        return Err(error);
                    }
                }
            }
        }

        tracing::info!(target: "merge", "Holding {} locks", self.locks.len());
        self.state = MergeState::LocksHeld;
        Ok(())
    }

    /// Releases every held lock, attempting all of them.
    ///
    /// Locks that could not be released stay recorded.
    ///
    /// # Errors
    ///
    /// [`DependError::LockRelease`] listing every lock that failed.
    pub async fn remove_locks(&mut self) -> Result<()> {
        self.state = MergeState::LocksReleasing;

        let mut failures = Vec::new();
        let mut kept = Vec::new();
        for held in std::mem::take(&mut self.locks) {
            let released = match self.graph.node(&held.node) {
                Some(node) => remove_lock(self.cache, node).await,
                None => Err(DependError::UnknownNode {
                    name: held.node.clone(),
                }
                .into()),
            };
            if let Err(error) = released {
                tracing::warn!(target: "merge", "Failed to release lock on {}: {:#}", held.node, error);
                failures.push((held.node.clone(), format!("{error:#}")));
                kept.push(held);
            }
        }
        self.locks = kept;

        if failures.is_empty() {
            self.state = MergeState::Idle;
            Ok(())
        } else {
            self.state = MergeState::Aborted;
            Err(DependError::LockRelease {
                failures,
            }
            .into())
        }
    }

    /// Runs every request under the locks.
    ///
    /// Locks are acquired first unless a successful [`Requests::write_locks`]
    /// already holds all of them, and are always released before returning.
    pub async fn merge(&mut self) -> Result<()> {
        let result = self.lock_and_merge().await;
        let released = self.remove_locks().await;

        match (result, released) {
            (Ok(()), Ok(())) => {
                self.state = MergeState::Done;
                tracing::info!(target: "merge", "Merged {} requests", self.requests.len());
                Ok(())
            }
            (Ok(()), Err(release_error)) => {
                self.state = MergeState::Aborted;
                Err(release_error)
            }
            (Err(error), Ok(())) => {
                self.state = MergeState::Aborted;
                Err(error)
            }
            (Err(error), Err(release_error)) => {
                self.state = MergeState::Aborted;
                Err(error.context(format!("{release_error:#}")))
            }
        }
    }

    async fn lock_and_merge(&mut self) -> Result<()> {
        // A partial set from a failed acquisition is completed, not trusted.
        if self.state != MergeState::LocksHeld {
            self.write_locks().await?;
        }

        self.state = MergeState::Merging;
        for request in &self.requests {
            let node = self.graph.require(&request.name)?;
            let repo = self
                .cache
                .repo(node.url())
                .await?
                .with_identity(Identity::new(&request.author, &request.email));

            merge_one(&repo, request)
                .await
                .with_context(|| format!("Failed to merge {} into {} on {}", request.from, request.to, request.name))?;
            tracing::info!(target: "merge", "Merged {} into {} on {}", request.from, request.to, request.name);
        }
        Ok(())
    }
}

async fn merge_one(repo: &GitRepo, request: &Request) -> Result<()> {
    // Local branches are reset to the fetched remote state, never reused.
    repo.checkout_reset(&request.from, &format!("{REMOTE}/{}", request.from)).await?;
    repo.rebase(&format!("{REMOTE}/{}", request.to)).await?;
    repo.checkout_reset(&request.to, &format!("{REMOTE}/{}", request.to)).await?;
    repo.merge(&request.from, true).await?;
    repo.empty_commit(&serde_json::to_string(request)?).await?;
    repo.push(REMOTE, &request.to).await
}

//! Dependency notes: the durable record of a repository's direct
//! dependencies.
//!
//! Writes are bracketed by the lock on the same repository. Whatever happens
//! between acquiring and releasing, the lock is released before returning.

use anyhow::{Context, Result};

use crate::cache::Cache;
use crate::constants::{DEPS_REF, REMOTE};
use crate::core::DependError;
use crate::git::NotesListing;
use crate::graph::{Graph, Node, RepoSpec};

use super::lock::{remove_lock, write_lock};

/// Writes `node`'s direct dependencies to its dependency note under the lock.
///
/// An existing dependency note is removed first, wherever it is attached, so
/// the ref always holds a single record on HEAD.
///
/// # Errors
///
/// Lock errors from acquisition, [`DependError::MultipleNotes`] if the ref
/// already holds more than one record, or the git error of any step. A
/// failed lock release after a successful write is returned as the error.
pub async fn write_dependency_notes(cache: &Cache, graph: &Graph, owner_id: &str, node: &Node) -> Result<()> {
    write_lock(cache, owner_id, node).await?;

    let written = write_record(cache, graph, node).await;
    let released = remove_lock(cache, node).await;

    match (written, released) {
        (Ok(()), released) => released,
        (Err(error), Ok(())) => Err(error),
        (Err(error), Err(release_error)) => {
            tracing::warn!(
                target: "notes",
                "Failed to release lock on {} after failed write: {:#}",
                node.name(),
                release_error
            );
            Err(error)
        }
    }
}

async fn write_record(cache: &Cache, graph: &Graph, node: &Node) -> Result<()> {
    let repo = cache.repo(node.url()).await?;

    match repo.notes_listing(DEPS_REF).await? {
        NotesListing::Empty => {}
        NotesListing::Single(record) => {
            repo.notes_remove(DEPS_REF, &record.object_id).await?;
        }
        NotesListing::Multiple(records) => {
            return Err(DependError::MultipleNotes {
                repository: node.name().to_string(),
                notes_ref: DEPS_REF.to_string(),
                count: records.len(),
            }
            .into());
        }
    }

    let payload = serde_json::to_string(&graph.dependency_specs(node))?;
    repo.notes_add(DEPS_REF, &payload, false).await?;
    repo.push_notes(REMOTE, DEPS_REF)
        .await
        .with_context(|| format!("Failed to push dependency notes of {}", node.name()))?;

    tracing::info!(target: "notes", "Wrote dependency notes for {}", node.name());
    Ok(())
}

/// Writes dependency notes for `node` and every node below it.
///
/// Stops at the first failure.
pub async fn write_all_dependency_notes(cache: &Cache, graph: &Graph, owner_id: &str, node: &Node) -> Result<()> {
    for target in std::iter::once(node).chain(graph.children(node)) {
        write_dependency_notes(cache, graph, owner_id, target).await?;
    }
    Ok(())
}

/// Reads the stored dependency list of `node`'s repository.
///
/// A repository without a dependency note yields an empty list.
///
/// # Errors
///
/// [`DependError::MultipleNotes`] if the ref holds more than one record, or a
/// JSON error if the note is not a spec list.
pub async fn read_dependency_notes(cache: &Cache, node: &Node) -> Result<Vec<RepoSpec>> {
    let repo = cache.repo(node.url()).await?;

    let record = match repo.notes_listing(DEPS_REF).await? {
        NotesListing::Empty => return Ok(Vec::new()),
        NotesListing::Single(record) => record,
        NotesListing::Multiple(records) => {
            return Err(DependError::MultipleNotes {
                repository: node.name().to_string(),
                notes_ref: DEPS_REF.to_string(),
                count: records.len(),
            }
            .into());
        }
    };

    let payload = repo.notes_show(DEPS_REF, Some(&record.object_id)).await?;
    serde_json::from_str(payload.trim()).with_context(|| format!("Failed to parse dependency notes of {}", node.name()))
}

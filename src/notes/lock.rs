//! Per-repository lock on the lock notes ref.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::cache::Cache;
use crate::constants::{LOCK_REF, REMOTE};
use crate::core::DependError;
use crate::git::{GitRepo, NoteRecord, NotesListing};
use crate::graph::Node;

/// Lock note payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Lock {
    /// Who holds the lock
    pub id: String,
    /// When the lock was taken
    pub timestamp: DateTime<Utc>,
}

impl Lock {
    /// A lock owned by `id`, stamped now.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            timestamp: Utc::now(),
        }
    }
}

/// A lock this process wrote and pushed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeldLock {
    /// Name of the locked node
    pub node: String,
    /// URL of the locked repository
    pub url: String,
    /// The payload that was written
    pub lock: Lock,
    /// Commit the lock note is attached to
    pub object_id: String,
}

/// The single record on the lock ref, or the protocol error for its absence
/// or multiplicity.
fn single_lock(listing: NotesListing, node: &Node) -> Result<NoteRecord> {
    match listing {
        NotesListing::Single(record) => Ok(record),
        NotesListing::Empty => Err(DependError::NoLock {
            repository: node.name().to_string(),
        }
        .into()),
        NotesListing::Multiple(records) => Err(DependError::MultipleLocks {
            repository: node.name().to_string(),
            count: records.len(),
        }
        .into()),
    }
}

/// Takes the lock on `node`'s repository for `owner_id`.
///
/// Adds the lock note to HEAD of the mirror, pushes the lock ref, then reads
/// the ref back. Anything other than exactly one note afterwards is a lost
/// race.
///
/// # Errors
///
/// - [`DependError::GitCommandError`] if HEAD already carries a lock note or
///   the remote rejects the push
/// - [`DependError::MultipleLocks`] if another lock note is present. The note
///   this call added is removed and the removal pushed before returning.
pub async fn write_lock(cache: &Cache, owner_id: &str, node: &Node) -> Result<HeldLock> {
    let repo = cache.repo(node.url()).await?;
    let lock = Lock::new(owner_id);
    let payload = serde_json::to_string(&lock)?;

    tracing::debug!(target: "notes", "Locking {} for {}", node.name(), owner_id);
    repo.notes_add(LOCK_REF, &payload, false)
        .await
        .with_context(|| format!("Failed to write lock on {}", node.name()))?;
    repo.push_notes(REMOTE, LOCK_REF)
        .await
        .with_context(|| format!("Failed to push lock on {}", node.name()))?;

    let listing = repo.notes_listing(LOCK_REF).await?;
    if let NotesListing::Multiple(records) = &listing {
        withdraw_lock(&repo, node).await;
        return Err(DependError::MultipleLocks {
            repository: node.name().to_string(),
            count: records.len(),
        }
        .into());
    }
    let record = single_lock(listing, node)?;
    tracing::info!(target: "notes", "Locked {} ({})", node.name(), record.object_id);

    Ok(HeldLock {
        node: node.name().to_string(),
        url: node.url().to_string(),
        lock,
        object_id: record.object_id,
    })
}

/// Takes back the note just added to HEAD after losing a race.
///
/// Failure here is logged only; the caller reports the contention.
async fn withdraw_lock(repo: &GitRepo, node: &Node) {
    let withdrawn = async {
        let head = repo.rev_parse("HEAD").await?;
        repo.notes_remove(LOCK_REF, &head).await?;
        repo.push_notes(REMOTE, LOCK_REF).await?;
        Ok::<(), anyhow::Error>(())
    }
    .await;

    match withdrawn {
        Ok(()) => tracing::info!(target: "notes", "Withdrew contended lock on {}", node.name()),
        Err(error) => {
            tracing::warn!(target: "notes", "Failed to withdraw contended lock on {}: {:#}", node.name(), error);
        }
    }
}

/// Releases the lock on `node`'s repository.
///
/// The attached commit is re-resolved from the lock ref rather than taken
/// from a [`HeldLock`], so a lock written by an earlier run can be cleared too.
///
/// # Errors
///
/// [`DependError::NoLock`] if the ref is empty, [`DependError::MultipleLocks`]
/// if it holds more than one note, or the git error of the remove or push.
pub async fn remove_lock(cache: &Cache, node: &Node) -> Result<()> {
    let repo = cache.repo(node.url()).await?;
    let record = single_lock(repo.notes_listing(LOCK_REF).await?, node)?;

    repo.notes_remove(LOCK_REF, &record.object_id)
        .await
        .with_context(|| format!("Failed to remove lock on {}", node.name()))?;
    repo.push_notes(REMOTE, LOCK_REF)
        .await
        .with_context(|| format!("Failed to push lock removal on {}", node.name()))?;

    tracing::info!(target: "notes", "Unlocked {}", node.name());
    Ok(())
}

/// Removes every note on `node`'s lock ref, however many there are, and
/// pushes the result. Returns the number of notes removed.
///
/// This is the recovery path for a ref that [`remove_lock`] refuses because
/// it holds more than one note.
pub async fn clear_locks(cache: &Cache, node: &Node) -> Result<usize> {
    let repo = cache.repo(node.url()).await?;
    let records = repo.notes_listing(LOCK_REF).await?.into_records();
    if records.is_empty() {
        return Ok(0);
    }

    for record in &records {
        repo.notes_remove(LOCK_REF, &record.object_id)
            .await
            .with_context(|| format!("Failed to remove lock note on {} of {}", record.object_id, node.name()))?;
    }
    repo.push_notes(REMOTE, LOCK_REF)
        .await
        .with_context(|| format!("Failed to push lock removal on {}", node.name()))?;

    tracing::info!(target: "notes", "Cleared {} lock notes on {}", records.len(), node.name());
    Ok(records.len())
}

/// Reads the current lock on `node`'s repository, if any.
///
/// # Errors
///
/// [`DependError::MultipleLocks`] if more than one lock note is present.
pub async fn read_lock(cache: &Cache, node: &Node) -> Result<Option<Lock>> {
    let repo = cache.repo(node.url()).await?;
    match repo.notes_listing(LOCK_REF).await? {
        NotesListing::Empty => Ok(None),
        listing => {
            let record = single_lock(listing, node)?;
            read_lock_payload(&repo, &record).await.map(Some)
        }
    }
}

async fn read_lock_payload(repo: &GitRepo, record: &NoteRecord) -> Result<Lock> {
    let payload = repo.notes_show(LOCK_REF, Some(&record.object_id)).await?;
    serde_json::from_str(payload.trim())
        .with_context(|| format!("Failed to parse lock note on {}", record.object_id))
}

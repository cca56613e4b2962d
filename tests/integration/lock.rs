//! Lock contention between independent caches sharing the same origins.

use anyhow::Result;

use git_depend::constants::LOCK_REF;
use git_depend::core::DependError;
use git_depend::notes::{read_lock, remove_lock, write_lock};

use crate::common::TestWorkspace;

#[tokio::test]
async fn test_second_writer_loses_the_push() -> Result<()> {
    let workspace = TestWorkspace::new()?;
    let origins = workspace.origins_with_specs(&[("foo", &[])])?;
    let graph = workspace.graph()?;
    let foo = graph.require("foo")?;

    let alice = workspace.cache()?;
    let bob = workspace.other_cache("bob-cache")?;
    alice.clone_or_update(foo.url()).await?;
    bob.clone_or_update(foo.url()).await?;

    write_lock(&alice, "alice", foo).await?;

    let err = write_lock(&bob, "bob", foo).await.unwrap_err();
    assert!(
        matches!(err.downcast_ref::<DependError>(), Some(DependError::GitCommandError { .. })),
        "expected a rejected push, got {err:#}"
    );
    assert_eq!(origins[0].git.notes_count(LOCK_REF)?, 1);

    // Once alice lets go and bob refreshes, bob can take the lock.
    remove_lock(&alice, foo).await?;
    assert_eq!(origins[0].git.notes_count(LOCK_REF)?, 0);

    bob.clone_or_update(foo.url()).await?;
    let held = write_lock(&bob, "bob", foo).await?;
    assert_eq!(held.lock.id, "bob");
    assert_eq!(origins[0].git.notes_count(LOCK_REF)?, 1);

    remove_lock(&bob, foo).await?;
    Ok(())
}

#[tokio::test]
async fn test_stale_lock_cleared_from_another_cache() -> Result<()> {
    let workspace = TestWorkspace::new()?;
    let origins = workspace.origins_with_specs(&[("foo", &[])])?;
    let graph = workspace.graph()?;
    let foo = graph.require("foo")?;

    let crashed = workspace.other_cache("crashed-cache")?;
    crashed.clone_or_update(foo.url()).await?;
    write_lock(&crashed, "crashed-run", foo).await?;

    let cache = workspace.cache()?;
    cache.clone_or_update(foo.url()).await?;
    let lock = read_lock(&cache, foo).await?.expect("lock should be visible after fetch");
    assert_eq!(lock.id, "crashed-run");

    remove_lock(&cache, foo).await?;
    assert_eq!(origins[0].git.notes_count(LOCK_REF)?, 0);
    assert!(read_lock(&cache, foo).await?.is_none());
    Ok(())
}

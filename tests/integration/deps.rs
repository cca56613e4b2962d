//! Dependency records shared through the origins.

use anyhow::Result;

use git_depend::constants::{DEPS_REF, LOCK_REF};
use git_depend::graph::{Graph, RepoSpec};
use git_depend::notes::{read_dependency_notes, write_all_dependency_notes, write_dependency_notes};

use crate::common::TestWorkspace;

#[tokio::test]
async fn test_record_is_visible_from_another_cache() -> Result<()> {
    let workspace = TestWorkspace::new()?;
    let origins = workspace.origins_with_specs(&[("foo", &["bar", "baz"]), ("bar", &["baz"]), ("baz", &[])])?;
    let graph = workspace.graph()?;
    let foo = graph.require("foo")?;

    let alice = workspace.cache()?;
    alice.clone_or_update(foo.url()).await?;
    write_dependency_notes(&alice, &graph, "alice", foo).await?;

    let bob = workspace.other_cache("bob-cache")?;
    bob.clone_or_update(foo.url()).await?;
    let record = read_dependency_notes(&bob, foo).await?;

    assert_eq!(
        record,
        vec![
            RepoSpec::new("bar", origins[1].url.clone(), ["baz"]),
            RepoSpec::new("baz", origins[2].url.clone(), Vec::<String>::new()),
        ]
    );
    assert_eq!(origins[0].git.notes_count(LOCK_REF)?, 0);
    Ok(())
}

#[tokio::test]
async fn test_rewrite_from_another_cache_replaces_record() -> Result<()> {
    let workspace = TestWorkspace::new()?;
    let origins = workspace.origins_with_specs(&[("foo", &["bar", "baz"]), ("bar", &[]), ("baz", &[])])?;
    let graph = workspace.graph()?;

    let alice = workspace.cache()?;
    write_dependency_notes(&alice, &graph, "alice", graph.require("foo")?).await?;

    // Bob drops baz from foo's dependencies.
    let narrowed = Graph::build(vec![
        RepoSpec::new("foo", origins[0].url.clone(), ["bar"]),
        RepoSpec::new("bar", origins[1].url.clone(), Vec::<String>::new()),
    ])?;
    let bob = workspace.other_cache("bob-cache")?;
    bob.clone_or_update(&origins[0].url).await?;
    write_dependency_notes(&bob, &narrowed, "bob", narrowed.require("foo")?).await?;

    assert_eq!(origins[0].git.notes_count(DEPS_REF)?, 1);

    alice.clone_or_update(&origins[0].url).await?;
    let record = read_dependency_notes(&alice, graph.require("foo")?).await?;
    let names: Vec<&str> = record.iter().map(|spec| spec.name.as_str()).collect();
    assert_eq!(names, vec!["bar"]);
    Ok(())
}

#[tokio::test]
async fn test_write_all_records_every_repository() -> Result<()> {
    let workspace = TestWorkspace::new()?;
    let origins = workspace.origins_with_specs(&[("foo", &["bar"]), ("bar", &["baz"]), ("baz", &[])])?;
    let graph = workspace.graph()?;
    let cache = workspace.cache()?;

    cache.clone_or_update_many(&graph.all_urls()).await?;
    write_all_dependency_notes(&cache, &graph, "alice", graph.require("foo")?).await?;

    for origin in &origins {
        assert_eq!(origin.git.notes_count(DEPS_REF)?, 1, "{} should carry a record", origin.name);
        assert_eq!(origin.git.notes_count(LOCK_REF)?, 0, "{} should be unlocked", origin.name);
    }
    assert!(read_dependency_notes(&cache, graph.require("baz")?).await?.is_empty());
    Ok(())
}

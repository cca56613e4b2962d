//! Mirror cache against real origin repositories.

use anyhow::Result;
use serial_test::serial;

use git_depend::cache::Cache;
use git_depend::test_utils::{GitFixture, TestGit};

use crate::common::TestWorkspace;

#[tokio::test]
#[serial]
async fn test_hundred_distinct_urls() -> Result<()> {
    let fixture = GitFixture::new()?;
    let origin = fixture.origin("shared")?;
    let origins_dir = fixture.root().join("origins");

    // Distinct spellings of the same origin, so each hashes differently.
    let mut urls = Vec::new();
    for i in 0..100 {
        std::fs::create_dir_all(origins_dir.join(format!("hop{i}")))?;
        urls.push(format!("{}/hop{i}/../{}", origins_dir.display(), origin.name));
    }

    let cache = Cache::new(fixture.scratch().join("cache"))?;
    let paths = cache.clone_or_update_many(&urls).await?;

    assert_eq!(paths.len(), 100);
    assert_eq!(cache.repositories().await.len(), 100);
    for (url, path) in urls.iter().zip(&paths) {
        assert_eq!(path, &cache.repository_path(url));
        assert!(path.join(".git").exists());
    }
    Ok(())
}

#[tokio::test]
async fn test_mirrors_persist_across_instances() -> Result<()> {
    let fixture = GitFixture::new()?;
    let origin = fixture.origin("foo")?;
    let root = fixture.scratch().join("cache");

    let path = Cache::new(&root)?.clone_or_update(&origin.url).await?;
    std::fs::write(path.join(".git").join("marker"), "kept")?;
    origin.git.commit_file("CHANGES.md", "more\n", "Second commit")?;

    // A fresh instance knows nothing in memory but finds the mirror on disk.
    let cache = Cache::new(&root)?;
    assert!(cache.repositories().await.is_empty());
    assert_eq!(cache.clone_or_update(&origin.url).await?, path);

    assert!(path.join(".git").join("marker").exists());
    assert_eq!(TestGit::new(&path).rev_parse("origin/main")?, origin.git.rev_parse("main")?);
    Ok(())
}

#[tokio::test]
async fn test_sync_every_url_of_a_graph() -> Result<()> {
    let workspace = TestWorkspace::new()?;
    workspace.origins_with_specs(&[("foo", &["bar", "baz"]), ("bar", &["baz"]), ("baz", &[])])?;
    let graph = workspace.graph()?;
    let cache = workspace.cache()?;

    let paths = cache.clone_or_update_many(&graph.all_urls()).await?;

    assert_eq!(paths.len(), 3);
    let mut expected = graph.all_urls();
    expected.sort();
    assert_eq!(cache.repositories().await, expected);
    Ok(())
}

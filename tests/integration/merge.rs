//! Multi-repository merges against real origins.

use anyhow::Result;

use git_depend::constants::LOCK_REF;
use git_depend::request::{MergeState, Request, Requests};
use git_depend::test_utils::Origin;

use crate::common::{AUTHOR, EMAIL, TestWorkspace};

fn assert_unlocked(origins: &[Origin]) {
    for origin in origins {
        assert_eq!(origin.git.notes_count(LOCK_REF).unwrap(), 0, "{} is still locked", origin.name);
    }
}

fn recorded_request(origin: &Origin, ref_name: &str) -> Request {
    let message = origin.git.run(&["log", "-1", "--format=%B", ref_name]).unwrap();
    serde_json::from_str(&message).unwrap()
}

#[tokio::test]
async fn test_merge_two_repositories() -> Result<()> {
    let workspace = TestWorkspace::new()?;
    let origins = workspace.origins_with_specs(&[("foo", &["bar"]), ("bar", &["baz"]), ("baz", &[])])?;
    origins[0].feature_branch("feature")?;
    origins[1].feature_branch("feature")?;
    let graph = workspace.graph()?;
    let cache = workspace.cache()?;
    cache.clone_or_update_many(&graph.all_urls()).await?;

    let mut requests = Requests::new(&graph, &cache);
    requests.add_request("foo", "feature", "main", AUTHOR, EMAIL)?;
    requests.add_request("bar", "feature", "main", AUTHOR, EMAIL)?;
    requests.merge().await?;

    assert_eq!(requests.state(), MergeState::Done);
    for origin in &origins[..2] {
        let request = recorded_request(origin, "main");
        assert_eq!(request.name, origin.name);
        assert_eq!(request.from, "feature");
        assert_eq!(origin.git.subject("main~1")?, "Work on feature");
        assert_eq!(origin.git.run(&["log", "-1", "--format=%an <%ae>", "main"])?, format!("{AUTHOR} <{EMAIL}>"));
    }
    assert_eq!(origins[2].git.subject("main")?, "Initial commit");
    assert_unlocked(&origins);
    Ok(())
}

#[tokio::test]
async fn test_failure_keeps_completed_merges() -> Result<()> {
    let workspace = TestWorkspace::new()?;
    let origins = workspace.origins_with_specs(&[("foo", &[]), ("bar", &[])])?;
    origins[0].feature_branch("feature")?;
    let graph = workspace.graph()?;
    let cache = workspace.cache()?;

    let mut requests = Requests::new(&graph, &cache);
    requests.add_request("foo", "feature", "main", AUTHOR, EMAIL)?;
    requests.add_request("bar", "feature", "main", AUTHOR, EMAIL)?;

    let err = requests.merge().await.unwrap_err();
    assert!(format!("{err:#}").contains("bar"), "unexpected error: {err:#}");
    assert_eq!(requests.state(), MergeState::Aborted);

    assert_eq!(recorded_request(&origins[0], "main").name, "foo");
    assert_eq!(origins[1].git.subject("main")?, "Initial commit");
    assert_unlocked(&origins);
    Ok(())
}

#[tokio::test]
async fn test_consecutive_merges_from_two_users() -> Result<()> {
    let workspace = TestWorkspace::new()?;
    let origins = workspace.origins_with_specs(&[("foo", &[])])?;
    origins[0].feature_branch("feature-a")?;
    origins[0].feature_branch("feature-b")?;
    let graph = workspace.graph()?;

    let alice = workspace.cache()?;
    alice.clone_or_update(&origins[0].url).await?;
    let mut first = Requests::new(&graph, &alice);
    first.add_request("foo", "feature-a", "main", AUTHOR, EMAIL)?;
    first.merge().await?;

    // Bob's feature-b still starts from the old main and gets rebased.
    let bob = workspace.other_cache("bob-cache")?;
    bob.clone_or_update(&origins[0].url).await?;
    let mut second = Requests::new(&graph, &bob);
    second.add_request("foo", "feature-b", "main", "Bob", "bob@example.com")?;
    second.merge().await?;

    let log = origins[0].git.run(&["log", "--format=%s", "main"])?;
    let subjects: Vec<&str> = log.lines().collect();
    assert_eq!(subjects.len(), 5);
    assert_eq!(subjects[1], "Work on feature-b");
    assert_eq!(subjects[3], "Work on feature-a");
    assert_eq!(recorded_request(&origins[0], "main").author, "Bob");
    assert_eq!(recorded_request(&origins[0], "main~2").author, AUTHOR);
    assert_unlocked(&origins);
    Ok(())
}

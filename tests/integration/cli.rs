//! The `git-dep` binary end to end.

use anyhow::Result;
use predicates::prelude::*;

use git_depend::cache::url_hash;
use git_depend::constants::{DEPS_REF, LOCK_REF};
use git_depend::notes::{Lock, write_lock};

use crate::common::{AUTHOR, TestWorkspace};

#[test]
fn test_tree_prints_each_root() -> Result<()> {
    let workspace = TestWorkspace::new()?;
    std::fs::write(
        workspace.specs_path(),
        r#"[{"Name":"foo","Url":"u0","Deps":["bar","baz"]},{"Name":"bar","Url":"u1"},{"Name":"baz","Url":"u2"},{"Name":"qux","Url":"u3"}]"#,
    )?;

    workspace
        .git_dep()
        .arg("tree")
        .arg(workspace.specs_path())
        .assert()
        .success()
        .stdout(predicate::str::contains("foo (u0)\n├── bar (u1)\n└── baz (u2)\n"))
        .stdout(predicate::str::contains("qux (u3)"));
    Ok(())
}

#[test]
fn test_tree_reports_cycle() -> Result<()> {
    let workspace = TestWorkspace::new()?;
    std::fs::write(
        workspace.specs_path(),
        r#"[{"Name":"foo","Url":"u0","Deps":["bar"]},{"Name":"bar","Url":"u1","Deps":["foo"]}]"#,
    )?;

    workspace
        .git_dep()
        .arg("tree")
        .arg(workspace.specs_path())
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Cycle detected"))
        .stderr(predicate::str::contains("suggestion"));
    Ok(())
}

#[test]
fn test_sync_clones_every_repository() -> Result<()> {
    let workspace = TestWorkspace::new()?;
    let origins = workspace.origins_with_specs(&[("foo", &["bar"]), ("bar", &[]), ("qux", &[])])?;

    workspace
        .git_dep()
        .arg("sync")
        .arg(workspace.specs_path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Synced 3 repositories"));

    for origin in &origins {
        assert!(workspace.cache_dir().join(url_hash(&origin.url)).join(".git").exists());
    }
    Ok(())
}

#[test]
fn test_write_then_show_deps() -> Result<()> {
    let workspace = TestWorkspace::new()?;
    workspace.write_config()?;
    let origins = workspace.origins_with_specs(&[("foo", &["bar"]), ("bar", &[])])?;

    workspace
        .git_dep()
        .args(["write-deps", workspace.specs_path().to_str().unwrap(), "foo", "--all"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Wrote dependency notes for"));

    assert_eq!(origins[0].git.notes_count(DEPS_REF)?, 1);
    assert_eq!(origins[1].git.notes_count(DEPS_REF)?, 1);
    assert_eq!(origins[0].git.notes_count(LOCK_REF)?, 0);

    workspace
        .git_dep()
        .args(["show-deps", workspace.specs_path().to_str().unwrap(), "foo"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"Name\": \"bar\""))
        .stdout(predicate::str::contains(origins[1].url.as_str()));

    workspace
        .git_dep()
        .args(["show-deps", workspace.specs_path().to_str().unwrap(), "bar"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No dependency notes for bar"));
    Ok(())
}

#[test]
fn test_merge_needs_an_identity() -> Result<()> {
    let workspace = TestWorkspace::new()?;
    workspace.origins_with_specs(&[("foo", &[])])?;

    workspace
        .git_dep()
        .args(["merge", workspace.specs_path().to_str().unwrap(), "--from", "feature", "--to", "main", "foo"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No author configured"));
    Ok(())
}

#[test]
fn test_merge_records_request() -> Result<()> {
    let workspace = TestWorkspace::new()?;
    workspace.write_config()?;
    let origins = workspace.origins_with_specs(&[("foo", &["bar"]), ("bar", &[])])?;
    origins[0].feature_branch("feature")?;

    workspace
        .git_dep()
        .args(["merge", workspace.specs_path().to_str().unwrap(), "--from", "feature", "--to", "main", "foo"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Merged feature into main in"));

    let subject = origins[0].git.subject("main")?;
    assert!(subject.contains("\"From\":\"feature\""), "unexpected subject {subject}");
    assert!(subject.contains(&format!("\"Author\":\"{AUTHOR}\"")));
    assert_eq!(origins[0].git.notes_count(LOCK_REF)?, 0);
    assert_eq!(origins[1].git.notes_count(LOCK_REF)?, 0);
    Ok(())
}

#[tokio::test]
async fn test_unlock_clears_stale_lock() -> Result<()> {
    let workspace = TestWorkspace::new()?;
    workspace.write_config()?;
    let origins = workspace.origins_with_specs(&[("foo", &[])])?;
    let specs = workspace.specs_path().to_str().unwrap().to_string();

    workspace
        .git_dep()
        .args(["unlock", &specs, "foo"])
        .assert()
        .success()
        .stdout(predicate::str::contains("foo is not locked"));

    let graph = workspace.graph()?;
    let other = workspace.other_cache("crashed-cache")?;
    write_lock(&other, "crashed-run", graph.require("foo")?).await?;
    assert_eq!(origins[0].git.notes_count(LOCK_REF)?, 1);

    workspace
        .git_dep()
        .args(["unlock", &specs, "foo"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Released lock crashed-run"));
    assert_eq!(origins[0].git.notes_count(LOCK_REF)?, 0);
    Ok(())
}

#[test]
fn test_unlock_all_clears_several_lock_notes() -> Result<()> {
    let workspace = TestWorkspace::new()?;
    workspace.write_config()?;
    let origins = workspace.origins_with_specs(&[("foo", &[])])?;
    let specs = workspace.specs_path().to_str().unwrap().to_string();

    let origin = &origins[0].git;
    origin.commit_file("second.txt", "2", "Second commit")?;
    for (target, id) in [("main~1", "run-a"), ("main", "run-b")] {
        let payload = serde_json::to_string(&Lock::new(id))?;
        origin.run(&["notes", "--ref", LOCK_REF, "add", "-m", &payload, target])?;
    }

    workspace
        .git_dep()
        .args(["unlock", &specs, "foo"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unlock --all"));
    assert_eq!(origin.notes_count(LOCK_REF)?, 2);

    workspace
        .git_dep()
        .args(["unlock", "--all", &specs, "foo"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Removed 2 lock note(s) on foo"));
    assert_eq!(origin.notes_count(LOCK_REF)?, 0);

    workspace
        .git_dep()
        .args(["unlock", "--all", &specs, "foo"])
        .assert()
        .success()
        .stdout(predicate::str::contains("foo is not locked"));
    Ok(())
}

#[test]
fn test_config_and_projects() -> Result<()> {
    let workspace = TestWorkspace::new()?;

    workspace
        .git_dep()
        .args(["config", "--author", "Ada", "--email", "ada@example.com"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Author: Ada"))
        .stdout(predicate::str::contains("Email: ada@example.com"));

    workspace
        .git_dep()
        .args(["add", "git@example.com:org/foo.git:main", "https://example.com/bar.git:dev"])
        .assert()
        .success();

    workspace
        .git_dep()
        .args(["rm", "https://example.com/bar.git:dev"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Removed https://example.com/bar.git:dev"));

    workspace
        .git_dep()
        .arg("config")
        .assert()
        .success()
        .stdout(predicate::str::contains("git@example.com:org/foo.git:main"))
        .stdout(predicate::str::contains("bar.git").not());

    workspace.git_dep().args(["add", "no-branch"]).assert().failure();
    Ok(())
}

#[test]
fn test_clean_removes_cache() -> Result<()> {
    let workspace = TestWorkspace::new()?;
    workspace.origins_with_specs(&[("foo", &[])])?;

    workspace.git_dep().arg("sync").arg(workspace.specs_path()).assert().success();
    assert!(workspace.cache_dir().exists());

    workspace
        .git_dep()
        .arg("clean")
        .assert()
        .success()
        .stdout(predicate::str::contains("Removed cache"));
    assert!(!workspace.cache_dir().exists());
    Ok(())
}

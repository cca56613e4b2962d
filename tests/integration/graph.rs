//! Graphs loaded from spec files on disk.

use anyhow::Result;
use git_depend::core::DependError;
use git_depend::graph::Graph;
use tempfile::TempDir;

const EIGHT_NODES: &str = r#"[
  {"Name": "foo", "Url": "https://example.com/foo.git", "Deps": ["bar", "baz"]},
  {"Name": "bar", "Url": "https://example.com/bar.git"},
  {"Name": "baz", "Url": "https://example.com/baz.git", "Deps": ["wibble", "wobble"]},
  {"Name": "qux", "Url": "https://example.com/qux.git", "Deps": ["wobble"]},
  {"Name": "wibble", "Url": "https://example.com/wibble.git", "Deps": ["wobble"]},
  {"Name": "wobble", "Url": "https://example.com/wobble.git", "Deps": ["wubble"]},
  {"Name": "wubble", "Url": "https://example.com/wubble.git", "Deps": []},
  {"Name": "fobble", "Url": "https://example.com/fobble.git"}
]"#;

#[test]
fn test_eight_node_graph_from_file() -> Result<()> {
    let temp = TempDir::new()?;
    let path = temp.path().join("specs.json");
    std::fs::write(&path, EIGHT_NODES)?;

    let graph = Graph::from_file(&path)?;
    assert_eq!(graph.len(), 8);

    let roots: Vec<&str> = graph.roots().iter().map(|node| node.name()).collect();
    assert_eq!(roots, vec!["foo", "qux", "fobble"]);
    assert_eq!(graph.all_urls().len(), 8);

    let foo = graph.require("foo")?;
    let below_foo: Vec<&str> = graph.children(foo).iter().map(|node| node.name()).collect();
    assert_eq!(below_foo, vec!["bar", "baz", "wibble", "wobble", "wubble"]);
    Ok(())
}

#[test]
fn test_malformed_file_is_invalid_spec() -> Result<()> {
    let temp = TempDir::new()?;
    let path = temp.path().join("specs.json");
    std::fs::write(&path, r#"{"Name": "foo"}"#)?;

    let err = Graph::from_file(&path).unwrap_err();
    assert!(matches!(err.downcast_ref::<DependError>(), Some(DependError::InvalidSpec { .. })));
    Ok(())
}

#[test]
fn test_missing_file_fails() {
    let temp = TempDir::new().unwrap();
    assert!(Graph::from_file(temp.path().join("absent.json")).is_err());
}

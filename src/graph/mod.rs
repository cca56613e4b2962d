//! Dependency graph across repositories.
//!
//! This module turns a flat list of [`RepoSpec`]s into a [`Graph`]: an arena
//! of [`Node`]s, each holding its direct dependencies by index, plus the set
//! of roots (nodes no other node depends on).
//!
//! Construction validates, in order:
//!
//! 1. names are unique ([`DependError::DuplicateKey`]);
//! 2. every dependency names a declared spec ([`DependError::MissingDependency`]);
//! 3. the dependency relation is acyclic ([`DependError::Cycle`]);
//! 4. every node is reachable from a root ([`DependError::Unreachable`]).
//!
//! The graph is read-only once built. Transitive closures are computed on
//! demand by [`Graph::children`].
//!
//! # Example
//!
//! ```rust
//! use git_depend::graph::Graph;
//!
//! let graph = Graph::from_json(
//!     r#"[{"Name":"foo","Url":"u0","Deps":["bar","baz"]},
//!         {"Name":"bar","Url":"u1"},
//!         {"Name":"baz","Url":"u2"}]"#,
//! )?;
//! let roots = graph.roots();
//! assert_eq!(roots.len(), 1);
//! assert_eq!(graph.deps(roots[0]).len(), 2);
//! # Ok::<(), anyhow::Error>(())
//! ```

pub mod spec;

use anyhow::Result;
use petgraph::Direction;
use petgraph::graph::{DiGraph, NodeIndex};
use std::collections::{HashMap, HashSet};
use std::path::Path;

use crate::core::DependError;

pub use spec::{RepoSpec, parse_specs, read_specs};

/// A repository in the graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    index: NodeIndex,
    name: String,
    url: String,
    deps: Vec<NodeIndex>,
}

impl Node {
    /// Name of the repository.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Clone URL of the repository.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }
}

/// Color states for cycle detection using DFS.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Color {
    /// Node has not been visited.
    White,
    /// Node is on the current walk path.
    Gray,
    /// Node and all its descendants are done.
    Black,
}

/// Validated dependency graph.
#[derive(Debug)]
pub struct Graph {
    /// Arena owning every node; indices follow spec input order
    graph: DiGraph<Node, ()>,
    /// Name -> arena index
    node_map: HashMap<String, NodeIndex>,
    /// Nodes with no dependents, in input order
    roots: Vec<NodeIndex>,
}

impl Graph {
    /// Builds and validates a graph from specs.
    ///
    /// # Errors
    ///
    /// [`DependError::DuplicateKey`], [`DependError::MissingDependency`],
    /// [`DependError::Cycle`] or [`DependError::Unreachable`].
    pub fn build(specs: Vec<RepoSpec>) -> Result<Self> {
        let mut graph = DiGraph::with_capacity(specs.len(), 0);
        let mut node_map = HashMap::with_capacity(specs.len());

        for spec in &specs {
            if node_map.contains_key(&spec.name) {
                return Err(DependError::DuplicateKey {
                    name: spec.name.clone(),
                }
                .into());
            }
            let index = graph.add_node(Node {
                index: NodeIndex::new(graph.node_count()),
                name: spec.name.clone(),
                url: spec.url.clone(),
                deps: Vec::new(),
            });
            node_map.insert(spec.name.clone(), index);
        }

        for spec in &specs {
            let from = node_map[&spec.name];
            let mut deps = Vec::with_capacity(spec.deps.len());
            for dep in &spec.deps {
                let to = *node_map.get(dep).ok_or_else(|| DependError::MissingDependency {
                    referrer: spec.name.clone(),
                    missing: dep.clone(),
                })?;
                if !deps.contains(&to) {
                    deps.push(to);
                    graph.add_edge(from, to, ());
                }
            }
            graph[from].deps = deps;
        }

        let mut built = Self {
            graph,
            node_map,
            roots: Vec::new(),
        };
        built.detect_cycles()?;
        built.roots = built.graph.externals(Direction::Incoming).collect();
        built.check_reachability()?;

        tracing::debug!(
            "Built dependency graph: {} nodes, {} edges, {} roots",
            built.graph.node_count(),
            built.graph.edge_count(),
            built.roots.len()
        );
        Ok(built)
    }

    /// Parses a JSON spec document and builds the graph.
    pub fn from_json(json: &str) -> Result<Self> {
        Self::build(parse_specs(json)?)
    }

    /// Reads a JSON spec document from disk and builds the graph.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        Self::build(read_specs(path.as_ref())?)
    }

    /// Depth-first walk from every node in input order.
    fn detect_cycles(&self) -> Result<()> {
        let mut colors = vec![Color::White; self.graph.node_count()];

        for index in self.graph.node_indices() {
            if colors[index.index()] == Color::White {
                self.dfs_visit(index, &mut colors)?;
            }
        }

        Ok(())
    }

    fn dfs_visit(&self, start: NodeIndex, colors: &mut [Color]) -> Result<()> {
        colors[start.index()] = Color::Gray;
        // (node, position of the next dep to look at)
        let mut stack = vec![(start, 0usize)];

        while let Some((index, next)) = stack.last_mut() {
            let index = *index;
            let Some(&dep) = self.graph[index].deps.get(*next) else {
                colors[index.index()] = Color::Black;
                stack.pop();
                continue;
            };
            *next += 1;

            match colors[dep.index()] {
                Color::Gray => {
                    return Err(DependError::Cycle {
                        node: self.graph[index].name.clone(),
                        ancestor: self.graph[dep].name.clone(),
                    }
                    .into());
                }
                Color::White => {
                    colors[dep.index()] = Color::Gray;
                    stack.push((dep, 0));
                }
                Color::Black => {}
            }
        }

        Ok(())
    }

    fn check_reachability(&self) -> Result<()> {
        let mut descendants = HashSet::new();
        for &root in &self.roots {
            self.collect_children(root, &mut descendants, &mut Vec::new());
        }

        let total = self.graph.node_count();
        if self.roots.len() + descendants.len() != total {
            return Err(DependError::Unreachable {
                roots: self.roots.len(),
                descendants: descendants.len(),
                total,
            }
            .into());
        }
        Ok(())
    }

    /// Pre-order walk collecting every node below `index` once.
    fn collect_children(&self, index: NodeIndex, visited: &mut HashSet<NodeIndex>, out: &mut Vec<NodeIndex>) {
        let mut stack: Vec<NodeIndex> = self.graph[index].deps.iter().rev().copied().collect();
        while let Some(dep) = stack.pop() {
            if visited.insert(dep) {
                out.push(dep);
                stack.extend(self.graph[dep].deps.iter().rev().copied());
            }
        }
    }

    /// Looks up a node by name.
    #[must_use]
    pub fn node(&self, name: &str) -> Option<&Node> {
        self.node_map.get(name).map(|&index| &self.graph[index])
    }

    /// Looks up a node by name, failing with [`DependError::UnknownNode`].
    pub fn require(&self, name: &str) -> Result<&Node> {
        self.node(name).ok_or_else(|| {
            DependError::UnknownNode {
                name: name.to_string(),
            }
            .into()
        })
    }

    /// All nodes in spec input order.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.graph.node_weights()
    }

    /// Nodes no other node depends on, in spec input order.
    #[must_use]
    pub fn roots(&self) -> Vec<&Node> {
        self.roots.iter().map(|&index| &self.graph[index]).collect()
    }

    /// Number of nodes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.graph.node_count()
    }

    /// Returns true for a graph built from no specs.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    /// Direct dependencies of `node`, in declaration order.
    #[must_use]
    pub fn deps(&self, node: &Node) -> Vec<&Node> {
        node.deps.iter().map(|&index| &self.graph[index]).collect()
    }

    /// Transitive dependencies of `node`, deduplicated, in depth-first
    /// pre-order. `node` itself is not included.
    #[must_use]
    pub fn children(&self, node: &Node) -> Vec<&Node> {
        let mut out = Vec::new();
        self.collect_children(node.index, &mut HashSet::new(), &mut out);
        out.into_iter().map(|index| &self.graph[index]).collect()
    }

    /// Every distinct URL reachable from the roots, in first-seen order.
    #[must_use]
    pub fn all_urls(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        let mut urls = Vec::new();
        for root in self.roots() {
            for node in std::iter::once(root).chain(self.children(root)) {
                if seen.insert(node.url.as_str()) {
                    urls.push(node.url.clone());
                }
            }
        }
        urls
    }

    /// Specs of `node`'s direct dependencies, each listing its own direct
    /// dependency names. This is the payload of a dependency note.
    #[must_use]
    pub fn dependency_specs(&self, node: &Node) -> Vec<RepoSpec> {
        self.deps(node)
            .into_iter()
            .map(|dep| RepoSpec::new(&dep.name, &dep.url, self.deps(dep).into_iter().map(|d| d.name.clone())))
            .collect()
    }

    /// Renders `node` and everything below it as a tree.
    #[must_use]
    pub fn tree_string(&self, node: &Node) -> String {
        let mut result = format!("{} ({})\n", node.name, node.url);
        let deps = self.deps(node);
        for (i, dep) in deps.iter().enumerate() {
            self.build_tree_string(dep, &mut result, "", i == deps.len() - 1);
        }
        result
    }

    fn build_tree_string(&self, node: &Node, result: &mut String, prefix: &str, is_last: bool) {
        let connector = if is_last {
            "└── "
        } else {
            "├── "
        };
        result.push_str(&format!("{prefix}{connector}{} ({})\n", node.name, node.url));

        let child_prefix = if is_last {
            format!("{prefix}    ")
        } else {
            format!("{prefix}│   ")
        };
        let deps = self.deps(node);
        for (i, dep) in deps.iter().enumerate() {
            self.build_tree_string(dep, result, &child_prefix, i == deps.len() - 1);
        }
    }
}

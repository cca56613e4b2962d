//! Integration test suite for git-depend
//!
//! Every test builds its own origin repositories in a temporary directory and
//! drives the library or the `git-dep` binary against them. Nothing touches
//! the network.
//!
//! ```bash
//! cargo test --test integration
//! RUST_LOG=notes=debug,merge=debug cargo test --test integration
//! ```
//!
//! - **graph**: spec files, validation failures, traversal
//! - **cache**: mirrors, updates, concurrent batches
//! - **lock**: lock contention between independent caches
//! - **deps**: dependency records round-tripping through the origin
//! - **merge**: multi-repository merges
//! - **cli**: the `git-dep` binary end to end

#[path = "../common/mod.rs"]
mod common;

mod cache;
mod cli;
mod deps;
mod graph;
mod lock;
mod merge;

//! GitScope - read-only history and diff inspection for Git repositories
//!
//! This crate reconstructs three views from a repository's object store:
//! the commit history reachable from a set of branches, the ancestry graph
//! across those branches in a rendering-friendly order, and unified diffs
//! between arbitrary trees. Nothing here ever writes to the repository.
//!
//! # Example
//!
//! ```no_run
//! use gitscope::explorer::Explorer;
//!
//! let explorer = Explorer::open("./my_repo").unwrap();
//! let graph = explorer.graph(&["main", "feature"]).unwrap();
//! for commit in &graph.commits {
//!     println!("{} {:?}", commit.id.short(), commit.primary_branch);
//! }
//! println!("{}", explorer.compare_branches("main", "feature").unwrap());
//! ```

pub mod diff;
pub mod explorer;
pub mod graph;
pub mod storage;

//! Commit history across branches and the commit graph built from it.
//!
//! ```text
//!  branch tips ──▶ collector (dedup + branch sets) ──▶ builder (links, primary branch, order)
//! ```

mod builder;
mod collector;
mod types;

pub use builder::GraphBuilder;
pub use collector::{BranchTip, CollectedCommit, CollectedHistory, HistoryCollector};
pub use types::{AnnotatedCommit, BranchPriority, Graph, GraphBranch, GraphCommit};

//! Diff pipeline: tree comparison followed by text rendering.
//!
//! ```text
//!  ObjectReader ──▶ tree_diff (ChangeRecords) ──▶ render (unified text)
//! ```

mod render;
mod tree_diff;

pub use render::{DiffLimits, DiffRenderer, FileOutcome, FileSection, RenderedDiff};
pub use tree_diff::{diff_trees, diff_trees_at, ChangeKind, ChangeRecord, TreeDiff};

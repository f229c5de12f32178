//! Tree-to-tree comparison.
//!
//! Only changed paths are reported and no file content is read. Subtrees
//! whose ids match on both sides are never opened, so the cost follows
//! the size of the change rather than the size of the repository.
//!
//! Traversal uses an explicit stack of frames instead of recursion. Each
//! frame holds the ordered steps computed for one pair of trees, and
//! descending into a subtree pushes a new frame in place, so the output
//! order is the same as a recursive walk: entries of the old tree in
//! stored order (descending as they come), then entries only present in
//! the new tree.

use std::collections::{HashMap, HashSet};

use serde::Serialize;
use tracing::warn;

use crate::storage::{ObjectReader, StorageResult, TreeEntry, TreeId};

/// how a path changed between two trees
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeKind {
    Added,
    Deleted,
    Modified,
}

impl ChangeKind {
    /// the kind seen when the comparison runs the other way
    pub fn inverse(self) -> Self {
        match self {
            ChangeKind::Added => ChangeKind::Deleted,
            ChangeKind::Deleted => ChangeKind::Added,
            ChangeKind::Modified => ChangeKind::Modified,
        }
    }
}

/// a single changed path, relative to the repository root
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ChangeRecord {
    pub path: String,
    pub kind: ChangeKind,
}

impl ChangeRecord {
    pub fn new(path: impl Into<String>, kind: ChangeKind) -> Self {
        Self {
            path: path.into(),
            kind,
        }
    }
}

/// result of comparing two readable root trees
///
/// `unreadable` lists subtrees that could not be read. Changes below
/// those paths are missing, everything else is complete.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TreeDiff {
    pub changes: Vec<ChangeRecord>,
    pub unreadable: Vec<String>,
}

impl TreeDiff {
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    /// true when some subtree could not be compared
    pub fn is_degraded(&self) -> bool {
        !self.unreadable.is_empty()
    }
}

enum Step {
    Emit(ChangeRecord),
    Descend { path: String, old: TreeId, new: TreeId },
}

/// compare two trees from the repository root
///
/// fails only when one of the two root trees cannot be read.
pub fn diff_trees<R>(reader: &R, old: TreeId, new: TreeId) -> StorageResult<TreeDiff>
where
    R: ObjectReader + ?Sized,
{
    diff_trees_at(reader, old, new, "")
}

/// compare two trees, reporting paths below `prefix`
pub fn diff_trees_at<R>(reader: &R, old: TreeId, new: TreeId, prefix: &str) -> StorageResult<TreeDiff>
where
    R: ObjectReader + ?Sized,
{
    let mut diff = TreeDiff::default();
    if old == new {
        return Ok(diff);
    }

    let old_entries = reader.read_tree(old)?;
    let new_entries = reader.read_tree(new)?;

    let mut stack = vec![compare(&old_entries, &new_entries, prefix).into_iter()];
    while let Some(frame) = stack.last_mut() {
        match frame.next() {
            None => {
                stack.pop();
            }
            Some(Step::Emit(record)) => diff.changes.push(record),
            Some(Step::Descend { path, old, new }) => {
                match (reader.read_tree(old), reader.read_tree(new)) {
                    (Ok(a), Ok(b)) => stack.push(compare(&a, &b, &path).into_iter()),
                    (Err(e), _) | (_, Err(e)) => {
                        warn!(path = %path, missing = e.is_not_found(), error = %e, "skipping unreadable subtree");
                        diff.unreadable.push(path);
                    }
                }
            }
        }
    }

    Ok(diff)
}

fn compare(old: &[TreeEntry], new: &[TreeEntry], prefix: &str) -> Vec<Step> {
    let new_by_name: HashMap<&str, &TreeEntry> = new.iter().map(|e| (e.name.as_str(), e)).collect();
    let old_names: HashSet<&str> = old.iter().map(|e| e.name.as_str()).collect();

    let mut steps = Vec::new();
    for entry in old {
        let path = join(prefix, &entry.name);
        match new_by_name.get(entry.name.as_str()) {
            None => steps.push(Step::Emit(ChangeRecord::new(path, ChangeKind::Deleted))),
            Some(other) if entry.same_object(other) => {}
            Some(other) if entry.is_tree() && other.is_tree() => steps.push(Step::Descend {
                path,
                old: entry.tree_id(),
                new: other.tree_id(),
            }),
            Some(_) => steps.push(Step::Emit(ChangeRecord::new(path, ChangeKind::Modified))),
        }
    }

    for entry in new {
        if !old_names.contains(entry.name.as_str()) {
            let path = join(prefix, &entry.name);
            steps.push(Step::Emit(ChangeRecord::new(path, ChangeKind::Added)));
        }
    }

    steps
}

fn join(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        name.to_string()
    } else {
        format!("{}/{}", prefix, name)
    }
}

//!  Commit reading and history traversal
//!
//! commits are read once and never mutated. History is walked depth-first
//! from a tip, always descending into the first-listed parent before any
//! other, and the walk is bounded by a commit count so no traversal is
//! unbounded.

use std::collections::HashSet;

use chrono::{DateTime, TimeZone, Utc};
use serde::Serialize;

use crate::storage::error::StorageResult;
use crate::storage::reader::ObjectReader;
use crate::storage::types::{CommitId, TreeId};

/// author identity and timestamp of a commit
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Signature {
    pub name: String,
    pub email: String,
    /// seconds since the unix epoch
    pub timestamp: i64,
}

impl Signature {
    /// create a new signature
    pub fn new(name: impl Into<String>, email: impl Into<String>, timestamp: i64) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            timestamp,
        }
    }

    /// the timestamp as a UTC date
    pub fn date(&self) -> DateTime<Utc> {
        Utc.timestamp_opt(self.timestamp, 0)
            .single()
            .unwrap_or(DateTime::UNIX_EPOCH)
    }
}

/// information about a commit
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommitInfo {
    pub id: CommitId,
    pub tree_id: TreeId,
    #[serde(rename = "parents")]
    pub parent_ids: Vec<CommitId>,
    pub message: String,
    pub author: Signature,
}

impl CommitInfo {
    /// create CommitInfo from a git2::Commit
    pub(crate) fn from_git2(commit: &git2::Commit<'_>) -> Self {
        let author = commit.author();

        Self {
            id: CommitId::new(commit.id()),
            tree_id: TreeId::new(commit.tree_id()),
            parent_ids: commit.parent_ids().map(CommitId::new).collect(),
            message: String::from_utf8_lossy(commit.message_bytes()).into_owned(),
            author: Signature::new(
                author.name().unwrap_or("Unknown"),
                author.email().unwrap_or("unknown@unknown"),
                author.when().seconds(),
            ),
        }
    }

    /// check if this is a merge commit (has multiple parents)
    pub fn is_merge(&self) -> bool {
        self.parent_ids.len() > 1
    }

    /// check if this is a root commit
    pub fn is_root(&self) -> bool {
        self.parent_ids.is_empty()
    }

    /// get the first (or only) parent
    pub fn first_parent(&self) -> Option<CommitId> {
        self.parent_ids.first().copied()
    }

    /// get a short summary of the commit (first line of message)
    pub fn summary(&self) -> &str {
        self.message.lines().next().unwrap_or(&self.message)
    }

    /// author timestamp in seconds
    pub fn timestamp(&self) -> i64 {
        self.author.timestamp
    }
}

/// walk ancestry from `tip`, returning at most `depth` commits
///
/// the walk is depth-first with the first parent explored before later
/// parents. Each commit is returned once even when reachable through
/// several merge paths. Any unreadable commit fails the whole walk.
pub fn walk_history<R>(reader: &R, tip: CommitId, depth: usize) -> StorageResult<Vec<CommitInfo>>
where
    R: ObjectReader + ?Sized,
{
    let mut stack = vec![tip];
    let mut seen = HashSet::new();
    let mut commits = Vec::with_capacity(depth.min(256));

    while commits.len() < depth {
        let Some(id) = stack.pop() else { break };
        if !seen.insert(id) {
            continue;
        }

        let info = reader.read_commit(id)?;
        // reversed so the first parent is popped next
        for parent in info.parent_ids.iter().rev() {
            if !seen.contains(parent) {
                stack.push(*parent);
            }
        }
        commits.push(info);
    }

    Ok(commits)
}

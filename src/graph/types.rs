//! Data shapes produced by the graph pipeline.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::storage::{CommitId, CommitInfo, Signature, TreeId};

/// Ordered list of branch names preferred as a commit's primary branch
/// when it is shared by several branches and tips none of them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BranchPriority(Vec<String>);

impl BranchPriority {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(names.into_iter().map(Into::into).collect())
    }

    /// position of `name` in the priority list
    pub fn rank(&self, name: &str) -> Option<usize> {
        self.0.iter().position(|n| n == name)
    }

    /// pick the best candidate: highest priority first, then the
    /// lexicographically smallest name
    pub fn pick<'a, I>(&self, candidates: I) -> Option<&'a str>
    where
        I: IntoIterator<Item = &'a str>,
    {
        candidates
            .into_iter()
            .min_by(|a, b| match (self.rank(a), self.rank(b)) {
                (Some(x), Some(y)) => x.cmp(&y),
                (Some(_), None) => std::cmp::Ordering::Less,
                (None, Some(_)) => std::cmp::Ordering::Greater,
                (None, None) => a.cmp(b),
            })
    }

    pub fn names(&self) -> &[String] {
        &self.0
    }
}

impl Default for BranchPriority {
    fn default() -> Self {
        Self::new(["main", "master", "dev", "develop"])
    }
}

/// a commit with the set of fetched branches that contain it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnnotatedCommit {
    #[serde(flatten)]
    pub commit: CommitInfo,
    /// sorted branch names
    pub branches: Vec<String>,
    /// always one of `branches` when `branches` is non-empty
    pub primary_branch: Option<String>,
}

/// a node of the rendered commit graph
///
/// `parents` and `children` only reference commits present in the same
/// graph; links leaving the fetched window are dropped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphCommit {
    pub id: CommitId,
    pub tree_id: TreeId,
    pub parents: Vec<CommitId>,
    pub children: Vec<CommitId>,
    pub message: String,
    pub author: Signature,
    pub date: DateTime<Utc>,
    pub branches: Vec<String>,
    pub primary_branch: Option<String>,
}

impl GraphCommit {
    pub fn is_merge(&self) -> bool {
        self.parents.len() > 1
    }
}

/// a branch that contributed commits, with its layout lane
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GraphBranch {
    pub name: String,
    /// stable column index, in request order
    pub lane: usize,
    pub tip: CommitId,
}

/// commits in rendering order plus the branch tips they were fetched from
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Graph {
    pub commits: Vec<GraphCommit>,
    pub branch_tips: BTreeMap<String, CommitId>,
    pub branches: Vec<GraphBranch>,
}

impl Graph {
    /// position of a commit in rendering order
    pub fn position(&self, id: CommitId) -> Option<usize> {
        self.commits.iter().position(|c| c.id == id)
    }

    pub fn get(&self, id: CommitId) -> Option<&GraphCommit> {
        self.commits.iter().find(|c| c.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_priority_pick() {
        let priority = BranchPriority::default();
        assert_eq!(priority.pick(["feature", "main"]), Some("main"));
        assert_eq!(priority.pick(["develop", "master"]), Some("master"));
        assert_eq!(priority.pick(["zeta", "alpha"]), Some("alpha"));
        assert_eq!(priority.pick(["zeta", "dev"]), Some("dev"));
        assert_eq!(priority.pick(std::iter::empty::<&str>()), None);
    }

    #[test]
    fn test_custom_priority() {
        let priority = BranchPriority::new(["trunk"]);
        assert_eq!(priority.rank("trunk"), Some(0));
        assert_eq!(priority.rank("main"), None);
        assert_eq!(priority.pick(["main", "trunk"]), Some("trunk"));
        assert_eq!(priority.names(), &["trunk".to_string()]);
    }
}

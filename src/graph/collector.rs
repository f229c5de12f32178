//! Multi-branch history collection.
//!
//! Each branch is walked independently from its tip. The per-branch
//! results are then folded into a single [`CollectedHistory`] in one
//! reduction step, which is where deduplication happens: a commit reached
//! from several branches is stored once and accumulates every branch name.
//! A branch whose walk fails is logged and left out entirely, unless every
//! requested branch fails, in which case the first failure is returned.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use tracing::{debug, warn};

use crate::storage::{walk_history, CommitId, CommitInfo, ObjectReader, StorageResult};

/// a branch name and the commit it pointed at when the query started
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BranchTip {
    pub name: String,
    pub tip: CommitId,
}

impl BranchTip {
    pub fn new(name: impl Into<String>, tip: CommitId) -> Self {
        Self { name: name.into(), tip }
    }
}

/// a commit and every collected branch that reaches it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectedCommit {
    pub commit: CommitInfo,
    pub branches: BTreeSet<String>,
}

/// deduplicated commits from one or more branch walks
#[derive(Debug, Clone, Default)]
pub struct CollectedHistory {
    commits: Vec<CollectedCommit>,
    index: HashMap<CommitId, usize>,
    tips: BTreeMap<String, CommitId>,
    branch_order: Vec<String>,
}

impl CollectedHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// fold one branch's walk into the collection
    pub fn record_branch(&mut self, branch: &BranchTip, commits: Vec<CommitInfo>) {
        if self.tips.insert(branch.name.clone(), branch.tip).is_none() {
            self.branch_order.push(branch.name.clone());
        }

        for commit in commits {
            match self.index.get(&commit.id) {
                Some(&i) => {
                    self.commits[i].branches.insert(branch.name.clone());
                }
                None => {
                    self.index.insert(commit.id, self.commits.len());
                    self.commits.push(CollectedCommit {
                        commit,
                        branches: BTreeSet::from([branch.name.clone()]),
                    });
                }
            }
        }
    }

    pub fn len(&self) -> usize {
        self.commits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commits.is_empty()
    }

    pub fn get(&self, id: CommitId) -> Option<&CollectedCommit> {
        self.index.get(&id).map(|&i| &self.commits[i])
    }

    /// position of a commit in collection order
    pub fn index_of(&self, id: CommitId) -> Option<usize> {
        self.index.get(&id).copied()
    }

    /// commits in the order they were first collected
    pub fn commits(&self) -> &[CollectedCommit] {
        &self.commits
    }

    /// tip of every branch that was walked successfully
    pub fn tips(&self) -> &BTreeMap<String, CommitId> {
        &self.tips
    }

    /// successfully walked branches, in request order
    pub fn branch_order(&self) -> &[String] {
        &self.branch_order
    }
}

/// walks a set of branches with a per-branch depth bound
pub struct HistoryCollector<'a, R: ?Sized> {
    reader: &'a R,
    depth: usize,
}

impl<'a, R> HistoryCollector<'a, R>
where
    R: ObjectReader + ?Sized,
{
    pub fn new(reader: &'a R, depth: usize) -> Self {
        Self { reader, depth }
    }

    /// walk every branch and merge the results
    ///
    /// fails only when branches were given and none of them could be walked.
    pub fn collect(&self, branches: &[BranchTip]) -> StorageResult<CollectedHistory> {
        let mut walks: Vec<(&BranchTip, Vec<CommitInfo>)> = Vec::with_capacity(branches.len());
        let mut first_error = None;
        for branch in branches {
            match walk_history(self.reader, branch.tip, self.depth) {
                Ok(commits) => {
                    debug!(branch = %branch.name, count = commits.len(), "walked branch");
                    walks.push((branch, commits));
                }
                Err(e) => {
                    warn!(branch = %branch.name, error = %e, "skipping branch with unreadable history");
                    first_error.get_or_insert(e);
                }
            }
        }

        if walks.is_empty() {
            if let Some(e) = first_error {
                return Err(e);
            }
        }

        let mut history = CollectedHistory::new();
        for (branch, commits) in walks {
            history.record_branch(branch, commits);
        }
        Ok(history)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::fixture::RepoFixture;
    use crate::storage::StorageError;

    fn branch_set(names: &[&str]) -> BTreeSet<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    #[test]
    fn test_shared_commits_are_stored_once() {
        let fx = RepoFixture::new();
        let tree = fx.tree(&[("a.txt", "a\n")]);
        let a = fx.commit(tree, &[], "A", 1);
        let b = fx.commit(tree, &[a], "B", 2);
        let c = fx.commit(tree, &[b], "C", 3);
        let d = fx.commit(tree, &[b], "D", 4);

        let tips = [BranchTip::new("main", c), BranchTip::new("feature", d)];
        let history = HistoryCollector::new(&fx.repo, 50).collect(&tips).unwrap();

        assert_eq!(history.len(), 4);
        assert_eq!(history.get(a).unwrap().branches, branch_set(&["feature", "main"]));
        assert_eq!(history.get(b).unwrap().branches, branch_set(&["feature", "main"]));
        assert_eq!(history.get(c).unwrap().branches, branch_set(&["main"]));
        assert_eq!(history.get(d).unwrap().branches, branch_set(&["feature"]));
        assert_eq!(history.tips().get("main"), Some(&c));
        assert_eq!(history.branch_order(), &["main".to_string(), "feature".to_string()]);
    }

    #[test]
    fn test_depth_is_per_branch() {
        let fx = RepoFixture::new();
        let tree = fx.tree(&[("a.txt", "a\n")]);
        let mut main = fx.commit(tree, &[], "root", 0);
        let root = main;
        for i in 1..5 {
            main = fx.commit(tree, &[main], "main", i);
        }
        let side = fx.commit(tree, &[root], "side", 10);

        let tips = [BranchTip::new("main", main), BranchTip::new("side", side)];
        let history = HistoryCollector::new(&fx.repo, 2).collect(&tips).unwrap();

        // two from main, two from side (side tip and the shared root)
        assert_eq!(history.len(), 4);
        assert_eq!(history.get(root).unwrap().branches, branch_set(&["side"]));
    }

    #[test]
    fn test_failed_branch_is_skipped() {
        let fx = RepoFixture::new();
        let tree = fx.tree(&[("a.txt", "a\n")]);
        let good = fx.commit(tree, &[], "good", 1);
        let lost = fx.commit(tree, &[], "lost", 2);
        let broken = fx.commit(tree, &[lost], "broken", 3);
        fx.remove_object(lost.raw());
        let repo = fx.reopen();

        let tips = [BranchTip::new("broken", broken), BranchTip::new("main", good)];
        let history = HistoryCollector::new(&repo, 50).collect(&tips).unwrap();

        assert_eq!(history.len(), 1);
        assert!(history.get(good).is_some());
        // the partial walk of the failed branch is discarded too
        assert!(history.get(broken).is_none());
        assert!(!history.tips().contains_key("broken"));
    }

    #[test]
    fn test_record_branch_accumulates() {
        let fx = RepoFixture::new();
        let tree = fx.tree(&[("a.txt", "a\n")]);
        let a = fx.commit(tree, &[], "A", 1);
        let info = fx.repo.read_commit(a).unwrap();

        let mut history = CollectedHistory::new();
        history.record_branch(&BranchTip::new("x", a), vec![info.clone()]);
        history.record_branch(&BranchTip::new("y", a), vec![info.clone()]);
        history.record_branch(&BranchTip::new("x", a), vec![info]);

        assert_eq!(history.len(), 1);
        assert_eq!(history.index_of(a), Some(0));
        assert_eq!(history.commits()[0].branches, branch_set(&["x", "y"]));
        assert_eq!(history.branch_order().len(), 2);
    }

    #[test]
    fn test_every_branch_failing_is_an_error() {
        let fx = RepoFixture::new();
        let tree = fx.tree(&[("a.txt", "a\n")]);
        let lost = fx.commit(tree, &[], "lost", 1);
        let tip = fx.commit(tree, &[lost], "tip", 2);
        fx.remove_object(lost.raw());
        let repo = fx.reopen();

        let tips = [BranchTip::new("main", tip), BranchTip::new("copy", tip)];
        let result = HistoryCollector::new(&repo, 50).collect(&tips);
        assert!(matches!(result, Err(StorageError::CommitNotFound(_))));

        let empty = HistoryCollector::new(&repo, 50).collect(&[]).unwrap();
        assert!(empty.is_empty());
    }
}

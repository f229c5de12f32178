//! Commit graph construction.
//!
//! Given a [`CollectedHistory`], this links every commit to its parents
//! and children inside the fetched window, assigns each commit a primary
//! branch for layout, and orders the commits so that every commit comes
//! before all of its ancestors.
//!
//! # Primary branch
//!
//! 1. a commit that is the tip of a branch belongs to that branch
//!    (several tips: priority list, then name order);
//! 2. a commit reached from a single branch belongs to it;
//! 3. otherwise the highest entry of the [`BranchPriority`] list wins,
//!    falling back to the lexicographically smallest branch name.
//!
//! # Rendering order
//!
//! Reverse Kahn: commits without children in the window are ready, the
//! newest ready commit is emitted next, and a parent becomes ready once
//! all of its children have been emitted. Ties on timestamp go to the
//! smaller commit id. Commits never reached (only possible with cyclic
//! or inconsistent parent data) are appended in collection order.

use std::cmp::Ordering;
use std::collections::{BTreeSet, BinaryHeap, HashMap};

use tracing::debug;

use crate::graph::collector::{CollectedCommit, CollectedHistory};
use crate::graph::types::{AnnotatedCommit, BranchPriority, Graph, GraphBranch, GraphCommit};
use crate::storage::CommitId;

/// builds [`Graph`]s using a configurable branch priority
#[derive(Debug, Clone, Default)]
pub struct GraphBuilder {
    priority: BranchPriority,
}

impl GraphBuilder {
    pub fn new(priority: BranchPriority) -> Self {
        Self { priority }
    }

    pub fn priority(&self) -> &BranchPriority {
        &self.priority
    }

    /// annotate every collected commit with its branches and primary branch,
    /// keeping collection order
    pub fn annotate(&self, history: &CollectedHistory) -> Vec<AnnotatedCommit> {
        let tips = tips_by_commit(history);
        history
            .commits()
            .iter()
            .map(|c| AnnotatedCommit {
                commit: c.commit.clone(),
                branches: c.branches.iter().cloned().collect(),
                primary_branch: self.primary_branch(c, &tips),
            })
            .collect()
    }

    /// link, annotate and order the collected commits
    pub fn build(&self, history: &CollectedHistory) -> Graph {
        let commits = history.commits();
        let tips = tips_by_commit(history);

        let parents: Vec<Vec<usize>> = commits
            .iter()
            .map(|c| {
                let mut seen = BTreeSet::new();
                c.commit
                    .parent_ids
                    .iter()
                    .filter_map(|p| history.index_of(*p))
                    .filter(|i| seen.insert(*i))
                    .collect()
            })
            .collect();

        let mut children: Vec<Vec<CommitId>> = vec![Vec::new(); commits.len()];
        for (i, ps) in parents.iter().enumerate() {
            for &p in ps {
                children[p].push(commits[i].commit.id);
            }
        }

        let order = render_order(commits, &parents);
        debug!(commits = commits.len(), "built commit graph");

        let graph_commits = order
            .into_iter()
            .map(|i| {
                let c = &commits[i];
                GraphCommit {
                    id: c.commit.id,
                    tree_id: c.commit.tree_id,
                    parents: parents[i].iter().map(|&p| commits[p].commit.id).collect(),
                    children: children[i].clone(),
                    message: c.commit.message.clone(),
                    author: c.commit.author.clone(),
                    date: c.commit.author.date(),
                    branches: c.branches.iter().cloned().collect(),
                    primary_branch: self.primary_branch(c, &tips),
                }
            })
            .collect();

        let branches = history
            .branch_order()
            .iter()
            .filter_map(|name| history.tips().get(name).map(|tip| (name, *tip)))
            .enumerate()
            .map(|(lane, (name, tip))| GraphBranch {
                name: name.clone(),
                lane,
                tip,
            })
            .collect();

        Graph {
            commits: graph_commits,
            branch_tips: history.tips().clone(),
            branches,
        }
    }

    fn primary_branch(&self, commit: &CollectedCommit, tips: &HashMap<CommitId, Vec<&str>>) -> Option<String> {
        let tipped = tips
            .get(&commit.commit.id)
            .into_iter()
            .flatten()
            .copied()
            .filter(|name| commit.branches.contains(*name));
        if let Some(name) = self.priority.pick(tipped) {
            return Some(name.to_string());
        }

        if commit.branches.len() == 1 {
            return commit.branches.iter().next().cloned();
        }

        self.priority
            .pick(commit.branches.iter().map(String::as_str))
            .map(str::to_string)
    }
}

/// branch names keyed by the commit they point at
fn tips_by_commit(history: &CollectedHistory) -> HashMap<CommitId, Vec<&str>> {
    let mut tips: HashMap<CommitId, Vec<&str>> = HashMap::new();
    for (name, id) in history.tips() {
        tips.entry(*id).or_default().push(name.as_str());
    }
    tips
}

#[derive(Debug, PartialEq, Eq)]
struct Ready {
    timestamp: i64,
    id: CommitId,
    index: usize,
}

impl Ord for Ready {
    fn cmp(&self, other: &Self) -> Ordering {
        // max-heap: newest first, then smallest id
        self.timestamp
            .cmp(&other.timestamp)
            .then_with(|| other.id.cmp(&self.id))
    }
}

impl PartialOrd for Ready {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

fn render_order(commits: &[CollectedCommit], parents: &[Vec<usize>]) -> Vec<usize> {
    let ready = |index: usize| Ready {
        timestamp: commits[index].commit.timestamp(),
        id: commits[index].commit.id,
        index,
    };

    let mut remaining = vec![0usize; commits.len()];
    for ps in parents {
        for &p in ps {
            remaining[p] += 1;
        }
    }

    let mut queue: BinaryHeap<Ready> = (0..commits.len())
        .filter(|&i| remaining[i] == 0)
        .map(ready)
        .collect();

    let mut placed = vec![false; commits.len()];
    let mut order = Vec::with_capacity(commits.len());
    while let Some(next) = queue.pop() {
        placed[next.index] = true;
        order.push(next.index);
        for &p in &parents[next.index] {
            remaining[p] -= 1;
            if remaining[p] == 0 {
                queue.push(ready(p));
            }
        }
    }

    if order.len() < commits.len() {
        debug!(unplaced = commits.len() - order.len(), "appending commits caught in a cycle");
        order.extend((0..commits.len()).filter(|&i| !placed[i]));
    }
    order
}

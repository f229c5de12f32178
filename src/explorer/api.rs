//! Explorer API - the read-only query surface over one repository.

use std::path::Path;

use git2::Repository;
use tracing::{debug, info, warn};

use crate::diff::{diff_trees, DiffLimits, DiffRenderer, RenderedDiff};
use crate::explorer::error::ExplorerResult;
use crate::graph::{AnnotatedCommit, BranchPriority, BranchTip, CollectedHistory, Graph, GraphBuilder, HistoryCollector};
use crate::storage::{
    walk_history, BranchName, CommitId, CommitInfo, GitRepository, ObjectReader, RefManager, StorageError,
    StorageResult,
};

/// Explorer configuration options.
#[derive(Debug, Clone)]
pub struct ExplorerConfig {
    /// Maximum commits walked from each branch tip.
    pub per_branch_depth: usize,
    /// Bounds applied to rendered diffs.
    pub limits: DiffLimits,
    /// Branch names preferred as a shared commit's primary branch.
    pub priority: BranchPriority,
}

impl Default for ExplorerConfig {
    fn default() -> Self {
        Self {
            per_branch_depth: 50,
            limits: DiffLimits::default(),
            priority: BranchPriority::default(),
        }
    }
}

impl ExplorerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the per-branch history depth.
    pub fn per_branch_depth(mut self, depth: usize) -> Self {
        self.per_branch_depth = depth;
        self
    }

    /// Replace all diff limits.
    pub fn limits(mut self, limits: DiffLimits) -> Self {
        self.limits = limits;
        self
    }

    /// Set the number of files rendered per diff.
    pub fn max_files(mut self, value: usize) -> Self {
        self.limits.max_files = value;
        self
    }

    /// Set the size above which a modified file is not diffed.
    pub fn max_file_bytes(mut self, value: usize) -> Self {
        self.limits.max_file_bytes = value;
        self
    }

    /// Set the branch priority list.
    pub fn priority(mut self, priority: BranchPriority) -> Self {
        self.priority = priority;
        self
    }
}

/// The main explorer handle.
///
/// Every query reads branch tips fresh, so two calls may observe different
/// repository states if refs move in between.
#[derive(Clone)]
pub struct Explorer {
    repo: GitRepository,
    config: ExplorerConfig,
}

impl Explorer {
    /// Open a repository with default configuration.
    pub fn open(path: impl AsRef<Path>) -> ExplorerResult<Self> {
        Self::open_with_config(path, ExplorerConfig::default())
    }

    /// Open a repository with custom configuration.
    pub fn open_with_config(path: impl AsRef<Path>, config: ExplorerConfig) -> ExplorerResult<Self> {
        let repo = GitRepository::open(path)?;
        Ok(Self { repo, config })
    }

    pub fn config(&self) -> &ExplorerConfig {
        &self.config
    }

    pub fn path(&self) -> &Path {
        self.repo.path()
    }

    /// Names of all local branches, sorted.
    pub fn list_branches(&self) -> ExplorerResult<Vec<String>> {
        info!(path = %self.path().display(), "listing branches");
        let branches = self.repo.list_branches()?;
        Ok(branches.into_iter().map(BranchName::into_string).collect())
    }

    /// History of one branch, at most `per_branch_depth` commits.
    pub fn list_commits(&self, branch: &str) -> ExplorerResult<Vec<CommitInfo>> {
        self.list_commits_with_depth(branch, self.config.per_branch_depth)
    }

    pub fn list_commits_with_depth(&self, branch: &str, depth: usize) -> ExplorerResult<Vec<CommitInfo>> {
        info!(branch, depth, "listing commits");
        let name = BranchName::new(branch).map_err(StorageError::from)?;
        let commits = self.repo.with_repo(|repo| {
            let tip = RefManager::resolve_branch(repo, &name)?;
            walk_history(repo, tip, depth)
        })?;
        Ok(commits)
    }

    /// Deduplicated commits of several branches, newest first.
    ///
    /// An empty `branches` list means every local branch.
    pub fn list_all_commits(&self, branches: &[&str]) -> ExplorerResult<Vec<AnnotatedCommit>> {
        info!(branches = branches.len(), "listing commits across branches");
        let history = self.collect(branches, self.config.per_branch_depth)?;

        let mut commits = GraphBuilder::new(self.config.priority.clone()).annotate(&history);
        commits.sort_by(|a, b| b.commit.timestamp().cmp(&a.commit.timestamp()));
        Ok(commits)
    }

    /// Unified diff between the trees of two revisions.
    pub fn tree_diff(&self, old: &str, new: &str) -> ExplorerResult<String> {
        Ok(self.tree_diff_report(old, new)?.into_text())
    }

    /// Like [`tree_diff`](Self::tree_diff) but keeps the per-file outcomes.
    pub fn tree_diff_report(&self, old: &str, new: &str) -> ExplorerResult<RenderedDiff> {
        info!(old, new, "diffing revisions");
        let old = self.repo.resolve_revision(old)?;
        let new = self.repo.resolve_revision(new)?;
        self.diff_commits(old, new)
    }

    /// Unified diff between the tips of two branches.
    pub fn compare_branches(&self, old: &str, new: &str) -> ExplorerResult<String> {
        info!(old, new, "comparing branches");
        let old = self.resolve_branch(old)?;
        let new = self.resolve_branch(new)?;
        Ok(self.diff_commits(old, new)?.into_text())
    }

    /// Unified diff of a commit against its first parent.
    ///
    /// Root commits have nothing to compare against and get a fixed
    /// message instead.
    pub fn commit_diff(&self, revision: &str) -> ExplorerResult<String> {
        info!(revision, "diffing commit");
        let id = self.repo.resolve_revision(revision)?;
        let commit = self.repo.get_commit(id)?;

        match commit.first_parent() {
            Some(parent) => Ok(self.diff_commits(parent, id)?.into_text()),
            None => Ok(format!(
                "diff --git (Initial Commit)\nCommit: {}\nInitial commit - showing all files\nThis is the first commit in the repository.\n",
                id.short()
            )),
        }
    }

    /// Commit graph across branches using `per_branch_depth`.
    ///
    /// An empty `branches` list means every local branch.
    pub fn graph(&self, branches: &[&str]) -> ExplorerResult<Graph> {
        self.graph_with_depth(branches, self.config.per_branch_depth)
    }

    pub fn graph_with_depth(&self, branches: &[&str], depth: usize) -> ExplorerResult<Graph> {
        info!(branches = branches.len(), depth, "building commit graph");
        let history = self.collect(branches, depth)?;
        Ok(GraphBuilder::new(self.config.priority.clone()).build(&history))
    }

    fn resolve_branch(&self, branch: &str) -> ExplorerResult<CommitId> {
        let name = BranchName::new(branch).map_err(StorageError::from)?;
        Ok(self.repo.resolve_branch(&name)?)
    }

    fn diff_commits(&self, old: CommitId, new: CommitId) -> ExplorerResult<RenderedDiff> {
        let limits = self.config.limits;
        let rendered = self.repo.with_repo(|repo| {
            let old_tree = repo.read_commit(old)?.tree_id;
            let new_tree = repo.read_commit(new)?.tree_id;

            let tree_diff = diff_trees(repo, old_tree, new_tree)?;
            if tree_diff.is_empty() && !tree_diff.is_degraded() {
                return Ok(RenderedDiff {
                    text: format!("diff --git a/{} b/{}\n\nNo changes found.", old, new),
                    ..RenderedDiff::default()
                });
            }

            debug!(files = tree_diff.changes.len(), degraded = tree_diff.is_degraded(), "rendering changes");
            let mut rendered = DiffRenderer::new(repo, limits).render_tree_diff(old_tree, new_tree, &tree_diff);
            if tree_diff.is_empty() {
                rendered.text.insert_str(0, &format!("diff --git a/{} b/{}\n\nNo readable changes found.\n", old, new));
            }
            Ok(rendered)
        })?;
        Ok(rendered)
    }

    fn collect(&self, branches: &[&str], depth: usize) -> ExplorerResult<CollectedHistory> {
        let history = self.repo.with_repo(|repo| {
            let tips = resolve_tips(repo, branches)?;
            HistoryCollector::new(repo, depth).collect(&tips)
        })?;
        Ok(history)
    }
}

/// resolve requested branch names, skipping the ones that do not resolve
///
/// fails only when names were requested and none of them resolved.
fn resolve_tips(repo: &Repository, branches: &[&str]) -> StorageResult<Vec<BranchTip>> {
    let names: Vec<String> = if branches.is_empty() {
        RefManager::list_branches(repo)?
            .into_iter()
            .map(BranchName::into_string)
            .collect()
    } else {
        branches.iter().map(|b| b.to_string()).collect()
    };

    let mut tips = Vec::with_capacity(names.len());
    let mut first_error = None;
    for name in names {
        let resolved = BranchName::new(name.as_str())
            .map_err(StorageError::from)
            .and_then(|branch| RefManager::resolve_branch(repo, &branch));
        match resolved {
            Ok(tip) => tips.push(BranchTip::new(name, tip)),
            Err(e) => {
                warn!(branch = %name, error = %e, "skipping unresolvable branch");
                first_error.get_or_insert(e);
            }
        }
    }

    match first_error {
        Some(e) if tips.is_empty() => Err(e),
        _ => Ok(tips),
    }
}

impl std::fmt::Debug for Explorer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Explorer")
            .field("path", &self.path())
            .field("config", &self.config)
            .finish()
    }
}

//!  Branch and revision resolution.
//!
//!  Git refs are pointers to commits. Resolution peels through tags and
//!  symbolic refs until a commit is reached. Branch tips are read fresh
//!  on every call, so a query sees whatever the ref database holds at
//!  that moment.

use git2::{BranchType, Repository};

use crate::storage::error::{StorageError, StorageResult};
use crate::storage::types::{BranchName, CommitId};

/// Resolves references (branches and revisions) to commits.
pub struct RefManager;

impl RefManager {
    /// Resolve a branch name to its current commit ID.
    pub fn resolve_branch(repo: &Repository, branch: &BranchName) -> StorageResult<CommitId> {
        let reference = repo
            .find_reference(&branch.as_ref_path())
            .map_err(|_| StorageError::RefNotFound(branch.to_string()))?;

        let commit = reference
            .peel_to_commit()
            .map_err(|_| StorageError::RefNotFound(branch.to_string()))?;

        Ok(CommitId::new(commit.id()))
    }

    /// Resolve any revision expression (full or abbreviated id, branch,
    /// tag, `HEAD~2`, ...) to a commit.
    pub fn resolve_revision(repo: &Repository, spec: &str) -> StorageResult<CommitId> {
        let object = repo
            .revparse_single(spec)
            .map_err(|_| StorageError::RefNotFound(spec.to_string()))?;

        let commit = object
            .peel_to_commit()
            .map_err(|_| StorageError::RefNotFound(spec.to_string()))?;

        Ok(CommitId::new(commit.id()))
    }

    /// List all local branches, sorted by name.
    pub fn list_branches(repo: &Repository) -> StorageResult<Vec<BranchName>> {
        let branches = repo.branches(Some(BranchType::Local))?;

        let mut result = Vec::new();
        for branch_result in branches {
            let (branch, _) = branch_result?;
            if let Some(name) = branch.name()? {
                if let Ok(branch_name) = BranchName::new(name) {
                    result.push(branch_name);
                }
            }
        }

        result.sort();
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::fixture::RepoFixture;

    fn setup() -> (RepoFixture, CommitId, CommitId) {
        let fx = RepoFixture::new();
        let tree = fx.tree(&[("a.txt", "a\n")]);
        let c1 = fx.commit(tree, &[], "Initial commit", 1);
        let c2 = fx.commit(tree, &[c1], "Second commit", 2);
        fx.branch("main", c2);
        fx.branch("feature/x", c1);
        (fx, c1, c2)
    }

    #[test]
    fn test_resolve_branch() {
        let (fx, c1, c2) = setup();

        let main = BranchName::new("main").unwrap();
        assert_eq!(RefManager::resolve_branch(&fx.repo, &main).unwrap(), c2);

        let feature = BranchName::new("feature/x").unwrap();
        assert_eq!(RefManager::resolve_branch(&fx.repo, &feature).unwrap(), c1);
    }

    #[test]
    fn test_missing_branch() {
        let (fx, _, _) = setup();
        let missing = BranchName::new("nope").unwrap();

        let result = RefManager::resolve_branch(&fx.repo, &missing);
        assert!(matches!(result, Err(StorageError::RefNotFound(name)) if name == "nope"));
    }

    #[test]
    fn test_resolve_revision() {
        let (fx, c1, c2) = setup();

        assert_eq!(RefManager::resolve_revision(&fx.repo, "main").unwrap(), c2);
        assert_eq!(RefManager::resolve_revision(&fx.repo, "main~1").unwrap(), c1);
        assert_eq!(RefManager::resolve_revision(&fx.repo, &c1.to_string()).unwrap(), c1);
        assert_eq!(RefManager::resolve_revision(&fx.repo, &c2.short()).unwrap(), c2);
        assert!(RefManager::resolve_revision(&fx.repo, "does-not-exist").is_err());
    }

    #[test]
    fn test_list_branches_sorted() {
        let (fx, _, _) = setup();
        let names: Vec<_> = RefManager::list_branches(&fx.repo)
            .unwrap()
            .into_iter()
            .map(BranchName::into_string)
            .collect();
        assert_eq!(names, vec!["feature/x".to_string(), "main".to_string()]);
    }
}

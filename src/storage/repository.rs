//!   Core Git repository wrapper.
//!
//!  This wraps `git2::Repository` with shared, thread-safe access. The
//!  object store is only ever read; the lock exists because a libgit2
//!  handle must not be used from two threads at once.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use git2::Repository;
use parking_lot::Mutex;

use crate::storage::commit::CommitInfo;
use crate::storage::error::{StorageError, StorageResult};
use crate::storage::reader::ObjectReader;
use crate::storage::refs::RefManager;
use crate::storage::types::{BranchName, CommitId};

/// The main Git repository wrapper.
///
/// Clone this to share across threads - it uses Arc internally.
#[derive(Clone)]
pub struct GitRepository {
    inner: Arc<GitRepositoryInner>,
}

struct GitRepositoryInner {
    repo: Mutex<Repository>,
    path: PathBuf,
}

impl GitRepository {
    /// Open an existing repository.
    ///
    /// The path must itself be a working tree or a bare repository; parent
    /// directories are not searched.
    pub fn open(path: impl AsRef<Path>) -> StorageResult<Self> {
        let path = path.as_ref();
        let repo = Repository::open(path).map_err(|_| StorageError::NotARepository(path.to_path_buf()))?;

        Ok(Self {
            inner: Arc::new(GitRepositoryInner {
                repo: Mutex::new(repo),
                path: path.to_path_buf(),
            }),
        })
    }

    /// Get the repository path.
    pub fn path(&self) -> &Path {
        &self.inner.path
    }

    /// Execute a function with access to the repository.
    pub fn with_repo<F, T>(&self, f: F) -> StorageResult<T>
    where
        F: FnOnce(&Repository) -> StorageResult<T>,
    {
        let repo = self.inner.repo.lock();
        f(&repo)
    }

    /// Get the commit ID for a branch.
    pub fn resolve_branch(&self, branch: &BranchName) -> StorageResult<CommitId> {
        self.with_repo(|repo| RefManager::resolve_branch(repo, branch))
    }

    /// Resolve a revision expression to a commit.
    pub fn resolve_revision(&self, spec: &str) -> StorageResult<CommitId> {
        self.with_repo(|repo| RefManager::resolve_revision(repo, spec))
    }

    /// Get information about a commit.
    pub fn get_commit(&self, id: CommitId) -> StorageResult<CommitInfo> {
        self.with_repo(|repo| repo.read_commit(id))
    }

    /// List all local branches.
    pub fn list_branches(&self) -> StorageResult<Vec<BranchName>> {
        self.with_repo(RefManager::list_branches)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::fixture::RepoFixture;
    use tempfile::TempDir;

    #[test]
    fn test_open_existing() {
        let fx = RepoFixture::new();
        let tree = fx.tree(&[("a.txt", "a\n")]);
        let c1 = fx.commit(tree, &[], "Initial commit", 1);
        fx.branch("main", c1);

        let repo = GitRepository::open(fx.path()).unwrap();
        assert_eq!(repo.path(), fx.path());

        let main = BranchName::new("main").unwrap();
        assert_eq!(repo.resolve_branch(&main).unwrap(), c1);
        assert_eq!(repo.get_commit(c1).unwrap().summary(), "Initial commit");
        assert_eq!(repo.list_branches().unwrap(), vec![main]);
    }

    #[test]
    fn test_open_not_a_repository() {
        let dir = TempDir::new().unwrap();
        let result = GitRepository::open(dir.path());
        assert!(matches!(result, Err(StorageError::NotARepository(_))));

        let result = GitRepository::open(dir.path().join("missing"));
        assert!(matches!(result, Err(StorageError::NotARepository(_))));
    }

    #[test]
    fn test_clone_shares_handle() {
        let fx = RepoFixture::new();
        let tree = fx.tree(&[("a.txt", "a\n")]);
        let c1 = fx.commit(tree, &[], "Initial commit", 1);

        let repo = GitRepository::open(fx.path()).unwrap();
        let other = repo.clone();
        let handle = std::thread::spawn(move || other.get_commit(c1).map(|c| c.id));
        assert_eq!(handle.join().unwrap().unwrap(), c1);
    }
}

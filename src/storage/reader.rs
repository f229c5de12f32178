//! The object reader seam.
//!
//! Tree diffing, diff rendering and history walks only need four reads
//! from the object store. They are written against this trait so the
//! pipelines never depend on how objects are fetched.

use git2::Repository;

use crate::storage::blob;
use crate::storage::commit::CommitInfo;
use crate::storage::error::{StorageError, StorageResult};
use crate::storage::tree::{EntryKind, TreeEntry};
use crate::storage::types::{BlobId, CommitId, TreeId};

/// Read-only access to commits, trees and blobs.
pub trait ObjectReader {
    /// Read a commit.
    fn read_commit(&self, id: CommitId) -> StorageResult<CommitInfo>;

    /// Read the entries of a tree in stored order.
    fn read_tree(&self, id: TreeId) -> StorageResult<Vec<TreeEntry>>;

    /// Size of a blob in bytes, without loading its content.
    fn blob_size(&self, id: BlobId) -> StorageResult<usize>;

    /// Read the full content of a blob.
    fn read_blob(&self, id: BlobId) -> StorageResult<Vec<u8>>;

    /// Look up the entry at a slash-separated `path` below `root`.
    fn resolve_path(&self, root: TreeId, path: &str) -> StorageResult<TreeEntry> {
        let mut current = root;
        let mut parts = path.split('/').peekable();

        while let Some(part) = parts.next() {
            let entry = self
                .read_tree(current)?
                .into_iter()
                .find(|e| e.name == part)
                .ok_or_else(|| StorageError::PathNotFound(path.to_string()))?;

            if parts.peek().is_none() {
                return Ok(entry);
            }
            if entry.kind != EntryKind::Tree {
                return Err(StorageError::UnexpectedEntryType {
                    path: path.to_string(),
                    expected: "tree (directory)",
                    found: format!("{:?}", entry.kind),
                });
            }
            current = entry.tree_id();
        }

        Err(StorageError::PathNotFound(path.to_string()))
    }
}

impl ObjectReader for Repository {
    fn read_commit(&self, id: CommitId) -> StorageResult<CommitInfo> {
        let commit = self
            .find_commit(id.raw())
            .map_err(|_| StorageError::CommitNotFound(id.to_string()))?;
        Ok(CommitInfo::from_git2(&commit))
    }

    fn read_tree(&self, id: TreeId) -> StorageResult<Vec<TreeEntry>> {
        let tree = self
            .find_tree(id.raw())
            .map_err(|_| StorageError::ObjectNotFound {
                kind: "tree",
                id: id.to_string(),
            })?;
        Ok(tree.iter().map(|entry| TreeEntry::from_git2(&entry)).collect())
    }

    fn blob_size(&self, id: BlobId) -> StorageResult<usize> {
        blob::blob_size(self, id)
    }

    fn read_blob(&self, id: BlobId) -> StorageResult<Vec<u8>> {
        blob::read_blob(self, id)
    }
}

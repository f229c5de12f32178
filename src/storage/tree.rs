//!  tree entries
//!
//! in Git, a tree is a directory: an ordered set of named entries pointing
//! at blobs (files), other trees (subdirectories) or, for submodules, at a
//! commit in some other repository. Entry names are unique within a tree.

use git2::{ObjectType, Oid};
use serde::Serialize;

use crate::storage::types::{BlobId, TreeId};

/// what a tree entry points at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    Blob,
    Tree,
    /// gitlink to a commit in another repository
    Submodule,
}

/// a single named entry of a tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeEntry {
    pub name: String,
    pub kind: EntryKind,
    pub(crate) oid: Oid,
    /// raw git file mode, e.g. 0o100644
    pub mode: i32,
}

impl TreeEntry {
    /// create a TreeEntry from a git2::TreeEntry
    pub(crate) fn from_git2(entry: &git2::TreeEntry<'_>) -> Self {
        let kind = match entry.kind() {
            Some(ObjectType::Tree) => EntryKind::Tree,
            Some(ObjectType::Commit) => EntryKind::Submodule,
            _ => EntryKind::Blob,
        };

        Self {
            name: String::from_utf8_lossy(entry.name_bytes()).into_owned(),
            kind,
            oid: entry.id(),
            mode: entry.filemode(),
        }
    }

    /// true when both entries point at the same object
    pub fn same_object(&self, other: &TreeEntry) -> bool {
        self.oid == other.oid
    }

    pub fn is_tree(&self) -> bool {
        self.kind == EntryKind::Tree
    }

    /// the entry as a tree id (only meaningful for tree entries)
    pub fn tree_id(&self) -> TreeId {
        TreeId::new(self.oid)
    }

    /// the entry as a blob id (only meaningful for blob entries)
    pub fn blob_id(&self) -> BlobId {
        BlobId::new(self.oid)
    }

    /// the file mode as git prints it in diff headers
    pub fn mode_string(&self) -> String {
        format!("{:06o}", self.mode)
    }
}

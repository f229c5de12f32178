//! storage layer for GitScope
//!
//! this module is the only place that talks to git2. Everything above it
//! (tree diffing, history collection, the explorer API) is written against
//! the [`ObjectReader`] trait and the typed ids defined here.
//!
//!  # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     GitRepository                           │
//! │      (open/validate, ref resolution, shared access)         │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!        ┌─────────────────────┼─────────────────────┐
//!        │                     │                     │
//!        ▼                     ▼                     ▼
//!  ┌─────────────┐       ┌─────────────┐       ┌─────────────┐
//!  │    tree     │       │    blob     │       │    refs     │
//!  │  (entries)  │       │ (contents)  │       │ (branches)  │
//!  └─────────────┘       └─────────────┘       └─────────────┘
//!         │                     │                     │
//!         └─────────────────────┼─────────────────────┘
//!                               │
//!                               ▼
//!                        ┌─────────────┐
//!                        │   commit    │
//!                        │  (history)  │
//!                        └─────────────┘
//! ```
//!
//! # Usage
//!
//! ```ignore
//! use gitscope::storage::{GitRepository, BranchName, ObjectReader};
//!
//! let repo = GitRepository::open("./my_repo")?;
//! let tip = repo.resolve_branch(&BranchName::new("main")?)?;
//! let info = repo.with_repo(|r| r.read_commit(tip))?;
//! ```

mod blob;
mod commit;
mod error;
mod reader;
mod refs;
mod repository;
mod tree;
mod types;

#[cfg(test)]
pub(crate) mod fixture;

// Re-export public API
pub use blob::decode_text;
pub use commit::{walk_history, CommitInfo, Signature};
pub use error::{StorageError, StorageResult};
pub use reader::ObjectReader;
pub use refs::RefManager;
pub use repository::GitRepository;
pub use tree::{EntryKind, TreeEntry};
pub use types::{BlobId, BranchName, CommitId, InvalidNameError, TreeId};

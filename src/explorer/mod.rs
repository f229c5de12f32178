//! Read-only query surface over one repository.
//!
//! [`Explorer`] composes the storage, diff and graph layers into the
//! operations a presentation layer needs: branch and commit listings,
//! tree and commit diffs, and the multi-branch commit graph.

mod api;
mod error;

pub use api::{Explorer, ExplorerConfig};
pub use error::{ExplorerError, ExplorerResult};

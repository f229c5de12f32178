//!  Blob operations.
//!
//! blobs are raw file contents. Sizes can be read from the object header
//! without inflating the content, which lets callers skip oversized files
//! before paying for a full read.

use git2::Repository;

use crate::storage::error::{StorageError, StorageResult};
use crate::storage::types::BlobId;

/// read a blob's content from the repository
pub fn read_blob(repo: &Repository, blob_id: BlobId) -> StorageResult<Vec<u8>> {
    let blob = repo
        .find_blob(blob_id.raw())
        .map_err(|_| StorageError::ObjectNotFound {
            kind: "blob",
            id: blob_id.to_string(),
        })?;
    Ok(blob.content().to_vec())
}

/// read a blob's size from its object header
pub fn blob_size(repo: &Repository, blob_id: BlobId) -> StorageResult<usize> {
    let odb = repo.odb()?;
    let (size, _) = odb
        .read_header(blob_id.raw())
        .map_err(|_| StorageError::ObjectNotFound {
            kind: "blob",
            id: blob_id.to_string(),
        })?;
    Ok(size)
}

/// decode blob bytes as text
///
/// content containing a NUL byte is treated as binary, as is anything
/// that is not valid UTF-8.
pub fn decode_text(bytes: &[u8]) -> StorageResult<&str> {
    if bytes.contains(&0) {
        return Err(StorageError::BinaryContent(format!("{} bytes", bytes.len())));
    }
    Ok(std::str::from_utf8(bytes)?)
}

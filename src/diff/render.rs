//! Unified diff text generation.
//!
//! Turns a list of [`ChangeRecord`]s into `git diff`-style text. Rendering
//! never fails as a whole: a file that cannot be read, is not text, or is
//! larger than the configured limit gets a placeholder hunk and the next
//! file is processed. Each rendered file reports a [`FileOutcome`] so
//! callers can tell full output from degraded output.

use std::fmt;

use serde::Serialize;
use similar::{ChangeTag, TextDiff};
use tracing::debug;

use crate::diff::tree_diff::{ChangeKind, ChangeRecord, TreeDiff};
use crate::storage::{decode_text, EntryKind, ObjectReader, StorageError, StorageResult, TreeEntry, TreeId};

const TOO_LARGE: &str = "@@ File too large to display @@";
const UNREADABLE: &str = "@@ Binary file or read error @@";
const DIRECTORY: &str = "@@ Directory, contents not listed @@";

/// bounds applied while rendering
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiffLimits {
    /// number of change records rendered; the rest are counted
    pub max_files: usize,
    /// modified files larger than this on either side are not diffed
    pub max_file_bytes: usize,
    /// unchanged lines shown around each change
    pub context_lines: usize,
}

impl Default for DiffLimits {
    fn default() -> Self {
        Self {
            max_files: 10,
            max_file_bytes: 1024 * 1024,
            context_lines: 3,
        }
    }
}

/// what ended up in a file's section of the output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FileOutcome {
    Rendered,
    TooLarge,
    Unreadable,
    /// a whole subtree was added or deleted
    Directory,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileSection {
    pub path: String,
    pub kind: ChangeKind,
    pub outcome: FileOutcome,
}

/// the rendered text plus a per-file account of it
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RenderedDiff {
    pub text: String,
    pub files: Vec<FileSection>,
    /// change records beyond `max_files`
    pub omitted: usize,
    /// subtrees skipped by the tree comparison; changes below them are missing
    pub unreadable: Vec<String>,
}

impl RenderedDiff {
    /// true when any file was replaced by a placeholder or a subtree
    /// could not be compared
    pub fn is_degraded(&self) -> bool {
        !self.unreadable.is_empty() || self.files.iter().any(|f| f.outcome != FileOutcome::Rendered)
    }

    pub fn into_text(self) -> String {
        self.text
    }
}

impl fmt::Display for RenderedDiff {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// renders change records between two root trees
pub struct DiffRenderer<'a, R: ?Sized> {
    reader: &'a R,
    limits: DiffLimits,
}

impl<'a, R> DiffRenderer<'a, R>
where
    R: ObjectReader + ?Sized,
{
    pub fn new(reader: &'a R, limits: DiffLimits) -> Self {
        Self { reader, limits }
    }

    /// render the first `max_files` records, in input order
    pub fn render(&self, old_root: TreeId, new_root: TreeId, changes: &[ChangeRecord]) -> RenderedDiff {
        let mut rendered = RenderedDiff::default();

        for change in changes.iter().take(self.limits.max_files) {
            let outcome = self.render_file(&mut rendered.text, old_root, new_root, change);
            rendered.files.push(FileSection {
                path: change.path.clone(),
                kind: change.kind,
                outcome,
            });
        }

        rendered.omitted = changes.len().saturating_sub(self.limits.max_files);
        if rendered.omitted > 0 {
            rendered.text.push_str(&format!(
                "\n# {} more file(s) changed (showing first {} for performance)\n",
                rendered.omitted, self.limits.max_files
            ));
        }

        rendered
    }

    /// render a [`TreeDiff`], noting every subtree it had to skip
    pub fn render_tree_diff(&self, old_root: TreeId, new_root: TreeId, diff: &TreeDiff) -> RenderedDiff {
        let mut rendered = self.render(old_root, new_root, &diff.changes);
        push_unreadable_notes(&mut rendered.text, &diff.unreadable);
        rendered.unreadable = diff.unreadable.clone();
        rendered
    }

    fn render_file(&self, out: &mut String, old_root: TreeId, new_root: TreeId, change: &ChangeRecord) -> FileOutcome {
        let path = change.path.as_str();
        out.push_str(&format!("diff --git a/{} b/{}\n", path, path));

        let result = match change.kind {
            ChangeKind::Added => self.render_added(out, new_root, path),
            ChangeKind::Deleted => self.render_deleted(out, old_root, path),
            ChangeKind::Modified => self.render_modified(out, old_root, new_root, path),
        };

        let outcome = match result {
            Ok(outcome) => outcome,
            Err(e) => {
                debug!(path, binary = e.is_undecodable(), error = %e, "rendering placeholder for unreadable file");
                out.push_str(&format!("--- a/{}\n+++ b/{}\n{}\n", path, path, UNREADABLE));
                FileOutcome::Unreadable
            }
        };
        out.push('\n');
        outcome
    }

    fn render_added(&self, out: &mut String, root: TreeId, path: &str) -> StorageResult<FileOutcome> {
        let entry = self.reader.resolve_path(root, path)?;
        if entry.is_tree() {
            out.push_str(&format!("--- /dev/null\n+++ b/{}\n{}\n", path, DIRECTORY));
            return Ok(FileOutcome::Directory);
        }
        let entry = expect_blob(entry, path)?;
        let text = self.read_text(&entry)?;
        let count = line_count(&text);

        out.push_str(&format!("new file mode {}\n--- /dev/null\n+++ b/{}\n", entry.mode_string(), path));
        if count > 0 {
            out.push_str(&format!("@@ -0,0 +1,{} @@\n", count));
            push_lines(out, '+', &text);
        }
        Ok(FileOutcome::Rendered)
    }

    fn render_deleted(&self, out: &mut String, root: TreeId, path: &str) -> StorageResult<FileOutcome> {
        let entry = self.reader.resolve_path(root, path)?;
        if entry.is_tree() {
            out.push_str(&format!("--- a/{}\n+++ /dev/null\n{}\n", path, DIRECTORY));
            return Ok(FileOutcome::Directory);
        }
        let entry = expect_blob(entry, path)?;
        let text = self.read_text(&entry)?;
        let count = line_count(&text);

        out.push_str(&format!("deleted file mode {}\n--- a/{}\n+++ /dev/null\n", entry.mode_string(), path));
        if count > 0 {
            out.push_str(&format!("@@ -1,{} +0,0 @@\n", count));
            push_lines(out, '-', &text);
        }
        Ok(FileOutcome::Rendered)
    }

    fn render_modified(&self, out: &mut String, old_root: TreeId, new_root: TreeId, path: &str) -> StorageResult<FileOutcome> {
        let old = expect_blob(self.reader.resolve_path(old_root, path)?, path)?;
        let new = expect_blob(self.reader.resolve_path(new_root, path)?, path)?;

        if old.mode != new.mode {
            out.push_str(&format!("old mode {}\nnew mode {}\n", old.mode_string(), new.mode_string()));
        }

        let old_size = self.reader.blob_size(old.blob_id())?;
        let new_size = self.reader.blob_size(new.blob_id())?;
        if old_size > self.limits.max_file_bytes || new_size > self.limits.max_file_bytes {
            debug!(path, old_size, new_size, "file exceeds display limit");
            out.push_str(&format!("--- a/{}\n+++ b/{}\n{}\n", path, path, TOO_LARGE));
            return Ok(FileOutcome::TooLarge);
        }

        let old_text = self.read_text(&old)?;
        let new_text = self.read_text(&new)?;

        out.push_str(&format!("--- a/{}\n+++ b/{}\n", path, path));

        let diff = TextDiff::from_lines(old_text.as_str(), new_text.as_str());
        for hunk in diff.unified_diff().context_radius(self.limits.context_lines).iter_hunks() {
            out.push_str(&format!("{}\n", hunk.header()));
            for change in hunk.iter_changes() {
                let sign = match change.tag() {
                    ChangeTag::Delete => '-',
                    ChangeTag::Insert => '+',
                    ChangeTag::Equal => ' ',
                };
                out.push(sign);
                out.push_str(change.value());
                if change.missing_newline() {
                    out.push_str("\n\\ No newline at end of file\n");
                }
            }
        }
        Ok(FileOutcome::Rendered)
    }

    fn read_text(&self, entry: &TreeEntry) -> StorageResult<String> {
        let bytes = self.reader.read_blob(entry.blob_id())?;
        Ok(decode_text(&bytes)?.to_string())
    }
}

/// require a resolved entry to be a regular file
fn expect_blob(entry: TreeEntry, path: &str) -> StorageResult<TreeEntry> {
    if entry.kind != EntryKind::Blob {
        return Err(StorageError::UnexpectedEntryType {
            path: path.to_string(),
            expected: "blob (file)",
            found: format!("{:?}", entry.kind),
        });
    }
    Ok(entry)
}

fn push_unreadable_notes(out: &mut String, paths: &[String]) {
    for path in paths {
        out.push_str(&format!("# {}/ could not be read, changes below it are not shown\n", path));
    }
}

fn line_count(text: &str) -> usize {
    text.split_inclusive('\n').count()
}

fn push_lines(out: &mut String, sign: char, text: &str) {
    for line in text.split_inclusive('\n') {
        out.push(sign);
        out.push_str(line);
        if !line.ends_with('\n') {
            out.push_str("\n\\ No newline at end of file\n");
        }
    }
}

//! Test repositories built directly through the object database.

use std::collections::BTreeMap;
use std::path::Path;

use git2::{FileMode, Oid, Repository, Time};
use tempfile::TempDir;

use crate::storage::types::{CommitId, TreeId};

/// a throwaway repository in a temp directory
pub(crate) struct RepoFixture {
    pub dir: TempDir,
    pub repo: Repository,
}

enum Node<'a> {
    File(&'a [u8]),
    Dir(BTreeMap<&'a str, Node<'a>>),
}

impl RepoFixture {
    pub fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let repo = Repository::init(dir.path()).unwrap();
        Self { dir, repo }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// write a tree from `(path, content)` pairs; paths may be nested
    pub fn tree(&self, files: &[(&str, &str)]) -> TreeId {
        let files: Vec<(&str, &[u8])> = files.iter().map(|(p, c)| (*p, c.as_bytes())).collect();
        self.tree_bytes(&files)
    }

    pub fn tree_bytes(&self, files: &[(&str, &[u8])]) -> TreeId {
        let mut root = BTreeMap::new();
        for &(path, content) in files {
            let mut parts: Vec<&str> = path.split('/').collect();
            let file = parts.pop().unwrap();
            let mut dir = &mut root;
            for part in parts {
                let node = dir.entry(part).or_insert_with(|| Node::Dir(BTreeMap::new()));
                dir = match node {
                    Node::Dir(children) => children,
                    Node::File(_) => panic!("{} is both a file and a directory", part),
                };
            }
            dir.insert(file, Node::File(content));
        }
        TreeId::new(self.write_dir(&root))
    }

    fn write_dir(&self, dir: &BTreeMap<&str, Node<'_>>) -> Oid {
        let mut builder = self.repo.treebuilder(None).unwrap();
        for (name, node) in dir {
            match node {
                Node::File(content) => {
                    let oid = self.repo.blob(content).unwrap();
                    builder.insert(name, oid, FileMode::Blob.into()).unwrap();
                }
                Node::Dir(children) => {
                    let oid = self.write_dir(children);
                    builder.insert(name, oid, FileMode::Tree.into()).unwrap();
                }
            }
        }
        builder.write().unwrap()
    }

    /// create a commit with a fixed author timestamp
    pub fn commit(&self, tree: TreeId, parents: &[CommitId], message: &str, time: i64) -> CommitId {
        let tree = self.repo.find_tree(tree.raw()).unwrap();
        let sig = git2::Signature::new("Test", "test@example.com", &Time::new(time, 0)).unwrap();
        let parents: Vec<git2::Commit<'_>> = parents
            .iter()
            .map(|id| self.repo.find_commit(id.raw()).unwrap())
            .collect();
        let parent_refs: Vec<&git2::Commit<'_>> = parents.iter().collect();

        let oid = self
            .repo
            .commit(None, &sig, &sig, message, &tree, &parent_refs)
            .unwrap();
        CommitId::new(oid)
    }

    /// create or move a local branch
    pub fn branch(&self, name: &str, target: CommitId) {
        let commit = self.repo.find_commit(target.raw()).unwrap();
        self.repo.branch(name, &commit, true).unwrap();
    }

    /// delete a loose object to simulate a corrupt store
    pub fn remove_object(&self, oid: Oid) {
        let hex = oid.to_string();
        let path = self.repo.path().join("objects").join(&hex[..2]).join(&hex[2..]);
        std::fs::remove_file(path).unwrap();
    }

    /// a fresh handle with no cached objects
    pub fn reopen(&self) -> Repository {
        Repository::open(self.dir.path()).unwrap()
    }
}

//! Shared test utilities for integration tests.
//!
//! Not all functions are used by every test file, but they're shared across tests.
#![allow(dead_code)]

use std::path::Path;

use git2::{Oid, Repository, Signature, Time};

/// A test git repository builder for integration tests.
pub struct TestRepo {
    pub dir: tempfile::TempDir,
    pub repo: Repository,
    clock: std::cell::Cell<i64>,
}

impl TestRepo {
    /// Create a new empty git repository in a temp directory.
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("Failed to create temp directory");
        let repo = Repository::init(dir.path()).expect("Failed to init git repo");
        Self {
            dir,
            repo,
            clock: std::cell::Cell::new(1_700_000_000),
        }
    }

    /// Signature with a strictly increasing timestamp so time ordering is stable.
    fn signature(&self) -> Signature<'static> {
        let seconds = self.clock.get() + 60;
        self.clock.set(seconds);
        Signature::new("Test User", "test@example.com", &Time::new(seconds, 0))
            .expect("Failed to create signature")
    }

    /// Create a commit on HEAD with the given message. Returns the commit OID.
    pub fn commit(&self, message: &str) -> Oid {
        let parent = self.repo.head().ok().and_then(|h| h.peel_to_commit().ok());
        let parents: Vec<&git2::Commit> = parent.iter().collect();
        self.commit_with_parents(Some("HEAD"), message, &parents)
    }

    /// Create a commit on `update_ref` (or detached when None) with explicit parents.
    pub fn commit_with_parents(
        &self,
        update_ref: Option<&str>,
        message: &str,
        parents: &[&git2::Commit],
    ) -> Oid {
        let sig = self.signature();

        // Change a file so every commit has a distinct tree
        let file_path = self.dir.path().join("test.txt");
        std::fs::write(&file_path, format!("{}\n{}", message, sig.when().seconds()))
            .expect("Failed to write test file");

        let mut index = self.repo.index().expect("Failed to get index");
        index
            .add_path(Path::new("test.txt"))
            .expect("Failed to add file");
        index.write().expect("Failed to write index");
        let tree_id = index.write_tree().expect("Failed to write tree");
        let tree = self.repo.find_tree(tree_id).expect("Failed to find tree");

        self.repo
            .commit(update_ref, &sig, &sig, message, &tree, parents)
            .expect("Failed to create commit")
    }

    /// Write a commit object from raw message bytes on top of HEAD and advance HEAD.
    ///
    /// Lets tests store messages that are not valid UTF-8, optionally with an
    /// `encoding` header such as `ISO-8859-1`.
    pub fn commit_raw(&self, message: &[u8], encoding: Option<&str>) -> Oid {
        let sig = self.signature();
        let parent = self.repo.head().ok().and_then(|h| h.peel_to_commit().ok());
        let tree_id = match &parent {
            Some(commit) => commit.tree_id(),
            None => {
                let mut index = self.repo.index().expect("Failed to get index");
                index.write_tree().expect("Failed to write tree")
            }
        };

        let stamp = format!("Test User <test@example.com> {} +0000", sig.when().seconds());
        let mut raw = format!("tree {}\n", tree_id).into_bytes();
        if let Some(commit) = &parent {
            raw.extend_from_slice(format!("parent {}\n", commit.id()).as_bytes());
        }
        raw.extend_from_slice(format!("author {}\ncommitter {}\n", stamp, stamp).as_bytes());
        if let Some(encoding) = encoding {
            raw.extend_from_slice(format!("encoding {}\n", encoding).as_bytes());
        }
        raw.push(b'\n');
        raw.extend_from_slice(message);

        let oid = self
            .repo
            .odb()
            .expect("Failed to open object database")
            .write(git2::ObjectType::Commit, &raw)
            .expect("Failed to write commit object");

        match self.repo.head() {
            Ok(head) if head.is_branch() => {
                let name = head.name().expect("branch name should be UTF-8").to_string();
                self.repo
                    .reference(&name, oid, true, "commit_raw")
                    .expect("Failed to move branch");
            }
            _ => self.repo.set_head_detached(oid).expect("Failed to detach HEAD"),
        }

        oid
    }

    /// Create a lightweight tag pointing to the given OID.
    pub fn tag_lightweight(&self, name: &str, oid: Oid) {
        let obj = self.repo.find_object(oid, None).expect("Failed to find object");
        self.repo
            .tag_lightweight(name, &obj, false)
            .expect("Failed to create lightweight tag");
    }

    /// Create a branch pointing to the given OID.
    pub fn branch(&self, name: &str, oid: Oid) {
        let commit = self.repo.find_commit(oid).expect("Failed to find commit");
        self.repo
            .branch(name, &commit, false)
            .expect("Failed to create branch");
    }

    /// Name of the branch HEAD points at after the first commit.
    pub fn head_branch(&self) -> String {
        self.repo
            .head()
            .expect("HEAD should exist")
            .shorthand()
            .expect("branch name should be UTF-8")
            .to_string()
    }
}

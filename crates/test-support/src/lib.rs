//! Temporary directory trees for chacl tests.
//!
//! [`TreeFixture`] owns a temporary directory and creates files, directories,
//! and links below it from slash-separated relative paths. The root is
//! canonicalized so paths produced by the fixture compare equal to paths the
//! rule loader canonicalizes.
//!
//! Fixture helpers panic on I/O failure; they only run inside tests.

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

/// A temporary directory tree removed on drop.
#[derive(Debug)]
pub struct TreeFixture {
    _dir: TempDir,
    root: PathBuf,
}

impl TreeFixture {
    /// Creates an empty tree.
    #[must_use]
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("create temp dir");
        let root = fs::canonicalize(dir.path()).expect("canonicalize temp dir");
        Self { _dir: dir, root }
    }

    /// Creates a tree from a list of entries; names ending in `/` become
    /// directories, everything else an empty file.
    #[must_use]
    pub fn with_entries(entries: &[&str]) -> Self {
        let tree = Self::new();
        for entry in entries {
            if let Some(dir) = entry.strip_suffix('/') {
                tree.dir(dir);
            } else {
                tree.file(entry, b"");
            }
        }
        tree
    }

    /// The canonical root of the tree.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Joins `relative` onto the root without touching the filesystem.
    #[must_use]
    pub fn path(&self, relative: &str) -> PathBuf {
        if relative.is_empty() {
            self.root.clone()
        } else {
            self.root.join(relative)
        }
    }

    /// Creates a directory and its parents.
    pub fn dir(&self, relative: &str) -> PathBuf {
        let path = self.path(relative);
        fs::create_dir_all(&path).expect("create directory");
        path
    }

    /// Creates a file and its parent directories.
    pub fn file(&self, relative: &str, contents: &[u8]) -> PathBuf {
        let path = self.path(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("create parent directory");
        }
        fs::write(&path, contents).expect("write file");
        path
    }

    /// Creates a symbolic link at `relative` pointing to `target`.
    #[cfg(unix)]
    pub fn symlink(&self, relative: &str, target: &Path) -> PathBuf {
        let path = self.path(relative);
        std::os::unix::fs::symlink(target, &path).expect("create symlink");
        path
    }

    /// Writes a rule file next to the tree contents and returns its path.
    pub fn rules_file(&self, name: &str, text: &str) -> PathBuf {
        self.file(name, text.as_bytes())
    }
}

impl Default for TreeFixture {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entries_create_files_and_directories() {
        let tree = TreeFixture::with_entries(&["share/", "share/reports/q1.pdf"]);

        assert!(tree.path("share").is_dir());
        assert!(tree.path("share/reports").is_dir());
        assert!(tree.path("share/reports/q1.pdf").is_file());
    }

    #[test]
    fn root_is_canonical() {
        let tree = TreeFixture::new();
        assert_eq!(fs::canonicalize(tree.root()).unwrap(), tree.root());
        assert_eq!(tree.path(""), tree.root());
    }
}

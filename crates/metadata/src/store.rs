//! crates/metadata/src/store.rs
//!
//! Persistence boundary for object ACLs.

use std::collections::{BTreeMap, BTreeSet};
use std::io;
use std::path::{Path, PathBuf};

use crate::{Acl, AclOp, MetadataError};

/// Reads and writes object ACLs.
///
/// `read` returns `Ok(None)` when the object carries no ACL; callers treat
/// that the same as an empty ACL. Writing an empty ACL removes it.
pub trait AclStore {
    /// Reads the ACL of `path` without following symbolic links.
    fn read(&self, path: &Path) -> Result<Option<Acl>, MetadataError>;

    /// Replaces the ACL of `path`.
    fn write(&mut self, path: &Path, acl: &Acl) -> Result<(), MetadataError>;

    /// Returns the byte form used to decide whether two ACLs are the same.
    fn canonical_bytes(&self, acl: &Acl) -> Vec<u8> {
        acl.to_bytes()
    }
}

impl<S: AclStore + ?Sized> AclStore for &mut S {
    fn read(&self, path: &Path) -> Result<Option<Acl>, MetadataError> {
        (**self).read(path)
    }

    fn write(&mut self, path: &Path, acl: &Acl) -> Result<(), MetadataError> {
        (**self).write(path, acl)
    }

    fn canonical_bytes(&self, acl: &Acl) -> Vec<u8> {
        (**self).canonical_bytes(acl)
    }
}

/// In-memory ACL store keyed by path.
///
/// Every successful write is recorded, which lets tests assert how many
/// objects a run touched.
#[derive(Debug, Default, Clone)]
pub struct MemoryAclStore {
    acls: BTreeMap<PathBuf, Acl>,
    writes: Vec<PathBuf>,
    failing: BTreeSet<PathBuf>,
}

impl MemoryAclStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds the ACL of `path` without recording a write.
    pub fn insert(&mut self, path: impl Into<PathBuf>, acl: Acl) {
        self.acls.insert(path.into(), acl);
    }

    /// Returns the stored ACL of `path`.
    #[must_use]
    pub fn get(&self, path: &Path) -> Option<&Acl> {
        self.acls.get(path)
    }

    /// Paths written so far, in write order.
    #[must_use]
    pub fn writes(&self) -> &[PathBuf] {
        &self.writes
    }

    /// Forgets recorded writes.
    pub fn clear_writes(&mut self) {
        self.writes.clear();
    }

    /// Makes every write to `path` fail with a permission error.
    pub fn fail_writes_to(&mut self, path: impl Into<PathBuf>) {
        self.failing.insert(path.into());
    }
}

impl AclStore for MemoryAclStore {
    fn read(&self, path: &Path) -> Result<Option<Acl>, MetadataError> {
        Ok(self.acls.get(path).cloned())
    }

    fn write(&mut self, path: &Path, acl: &Acl) -> Result<(), MetadataError> {
        if self.failing.contains(path) {
            return Err(MetadataError::new(
                AclOp::Write,
                path,
                io::Error::from(io::ErrorKind::PermissionDenied),
            ));
        }
        if acl.is_empty() {
            self.acls.remove(path);
        } else {
            self.acls.insert(path.to_path_buf(), acl.clone());
        }
        self.writes.push(path.to_path_buf());
        Ok(())
    }
}

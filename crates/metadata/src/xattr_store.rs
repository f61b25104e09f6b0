//! crates/metadata/src/xattr_store.rs
//!
//! ACL store backed by an extended attribute.
//!
//! The attribute holds chacl's own ACE encoding and defaults to a `user.`
//! name. The kernel's `system.nfs4_acl` expects a different layout.
//!
//! # Invariants
//!
//! - Symbolic links are never followed.
//! - `ENOTSUP`, `EOPNOTSUPP`, and `ENODATA` on read mean "no ACL".
//! - An empty ACL removes the attribute; removing an absent attribute succeeds.

use std::ffi::{OsStr, OsString};
use std::io;
use std::path::Path;

use logging::trace_acl;

use crate::{Acl, AclOp, AclStore, MetadataError};

/// Attribute used when no other name is configured.
pub const DEFAULT_ACL_XATTR: &str = "user.chacl.acl";

/// [`AclStore`] reading and writing one extended attribute per object.
#[derive(Clone, Debug)]
pub struct XattrAclStore {
    attribute: OsString,
}

impl Default for XattrAclStore {
    fn default() -> Self {
        Self::new()
    }
}

impl XattrAclStore {
    /// Creates a store using [`DEFAULT_ACL_XATTR`].
    #[must_use]
    pub fn new() -> Self {
        Self::with_attribute(DEFAULT_ACL_XATTR)
    }

    /// Creates a store using a custom attribute name.
    #[must_use]
    pub fn with_attribute(name: impl Into<OsString>) -> Self {
        Self {
            attribute: name.into(),
        }
    }

    /// Returns the attribute name.
    #[must_use]
    pub fn attribute(&self) -> &OsStr {
        &self.attribute
    }
}

fn means_absent(error: &io::Error) -> bool {
    error.kind() == io::ErrorKind::NotFound
        || error.kind() == io::ErrorKind::Unsupported
        || error.raw_os_error() == Some(libc::ENODATA)
        || error.raw_os_error() == Some(libc::ENOTSUP)
        || error.raw_os_error() == Some(libc::EOPNOTSUPP)
}

impl AclStore for XattrAclStore {
    fn read(&self, path: &Path) -> Result<Option<Acl>, MetadataError> {
        match xattr::get(path, &self.attribute) {
            Ok(Some(data)) => Acl::from_bytes(&data)
                .map(Some)
                .map_err(|e| MetadataError::new(AclOp::Decode, path, e)),
            Ok(None) => Ok(None),
            Err(e) if means_absent(&e) => Ok(None),
            Err(e) => Err(MetadataError::new(AclOp::Read, path, e)),
        }
    }

    fn write(&mut self, path: &Path, acl: &Acl) -> Result<(), MetadataError> {
        if !acl.is_empty() {
            trace_acl!("writing {} entries to {}", acl.len(), path.display());
            return xattr::set(path, &self.attribute, &acl.to_bytes())
                .map_err(|e| MetadataError::new(AclOp::Write, path, e));
        }

        trace_acl!("removing ACL from {}", path.display());
        match xattr::remove(path, &self.attribute) {
            Ok(()) => Ok(()),
            Err(e) if e.raw_os_error() == Some(libc::ENODATA) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(MetadataError::new(AclOp::Remove, path, e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{AccessMask, Ace, AceFlags, Principal};
    use std::fs;

    const TEST_ATTRIBUTE: &str = "user.chacl_test_acl";

    fn sample() -> Acl {
        Acl::from_entries(vec![
            Ace::allow(
                Principal::from_uid(501),
                AccessMask::READ_DATA | AccessMask::READ_ATTRIBUTES,
                AceFlags::NONE,
            ),
            Ace::deny(Principal::EVERYONE, AccessMask::ALL_FILE, AceFlags::INHERITED),
        ])
    }

    /// Returns a store whose attribute the temp filesystem accepts, or `None`
    /// when user xattrs are unavailable.
    fn supported_store(path: &Path) -> Option<XattrAclStore> {
        match xattr::set(path, TEST_ATTRIBUTE, b"probe") {
            Ok(()) => {
                xattr::remove(path, TEST_ATTRIBUTE).ok()?;
                Some(XattrAclStore::with_attribute(TEST_ATTRIBUTE))
            }
            Err(_) => None,
        }
    }

    #[test]
    fn default_attribute_is_in_the_user_namespace() {
        assert_eq!(XattrAclStore::new().attribute(), "user.chacl.acl");
    }

    #[test]
    fn default_store_round_trips_where_user_xattrs_work() {
        let dir = tempfile::tempdir().expect("tempdir");
        let file = dir.path().join("file");
        fs::write(&file, b"data").expect("write");
        if supported_store(&file).is_none() {
            return;
        }

        let mut store = XattrAclStore::new();
        store.write(&file, &sample()).expect("write acl");
        assert_eq!(store.read(&file).expect("read"), Some(sample()));
    }

    #[test]
    fn missing_attribute_reads_as_none() {
        let dir = tempfile::tempdir().expect("tempdir");
        let file = dir.path().join("plain");
        fs::write(&file, b"data").expect("write");

        let store = XattrAclStore::with_attribute(TEST_ATTRIBUTE);
        assert_eq!(store.read(&file).expect("read"), None);
    }

    #[test]
    fn write_then_read_returns_same_acl() {
        let dir = tempfile::tempdir().expect("tempdir");
        let file = dir.path().join("file");
        fs::write(&file, b"data").expect("write");
        let Some(mut store) = supported_store(&file) else {
            return;
        };

        store.write(&file, &sample()).expect("write acl");
        assert_eq!(store.read(&file).expect("read"), Some(sample()));
    }

    #[test]
    fn empty_acl_removes_attribute() {
        let dir = tempfile::tempdir().expect("tempdir");
        let file = dir.path().join("file");
        fs::write(&file, b"data").expect("write");
        let Some(mut store) = supported_store(&file) else {
            return;
        };

        store.write(&file, &sample()).expect("write acl");
        store.write(&file, &Acl::new()).expect("remove acl");
        assert_eq!(store.read(&file).expect("read"), None);
        // Removing again is not an error.
        store.write(&file, &Acl::new()).expect("remove absent acl");
    }

    #[test]
    fn corrupt_attribute_is_an_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let file = dir.path().join("file");
        fs::write(&file, b"data").expect("write");
        let Some(store) = supported_store(&file) else {
            return;
        };

        xattr::set(&file, TEST_ATTRIBUTE, &[0, 0, 0]).expect("set corrupt");
        let error = store.read(&file).unwrap_err();
        assert_eq!(error.op(), AclOp::Decode);
    }

    #[test]
    fn write_to_missing_file_fails() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut store = XattrAclStore::with_attribute(TEST_ATTRIBUTE);
        let error = store.write(&dir.path().join("absent"), &sample()).unwrap_err();
        assert_eq!(error.op(), AclOp::Write);
    }
}

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

/// ACL store operation that failed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AclOp {
    /// Fetching the stored bytes.
    Read,
    /// Interpreting stored bytes as ACEs.
    Decode,
    /// Replacing the stored ACL.
    Write,
    /// Deleting the stored ACL after it became empty.
    Remove,
}

impl fmt::Display for AclOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Read => "read",
            Self::Decode => "decode",
            Self::Write => "write",
            Self::Remove => "remove",
        })
    }
}

/// Failure of an [`AclStore`](crate::AclStore) operation on one object.
#[derive(Debug, thiserror::Error)]
#[error("failed to {op} ACL '{}': {source}", path.display())]
pub struct MetadataError {
    op: AclOp,
    path: PathBuf,
    source: io::Error,
}

impl MetadataError {
    /// Records that `op` failed on `path`.
    pub fn new(op: AclOp, path: &Path, source: io::Error) -> Self {
        Self {
            op,
            path: path.to_path_buf(),
            source,
        }
    }

    /// The operation that failed.
    #[must_use]
    pub const fn op(&self) -> AclOp {
        self.op
    }

    /// The object whose ACL was being accessed.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the underlying OS error.
    #[must_use]
    pub fn source_error(&self) -> &io::Error {
        &self.source
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn display_names_operation_and_path() {
        let error = MetadataError::new(
            AclOp::Write,
            Path::new("/srv/share"),
            io::Error::from(io::ErrorKind::PermissionDenied),
        );
        assert!(
            error
                .to_string()
                .starts_with("failed to write ACL '/srv/share': ")
        );
        assert_eq!(error.op(), AclOp::Write);
        assert_eq!(error.source_error().kind(), io::ErrorKind::PermissionDenied);
        assert!(error.source().is_some());
    }

    #[test]
    fn decode_failures_read_as_such() {
        let error = MetadataError::new(
            AclOp::Decode,
            Path::new("/srv/share/notes.txt"),
            io::Error::from(io::ErrorKind::InvalidData),
        );
        assert!(error.to_string().starts_with("failed to decode ACL"));
    }
}

//! Common error types for the engine crate.

use std::path::PathBuf;

use metadata::{AceTag, MetadataError, Principal, ResolveError};
use rules::{PrincipalRef, RuleError};
use walk::WalkError;

/// Result type for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;

/// Errors that stop a run.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// The rule file could not be loaded.
    #[error(transparent)]
    Rules(#[from] RuleError),
    /// A configured principal could not be resolved.
    #[error("cannot resolve {principal}: {source}")]
    Resolve {
        /// The principal as configured.
        principal: PrincipalRef,
        /// Why resolution failed.
        #[source]
        source: ResolveError,
    },
    /// An existing ACL holds an entry that is neither allow nor deny.
    #[error(
        "unsupported ACL entry on '{}': {tag} entry for {principal}",
        .path.display()
    )]
    UnsupportedEntry {
        /// Object carrying the entry.
        path: PathBuf,
        /// The entry's tag.
        tag: AceTag,
        /// The entry's principal.
        principal: Principal,
    },
    /// Reading or writing an ACL failed.
    #[error(transparent)]
    Metadata(#[from] MetadataError),
    /// Enumerating a traversal root failed.
    #[error(transparent)]
    Walk(#[from] WalkError),
}

impl EngineError {
    /// Configuration problem: bad rule file or unresolvable principal.
    pub const CONFIG_EXIT_CODE: i32 = 2;
    /// Existing ACL content chacl cannot interpret.
    pub const UNSUPPORTED_EXIT_CODE: i32 = 3;
    /// Filesystem failure.
    pub const IO_EXIT_CODE: i32 = 4;

    /// Process exit code for this error.
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::Rules(_) | Self::Resolve { .. } => Self::CONFIG_EXIT_CODE,
            Self::UnsupportedEntry { .. } => Self::UNSUPPORTED_EXIT_CODE,
            Self::Metadata(_) | Self::Walk(_) => Self::IO_EXIT_CODE,
        }
    }
}

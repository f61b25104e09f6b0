#![deny(unsafe_code)]
#![deny(missing_docs)]

//! # Overview
//!
//! `metadata` owns everything chacl knows about access control lists: the
//! entry and list model ([`Ace`], [`Acl`]), the identities entries refer to
//! ([`Principal`]), the resolvers that map account names onto identities, and
//! the [`AclStore`] boundary through which ACLs are read from and written to
//! filesystem objects.
//!
//! # Design
//!
//! ACLs are plain owned values. A store hands out an [`Acl`] on read and takes
//! one by reference on write; no native handle outlives a single call.
//! Comparison between the current and desired ACL of an object happens on
//! [`AclStore::canonical_bytes`], which defaults to the wire encoding
//! produced by [`Acl::to_bytes`].
//!
//! Two stores ship with the crate:
//!
//! - [`MemoryAclStore`] keeps ACLs in a map and records writes.
//! - `XattrAclStore` (feature `xattr`, Unix only) persists ACLs in an
//!   extended attribute, `user.chacl.acl` by default.
//!
//! # Errors
//!
//! Store operations return [`MetadataError`] describing the failed operation
//! and the path involved. Resolvers return [`ResolveError`].

mod ace;
mod error;
mod principal;
mod store;
#[cfg(all(unix, feature = "xattr"))]
mod xattr_store;

pub use ace::{AccessMask, Ace, AceFlags, AceTag, Acl};
pub use error::{AclOp, MetadataError};
#[cfg(unix)]
pub use principal::SystemResolver;
pub use principal::{
    CachingResolver, Principal, PrincipalKind, PrincipalResolver, ResolveError, StaticResolver,
};
pub use store::{AclStore, MemoryAclStore};
#[cfg(all(unix, feature = "xattr"))]
pub use xattr_store::{DEFAULT_ACL_XATTR, XattrAclStore};

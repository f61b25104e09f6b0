//! crates/metadata/src/ace.rs
//!
//! Access control entries and lists.
//!
//! The model follows NFSv4 ACLs:
//!
//! - **ACE-based**: each entry grants or denies a mask of rights to one
//!   principal.
//! - **Granular permissions**: fourteen distinct permission bits, several of
//!   which carry a different name when applied to a directory.
//! - **Inheritance**: directory entries can propagate to children, and entries
//!   that arrived by propagation carry [`AceFlags::INHERITED`].
//! - **Order matters**: entries are evaluated in order; first match wins.
//!
//! # Wire Format
//!
//! An ACL is stored as a sequence of entries. Each entry contains:
//! - Type (4 bytes, big-endian): ALLOW (0), DENY (1), AUDIT (2), ALARM (3)
//! - Flags (4 bytes, big-endian): inheritance flags
//! - Mask (4 bytes, big-endian): permission bits
//! - Who length (4 bytes, big-endian) followed by the principal rendered as a
//!   hyphenated UUID, padded with zero bytes to a 4-byte boundary
//!
//! The same encoding serves as the canonical form used to decide whether an
//! object's ACL needs rewriting.

use std::fmt;
use std::io;
use std::ops::{BitAnd, BitOr, BitOrAssign};

use crate::Principal;

/// Entry type.
///
/// Only [`AceTag::Allow`] and [`AceTag::Deny`] carry meaning for
/// reconciliation. The remaining tags are decoded so they can be reported
/// rather than silently lost.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AceTag {
    /// Access allowed.
    Allow,
    /// Access denied.
    Deny,
    /// Audit (log access attempts).
    Audit,
    /// Alarm (trigger alarm on access).
    Alarm,
    /// A tag value this crate does not know.
    Unknown(u32),
}

impl AceTag {
    /// Decodes a raw tag value.
    #[must_use]
    pub const fn from_raw(value: u32) -> Self {
        match value {
            0 => Self::Allow,
            1 => Self::Deny,
            2 => Self::Audit,
            3 => Self::Alarm,
            other => Self::Unknown(other),
        }
    }

    /// Returns the raw tag value.
    #[must_use]
    pub const fn as_raw(self) -> u32 {
        match self {
            Self::Allow => 0,
            Self::Deny => 1,
            Self::Audit => 2,
            Self::Alarm => 3,
            Self::Unknown(value) => value,
        }
    }

    /// Returns true for allow and deny entries.
    #[must_use]
    pub const fn is_interpretable(self) -> bool {
        matches!(self, Self::Allow | Self::Deny)
    }
}

impl fmt::Display for AceTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Allow => f.write_str("allow"),
            Self::Deny => f.write_str("deny"),
            Self::Audit => f.write_str("audit"),
            Self::Alarm => f.write_str("alarm"),
            Self::Unknown(value) => write!(f, "unknown({value})"),
        }
    }
}

/// Inheritance flags of an entry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct AceFlags(u32);

impl AceFlags {
    /// No flags.
    pub const NONE: Self = Self(0);
    /// ACE applies to files in this directory.
    pub const FILE_INHERIT: Self = Self(0x0001);
    /// ACE applies to subdirectories.
    pub const DIRECTORY_INHERIT: Self = Self(0x0002);
    /// Don't propagate inheritance to children of children.
    pub const NO_PROPAGATE_INHERIT: Self = Self(0x0004);
    /// ACE is for inheritance only, doesn't apply to this object.
    pub const INHERIT_ONLY: Self = Self(0x0008);
    /// ACE was inherited from parent.
    pub const INHERITED: Self = Self(0x0080);

    /// Creates flags from raw value.
    #[must_use]
    pub const fn from_raw(value: u32) -> Self {
        Self(value)
    }

    /// Returns the raw flags value.
    #[must_use]
    pub const fn as_raw(self) -> u32 {
        self.0
    }

    /// Checks if every bit of `other` is set.
    #[must_use]
    pub const fn contains(self, other: Self) -> bool {
        (self.0 & other.0) == other.0
    }

    /// Returns a copy with `INHERITED` set or cleared.
    #[must_use]
    pub const fn with_inherited(self, inherited: bool) -> Self {
        if inherited {
            Self(self.0 | Self::INHERITED.0)
        } else {
            Self(self.0 & !Self::INHERITED.0)
        }
    }
}

impl BitOr for AceFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for AceFlags {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

/// Access mask (permission bits).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct AccessMask(u32);

impl AccessMask {
    /// No rights.
    pub const EMPTY: Self = Self(0);
    /// Read data from file.
    pub const READ_DATA: Self = Self(0x0001);
    /// List directory; same bit as [`Self::READ_DATA`].
    pub const LIST_DIRECTORY: Self = Self::READ_DATA;
    /// Write data to file.
    pub const WRITE_DATA: Self = Self(0x0002);
    /// Create file in directory; same bit as [`Self::WRITE_DATA`].
    pub const ADD_FILE: Self = Self::WRITE_DATA;
    /// Append data to file.
    pub const APPEND_DATA: Self = Self(0x0004);
    /// Create subdirectory; same bit as [`Self::APPEND_DATA`].
    pub const ADD_SUBDIRECTORY: Self = Self::APPEND_DATA;
    /// Read named attributes.
    pub const READ_NAMED_ATTRS: Self = Self(0x0008);
    /// Write named attributes.
    pub const WRITE_NAMED_ATTRS: Self = Self(0x0010);
    /// Execute file.
    pub const EXECUTE: Self = Self(0x0020);
    /// Search directory; same bit as [`Self::EXECUTE`].
    pub const SEARCH: Self = Self::EXECUTE;
    /// Delete a file within a directory. Directory-only.
    pub const DELETE_CHILD: Self = Self(0x0040);
    /// Read file attributes.
    pub const READ_ATTRIBUTES: Self = Self(0x0080);
    /// Write file attributes.
    pub const WRITE_ATTRIBUTES: Self = Self(0x0100);
    /// Delete the object itself.
    pub const DELETE: Self = Self(0x10000);
    /// Read the ACL.
    pub const READ_ACL: Self = Self(0x20000);
    /// Write the ACL.
    pub const WRITE_ACL: Self = Self(0x40000);
    /// Change owner.
    pub const WRITE_OWNER: Self = Self(0x80000);
    /// Synchronize.
    pub const SYNCHRONIZE: Self = Self(0x100000);

    /// Every right that applies to a regular file.
    pub const ALL_FILE: Self = Self(
        Self::READ_DATA.0
            | Self::WRITE_DATA.0
            | Self::APPEND_DATA.0
            | Self::READ_NAMED_ATTRS.0
            | Self::WRITE_NAMED_ATTRS.0
            | Self::EXECUTE.0
            | Self::READ_ATTRIBUTES.0
            | Self::WRITE_ATTRIBUTES.0
            | Self::DELETE.0
            | Self::READ_ACL.0
            | Self::WRITE_ACL.0
            | Self::WRITE_OWNER.0
            | Self::SYNCHRONIZE.0,
    );

    /// Every right that applies to a directory.
    pub const ALL_DIRECTORY: Self = Self(Self::ALL_FILE.0 | Self::DELETE_CHILD.0);

    /// Creates a mask from raw value.
    #[must_use]
    pub const fn from_raw(value: u32) -> Self {
        Self(value)
    }

    /// Returns the raw mask value.
    #[must_use]
    pub const fn as_raw(self) -> u32 {
        self.0
    }

    /// Checks if every bit of `other` is set.
    #[must_use]
    pub const fn contains(self, other: Self) -> bool {
        (self.0 & other.0) == other.0
    }

    /// Returns true when no bit is set.
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl BitOr for AccessMask {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for AccessMask {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl BitAnd for AccessMask {
    type Output = Self;

    fn bitand(self, rhs: Self) -> Self {
        Self(self.0 & rhs.0)
    }
}

/// A single access control entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Ace {
    /// Type of entry.
    pub tag: AceTag,
    /// Principal the entry applies to.
    pub principal: Principal,
    /// Access mask (permissions).
    pub mask: AccessMask,
    /// Inheritance flags.
    pub flags: AceFlags,
}

impl Ace {
    /// Creates an allow entry.
    #[must_use]
    pub const fn allow(principal: Principal, mask: AccessMask, flags: AceFlags) -> Self {
        Self {
            tag: AceTag::Allow,
            principal,
            mask,
            flags,
        }
    }

    /// Creates a deny entry.
    #[must_use]
    pub const fn deny(principal: Principal, mask: AccessMask, flags: AceFlags) -> Self {
        Self {
            tag: AceTag::Deny,
            principal,
            mask,
            flags,
        }
    }
}

impl fmt::Display for Ace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} mask={:#x} flags={:#x}",
            self.tag,
            self.principal,
            self.mask.as_raw(),
            self.flags.as_raw()
        )
    }
}

/// An ordered access control list for one object.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Acl {
    entries: Vec<Ace>,
}

const ACE_HEADER_LEN: usize = 16;

impl Acl {
    /// Creates an empty ACL.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Creates an ACL from entries in evaluation order.
    #[must_use]
    pub const fn from_entries(entries: Vec<Ace>) -> Self {
        Self { entries }
    }

    /// Returns the entries in evaluation order.
    #[must_use]
    pub fn entries(&self) -> &[Ace] {
        &self.entries
    }

    /// Appends an entry.
    pub fn push(&mut self, ace: Ace) {
        self.entries.push(ace);
    }

    /// Returns the number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the ACL is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Parses an ACL from its binary representation.
    pub fn from_bytes(data: &[u8]) -> io::Result<Self> {
        let mut entries = Vec::new();
        let mut offset = 0;

        while offset < data.len() {
            if offset + ACE_HEADER_LEN > data.len() {
                return Err(invalid_data("truncated ACE"));
            }
            let tag = read_u32(data, offset);
            let flags = read_u32(data, offset + 4);
            let mask = read_u32(data, offset + 8);
            let who_len = read_u32(data, offset + 12) as usize;
            offset += ACE_HEADER_LEN;

            if offset + who_len > data.len() {
                return Err(invalid_data("truncated ACE who field"));
            }
            let who = std::str::from_utf8(&data[offset..offset + who_len])
                .map_err(|_| invalid_data("invalid UTF-8 in ACE"))?;
            let principal = who
                .parse::<Principal>()
                .map_err(|_| invalid_data(format!("unrecognised ACE principal {who:?}")))?;
            offset += who_len + padding(who_len);

            entries.push(Ace {
                tag: AceTag::from_raw(tag),
                principal,
                mask: AccessMask::from_raw(mask),
                flags: AceFlags::from_raw(flags),
            });
        }

        Ok(Self { entries })
    }

    /// Serializes the ACL to its binary representation.
    #[must_use]
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut data = Vec::with_capacity(self.entries.len() * (ACE_HEADER_LEN + 36 + 4));

        for ace in &self.entries {
            data.extend_from_slice(&ace.tag.as_raw().to_be_bytes());
            data.extend_from_slice(&ace.flags.as_raw().to_be_bytes());
            data.extend_from_slice(&ace.mask.as_raw().to_be_bytes());

            let who = ace.principal.to_string();
            let who_bytes = who.as_bytes();
            data.extend_from_slice(&(who_bytes.len() as u32).to_be_bytes());
            data.extend_from_slice(who_bytes);
            data.extend(std::iter::repeat_n(0u8, padding(who_bytes.len())));
        }

        data
    }
}

impl<'a> IntoIterator for &'a Acl {
    type Item = &'a Ace;
    type IntoIter = std::slice::Iter<'a, Ace>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

impl FromIterator<Ace> for Acl {
    fn from_iter<I: IntoIterator<Item = Ace>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

fn read_u32(data: &[u8], offset: usize) -> u32 {
    let mut word = [0u8; 4];
    word.copy_from_slice(&data[offset..offset + 4]);
    u32::from_be_bytes(word)
}

const fn padding(len: usize) -> usize {
    (4 - (len % 4)) % 4
}

fn invalid_data(message: impl Into<String>) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidData, message.into())
}

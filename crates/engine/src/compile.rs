//! Rule compilation into ACE templates.
//!
//! A template is an [`Ace`] without [`AceFlags::INHERITED`]; the reconciler
//! sets that flag per object depending on where the producing rule is rooted.
//!
//! | Rights      | File mask                                   | Directory mask |
//! |-------------|---------------------------------------------|----------------|
//! | `ReadOnly`  | read attributes, read xattrs, read data     | read attributes, read xattrs, list, search |
//! | `ReadWrite` | above + delete, write attributes/xattrs, write data, append | above + delete, write attributes/xattrs, add file, add subdirectory, delete child |
//!
//! Directory templates carry `FILE_INHERIT | DIRECTORY_INHERIT`; file
//! templates carry no flags.

use metadata::{AccessMask, Ace, AceFlags, Principal};
use rules::Rights;

use crate::ObjectKind;

/// A rule whose principal has been resolved.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ResolvedRule {
    /// Who is granted access.
    pub principal: Principal,
    /// What access is granted.
    pub rights: Rights,
}

impl ResolvedRule {
    /// Creates a resolved rule.
    #[must_use]
    pub const fn new(principal: Principal, rights: Rights) -> Self {
        Self { principal, rights }
    }
}

/// Flags carried by every directory template.
pub const DIRECTORY_FLAGS: AceFlags =
    AceFlags::from_raw(AceFlags::FILE_INHERIT.as_raw() | AceFlags::DIRECTORY_INHERIT.as_raw());

const READ_COMMON: AccessMask = AccessMask::from_raw(
    AccessMask::READ_ATTRIBUTES.as_raw() | AccessMask::READ_NAMED_ATTRS.as_raw(),
);

const WRITE_COMMON: AccessMask = AccessMask::from_raw(
    AccessMask::DELETE.as_raw()
        | AccessMask::WRITE_ATTRIBUTES.as_raw()
        | AccessMask::WRITE_NAMED_ATTRS.as_raw(),
);

/// Access mask granted on regular files.
#[must_use]
pub fn file_mask(rights: Rights) -> AccessMask {
    let read = READ_COMMON | AccessMask::READ_DATA;
    match rights {
        Rights::ReadOnly => read,
        Rights::ReadWrite => read | WRITE_COMMON | AccessMask::WRITE_DATA | AccessMask::APPEND_DATA,
    }
}

/// Access mask granted on directories.
#[must_use]
pub fn directory_mask(rights: Rights) -> AccessMask {
    let read = READ_COMMON | AccessMask::LIST_DIRECTORY | AccessMask::SEARCH;
    match rights {
        Rights::ReadOnly => read,
        Rights::ReadWrite => {
            read | WRITE_COMMON
                | AccessMask::ADD_FILE
                | AccessMask::ADD_SUBDIRECTORY
                | AccessMask::DELETE_CHILD
        }
    }
}

/// Compiles one rule into its `(file, directory)` templates.
#[must_use]
pub fn compile(rule: &ResolvedRule) -> (Ace, Ace) {
    (
        Ace::allow(rule.principal, file_mask(rule.rights), AceFlags::NONE),
        Ace::allow(rule.principal, directory_mask(rule.rights), DIRECTORY_FLAGS),
    )
}

/// Templates produced by all rules of one path.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CompiledRuleSet {
    file: Vec<Ace>,
    directory: Vec<Ace>,
}

impl CompiledRuleSet {
    /// Templates applied to regular files.
    #[must_use]
    pub fn file_templates(&self) -> &[Ace] {
        &self.file
    }

    /// Templates applied to directories.
    #[must_use]
    pub fn directory_templates(&self) -> &[Ace] {
        &self.directory
    }

    /// Templates applied to objects of `kind`.
    #[must_use]
    pub fn templates(&self, kind: ObjectKind) -> &[Ace] {
        match kind {
            ObjectKind::File => &self.file,
            ObjectKind::Directory => &self.directory,
        }
    }

    /// Returns true when the set grants nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.file.is_empty() && self.directory.is_empty()
    }
}

/// Compiles every rule of one path.
///
/// Rules naming the same principal are merged into one template per kind by
/// uniting their masks, so read-write dominates read-only. Templates appear in
/// the order their principal was first named.
#[must_use]
pub fn compile_rule_set(rules: &[ResolvedRule]) -> CompiledRuleSet {
    let mut set = CompiledRuleSet::default();
    for rule in rules {
        let (file, directory) = compile(rule);
        merge(&mut set.file, file);
        merge(&mut set.directory, directory);
    }
    set
}

fn merge(templates: &mut Vec<Ace>, ace: Ace) {
    match templates.iter_mut().find(|t| t.principal == ace.principal) {
        Some(existing) => existing.mask |= ace.mask,
        None => templates.push(ace),
    }
}

/// Compiles the administrative override: an allow entry with every right.
#[must_use]
pub fn compile_admin(principal: Principal) -> CompiledRuleSet {
    CompiledRuleSet {
        file: vec![Ace::allow(principal, AccessMask::ALL_FILE, AceFlags::NONE)],
        directory: vec![Ace::allow(principal, AccessMask::ALL_DIRECTORY, DIRECTORY_FLAGS)],
    }
}

/// Compiles the closing deny entry for the "everyone" group.
#[must_use]
pub fn compile_deny_everyone() -> CompiledRuleSet {
    let everyone = Principal::EVERYONE;
    CompiledRuleSet {
        file: vec![Ace::deny(everyone, AccessMask::ALL_FILE, AceFlags::NONE)],
        directory: vec![Ace::deny(everyone, AccessMask::ALL_DIRECTORY, DIRECTORY_FLAGS)],
    }
}

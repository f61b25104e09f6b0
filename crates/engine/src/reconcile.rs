//! Per-object ACL reconciliation.
//!
//! The desired ACL of an object is built in four layers:
//!
//! 1. existing entries whose principal is whitelisted, in their original order;
//! 2. the administrative override, if configured;
//! 3. the rule layers of the ancestor chain, root to leaf;
//! 4. the closing deny entry for "everyone", if configured.
//!
//! Every other existing entry is dropped. `INHERITED` is cleared on an entry
//! exactly when the object is the path the entry is rooted at: the rule's
//! home path for rule layers, the traversal root for the override and the
//! closing deny.

use std::collections::HashSet;
use std::fmt;
use std::path::Path;

use logging::trace_acl;
use metadata::{Ace, AclStore, Acl, Principal};

use crate::compile::{CompiledRuleSet, compile_admin, compile_deny_everyone};
use crate::index::ChainLink;
use crate::{EngineError, EngineResult, ObjectKind};

/// Which layers a run applies.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Mode {
    /// Strip and apply every layer.
    #[default]
    Reconcile,
    /// Strip non-whitelisted entries only.
    StripOnly,
}

/// A filesystem object about to be reconciled.
#[derive(Clone, Copy, Debug)]
pub struct ReconcileObject<'a> {
    /// Absolute path.
    pub path: &'a Path,
    /// File or directory.
    pub kind: ObjectKind,
    /// True for the root of the current traversal.
    pub is_traversal_root: bool,
}

/// Result of reconciling one object.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// The current ACL already matches.
    Unchanged,
    /// The ACL was rewritten.
    Updated,
    /// The ACL differs but dry-run suppressed the write.
    WouldUpdate,
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unchanged => f.write_str("unchanged"),
            Self::Updated => f.write_str("updated"),
            Self::WouldUpdate => f.write_str("would update"),
        }
    }
}

/// Computes and commits desired ACLs.
#[derive(Clone, Debug, Default)]
pub struct AclReconciler {
    whitelist: HashSet<Principal>,
    admin: Option<CompiledRuleSet>,
    deny_everyone: Option<CompiledRuleSet>,
    mode: Mode,
    dry_run: bool,
}

impl AclReconciler {
    /// Creates a reconciler preserving entries of `whitelist`.
    #[must_use]
    pub fn new(whitelist: impl IntoIterator<Item = Principal>) -> Self {
        Self {
            whitelist: whitelist.into_iter().collect(),
            ..Self::default()
        }
    }

    /// Grants `principal` every right, rooted at the traversal root.
    #[must_use]
    pub fn admin(mut self, principal: Option<Principal>) -> Self {
        self.admin = principal.map(compile_admin);
        self
    }

    /// Closes every ACL with a deny entry for "everyone".
    #[must_use]
    pub fn deny_everyone(mut self, enabled: bool) -> Self {
        self.deny_everyone = enabled.then(compile_deny_everyone);
        self
    }

    /// Selects the layers to apply.
    #[must_use]
    pub const fn mode(mut self, mode: Mode) -> Self {
        self.mode = mode;
        self
    }

    /// Suppresses writes.
    #[must_use]
    pub const fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Computes the ACL `object` should carry given its `current` ACL.
    ///
    /// Fails without side effects when `current` holds an entry that is
    /// neither allow nor deny.
    pub fn desired_acl(
        &self,
        current: &Acl,
        object: &ReconcileObject<'_>,
        chain: &[ChainLink<'_>],
    ) -> EngineResult<Acl> {
        if let Some(ace) = current.entries().iter().find(|ace| !ace.tag.is_interpretable()) {
            return Err(EngineError::UnsupportedEntry {
                path: object.path.to_path_buf(),
                tag: ace.tag,
                principal: ace.principal,
            });
        }

        let generated = self.generated(object, chain);
        let preserved = current
            .entries()
            .iter()
            .filter(|ace| self.whitelist.contains(&ace.principal) && !generated.contains(ace))
            .copied();

        let stripped = current
            .entries()
            .iter()
            .filter(|ace| !self.whitelist.contains(&ace.principal))
            .count();
        if stripped > 0 {
            trace_acl!(stripped, "stripping entries from {}", object.path.display());
        }

        Ok(preserved.chain(generated.iter().copied()).collect())
    }

    fn generated(&self, object: &ReconcileObject<'_>, chain: &[ChainLink<'_>]) -> Vec<Ace> {
        let mut generated = Vec::new();
        if self.mode == Mode::StripOnly {
            return generated;
        }

        let at_root = object.is_traversal_root;
        if let Some(admin) = &self.admin {
            overlay(&mut generated, admin, object.kind, !at_root);
        }
        for link in chain {
            overlay(&mut generated, link.rule_set, object.kind, !link.is_home);
        }
        if let Some(deny) = &self.deny_everyone {
            overlay(&mut generated, deny, object.kind, !at_root);
        }
        generated
    }

    /// Reads, diffs, and (unless dry-run) writes the ACL of one object.
    pub fn reconcile<S: AclStore + ?Sized>(
        &self,
        store: &mut S,
        object: &ReconcileObject<'_>,
        chain: &[ChainLink<'_>],
    ) -> EngineResult<Outcome> {
        let current = store.read(object.path)?.unwrap_or_default();
        let desired = self.desired_acl(&current, object, chain)?;

        if store.canonical_bytes(&current) == store.canonical_bytes(&desired) {
            return Ok(Outcome::Unchanged);
        }

        trace_acl!(
            "{}: {} -> {} entries",
            object.path.display(),
            current.len(),
            desired.len()
        );
        if self.dry_run {
            return Ok(Outcome::WouldUpdate);
        }
        store.write(object.path, &desired)?;
        Ok(Outcome::Updated)
    }
}

fn overlay(out: &mut Vec<Ace>, set: &CompiledRuleSet, kind: ObjectKind, inherited: bool) {
    out.extend(set.templates(kind).iter().map(|template| Ace {
        flags: template.flags.with_inherited(inherited),
        ..*template
    }));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compile::{DIRECTORY_FLAGS, ResolvedRule, directory_mask, file_mask};
    use crate::index::RuleIndex;
    use metadata::{AccessMask, AceFlags, AceTag, MemoryAclStore};
    use rules::Rights;
    use std::path::PathBuf;

    fn alice() -> Principal {
        Principal::from_uid(501)
    }

    fn staff() -> Principal {
        Principal::from_gid(20)
    }

    fn spotlight() -> Principal {
        Principal::from_uid(89)
    }

    fn stranger() -> Principal {
        Principal::from_uid(666)
    }

    fn share_index() -> RuleIndex {
        RuleIndex::build([
            (
                PathBuf::from("/srv/share"),
                vec![ResolvedRule::new(alice(), Rights::ReadWrite)],
            ),
            (
                PathBuf::from("/srv/share/reports"),
                vec![ResolvedRule::new(staff(), Rights::ReadOnly)],
            ),
        ])
    }

    fn object(path: &str, kind: ObjectKind, root: bool) -> ReconcileObject<'_> {
        ReconcileObject {
            path: Path::new(path),
            kind,
            is_traversal_root: root,
        }
    }

    #[test]
    fn rule_layers_are_inherited_below_home() {
        let index = share_index();
        let reconciler = AclReconciler::new([]);
        let target = object("/srv/share/reports/q1.pdf", ObjectKind::File, false);
        let chain = index.ancestor_chain(target.path);

        let acl = reconciler.desired_acl(&Acl::new(), &target, &chain).unwrap();
        assert_eq!(
            acl.entries(),
            [
                Ace::allow(alice(), file_mask(Rights::ReadWrite), AceFlags::INHERITED),
                Ace::allow(staff(), file_mask(Rights::ReadOnly), AceFlags::INHERITED),
            ]
        );
    }

    #[test]
    fn home_directory_entry_is_not_inherited() {
        let index = share_index();
        let reconciler = AclReconciler::new([]);
        let target = object("/srv/share/reports", ObjectKind::Directory, false);
        let chain = index.ancestor_chain(target.path);

        let acl = reconciler.desired_acl(&Acl::new(), &target, &chain).unwrap();
        assert_eq!(acl.entries()[0].flags, DIRECTORY_FLAGS | AceFlags::INHERITED);
        assert_eq!(acl.entries()[1].flags, DIRECTORY_FLAGS);
        assert_eq!(acl.entries()[1].mask, directory_mask(Rights::ReadOnly));
    }

    #[test]
    fn whitelisted_entries_survive_in_front() {
        let index = share_index();
        let reconciler = AclReconciler::new([spotlight()]);
        let target = object("/srv/share/a.txt", ObjectKind::File, false);
        let chain = index.ancestor_chain(target.path);
        let spotlight_ace = Ace::allow(spotlight(), AccessMask::READ_DATA, AceFlags::NONE);
        let current = Acl::from_entries(vec![
            Ace::allow(stranger(), AccessMask::ALL_FILE, AceFlags::NONE),
            spotlight_ace,
        ]);

        let acl = reconciler.desired_acl(&current, &target, &chain).unwrap();
        assert_eq!(acl.len(), 2);
        assert_eq!(acl.entries()[0], spotlight_ace);
        assert_eq!(acl.entries()[1].principal, alice());
    }

    #[test]
    fn whitelisted_duplicate_of_generated_entry_is_dropped() {
        let index = share_index();
        let reconciler = AclReconciler::new([alice()]);
        let target = object("/srv/share/a.txt", ObjectKind::File, false);
        let chain = index.ancestor_chain(target.path);
        let generated = Ace::allow(alice(), file_mask(Rights::ReadWrite), AceFlags::INHERITED);
        let current = Acl::from_entries(vec![generated]);

        let acl = reconciler.desired_acl(&current, &target, &chain).unwrap();
        assert_eq!(acl.entries(), [generated]);
    }

    #[test]
    fn admin_and_deny_wrap_the_rule_layers() {
        let index = share_index();
        let admin = Principal::from_uid(0);
        let reconciler = AclReconciler::new([]).admin(Some(admin)).deny_everyone(true);
        let root = object("/srv/share", ObjectKind::Directory, true);
        let chain = index.ancestor_chain(root.path);

        let acl = reconciler.desired_acl(&Acl::new(), &root, &chain).unwrap();
        let entries = acl.entries();
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0], Ace::allow(admin, AccessMask::ALL_DIRECTORY, DIRECTORY_FLAGS));
        assert_eq!(entries[1].principal, alice());
        assert_eq!(
            entries[2],
            Ace::deny(Principal::EVERYONE, AccessMask::ALL_DIRECTORY, DIRECTORY_FLAGS)
        );

        let child = object("/srv/share/a.txt", ObjectKind::File, false);
        let acl = reconciler
            .desired_acl(&Acl::new(), &child, &index.ancestor_chain(child.path))
            .unwrap();
        assert!(acl.entries()[0].flags.contains(AceFlags::INHERITED));
        assert!(acl.entries()[2].flags.contains(AceFlags::INHERITED));
        assert_eq!(acl.entries()[2].tag, AceTag::Deny);
    }

    #[test]
    fn strip_only_keeps_whitelist_and_nothing_else() {
        let index = share_index();
        let reconciler = AclReconciler::new([spotlight()])
            .admin(Some(Principal::from_uid(0)))
            .mode(Mode::StripOnly);
        let target = object("/srv/share", ObjectKind::Directory, true);
        let keep = Ace::allow(spotlight(), AccessMask::READ_DATA, AceFlags::NONE);
        let current = Acl::from_entries(vec![
            Ace::allow(alice(), AccessMask::READ_DATA, AceFlags::NONE),
            keep,
        ]);

        let acl = reconciler
            .desired_acl(&current, &target, &index.ancestor_chain(target.path))
            .unwrap();
        assert_eq!(acl.entries(), [keep]);
    }

    #[test]
    fn non_allow_deny_entries_are_fatal_even_when_whitelisted() {
        let reconciler = AclReconciler::new([spotlight()]);
        let target = object("/srv/share", ObjectKind::Directory, true);
        let current = Acl::from_entries(vec![Ace {
            tag: AceTag::Audit,
            principal: spotlight(),
            mask: AccessMask::READ_DATA,
            flags: AceFlags::NONE,
        }]);

        let error = reconciler.desired_acl(&current, &target, &[]).unwrap_err();
        assert!(matches!(
            error,
            EngineError::UnsupportedEntry { tag: AceTag::Audit, .. }
        ));
    }

    #[test]
    fn reconcile_writes_once_then_reports_unchanged() {
        let index = share_index();
        let reconciler = AclReconciler::new([]);
        let mut store = MemoryAclStore::new();
        let target = object("/srv/share/a.txt", ObjectKind::File, false);
        let chain = index.ancestor_chain(target.path);

        assert_eq!(
            reconciler.reconcile(&mut store, &target, &chain).unwrap(),
            Outcome::Updated
        );
        assert_eq!(
            reconciler.reconcile(&mut store, &target, &chain).unwrap(),
            Outcome::Unchanged
        );
        assert_eq!(store.writes().len(), 1);
    }

    #[test]
    fn absent_acl_equals_empty_desired_acl() {
        let reconciler = AclReconciler::new([]);
        let mut store = MemoryAclStore::new();
        let target = object("/elsewhere", ObjectKind::File, true);

        assert_eq!(
            reconciler.reconcile(&mut store, &target, &[]).unwrap(),
            Outcome::Unchanged
        );
        assert!(store.writes().is_empty());
    }

    #[test]
    fn dry_run_reports_without_writing() {
        let index = share_index();
        let reconciler = AclReconciler::new([]).dry_run(true);
        let mut store = MemoryAclStore::new();
        let target = object("/srv/share", ObjectKind::Directory, true);

        let outcome = reconciler
            .reconcile(&mut store, &target, &index.ancestor_chain(target.path))
            .unwrap();
        assert_eq!(outcome, Outcome::WouldUpdate);
        assert!(store.writes().is_empty());
    }

    #[test]
    fn write_failure_is_fatal() {
        let index = share_index();
        let reconciler = AclReconciler::new([]);
        let mut store = MemoryAclStore::new();
        store.fail_writes_to("/srv/share");
        let target = object("/srv/share", ObjectKind::Directory, true);

        let error = reconciler
            .reconcile(&mut store, &target, &index.ancestor_chain(target.path))
            .unwrap_err();
        assert!(matches!(error, EngineError::Metadata(_)));
    }
}

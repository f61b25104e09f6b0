#![deny(unsafe_code)]
#![deny(missing_docs)]

//! # Overview
//!
//! `engine` reconciles filesystem ACLs with a declarative rule set. Given the
//! rule entries loaded by the `rules` crate it computes, for every object
//! under each rule path, the ACL that object should carry and writes it when
//! it differs from what is there.
//!
//! # Design
//!
//! The pipeline is split into pure stages and one effectful driver:
//!
//! - [`compile_rule_set`] turns the rules of one path into ACE templates for
//!   files and for directories.
//! - [`RuleIndex`] maps each rule path to its templates;
//!   [`AncestorResolver`] returns the root-to-leaf chain of rule layers that
//!   govern any path.
//! - [`AclReconciler`] strips non-whitelisted entries, overlays the
//!   administrative override, the rule layers, and the closing deny, and
//!   compares the result with the current ACL byte for byte.
//! - [`plan_roots`] orders traversal roots and drops nested ones.
//! - [`run`] ties the stages together over a directory walk.
//!
//! # Invariants
//!
//! - Running twice with the same inputs writes nothing the second time.
//! - Entries of whitelisted principals are never removed.
//! - `INHERITED` is set on an entry exactly when the object lies strictly
//!   below the path that entry is rooted at.
//!
//! # Errors
//!
//! All failures surface as [`EngineError`]. Its
//! [`exit_code`](EngineError::exit_code) classifies the failure for the
//! command-line front-end.

mod compile;
mod error;
mod index;
mod plan;
mod reconcile;
mod run;

pub use compile::{
    CompiledRuleSet, DIRECTORY_FLAGS, ResolvedRule, compile, compile_admin, compile_deny_everyone,
    compile_rule_set, directory_mask, file_mask,
};
pub use error::{EngineError, EngineResult};
pub use index::{AncestorResolver, ChainLink, RuleIndex};
pub use plan::plan_roots;
pub use reconcile::{AclReconciler, Mode, Outcome, ReconcileObject};
pub use run::{RunOptions, RunSummary, run};

use walk::EntryKind;

/// Kinds of object whose ACL is reconciled.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ObjectKind {
    /// A regular file.
    File,
    /// A directory.
    Directory,
}

impl ObjectKind {
    /// Maps a walker classification; `None` for anything that is skipped.
    #[must_use]
    pub const fn from_entry_kind(kind: EntryKind) -> Option<Self> {
        match kind {
            EntryKind::File => Some(Self::File),
            EntryKind::Directory => Some(Self::Directory),
            EntryKind::Other => None,
        }
    }
}

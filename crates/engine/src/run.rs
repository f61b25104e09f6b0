//! Run driver: resolve, compile, plan, walk, reconcile.

use std::fmt;

use logging::{trace_name, trace_skip, trace_stats};
use metadata::{AclStore, Principal, PrincipalResolver};
use rules::{PrincipalRef, RuleEntry};
use walk::WalkBuilder;

use crate::compile::ResolvedRule;
use crate::index::{AncestorResolver, RuleIndex};
use crate::plan::plan_roots;
use crate::reconcile::{AclReconciler, Mode, Outcome, ReconcileObject};
use crate::{EngineError, EngineResult, ObjectKind};

/// Settings of one run.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RunOptions {
    /// Principal granted every right below each traversal root.
    pub admin: Option<PrincipalRef>,
    /// Principals whose existing entries are preserved.
    pub whitelist: Vec<PrincipalRef>,
    /// Close every ACL with a deny entry for "everyone".
    pub deny_everyone: bool,
    /// Which layers to apply.
    pub mode: Mode,
    /// Compute but do not write.
    pub dry_run: bool,
}

/// Per-run counters.
///
/// `visited` counts every object enumerated; each is either `updated`,
/// `unchanged`, or `skipped`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Objects enumerated.
    pub visited: usize,
    /// Objects whose ACL was (or, in dry-run, would be) rewritten.
    pub updated: usize,
    /// Objects already matching.
    pub unchanged: usize,
    /// Objects that are neither files nor directories.
    pub skipped: usize,
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "visited {}, updated {}, unchanged {}, skipped {}",
            self.visited, self.updated, self.unchanged, self.skipped
        )
    }
}

fn resolve<R: PrincipalResolver + ?Sized>(
    resolver: &R,
    principal: &PrincipalRef,
) -> EngineResult<Principal> {
    resolver
        .resolve(principal.kind, &principal.name)
        .map_err(|source| EngineError::Resolve {
            principal: principal.clone(),
            source,
        })
}

/// Applies `entries` to the filesystem.
///
/// Every principal is resolved before the first ACL is read, so a
/// configuration error never leaves a partially reconciled tree. After that
/// the first failure stops the run; objects already written keep their new
/// ACL.
pub fn run<R, S>(
    entries: &[RuleEntry],
    options: &RunOptions,
    resolver: &R,
    store: &mut S,
) -> EngineResult<RunSummary>
where
    R: PrincipalResolver + ?Sized,
    S: AclStore + ?Sized,
{
    let whitelist = options
        .whitelist
        .iter()
        .map(|principal| resolve(resolver, principal))
        .collect::<EngineResult<Vec<_>>>()?;
    let admin = options
        .admin
        .as_ref()
        .map(|principal| resolve(resolver, principal))
        .transpose()?;

    let mut resolved = Vec::with_capacity(entries.len());
    for entry in entries {
        let rules = entry
            .rules()
            .iter()
            .map(|rule| {
                resolve(resolver, &rule.principal)
                    .map(|principal| ResolvedRule::new(principal, rule.rights))
            })
            .collect::<EngineResult<Vec<_>>>()?;
        resolved.push((entry.path().to_path_buf(), rules));
    }

    let index = RuleIndex::build(resolved);
    let roots = plan_roots(index.paths());
    let reconciler = AclReconciler::new(whitelist)
        .admin(admin)
        .deny_everyone(options.deny_everyone)
        .mode(options.mode)
        .dry_run(options.dry_run);
    let mut chains = AncestorResolver::new(&index);
    let mut summary = RunSummary::default();

    for root in &roots {
        for entry in WalkBuilder::new(root).build()? {
            let entry = entry?;
            summary.visited += 1;

            let Some(kind) = ObjectKind::from_entry_kind(entry.kind()) else {
                trace_skip!(
                    "skipping {}: not a regular file or directory",
                    entry.full_path().display()
                );
                summary.skipped += 1;
                continue;
            };

            let object = ReconcileObject {
                path: entry.full_path(),
                kind,
                is_traversal_root: entry.is_root(),
            };
            let chain = match options.mode {
                Mode::Reconcile => chains.chain(object.path),
                Mode::StripOnly => Vec::new(),
            };

            match reconciler.reconcile(store, &object, &chain)? {
                Outcome::Unchanged => {
                    summary.unchanged += 1;
                    tracing::trace!(target: "chacl::name", "unchanged {}", object.path.display());
                }
                outcome @ (Outcome::Updated | Outcome::WouldUpdate) => {
                    summary.updated += 1;
                    trace_name!("{outcome} {}", object.path.display());
                }
            }
        }
    }

    trace_stats!("{summary}");
    Ok(summary)
}

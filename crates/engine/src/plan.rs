//! Traversal root planning.
//!
//! Roots are visited shortest path first. A candidate lying component-wise
//! under an accepted root is dropped: the enclosing traversal already visits
//! it, and visiting it again as a root of its own would clear `INHERITED` on
//! the override entries there while the enclosing traversal sets it.

use std::path::{Path, PathBuf};

use logging::trace_plan;

/// Orders `paths` and drops duplicates and covered descendants.
///
/// Sorting is by byte length of the path, ties broken by byte order, so the
/// result is the same for any input order.
#[must_use]
pub fn plan_roots<I, P>(paths: I) -> Vec<PathBuf>
where
    I: IntoIterator<Item = P>,
    P: AsRef<Path>,
{
    let mut candidates: Vec<PathBuf> = paths
        .into_iter()
        .map(|path| path.as_ref().to_path_buf())
        .collect();
    candidates.sort_by(|a, b| {
        a.as_os_str()
            .len()
            .cmp(&b.as_os_str().len())
            .then_with(|| a.as_os_str().cmp(b.as_os_str()))
    });

    let mut roots: Vec<PathBuf> = Vec::new();
    for candidate in candidates {
        if let Some(cover) = roots.iter().find(|root| candidate.starts_with(root)) {
            trace_plan!(
                "{} is covered by traversal root {}",
                candidate.display(),
                cover.display()
            );
            continue;
        }
        trace_plan!("traversal root {}", candidate.display());
        roots.push(candidate);
    }
    roots
}

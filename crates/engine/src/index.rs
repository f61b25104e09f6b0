//! Path-keyed rule lookup and ancestor chain resolution.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use crate::compile::{CompiledRuleSet, ResolvedRule, compile_rule_set};

/// One rule layer governing an object.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ChainLink<'a> {
    /// Path the rules are attached to.
    pub home: &'a Path,
    /// The compiled rules.
    pub rule_set: &'a CompiledRuleSet,
    /// True when the object is the home path itself.
    pub is_home: bool,
}

/// Exact path to compiled rule set.
#[derive(Clone, Debug, Default)]
pub struct RuleIndex {
    homes: Vec<(PathBuf, CompiledRuleSet)>,
    by_path: HashMap<PathBuf, usize>,
}

impl RuleIndex {
    /// Builds the index; a later entry for the same path replaces an earlier one.
    pub fn build<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (PathBuf, Vec<ResolvedRule>)>,
    {
        let mut index = Self::default();
        for (path, rules) in entries {
            let set = compile_rule_set(&rules);
            match index.by_path.get(&path) {
                Some(&slot) => index.homes[slot].1 = set,
                None => {
                    index.by_path.insert(path.clone(), index.homes.len());
                    index.homes.push((path, set));
                }
            }
        }
        index
    }

    /// Rules attached exactly to `path`.
    #[must_use]
    pub fn get(&self, path: &Path) -> Option<&CompiledRuleSet> {
        self.slot(path).map(|slot| &self.homes[slot].1)
    }

    /// Paths carrying rules, in insertion order.
    pub fn paths(&self) -> impl Iterator<Item = &Path> {
        self.homes.iter().map(|(path, _)| path.as_path())
    }

    /// Number of governed paths.
    #[must_use]
    pub fn len(&self) -> usize {
        self.homes.len()
    }

    /// Returns true when no path carries rules.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.homes.is_empty()
    }

    /// Every rule layer governing `path`, root to leaf.
    ///
    /// Walks the ancestors of `path` without caching; see [`AncestorResolver`]
    /// for the memoizing variant used during traversal.
    #[must_use]
    pub fn ancestor_chain(&self, path: &Path) -> Vec<ChainLink<'_>> {
        let mut slots: Vec<usize> = path.ancestors().filter_map(|a| self.slot(a)).collect();
        slots.reverse();
        self.links(&slots, path)
    }

    fn slot(&self, path: &Path) -> Option<usize> {
        self.by_path.get(path).copied()
    }

    fn links(&self, slots: &[usize], object: &Path) -> Vec<ChainLink<'_>> {
        slots
            .iter()
            .map(|&slot| {
                let (home, rule_set) = &self.homes[slot];
                ChainLink {
                    home,
                    rule_set,
                    is_home: home == object,
                }
            })
            .collect()
    }
}

/// Ancestor chain lookup that follows a depth-first walk.
///
/// The resolver keeps one frame per directory between the filesystem root and
/// the parent of the last object it resolved. Siblings reuse their parent's
/// frame, and leaving a subtree drops its frames, so the state never grows
/// past the depth of the tree.
#[derive(Debug)]
pub struct AncestorResolver<'a> {
    index: &'a RuleIndex,
    frames: Vec<(PathBuf, Rc<[usize]>)>,
}

impl<'a> AncestorResolver<'a> {
    /// Creates a resolver over `index`.
    #[must_use]
    pub fn new(index: &'a RuleIndex) -> Self {
        Self {
            index,
            frames: Vec::new(),
        }
    }

    /// Every rule layer governing `path`, root to leaf.
    pub fn chain(&mut self, path: &Path) -> Vec<ChainLink<'a>> {
        let mut slots = match path.parent() {
            Some(parent) => self.enter(parent).to_vec(),
            None => Vec::new(),
        };
        if let Some(slot) = self.index.slot(path) {
            slots.push(slot);
        }
        self.index.links(&slots, path)
    }

    /// Number of directory frames currently held.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    /// Pops frames outside `dir`, then pushes the ones leading down to it.
    fn enter(&mut self, dir: &Path) -> Rc<[usize]> {
        while let Some((top, _)) = self.frames.last() {
            if dir.starts_with(top) {
                break;
            }
            self.frames.pop();
        }

        let held = self
            .frames
            .last()
            .map_or(0, |(top, _)| top.components().count());
        let missing: Vec<&Path> = dir
            .ancestors()
            .take_while(|ancestor| ancestor.components().count() > held)
            .collect();
        for ancestor in missing.into_iter().rev() {
            let mut slots = self
                .frames
                .last()
                .map(|(_, slots)| slots.to_vec())
                .unwrap_or_default();
            if let Some(slot) = self.index.slot(ancestor) {
                slots.push(slot);
            }
            self.frames.push((ancestor.to_path_buf(), slots.into()));
        }

        self.frames
            .last()
            .map_or_else(|| Rc::from(Vec::new()), |(_, slots)| Rc::clone(slots))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use metadata::Principal;
    use rules::Rights;

    fn rule(uid: u32) -> Vec<ResolvedRule> {
        vec![ResolvedRule::new(Principal::from_uid(uid), Rights::ReadOnly)]
    }

    fn index() -> RuleIndex {
        RuleIndex::build([
            (PathBuf::from("/srv/share"), rule(1)),
            (PathBuf::from("/srv/share/reports"), rule(2)),
            (PathBuf::from("/srv/other"), rule(3)),
        ])
    }

    fn homes(chain: &[ChainLink<'_>]) -> Vec<(PathBuf, bool)> {
        chain
            .iter()
            .map(|link| (link.home.to_path_buf(), link.is_home))
            .collect()
    }

    #[test]
    fn chain_is_root_to_leaf_with_home_marked() {
        let index = index();
        let chain = index.ancestor_chain(Path::new("/srv/share/reports"));
        assert_eq!(
            homes(&chain),
            [
                (PathBuf::from("/srv/share"), false),
                (PathBuf::from("/srv/share/reports"), true),
            ]
        );
    }

    #[test]
    fn descendants_inherit_every_layer() {
        let index = index();
        let chain = index.ancestor_chain(Path::new("/srv/share/reports/q1.pdf"));
        assert_eq!(chain.len(), 2);
        assert!(chain.iter().all(|link| !link.is_home));
    }

    #[test]
    fn ungoverned_paths_have_empty_chain() {
        let index = index();
        assert!(index.ancestor_chain(Path::new("/srv")).is_empty());
        assert!(index.ancestor_chain(Path::new("/srv/shared")).is_empty());
    }

    #[test]
    fn later_entries_replace_earlier_ones() {
        let index = RuleIndex::build([
            (PathBuf::from("/a"), rule(1)),
            (PathBuf::from("/a"), rule(2)),
        ]);
        assert_eq!(index.len(), 1);
        let set = index.get(Path::new("/a")).unwrap();
        assert_eq!(set.file_templates()[0].principal, Principal::from_uid(2));
    }

    #[test]
    fn resolver_matches_uncached_chain() {
        let index = index();
        let mut resolver = AncestorResolver::new(&index);

        for path in [
            "/srv/share",
            "/srv/share/a.txt",
            "/srv/share/reports",
            "/srv/share/reports/q1.pdf",
            "/srv/share/reports/q2.pdf",
            "/srv/other/x",
            "/elsewhere",
        ] {
            let path = Path::new(path);
            assert_eq!(resolver.chain(path), index.ancestor_chain(path), "{path:?}");
        }
    }

    #[test]
    fn siblings_reuse_parent_frame() {
        let index = index();
        let mut resolver = AncestorResolver::new(&index);

        resolver.chain(Path::new("/srv/share/reports/q1.pdf"));
        assert_eq!(resolver.depth(), 4);
        resolver.chain(Path::new("/srv/share/reports/q2.pdf"));
        assert_eq!(resolver.depth(), 4);
    }

    #[test]
    fn leaving_a_subtree_drops_its_frames() {
        let index = index();
        let mut resolver = AncestorResolver::new(&index);

        for name in ["a", "b", "c"] {
            let deep = format!("/srv/share/{name}/x/y/z/file");
            resolver.chain(Path::new(&deep));
            assert_eq!(resolver.depth(), 7);
        }

        let chain = resolver.chain(Path::new("/srv/other/file"));
        assert_eq!(resolver.depth(), 3);
        assert_eq!(homes(&chain), [(PathBuf::from("/srv/other"), false)]);
    }

    #[test]
    fn relative_paths_resolve_like_absolute_ones() {
        let index = RuleIndex::build([(PathBuf::from("share"), rule(1))]);
        let mut resolver = AncestorResolver::new(&index);

        assert_eq!(resolver.chain(Path::new("share")).len(), 1);
        assert_eq!(resolver.chain(Path::new("share/a")).len(), 1);
        assert!(resolver.chain(Path::new("other/a")).is_empty());
    }
}

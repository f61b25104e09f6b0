use crate::entry::{EntryKind, WalkEntry};
use crate::error::{WalkError, WalkStage};
use logging::trace_walk;
use std::env;
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use std::vec;

/// Depth-first, name-ordered iterator over the objects below a root.
///
/// A directory is yielded before its children and siblings are visited in
/// byte order of their names, so two walks over an unchanged tree produce the
/// same sequence. Symbolic links are reported as [`EntryKind::Other`] and
/// never descended into. The first error ends the iteration.
#[derive(Debug)]
pub struct Walker {
    root: PathBuf,
    pending_root: Option<EntryKind>,
    open: Vec<OpenDir>,
    failed: bool,
}

/// A directory whose remaining children have not been yielded yet.
#[derive(Debug)]
struct OpenDir {
    path: PathBuf,
    relative: PathBuf,
    depth: usize,
    names: vec::IntoIter<OsString>,
}

impl OpenDir {
    fn list(path: PathBuf, relative: PathBuf, depth: usize) -> Result<Self, WalkError> {
        let listing = fs::read_dir(&path)
            .map_err(|e| WalkError::new(WalkStage::ReadDir, path.clone(), e))?;
        let mut names = listing
            .map(|entry| entry.map(|entry| entry.file_name()))
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| WalkError::new(WalkStage::ReadEntry, path.clone(), e))?;
        names.sort();
        trace_walk!("{} entries in {}", names.len(), path.display());

        Ok(Self {
            path,
            relative,
            depth,
            names: names.into_iter(),
        })
    }
}

fn classify(path: &Path, stage: WalkStage) -> Result<EntryKind, WalkError> {
    fs::symlink_metadata(path)
        .map(|metadata| EntryKind::from_file_type(metadata.file_type()))
        .map_err(|e| WalkError::new(stage, path.to_path_buf(), e))
}

impl Walker {
    pub(crate) fn new(root: PathBuf, include_root: bool) -> Result<Self, WalkError> {
        let root = if root.is_absolute() {
            root
        } else {
            env::current_dir()
                .map_err(|e| WalkError::new(WalkStage::CurrentDir, root.clone(), e))?
                .join(root)
        };
        trace_walk!("walking {}", root.display());

        let kind = classify(&root, WalkStage::Root)?;
        let open = if kind == EntryKind::Directory {
            vec![OpenDir::list(root.clone(), PathBuf::new(), 0)?]
        } else {
            Vec::new()
        };

        Ok(Self {
            root,
            pending_root: include_root.then_some(kind),
            open,
            failed: false,
        })
    }

    fn advance(&mut self) -> Option<Result<WalkEntry, WalkError>> {
        loop {
            let dir = self.open.last_mut()?;
            let Some(name) = dir.names.next() else {
                self.open.pop();
                continue;
            };

            let full_path = dir.path.join(&name);
            let relative_path = dir.relative.join(&name);
            let depth = dir.depth + 1;

            let kind = match classify(&full_path, WalkStage::Metadata) {
                Ok(kind) => kind,
                Err(error) => return Some(Err(error)),
            };
            if kind == EntryKind::Directory {
                match OpenDir::list(full_path.clone(), relative_path.clone(), depth) {
                    Ok(child) => self.open.push(child),
                    Err(error) => return Some(Err(error)),
                }
            }

            return Some(Ok(WalkEntry {
                full_path,
                relative_path,
                kind,
                depth,
                is_root: false,
            }));
        }
    }
}

impl Iterator for Walker {
    type Item = Result<WalkEntry, WalkError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }

        if let Some(kind) = self.pending_root.take() {
            return Some(Ok(WalkEntry {
                full_path: self.root.clone(),
                relative_path: PathBuf::new(),
                kind,
                depth: 0,
                is_root: true,
            }));
        }

        let item = self.advance();
        if matches!(item, Some(Err(_))) {
            self.failed = true;
        }
        item
    }
}

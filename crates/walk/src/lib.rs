#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! # Overview
//!
//! `walk` enumerates the filesystem objects below a traversal root in a
//! deterministic depth-first order. chacl visits every object the walker
//! yields exactly once and decides per object, from its [`EntryKind`], whether
//! its ACL is reconciled or the object is skipped.
//!
//! # Design
//!
//! - [`WalkBuilder`] configures the traversal; the root entry is included by
//!   default.
//! - [`Walker`] implements [`Iterator`] and yields [`WalkEntry`] values.
//!   Directory contents are sorted by name and processed before the walker
//!   moves to the next sibling.
//! - Symbolic links are reported as [`EntryKind::Other`] and never followed,
//!   so a link cannot pull objects outside the root into the traversal.
//!
//! # Invariants
//!
//! - Every yielded path lies under the configured root.
//! - Parents are yielded before their children.
//! - The first error ends the traversal; the iterator yields nothing after it.
//!
//! # Errors
//!
//! Traversal emits [`WalkError`] when metadata cannot be queried or a
//! directory cannot be read. The error keeps the offending path.
//!
//! # Examples
//!
//! ```
//! use walk::{EntryKind, WalkBuilder};
//! use std::fs;
//!
//! # fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! let temp = tempfile::tempdir()?;
//! let root = temp.path().join("share");
//! fs::create_dir_all(root.join("reports"))?;
//! fs::write(root.join("reports/q1.pdf"), b"data")?;
//!
//! let kinds: Vec<EntryKind> = WalkBuilder::new(&root)
//!     .build()?
//!     .map(|entry| entry.map(|entry| entry.kind()))
//!     .collect::<Result<_, _>>()?;
//!
//! assert_eq!(
//!     kinds,
//!     [EntryKind::Directory, EntryKind::Directory, EntryKind::File]
//! );
//! # Ok(())
//! # }
//! # demo().unwrap();
//! ```

mod builder;
mod entry;
mod error;
mod walker;


pub use builder::WalkBuilder;
pub use entry::{EntryKind, WalkEntry};
pub use error::{WalkError, WalkStage};
pub use walker::Walker;

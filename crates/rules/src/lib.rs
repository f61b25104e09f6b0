#![deny(unsafe_code)]
#![deny(missing_docs)]

//! # Overview
//!
//! `rules` turns a chacl rule file into an ordered list of [`RuleEntry`]
//! values, each binding one absolute path to the grants declared for it.
//!
//! # Format
//!
//! Each line lists zero or more grants followed by an empty field and a path:
//!
//! ```text
//! # kind:rights:name: ... :path
//! u:rw:alice:g:r:staff::/srv/share
//! g:r:staff::/srv/share/reports
//! :/srv/share/locked
//! ```
//!
//! `kind` is `u` (user) or `g` (group) and `rights` is `r` (read-only) or
//! `rw` (read-write). Lines starting with `#` and blank lines are ignored.
//!
//! # Errors
//!
//! Loading stops at the first problem. [`RuleError`] reports the line number
//! and, for grammar problems, the offending line.
//!
//! # Examples
//!
//! ```
//! use rules::{PrincipalRef, Rights, RuleLoader};
//!
//! # fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! let loader = RuleLoader::new("/");
//! let entries = loader.parse_str("u:rw:root::/\n")?;
//!
//! assert_eq!(entries[0].path(), std::path::Path::new("/"));
//! assert_eq!(entries[0].rules()[0].principal, PrincipalRef::user("root"));
//! assert_eq!(entries[0].rules()[0].rights, Rights::ReadWrite);
//! # Ok(())
//! # }
//! # demo().unwrap();
//! ```

mod error;
mod loader;
mod rule;
mod tokenize;

pub use error::{RuleError, SyntaxError};
pub use loader::{RuleLoader, STDIN_SOURCE};
pub use rule::{PrincipalRef, Rights, Rule, RuleEntry, parse_kind};

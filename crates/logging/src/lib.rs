#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! # Overview
//!
//! `logging` carries chacl's diagnostics: the info/debug flag levels selected
//! by `-v`, a [`tracing_subscriber`] layer that renders permitted events as
//! `chacl: ...` lines, and macros that tag events with the targets the layer
//! understands.
//!
//! # Design
//!
//! There is no process-wide output singleton. The front-end builds a
//! [`VerbosityConfig`], wraps its diagnostics writer in a [`SharedWriter`], and
//! installs a [`ChaclLayer`] for the duration of one run with [`scoped`]. The
//! returned guard restores the previous subscriber on drop, which keeps
//! concurrently running tests isolated from each other.
//!
//! Warnings and errors are always written. Info and debug events are matched
//! to a flag by the suffix of their target (`chacl::name`, `chacl::acl`, ...)
//! and written only when the flag level is high enough. Events with targets
//! outside the chacl namespace are dropped unless they are warnings or errors.
//!
//! # Examples
//!
//! ```
//! use logging::{SharedWriter, VerbosityConfig, scoped, trace_name, trace_skip};
//!
//! let sink = SharedWriter::new(Vec::new());
//! {
//!     let _guard = scoped(VerbosityConfig::from_verbose_level(1), sink.clone(), None);
//!     trace_name!("updated /srv/share");
//!     trace_skip!("skipping /srv/share/link: not a file or directory");
//! }
//!
//! let output = sink.contents_lossy();
//! assert!(output.contains("chacl: updated /srv/share"));
//! assert!(output.contains("chacl: warning: skipping"));
//! ```

mod config;
mod levels;
mod sink;
mod tracing_bridge;
mod tracing_macros;

pub use config::VerbosityConfig;
pub use levels::{DebugFlag, DebugLevels, InfoFlag, InfoLevels};
pub use sink::SharedWriter;
pub use tracing_bridge::{ChaclLayer, LOG_ENV, env_filter, scoped};

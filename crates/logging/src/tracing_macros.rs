//! crates/logging/src/tracing_macros.rs
//! Convenience macros for chacl-specific tracing.
//!
//! These wrap the standard tracing macros with the targets understood by
//! [`ChaclLayer`](crate::ChaclLayer).

/// Emit a per-object result trace.
///
/// # Example
/// ```ignore
/// trace_name!("updated {}", path.display());
/// ```
#[macro_export]
macro_rules! trace_name {
    ($($arg:tt)*) => {
        ::tracing::info!(target: "chacl::name", $($arg)*);
    };
}

/// Emit a rule loading trace.
///
/// # Example
/// ```ignore
/// trace_rules!("path cleanup: {} -> {}", raw, cleaned);
/// ```
#[macro_export]
macro_rules! trace_rules {
    ($($arg:tt)*) => {
        ::tracing::info!(target: "chacl::rules", $($arg)*);
    };
}

/// Emit a run summary trace.
///
/// # Example
/// ```ignore
/// trace_stats!("visited {} objects", count);
/// ```
#[macro_export]
macro_rules! trace_stats {
    ($($arg:tt)*) => {
        ::tracing::info!(target: "chacl::stats", $($arg)*);
    };
}

/// Emit an ACL processing trace.
///
/// # Example
/// ```ignore
/// trace_acl!("{} entries stripped from {}", count, path.display());
/// ```
#[macro_export]
macro_rules! trace_acl {
    ($($arg:tt)*) => {
        ::tracing::debug!(target: "chacl::acl", $($arg)*);
    };
}

/// Emit a traversal planning trace.
///
/// # Example
/// ```ignore
/// trace_plan!("root {} covered by {}", child.display(), parent.display());
/// ```
#[macro_export]
macro_rules! trace_plan {
    ($($arg:tt)*) => {
        ::tracing::debug!(target: "chacl::plan", $($arg)*);
    };
}

/// Emit a principal resolution trace.
///
/// # Example
/// ```ignore
/// trace_principal!("resolved {} to {}", name, principal);
/// ```
#[macro_export]
macro_rules! trace_principal {
    ($($arg:tt)*) => {
        ::tracing::debug!(target: "chacl::principal", $($arg)*);
    };
}

/// Emit a directory enumeration trace.
///
/// # Example
/// ```ignore
/// trace_walk!("entering directory: {:?}", path);
/// ```
#[macro_export]
macro_rules! trace_walk {
    ($($arg:tt)*) => {
        ::tracing::trace!(target: "chacl::walk", $($arg)*);
    };
}

/// Emit a skipped-object warning.
///
/// # Example
/// ```ignore
/// trace_skip!("skipping {}: not a file or directory", path.display());
/// ```
#[macro_export]
macro_rules! trace_skip {
    ($($arg:tt)*) => {
        ::tracing::warn!(target: "chacl::skip", $($arg)*);
    };
}

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! # Overview
//!
//! `cli` is the command-line front-end of `chacl`. It parses the command line
//! with a [`clap`](https://docs.rs/clap/) builder definition, loads the rule
//! file through the `rules` crate, and hands the resulting entries to
//! [`engine::run`].
//!
//! # Design
//!
//! [`run`] accepts the argument iterator together with handles for standard
//! output and standard error, so tests drive the whole front-end with
//! in-memory buffers. Diagnostics are produced through `tracing`; for the
//! duration of one run a [`logging::ChaclLayer`] is installed as the
//! thread's default subscriber, writing straight to the error handle as
//! events arrive. The error handle is therefore owned and `'static`; tests
//! pass a [`logging::SharedWriter`] and keep a clone to read it back.
//! [`run_with`] accepts an explicit principal resolver and ACL store, which
//! is how the front-end is exercised without touching extended attributes or
//! the account database.
//!
//! # Exit codes
//!
//! | Code | Meaning |
//! |------|---------|
//! | 0 | success |
//! | 1 | usage error |
//! | 2 | configuration error (rule file, principal resolution) |
//! | 3 | existing ACL content that cannot be interpreted |
//! | 4 | filesystem failure |
//!
//! # Examples
//!
//! ```
//! use logging::SharedWriter;
//!
//! let mut stdout = Vec::new();
//! let stderr = SharedWriter::new(Vec::new());
//! let exit_code = cli::run(["chacl", "--version"], &mut stdout, stderr.clone());
//!
//! assert_eq!(exit_code, 0);
//! assert!(String::from_utf8(stdout).unwrap().starts_with("chacl "));
//! assert!(stderr.contents().is_empty());
//! ```

mod arguments;

use std::ffi::OsString;
use std::io::Write;
use std::path::Path;

use engine::{EngineError, EngineResult, RunSummary};
use logging::{SharedWriter, VerbosityConfig};
use metadata::{AclStore, PrincipalResolver};
use rules::{RuleError, RuleLoader};

pub use arguments::{PROGRAM_NAME, ParsedArgs, clap_command, parse_args};

/// Exit code for malformed command lines.
pub const USAGE_EXIT_CODE: i32 = 1;

/// Maximum exit code representable by a Unix process.
const MAX_EXIT_CODE: i32 = u8::MAX as i32;

/// Runs the CLI against the system account database and extended attributes.
///
/// Returns the process exit code.
pub fn run<I, S, Out, Err>(arguments: I, stdout: &mut Out, stderr: Err) -> i32
where
    I: IntoIterator<Item = S>,
    S: Into<OsString>,
    Out: Write,
    Err: Write + Send + 'static,
{
    let stderr = SharedWriter::new(stderr);
    let parsed = match parse_args(arguments) {
        Ok(parsed) => parsed,
        Err(error) => return report_usage_error(&stderr, &error),
    };
    if let Some(status) = handle_informational(&parsed, stdout) {
        return status;
    }
    execute_with_system(&parsed, stdout, &stderr)
}

/// Runs the CLI with an explicit principal resolver and ACL store.
///
/// `--acl-xattr` has no effect here; the store is used as given.
pub fn run_with<I, S, Out, Err, R, St>(
    arguments: I,
    stdout: &mut Out,
    stderr: Err,
    resolver: &R,
    store: &mut St,
) -> i32
where
    I: IntoIterator<Item = S>,
    S: Into<OsString>,
    Out: Write,
    Err: Write + Send + 'static,
    R: PrincipalResolver + ?Sized,
    St: AclStore + ?Sized,
{
    let stderr = SharedWriter::new(stderr);
    let parsed = match parse_args(arguments) {
        Ok(parsed) => parsed,
        Err(error) => return report_usage_error(&stderr, &error),
    };
    if let Some(status) = handle_informational(&parsed, stdout) {
        return status;
    }
    execute(&parsed, stdout, &stderr, resolver, store)
}

/// Converts a numeric exit code into an [`std::process::ExitCode`].
#[must_use]
pub fn exit_code_from(status: i32) -> std::process::ExitCode {
    let clamped = status.clamp(0, MAX_EXIT_CODE);
    std::process::ExitCode::from(clamped as u8)
}

fn report_usage_error<Err: Write>(stderr: &SharedWriter<Err>, error: &clap::Error) -> i32 {
    let _ = write!(stderr.lock(), "{PROGRAM_NAME}: {error}");
    USAGE_EXIT_CODE
}

/// Renders the help text.
fn render_help() -> String {
    clap_command().render_help().to_string()
}

/// Handles `--help` and `--version`, which never touch the filesystem.
fn handle_informational<Out: Write>(parsed: &ParsedArgs, stdout: &mut Out) -> Option<i32> {
    let text = if parsed.show_help {
        render_help()
    } else if parsed.show_version {
        format!("{PROGRAM_NAME} {}\n", env!("CARGO_PKG_VERSION"))
    } else {
        return None;
    };
    Some(if stdout.write_all(text.as_bytes()).is_ok() {
        0
    } else {
        USAGE_EXIT_CODE
    })
}

#[cfg(all(unix, feature = "xattr"))]
fn execute_with_system<Out, Err>(
    parsed: &ParsedArgs,
    stdout: &mut Out,
    stderr: &SharedWriter<Err>,
) -> i32
where
    Out: Write,
    Err: Write + Send + 'static,
{
    use metadata::{CachingResolver, SystemResolver, XattrAclStore};

    let resolver = CachingResolver::new(SystemResolver::new());
    let mut store = match parsed.acl_xattr.clone() {
        Some(name) => XattrAclStore::with_attribute(name),
        None => XattrAclStore::new(),
    };
    execute(parsed, stdout, stderr, &resolver, &mut store)
}

#[cfg(not(all(unix, feature = "xattr")))]
fn execute_with_system<Out: Write, Err: Write>(
    _parsed: &ParsedArgs,
    _stdout: &mut Out,
    stderr: &SharedWriter<Err>,
) -> i32 {
    let _ = writeln!(
        stderr.lock(),
        "{PROGRAM_NAME}: error: ACL storage is unavailable in this build"
    );
    USAGE_EXIT_CODE
}

fn execute<Out, Err, R, St>(
    parsed: &ParsedArgs,
    stdout: &mut Out,
    stderr: &SharedWriter<Err>,
    resolver: &R,
    store: &mut St,
) -> i32
where
    Out: Write,
    Err: Write + Send + 'static,
    R: PrincipalResolver + ?Sized,
    St: AclStore + ?Sized,
{
    let Some(rules_file) = parsed.rules_file.as_deref() else {
        let _ = writeln!(
            stderr.lock(),
            "{PROGRAM_NAME}: error: missing RULES_FILE operand\n\nFor more information, try '--help'."
        );
        return USAGE_EXIT_CODE;
    };

    let result = {
        let _guard = logging::scoped(
            VerbosityConfig::from_verbose_level(parsed.verbose),
            stderr.clone(),
            logging::env_filter(),
        );
        load_and_run(parsed, rules_file, resolver, store)
    };

    match result {
        Ok(summary) => {
            if !parsed.quiet && writeln!(stdout, "{summary}").is_err() {
                return EngineError::IO_EXIT_CODE;
            }
            0
        }
        Err(error) => {
            let _ = writeln!(stderr.lock(), "{PROGRAM_NAME}: error: {error}");
            error.exit_code()
        }
    }
}

fn load_and_run<R, St>(
    parsed: &ParsedArgs,
    rules_file: &Path,
    resolver: &R,
    store: &mut St,
) -> EngineResult<RunSummary>
where
    R: PrincipalResolver + ?Sized,
    St: AclStore + ?Sized,
{
    let loader = match &parsed.base_dir {
        Some(base) => RuleLoader::new(base),
        None => RuleLoader::from_current_dir().map_err(|source| RuleError::Io {
            origin: "current directory".to_owned(),
            source,
        })?,
    };
    let entries = loader.load(rules_file)?;
    tracing::debug!(
        target: "chacl::rules",
        "loaded {} rule paths from {}",
        entries.len(),
        rules_file.display()
    );
    engine::run(&entries, &parsed.run_options(), resolver, store)
}

//! crates/cli/src/arguments.rs
//! Command definition and typed parse results.

use std::ffi::OsString;
use std::path::PathBuf;

use clap::builder::{OsStringValueParser, PathBufValueParser};
use clap::{Arg, ArgAction, Command};
use engine::{Mode, RunOptions};
use rules::PrincipalRef;

/// Program name used when the argument vector is empty.
pub const PROGRAM_NAME: &str = "chacl";

/// Parsed command produced by [`parse_args`].
#[derive(Debug, Default, PartialEq, Eq)]
pub struct ParsedArgs {
    /// `-h`/`--help` was given.
    pub show_help: bool,
    /// `-V`/`--version` was given.
    pub show_version: bool,
    /// Number of `-v` flags.
    pub verbose: u8,
    /// Suppress the summary line.
    pub quiet: bool,
    /// Compute changes without writing them.
    pub dry_run: bool,
    /// Principal granted full control below every traversal root.
    pub admin: Option<PrincipalRef>,
    /// Principals whose existing entries survive.
    pub whitelist: Vec<PrincipalRef>,
    /// Close every ACL with a deny entry for "everyone".
    pub deny_everyone: bool,
    /// Only remove non-whitelisted entries.
    pub strip_only: bool,
    /// Directory relative rule paths are resolved against.
    pub base_dir: Option<PathBuf>,
    /// Extended attribute holding the ACL.
    pub acl_xattr: Option<OsString>,
    /// Rule file, or `-` for standard input.
    pub rules_file: Option<PathBuf>,
}

impl ParsedArgs {
    /// Engine settings selected on the command line.
    #[must_use]
    pub fn run_options(&self) -> RunOptions {
        RunOptions {
            admin: self.admin.clone(),
            whitelist: self.whitelist.clone(),
            deny_everyone: self.deny_everyone,
            mode: if self.strip_only {
                Mode::StripOnly
            } else {
                Mode::Reconcile
            },
            dry_run: self.dry_run,
        }
    }
}

/// Builds the `clap` command used for parsing.
pub fn clap_command() -> Command {
    Command::new(PROGRAM_NAME)
        .version(env!("CARGO_PKG_VERSION"))
        .about("Reconcile filesystem ACLs with a declarative rule file.")
        .override_usage("chacl [OPTIONS] RULES_FILE")
        .disable_help_flag(true)
        .disable_version_flag(true)
        .arg(
            Arg::new("help")
                .long("help")
                .short('h')
                .help("Show this help message and exit.")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("version")
                .long("version")
                .short('V')
                .help("Output version information and exit.")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("dry-run")
                .long("dry-run")
                .short('n')
                .help("Report what would change without writing any ACL.")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .short('v')
                .help("Increase verbosity; repeat for more detail.")
                .action(ArgAction::Count),
        )
        .arg(
            Arg::new("quiet")
                .long("quiet")
                .short('q')
                .help("Do not print the summary line.")
                .action(ArgAction::SetTrue)
                .conflicts_with("verbose"),
        )
        .arg(
            Arg::new("admin")
                .long("admin")
                .value_name("KIND:NAME")
                .help("Grant KIND:NAME full control below every rule path (u:NAME or g:NAME).")
                .value_parser(principal_parser)
                .action(ArgAction::Set),
        )
        .arg(
            Arg::new("whitelist")
                .long("whitelist")
                .value_name("KIND:NAME")
                .help("Keep existing entries of KIND:NAME; may be repeated.")
                .value_parser(principal_parser)
                .action(ArgAction::Append),
        )
        .arg(
            Arg::new("deny-everyone")
                .long("deny-everyone")
                .help("Close every ACL with a deny entry for everyone.")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("strip-only")
                .long("strip-only")
                .help("Only remove entries of principals that are not whitelisted.")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("base-dir")
                .long("base-dir")
                .value_name("DIR")
                .help("Resolve relative rule paths against DIR instead of the current directory.")
                .value_parser(PathBufValueParser::new())
                .action(ArgAction::Set),
        )
        .arg(
            Arg::new("acl-xattr")
                .long("acl-xattr")
                .value_name("NAME")
                .help("Extended attribute that stores ACLs (default: user.chacl.acl).")
                .value_parser(OsStringValueParser::new())
                .action(ArgAction::Set),
        )
        .arg(
            Arg::new("rules")
                .value_name("RULES_FILE")
                .help("Rule file to apply, or '-' to read standard input.")
                .value_parser(PathBufValueParser::new())
                .allow_hyphen_values(true)
                .action(ArgAction::Set),
        )
}

fn principal_parser(value: &str) -> Result<PrincipalRef, String> {
    value.parse::<PrincipalRef>().map_err(|error| error.to_string())
}

/// Parses command-line arguments into a [`ParsedArgs`] structure.
pub fn parse_args<I, S>(arguments: I) -> Result<ParsedArgs, clap::Error>
where
    I: IntoIterator<Item = S>,
    S: Into<OsString>,
{
    let mut args: Vec<OsString> = arguments.into_iter().map(Into::into).collect();
    if args.is_empty() {
        args.push(OsString::from(PROGRAM_NAME));
    }

    let mut matches = clap_command().try_get_matches_from(args)?;

    Ok(ParsedArgs {
        show_help: matches.get_flag("help"),
        show_version: matches.get_flag("version"),
        verbose: matches.get_count("verbose"),
        quiet: matches.get_flag("quiet"),
        dry_run: matches.get_flag("dry-run"),
        admin: matches.remove_one::<PrincipalRef>("admin"),
        whitelist: matches
            .remove_many::<PrincipalRef>("whitelist")
            .map(Iterator::collect)
            .unwrap_or_default(),
        deny_everyone: matches.get_flag("deny-everyone"),
        strip_only: matches.get_flag("strip-only"),
        base_dir: matches.remove_one::<PathBuf>("base-dir"),
        acl_xattr: matches.remove_one::<OsString>("acl-xattr"),
        rules_file: matches.remove_one::<PathBuf>("rules"),
    })
}

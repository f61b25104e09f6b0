use std::io;
use std::path::PathBuf;

/// Malformed content within one rule line.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum SyntaxError {
    /// A field ran to the end of the line without its `:` terminator.
    #[error("cannot read {0}")]
    Unterminated(&'static str),
    /// The kind field was neither `u` nor `g`.
    #[error("invalid principal kind '{0}' (expected u or g)")]
    InvalidKind(String),
    /// The rights field was neither `r` nor `rw`.
    #[error("invalid rights '{0}' (expected r or rw)")]
    InvalidRights(String),
    /// The name field was empty.
    #[error("empty principal name")]
    EmptyName,
    /// Nothing followed the final `:`.
    #[error("missing path")]
    EmptyPath,
}

/// Error produced while loading a rule file.
#[derive(Debug, thiserror::Error)]
pub enum RuleError {
    /// A line did not follow the rule grammar.
    #[error("invalid rule on line {line} ({kind}): {text}")]
    Syntax {
        /// 1-based line number.
        line: usize,
        /// The offending line.
        text: String,
        /// What was wrong with it.
        kind: SyntaxError,
    },
    /// A line was not valid UTF-8.
    #[error("line {line} is not valid UTF-8")]
    Encoding {
        /// 1-based line number.
        line: usize,
    },
    /// The parent directory of a rule path could not be resolved.
    #[error("cannot resolve path on line {line} '{}': {source}", .path.display())]
    Resolve {
        /// 1-based line number.
        line: usize,
        /// Path being resolved.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: io::Error,
    },
    /// The rule path does not exist or is not accessible.
    #[error("path on line {line} does not exist (or is not accessible): {}", .path.display())]
    MissingPath {
        /// 1-based line number.
        line: usize,
        /// Absolute path that was checked.
        path: PathBuf,
    },
    /// The rule source could not be read.
    #[error("failed to read rules from {origin}: {source}")]
    Io {
        /// File name, or `standard input`.
        origin: String,
        /// Underlying error.
        #[source]
        source: io::Error,
    },
}

impl RuleError {
    /// Returns the 1-based line number the error refers to, if any.
    #[must_use]
    pub const fn line(&self) -> Option<usize> {
        match self {
            Self::Syntax { line, .. }
            | Self::Encoding { line }
            | Self::Resolve { line, .. }
            | Self::MissingPath { line, .. } => Some(*line),
            Self::Io { .. } => None,
        }
    }
}

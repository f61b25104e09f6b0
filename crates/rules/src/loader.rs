use std::fs::{self, File};
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};

use logging::trace_rules;

use crate::tokenize::{Token, Tokenizer};
use crate::{PrincipalRef, RuleEntry, RuleError, Rule, SyntaxError};

/// Name that makes [`RuleLoader::load`] read standard input.
pub const STDIN_SOURCE: &str = "-";

/// Parses rule files into [`RuleEntry`] values with absolute, existing paths.
///
/// Relative rule paths are resolved against the loader's base directory. The
/// parent directory is canonicalized and the final component kept as
/// written, so a rule on a symbolic link governs the link path and not its
/// target. A path ending in `..` is canonicalized whole. When a path appears on more than
/// one line the last occurrence wins.
#[derive(Clone, Debug)]
pub struct RuleLoader {
    base_dir: PathBuf,
}

impl RuleLoader {
    /// Creates a loader resolving relative paths against `base_dir`.
    #[must_use]
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    /// Creates a loader resolving relative paths against the working directory.
    pub fn from_current_dir() -> io::Result<Self> {
        std::env::current_dir().map(Self::new)
    }

    /// Loads rules from a file, or from standard input when `source` is `-`.
    pub fn load(&self, source: &Path) -> Result<Vec<RuleEntry>, RuleError> {
        if source.as_os_str() == STDIN_SOURCE {
            let stdin = io::stdin();
            return self.load_reader(stdin.lock(), "standard input");
        }

        let origin = source.display().to_string();
        let file = File::open(source).map_err(|source| RuleError::Io {
            origin: origin.clone(),
            source,
        })?;
        self.load_reader(BufReader::new(file), &origin)
    }

    /// Loads rules from any buffered reader; `origin` names it in errors.
    pub fn load_reader<R: BufRead>(
        &self,
        mut reader: R,
        origin: &str,
    ) -> Result<Vec<RuleEntry>, RuleError> {
        let mut entries: Vec<RuleEntry> = Vec::new();
        let mut buffer = Vec::new();
        let mut line_number = 0;

        loop {
            buffer.clear();
            let read = reader
                .read_until(b'\n', &mut buffer)
                .map_err(|source| RuleError::Io {
                    origin: origin.to_owned(),
                    source,
                })?;
            if read == 0 {
                break;
            }
            line_number += 1;

            let line = std::str::from_utf8(&buffer)
                .map_err(|_| RuleError::Encoding { line: line_number })?;
            let line = line.strip_suffix('\n').unwrap_or(line);
            let line = line.strip_suffix('\r').unwrap_or(line);

            if let Some(entry) = self.parse_line(line, line_number)? {
                insert_last_wins(&mut entries, entry);
            }
        }

        trace_rules!("loaded {} rule paths from {origin}", entries.len());
        Ok(entries)
    }

    /// Parses rules held in memory.
    pub fn parse_str(&self, text: &str) -> Result<Vec<RuleEntry>, RuleError> {
        self.load_reader(text.as_bytes(), "string")
    }

    fn parse_line(&self, line: &str, line_number: usize) -> Result<Option<RuleEntry>, RuleError> {
        if line.starts_with('#') || line.trim().is_empty() {
            return Ok(None);
        }

        let syntax = |kind: SyntaxError| RuleError::Syntax {
            line: line_number,
            text: line.to_owned(),
            kind,
        };

        let mut rules = Vec::new();
        let mut kind = None;
        let mut rights = None;
        let mut raw_path = None;

        for token in Tokenizer::new(line) {
            match token.map_err(syntax)? {
                Token::Kind(k) => kind = Some(k),
                Token::Rights(r) => rights = Some(r),
                Token::Name(name) => {
                    if let (Some(kind), Some(rights)) = (kind.take(), rights.take()) {
                        let principal = PrincipalRef {
                            kind,
                            name: name.to_owned(),
                        };
                        rules.push(Rule::new(principal, rights));
                    }
                }
                Token::Path(path) => raw_path = Some(path),
            }
        }

        // The tokenizer only ends without error after yielding a path.
        let Some(raw_path) = raw_path else {
            return Err(syntax(SyntaxError::EmptyPath));
        };
        let path = self.resolve(raw_path, line_number)?;
        if path.as_os_str() != raw_path {
            trace_rules!("path cleanup: {raw_path} -> {}", path.display());
        }

        Ok(Some(RuleEntry::new(path, rules)))
    }

    fn resolve(&self, raw: &str, line: usize) -> Result<PathBuf, RuleError> {
        let parsed = Path::new(raw);
        let joined = self.base_dir.join(parsed);
        let resolve_error = |path: &Path, source| RuleError::Resolve {
            line,
            path: path.to_path_buf(),
            source,
        };

        let absolute = match (joined.parent(), joined.file_name()) {
            (Some(parent), Some(name)) => {
                let parent = if parent.as_os_str().is_empty() {
                    Path::new(".")
                } else {
                    parent
                };
                let canonical =
                    fs::canonicalize(parent).map_err(|e| resolve_error(parent, e))?;
                canonical.join(name)
            }
            // `/` or a trailing `..` leaves no final component to keep.
            _ => fs::canonicalize(&joined).map_err(|e| resolve_error(&joined, e))?,
        };

        if !absolute.exists() {
            return Err(RuleError::MissingPath {
                line,
                path: absolute,
            });
        }
        Ok(absolute)
    }
}

fn insert_last_wins(entries: &mut Vec<RuleEntry>, entry: RuleEntry) {
    if let Some(index) = entries.iter().position(|e| e.path() == entry.path()) {
        tracing::warn!(
            target: "chacl::rules",
            "entry for path {} found more than once; latest one wins",
            entry.path().display()
        );
        entries.remove(index);
    }
    entries.push(entry);
}

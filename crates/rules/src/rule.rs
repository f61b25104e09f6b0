use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use metadata::PrincipalKind;

use crate::SyntaxError;

/// Access granted by a rule.
///
/// Variants are ordered so that `max` yields the dominating right.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Rights {
    /// Read data, list directories, read attributes.
    ReadOnly,
    /// Everything in [`Rights::ReadOnly`] plus modification and deletion.
    ReadWrite,
}

impl Rights {
    /// Parses the rule file spelling (`r` or `rw`).
    pub fn parse(token: &str) -> Result<Self, SyntaxError> {
        match token {
            "r" => Ok(Self::ReadOnly),
            "rw" => Ok(Self::ReadWrite),
            other => Err(SyntaxError::InvalidRights(other.to_owned())),
        }
    }
}

impl fmt::Display for Rights {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ReadOnly => f.write_str("r"),
            Self::ReadWrite => f.write_str("rw"),
        }
    }
}

/// Parses the rule file spelling of a principal kind (`u` or `g`).
pub fn parse_kind(token: &str) -> Result<PrincipalKind, SyntaxError> {
    match token {
        "u" => Ok(PrincipalKind::User),
        "g" => Ok(PrincipalKind::Group),
        other => Err(SyntaxError::InvalidKind(other.to_owned())),
    }
}

/// An unresolved principal: a kind and an account name.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct PrincipalRef {
    /// User or group.
    pub kind: PrincipalKind,
    /// Account name as written.
    pub name: String,
}

impl PrincipalRef {
    /// Creates a user reference.
    #[must_use]
    pub fn user(name: impl Into<String>) -> Self {
        Self {
            kind: PrincipalKind::User,
            name: name.into(),
        }
    }

    /// Creates a group reference.
    #[must_use]
    pub fn group(name: impl Into<String>) -> Self {
        Self {
            kind: PrincipalKind::Group,
            name: name.into(),
        }
    }
}

impl fmt::Display for PrincipalRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self.kind {
            PrincipalKind::User => "u",
            PrincipalKind::Group => "g",
        };
        write!(f, "{kind}:{}", self.name)
    }
}

/// Parses `KIND:NAME`, the form used on the command line.
impl FromStr for PrincipalRef {
    type Err = SyntaxError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (kind, name) = s
            .split_once(':')
            .ok_or(SyntaxError::Unterminated("principal kind"))?;
        let kind = parse_kind(kind.trim())?;
        let name = name.trim();
        if name.is_empty() {
            return Err(SyntaxError::EmptyName);
        }
        Ok(Self {
            kind,
            name: name.to_owned(),
        })
    }
}

/// One grant: a principal and the rights it receives.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Rule {
    /// Who is granted access.
    pub principal: PrincipalRef,
    /// What access is granted.
    pub rights: Rights,
}

impl Rule {
    /// Creates a rule.
    #[must_use]
    pub const fn new(principal: PrincipalRef, rights: Rights) -> Self {
        Self { principal, rights }
    }
}

/// All rules attached to one absolute path, in file order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RuleEntry {
    path: PathBuf,
    rules: Vec<Rule>,
}

impl RuleEntry {
    /// Creates an entry.
    #[must_use]
    pub const fn new(path: PathBuf, rules: Vec<Rule>) -> Self {
        Self { path, rules }
    }

    /// The governed path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The rules in declaration order.
    #[must_use]
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_write_dominates() {
        assert_eq!(Rights::ReadOnly.max(Rights::ReadWrite), Rights::ReadWrite);
    }

    #[test]
    fn principal_ref_parses_command_line_form() {
        assert_eq!("u:alice".parse(), Ok(PrincipalRef::user("alice")));
        assert_eq!(" g : staff ".parse(), Ok(PrincipalRef::group("staff")));
        assert_eq!(
            "x:alice".parse::<PrincipalRef>(),
            Err(SyntaxError::InvalidKind("x".to_owned()))
        );
        assert_eq!("g:".parse::<PrincipalRef>(), Err(SyntaxError::EmptyName));
        assert!("alice".parse::<PrincipalRef>().is_err());
    }

    #[test]
    fn principal_ref_display_matches_input_form() {
        assert_eq!(PrincipalRef::group("staff").to_string(), "g:staff");
    }
}

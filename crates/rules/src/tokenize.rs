//! Line tokenizer for the rule file grammar.
//!
//! ```text
//! line  := grant* ':' path
//! grant := KIND ':' RIGHTS ':' NAME ':'
//! ```
//!
//! Whitespace around `KIND`, `RIGHTS` and `NAME` is ignored. `path` is the
//! rest of the line taken verbatim, so it may contain `:`.

use metadata::PrincipalKind;

use crate::rule::parse_kind;
use crate::{Rights, SyntaxError};

/// One typed field of a rule line.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Token<'a> {
    Kind(PrincipalKind),
    Rights(Rights),
    Name(&'a str),
    Path(&'a str),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Expect {
    KindOrPath,
    Rights,
    Name,
    Done,
}

/// Splits one line into [`Token`]s.
///
/// The iterator ends after the path token or after the first error.
#[derive(Debug)]
pub(crate) struct Tokenizer<'a> {
    rest: &'a str,
    expect: Expect,
}

impl<'a> Tokenizer<'a> {
    pub(crate) const fn new(line: &'a str) -> Self {
        Self {
            rest: line,
            expect: Expect::KindOrPath,
        }
    }

    /// Consumes one `:`-terminated field and returns it trimmed.
    fn field(&mut self, what: &'static str) -> Result<&'a str, SyntaxError> {
        let (field, rest) = self
            .rest
            .split_once(':')
            .ok_or(SyntaxError::Unterminated(what))?;
        self.rest = rest;
        Ok(field.trim())
    }

    fn step(&mut self) -> Result<Token<'a>, SyntaxError> {
        match self.expect {
            Expect::KindOrPath => {
                let trimmed = self.rest.trim_start();
                if let Some(path) = trimmed.strip_prefix(':') {
                    self.expect = Expect::Done;
                    if path.is_empty() {
                        return Err(SyntaxError::EmptyPath);
                    }
                    return Ok(Token::Path(path));
                }
                let kind = parse_kind(self.field("principal kind")?)?;
                self.expect = Expect::Rights;
                Ok(Token::Kind(kind))
            }
            Expect::Rights => {
                let rights = Rights::parse(self.field("rights")?)?;
                self.expect = Expect::Name;
                Ok(Token::Rights(rights))
            }
            Expect::Name => {
                let name = self.field("principal name")?;
                if name.is_empty() {
                    return Err(SyntaxError::EmptyName);
                }
                self.expect = Expect::KindOrPath;
                Ok(Token::Name(name))
            }
            Expect::Done => unreachable!("step is never called after the path"),
        }
    }
}

impl<'a> Iterator for Tokenizer<'a> {
    type Item = Result<Token<'a>, SyntaxError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.expect == Expect::Done {
            return None;
        }
        let token = self.step();
        if token.is_err() {
            self.expect = Expect::Done;
        }
        Some(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(line: &str) -> Result<Vec<Token<'_>>, SyntaxError> {
        Tokenizer::new(line).collect()
    }

    #[test]
    fn grants_then_path() {
        assert_eq!(
            tokens("u:rw:alice:g:r:staff::/srv/share"),
            Ok(vec![
                Token::Kind(PrincipalKind::User),
                Token::Rights(Rights::ReadWrite),
                Token::Name("alice"),
                Token::Kind(PrincipalKind::Group),
                Token::Rights(Rights::ReadOnly),
                Token::Name("staff"),
                Token::Path("/srv/share"),
            ])
        );
    }

    #[test]
    fn path_only_line_has_no_grants() {
        assert_eq!(tokens(":/srv/public"), Ok(vec![Token::Path("/srv/public")]));
    }

    #[test]
    fn whitespace_around_fields_is_ignored_but_path_is_verbatim() {
        assert_eq!(
            tokens(" u : r : bob :  : a b:c "),
            Ok(vec![
                Token::Kind(PrincipalKind::User),
                Token::Rights(Rights::ReadOnly),
                Token::Name("bob"),
                Token::Path(" a b:c "),
            ])
        );
    }

    #[test]
    fn missing_terminator_is_reported_per_field() {
        assert_eq!(
            tokens("u:rw:alice"),
            Err(SyntaxError::Unterminated("principal name"))
        );
        assert_eq!(tokens("u"), Err(SyntaxError::Unterminated("principal kind")));
        assert_eq!(tokens(""), Err(SyntaxError::Unterminated("principal kind")));
    }

    #[test]
    fn invalid_fields_stop_iteration() {
        let mut tokenizer = Tokenizer::new("x:rw:alice::/srv");
        assert_eq!(
            tokenizer.next(),
            Some(Err(SyntaxError::InvalidKind("x".to_owned())))
        );
        assert_eq!(tokenizer.next(), None);
    }

    #[test]
    fn empty_name_and_path_are_rejected() {
        assert_eq!(tokens("u:rw: ::/srv"), Err(SyntaxError::EmptyName));
        assert_eq!(tokens("u:rw:alice::"), Err(SyntaxError::EmptyPath));
    }
}

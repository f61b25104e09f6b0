//! crates/metadata/src/principal.rs
//!
//! Principal identities and the resolvers that map user and group names onto
//! them.
//!
//! A [`Principal`] is an opaque 128-bit identity. Accounts known only by a
//! numeric id are mapped onto stable UUIDs with a fixed prefix per kind, the
//! same scheme macOS uses for accounts without a generated UUID:
//!
//! - users: `FFFFEEEE-DDDD-CCCC-BBBB-AAAA{uid:08X}`
//! - groups: `ABCDEFAB-CDEF-ABCD-EFAB-CDEF{gid:08X}`

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use logging::trace_principal;
use uuid::Uuid;

const USER_PREFIX: u128 = 0xFFFF_EEEE_DDDD_CCCC_BBBB_AAAA_0000_0000;
const GROUP_PREFIX: u128 = 0xABCD_EFAB_CDEF_ABCD_EFAB_CDEF_0000_0000;

/// Opaque 128-bit identity of a user or group.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Principal(Uuid);

impl Principal {
    /// The well-known "everyone" group (gid 12).
    pub const EVERYONE: Self = Self::from_gid(12);

    /// Wraps a UUID.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the underlying UUID.
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }

    /// Synthesizes the identity of a numeric user id.
    #[must_use]
    pub const fn from_uid(uid: u32) -> Self {
        Self(Uuid::from_u128(USER_PREFIX | uid as u128))
    }

    /// Synthesizes the identity of a numeric group id.
    #[must_use]
    pub const fn from_gid(gid: u32) -> Self {
        Self(Uuid::from_u128(GROUP_PREFIX | gid as u128))
    }
}

impl fmt::Display for Principal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut buffer = Uuid::encode_buffer();
        f.write_str(self.0.hyphenated().encode_upper(&mut buffer))
    }
}

impl FromStr for Principal {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

/// Whether a name refers to a user or a group.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PrincipalKind {
    /// A user account.
    User,
    /// A group.
    Group,
}

impl fmt::Display for PrincipalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::User => f.write_str("user"),
            Self::Group => f.write_str("group"),
        }
    }
}

/// Failure to map a name onto a [`Principal`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResolveError {
    /// No account of that kind carries the name.
    #[error("no {kind} named '{name}'")]
    NotFound {
        /// Requested kind.
        kind: PrincipalKind,
        /// Requested name.
        name: String,
    },
    /// The name matches more than one identity.
    #[error("{kind} name '{name}' is ambiguous: it is both id {id} and an account with id {account_id}")]
    Ambiguous {
        /// Requested kind.
        kind: PrincipalKind,
        /// Requested name.
        name: String,
        /// The name read as a numeric id.
        id: u32,
        /// The id of the account carrying the name.
        account_id: u32,
    },
    /// The lookup itself could not be performed.
    #[error("cannot look up {kind} '{name}': {reason}")]
    Lookup {
        /// Requested kind.
        kind: PrincipalKind,
        /// Requested name.
        name: String,
        /// Why the lookup failed.
        reason: String,
    },
}

/// Maps `(kind, name)` pairs onto principals.
pub trait PrincipalResolver {
    /// Resolves one name.
    fn resolve(&self, kind: PrincipalKind, name: &str) -> Result<Principal, ResolveError>;
}

impl<R: PrincipalResolver + ?Sized> PrincipalResolver for &R {
    fn resolve(&self, kind: PrincipalKind, name: &str) -> Result<Principal, ResolveError> {
        (**self).resolve(kind, name)
    }
}

impl<R: PrincipalResolver + ?Sized> PrincipalResolver for Box<R> {
    fn resolve(&self, kind: PrincipalKind, name: &str) -> Result<Principal, ResolveError> {
        (**self).resolve(kind, name)
    }
}

/// Map-backed resolver for tests and embedders with their own directory.
#[derive(Clone, Debug, Default)]
pub struct StaticResolver {
    entries: HashMap<(PrincipalKind, String), Principal>,
}

impl StaticResolver {
    /// Creates an empty resolver.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `name` as `principal`.
    pub fn insert(&mut self, kind: PrincipalKind, name: impl Into<String>, principal: Principal) {
        self.entries.insert((kind, name.into()), principal);
    }

    /// Builder form of [`insert`](Self::insert) for a user with a numeric id.
    #[must_use]
    pub fn with_user(mut self, name: impl Into<String>, uid: u32) -> Self {
        self.insert(PrincipalKind::User, name, Principal::from_uid(uid));
        self
    }

    /// Builder form of [`insert`](Self::insert) for a group with a numeric id.
    #[must_use]
    pub fn with_group(mut self, name: impl Into<String>, gid: u32) -> Self {
        self.insert(PrincipalKind::Group, name, Principal::from_gid(gid));
        self
    }
}

impl PrincipalResolver for StaticResolver {
    fn resolve(&self, kind: PrincipalKind, name: &str) -> Result<Principal, ResolveError> {
        self.entries
            .get(&(kind, name.to_owned()))
            .copied()
            .ok_or_else(|| ResolveError::NotFound {
                kind,
                name: name.to_owned(),
            })
    }
}

/// Memoizes successful resolutions of an inner resolver for one run.
#[derive(Debug)]
pub struct CachingResolver<R> {
    inner: R,
    cache: RefCell<HashMap<(PrincipalKind, String), Principal>>,
}

impl<R> CachingResolver<R> {
    /// Wraps `inner`.
    #[must_use]
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            cache: RefCell::new(HashMap::new()),
        }
    }

    /// Number of cached entries.
    #[must_use]
    pub fn cached(&self) -> usize {
        self.cache.borrow().len()
    }
}

impl<R: PrincipalResolver> PrincipalResolver for CachingResolver<R> {
    fn resolve(&self, kind: PrincipalKind, name: &str) -> Result<Principal, ResolveError> {
        let key = (kind, name.to_owned());
        if let Some(principal) = self.cache.borrow().get(&key) {
            return Ok(*principal);
        }

        let principal = self.inner.resolve(kind, name)?;
        trace_principal!("resolved {kind} '{name}' to {principal}");
        self.cache.borrow_mut().insert(key, principal);
        Ok(principal)
    }
}

/// Resolves names against the system user and group databases.
///
/// A name made only of ASCII digits is also read as a numeric id. When an
/// account with that name exists and its id differs, the name is ambiguous.
#[cfg(unix)]
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemResolver;

#[cfg(unix)]
impl SystemResolver {
    /// Creates a resolver backed by the system databases.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    fn account_id(kind: PrincipalKind, name: &str) -> Option<u32> {
        match kind {
            PrincipalKind::User => uzers::get_user_by_name(name).map(|user| user.uid()),
            PrincipalKind::Group => uzers::get_group_by_name(name).map(|group| group.gid()),
        }
    }
}

#[cfg(unix)]
impl PrincipalResolver for SystemResolver {
    fn resolve(&self, kind: PrincipalKind, name: &str) -> Result<Principal, ResolveError> {
        if name.contains('\0') {
            return Err(ResolveError::Lookup {
                kind,
                name: name.escape_default().to_string(),
                reason: "name contains a NUL byte".to_owned(),
            });
        }

        let numeric = numeric_id(name);
        let id = match (numeric, Self::account_id(kind, name)) {
            (Some(id), Some(account_id)) if id != account_id => {
                return Err(ResolveError::Ambiguous {
                    kind,
                    name: name.to_owned(),
                    id,
                    account_id,
                });
            }
            (_, Some(account_id)) => account_id,
            (Some(id), None) => id,
            (None, None) => {
                return Err(ResolveError::NotFound {
                    kind,
                    name: name.to_owned(),
                });
            }
        };

        Ok(match kind {
            PrincipalKind::User => Principal::from_uid(id),
            PrincipalKind::Group => Principal::from_gid(id),
        })
    }
}

fn numeric_id(name: &str) -> Option<u32> {
    if name.is_empty() || !name.bytes().all(|byte| byte.is_ascii_digit()) {
        return None;
    }
    name.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn synthesized_identities_match_documented_layout() {
        assert_eq!(
            Principal::from_uid(0x1F5).to_string(),
            "FFFFEEEE-DDDD-CCCC-BBBB-AAAA000001F5"
        );
        assert_eq!(
            Principal::from_gid(20).to_string(),
            "ABCDEFAB-CDEF-ABCD-EFAB-CDEF00000014"
        );
        assert_eq!(
            Principal::EVERYONE.to_string(),
            "ABCDEFAB-CDEF-ABCD-EFAB-CDEF0000000C"
        );
    }

    #[test]
    fn users_and_groups_with_same_id_differ() {
        assert_ne!(Principal::from_uid(20), Principal::from_gid(20));
    }

    #[test]
    fn parse_accepts_either_case() {
        let upper: Principal = "ABCDEFAB-CDEF-ABCD-EFAB-CDEF0000000C".parse().unwrap();
        let lower: Principal = "abcdefab-cdef-abcd-efab-cdef0000000c".parse().unwrap();
        assert_eq!(upper, Principal::EVERYONE);
        assert_eq!(lower, Principal::EVERYONE);
        assert!("everyone@".parse::<Principal>().is_err());
    }

    #[test]
    fn static_resolver_distinguishes_kinds() {
        let resolver = StaticResolver::new().with_user("alice", 501).with_group("staff", 20);

        assert_eq!(
            resolver.resolve(PrincipalKind::User, "alice"),
            Ok(Principal::from_uid(501))
        );
        assert_eq!(
            resolver.resolve(PrincipalKind::Group, "alice"),
            Err(ResolveError::NotFound {
                kind: PrincipalKind::Group,
                name: "alice".to_owned(),
            })
        );
    }

    struct CountingResolver {
        calls: Cell<usize>,
    }

    impl PrincipalResolver for CountingResolver {
        fn resolve(&self, kind: PrincipalKind, name: &str) -> Result<Principal, ResolveError> {
            self.calls.set(self.calls.get() + 1);
            if name == "ghost" {
                return Err(ResolveError::NotFound {
                    kind,
                    name: name.to_owned(),
                });
            }
            Ok(Principal::from_uid(7))
        }
    }

    #[test]
    fn caching_resolver_queries_inner_once_per_name() {
        let resolver = CachingResolver::new(CountingResolver {
            calls: Cell::new(0),
        });

        for _ in 0..3 {
            resolver.resolve(PrincipalKind::User, "alice").unwrap();
        }
        resolver.resolve(PrincipalKind::Group, "alice").unwrap();

        assert_eq!(resolver.inner.calls.get(), 2);
        assert_eq!(resolver.cached(), 2);
    }

    #[test]
    fn caching_resolver_does_not_cache_failures() {
        let resolver = CachingResolver::new(CountingResolver {
            calls: Cell::new(0),
        });

        assert!(resolver.resolve(PrincipalKind::User, "ghost").is_err());
        assert!(resolver.resolve(PrincipalKind::User, "ghost").is_err());
        assert_eq!(resolver.inner.calls.get(), 2);
        assert_eq!(resolver.cached(), 0);
    }

    #[test]
    fn numeric_id_requires_only_digits() {
        assert_eq!(numeric_id("501"), Some(501));
        assert_eq!(numeric_id("5o1"), None);
        assert_eq!(numeric_id(""), None);
        assert_eq!(numeric_id("99999999999"), None);
    }

    #[cfg(unix)]
    #[test]
    fn system_resolver_maps_root() {
        let resolver = SystemResolver::new();
        assert_eq!(
            resolver.resolve(PrincipalKind::User, "root"),
            Ok(Principal::from_uid(0))
        );
        assert_eq!(
            resolver.resolve(PrincipalKind::User, "0"),
            Ok(Principal::from_uid(0))
        );
    }

    #[cfg(unix)]
    #[test]
    fn system_resolver_reports_missing_names() {
        let resolver = SystemResolver::new();
        let error = resolver
            .resolve(PrincipalKind::Group, "chacl-no-such-group")
            .unwrap_err();
        assert!(matches!(error, ResolveError::NotFound { .. }));
    }
}

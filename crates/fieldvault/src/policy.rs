//! Role-gated decryption policy.
//!
//! Authorization is by role membership only. Anyone authenticated with one of
//! the allowed roles may decrypt any record; there is no per-record ownership
//! check. Callers that fail the check receive [`ACCESS_DENIED`] in place of the
//! plaintext, never an error.

use std::collections::BTreeSet;

/// Value returned in place of plaintext when the caller may not decrypt.
///
/// Rendering code must display it verbatim and never parse it as data.
pub const ACCESS_DENIED: &str = "[ACCESS DENIED]";

/// Roles allowed to decrypt by default.
pub const DEFAULT_DECRYPT_ROLES: [&str; 8] = [
    "Admin",
    "Doctor",
    "Nurse",
    "System Administrator",
    "User",
    "Patient",
    "Head Doctor",
    "Head Nurse",
];

/// Set of role names held by a caller.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoleSet(BTreeSet<String>);

impl RoleSet {
    /// An empty role set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a comma-separated header value, ignoring blanks around entries.
    pub fn from_csv(value: &str) -> Self {
        value
            .split(',')
            .map(str::trim)
            .filter(|r| !r.is_empty())
            .collect()
    }

    pub fn contains(&self, role: &str) -> bool {
        self.0.contains(role)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

impl<S: Into<String>> FromIterator<S> for RoleSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

/// The authenticated principal of the current request, as supplied by the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Caller {
    /// No authenticated identity.
    Anonymous,
    /// An authenticated principal and its roles.
    Authenticated { subject: String, roles: RoleSet },
}

impl Caller {
    /// Build an authenticated caller.
    pub fn authenticated(subject: impl Into<String>, roles: RoleSet) -> Self {
        Self::Authenticated {
            subject: subject.into(),
            roles,
        }
    }

    /// Returns the caller's roles; anonymous callers have none.
    pub fn roles(&self) -> Option<&RoleSet> {
        match self {
            Caller::Anonymous => None,
            Caller::Authenticated { roles, .. } => Some(roles),
        }
    }
}

/// Decides whether a caller may see decrypted values.
#[derive(Debug, Clone)]
pub struct DecryptionPolicy {
    allowed: RoleSet,
}

impl DecryptionPolicy {
    /// A policy admitting exactly `allowed` roles.
    pub fn new(allowed: RoleSet) -> Self {
        Self { allowed }
    }

    /// Returns `true` iff `caller` is authenticated and holds at least one
    /// allowed role.
    pub fn can_decrypt(&self, caller: &Caller) -> bool {
        match caller.roles() {
            None => false,
            Some(roles) => roles.iter().any(|r| self.allowed.contains(r)),
        }
    }
}

impl Default for DecryptionPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_DECRYPT_ROLES.into_iter().collect())
    }
}

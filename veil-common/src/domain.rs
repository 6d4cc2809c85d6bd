//! Domain newtype for owned domains
//!
//! Wraps domain strings so the configured set of owned domains cannot be
//! confused with full addresses. Matching is exact and case-sensitive, which
//! is how recipients are tested against `MY_DOMAINS`.

use std::{
    fmt::{self, Display},
    ops::Deref,
    sync::Arc,
};

use serde::{Deserialize, Serialize};

use crate::address::EmailAddress;

/// A domain name the operator controls
///
/// ```
/// use veil_common::{Domain, EmailAddress};
///
/// let domain = Domain::new("mine.com");
/// let address = EmailAddress::parse("sales@mine.com").unwrap();
/// assert!(domain.owns(&address));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
#[repr(transparent)]
pub struct Domain(Arc<str>);

impl Domain {
    #[must_use]
    pub fn new(s: impl Into<Arc<str>>) -> Self {
        Self(s.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether `address` is a mailbox in this domain.
    ///
    /// The comparison is byte-for-byte; `Mine.com` does not own `x@mine.com`.
    #[must_use]
    pub fn owns(&self, address: &EmailAddress) -> bool {
        *self.0 == *address.domain()
    }
}

impl Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Domain {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Deref for Domain {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<String> for Domain {
    fn from(s: String) -> Self {
        Self(Arc::from(s))
    }
}

impl From<&str> for Domain {
    fn from(s: &str) -> Self {
        Self(Arc::from(s))
    }
}

//! Outbound relay settings.
//!
//! The relay is an HTTP API speaking the Mailjet v3.1 send format. Only the
//! endpoint, credentials and a bounded request timeout are configurable;
//! there is no retry policy to configure because failed relay calls are
//! never retried.

use std::{fmt, time::Duration};

use serde::Deserialize;

/// A credential whose value must never end up in logs.
#[derive(Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct Secret(String);

impl Secret {
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// The secret value itself, for building the request.
    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            f.write_str("Secret(<unset>)")
        } else {
            f.write_str("Secret(***)")
        }
    }
}

/// Relay endpoint and credentials
#[derive(Debug, Clone, Deserialize)]
pub struct RelayConfig {
    /// URL the send request is POSTed to.
    ///
    /// Default: `https://api.mailjet.com/v3.1/send`
    #[serde(default = "defaults::endpoint")]
    pub endpoint: String,

    /// Basic-auth user (`MAILJET_PUBLIC_KEY`)
    #[serde(default)]
    pub public_key: Secret,

    /// Basic-auth password (`MAILJET_SECRET_KEY`)
    #[serde(default)]
    pub secret_key: Secret,

    /// Upper bound on a single relay request, connection included.
    ///
    /// Default: 30 seconds
    #[serde(default = "defaults::timeout_secs")]
    pub timeout_secs: u64,
}

impl RelayConfig {
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            endpoint: defaults::endpoint(),
            public_key: Secret::default(),
            secret_key: Secret::default(),
            timeout_secs: defaults::timeout_secs(),
        }
    }
}

mod defaults {
    pub fn endpoint() -> String {
        "https://api.mailjet.com/v3.1/send".to_string()
    }

    pub const fn timeout_secs() -> u64 {
        30
    }
}

//! Configuration for veil.
//!
//! Every collaborator (policy gate, alias codec, dispatcher, relay) is built
//! from a [`Config`] passed by reference at construction time. The struct can
//! be read from the process environment ([`Config::from_env`]), from any key
//! lookup ([`Config::from_lookup`]), or deserialized from a file.
//!
//! List values accept either a JSON array or a comma-separated string:
//!
//! ```text
//! BLOCKED=["spam@bad.com","worse@bad.com"]
//! MY_DOMAINS=mine.com,also-mine.org
//! ```

pub mod relay;

use std::path::{Path, PathBuf};

use serde::Deserialize;

pub use relay::{RelayConfig, Secret};

use crate::{address::EmailAddress, domain::Domain, error::ConfigError};

/// Environment variable names
pub mod keys {
    pub const BLOCKED: &str = "BLOCKED";
    pub const HIDE_ADDRESSES: &str = "HIDE_ADDRESSES";
    pub const FORWARD_TO: &str = "FORWARD_TO";
    pub const FORWARD_FROM_CLOUDFLARE: &str = "FORWARD_FROM_CLOUDFLARE";
    pub const MY_DOMAINS: &str = "MY_DOMAINS";
    pub const DEFAULT_ALIAS: &str = "DEFAULT_ALIAS";
    pub const DEFAULT_FROM_NAME: &str = "DEFAULT_FROM_NAME";
    pub const BCC_ADDRESSES: &str = "BCC_ADDRESSES";
    pub const BCC_HIDDEN_SENDER: &str = "BCC_HIDDEN_SENDER";
    pub const CAMPAIGN_NAME: &str = "CAMPAIGN_NAME";
    pub const ENABLE_LOGS: &str = "ENABLE_LOGS";
    pub const MAILJET_PUBLIC_KEY: &str = "MAILJET_PUBLIC_KEY";
    pub const MAILJET_SECRET_KEY: &str = "MAILJET_SECRET_KEY";
    pub const MAILJET_ENDPOINT: &str = "MAILJET_ENDPOINT";
    pub const RELAY_TIMEOUT_SECS: &str = "RELAY_TIMEOUT_SECS";
    pub const SENDMAIL_PATH: &str = "SENDMAIL_PATH";
    /// Path of a RON configuration file, used instead of the variables above
    pub const CONFIG_FILE: &str = "VEIL_CONFIG";
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Envelope senders whose mail is rejected outright
    #[serde(default)]
    pub blocked: Vec<String>,

    /// Envelope senders whose identity is masked when they write through an
    /// alias (the operator's own addresses)
    #[serde(default)]
    pub hide_addresses: Vec<String>,

    /// Where ordinary inbound mail is forwarded to
    #[serde(default)]
    pub forward_to: Option<String>,

    /// Forward with the inbound collaborator's own forwarding instead of
    /// relaying through an alias (`FORWARD_FROM_CLOUDFLARE`)
    #[serde(default)]
    pub native_forward: bool,

    /// Domains the operator controls, in match priority order
    #[serde(default)]
    pub my_domains: Vec<Domain>,

    /// Mailbox used as the owned side of an alias when no recipient is in
    /// one of `my_domains`
    #[serde(default)]
    pub default_alias: String,

    /// Display name used when a decoded alias carries no owned name
    #[serde(default)]
    pub default_from_name: String,

    #[serde(default)]
    pub bcc_addresses: Vec<String>,

    /// Also BCC a hidden sender on the mail they relay
    #[serde(default)]
    pub bcc_hidden_sender: bool,

    #[serde(default)]
    pub campaign_name: Option<String>,

    #[serde(default)]
    pub enable_logs: bool,

    #[serde(default)]
    pub relay: RelayConfig,

    /// Program used for native forwarding
    ///
    /// Default: `/usr/sbin/sendmail`
    #[serde(default = "default_sendmail")]
    pub sendmail: PathBuf,
}

fn default_sendmail() -> PathBuf {
    PathBuf::from("/usr/sbin/sendmail")
}

impl Default for Config {
    fn default() -> Self {
        Self {
            blocked: Vec::new(),
            hide_addresses: Vec::new(),
            forward_to: None,
            native_forward: false,
            my_domains: Vec::new(),
            default_alias: String::new(),
            default_from_name: String::new(),
            bcc_addresses: Vec::new(),
            bcc_hidden_sender: false,
            campaign_name: None,
            enable_logs: false,
            relay: RelayConfig::default(),
            sendmail: default_sendmail(),
        }
    }
}

impl Config {
    /// Read the configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if a variable is present but cannot be
    /// interpreted.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read a RON configuration file.
    ///
    /// ```text
    /// (
    ///     hide_addresses: ["me@home.net"],
    ///     forward_to: Some("me@home.net"),
    ///     my_domains: ["mine.com"],
    ///     default_alias: "catchall@mine.com",
    ///     relay: (public_key: "...", secret_key: "..."),
    /// )
    /// ```
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Read`] or [`ConfigError::Parse`].
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;

        ron::from_str(&content).map_err(|err| ConfigError::Parse {
            path: path.display().to_string(),
            reason: err.to_string(),
        })
    }

    /// The file at `path` if given, the process environment otherwise.
    ///
    /// # Errors
    ///
    /// See [`Config::from_file`] and [`Config::from_env`].
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        path.map_or_else(Self::from_env, Self::from_file)
    }

    /// Build the configuration from an arbitrary key lookup. Keys that are
    /// absent keep their defaults.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if a value is present but cannot be
    /// interpreted.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(value) = lookup(keys::BLOCKED) {
            config.blocked = parse_list(keys::BLOCKED, &value)?;
        }
        if let Some(value) = lookup(keys::HIDE_ADDRESSES) {
            config.hide_addresses = parse_list(keys::HIDE_ADDRESSES, &value)?;
        }
        config.forward_to = lookup(keys::FORWARD_TO).and_then(non_empty);
        if let Some(value) = lookup(keys::FORWARD_FROM_CLOUDFLARE) {
            config.native_forward = parse_bool(keys::FORWARD_FROM_CLOUDFLARE, &value)?;
        }
        if let Some(value) = lookup(keys::MY_DOMAINS) {
            config.my_domains = parse_list(keys::MY_DOMAINS, &value)?
                .into_iter()
                .map(Domain::from)
                .collect();
        }
        if let Some(value) = lookup(keys::DEFAULT_ALIAS) {
            config.default_alias = value.trim().to_string();
        }
        if let Some(value) = lookup(keys::DEFAULT_FROM_NAME) {
            config.default_from_name = value;
        }
        if let Some(value) = lookup(keys::BCC_ADDRESSES) {
            config.bcc_addresses = parse_list(keys::BCC_ADDRESSES, &value)?;
        }
        if let Some(value) = lookup(keys::BCC_HIDDEN_SENDER) {
            config.bcc_hidden_sender = parse_bool(keys::BCC_HIDDEN_SENDER, &value)?;
        }
        config.campaign_name = lookup(keys::CAMPAIGN_NAME).and_then(non_empty);
        if let Some(value) = lookup(keys::ENABLE_LOGS) {
            config.enable_logs = parse_bool(keys::ENABLE_LOGS, &value)?;
        }
        if let Some(value) = lookup(keys::MAILJET_PUBLIC_KEY) {
            config.relay.public_key = Secret::new(value);
        }
        if let Some(value) = lookup(keys::MAILJET_SECRET_KEY) {
            config.relay.secret_key = Secret::new(value);
        }
        if let Some(value) = lookup(keys::MAILJET_ENDPOINT).and_then(non_empty) {
            config.relay.endpoint = value;
        }
        if let Some(value) = lookup(keys::RELAY_TIMEOUT_SECS) {
            config.relay.timeout_secs =
                value
                    .trim()
                    .parse()
                    .map_err(|err: std::num::ParseIntError| ConfigError::Invalid {
                        field: keys::RELAY_TIMEOUT_SECS,
                        reason: err.to_string(),
                    })?;
        }
        if let Some(value) = lookup(keys::SENDMAIL_PATH).and_then(non_empty) {
            config.sendmail = PathBuf::from(value);
        }

        Ok(config)
    }

    /// The parsed default alias.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if `DEFAULT_ALIAS` is unset or malformed.
    pub fn default_alias(&self) -> Result<EmailAddress, ConfigError> {
        if self.default_alias.is_empty() {
            return Err(ConfigError::MissingField(keys::DEFAULT_ALIAS));
        }

        EmailAddress::parse(&self.default_alias).map_err(|source| ConfigError::InvalidAddress {
            field: keys::DEFAULT_ALIAS,
            source,
        })
    }

    /// The parsed forwarding target.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if `FORWARD_TO` is unset or malformed.
    pub fn forward_to(&self) -> Result<EmailAddress, ConfigError> {
        let forward_to = self
            .forward_to
            .as_deref()
            .ok_or(ConfigError::MissingField(keys::FORWARD_TO))?;

        EmailAddress::parse(forward_to).map_err(|source| ConfigError::InvalidAddress {
            field: keys::FORWARD_TO,
            source,
        })
    }

    /// Check the fields every dispatch depends on.
    ///
    /// # Errors
    ///
    /// Returns the first [`ConfigError`] found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.default_alias()?;

        if self.forward_to.is_some() {
            self.forward_to()?;
        }

        Ok(())
    }
}

fn non_empty(value: String) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

fn parse_list(field: &'static str, value: &str) -> Result<Vec<String>, ConfigError> {
    let trimmed = value.trim();

    if trimmed.starts_with('[') {
        return serde_json::from_str::<Vec<String>>(trimmed)
            .map(|items| items.into_iter().filter_map(non_empty).collect())
            .map_err(|err| ConfigError::Invalid {
                field,
                reason: err.to_string(),
            });
    }

    Ok(trimmed
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect())
}

fn parse_bool(field: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" | "" => Ok(false),
        other => Err(ConfigError::Invalid {
            field,
            reason: format!("expected a boolean, got '{other}'"),
        }),
    }
}

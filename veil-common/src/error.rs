//! Error types for the veil-common crate.
//!
//! [`AddressError`] is the malformed-address taxonomy shared by every crate
//! that parses a mailbox; [`ConfigError`] covers the configuration surface.

use thiserror::Error;

/// Errors that can occur while parsing an address.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AddressError {
    /// Empty input
    #[error("Empty address")]
    Empty,

    /// Local-part exceeds 64 octets
    #[error("Local-part exceeds 64 octets")]
    LocalPartTooLong,

    /// Domain exceeds 255 octets
    #[error("Domain exceeds 255 octets")]
    DomainTooLong,

    /// Missing opening angle bracket
    #[error("Missing opening angle bracket '<'")]
    MissingOpenBracket,

    /// Missing closing angle bracket
    #[error("Missing closing angle bracket '>'")]
    MissingCloseBracket,

    /// Missing '@' separator in mailbox
    #[error("Missing '@' separator in mailbox")]
    MissingAtSign,

    /// Invalid character in local-part
    #[error("Invalid local-part: {0}")]
    InvalidLocalPart(String),

    /// Invalid character in domain
    #[error("Invalid domain: {0}")]
    InvalidDomain(String),

    /// Invalid address literal format
    #[error("Invalid address literal: {0}")]
    InvalidAddressLiteral(String),

    /// Unclosed quoted string
    #[error("Unclosed quoted string in local-part")]
    UnclosedQuotedString,

    /// Invalid character in quoted string
    #[error("Invalid quoted string: {0}")]
    InvalidQuotedString(String),
}

/// Errors raised while loading or validating the configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A required configuration field is missing.
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    /// A configuration value could not be interpreted.
    #[error("Invalid configuration for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },

    /// A configured address is malformed.
    #[error("Invalid address in {field}: {source}")]
    InvalidAddress {
        field: &'static str,
        #[source]
        source: AddressError,
    },

    /// The configuration file could not be read.
    #[error("Failed to read config from {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The configuration file is not valid RON for [`Config`](crate::Config).
    #[error("Invalid config in {path}: {reason}")]
    Parse { path: String, reason: String },
}

impl ConfigError {
    /// The configuration field this error refers to.
    #[must_use]
    pub const fn field(&self) -> &'static str {
        match self {
            Self::MissingField(field)
            | Self::Invalid { field, .. }
            | Self::InvalidAddress { field, .. } => field,
            Self::Read { .. } | Self::Parse { .. } => crate::config::keys::CONFIG_FILE,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::error::Error as StdError;

    use super::*;

    #[test]
    fn test_address_error_display() {
        assert_eq!(
            AddressError::MissingAtSign.to_string(),
            "Missing '@' separator in mailbox"
        );
        assert_eq!(
            AddressError::InvalidDomain("Empty domain".to_string()).to_string(),
            "Invalid domain: Empty domain"
        );
    }

    #[test]
    fn test_config_error_display() {
        let err = ConfigError::MissingField("DEFAULT_ALIAS");
        assert_eq!(err.to_string(), "Missing required field: DEFAULT_ALIAS");
        assert_eq!(err.field(), "DEFAULT_ALIAS");

        let err = ConfigError::Invalid {
            field: "ENABLE_LOGS",
            reason: "expected a boolean, got 'maybe'".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Invalid configuration for ENABLE_LOGS: expected a boolean, got 'maybe'"
        );
    }

    #[test]
    fn test_error_source_chain() {
        let err = ConfigError::InvalidAddress {
            field: "FORWARD_TO",
            source: AddressError::MissingAtSign,
        };

        assert!(err.source().is_some());
        assert_eq!(err.field(), "FORWARD_TO");
        assert_eq!(
            err.to_string(),
            "Invalid address in FORWARD_TO: Missing '@' separator in mailbox"
        );
    }
}

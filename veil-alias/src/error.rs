use thiserror::Error;
use veil_common::AddressError;

/// Errors raised while building an alias.
///
/// Decoding has no error type: every input decodes to some, possibly empty,
/// [`DecodedAlias`](crate::DecodedAlias).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AliasError {
    /// The original sender's address is not a valid mailbox.
    #[error("Malformed address '{address}': {source}")]
    MalformedAddress {
        address: String,
        #[source]
        source: AddressError,
    },

    /// The address is valid but cannot be embedded without making the alias
    /// ambiguous.
    #[error("Address '{address}' cannot be embedded in an alias: {reason}")]
    Unencodable {
        address: String,
        reason: &'static str,
    },

    /// The fallback alias itself is malformed.
    #[error("Invalid default alias '{address}': {source}")]
    Configuration {
        address: String,
        #[source]
        source: AddressError,
    },
}

impl AliasError {
    /// Returns `true` if the error comes from configuration rather than the
    /// message being processed.
    #[must_use]
    pub const fn is_configuration(&self) -> bool {
        matches!(self, Self::Configuration { .. })
    }
}

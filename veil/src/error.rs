use mailparse::MailParseError;
use thiserror::Error;
use veil_alias::AliasError;
use veil_common::ConfigError;
use veil_relay::RelayError;

/// Failures of the inbound collaborator
#[derive(Debug, Error)]
pub enum InboundError {
    #[error("Unable to read message: {0}")]
    Read(#[from] std::io::Error),

    #[error("Forwarding to {to} failed: {reason}")]
    Forward { to: String, reason: String },
}

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error(transparent)]
    Inbound(#[from] InboundError),

    #[error("Unable to parse message: {0}")]
    Parse(#[from] MailParseError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Alias(#[from] AliasError),

    #[error(transparent)]
    Relay(#[from] RelayError),
}

impl DispatchError {
    /// Returns `true` if the error is caused by how veil is configured,
    /// rather than by the message being dispatched.
    #[must_use]
    pub const fn is_configuration(&self) -> bool {
        match self {
            Self::Config(_) => true,
            Self::Alias(err) => err.is_configuration(),
            Self::Relay(err) => matches!(err, RelayError::Client(_)),
            Self::Inbound(_) | Self::Parse(_) => false,
        }
    }
}

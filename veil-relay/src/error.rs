use thiserror::Error;

#[derive(Debug, Error)]
pub enum RelayError {
    /// The request never got a response: connection failure, TLS error or
    /// timeout.
    #[error("Relay request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The provider answered with a non-success status.
    #[error("Relay rejected the message with status {status}: {body}")]
    Rejected { status: u16, body: String },

    /// A success status with a body that could not be understood.
    #[error("Invalid relay response: {0}")]
    InvalidResponse(String),

    /// The HTTP client could not be set up.
    #[error("Unable to build relay client: {0}")]
    Client(String),
}

impl RelayError {
    #[must_use]
    pub const fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_))
    }

    #[must_use]
    pub const fn is_rejected(&self) -> bool {
        matches!(self, Self::Rejected { .. })
    }

    /// Whether the error came from the provider's response rather than the
    /// connection to it
    #[must_use]
    pub const fn is_response(&self) -> bool {
        matches!(self, Self::Rejected { .. } | Self::InvalidResponse(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classification() {
        let rejected = RelayError::Rejected {
            status: 401,
            body: "Unauthorized".to_string(),
        };
        assert!(rejected.is_rejected());
        assert!(rejected.is_response());
        assert!(!rejected.is_transport());
        assert_eq!(
            rejected.to_string(),
            "Relay rejected the message with status 401: Unauthorized"
        );

        let invalid = RelayError::InvalidResponse("expected value".to_string());
        assert!(invalid.is_response());
        assert!(!invalid.is_rejected());

        let client = RelayError::Client("no TLS backend".to_string());
        assert!(!client.is_response());
        assert!(!client.is_transport());
    }
}

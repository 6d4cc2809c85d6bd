use async_trait::async_trait;
use reqwest::Client;
use veil_common::{config::RelayConfig, config::Secret, outgoing};

use crate::{
    OutboundRelay,
    error::RelayError,
    message::{OutboundMessage, RelayReceipt},
    wire::{SendRequest, SendResponse},
};

/// Relay through the Mailjet v3.1 send API.
///
/// Requests use HTTP basic authentication with the public key as the user
/// and the secret key as the password, and are bounded by the configured
/// timeout.
#[derive(Debug, Clone)]
pub struct MailjetRelay {
    client: Client,
    endpoint: String,
    public_key: Secret,
    secret_key: Secret,
}

impl MailjetRelay {
    /// # Errors
    ///
    /// Returns [`RelayError::Client`] if the HTTP client cannot be built.
    pub fn new(config: &RelayConfig) -> Result<Self, RelayError> {
        let client = Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|err| RelayError::Client(err.to_string()))?;

        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            public_key: config.public_key.clone(),
            secret_key: config.secret_key.clone(),
        })
    }

    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl OutboundRelay for MailjetRelay {
    async fn send(&self, message: &OutboundMessage) -> Result<RelayReceipt, RelayError> {
        outgoing!(level = DEBUG, "Relaying {message} via {}", self.endpoint);

        let response = self
            .client
            .post(&self.endpoint)
            .basic_auth(self.public_key.expose(), Some(self.secret_key.expose()))
            .json(&SendRequest::from(message))
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            outgoing!(level = WARN, "Relay responded {status}: {body}");
            return Err(RelayError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        let receipt: RelayReceipt = serde_json::from_str::<SendResponse>(&body)
            .map_err(|err| RelayError::InvalidResponse(err.to_string()))?
            .into();

        outgoing!(level = INFO, "Relay accepted message: {:?}", receipt.statuses);

        Ok(receipt)
    }
}

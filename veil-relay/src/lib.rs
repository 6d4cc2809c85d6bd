//! Outbound relay for veil
//!
//! Every message veil sends goes through an [`OutboundRelay`]. The only
//! implementation shipped is [`MailjetRelay`], which POSTs the Mailjet v3.1
//! send format over HTTPS.
//!
//! Each call is a single attempt. Nothing here retries, queues or applies
//! backpressure; a failed send is reported once to the caller and that is the
//! end of it.

mod error;
mod mailjet;
mod message;
mod wire;

use async_trait::async_trait;

pub use error::RelayError;
pub use mailjet::MailjetRelay;
pub use message::{OutboundMessage, RelayReceipt};

/// Something that can put a message on its way
#[async_trait]
pub trait OutboundRelay: Send + Sync {
    /// Attempt delivery of `message` once.
    ///
    /// # Errors
    ///
    /// Returns a [`RelayError`] when the message could not be handed over.
    async fn send(&self, message: &OutboundMessage) -> Result<RelayReceipt, RelayError>;
}

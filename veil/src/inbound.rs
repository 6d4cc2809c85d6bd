//! The inbound side: where a message comes from and what can be done with it
//! other than relaying.

use std::{path::PathBuf, process::Stdio};

use async_trait::async_trait;
use tokio::{
    io::{AsyncRead, AsyncReadExt, AsyncWriteExt},
    process::Command,
};
use veil_common::{EmailAddress, incoming, outgoing};

use crate::error::InboundError;

/// Upper bound on what a size hint may preallocate
const MAX_PREALLOCATION: usize = 16 * 1024 * 1024;

/// A message handed to veil for dispatch
#[async_trait]
pub trait Inbound: Send {
    /// The envelope sender, exactly as received
    fn envelope_from(&self) -> &str;

    /// The envelope recipient, exactly as received
    fn envelope_to(&self) -> &str;

    /// Read the whole raw message.
    ///
    /// # Errors
    ///
    /// Returns an [`InboundError`] if the message cannot be read.
    async fn read_raw(&mut self) -> Result<Vec<u8>, InboundError>;

    /// Refuse the message, telling the sending side why.
    ///
    /// # Errors
    ///
    /// Returns an [`InboundError`] if the refusal cannot be delivered.
    async fn reject(&mut self, reason: &str) -> Result<(), InboundError>;

    /// Hand the raw message to the platform's own forwarding.
    ///
    /// # Errors
    ///
    /// Returns an [`InboundError`] if forwarding fails.
    async fn forward(&mut self, to: &EmailAddress, raw: &[u8]) -> Result<(), InboundError>;
}

/// A message piped in by the MTA, e.g. through a Postfix `pipe(8)` transport.
///
/// Rejections are recorded for the caller to report (the binary turns them
/// into an exit status); forwarding runs `sendmail`.
pub struct PipedMessage<R> {
    from: String,
    to: String,
    reader: R,
    size: Option<usize>,
    sendmail: PathBuf,
    rejection: Option<String>,
}

impl PipedMessage<tokio::io::Stdin> {
    /// A message read from standard input
    #[must_use]
    pub fn stdin(from: impl Into<String>, to: impl Into<String>, sendmail: PathBuf) -> Self {
        Self::new(from, to, tokio::io::stdin(), sendmail)
    }
}

impl<R> PipedMessage<R>
where
    R: AsyncRead + Unpin + Send,
{
    #[must_use]
    pub fn new(
        from: impl Into<String>,
        to: impl Into<String>,
        reader: R,
        sendmail: PathBuf,
    ) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            reader,
            size: None,
            sendmail,
            rejection: None,
        }
    }

    /// The size of the message in bytes, when the MTA provides it. Only used
    /// as an allocation hint, capped at 16 MiB.
    #[must_use]
    pub fn with_size(mut self, size: Option<usize>) -> Self {
        self.size = size;
        self
    }

    /// The reason given if the message was rejected
    #[must_use]
    pub fn rejection(&self) -> Option<&str> {
        self.rejection.as_deref()
    }
}

#[async_trait]
impl<R> Inbound for PipedMessage<R>
where
    R: AsyncRead + Unpin + Send,
{
    fn envelope_from(&self) -> &str {
        &self.from
    }

    fn envelope_to(&self) -> &str {
        &self.to
    }

    async fn read_raw(&mut self) -> Result<Vec<u8>, InboundError> {
        let capacity = self.size.unwrap_or_default().min(MAX_PREALLOCATION);
        let mut raw = Vec::with_capacity(capacity);
        self.reader.read_to_end(&mut raw).await?;

        incoming!("Read {} bytes from {}", raw.len(), self.from);

        Ok(raw)
    }

    async fn reject(&mut self, reason: &str) -> Result<(), InboundError> {
        self.rejection = Some(reason.to_string());
        Ok(())
    }

    async fn forward(&mut self, to: &EmailAddress, raw: &[u8]) -> Result<(), InboundError> {
        outgoing!(
            level = INFO,
            "Forwarding via {} to {to}",
            self.sendmail.display()
        );

        let forward_error = |reason: String| InboundError::Forward {
            to: to.to_string(),
            reason,
        };

        let mut child = Command::new(&self.sendmail)
            .arg("-i")
            .arg("-f")
            .arg(&self.from)
            .arg("--")
            .arg(to.to_string())
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .spawn()
            .map_err(|err| forward_error(err.to_string()))?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin
                .write_all(raw)
                .await
                .map_err(|err| forward_error(err.to_string()))?;
            stdin
                .shutdown()
                .await
                .map_err(|err| forward_error(err.to_string()))?;
        }

        let status = child
            .wait()
            .await
            .map_err(|err| forward_error(err.to_string()))?;
        if status.success() {
            Ok(())
        } else {
            Err(forward_error(format!("sendmail exited with {status}")))
        }
    }
}

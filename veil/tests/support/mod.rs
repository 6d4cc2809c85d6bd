//! Test doubles for the inbound and relay collaborators
#![allow(dead_code)] // Test utility module - not all items used in every test

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;
use veil::{Inbound, InboundError, common::EmailAddress};
use veil_relay::{OutboundMessage, OutboundRelay, RelayError, RelayReceipt};

/// A relay that records every message and answers with a fixed result
#[derive(Default)]
pub struct RecordingRelay {
    sent: Mutex<Vec<OutboundMessage>>,
    reject_with: Option<u16>,
    statuses: Option<Vec<String>>,
}

impl RecordingRelay {
    #[must_use]
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// A relay whose provider answers every request with `status`
    #[must_use]
    pub fn rejecting(status: u16) -> Arc<Self> {
        Arc::new(Self {
            sent: Mutex::default(),
            reject_with: Some(status),
            statuses: None,
        })
    }

    /// A relay whose provider accepts every request with `statuses`
    #[must_use]
    pub fn answering(statuses: &[&str]) -> Arc<Self> {
        Arc::new(Self {
            sent: Mutex::default(),
            reject_with: None,
            statuses: Some(statuses.iter().map(ToString::to_string).collect()),
        })
    }

    pub async fn sent(&self) -> Vec<OutboundMessage> {
        self.sent.lock().await.clone()
    }
}

#[async_trait]
impl OutboundRelay for RecordingRelay {
    async fn send(&self, message: &OutboundMessage) -> Result<RelayReceipt, RelayError> {
        self.sent.lock().await.push(message.clone());

        match self.reject_with {
            Some(status) => Err(RelayError::Rejected {
                status,
                body: "rejected".to_string(),
            }),
            None => Ok(RelayReceipt {
                statuses: self
                    .statuses
                    .clone()
                    .unwrap_or_else(|| vec!["success".to_string()]),
            }),
        }
    }
}

/// An in-memory inbound message
pub struct MemoryInbound {
    pub from: String,
    pub to: String,
    pub raw: Vec<u8>,
    pub rejection: Option<String>,
    pub forwarded: Vec<(EmailAddress, Vec<u8>)>,
}

impl MemoryInbound {
    #[must_use]
    pub fn new(from: &str, to: &str, raw: &str) -> Self {
        Self {
            from: from.to_string(),
            to: to.to_string(),
            raw: raw.as_bytes().to_vec(),
            rejection: None,
            forwarded: Vec::new(),
        }
    }
}

#[async_trait]
impl Inbound for MemoryInbound {
    fn envelope_from(&self) -> &str {
        &self.from
    }

    fn envelope_to(&self) -> &str {
        &self.to
    }

    async fn read_raw(&mut self) -> Result<Vec<u8>, InboundError> {
        Ok(self.raw.clone())
    }

    async fn reject(&mut self, reason: &str) -> Result<(), InboundError> {
        self.rejection = Some(reason.to_string());
        Ok(())
    }

    async fn forward(&mut self, to: &EmailAddress, raw: &[u8]) -> Result<(), InboundError> {
        self.forwarded.push((to.clone(), raw.to_vec()));
        Ok(())
    }
}

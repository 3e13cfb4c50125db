//! Mock `MessageChannel` implementations for tests.

use std::sync::Mutex;

use async_trait::async_trait;
use reelstory_core::error::DomainError;
use reelstory_core::ports::{MessageChannel, OutboundMessage};

/// A message channel that records every message it is handed and always
/// succeeds.
#[derive(Debug, Default)]
pub struct RecordingMessageChannel {
    sent: Mutex<Vec<OutboundMessage>>,
}

impl RecordingMessageChannel {
    /// Create an empty recording channel.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a snapshot of all messages sent so far.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn sent_messages(&self) -> Vec<OutboundMessage> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl MessageChannel for RecordingMessageChannel {
    async fn send(&self, message: OutboundMessage) -> Result<(), DomainError> {
        self.sent.lock().unwrap().push(message);
        Ok(())
    }
}

/// A message channel that always fails with an infrastructure error.
#[derive(Debug)]
pub struct FailingMessageChannel;

#[async_trait]
impl MessageChannel for FailingMessageChannel {
    async fn send(&self, _message: OutboundMessage) -> Result<(), DomainError> {
        Err(DomainError::Infrastructure("network unreachable".into()))
    }
}

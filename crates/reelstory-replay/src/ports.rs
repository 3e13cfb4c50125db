//! Port implementations that only log.
//!
//! The harness has no messaging or storage backend; every side effect is
//! written to the trace instead.

use async_trait::async_trait;
use reelstory_core::error::DomainError;
use reelstory_core::ports::{MessageChannel, OutboundMessage, StoryStore};
use tracing::info;
use uuid::Uuid;

/// A message channel that logs each message and reports success.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingMessageChannel;

#[async_trait]
impl MessageChannel for LoggingMessageChannel {
    async fn send(&self, message: OutboundMessage) -> Result<(), DomainError> {
        info!(
            from_user_id = %message.from_user_id,
            to_user_id = %message.to_user_id,
            content = %message.content,
            "direct message sent"
        );
        Ok(())
    }
}

/// A story store that logs each mutation and reports success.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingStoryStore;

#[async_trait]
impl StoryStore for LoggingStoryStore {
    async fn delete_story(&self, story_id: Uuid) -> Result<(), DomainError> {
        info!(%story_id, "story deleted");
        Ok(())
    }

    async fn report_story(&self, story_id: Uuid, reporter_id: Uuid) -> Result<(), DomainError> {
        info!(%story_id, %reporter_id, "story reported");
        Ok(())
    }

    async fn record_view(&self, story_id: Uuid, viewer_id: Uuid) -> Result<(), DomainError> {
        info!(%story_id, %viewer_id, "story view recorded");
        Ok(())
    }
}

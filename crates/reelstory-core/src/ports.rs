//! Collaborator ports.
//!
//! The player never talks to the backend directly. Messages and story
//! mutations leave through these traits so that hosts can plug in their own
//! transport and tests can record what was sent.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::DomainError;

/// A plain-text direct message addressed to a story's author.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutboundMessage {
    /// The viewer sending the message.
    pub from_user_id: Uuid,
    /// The story author receiving it.
    pub to_user_id: Uuid,
    /// Reply text or a reaction glyph.
    pub content: String,
}

/// Reaction/reply channel. Delivery is at-most-once and unacknowledged.
#[async_trait]
pub trait MessageChannel: Send + Sync {
    /// Hands a message to the messaging backend.
    async fn send(&self, message: OutboundMessage) -> Result<(), DomainError>;
}

/// Story mutations the player may request.
#[async_trait]
pub trait StoryStore: Send + Sync {
    /// Removes a story from the durable store.
    async fn delete_story(&self, story_id: Uuid) -> Result<(), DomainError>;

    /// Flags a story for moderation.
    async fn report_story(&self, story_id: Uuid, reporter_id: Uuid) -> Result<(), DomainError>;

    /// Records that a viewer has seen a story.
    async fn record_view(&self, story_id: Uuid, viewer_id: Uuid) -> Result<(), DomainError>;
}

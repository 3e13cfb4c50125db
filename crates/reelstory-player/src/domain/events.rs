//! Domain events for the story player.

use reelstory_core::event::{DomainEvent, EventMetadata};
use reelstory_core::ports::OutboundMessage;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::reactions::ReactionKind;

/// Why playback is frozen. Playback resumes once no reason is left.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PauseReason {
    /// The viewer is pressing and holding the media surface.
    Hold,
    /// The reply field has focus.
    ReplyFocus,
    /// The overflow menu or delete confirmation is open.
    Menu,
    /// A confirmed delete is waiting for the backend.
    Deleting,
}

/// Why a session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CloseReason {
    /// The last segment of the last story completed.
    Exhausted,
    /// The viewer pressed close.
    User,
    /// The owner deleted the story and the backend confirmed.
    Deleted,
    /// The host stopped feeding input.
    Detached,
}

/// Emitted when a session opens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionOpened {
    /// The player session identifier.
    pub session_id: Uuid,
    /// Who is watching.
    pub viewer_id: Uuid,
    /// Number of stories handed to the player.
    pub story_count: usize,
}

/// Emitted whenever a segment becomes the active one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SegmentEntered {
    /// The story owning the segment.
    pub story_id: Uuid,
    /// Index into the story list.
    pub story_index: usize,
    /// Index into the story's segments.
    pub segment_index: usize,
}

/// Emitted when a pause reason becomes active.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaybackPaused {
    /// The reason added.
    pub reason: PauseReason,
}

/// Emitted when a pause reason is released.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaybackResumed {
    /// The reason released.
    pub reason: PauseReason,
}

/// Emitted when the active segment's media failed to load.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaFailed {
    /// The story owning the segment.
    pub story_id: Uuid,
    /// Index into the story's segments.
    pub segment_index: usize,
}

/// Emitted the first time a non-owner sees a story in this session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoryViewed {
    /// The viewed story.
    pub story_id: Uuid,
    /// Who viewed it.
    pub viewer_id: Uuid,
}

/// Emitted when a viewer sends a quick reaction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReactionSent {
    /// The story reacted to.
    pub story_id: Uuid,
    /// Which reaction.
    pub reaction: ReactionKind,
    /// The message handed to the channel.
    pub message: OutboundMessage,
}

/// Emitted when a viewer sends a text reply.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReplySent {
    /// The story replied to.
    pub story_id: Uuid,
    /// The message handed to the channel.
    pub message: OutboundMessage,
}

/// Emitted when the owner confirms deletion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeletionRequested {
    /// The story to delete.
    pub story_id: Uuid,
}

/// Emitted once the backend has confirmed a deletion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoryDeleted {
    /// The deleted story.
    pub story_id: Uuid,
}

/// Emitted when every delete attempt failed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeletionFailed {
    /// The story that is still live.
    pub story_id: Uuid,
    /// Attempts made.
    pub attempts: u32,
    /// Last error seen.
    pub error: String,
}

/// Emitted when a viewer reports a story.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoryReported {
    /// The reported story.
    pub story_id: Uuid,
    /// Who reported it.
    pub reporter_id: Uuid,
}

/// Emitted when the viewer should see a transient toast.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NoticeRaised {
    /// Text of the toast.
    pub message: String,
}

/// Emitted when the session ends.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClosed {
    /// Why.
    pub reason: CloseReason,
}

/// Event type identifier for [`SessionOpened`].
pub const SESSION_OPENED_EVENT_TYPE: &str = "player.session_opened";
/// Event type identifier for [`SegmentEntered`].
pub const SEGMENT_ENTERED_EVENT_TYPE: &str = "player.segment_entered";
/// Event type identifier for [`PlaybackPaused`].
pub const PLAYBACK_PAUSED_EVENT_TYPE: &str = "player.playback_paused";
/// Event type identifier for [`PlaybackResumed`].
pub const PLAYBACK_RESUMED_EVENT_TYPE: &str = "player.playback_resumed";
/// Event type identifier for [`MediaFailed`].
pub const MEDIA_FAILED_EVENT_TYPE: &str = "player.media_failed";
/// Event type identifier for [`StoryViewed`].
pub const STORY_VIEWED_EVENT_TYPE: &str = "player.story_viewed";
/// Event type identifier for [`ReactionSent`].
pub const REACTION_SENT_EVENT_TYPE: &str = "player.reaction_sent";
/// Event type identifier for [`ReplySent`].
pub const REPLY_SENT_EVENT_TYPE: &str = "player.reply_sent";
/// Event type identifier for [`DeletionRequested`].
pub const DELETION_REQUESTED_EVENT_TYPE: &str = "player.deletion_requested";
/// Event type identifier for [`StoryDeleted`].
pub const STORY_DELETED_EVENT_TYPE: &str = "player.story_deleted";
/// Event type identifier for [`DeletionFailed`].
pub const DELETION_FAILED_EVENT_TYPE: &str = "player.deletion_failed";
/// Event type identifier for [`StoryReported`].
pub const STORY_REPORTED_EVENT_TYPE: &str = "player.story_reported";
/// Event type identifier for [`NoticeRaised`].
pub const NOTICE_RAISED_EVENT_TYPE: &str = "player.notice_raised";
/// Event type identifier for [`SessionClosed`].
pub const SESSION_CLOSED_EVENT_TYPE: &str = "player.session_closed";

/// Event payload variants for the story player.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum PlayerEventKind {
    /// A session has opened.
    SessionOpened(SessionOpened),
    /// A segment became active.
    SegmentEntered(SegmentEntered),
    /// A pause reason was added.
    PlaybackPaused(PlaybackPaused),
    /// A pause reason was released.
    PlaybackResumed(PlaybackResumed),
    /// The active segment's media failed.
    MediaFailed(MediaFailed),
    /// A non-owner saw a story for the first time.
    StoryViewed(StoryViewed),
    /// A reaction was sent.
    ReactionSent(ReactionSent),
    /// A reply was sent.
    ReplySent(ReplySent),
    /// The owner confirmed deletion.
    DeletionRequested(DeletionRequested),
    /// The backend confirmed deletion.
    StoryDeleted(StoryDeleted),
    /// Deletion gave up.
    DeletionFailed(DeletionFailed),
    /// A viewer reported the story.
    StoryReported(StoryReported),
    /// A toast should be shown.
    NoticeRaised(NoticeRaised),
    /// The session ended.
    SessionClosed(SessionClosed),
}

impl PlayerEventKind {
    /// The event type identifier for this payload.
    #[must_use]
    pub const fn event_type(&self) -> &'static str {
        match self {
            Self::SessionOpened(_) => SESSION_OPENED_EVENT_TYPE,
            Self::SegmentEntered(_) => SEGMENT_ENTERED_EVENT_TYPE,
            Self::PlaybackPaused(_) => PLAYBACK_PAUSED_EVENT_TYPE,
            Self::PlaybackResumed(_) => PLAYBACK_RESUMED_EVENT_TYPE,
            Self::MediaFailed(_) => MEDIA_FAILED_EVENT_TYPE,
            Self::StoryViewed(_) => STORY_VIEWED_EVENT_TYPE,
            Self::ReactionSent(_) => REACTION_SENT_EVENT_TYPE,
            Self::ReplySent(_) => REPLY_SENT_EVENT_TYPE,
            Self::DeletionRequested(_) => DELETION_REQUESTED_EVENT_TYPE,
            Self::StoryDeleted(_) => STORY_DELETED_EVENT_TYPE,
            Self::DeletionFailed(_) => DELETION_FAILED_EVENT_TYPE,
            Self::StoryReported(_) => STORY_REPORTED_EVENT_TYPE,
            Self::NoticeRaised(_) => NOTICE_RAISED_EVENT_TYPE,
            Self::SessionClosed(_) => SESSION_CLOSED_EVENT_TYPE,
        }
    }
}

/// Domain event envelope for the story player.
#[derive(Debug, Clone)]
pub struct PlayerEvent {
    /// Event metadata.
    pub metadata: EventMetadata,
    /// Event-specific payload.
    pub kind: PlayerEventKind,
}

impl DomainEvent for PlayerEvent {
    fn event_type(&self) -> &'static str {
        self.kind.event_type()
    }

    fn to_payload(&self) -> serde_json::Value {
        // Serialization of derived Serialize types to Value is infallible.
        serde_json::to_value(&self.kind).expect("PlayerEventKind serialization is infallible")
    }

    fn metadata(&self) -> &EventMetadata {
        &self.metadata
    }
}

//! Story and segment model shared by the creator and the player.

use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Display time for an image segment.
pub const IMAGE_SEGMENT_DURATION: Duration = Duration::from_millis(5_000);

/// Display time for a video segment, independent of the decoded media length.
pub const VIDEO_SEGMENT_DURATION: Duration = Duration::from_millis(20_000);

/// How long a story stays in the visible set after creation.
pub const STORY_LIFETIME_HOURS: i64 = 24;

/// Media kind of a segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SegmentKind {
    /// A still image.
    Image,
    /// A video clip.
    Video,
}

impl SegmentKind {
    /// The fixed display duration for this kind of segment.
    #[must_use]
    pub const fn nominal_duration(self) -> Duration {
        match self {
            Self::Image => IMAGE_SEGMENT_DURATION,
            Self::Video => VIDEO_SEGMENT_DURATION,
        }
    }
}

/// Who may see a story.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Privacy {
    /// Everyone.
    #[default]
    Public,
    /// Friends only.
    Friends,
    /// The author's close-friends list.
    CloseFriends,
}

/// One playable unit of a story.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Segment {
    /// Media reference (URL or storage key).
    pub media_url: String,
    /// Image or video.
    pub kind: SegmentKind,
    /// Display duration in milliseconds.
    pub duration_ms: u64,
}

impl Segment {
    /// An image segment with the nominal image duration.
    #[must_use]
    pub fn image(media_url: impl Into<String>) -> Self {
        Self::with_kind(media_url, SegmentKind::Image)
    }

    /// A video segment with the nominal video duration.
    #[must_use]
    pub fn video(media_url: impl Into<String>) -> Self {
        Self::with_kind(media_url, SegmentKind::Video)
    }

    /// A segment of the given kind with its nominal duration.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn with_kind(media_url: impl Into<String>, kind: SegmentKind) -> Self {
        Self {
            media_url: media_url.into(),
            kind,
            duration_ms: kind.nominal_duration().as_millis() as u64,
        }
    }

    /// Display duration.
    #[must_use]
    pub const fn duration(&self) -> Duration {
        Duration::from_millis(self.duration_ms)
    }
}

/// A story as handed to the player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Story {
    /// Story identifier.
    pub id: Uuid,
    /// The author.
    pub user_id: Uuid,
    /// Author display name, denormalized at fetch time.
    pub display_name: String,
    /// Author avatar, denormalized at fetch time.
    #[serde(default)]
    pub avatar_url: Option<String>,
    /// Ordered segments. Never empty for a story handed to the player.
    pub segments: Vec<Segment>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Number of recorded views.
    #[serde(default)]
    pub view_count: u64,
    /// Audience.
    #[serde(default)]
    pub privacy: Privacy,
}

impl Story {
    /// When the story leaves the visible set.
    #[must_use]
    pub fn expires_at(&self) -> DateTime<Utc> {
        self.created_at + TimeDelta::hours(STORY_LIFETIME_HOURS)
    }

    /// Whether the story has expired at `now`.
    #[must_use]
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at()
    }

    /// Whether `user_id` authored this story.
    #[must_use]
    pub fn is_owned_by(&self, user_id: Uuid) -> bool {
        self.user_id == user_id
    }
}

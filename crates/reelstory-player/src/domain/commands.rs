//! Commands for the story player.
//!
//! Gestures that only move the cursor (taps, holds, ticks) are plain method
//! calls on the aggregate. The commands here carry a payload or have effects
//! outside the player.

use reelstory_core::command::Command;
use reelstory_core::story::Story;
use uuid::Uuid;

use super::reactions::ReactionKind;

/// Command to open a player over a list of stories.
#[derive(Debug, Clone)]
pub struct OpenPlayer {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// Who is watching.
    pub viewer_id: Uuid,
    /// Stories to play, in order.
    pub stories: Vec<Story>,
    /// Story to start from.
    pub initial_story_index: usize,
}

impl Command for OpenPlayer {
    fn name(&self) -> &'static str {
        "player.open"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}

/// Command to send a quick reaction to the active story's author.
#[derive(Debug, Clone)]
pub struct ReactToStory {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The reaction to send.
    pub reaction: ReactionKind,
}

impl Command for ReactToStory {
    fn name(&self) -> &'static str {
        "player.react_to_story"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}

/// Command to send a text reply to the active story's author.
#[derive(Debug, Clone)]
pub struct ReplyToStory {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// Reply text.
    pub text: String,
}

impl Command for ReplyToStory {
    fn name(&self) -> &'static str {
        "player.reply_to_story"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}

/// Command to delete the active story, issued from the confirmation prompt.
#[derive(Debug, Clone)]
pub struct DeleteStory {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
}

impl Command for DeleteStory {
    fn name(&self) -> &'static str {
        "player.delete_story"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}

/// Command to report the active story.
#[derive(Debug, Clone)]
pub struct ReportStory {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
}

impl Command for ReportStory {
    fn name(&self) -> &'static str {
        "player.report_story"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}

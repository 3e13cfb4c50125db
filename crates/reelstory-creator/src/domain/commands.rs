//! Commands for the story creator.

use reelstory_core::command::Command;
use reelstory_core::story::Privacy;
use uuid::Uuid;

use super::media::MediaSelection;

/// Command to compose a story from selected media.
#[derive(Debug, Clone)]
pub struct ComposeStory {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The author.
    pub author_id: Uuid,
    /// Author display name at compose time.
    pub display_name: String,
    /// Author avatar at compose time.
    pub avatar_url: Option<String>,
    /// Selected media, in playback order.
    pub selections: Vec<MediaSelection>,
    /// Audience.
    pub privacy: Privacy,
}

impl Command for ComposeStory {
    fn name(&self) -> &'static str {
        "creator.compose_story"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}

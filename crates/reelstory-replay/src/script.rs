//! Replay scripts.
//!
//! A script names the viewer, the stories to play (given verbatim or as
//! drafts composed at load time) and the inputs to feed, each stamped with
//! its offset from session start.

use std::path::Path;

use reelstory_core::clock::Clock;
use reelstory_core::story::{Privacy, Story};
use reelstory_creator::domain::commands::ComposeStory;
use reelstory_creator::domain::composer::compose_story;
use reelstory_creator::domain::media::MediaSelection;
use reelstory_player::application::PlayerInput;
use serde::Deserialize;
use uuid::Uuid;

use crate::error::AppError;

/// A story to be composed from picked media.
#[derive(Debug, Clone, Deserialize)]
pub struct StoryDraft {
    /// The author.
    pub author_id: Uuid,
    /// Author display name.
    pub display_name: String,
    /// Author avatar.
    #[serde(default)]
    pub avatar_url: Option<String>,
    /// Audience.
    #[serde(default)]
    pub privacy: Privacy,
    /// Picked media, in playback order.
    pub media: Vec<MediaSelection>,
}

/// One input and when to deliver it.
#[derive(Debug, Clone, Deserialize)]
pub struct TimedInput {
    /// Offset from session start, in milliseconds.
    pub at_ms: u64,
    /// The input.
    pub input: PlayerInput,
}

/// A full replay script.
#[derive(Debug, Clone, Deserialize)]
pub struct Script {
    /// The user watching.
    pub viewer_id: Uuid,
    /// Story the session opens on.
    #[serde(default)]
    pub initial_story_index: usize,
    /// Stories given as-is.
    #[serde(default)]
    pub stories: Vec<Story>,
    /// Stories composed before the session opens, appended after `stories`.
    #[serde(default)]
    pub drafts: Vec<StoryDraft>,
    /// Inputs to feed.
    #[serde(default)]
    pub inputs: Vec<TimedInput>,
    /// When set, the harness detaches from the session at this offset
    /// instead of waiting for it to close.
    #[serde(default)]
    pub detach_at_ms: Option<u64>,
}

impl Script {
    /// Parses a script from JSON.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Script` if the JSON does not describe a script.
    pub fn from_json(json: &str) -> Result<Self, AppError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Reads and parses a script file.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Io` if the file cannot be read and
    /// `AppError::Script` if it cannot be parsed.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, AppError> {
        let json = tokio::fs::read_to_string(path).await?;
        Self::from_json(&json)
    }

    /// All stories in play order, composing drafts with `clock`.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Domain` if a draft is rejected by the creator.
    pub fn assemble_stories(&self, clock: &dyn Clock) -> Result<Vec<Story>, AppError> {
        let mut stories = self.stories.clone();
        for draft in &self.drafts {
            let command = ComposeStory {
                correlation_id: Uuid::new_v4(),
                author_id: draft.author_id,
                display_name: draft.display_name.clone(),
                avatar_url: draft.avatar_url.clone(),
                selections: draft.media.clone(),
                privacy: draft.privacy,
            };
            stories.push(compose_story(command, clock)?);
        }
        Ok(stories)
    }

    /// Inputs ordered by delivery time. Inputs sharing an offset keep their
    /// script order.
    #[must_use]
    pub fn ordered_inputs(&self) -> Vec<TimedInput> {
        let mut inputs = self.inputs.clone();
        inputs.sort_by_key(|timed| timed.at_ms);
        inputs
    }
}

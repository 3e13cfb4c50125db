//! Query handlers for the story player.
//!
//! Projects the aggregate into a read-only view the UI renders from.

use reelstory_core::story::Segment;
use serde::Serialize;
use uuid::Uuid;

use crate::domain::aggregates::{PlayerState, StoryPlayer};
use crate::domain::cursor::PlaybackCursor;
use crate::domain::events::{CloseReason, PauseReason};
use crate::domain::reactions::ReactionKind;

/// Controls shown under the media surface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Controls {
    /// The author sees how many people viewed the story.
    Owner {
        /// Recorded views.
        view_count: u64,
    },
    /// Everyone else gets the reply field and the reaction tray.
    Viewer {
        /// Reactions offered, in tray order.
        reactions: Vec<ReactionKind>,
    },
}

/// The action the overflow menu offers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MenuAction {
    /// Author only.
    Delete,
    /// Everyone else.
    Report,
}

/// Read-only view of a player session.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayerView {
    /// The session identifier.
    pub session_id: Uuid,
    /// Coarse state.
    pub state: PlayerState,
    /// Cursor, absent once closed.
    pub cursor: Option<PlaybackCursor>,
    /// Active segment generation.
    pub epoch: u64,
    /// Active story, absent once closed.
    pub story_id: Option<Uuid>,
    /// Author display name of the active story.
    pub author_name: Option<String>,
    /// Author avatar of the active story.
    pub author_avatar_url: Option<String>,
    /// Active segment.
    pub segment: Option<Segment>,
    /// Controls under the media surface.
    pub controls: Option<Controls>,
    /// Overflow menu action.
    pub menu_action: Option<MenuAction>,
    /// Active pause reasons.
    pub pause_reasons: Vec<PauseReason>,
    /// Pending toasts.
    pub notices: Vec<String>,
    /// Whether the media element should be decoding.
    pub media_should_play: bool,
    /// Why the session ended, once it has.
    pub close_reason: Option<CloseReason>,
}

/// Builds the view for a session.
#[must_use]
pub fn get_player_view(player: &StoryPlayer) -> PlayerView {
    let pause_reasons = player.pause_reasons().iter().copied().collect();
    let notices = player.notices().to_vec();

    if player.is_closed() {
        return PlayerView {
            session_id: player.id,
            state: PlayerState::Closed,
            cursor: None,
            epoch: player.epoch(),
            story_id: None,
            author_name: None,
            author_avatar_url: None,
            segment: None,
            controls: None,
            menu_action: None,
            pause_reasons,
            notices,
            media_should_play: false,
            close_reason: player.close_reason(),
        };
    }

    let story = player.active_story();
    let (controls, menu_action) = if player.is_owner_view() {
        (
            Controls::Owner {
                view_count: story.view_count,
            },
            MenuAction::Delete,
        )
    } else {
        (
            Controls::Viewer {
                reactions: ReactionKind::ALL.to_vec(),
            },
            MenuAction::Report,
        )
    };

    PlayerView {
        session_id: player.id,
        state: player.state(),
        cursor: player.cursor(),
        epoch: player.epoch(),
        story_id: Some(story.id),
        author_name: Some(story.display_name.clone()),
        author_avatar_url: story.avatar_url.clone(),
        segment: Some(player.active_segment().clone()),
        controls: Some(controls),
        menu_action: Some(menu_action),
        pause_reasons,
        notices,
        media_should_play: player.media_should_play(),
        close_reason: None,
    }
}

#[cfg(test)]
mod tests {
    use reelstory_core::story::Story;
    use uuid::Uuid;

    use super::*;
    use crate::config::PlayerConfig;
    use crate::domain::commands::OpenPlayer;
    use reelstory_test_support::{FixedClock, fixed_now, image_story};

    fn open(viewer_id: Uuid, stories: Vec<Story>) -> StoryPlayer {
        StoryPlayer::open(
            OpenPlayer {
                correlation_id: Uuid::new_v4(),
                viewer_id,
                stories,
                initial_story_index: 0,
            },
            &PlayerConfig::default(),
            &FixedClock(fixed_now()),
        )
        .unwrap()
    }

    #[test]
    fn test_owner_view_shows_view_count_and_delete() {
        // Arrange
        let owner_id = Uuid::new_v4();
        let mut story = image_story(owner_id, 1);
        story.view_count = 42;
        let player = open(owner_id, vec![story]);

        // Act
        let view = get_player_view(&player);

        // Assert
        assert_eq!(view.controls, Some(Controls::Owner { view_count: 42 }));
        assert_eq!(view.menu_action, Some(MenuAction::Delete));
        assert!(view.media_should_play);
    }

    #[test]
    fn test_viewer_view_shows_reactions_and_report() {
        // Arrange
        let player = open(Uuid::new_v4(), vec![image_story(Uuid::new_v4(), 1)]);

        // Act
        let view = get_player_view(&player);

        // Assert
        match view.controls {
            Some(Controls::Viewer { reactions }) => assert_eq!(reactions.len(), 6),
            other => panic!("expected viewer controls, got {other:?}"),
        }
        assert_eq!(view.menu_action, Some(MenuAction::Report));
        assert_eq!(view.state, PlayerState::Playing);
    }

    #[test]
    fn test_closed_view_has_no_cursor() {
        // Arrange
        let mut player = open(Uuid::new_v4(), vec![image_story(Uuid::new_v4(), 1)]);
        player.close(CloseReason::User, Uuid::new_v4(), &FixedClock(fixed_now()));

        // Act
        let view = get_player_view(&player);

        // Assert
        assert_eq!(view.state, PlayerState::Closed);
        assert!(view.cursor.is_none());
        assert!(!view.media_should_play);
        assert_eq!(view.close_reason, Some(CloseReason::User));
    }

    #[test]
    fn test_view_serializes_controls_with_kind_tag() {
        // Arrange
        let owner_id = Uuid::new_v4();
        let player = open(owner_id, vec![image_story(owner_id, 1)]);

        // Act
        let json = serde_json::to_value(get_player_view(&player)).unwrap();

        // Assert
        assert_eq!(json["controls"]["kind"], "owner");
        assert_eq!(json["state"], "playing");
    }
}

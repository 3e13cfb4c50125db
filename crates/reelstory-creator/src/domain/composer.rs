//! Story composition.

use reelstory_core::clock::Clock;
use reelstory_core::error::DomainError;
use reelstory_core::story::{Segment, Story};
use tracing::info;
use uuid::Uuid;

use super::commands::ComposeStory;

/// Most segments a single story may hold.
pub const MAX_SEGMENTS_PER_STORY: usize = 10;

/// Builds a story from the selected media. Segments keep the selection order
/// and get the nominal duration for their kind.
///
/// # Errors
///
/// Returns `DomainError::Validation` if nothing was selected, too much was
/// selected, a media URL is blank, or a MIME type is unsupported.
pub fn compose_story(command: ComposeStory, clock: &dyn Clock) -> Result<Story, DomainError> {
    if command.selections.is_empty() {
        return Err(DomainError::Validation(
            "a story needs at least one photo or video".to_owned(),
        ));
    }
    if command.selections.len() > MAX_SEGMENTS_PER_STORY {
        return Err(DomainError::Validation(format!(
            "a story holds at most {MAX_SEGMENTS_PER_STORY} segments, got {}",
            command.selections.len()
        )));
    }

    let segments = command
        .selections
        .iter()
        .map(|selection| {
            if selection.media_url.trim().is_empty() {
                return Err(DomainError::Validation("media URL is empty".to_owned()));
            }
            Ok(Segment::with_kind(selection.media_url.clone(), selection.kind()?))
        })
        .collect::<Result<Vec<_>, _>>()?;

    let story = Story {
        id: Uuid::new_v4(),
        user_id: command.author_id,
        display_name: command.display_name,
        avatar_url: command.avatar_url,
        segments,
        created_at: clock.now(),
        view_count: 0,
        privacy: command.privacy,
    };
    info!(
        story_id = %story.id,
        correlation_id = %command.correlation_id,
        segments = story.segments.len(),
        privacy = ?story.privacy,
        "story composed"
    );
    Ok(story)
}

#[cfg(test)]
mod tests {
    use reelstory_core::story::{Privacy, SegmentKind};
    use reelstory_test_support::{FixedClock, fixed_now};

    use super::*;
    use crate::domain::media::MediaSelection;

    fn command(selections: Vec<MediaSelection>) -> ComposeStory {
        ComposeStory {
            correlation_id: Uuid::new_v4(),
            author_id: Uuid::new_v4(),
            display_name: "mira".to_owned(),
            avatar_url: Some("https://cdn.test/mira.png".to_owned()),
            selections,
            privacy: Privacy::CloseFriends,
        }
    }

    #[test]
    fn test_compose_story_keeps_order_and_assigns_durations() {
        // Arrange
        let cmd = command(vec![
            MediaSelection::new("https://cdn.test/1.jpg", "image/jpeg"),
            MediaSelection::new("https://cdn.test/2.mp4", "video/mp4"),
        ]);
        let author_id = cmd.author_id;

        // Act
        let story = compose_story(cmd, &FixedClock(fixed_now())).unwrap();

        // Assert
        assert_eq!(story.user_id, author_id);
        assert_eq!(story.created_at, fixed_now());
        assert_eq!(story.view_count, 0);
        assert_eq!(story.privacy, Privacy::CloseFriends);
        let kinds: Vec<_> = story.segments.iter().map(|s| s.kind).collect();
        assert_eq!(kinds, vec![SegmentKind::Image, SegmentKind::Video]);
        assert_eq!(story.segments[0].duration_ms, 5_000);
        assert_eq!(story.segments[1].duration_ms, 20_000);
    }

    #[test]
    fn test_compose_story_rejects_empty_and_oversized_selections() {
        // Arrange
        let clock = FixedClock(fixed_now());
        let too_many = (0..=MAX_SEGMENTS_PER_STORY)
            .map(|i| MediaSelection::new(format!("{i}.jpg"), "image/png"))
            .collect();

        // Act
        let empty = compose_story(command(Vec::new()), &clock);
        let oversized = compose_story(command(too_many), &clock);

        // Assert
        assert!(matches!(empty, Err(DomainError::Validation(_))));
        assert!(matches!(oversized, Err(DomainError::Validation(_))));
    }

    #[test]
    fn test_compose_story_rejects_blank_url_and_unknown_type() {
        // Arrange
        let clock = FixedClock(fixed_now());

        // Act
        let blank = compose_story(command(vec![MediaSelection::new("  ", "image/png")]), &clock);
        let unknown = compose_story(
            command(vec![MediaSelection::new("doc.pdf", "application/pdf")]),
            &clock,
        );

        // Assert
        assert!(matches!(blank, Err(DomainError::Validation(_))));
        assert!(matches!(unknown, Err(DomainError::Validation(_))));
    }

    #[test]
    fn test_media_selection_deserializes_from_picker_json() {
        let selection: MediaSelection = serde_json::from_value(serde_json::json!({
            "media_url": "https://cdn.test/clip.mov",
            "content_type": "video/quicktime"
        }))
        .unwrap();

        assert_eq!(selection.kind().unwrap(), SegmentKind::Video);
    }
}

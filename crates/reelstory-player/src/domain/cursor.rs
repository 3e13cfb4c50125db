//! Positions within a story list and the playback cursor.

use reelstory_core::story::Story;
use serde::Serialize;

/// The active `(story, segment)` pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Position {
    /// Index into the story list.
    pub story_index: usize,
    /// Index into the active story's segments.
    pub segment_index: usize,
}

impl Position {
    /// Creates a position.
    #[must_use]
    pub const fn new(story_index: usize, segment_index: usize) -> Self {
        Self {
            story_index,
            segment_index,
        }
    }

    /// The segment shown after this one: the next segment of the same story,
    /// else the first segment of the next story. `None` at the very end.
    #[must_use]
    pub fn next(self, stories: &[Story]) -> Option<Self> {
        let story = stories.get(self.story_index)?;
        if self.segment_index + 1 < story.segments.len() {
            return Some(Self::new(self.story_index, self.segment_index + 1));
        }
        if self.story_index + 1 < stories.len() {
            return Some(Self::new(self.story_index + 1, 0));
        }
        None
    }

    /// The segment shown before this one: the previous segment of the same
    /// story, else the last segment of the previous story. `None` at `(0, 0)`.
    #[must_use]
    pub fn previous(self, stories: &[Story]) -> Option<Self> {
        if self.segment_index > 0 {
            return Some(Self::new(self.story_index, self.segment_index - 1));
        }
        if self.story_index > 0 {
            let story_index = self.story_index - 1;
            let last = stories.get(story_index)?.segments.len().checked_sub(1)?;
            return Some(Self::new(story_index, last));
        }
        None
    }

    /// Number of segments from this one (inclusive) to the end of the list.
    #[must_use]
    pub fn remaining(self, stories: &[Story]) -> usize {
        let Some(story) = stories.get(self.story_index) else {
            return 0;
        };
        let in_story = story.segments.len().saturating_sub(self.segment_index);
        let after: usize = stories[self.story_index + 1..]
            .iter()
            .map(|s| s.segments.len())
            .sum();
        in_story + after
    }

    /// Whether this position addresses an existing segment.
    #[must_use]
    pub fn is_valid(self, stories: &[Story]) -> bool {
        stories
            .get(self.story_index)
            .is_some_and(|s| self.segment_index < s.segments.len())
    }
}

/// Snapshot of where playback stands.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PlaybackCursor {
    /// Index into the story list.
    pub story_index: usize,
    /// Index into the active story's segments.
    pub segment_index: usize,
    /// Share of the active segment already shown, in `[0, 1]`.
    pub progress_fraction: f64,
    /// Whether progress is currently frozen.
    pub paused: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use reelstory_test_support::stories_with_segment_counts;

    #[test]
    fn test_next_walks_segments_then_stories() {
        // Arrange
        let stories = stories_with_segment_counts(&[2, 1]);

        // Act / Assert
        let p = Position::new(0, 0);
        assert_eq!(p.next(&stories), Some(Position::new(0, 1)));
        assert_eq!(Position::new(0, 1).next(&stories), Some(Position::new(1, 0)));
        assert_eq!(Position::new(1, 0).next(&stories), None);
    }

    #[test]
    fn test_previous_lands_on_last_segment_of_previous_story() {
        // Arrange
        let stories = stories_with_segment_counts(&[3, 2]);

        // Act
        let previous = Position::new(1, 0).previous(&stories);

        // Assert
        assert_eq!(previous, Some(Position::new(0, 2)));
        assert_eq!(Position::new(0, 0).previous(&stories), None);
    }

    #[test]
    fn test_remaining_counts_inclusive_segments_to_end() {
        let stories = stories_with_segment_counts(&[3, 2, 4]);

        assert_eq!(Position::new(0, 0).remaining(&stories), 9);
        assert_eq!(Position::new(0, 2).remaining(&stories), 7);
        assert_eq!(Position::new(2, 3).remaining(&stories), 1);
    }

    #[test]
    fn test_is_valid_rejects_out_of_range_positions() {
        let stories = stories_with_segment_counts(&[2]);

        assert!(Position::new(0, 1).is_valid(&stories));
        assert!(!Position::new(0, 2).is_valid(&stories));
        assert!(!Position::new(1, 0).is_valid(&stories));
    }
}

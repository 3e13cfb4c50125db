//! Time and story fixtures.

use chrono::{DateTime, TimeZone, Utc};
use reelstory_core::clock::Clock;
use reelstory_core::story::{Privacy, Segment, Story};
use uuid::Uuid;

/// Fixed timestamp used across tests.
///
/// # Panics
///
/// Never in practice; the literal date is valid.
#[must_use]
pub fn fixed_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 1, 15, 10, 0, 0).unwrap()
}

/// A clock frozen at one instant, so event and story timestamps are
/// predictable. Defaults to [`fixed_now`].
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Default for FixedClock {
    fn default() -> Self {
        Self(fixed_now())
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

fn story(author_id: Uuid, segments: Vec<Segment>) -> Story {
    Story {
        id: Uuid::new_v4(),
        user_id: author_id,
        display_name: "author".to_owned(),
        avatar_url: None,
        segments,
        created_at: fixed_now(),
        view_count: 0,
        privacy: Privacy::Public,
    }
}

/// A story by `author_id` made of `segments` image segments.
#[must_use]
pub fn image_story(author_id: Uuid, segments: usize) -> Story {
    story(
        author_id,
        (0..segments)
            .map(|i| Segment::image(format!("https://cdn.test/{i}.jpg")))
            .collect(),
    )
}

/// A story by `author_id` made of `segments` video segments.
#[must_use]
pub fn video_story(author_id: Uuid, segments: usize) -> Story {
    story(
        author_id,
        (0..segments)
            .map(|i| Segment::video(format!("https://cdn.test/{i}.mp4")))
            .collect(),
    )
}

/// One image story per entry, each by a distinct author, with the given
/// number of segments.
#[must_use]
pub fn stories_with_segment_counts(counts: &[usize]) -> Vec<Story> {
    counts
        .iter()
        .map(|&n| image_story(Uuid::new_v4(), n))
        .collect()
}

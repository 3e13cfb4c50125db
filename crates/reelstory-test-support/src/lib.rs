//! Shared test doubles and fixtures for the Reelstory story playback engine.

mod channel;
mod fixtures;
mod store;

pub use channel::{FailingMessageChannel, RecordingMessageChannel};
pub use fixtures::{FixedClock, fixed_now, image_story, stories_with_segment_counts, video_story};
pub use store::{FailingStoryStore, FlakyStoryStore, RecordingStoryStore, StoreCall};

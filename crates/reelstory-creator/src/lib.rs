//! Reelstory story creation.
//!
//! Turns the media a user picked into an ordered, immutable story the
//! player can iterate. Capture and upload happen elsewhere.

pub mod domain;

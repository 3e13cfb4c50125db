//! Reelstory story playback.
//!
//! Plays an ordered list of stories, each an ordered list of timed
//! segments, advancing on a fixed tick, pausing while the viewer holds the
//! surface or types a reply, and closing once every segment has been shown.

pub mod application;
pub mod config;
pub mod domain;

//! Reelstory replay harness.
//!
//! Loads a JSON script of stories and timed inputs and plays it through a
//! real player session.

pub mod error;
pub mod ports;
pub mod runner;
pub mod script;

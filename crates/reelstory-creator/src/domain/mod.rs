//! Domain layer of the story creator.

pub mod commands;
pub mod composer;
pub mod media;

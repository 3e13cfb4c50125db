//! Domain layer of the story player.

pub mod aggregates;
pub mod commands;
pub mod cursor;
pub mod events;
pub mod reactions;

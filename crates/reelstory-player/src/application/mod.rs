//! Application layer of the story player.

pub mod command_handlers;
pub mod driver;
pub mod query_handlers;

pub use driver::{PlayerDriver, PlayerHandle, PlayerInput, SessionOutcome};

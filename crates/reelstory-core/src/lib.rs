//! Reelstory core: shared domain abstractions.
//!
//! This crate defines the traits and types that the player and creator
//! contexts depend on, including the collaborator ports the player talks to.
//! It contains no infrastructure code.

pub mod aggregate;
pub mod clock;
pub mod command;
pub mod error;
pub mod event;
pub mod ports;
pub mod story;

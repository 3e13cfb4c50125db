//! The fixed set of quick reactions a viewer can send.

use serde::{Deserialize, Serialize};

/// A one-shot emoji reaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReactionKind {
    /// ❤️
    Heart,
    /// 😂
    Laugh,
    /// 😮
    Wow,
    /// 😢
    Sad,
    /// 🔥
    Fire,
    /// 👏
    Clap,
}

impl ReactionKind {
    /// Every reaction, in the order the tray shows them.
    pub const ALL: [Self; 6] = [
        Self::Heart,
        Self::Laugh,
        Self::Wow,
        Self::Sad,
        Self::Fire,
        Self::Clap,
    ];

    /// The glyph sent as message content.
    #[must_use]
    pub const fn glyph(self) -> &'static str {
        match self {
            Self::Heart => "❤️",
            Self::Laugh => "😂",
            Self::Wow => "😮",
            Self::Sad => "😢",
            Self::Fire => "🔥",
            Self::Clap => "👏",
        }
    }

    /// Looks up a reaction by its glyph.
    #[must_use]
    pub fn from_glyph(glyph: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.glyph() == glyph)
    }
}

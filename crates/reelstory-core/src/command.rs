//! User intents.

use uuid::Uuid;

/// An intent issued by a user. Its correlation ID is stamped on every event
/// and side effect it causes.
pub trait Command: Send + Sync + std::fmt::Debug {
    /// Stable name used in logs, e.g. `player.react`.
    fn name(&self) -> &'static str;

    /// Correlation ID for this intent.
    fn correlation_id(&self) -> Uuid;
}

//! Player configuration.

use std::time::Duration;

use reelstory_core::error::DomainError;

/// Environment variable holding the tick interval in milliseconds.
pub const TICK_MS_VAR: &str = "REELSTORY_TICK_MS";
/// Environment variable holding the media-failure grace period in milliseconds.
pub const MEDIA_GRACE_MS_VAR: &str = "REELSTORY_MEDIA_GRACE_MS";
/// Environment variable holding the total number of delete attempts.
pub const DELETE_ATTEMPTS_VAR: &str = "REELSTORY_DELETE_ATTEMPTS";

/// Tunables for a player session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlayerConfig {
    /// How often the driver advances progress.
    pub tick_interval: Duration,
    /// How long a segment whose media failed stays on screen.
    pub media_failure_grace: Duration,
    /// Total delete attempts (first try plus retries).
    pub delete_attempts: u32,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            tick_interval: Duration::from_millis(50),
            media_failure_grace: Duration::from_millis(1_500),
            delete_attempts: 2,
        }
    }
}

impl PlayerConfig {
    /// Reads overrides from the process environment.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` if a variable is set but invalid.
    pub fn from_env() -> Result<Self, DomainError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from a key lookup, falling back to defaults for unset
    /// keys.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` if a value does not parse or is zero.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, DomainError> {
        let defaults = Self::default();
        let tick_interval = match lookup(TICK_MS_VAR) {
            Some(raw) => Duration::from_millis(parse_positive(TICK_MS_VAR, &raw)?),
            None => defaults.tick_interval,
        };
        let media_failure_grace = match lookup(MEDIA_GRACE_MS_VAR) {
            Some(raw) => Duration::from_millis(parse_positive(MEDIA_GRACE_MS_VAR, &raw)?),
            None => defaults.media_failure_grace,
        };
        let delete_attempts = match lookup(DELETE_ATTEMPTS_VAR) {
            Some(raw) => u32::try_from(parse_positive(DELETE_ATTEMPTS_VAR, &raw)?).map_err(
                |_| DomainError::Validation(format!("{DELETE_ATTEMPTS_VAR} is out of range")),
            )?,
            None => defaults.delete_attempts,
        };
        Ok(Self {
            tick_interval,
            media_failure_grace,
            delete_attempts,
        })
    }
}

fn parse_positive(key: &str, raw: &str) -> Result<u64, DomainError> {
    let value: u64 = raw
        .trim()
        .parse()
        .map_err(|e| DomainError::Validation(format!("{key} must be a positive integer: {e}")))?;
    if value == 0 {
        return Err(DomainError::Validation(format!("{key} must be greater than zero")));
    }
    Ok(value)
}

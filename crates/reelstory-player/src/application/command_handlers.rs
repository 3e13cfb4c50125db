//! Command handlers for the story player.
//!
//! Each handler runs a command against the aggregate and then dispatches
//! the side-effect events it recorded: messages go to the reaction/reply
//! channel, deletes, reports and views go to the story store. Collaborator
//! failures never bubble out of a handler; they are logged and, where the
//! viewer acted, turned into a toast.

use reelstory_core::aggregate::AggregateRoot;
use reelstory_core::clock::Clock;
use reelstory_core::command::Command;
use reelstory_core::error::DomainError;
use reelstory_core::ports::{MessageChannel, StoryStore};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::config::PlayerConfig;
use crate::domain::aggregates::StoryPlayer;
use crate::domain::commands::{DeleteStory, OpenPlayer, ReactToStory, ReplyToStory, ReportStory};
use crate::domain::events::{DeletionFailed, PlayerEvent, PlayerEventKind};

/// Toast shown when a reaction or reply could not be handed off.
pub const SEND_FAILED_NOTICE: &str = "Message not sent. Check your connection.";

/// Toast shown when a report could not be filed.
pub const REPORT_FAILED_NOTICE: &str = "Couldn't send your report. Please try again.";

/// The collaborators a session dispatches side effects to.
#[derive(Clone, Copy)]
pub struct Collaborators<'a> {
    /// Reaction/reply channel.
    pub channel: &'a dyn MessageChannel,
    /// Story store.
    pub store: &'a dyn StoryStore,
}

/// Result of a successfully handled command.
#[derive(Debug)]
pub struct PlayerCommandResult {
    /// The session affected by the command.
    pub session_id: Uuid,
    /// Every event recorded and dispatched while handling the command.
    pub dispatched: Vec<PlayerEvent>,
}

/// Takes the aggregate's pending events and performs their side
/// effects. Events recorded while dispatching (a toast, a confirmed delete)
/// are drained in the same call.
pub async fn dispatch_pending(
    player: &mut StoryPlayer,
    config: &PlayerConfig,
    clock: &dyn Clock,
    ports: Collaborators<'_>,
) -> Vec<PlayerEvent> {
    let mut dispatched = Vec::new();
    loop {
        let pending = player.take_pending_events();
        if pending.is_empty() {
            break;
        }
        for event in pending {
            dispatch_event(&event, player, config, clock, ports).await;
            dispatched.push(event);
        }
    }
    dispatched
}

async fn dispatch_event(
    event: &PlayerEvent,
    player: &mut StoryPlayer,
    config: &PlayerConfig,
    clock: &dyn Clock,
    ports: Collaborators<'_>,
) {
    let cause = &event.metadata;
    match &event.kind {
        PlayerEventKind::ReactionSent(payload) => {
            match ports.channel.send(payload.message.clone()).await {
                Ok(()) => info!(
                    story_id = %payload.story_id,
                    reaction = ?payload.reaction,
                    "reaction sent"
                ),
                Err(e) => {
                    warn!(story_id = %payload.story_id, error = %e, "reaction send failed");
                    player.raise_notice(SEND_FAILED_NOTICE, cause, clock);
                }
            }
        }
        PlayerEventKind::ReplySent(payload) => {
            match ports.channel.send(payload.message.clone()).await {
                Ok(()) => info!(story_id = %payload.story_id, "reply sent"),
                Err(e) => {
                    warn!(story_id = %payload.story_id, error = %e, "reply send failed");
                    player.raise_notice(SEND_FAILED_NOTICE, cause, clock);
                }
            }
        }
        PlayerEventKind::DeletionRequested(payload) => {
            match delete_with_retry(ports.store, payload.story_id, config.delete_attempts).await {
                Ok(attempts) => {
                    info!(story_id = %payload.story_id, attempts, "story deleted");
                    player.deletion_confirmed(payload.story_id, cause, clock);
                }
                Err((attempts, e)) => {
                    warn!(
                        story_id = %payload.story_id,
                        attempts,
                        error = %e,
                        "story delete gave up"
                    );
                    player.deletion_failed(
                        DeletionFailed {
                            story_id: payload.story_id,
                            attempts,
                            error: e.to_string(),
                        },
                        cause,
                        clock,
                    );
                }
            }
        }
        PlayerEventKind::StoryReported(payload) => {
            match ports.store.report_story(payload.story_id, payload.reporter_id).await {
                Ok(()) => info!(story_id = %payload.story_id, "story reported"),
                Err(e) => {
                    warn!(story_id = %payload.story_id, error = %e, "story report failed");
                    player.raise_notice(REPORT_FAILED_NOTICE, cause, clock);
                }
            }
        }
        PlayerEventKind::StoryViewed(payload) => {
            // View counts are best effort; the viewer is never told.
            if let Err(e) = ports.store.record_view(payload.story_id, payload.viewer_id).await {
                warn!(story_id = %payload.story_id, error = %e, "view not recorded");
            }
        }
        PlayerEventKind::SessionOpened(_)
        | PlayerEventKind::SegmentEntered(_)
        | PlayerEventKind::PlaybackPaused(_)
        | PlayerEventKind::PlaybackResumed(_)
        | PlayerEventKind::MediaFailed(_)
        | PlayerEventKind::StoryDeleted(_)
        | PlayerEventKind::DeletionFailed(_)
        | PlayerEventKind::NoticeRaised(_)
        | PlayerEventKind::SessionClosed(_) => {}
    }
}

/// Tries to delete up to `max_attempts` times (at least once). Returns the
/// number of attempts used, or the attempts and the last error.
async fn delete_with_retry(
    store: &dyn StoryStore,
    story_id: Uuid,
    max_attempts: u32,
) -> Result<u32, (u32, DomainError)> {
    let max_attempts = max_attempts.max(1);
    let mut attempt = 1;
    loop {
        match store.delete_story(story_id).await {
            Ok(()) => return Ok(attempt),
            Err(e) if attempt >= max_attempts => return Err((attempt, e)),
            Err(e) => {
                warn!(%story_id, attempt, error = %e, "story delete failed, retrying");
                attempt += 1;
            }
        }
    }
}

/// Handles the `OpenPlayer` command: opens the session and dispatches the
/// view it records for the first story.
///
/// # Errors
///
/// Returns `DomainError::Validation` if the story list cannot be played.
#[instrument(skip_all, fields(viewer_id = %command.viewer_id, stories = command.stories.len()))]
pub async fn handle_open_player(
    command: OpenPlayer,
    config: &PlayerConfig,
    clock: &dyn Clock,
    ports: Collaborators<'_>,
) -> Result<(StoryPlayer, Vec<PlayerEvent>), DomainError> {
    let mut player = StoryPlayer::open(command, config, clock)?;
    info!(session_id = %player.id, "story player opened");
    let dispatched = dispatch_pending(&mut player, config, clock, ports).await;
    Ok((player, dispatched))
}

/// Handles the `ReactToStory` command.
///
/// # Errors
///
/// Returns `DomainError` if the aggregate rejects the reaction. Send
/// failures are reported as a toast, not as an error.
#[instrument(
    skip_all,
    fields(
        session_id = %player.id,
        command = command.name(),
        correlation_id = %command.correlation_id
    )
)]
pub async fn handle_react(
    command: &ReactToStory,
    player: &mut StoryPlayer,
    config: &PlayerConfig,
    clock: &dyn Clock,
    ports: Collaborators<'_>,
) -> Result<PlayerCommandResult, DomainError> {
    player.react(command, clock)?;
    Ok(PlayerCommandResult {
        session_id: player.id,
        dispatched: dispatch_pending(player, config, clock, ports).await,
    })
}

/// Handles the `ReplyToStory` command.
///
/// # Errors
///
/// Returns `DomainError` if the aggregate rejects the reply. Send failures
/// are reported as a toast, not as an error.
#[instrument(
    skip_all,
    fields(
        session_id = %player.id,
        command = command.name(),
        correlation_id = %command.correlation_id
    )
)]
pub async fn handle_reply(
    command: &ReplyToStory,
    player: &mut StoryPlayer,
    config: &PlayerConfig,
    clock: &dyn Clock,
    ports: Collaborators<'_>,
) -> Result<PlayerCommandResult, DomainError> {
    player.reply(command, clock)?;
    Ok(PlayerCommandResult {
        session_id: player.id,
        dispatched: dispatch_pending(player, config, clock, ports).await,
    })
}

/// Handles the `DeleteStory` command: requests the delete, retries per
/// config, and closes the session only once the store confirms.
///
/// # Errors
///
/// Returns `DomainError` if the aggregate rejects the delete. Store failures
/// leave the session open with a toast.
#[instrument(
    skip_all,
    fields(
        session_id = %player.id,
        command = command.name(),
        correlation_id = %command.correlation_id
    )
)]
pub async fn handle_delete_story(
    command: &DeleteStory,
    player: &mut StoryPlayer,
    config: &PlayerConfig,
    clock: &dyn Clock,
    ports: Collaborators<'_>,
) -> Result<PlayerCommandResult, DomainError> {
    player.confirm_delete(command, clock)?;
    Ok(PlayerCommandResult {
        session_id: player.id,
        dispatched: dispatch_pending(player, config, clock, ports).await,
    })
}

/// Handles the `ReportStory` command.
///
/// # Errors
///
/// Returns `DomainError` if the aggregate rejects the report.
#[instrument(
    skip_all,
    fields(
        session_id = %player.id,
        command = command.name(),
        correlation_id = %command.correlation_id
    )
)]
pub async fn handle_report_story(
    command: &ReportStory,
    player: &mut StoryPlayer,
    config: &PlayerConfig,
    clock: &dyn Clock,
    ports: Collaborators<'_>,
) -> Result<PlayerCommandResult, DomainError> {
    player.report(command, clock)?;
    Ok(PlayerCommandResult {
        session_id: player.id,
        dispatched: dispatch_pending(player, config, clock, ports).await,
    })
}

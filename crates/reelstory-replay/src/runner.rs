//! Runs a script through a live player session.

use std::sync::Arc;
use std::time::Duration;

use reelstory_core::clock::Clock;
use reelstory_core::ports::{MessageChannel, StoryStore};
use reelstory_player::application::{PlayerDriver, PlayerHandle, SessionOutcome};
use reelstory_player::config::PlayerConfig;
use reelstory_player::domain::aggregates::PlayerState;
use reelstory_player::domain::commands::OpenPlayer;
use tokio::time::{Instant, sleep_until};
use tracing::{debug, info, instrument};
use uuid::Uuid;

use crate::error::AppError;
use crate::script::{Script, TimedInput};

/// Opens a session for the script's stories, feeds its inputs on schedule
/// and returns how the session ended.
///
/// # Errors
///
/// Returns `AppError::Domain` if a draft or the story list is rejected.
#[instrument(skip_all, fields(viewer_id = %script.viewer_id))]
pub async fn run_script(
    script: Script,
    config: PlayerConfig,
    clock: Arc<dyn Clock>,
    channel: Arc<dyn MessageChannel>,
    store: Arc<dyn StoryStore>,
) -> Result<SessionOutcome, AppError> {
    let stories = script.assemble_stories(clock.as_ref())?;
    let command = OpenPlayer {
        correlation_id: Uuid::new_v4(),
        viewer_id: script.viewer_id,
        stories,
        initial_story_index: script.initial_story_index,
    };
    let (driver, handle) = PlayerDriver::start(command, config, clock, channel, store).await?;
    info!(
        session_id = %handle.session_id(),
        inputs = script.inputs.len(),
        "replay started"
    );

    let feeder = tokio::spawn(feed(
        handle,
        script.ordered_inputs(),
        script.detach_at_ms,
        Instant::now(),
    ));
    let outcome = driver.run().await;
    feeder.abort();

    info!(
        session_id = %outcome.session_id,
        close_reason = ?outcome.close_reason,
        events = outcome.events_dispatched,
        "replay finished"
    );
    Ok(outcome)
}

async fn feed(
    handle: PlayerHandle,
    inputs: Vec<TimedInput>,
    detach_at_ms: Option<u64>,
    started: Instant,
) {
    for timed in inputs {
        sleep_until(started + Duration::from_millis(timed.at_ms)).await;
        debug!(at_ms = timed.at_ms, input = ?timed.input, "feeding input");
        if handle.send(timed.input).await.is_err() {
            debug!("session closed before script ended");
            return;
        }
    }

    match detach_at_ms {
        Some(at_ms) => {
            sleep_until(started + Duration::from_millis(at_ms)).await;
            debug!(at_ms, "detaching from session");
        }
        None => {
            // The driver dropping its sender also ends the wait.
            let mut views = handle.subscribe();
            let _ = views.wait_for(|view| view.state == PlayerState::Closed).await;
        }
    }
}

//! Async driver for a player session.
//!
//! The driver owns the aggregate and the only ticker. Ticks and user input
//! are serialized through one `select!` loop, so nothing else ever touches
//! the cursor. Whenever the active segment changes the ticker is reset, so
//! a fresh segment always gets a full interval before its first tick.

use std::sync::Arc;

use reelstory_core::clock::Clock;
use reelstory_core::error::DomainError;
use reelstory_core::ports::{MessageChannel, StoryStore};
use serde::{Deserialize, Serialize};
use tokio::sync::{mpsc, watch};
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::command_handlers::{
    Collaborators, dispatch_pending, handle_delete_story, handle_open_player, handle_react,
    handle_reply, handle_report_story,
};
use super::query_handlers::{PlayerView, get_player_view};
use crate::config::PlayerConfig;
use crate::domain::aggregates::StoryPlayer;
use crate::domain::commands::{DeleteStory, OpenPlayer, ReactToStory, ReplyToStory, ReportStory};
use crate::domain::events::CloseReason;
use crate::domain::reactions::ReactionKind;

/// Inputs buffered before `PlayerHandle::send` waits.
const INPUT_BUFFER: usize = 32;

/// User input forwarded to a running session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PlayerInput {
    /// Tap on the right two-thirds of the surface.
    TapForward,
    /// Tap on the left third of the surface.
    TapBackward,
    /// Press-and-hold started.
    HoldStart,
    /// Press-and-hold ended.
    HoldEnd,
    /// Reply field focused.
    ReplyFocus,
    /// Reply field blurred.
    ReplyBlur,
    /// Overflow menu opened.
    OpenMenu,
    /// Overflow menu dismissed.
    CloseMenu,
    /// Quick reaction tapped.
    React {
        /// Which reaction.
        reaction: ReactionKind,
    },
    /// Reply submitted.
    Reply {
        /// Reply text.
        text: String,
    },
    /// Delete confirmed in the prompt.
    ConfirmDelete,
    /// Report chosen from the menu.
    Report,
    /// The media element failed to load. `epoch` names the segment; `None`
    /// means the one active when the input is processed.
    MediaFailed {
        /// Segment generation the failure belongs to.
        #[serde(default)]
        epoch: Option<u64>,
    },
    /// The pending toasts were shown and can go.
    DismissNotices,
    /// Close button.
    Close,
}

/// How a session ended.
#[derive(Debug, Clone, Serialize)]
pub struct SessionOutcome {
    /// The session identifier.
    pub session_id: Uuid,
    /// Why it ended.
    pub close_reason: CloseReason,
    /// Number of events dispatched over the session.
    pub events_dispatched: usize,
    /// Toasts still pending when it ended.
    pub notices: Vec<String>,
}

/// Host-side handle to a running session.
#[derive(Debug, Clone)]
pub struct PlayerHandle {
    session_id: Uuid,
    inputs: mpsc::Sender<PlayerInput>,
    views: watch::Receiver<PlayerView>,
}

impl PlayerHandle {
    /// The session identifier.
    #[must_use]
    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    /// Forwards an input to the session.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::SessionClosed` if the driver has stopped.
    pub async fn send(&self, input: PlayerInput) -> Result<(), DomainError> {
        self.inputs
            .send(input)
            .await
            .map_err(|_| DomainError::SessionClosed(self.session_id))
    }

    /// The latest published view.
    #[must_use]
    pub fn view(&self) -> PlayerView {
        self.views.borrow().clone()
    }

    /// A receiver that is notified on every published view.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<PlayerView> {
        self.views.clone()
    }
}

/// Runs one player session.
pub struct PlayerDriver {
    player: StoryPlayer,
    config: PlayerConfig,
    clock: Arc<dyn Clock>,
    channel: Arc<dyn MessageChannel>,
    store: Arc<dyn StoryStore>,
    inputs: mpsc::Receiver<PlayerInput>,
    views: watch::Sender<PlayerView>,
    events_dispatched: usize,
}

impl PlayerDriver {
    /// Opens a session and returns the driver plus a handle to feed it.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` if the stories cannot be played.
    pub async fn start(
        command: OpenPlayer,
        config: PlayerConfig,
        clock: Arc<dyn Clock>,
        channel: Arc<dyn MessageChannel>,
        store: Arc<dyn StoryStore>,
    ) -> Result<(Self, PlayerHandle), DomainError> {
        let ports = Collaborators {
            channel: channel.as_ref(),
            store: store.as_ref(),
        };
        let (player, dispatched) =
            handle_open_player(command, &config, clock.as_ref(), ports).await?;

        let (input_tx, input_rx) = mpsc::channel(INPUT_BUFFER);
        let (view_tx, view_rx) = watch::channel(get_player_view(&player));
        let handle = PlayerHandle {
            session_id: player.id,
            inputs: input_tx,
            views: view_rx,
        };
        let driver = Self {
            player,
            config,
            clock,
            channel,
            store,
            inputs: input_rx,
            views: view_tx,
            events_dispatched: dispatched.len(),
        };
        Ok((driver, handle))
    }

    /// Drives the session until it closes. Dropping every handle closes the
    /// session with `CloseReason::Detached`.
    pub async fn run(mut self) -> SessionOutcome {
        let period = self.config.tick_interval;
        let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut epoch = self.player.epoch();
        info!(session_id = %self.player.id, "story player running");

        while !self.player.is_closed() {
            tokio::select! {
                _ = ticker.tick() => {
                    self.player.tick(period, Uuid::new_v4(), self.clock.as_ref());
                }
                input = self.inputs.recv() => match input {
                    Some(input) => self.handle_input(input).await,
                    None => {
                        debug!(session_id = %self.player.id, "input channel closed");
                        self.player.close(
                            CloseReason::Detached,
                            Uuid::new_v4(),
                            self.clock.as_ref(),
                        );
                    }
                },
            }

            self.dispatch().await;
            if self.player.epoch() != epoch {
                epoch = self.player.epoch();
                ticker.reset();
            }
            self.views.send_replace(get_player_view(&self.player));
        }

        let close_reason = self.player.close_reason().unwrap_or(CloseReason::Detached);
        info!(session_id = %self.player.id, ?close_reason, "story player closed");
        SessionOutcome {
            session_id: self.player.id,
            close_reason,
            events_dispatched: self.events_dispatched,
            notices: self.player.take_notices(),
        }
    }

    async fn dispatch(&mut self) {
        let ports = Collaborators {
            channel: self.channel.as_ref(),
            store: self.store.as_ref(),
        };
        let dispatched =
            dispatch_pending(&mut self.player, &self.config, self.clock.as_ref(), ports).await;
        self.events_dispatched += dispatched.len();
    }

    async fn handle_input(&mut self, input: PlayerInput) {
        let correlation_id = Uuid::new_v4();
        let clock = self.clock.as_ref();
        let ports = Collaborators {
            channel: self.channel.as_ref(),
            store: self.store.as_ref(),
        };
        let player = &mut self.player;
        let config = &self.config;

        let result = match input {
            PlayerInput::TapForward => player.tap_forward(correlation_id, clock),
            PlayerInput::TapBackward => player.tap_backward(correlation_id, clock),
            PlayerInput::HoldStart => player.hold_start(correlation_id, clock),
            PlayerInput::HoldEnd => player.hold_end(correlation_id, clock),
            PlayerInput::ReplyFocus => player.focus_reply(correlation_id, clock),
            PlayerInput::ReplyBlur => player.blur_reply(correlation_id, clock),
            PlayerInput::OpenMenu => player.open_menu(correlation_id, clock),
            PlayerInput::CloseMenu => player.close_menu(correlation_id, clock),
            PlayerInput::MediaFailed { epoch } => {
                let epoch = epoch.unwrap_or_else(|| player.epoch());
                player.report_media_failure(epoch, correlation_id, clock)
            }
            PlayerInput::DismissNotices => {
                let dismissed = player.take_notices();
                debug!(session_id = %player.id, dismissed = dismissed.len(), "notices dismissed");
                Ok(())
            }
            PlayerInput::Close => {
                player.close(CloseReason::User, correlation_id, clock);
                Ok(())
            }
            PlayerInput::React { reaction } => {
                let command = ReactToStory {
                    correlation_id,
                    reaction,
                };
                handle_react(&command, player, config, clock, ports)
                    .await
                    .map(|r| self.events_dispatched += r.dispatched.len())
            }
            PlayerInput::Reply { text } => {
                let command = ReplyToStory {
                    correlation_id,
                    text,
                };
                handle_reply(&command, player, config, clock, ports)
                    .await
                    .map(|r| self.events_dispatched += r.dispatched.len())
            }
            PlayerInput::ConfirmDelete => {
                let command = DeleteStory { correlation_id };
                handle_delete_story(&command, player, config, clock, ports)
                    .await
                    .map(|r| self.events_dispatched += r.dispatched.len())
            }
            PlayerInput::Report => {
                let command = ReportStory { correlation_id };
                handle_report_story(&command, player, config, clock, ports)
                    .await
                    .map(|r| self.events_dispatched += r.dispatched.len())
            }
        };

        if let Err(e) = result {
            warn!(session_id = %self.player.id, error = %e, "player input rejected");
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use reelstory_core::story::Story;
    use tokio::time::sleep;

    use super::*;
    use crate::application::command_handlers::SEND_FAILED_NOTICE;
    use crate::domain::aggregates::PlayerState;
    use reelstory_test_support::{
        FailingMessageChannel, FailingStoryStore, FixedClock, FlakyStoryStore,
        RecordingMessageChannel, RecordingStoryStore, fixed_now, image_story,
        stories_with_segment_counts, video_story,
    };

    async fn start_with(
        viewer_id: Uuid,
        stories: Vec<Story>,
        channel: Arc<dyn MessageChannel>,
        store: Arc<dyn StoryStore>,
    ) -> (PlayerDriver, PlayerHandle) {
        PlayerDriver::start(
            OpenPlayer {
                correlation_id: Uuid::new_v4(),
                viewer_id,
                stories,
                initial_story_index: 0,
            },
            PlayerConfig::default(),
            Arc::new(FixedClock(fixed_now())),
            channel,
            store,
        )
        .await
        .unwrap()
    }

    async fn start(stories: Vec<Story>) -> (PlayerDriver, PlayerHandle) {
        start_with(
            Uuid::new_v4(),
            stories,
            Arc::new(RecordingMessageChannel::new()),
            Arc::new(RecordingStoryStore::new()),
        )
        .await
    }

    fn pair(handle: &PlayerHandle) -> (usize, usize) {
        let cursor = handle.view().cursor.unwrap();
        (cursor.story_index, cursor.segment_index)
    }

    #[tokio::test(start_paused = true)]
    async fn test_image_segment_advances_after_five_seconds() {
        // Arrange
        let (driver, handle) = start(stories_with_segment_counts(&[1, 1])).await;
        let task = tokio::spawn(driver.run());

        // Act
        sleep(Duration::from_millis(4_990)).await;
        let before = pair(&handle);
        sleep(Duration::from_millis(20)).await;

        // Assert
        assert_eq!(before, (0, 0));
        assert_eq!(pair(&handle), (1, 0));
        handle.send(PlayerInput::Close).await.unwrap();
        assert_eq!(task.await.unwrap().close_reason, CloseReason::User);
    }

    #[tokio::test(start_paused = true)]
    async fn test_session_closes_when_every_segment_has_played() {
        // Arrange
        let (driver, _handle) = start(stories_with_segment_counts(&[2])).await;

        // Act
        let outcome = tokio::spawn(driver.run()).await.unwrap();

        // Assert
        assert_eq!(outcome.close_reason, CloseReason::Exhausted);
        assert!(outcome.notices.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_hold_stops_progress_until_released() {
        // Arrange
        let (driver, handle) = start(stories_with_segment_counts(&[2])).await;
        let task = tokio::spawn(driver.run());

        // Act
        handle.send(PlayerInput::HoldStart).await.unwrap();
        sleep(Duration::from_secs(10)).await;
        let held = handle.view();
        handle.send(PlayerInput::HoldEnd).await.unwrap();
        sleep(Duration::from_millis(5_010)).await;

        // Assert
        assert_eq!(held.state, PlayerState::Paused);
        assert!(!held.media_should_play);
        assert!(held.cursor.unwrap().progress_fraction.abs() < f64::EPSILON);
        assert_eq!(pair(&handle), (0, 1));
        drop(handle);
        assert_eq!(task.await.unwrap().close_reason, CloseReason::Detached);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cursor_change_restarts_the_ticker() {
        // Arrange
        let (driver, handle) = start(stories_with_segment_counts(&[3])).await;
        let task = tokio::spawn(driver.run());

        // Act
        sleep(Duration::from_millis(4_025)).await;
        handle.send(PlayerInput::TapForward).await.unwrap();
        sleep(Duration::from_millis(4_985)).await;
        let just_before = pair(&handle);
        sleep(Duration::from_millis(20)).await;

        // Assert
        assert_eq!(just_before, (0, 1));
        assert_eq!(pair(&handle), (0, 2));
        handle.send(PlayerInput::Close).await.unwrap();
        task.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_react_dispatches_one_message_and_keeps_playing() {
        // Arrange
        let channel = Arc::new(RecordingMessageChannel::new());
        let author_id = Uuid::new_v4();
        let (driver, handle) = start_with(
            Uuid::new_v4(),
            vec![image_story(author_id, 1)],
            channel.clone(),
            Arc::new(RecordingStoryStore::new()),
        )
        .await;
        let task = tokio::spawn(driver.run());

        // Act
        handle.send(PlayerInput::ReplyFocus).await.unwrap();
        handle
            .send(PlayerInput::React {
                reaction: ReactionKind::Fire,
            })
            .await
            .unwrap();
        handle.send(PlayerInput::Close).await.unwrap();
        let outcome = task.await.unwrap();

        // Assert
        let sent = channel.sent_messages();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].to_user_id, author_id);
        assert_eq!(sent[0].content, "🔥");
        assert_eq!(outcome.close_reason, CloseReason::User);
    }

    #[tokio::test(start_paused = true)]
    async fn test_confirmed_delete_closes_after_one_store_call() {
        // Arrange
        let store = Arc::new(RecordingStoryStore::new());
        let owner_id = Uuid::new_v4();
        let stories = vec![image_story(owner_id, 2)];
        let story_id = stories[0].id;
        let (driver, handle) = start_with(
            owner_id,
            stories,
            Arc::new(RecordingMessageChannel::new()),
            store.clone(),
        )
        .await;
        let task = tokio::spawn(driver.run());

        // Act
        handle.send(PlayerInput::OpenMenu).await.unwrap();
        handle.send(PlayerInput::ConfirmDelete).await.unwrap();
        let outcome = task.await.unwrap();

        // Assert
        assert_eq!(outcome.close_reason, CloseReason::Deleted);
        assert_eq!(store.deleted(), vec![story_id]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_delete_retry_recovers_from_one_failure() {
        // Arrange
        let store = Arc::new(FlakyStoryStore::failing_first(1));
        let owner_id = Uuid::new_v4();
        let (driver, handle) = start_with(
            owner_id,
            vec![image_story(owner_id, 1)],
            Arc::new(RecordingMessageChannel::new()),
            store.clone(),
        )
        .await;
        let task = tokio::spawn(driver.run());

        // Act
        handle.send(PlayerInput::ConfirmDelete).await.unwrap();
        let outcome = task.await.unwrap();

        // Assert
        assert_eq!(outcome.close_reason, CloseReason::Deleted);
        assert_eq!(store.delete_attempts(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_delete_keeps_session_open_with_notice() {
        // Arrange
        let owner_id = Uuid::new_v4();
        let (driver, handle) = start_with(
            owner_id,
            vec![image_story(owner_id, 1)],
            Arc::new(RecordingMessageChannel::new()),
            Arc::new(FailingStoryStore),
        )
        .await;
        let mut views = handle.subscribe();
        let task = tokio::spawn(driver.run());

        // Act
        handle.send(PlayerInput::ConfirmDelete).await.unwrap();
        let view = views
            .wait_for(|v| !v.notices.is_empty())
            .await
            .unwrap()
            .clone();
        handle.send(PlayerInput::Close).await.unwrap();
        let outcome = task.await.unwrap();

        // Assert
        assert_eq!(view.state, PlayerState::Playing);
        assert_eq!(outcome.close_reason, CloseReason::User);
        assert_eq!(outcome.notices.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_dismissed_notices_leave_the_view() {
        // Arrange
        let (driver, handle) = start_with(
            Uuid::new_v4(),
            vec![video_story(Uuid::new_v4(), 1)],
            Arc::new(FailingMessageChannel),
            Arc::new(RecordingStoryStore::new()),
        )
        .await;
        let mut views = handle.subscribe();
        let task = tokio::spawn(driver.run());
        let reply = || PlayerInput::Reply {
            text: "so good".to_owned(),
        };

        // Act
        handle.send(reply()).await.unwrap();
        let shown = views
            .wait_for(|v| !v.notices.is_empty())
            .await
            .unwrap()
            .notices
            .clone();
        handle.send(PlayerInput::DismissNotices).await.unwrap();
        let dismissed = views
            .wait_for(|v| v.notices.is_empty())
            .await
            .unwrap()
            .notices
            .clone();
        handle.send(reply()).await.unwrap();
        sleep(Duration::from_millis(100)).await;
        let after_second_failure = handle.view().notices;
        handle.send(PlayerInput::DismissNotices).await.unwrap();
        handle.send(PlayerInput::Close).await.unwrap();
        let outcome = task.await.unwrap();

        // Assert
        assert_eq!(shown, vec![SEND_FAILED_NOTICE.to_owned()]);
        assert!(dismissed.is_empty());
        assert_eq!(after_second_failure, vec![SEND_FAILED_NOTICE.to_owned()]);
        assert!(outcome.notices.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_media_failure_skips_after_grace() {
        // Arrange
        let (driver, handle) = start(stories_with_segment_counts(&[2])).await;
        let task = tokio::spawn(driver.run());

        // Act
        handle
            .send(PlayerInput::MediaFailed { epoch: None })
            .await
            .unwrap();
        sleep(Duration::from_millis(1_510)).await;

        // Assert
        assert_eq!(pair(&handle), (0, 1));
        handle.send(PlayerInput::Close).await.unwrap();
        task.await.unwrap();
    }

    #[test]
    fn test_player_input_deserializes_from_tagged_json() {
        let react: PlayerInput =
            serde_json::from_value(serde_json::json!({ "type": "react", "reaction": "fire" }))
                .unwrap();
        let failed: PlayerInput =
            serde_json::from_value(serde_json::json!({ "type": "media_failed" })).unwrap();
        let dismiss: PlayerInput =
            serde_json::from_value(serde_json::json!({ "type": "dismiss_notices" })).unwrap();

        assert_eq!(
            react,
            PlayerInput::React {
                reaction: ReactionKind::Fire
            }
        );
        assert_eq!(failed, PlayerInput::MediaFailed { epoch: None });
        assert_eq!(dismiss, PlayerInput::DismissNotices);
    }
}

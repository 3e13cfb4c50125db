//! Aggregate root for a story player session.

use std::collections::{BTreeSet, HashSet};
use std::time::Duration;

use reelstory_core::aggregate::AggregateRoot;
use reelstory_core::clock::Clock;
use reelstory_core::error::DomainError;
use reelstory_core::event::EventMetadata;
use reelstory_core::ports::OutboundMessage;
use reelstory_core::story::{Segment, Story};
use serde::Serialize;
use tracing::debug;
use uuid::Uuid;

use super::commands::{DeleteStory, OpenPlayer, ReactToStory, ReplyToStory, ReportStory};
use super::cursor::{PlaybackCursor, Position};
use super::events::{
    CloseReason, DeletionFailed, DeletionRequested, MediaFailed, NoticeRaised, PauseReason,
    PlaybackPaused, PlaybackResumed, PlayerEvent, PlayerEventKind, ReactionSent, ReplySent,
    SegmentEntered, SessionClosed, SessionOpened, StoryDeleted, StoryReported, StoryViewed,
};
use crate::config::PlayerConfig;

/// Toast shown when a delete gives up.
pub const DELETE_FAILED_NOTICE: &str = "Couldn't delete your story. Please try again.";

/// Coarse playback state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PlayerState {
    /// Progress accumulates on every tick.
    Playing,
    /// At least one pause reason is active.
    Paused,
    /// The session has ended.
    Closed,
}

/// The aggregate root for one open story player.
///
/// Exactly one segment is active while the session is open. Progress is kept
/// as whole elapsed milliseconds so completion is exact; tick progress is
/// transient and not recorded as events.
#[derive(Debug)]
pub struct StoryPlayer {
    /// Session identifier.
    pub id: Uuid,
    /// Current version (event count).
    pub(crate) version: u64,
    viewer_id: Uuid,
    stories: Vec<Story>,
    position: Position,
    elapsed_ms: u64,
    pause_reasons: BTreeSet<PauseReason>,
    closed: Option<CloseReason>,
    /// Bumped on every active-segment change.
    epoch: u64,
    /// Remaining grace for a segment whose media failed.
    media_grace_ms: Option<u64>,
    media_failure_grace_ms: u64,
    seen_stories: HashSet<Uuid>,
    notices: Vec<String>,
    /// Event whose side effect is being recorded, if any.
    causation_id: Option<Uuid>,
    /// Recorded, not yet dispatched.
    pending_events: Vec<PlayerEvent>,
}

impl StoryPlayer {
    /// Opens a session playing at `(initial_story_index, 0)`.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` if the story list is empty, any story
    /// has no segments, or the initial index is out of range.
    #[allow(clippy::cast_possible_truncation)]
    pub fn open(
        command: OpenPlayer,
        config: &PlayerConfig,
        clock: &dyn Clock,
    ) -> Result<Self, DomainError> {
        if command.stories.is_empty() {
            return Err(DomainError::Validation(
                "player needs at least one story".to_owned(),
            ));
        }
        if let Some(empty) = command.stories.iter().find(|s| s.segments.is_empty()) {
            return Err(DomainError::Validation(format!(
                "story {} has no segments",
                empty.id
            )));
        }
        if command.initial_story_index >= command.stories.len() {
            return Err(DomainError::Validation(format!(
                "initial story index {} out of range for {} stories",
                command.initial_story_index,
                command.stories.len()
            )));
        }

        let story_count = command.stories.len();
        let mut player = Self {
            id: Uuid::new_v4(),
            version: 0,
            viewer_id: command.viewer_id,
            stories: command.stories,
            position: Position::new(command.initial_story_index, 0),
            elapsed_ms: 0,
            pause_reasons: BTreeSet::new(),
            closed: None,
            epoch: 0,
            media_grace_ms: None,
            media_failure_grace_ms: config.media_failure_grace.as_millis() as u64,
            seen_stories: HashSet::new(),
            notices: Vec::new(),
            causation_id: None,
            pending_events: Vec::new(),
        };

        player.record(
            PlayerEventKind::SessionOpened(SessionOpened {
                session_id: player.id,
                viewer_id: player.viewer_id,
                story_count,
            }),
            command.correlation_id,
            clock,
        );
        player.enter(
            Position::new(command.initial_story_index, 0),
            command.correlation_id,
            clock,
        );
        Ok(player)
    }

    /// Returns the next sequence number for a new event.
    fn next_sequence_number(&self) -> u64 {
        self.version + 1
    }

    /// Builds an event, applies it, and queues it for dispatch. Events are
    /// caused by the intent unless recorded inside `caused_by`.
    fn record(&mut self, kind: PlayerEventKind, correlation_id: Uuid, clock: &dyn Clock) {
        let causation_id = self.causation_id.unwrap_or(correlation_id);
        let event = PlayerEvent {
            metadata: EventMetadata::new(
                kind.event_type(),
                self.id,
                self.next_sequence_number(),
                correlation_id,
                causation_id,
                clock,
            ),
            kind,
        };
        debug!(
            session_id = %self.id,
            event_type = event.kind.event_type(),
            "player event recorded"
        );
        self.apply(&event);
        self.pending_events.push(event);
    }

    /// Runs `f` with every recorded event attributed to `cause`.
    fn caused_by<T>(&mut self, cause: &EventMetadata, f: impl FnOnce(&mut Self) -> T) -> T {
        let previous = self.causation_id.replace(cause.event_id);
        let result = f(self);
        self.causation_id = previous;
        result
    }

    fn ensure_open(&self) -> Result<(), DomainError> {
        if self.closed.is_some() {
            return Err(DomainError::SessionClosed(self.id));
        }
        Ok(())
    }

    fn ensure_viewer(&self, action: &str) -> Result<(), DomainError> {
        if self.is_owner_view() {
            return Err(DomainError::NotPermitted(format!(
                "authors cannot {action} their own story"
            )));
        }
        Ok(())
    }

    fn ensure_owner(&self, action: &str) -> Result<(), DomainError> {
        if !self.is_owner_view() {
            return Err(DomainError::NotPermitted(format!(
                "only the author can {action} a story"
            )));
        }
        Ok(())
    }

    fn enter(&mut self, position: Position, correlation_id: Uuid, clock: &dyn Clock) {
        let story = &self.stories[position.story_index];
        let story_id = story.id;
        let first_view =
            !story.is_owned_by(self.viewer_id) && !self.seen_stories.contains(&story_id);

        self.record(
            PlayerEventKind::SegmentEntered(SegmentEntered {
                story_id,
                story_index: position.story_index,
                segment_index: position.segment_index,
            }),
            correlation_id,
            clock,
        );
        if first_view {
            self.record(
                PlayerEventKind::StoryViewed(StoryViewed {
                    story_id,
                    viewer_id: self.viewer_id,
                }),
                correlation_id,
                clock,
            );
        }
    }

    fn pause(&mut self, reason: PauseReason, correlation_id: Uuid, clock: &dyn Clock) {
        if self.pause_reasons.contains(&reason) {
            return;
        }
        self.record(
            PlayerEventKind::PlaybackPaused(PlaybackPaused { reason }),
            correlation_id,
            clock,
        );
    }

    fn release(&mut self, reason: PauseReason, correlation_id: Uuid, clock: &dyn Clock) {
        if !self.pause_reasons.contains(&reason) {
            return;
        }
        self.record(
            PlayerEventKind::PlaybackResumed(PlaybackResumed { reason }),
            correlation_id,
            clock,
        );
    }

    fn message_to_author(&self, content: String) -> OutboundMessage {
        OutboundMessage {
            from_user_id: self.viewer_id,
            to_user_id: self.active_story().user_id,
            content,
        }
    }

    /// Advances progress by `elapsed` while playing and completes the segment
    /// once its duration, or a pending media-failure grace, has run out.
    /// Ignored while paused or closed.
    pub fn tick(&mut self, elapsed: Duration, correlation_id: Uuid, clock: &dyn Clock) {
        if self.state() != PlayerState::Playing {
            return;
        }
        let step = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX);
        let duration = self.active_segment().duration_ms;
        self.elapsed_ms = self.elapsed_ms.saturating_add(step).min(duration);

        let grace_expired = match self.media_grace_ms.as_mut() {
            Some(remaining) => {
                *remaining = remaining.saturating_sub(step);
                *remaining == 0
            }
            None => false,
        };

        if self.elapsed_ms >= duration || grace_expired {
            self.complete_segment(correlation_id, clock);
        }
    }

    /// Moves to the next segment, the next story, or closes when exhausted.
    pub fn complete_segment(&mut self, correlation_id: Uuid, clock: &dyn Clock) {
        if self.closed.is_some() {
            return;
        }
        match self.position.next(&self.stories) {
            Some(next) => self.enter(next, correlation_id, clock),
            None => self.close(CloseReason::Exhausted, correlation_id, clock),
        }
    }

    /// Skips the rest of the active segment.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::SessionClosed` if the session has ended.
    pub fn tap_forward(
        &mut self,
        correlation_id: Uuid,
        clock: &dyn Clock,
    ) -> Result<(), DomainError> {
        self.ensure_open()?;
        self.complete_segment(correlation_id, clock);
        Ok(())
    }

    /// Goes back one segment, crossing into the previous story's last
    /// segment when needed. Does nothing on the very first segment.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::SessionClosed` if the session has ended.
    pub fn tap_backward(
        &mut self,
        correlation_id: Uuid,
        clock: &dyn Clock,
    ) -> Result<(), DomainError> {
        self.ensure_open()?;
        if let Some(previous) = self.position.previous(&self.stories) {
            self.enter(previous, correlation_id, clock);
        }
        Ok(())
    }

    /// Press-and-hold began on the media surface.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::SessionClosed` if the session has ended.
    pub fn hold_start(
        &mut self,
        correlation_id: Uuid,
        clock: &dyn Clock,
    ) -> Result<(), DomainError> {
        self.ensure_open()?;
        self.pause(PauseReason::Hold, correlation_id, clock);
        Ok(())
    }

    /// Press-and-hold ended.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::SessionClosed` if the session has ended.
    pub fn hold_end(&mut self, correlation_id: Uuid, clock: &dyn Clock) -> Result<(), DomainError> {
        self.ensure_open()?;
        self.release(PauseReason::Hold, correlation_id, clock);
        Ok(())
    }

    /// The reply field gained focus.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::SessionClosed` if the session has ended, or
    /// `DomainError::NotPermitted` if the viewer is the author.
    pub fn focus_reply(
        &mut self,
        correlation_id: Uuid,
        clock: &dyn Clock,
    ) -> Result<(), DomainError> {
        self.ensure_open()?;
        self.ensure_viewer("reply to")?;
        self.pause(PauseReason::ReplyFocus, correlation_id, clock);
        Ok(())
    }

    /// The reply field lost focus.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::SessionClosed` if the session has ended.
    pub fn blur_reply(
        &mut self,
        correlation_id: Uuid,
        clock: &dyn Clock,
    ) -> Result<(), DomainError> {
        self.ensure_open()?;
        self.release(PauseReason::ReplyFocus, correlation_id, clock);
        Ok(())
    }

    /// The overflow menu (or delete confirmation) opened.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::SessionClosed` if the session has ended.
    pub fn open_menu(
        &mut self,
        correlation_id: Uuid,
        clock: &dyn Clock,
    ) -> Result<(), DomainError> {
        self.ensure_open()?;
        self.pause(PauseReason::Menu, correlation_id, clock);
        Ok(())
    }

    /// The overflow menu was dismissed without an action.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::SessionClosed` if the session has ended.
    pub fn close_menu(
        &mut self,
        correlation_id: Uuid,
        clock: &dyn Clock,
    ) -> Result<(), DomainError> {
        self.ensure_open()?;
        self.release(PauseReason::Menu, correlation_id, clock);
        Ok(())
    }

    /// The media for the segment identified by `epoch` failed to load. The
    /// segment stays up for the configured grace period, then completes.
    /// Reports for a segment that is no longer active are ignored.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::SessionClosed` if the session has ended.
    pub fn report_media_failure(
        &mut self,
        epoch: u64,
        correlation_id: Uuid,
        clock: &dyn Clock,
    ) -> Result<(), DomainError> {
        self.ensure_open()?;
        if epoch != self.epoch || self.media_grace_ms.is_some() {
            debug!(
                session_id = %self.id,
                epoch,
                current = self.epoch,
                "stale media failure ignored"
            );
            return Ok(());
        }
        let story_id = self.active_story().id;
        self.record(
            PlayerEventKind::MediaFailed(MediaFailed {
                story_id,
                segment_index: self.position.segment_index,
            }),
            correlation_id,
            clock,
        );
        Ok(())
    }

    /// Sends a quick reaction to the active story's author. Closes the
    /// reaction UI, so a reply-focus pause does not outlive the tap.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::SessionClosed` if the session has ended, or
    /// `DomainError::NotPermitted` if the viewer is the author.
    pub fn react(&mut self, command: &ReactToStory, clock: &dyn Clock) -> Result<(), DomainError> {
        self.ensure_open()?;
        self.ensure_viewer("react to")?;
        let story_id = self.active_story().id;
        let message = self.message_to_author(command.reaction.glyph().to_owned());
        self.record(
            PlayerEventKind::ReactionSent(ReactionSent {
                story_id,
                reaction: command.reaction,
                message,
            }),
            command.correlation_id,
            clock,
        );
        self.release(PauseReason::ReplyFocus, command.correlation_id, clock);
        Ok(())
    }

    /// Sends a text reply to the active story's author and closes the reply
    /// field.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::SessionClosed` if the session has ended,
    /// `DomainError::NotPermitted` if the viewer is the author, or
    /// `DomainError::Validation` if the text is blank.
    pub fn reply(&mut self, command: &ReplyToStory, clock: &dyn Clock) -> Result<(), DomainError> {
        self.ensure_open()?;
        self.ensure_viewer("reply to")?;
        let text = command.text.trim();
        if text.is_empty() {
            return Err(DomainError::Validation("reply text is empty".to_owned()));
        }
        let story_id = self.active_story().id;
        let message = self.message_to_author(text.to_owned());
        self.record(
            PlayerEventKind::ReplySent(ReplySent { story_id, message }),
            command.correlation_id,
            clock,
        );
        self.release(PauseReason::ReplyFocus, command.correlation_id, clock);
        Ok(())
    }

    /// The author confirmed deletion of the active story. Playback holds
    /// until the store answers; the session only closes once it confirms.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::SessionClosed` if the session has ended,
    /// `DomainError::NotPermitted` if the viewer is not the author, or
    /// `DomainError::Validation` if a delete is already in flight.
    pub fn confirm_delete(
        &mut self,
        command: &DeleteStory,
        clock: &dyn Clock,
    ) -> Result<(), DomainError> {
        self.ensure_open()?;
        self.ensure_owner("delete")?;
        if self.pause_reasons.contains(&PauseReason::Deleting) {
            return Err(DomainError::Validation(
                "a delete is already in progress".to_owned(),
            ));
        }
        let story_id = self.active_story().id;
        self.record(
            PlayerEventKind::DeletionRequested(DeletionRequested { story_id }),
            command.correlation_id,
            clock,
        );
        self.pause(PauseReason::Deleting, command.correlation_id, clock);
        self.release(PauseReason::Menu, command.correlation_id, clock);
        Ok(())
    }

    /// The store confirmed the deletion requested by `cause`; the session
    /// closes.
    pub fn deletion_confirmed(&mut self, story_id: Uuid, cause: &EventMetadata, clock: &dyn Clock) {
        if self.closed.is_some() {
            return;
        }
        let correlation_id = cause.correlation_id;
        self.caused_by(cause, |player| {
            player.record(
                PlayerEventKind::StoryDeleted(StoryDeleted { story_id }),
                correlation_id,
                clock,
            );
            player.close(CloseReason::Deleted, correlation_id, clock);
        });
    }

    /// Every delete attempt failed; playback resumes and a toast is raised.
    pub fn deletion_failed(
        &mut self,
        failure: DeletionFailed,
        cause: &EventMetadata,
        clock: &dyn Clock,
    ) {
        if self.closed.is_some() {
            return;
        }
        let correlation_id = cause.correlation_id;
        self.caused_by(cause, |player| {
            player.record(PlayerEventKind::DeletionFailed(failure), correlation_id, clock);
            player.release(PauseReason::Deleting, correlation_id, clock);
            player.notice(DELETE_FAILED_NOTICE, correlation_id, clock);
        });
    }

    /// Reports the active story and dismisses the menu.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::SessionClosed` if the session has ended, or
    /// `DomainError::NotPermitted` if the viewer is the author.
    pub fn report(&mut self, command: &ReportStory, clock: &dyn Clock) -> Result<(), DomainError> {
        self.ensure_open()?;
        self.ensure_viewer("report")?;
        let story_id = self.active_story().id;
        self.record(
            PlayerEventKind::StoryReported(StoryReported {
                story_id,
                reporter_id: self.viewer_id,
            }),
            command.correlation_id,
            clock,
        );
        self.release(PauseReason::Menu, command.correlation_id, clock);
        Ok(())
    }

    /// Queues a transient toast for the viewer about the side effect of
    /// `cause`.
    pub fn raise_notice(&mut self, message: &str, cause: &EventMetadata, clock: &dyn Clock) {
        let correlation_id = cause.correlation_id;
        self.caused_by(cause, |player| player.notice(message, correlation_id, clock));
    }

    fn notice(&mut self, message: &str, correlation_id: Uuid, clock: &dyn Clock) {
        self.record(
            PlayerEventKind::NoticeRaised(NoticeRaised {
                message: message.to_owned(),
            }),
            correlation_id,
            clock,
        );
    }

    /// Removes and returns pending toasts. Hosts call this once the toasts
    /// have been shown.
    pub fn take_notices(&mut self) -> Vec<String> {
        std::mem::take(&mut self.notices)
    }

    /// Ends the session. Does nothing if it already ended.
    pub fn close(&mut self, reason: CloseReason, correlation_id: Uuid, clock: &dyn Clock) {
        if self.closed.is_some() {
            return;
        }
        self.record(
            PlayerEventKind::SessionClosed(SessionClosed { reason }),
            correlation_id,
            clock,
        );
    }

    /// Coarse state.
    #[must_use]
    pub fn state(&self) -> PlayerState {
        if self.closed.is_some() {
            PlayerState::Closed
        } else if self.pause_reasons.is_empty() {
            PlayerState::Playing
        } else {
            PlayerState::Paused
        }
    }

    /// Whether the session has ended.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.closed.is_some()
    }

    /// Why the session ended, if it has.
    #[must_use]
    pub fn close_reason(&self) -> Option<CloseReason> {
        self.closed
    }

    /// The cursor, or `None` once closed.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn cursor(&self) -> Option<PlaybackCursor> {
        if self.closed.is_some() {
            return None;
        }
        let duration = self.active_segment().duration_ms;
        let progress_fraction = if duration == 0 {
            1.0
        } else {
            (self.elapsed_ms as f64 / duration as f64).clamp(0.0, 1.0)
        };
        Some(PlaybackCursor {
            story_index: self.position.story_index,
            segment_index: self.position.segment_index,
            progress_fraction,
            paused: !self.pause_reasons.is_empty(),
        })
    }

    /// The active position. Meaningless once closed.
    #[must_use]
    pub fn position(&self) -> Position {
        self.position
    }

    /// Active-segment generation; changes whenever the segment changes.
    #[must_use]
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Who is watching.
    #[must_use]
    pub fn viewer_id(&self) -> Uuid {
        self.viewer_id
    }

    /// The stories being played.
    #[must_use]
    pub fn stories(&self) -> &[Story] {
        &self.stories
    }

    /// The story owning the active segment.
    #[must_use]
    pub fn active_story(&self) -> &Story {
        &self.stories[self.position.story_index]
    }

    /// The active segment.
    #[must_use]
    pub fn active_segment(&self) -> &Segment {
        &self.active_story().segments[self.position.segment_index]
    }

    /// Whether the viewer authored the active story.
    #[must_use]
    pub fn is_owner_view(&self) -> bool {
        self.active_story().is_owned_by(self.viewer_id)
    }

    /// Active pause reasons.
    #[must_use]
    pub fn pause_reasons(&self) -> &BTreeSet<PauseReason> {
        &self.pause_reasons
    }

    /// Pending toasts, oldest first.
    #[must_use]
    pub fn notices(&self) -> &[String] {
        &self.notices
    }

    /// Whether the media element should be decoding. Mirrors the playback
    /// state so video pauses together with progress.
    #[must_use]
    pub fn media_should_play(&self) -> bool {
        self.state() == PlayerState::Playing
    }

    /// Whether a media-failure grace period is running.
    #[must_use]
    pub fn media_failure_pending(&self) -> bool {
        self.media_grace_ms.is_some()
    }
}

impl AggregateRoot for StoryPlayer {
    type Event = PlayerEvent;

    fn aggregate_id(&self) -> Uuid {
        self.id
    }

    fn version(&self) -> u64 {
        self.version
    }

    fn apply(&mut self, event: &Self::Event) {
        match &event.kind {
            PlayerEventKind::SegmentEntered(payload) => {
                self.position = Position::new(payload.story_index, payload.segment_index);
                self.elapsed_ms = 0;
                self.epoch += 1;
                self.media_grace_ms = None;
            }
            PlayerEventKind::PlaybackPaused(payload) => {
                self.pause_reasons.insert(payload.reason);
            }
            PlayerEventKind::PlaybackResumed(payload) => {
                self.pause_reasons.remove(&payload.reason);
            }
            PlayerEventKind::MediaFailed(_) => {
                self.media_grace_ms = Some(self.media_failure_grace_ms);
            }
            PlayerEventKind::StoryViewed(payload) => {
                self.seen_stories.insert(payload.story_id);
            }
            PlayerEventKind::NoticeRaised(payload) => {
                self.notices.push(payload.message.clone());
            }
            PlayerEventKind::SessionClosed(payload) => {
                self.closed = Some(payload.reason);
                self.media_grace_ms = None;
            }
            PlayerEventKind::SessionOpened(_)
            | PlayerEventKind::ReactionSent(_)
            | PlayerEventKind::ReplySent(_)
            | PlayerEventKind::DeletionRequested(_)
            | PlayerEventKind::StoryDeleted(_)
            | PlayerEventKind::DeletionFailed(_)
            | PlayerEventKind::StoryReported(_) => {}
        }
        self.version += 1;
    }

    fn pending_events(&self) -> &[Self::Event] {
        &self.pending_events
    }

    fn take_pending_events(&mut self) -> Vec<Self::Event> {
        std::mem::take(&mut self.pending_events)
    }
}

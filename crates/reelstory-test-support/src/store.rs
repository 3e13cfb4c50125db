//! Mock `StoryStore` implementations for tests.

use std::sync::Mutex;

use async_trait::async_trait;
use reelstory_core::error::DomainError;
use reelstory_core::ports::StoryStore;
use uuid::Uuid;

/// A call made against a story store double.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreCall {
    /// `delete_story(story_id)`.
    Delete(Uuid),
    /// `report_story(story_id, reporter_id)`.
    Report(Uuid, Uuid),
    /// `record_view(story_id, viewer_id)`.
    View(Uuid, Uuid),
}

/// A story store that records every call and always succeeds.
#[derive(Debug, Default)]
pub struct RecordingStoryStore {
    calls: Mutex<Vec<StoreCall>>,
}

impl RecordingStoryStore {
    /// Create an empty recording store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a snapshot of all calls made so far.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn calls(&self) -> Vec<StoreCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Returns the story IDs passed to `delete_story`, in call order.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn deleted(&self) -> Vec<Uuid> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                StoreCall::Delete(id) => Some(id),
                _ => None,
            })
            .collect()
    }

    fn push(&self, call: StoreCall) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl StoryStore for RecordingStoryStore {
    async fn delete_story(&self, story_id: Uuid) -> Result<(), DomainError> {
        self.push(StoreCall::Delete(story_id));
        Ok(())
    }

    async fn report_story(&self, story_id: Uuid, reporter_id: Uuid) -> Result<(), DomainError> {
        self.push(StoreCall::Report(story_id, reporter_id));
        Ok(())
    }

    async fn record_view(&self, story_id: Uuid, viewer_id: Uuid) -> Result<(), DomainError> {
        self.push(StoreCall::View(story_id, viewer_id));
        Ok(())
    }
}

/// A story store that always returns an infrastructure error.
#[derive(Debug)]
pub struct FailingStoryStore;

#[async_trait]
impl StoryStore for FailingStoryStore {
    async fn delete_story(&self, _story_id: Uuid) -> Result<(), DomainError> {
        Err(DomainError::Infrastructure("connection refused".into()))
    }

    async fn report_story(&self, _story_id: Uuid, _reporter_id: Uuid) -> Result<(), DomainError> {
        Err(DomainError::Infrastructure("connection refused".into()))
    }

    async fn record_view(&self, _story_id: Uuid, _viewer_id: Uuid) -> Result<(), DomainError> {
        Err(DomainError::Infrastructure("connection refused".into()))
    }
}

/// A story store whose `delete_story` fails a fixed number of times before
/// succeeding. Every delete attempt is counted. Other calls succeed silently.
#[derive(Debug)]
pub struct FlakyStoryStore {
    failures_left: Mutex<u32>,
    delete_attempts: Mutex<u32>,
}

impl FlakyStoryStore {
    /// Create a store that fails the first `failures` delete attempts.
    #[must_use]
    pub fn failing_first(failures: u32) -> Self {
        Self {
            failures_left: Mutex::new(failures),
            delete_attempts: Mutex::new(0),
        }
    }

    /// Number of `delete_story` calls received.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn delete_attempts(&self) -> u32 {
        *self.delete_attempts.lock().unwrap()
    }
}

#[async_trait]
impl StoryStore for FlakyStoryStore {
    async fn delete_story(&self, _story_id: Uuid) -> Result<(), DomainError> {
        *self.delete_attempts.lock().unwrap() += 1;
        let mut failures_left = self.failures_left.lock().unwrap();
        if *failures_left > 0 {
            *failures_left -= 1;
            return Err(DomainError::Infrastructure("gateway timeout".into()));
        }
        Ok(())
    }

    async fn report_story(&self, _story_id: Uuid, _reporter_id: Uuid) -> Result<(), DomainError> {
        Ok(())
    }

    async fn record_view(&self, _story_id: Uuid, _viewer_id: Uuid) -> Result<(), DomainError> {
        Ok(())
    }
}

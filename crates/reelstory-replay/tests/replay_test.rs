//! Integration tests for the replay harness.

use std::sync::Arc;

use reelstory_core::error::DomainError;
use reelstory_core::story::Story;
use reelstory_player::application::{PlayerInput, SessionOutcome};
use reelstory_player::config::PlayerConfig;
use reelstory_player::domain::events::CloseReason;
use reelstory_player::domain::reactions::ReactionKind;
use reelstory_replay::error::AppError;
use reelstory_replay::runner::run_script;
use reelstory_replay::script::{Script, TimedInput};
use reelstory_test_support::{
    FixedClock, RecordingMessageChannel, RecordingStoryStore, StoreCall, image_story,
};
use uuid::Uuid;

fn script(viewer_id: Uuid, stories: Vec<Story>, inputs: Vec<(u64, PlayerInput)>) -> Script {
    Script {
        viewer_id,
        initial_story_index: 0,
        stories,
        drafts: Vec::new(),
        inputs: inputs
            .into_iter()
            .map(|(at_ms, input)| TimedInput { at_ms, input })
            .collect(),
        detach_at_ms: None,
    }
}

async fn run(
    script: Script,
    channel: Arc<RecordingMessageChannel>,
    store: Arc<RecordingStoryStore>,
) -> Result<SessionOutcome, AppError> {
    run_script(
        script,
        PlayerConfig::default(),
        Arc::new(FixedClock::default()),
        channel,
        store,
    )
    .await
}

#[tokio::test(start_paused = true)]
async fn test_viewer_script_reacts_and_runs_to_exhaustion() {
    // Arrange
    let viewer_id = Uuid::new_v4();
    let story = image_story(Uuid::new_v4(), 2);
    let (story_id, author_id) = (story.id, story.user_id);
    let channel = Arc::new(RecordingMessageChannel::new());
    let store = Arc::new(RecordingStoryStore::new());
    let script = script(
        viewer_id,
        vec![story],
        vec![(
            1_000,
            PlayerInput::React {
                reaction: ReactionKind::Fire,
            },
        )],
    );

    // Act
    let outcome = run(script, channel.clone(), store.clone()).await.unwrap();

    // Assert
    assert_eq!(outcome.close_reason, CloseReason::Exhausted);
    let sent = channel.sent_messages();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].to_user_id, author_id);
    assert_eq!(sent[0].content, "🔥");
    assert!(store.calls().contains(&StoreCall::View(story_id, viewer_id)));
}

#[tokio::test(start_paused = true)]
async fn test_owner_script_deletes_story() {
    // Arrange
    let owner_id = Uuid::new_v4();
    let story = image_story(owner_id, 3);
    let story_id = story.id;
    let store = Arc::new(RecordingStoryStore::new());
    let script = script(
        owner_id,
        vec![story],
        vec![(100, PlayerInput::OpenMenu), (200, PlayerInput::ConfirmDelete)],
    );

    // Act
    let outcome = run(script, Arc::new(RecordingMessageChannel::new()), store.clone())
        .await
        .unwrap();

    // Assert
    assert_eq!(outcome.close_reason, CloseReason::Deleted);
    assert_eq!(store.deleted(), vec![story_id]);
}

#[tokio::test(start_paused = true)]
async fn test_detach_closes_held_session() {
    // Arrange
    let mut script = script(
        Uuid::new_v4(),
        vec![image_story(Uuid::new_v4(), 1)],
        vec![(500, PlayerInput::HoldStart)],
    );
    script.detach_at_ms = Some(60_000);

    // Act
    let outcome = run(
        script,
        Arc::new(RecordingMessageChannel::new()),
        Arc::new(RecordingStoryStore::new()),
    )
    .await
    .unwrap();

    // Assert
    assert_eq!(outcome.close_reason, CloseReason::Detached);
}

#[tokio::test]
async fn test_script_without_stories_is_rejected() {
    let result = run(
        script(Uuid::new_v4(), Vec::new(), Vec::new()),
        Arc::new(RecordingMessageChannel::new()),
        Arc::new(RecordingStoryStore::new()),
    )
    .await;

    assert!(matches!(
        result,
        Err(AppError::Domain(DomainError::Validation(_)))
    ));
}

#[tokio::test]
async fn test_load_reads_script_file() {
    // Arrange
    let path = std::env::temp_dir().join(format!("reelstory-{}.json", Uuid::new_v4()));
    let viewer_id = Uuid::new_v4();
    let json = serde_json::json!({
        "viewer_id": viewer_id,
        "stories": [image_story(Uuid::new_v4(), 1)],
        "inputs": [{ "at_ms": 0, "input": { "type": "close" } }]
    });
    std::fs::write(&path, json.to_string()).unwrap();

    // Act
    let script = Script::load(&path).await;
    std::fs::remove_file(&path).unwrap();

    // Assert
    let script = script.unwrap();
    assert_eq!(script.viewer_id, viewer_id);
    assert_eq!(script.stories.len(), 1);
    assert_eq!(script.inputs[0].input, PlayerInput::Close);
}

#[tokio::test]
async fn test_load_missing_file_is_io_error() {
    let path = std::env::temp_dir().join(format!("reelstory-missing-{}.json", Uuid::new_v4()));

    let result = Script::load(&path).await;

    assert!(matches!(result, Err(AppError::Io(_))));
}

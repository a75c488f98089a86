use serde::{Deserialize, Serialize};

use deskpilot_graph::{Checkpoint, Checkpointer, InMemoryCheckpointer, StateSchema};

#[derive(Clone, Default, Debug, Serialize, Deserialize, PartialEq)]
struct DemoState {
    count: i32,
}

impl StateSchema for DemoState {}

#[tokio::test]
async fn roundtrips_latest_checkpoint() {
    let checkpointer = InMemoryCheckpointer::default();
    let checkpoint = Checkpoint::new("thread-1", DemoState { count: 1 }, 1, "reviewer");
    checkpointer.save(&checkpoint).await.unwrap();

    let loaded = checkpointer.load("thread-1").await.unwrap().unwrap();
    assert_eq!(loaded.state.count, 1);
    assert_eq!(loaded.node, "reviewer");
    assert_eq!(loaded.seq, 1);
}

#[tokio::test]
async fn save_overwrites_previous_snapshot() {
    let checkpointer = InMemoryCheckpointer::default();
    checkpointer
        .save(&Checkpoint::new("thread-1", DemoState { count: 1 }, 1, "a"))
        .await
        .unwrap();
    checkpointer
        .save(&Checkpoint::new("thread-1", DemoState { count: 2 }, 2, "b"))
        .await
        .unwrap();

    let loaded = checkpointer.load("thread-1").await.unwrap().unwrap();
    assert_eq!(loaded.state.count, 2);
    assert_eq!(loaded.seq, 2);
}

#[tokio::test]
async fn threads_are_isolated() {
    let checkpointer = InMemoryCheckpointer::default();
    checkpointer
        .save(&Checkpoint::new("thread-1", DemoState { count: 1 }, 1, "a"))
        .await
        .unwrap();

    assert!(checkpointer.load("thread-2").await.unwrap().is_none());
}

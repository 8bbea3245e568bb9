mod common;

use std::{sync::Arc, time::Duration};

use tokio::time::{advance, pause};

use pool_supervisor::{
    DispatchResult, InMemoryQueue, Role, SupervisorBuilder, SupervisorError, Task, WorkResult,
};

use common::{RecordingWorker, ScriptedDispatcher};

#[tokio::test]
async fn missing_worker_is_fatal_before_the_loop_starts() {
    let result = SupervisorBuilder::new(Arc::new(InMemoryQueue::new()))
        .with_catch_signals(false)
        .register_dispatcher(ScriptedDispatcher::default())
        .build()
        .run();

    assert!(matches!(
        result,
        Err(SupervisorError::NotRegistered(Role::Worker))
    ));
}

#[tokio::test]
async fn missing_dispatcher_is_fatal_on_the_first_cycle() {
    let handle = SupervisorBuilder::new(Arc::new(InMemoryQueue::new()))
        .with_catch_signals(false)
        .register_worker(RecordingWorker::new())
        .build()
        .run()
        .unwrap();

    let result = handle.wait().await;
    assert!(matches!(
        result,
        Err(SupervisorError::NotRegistered(Role::Dispatch))
    ));
}

#[tokio::test]
async fn registering_a_role_again_replaces_the_callable() {
    pause();

    let first = RecordingWorker::new();
    let second = RecordingWorker::new();
    let dispatcher = ScriptedDispatcher::new(vec![vec![Task::new("job")]]);

    let handle = SupervisorBuilder::new(Arc::new(InMemoryQueue::new()))
        .with_refork_interval(Duration::from_secs(1))
        .with_catch_signals(false)
        .register_dispatcher(dispatcher)
        .register_worker(first.clone())
        .register_worker(second.clone())
        .build()
        .run()
        .unwrap();

    advance(Duration::from_millis(100)).await;

    assert!(first.processed().is_empty());
    assert_eq!(second.processed(), vec![Task::new("job")]);

    handle.shutdown().unwrap();
    handle.wait().await.unwrap();
}

async fn produce() -> DispatchResult {
    Ok(vec![Task::new("fn-task")])
}

async fn consume(_task: Task) -> WorkResult {
    Ok(())
}

#[tokio::test]
async fn plain_async_fns_fill_both_roles() {
    pause();

    let handle = SupervisorBuilder::new(Arc::new(InMemoryQueue::new()))
        .one_shot()
        .with_catch_signals(false)
        .register_dispatcher(produce)
        .register_worker(consume)
        .build()
        .run()
        .unwrap();

    handle.wait().await.unwrap();
}

use std::{
    collections::VecDeque,
    sync::{Mutex, MutexGuard},
};

use anyhow::anyhow;
use async_trait::async_trait;
use thiserror::Error;

use crate::task::Task;

/// Failure reported by a queue backend.
///
/// The supervisor treats these as collaborator errors: a failed fetch inside
/// a worker counts as "no task this iteration", a failure during a dispatch
/// cycle aborts that cycle only. Both are logged and retried naturally on the
/// next iteration.
#[derive(Debug, Error)]
#[error(transparent)]
pub struct QueueError(#[from] anyhow::Error);

/// Contract the supervisor expects from a task queue backend.
///
/// Implementations must tolerate concurrent `dequeue` calls from several
/// worker units plus `enqueue`/`len` calls from the supervisor. `len` is
/// signed because some backends report signed counts; the scale decision
/// clamps negatives to zero.
#[async_trait]
pub trait TaskQueue: Send + Sync + 'static {
    async fn enqueue(&self, task: Task) -> Result<(), QueueError>;

    /// Returns the next task, or `None` when the queue is currently empty.
    async fn dequeue(&self) -> Result<Option<Task>, QueueError>;

    async fn len(&self) -> Result<i64, QueueError>;
}

/// Process-local FIFO queue backend.
///
/// Good enough for demos, tests and single-process deployments; anything that
/// must survive a restart or span processes should implement [`TaskQueue`]
/// against a real broker instead.
#[derive(Debug, Default)]
pub struct InMemoryQueue {
    tasks: Mutex<VecDeque<Task>>,
}

impl InMemoryQueue {
    pub fn new() -> Self {
        Self::default()
    }

    fn tasks(&self) -> Result<MutexGuard<'_, VecDeque<Task>>, QueueError> {
        self.tasks
            .lock()
            .map_err(|_| QueueError::from(anyhow!("task queue mutex poisoned")))
    }
}

#[async_trait]
impl TaskQueue for InMemoryQueue {
    async fn enqueue(&self, task: Task) -> Result<(), QueueError> {
        self.tasks()?.push_back(task);
        Ok(())
    }

    async fn dequeue(&self) -> Result<Option<Task>, QueueError> {
        Ok(self.tasks()?.pop_front())
    }

    async fn len(&self) -> Result<i64, QueueError> {
        Ok(self.tasks()?.len() as i64)
    }
}

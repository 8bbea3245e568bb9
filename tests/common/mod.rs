#![allow(dead_code)]

use std::{
    collections::VecDeque,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc, Mutex,
    },
    time::Duration,
};

use anyhow::anyhow;
use async_trait::async_trait;

use pool_supervisor::{
    DispatchResult, Dispatcher, QueueError, Task, TaskQueue, WorkResult, Worker,
};

/// Queue whose tasks are never handed out: `dequeue` always reports empty.
/// Lets tests drive the backlog length without workers consuming anything.
#[derive(Debug, Default)]
pub struct FrozenQueue {
    tasks: Mutex<Vec<Task>>,
}

impl FrozenQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stored(&self) -> Vec<Task> {
        self.tasks.lock().unwrap().clone()
    }
}

#[async_trait]
impl TaskQueue for FrozenQueue {
    async fn enqueue(&self, task: Task) -> Result<(), QueueError> {
        self.tasks.lock().unwrap().push(task);
        Ok(())
    }

    async fn dequeue(&self) -> Result<Option<Task>, QueueError> {
        Ok(None)
    }

    async fn len(&self) -> Result<i64, QueueError> {
        Ok(self.tasks.lock().unwrap().len() as i64)
    }
}

/// Queue whose `dequeue` always fails; enqueue and length work normally.
#[derive(Debug, Default)]
pub struct BrokenFetchQueue {
    tasks: Mutex<Vec<Task>>,
}

impl BrokenFetchQueue {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TaskQueue for BrokenFetchQueue {
    async fn enqueue(&self, task: Task) -> Result<(), QueueError> {
        self.tasks.lock().unwrap().push(task);
        Ok(())
    }

    async fn dequeue(&self) -> Result<Option<Task>, QueueError> {
        Err(anyhow!("fetch backend unavailable").into())
    }

    async fn len(&self) -> Result<i64, QueueError> {
        Ok(self.tasks.lock().unwrap().len() as i64)
    }
}

/// Dispatcher that plays back a script of batches, one per cycle, and counts
/// invocations. Once the script is exhausted it produces empty batches.
#[derive(Clone, Default)]
pub struct ScriptedDispatcher {
    batches: Arc<Mutex<VecDeque<Vec<Task>>>>,
    calls: Arc<AtomicUsize>,
}

impl ScriptedDispatcher {
    pub fn new<I>(batches: I) -> Self
    where
        I: IntoIterator<Item = Vec<Task>>,
    {
        Self {
            batches: Arc::new(Mutex::new(batches.into_iter().collect())),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Dispatcher for ScriptedDispatcher {
    async fn dispatch(&self) -> DispatchResult {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let batch = self.batches.lock().unwrap().pop_front().unwrap_or_default();
        Ok(batch)
    }
}

/// Dispatcher that fails its first `failures` calls, then produces the same
/// batch on every later call.
#[derive(Clone)]
pub struct FlakyDispatcher {
    failures_left: Arc<AtomicUsize>,
    batch: Vec<Task>,
    calls: Arc<AtomicUsize>,
}

impl FlakyDispatcher {
    pub fn new(failures: usize, batch: Vec<Task>) -> Self {
        Self {
            failures_left: Arc::new(AtomicUsize::new(failures)),
            batch,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Dispatcher for FlakyDispatcher {
    async fn dispatch(&self) -> DispatchResult {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.failures_left.load(Ordering::SeqCst) > 0 {
            self.failures_left.fetch_sub(1, Ordering::SeqCst);
            return Err(anyhow!("dispatch backend unavailable"));
        }
        Ok(self.batch.clone())
    }
}

/// Worker that records every task it successfully processes.
#[derive(Clone, Default)]
pub struct RecordingWorker {
    processed: Arc<Mutex<Vec<Task>>>,
}

impl RecordingWorker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn processed(&self) -> Vec<Task> {
        self.processed.lock().unwrap().clone()
    }
}

#[async_trait]
impl Worker for RecordingWorker {
    async fn process(&self, task: Task) -> WorkResult {
        self.processed.lock().unwrap().push(task);
        Ok(())
    }
}

/// Worker that fails its first `failures` tasks and records the rest.
#[derive(Clone)]
pub struct FlakyWorker {
    failures_left: Arc<AtomicUsize>,
    attempts: Arc<AtomicUsize>,
    processed: Arc<Mutex<Vec<Task>>>,
}

impl FlakyWorker {
    pub fn new(failures: usize) -> Self {
        Self {
            failures_left: Arc::new(AtomicUsize::new(failures)),
            attempts: Arc::new(AtomicUsize::new(0)),
            processed: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }

    pub fn processed(&self) -> Vec<Task> {
        self.processed.lock().unwrap().clone()
    }
}

#[async_trait]
impl Worker for FlakyWorker {
    async fn process(&self, task: Task) -> WorkResult {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        if self.failures_left.load(Ordering::SeqCst) > 0 {
            self.failures_left.fetch_sub(1, Ordering::SeqCst);
            return Err(anyhow!("cannot handle {task}"));
        }
        self.processed.lock().unwrap().push(task);
        Ok(())
    }
}

/// Worker that takes `delay` to finish each task.
#[derive(Clone)]
pub struct SlowWorker {
    delay: Duration,
    processed: Arc<Mutex<Vec<Task>>>,
}

impl SlowWorker {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            processed: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn processed(&self) -> Vec<Task> {
        self.processed.lock().unwrap().clone()
    }
}

#[async_trait]
impl Worker for SlowWorker {
    async fn process(&self, task: Task) -> WorkResult {
        tokio::time::sleep(self.delay).await;
        self.processed.lock().unwrap().push(task);
        Ok(())
    }
}

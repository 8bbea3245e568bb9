use std::{fmt, sync::Arc, time::Duration};

use tokio::{sync::mpsc, time::Instant};
use tokio_util::sync::CancellationToken;

use crate::{
    callable::Worker, queue::TaskQueue, supervisor::WorkerEvent, WorkerId,
};

/// How long an idle worker waits before polling the queue again. Bounded so
/// TTL and shutdown checks still happen promptly on an empty queue.
const IDLE_BACKOFF: Duration = Duration::from_millis(50);

/// Lifecycle of a worker unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum WorkerState {
    Spawning,
    Running,
    /// TTL exceeded: the current task may finish, no further dequeues.
    Draining,
    Terminated,
}

impl fmt::Display for WorkerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Spawning => write!(f, "spawning"),
            Self::Running => write!(f, "running"),
            Self::Draining => write!(f, "draining"),
            Self::Terminated => write!(f, "terminated"),
        }
    }
}

/// Why a worker unit stopped; reported to the supervisor on exit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum WorkerOutcome {
    /// Outlived its time budget.
    Expired,
    /// The supervisor shut down in an orderly fashion.
    Interrupted,
    /// The supervisor disappeared without cancelling; the unit refuses to
    /// keep running orphaned.
    Orphaned,
}

impl fmt::Display for WorkerOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Expired => write!(f, "expired"),
            Self::Interrupted => write!(f, "interrupted"),
            Self::Orphaned => write!(f, "orphaned"),
        }
    }
}

/// One concurrently running consumer of the shared queue.
///
/// The loop checks, strictly between tasks: supervisor liveness, then the
/// time budget, then the queue. A task already handed to the worker callable
/// always runs to completion; there is no mid-task cancellation.
pub(crate) struct WorkerUnit {
    id: WorkerId,
    queue: Arc<dyn TaskQueue>,
    worker: Arc<dyn Worker>,
    ttl: Duration,
    shutdown: CancellationToken,
    events: mpsc::UnboundedSender<WorkerEvent>,
    state: WorkerState,
}

impl WorkerUnit {
    pub(crate) fn new(
        id: WorkerId,
        queue: Arc<dyn TaskQueue>,
        worker: Arc<dyn Worker>,
        ttl: Duration,
        shutdown: CancellationToken,
        events: mpsc::UnboundedSender<WorkerEvent>,
    ) -> Self {
        Self {
            id,
            queue,
            worker,
            ttl,
            shutdown,
            events,
            state: WorkerState::Spawning,
        }
    }

    /// Runs the unit to completion and reports the exit to the supervisor.
    pub(crate) async fn run(mut self) -> WorkerOutcome {
        tracing::debug!(worker_id = self.id, state = %self.state, "worker unit starting");
        let outcome = self.work_loop().await;
        self.state = WorkerState::Terminated;
        tracing::debug!(
            worker_id = self.id,
            state = %self.state,
            outcome = %outcome,
            "worker unit stopped"
        );
        let _ = self.events.send(WorkerEvent::Exited {
            id: self.id,
            outcome,
        });
        outcome
    }

    async fn work_loop(&mut self) -> WorkerOutcome {
        let started_at = Instant::now();
        self.state = WorkerState::Running;

        loop {
            if self.shutdown.is_cancelled() {
                return WorkerOutcome::Interrupted;
            }
            // The event channel closes only when the supervisor is gone.
            if self.events.is_closed() {
                return WorkerOutcome::Orphaned;
            }
            if started_at.elapsed() > self.ttl {
                self.state = WorkerState::Draining;
                tracing::debug!(worker_id = self.id, state = %self.state, "time budget exceeded");
                return WorkerOutcome::Expired;
            }

            match self.queue.dequeue().await {
                Ok(Some(task)) => {
                    if let Err(error) = self.worker.process(task).await {
                        tracing::warn!(worker_id = self.id, %error, "task failed");
                    }
                }
                Ok(None) => self.idle().await,
                Err(error) => {
                    // A broken fetch counts as "no task this iteration".
                    tracing::warn!(worker_id = self.id, %error, "task fetch failed");
                    self.idle().await;
                }
            }
        }
    }

    async fn idle(&self) {
        tokio::select! {
            _ = tokio::time::sleep(IDLE_BACKOFF) => {}
            _ = self.shutdown.cancelled() => {}
        }
    }
}

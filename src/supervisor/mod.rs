pub(crate) mod builder;
pub(crate) mod handle;

use std::{collections::HashMap, sync::Arc, time::Duration};

use thiserror::Error;
use tokio::{sync::mpsc, time::Instant};
use tokio_util::sync::CancellationToken;

use crate::{
    callable::{Dispatcher, Role, Worker},
    config::{ReforkInterval, SupervisorConfig},
    queue::TaskQueue,
    scale::should_spawn,
    supervisor::handle::{SupervisorHandle, SupervisorMessage},
    worker::{WorkerOutcome, WorkerUnit},
    WorkerId,
};

/// Sent by a worker unit when it stops, whatever the reason. Draining these
/// messages is the only path that removes entries from the worker registry.
#[derive(Debug)]
pub(crate) enum WorkerEvent {
    Exited {
        id: WorkerId,
        outcome: WorkerOutcome,
    },
}

/// Fatal supervisor failures. Everything recoverable (dispatcher errors,
/// queue hiccups, per-task worker failures) is logged and retried on the
/// next cycle instead of surfacing here.
#[derive(Debug, Error)]
pub enum SupervisorError {
    /// A required role has no callable. The worker role is checked before
    /// the loop starts, the dispatch role on the first cycle that needs it.
    #[error("'{0}' role not registered")]
    NotRegistered(Role),
    /// The supervisor task panicked or was aborted.
    #[error("supervisor task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

enum DispatchCycleError {
    NotRegistered(Role),
    Collaborator(anyhow::Error),
}

/// Supervises a bounded pool of workers pulling from a shared queue.
///
/// Once per cycle the supervisor reaps finished workers, runs the dispatcher
/// to top up the queue, and spawns a new [`WorkerUnit`] if the backlog
/// justifies one. A termination signal (or [`SupervisorHandle::shutdown`])
/// sets an exit flag that the loop observes at its next check point; workers
/// are never force-killed, they notice the supervisor is gone and stop
/// themselves after their current task.
pub struct Supervisor {
    queue: Arc<dyn TaskQueue>,
    dispatcher: Option<Arc<dyn Dispatcher>>,
    worker: Option<Arc<dyn Worker>>,
    config: SupervisorConfig,
    workers: HashMap<WorkerId, Instant>,
    next_worker_id: WorkerId,
    exit_requested: bool,
    shutdown: CancellationToken,
    events_tx: mpsc::UnboundedSender<WorkerEvent>,
    events_rx: mpsc::UnboundedReceiver<WorkerEvent>,
    external_tx: mpsc::UnboundedSender<SupervisorMessage>,
    external_rx: mpsc::UnboundedReceiver<SupervisorMessage>,
}

impl Supervisor {
    /// Starts the supervisor, consuming it and returning a handle for
    /// external control.
    ///
    /// Fails immediately with [`SupervisorError::NotRegistered`] when no
    /// worker callable has been registered.
    pub fn run(self) -> Result<SupervisorHandle, SupervisorError> {
        let worker = self
            .worker
            .clone()
            .ok_or(SupervisorError::NotRegistered(Role::Worker))?;

        if self.config.catch_signals {
            let tx = self.external_tx.clone();
            tokio::spawn(async move {
                match crate::signals::wait_for_shutdown_signal().await {
                    Ok(()) => {
                        let _ = tx.send(SupervisorMessage::Shutdown);
                    }
                    Err(error) => {
                        tracing::warn!(%error, "failed to listen for shutdown signals");
                    }
                }
            });
        }

        let external_tx = self.external_tx.clone();
        let join_handle = tokio::spawn(self.run_and_supervise(worker));
        Ok(SupervisorHandle::new(join_handle, external_tx))
    }

    async fn run_and_supervise(
        mut self,
        worker: Arc<dyn Worker>,
    ) -> Result<(), SupervisorError> {
        let result = self.supervise(&worker).await;
        // Workers poll this token between tasks; cancelling it tells them
        // the supervisor is gone and they must not keep running orphaned.
        self.shutdown.cancel();
        result
    }

    /// The cycling loop. One iteration: observe pending signal effects, top
    /// up the queue and maybe spawn while capacity remains, then either exit
    /// (one-shot) or sleep until the next cycle.
    async fn supervise(&mut self, worker: &Arc<dyn Worker>) -> Result<(), SupervisorError> {
        loop {
            self.drain_pending();
            if self.exit_requested {
                tracing::info!("supervisor exiting");
                return Ok(());
            }

            if self.workers.len() < self.config.max_workers {
                match self.run_dispatch().await {
                    Ok(backlog) => {
                        if should_spawn(
                            self.workers.len(),
                            self.config.max_workers,
                            backlog,
                            self.config.backlog_threshold,
                        ) {
                            self.spawn_worker(worker);
                        }
                    }
                    Err(DispatchCycleError::NotRegistered(role)) => {
                        return Err(SupervisorError::NotRegistered(role));
                    }
                    Err(DispatchCycleError::Collaborator(error)) => {
                        tracing::warn!(%error, "dispatch cycle failed, retrying next cycle");
                    }
                }
            }

            match self.config.refork_interval {
                ReforkInterval::OneShot => {
                    let remaining = match self.queue.len().await {
                        Ok(count) => count,
                        Err(error) => {
                            tracing::warn!(%error, "failed to read remaining backlog");
                            0
                        }
                    };
                    tracing::info!(
                        pid = std::process::id(),
                        remaining,
                        "supervisor finished single cycle"
                    );
                    return Ok(());
                }
                ReforkInterval::Every(interval) => self.sleep_between_cycles(interval).await,
            }
        }
    }

    /// One dispatch cycle: invoke the dispatcher, enqueue every valid task it
    /// produced, return the backlog length afterwards.
    async fn run_dispatch(&mut self) -> Result<i64, DispatchCycleError> {
        let dispatcher = self
            .dispatcher
            .as_ref()
            .ok_or(DispatchCycleError::NotRegistered(Role::Dispatch))?;

        let tasks = dispatcher
            .dispatch()
            .await
            .map_err(DispatchCycleError::Collaborator)?;

        for task in tasks {
            if !task.is_valid() {
                tracing::debug!("dropping empty task");
                continue;
            }
            self.queue
                .enqueue(task)
                .await
                .map_err(|error| DispatchCycleError::Collaborator(error.into()))?;
        }

        self.queue
            .len()
            .await
            .map_err(|error| DispatchCycleError::Collaborator(error.into()))
    }

    fn spawn_worker(&mut self, worker: &Arc<dyn Worker>) {
        let id = self.next_worker_id;
        self.next_worker_id += 1;

        let unit = WorkerUnit::new(
            id,
            Arc::clone(&self.queue),
            Arc::clone(worker),
            self.config.worker_ttl,
            self.shutdown.child_token(),
            self.events_tx.clone(),
        );
        tokio::spawn(unit.run());

        self.workers.insert(id, Instant::now());
        tracing::info!(worker_id = id, live = self.workers.len(), "worker started");
    }

    /// Applies reaps and control messages that arrived since the last check
    /// point, before the exit flag and worker count are read.
    fn drain_pending(&mut self) {
        while let Ok(event) = self.events_rx.try_recv() {
            self.reap(event);
        }
        while let Ok(msg) = self.external_rx.try_recv() {
            self.handle_message(msg);
        }
    }

    /// Removes the worker from the registry. This is the only removal path;
    /// the supervisor never infers a worker's death from a timeout.
    fn reap(&mut self, event: WorkerEvent) {
        let WorkerEvent::Exited { id, outcome } = event;
        if let Some(started_at) = self.workers.remove(&id) {
            tracing::info!(
                worker_id = id,
                outcome = %outcome,
                uptime = ?started_at.elapsed(),
                live = self.workers.len(),
                "worker exited"
            );
        }
    }

    fn handle_message(&mut self, msg: SupervisorMessage) {
        match msg {
            SupervisorMessage::Shutdown => {
                self.exit_requested = true;
            }
            SupervisorMessage::WorkerCount(reply) => {
                let _ = reply.send(self.workers.len());
            }
        }
    }

    /// Sleeps until the next cycle, reaping workers and serving control
    /// messages as they arrive. Returns early only on an exit request.
    ///
    /// Biased so pending reaps are applied before any message is answered;
    /// a worker-count reply must not observe a registry the reap path has
    /// already been told to shrink.
    async fn sleep_between_cycles(&mut self, interval: Duration) {
        let sleep = tokio::time::sleep(interval);
        tokio::pin!(sleep);

        loop {
            tokio::select! {
                biased;
                Some(event) = self.events_rx.recv() => self.reap(event),
                Some(msg) = self.external_rx.recv() => {
                    self.handle_message(msg);
                    if self.exit_requested {
                        return;
                    }
                }
                _ = &mut sleep => return,
            }
        }
    }
}

use std::{collections::HashMap, sync::Arc, time::Duration};

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::{
    callable::{Dispatcher, Worker},
    config::{ReforkInterval, SupervisorConfig},
    queue::TaskQueue,
    Supervisor,
};

/// Builds a [`Supervisor`] around a queue backend.
///
/// Configuration can be set field by field or wholesale via
/// [`with_config`](Self::with_config). The dispatch and worker roles each
/// hold one callable; registering a role again replaces the previous
/// callable and the replaced one is never invoked afterwards.
pub struct SupervisorBuilder {
    queue: Arc<dyn TaskQueue>,
    dispatcher: Option<Arc<dyn Dispatcher>>,
    worker: Option<Arc<dyn Worker>>,
    config: SupervisorConfig,
}

impl SupervisorBuilder {
    pub fn new(queue: Arc<dyn TaskQueue>) -> Self {
        Self {
            queue,
            dispatcher: None,
            worker: None,
            config: SupervisorConfig::default(),
        }
    }

    /// Replaces the whole configuration at once.
    pub fn with_config(mut self, config: SupervisorConfig) -> Self {
        self.config = config;
        self
    }

    /// Sets the upper bound on concurrently live workers.
    pub fn with_max_workers(mut self, max_workers: usize) -> Self {
        self.config.max_workers = max_workers;
        self
    }

    /// Sets the sleep between supervisor cycles.
    pub fn with_refork_interval(mut self, interval: Duration) -> Self {
        self.config.refork_interval = ReforkInterval::Every(interval);
        self
    }

    /// Run a single cycle and exit instead of looping.
    pub fn one_shot(mut self) -> Self {
        self.config.refork_interval = ReforkInterval::OneShot;
        self
    }

    /// Sets the backlog length above which a new worker is spawned.
    pub fn with_backlog_threshold(mut self, threshold: i64) -> Self {
        self.config.backlog_threshold = threshold;
        self
    }

    /// Sets the running-time budget after which a worker retires.
    pub fn with_worker_ttl(mut self, ttl: Duration) -> Self {
        self.config.worker_ttl = ttl;
        self
    }

    /// Enables or disables the OS termination-signal listener.
    pub fn with_catch_signals(mut self, catch_signals: bool) -> Self {
        self.config.catch_signals = catch_signals;
        self
    }

    /// Fills the dispatch role. Accepts any [`Dispatcher`], including plain
    /// `async fn() -> DispatchResult` functions.
    pub fn register_dispatcher(mut self, dispatcher: impl Dispatcher) -> Self {
        self.dispatcher = Some(Arc::new(dispatcher));
        self
    }

    /// Fills the worker role. Accepts any [`Worker`], including plain
    /// `async fn(Task) -> WorkResult` functions.
    pub fn register_worker(mut self, worker: impl Worker) -> Self {
        self.worker = Some(Arc::new(worker));
        self
    }

    /// Constructs the [`Supervisor`] with the configured settings.
    pub fn build(self) -> Supervisor {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let (external_tx, external_rx) = mpsc::unbounded_channel();
        Supervisor {
            queue: self.queue,
            dispatcher: self.dispatcher,
            worker: self.worker,
            config: self.config,
            workers: HashMap::new(),
            next_worker_id: 0,
            exit_requested: false,
            shutdown: CancellationToken::new(),
            events_tx,
            events_rx,
            external_tx,
            external_rx,
        }
    }
}

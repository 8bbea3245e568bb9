use std::time::Duration;

/// Cadence of the supervisor loop.
///
/// `OneShot` replaces the "not a valid duration" sentinel some schedulers
/// use: the supervisor performs a single dispatch/scale cycle, logs the
/// remaining backlog and exits without sleeping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReforkInterval {
    /// Sleep this long between cycles.
    Every(Duration),
    /// Run exactly one cycle, then exit.
    OneShot,
}

impl Default for ReforkInterval {
    fn default() -> Self {
        Self::Every(Duration::from_secs(8))
    }
}

/// Pool configuration, immutable once the supervisor is built.
///
/// # Example
/// ```
/// use std::time::Duration;
/// use pool_supervisor::{ReforkInterval, SupervisorConfig};
///
/// let mut cfg = SupervisorConfig::default();
/// cfg.max_workers = 4;
/// cfg.refork_interval = ReforkInterval::Every(Duration::from_secs(2));
/// cfg.worker_ttl = Duration::from_secs(300);
///
/// assert_eq!(cfg.max_workers, 4);
/// ```
#[derive(Debug, Clone)]
pub struct SupervisorConfig {
    /// Upper bound on concurrently live workers. `0` disables spawning.
    pub max_workers: usize,
    /// Cadence of the supervisor loop.
    pub refork_interval: ReforkInterval,
    /// A new worker is spawned only when the backlog exceeds this, or when
    /// the pool is empty and any backlog exists.
    pub backlog_threshold: i64,
    /// Running time after which a worker finishes its current task and
    /// retires. It never picks up a new task past this budget.
    pub worker_ttl: Duration,
    /// Listen for OS termination signals (SIGINT/SIGTERM/SIGQUIT) and stop
    /// the loop when one arrives. Disable when embedding the supervisor in a
    /// process that owns signal handling itself.
    pub catch_signals: bool,
}

impl Default for SupervisorConfig {
    /// Defaults:
    /// - `max_workers = 20`
    /// - `refork_interval = Every(8s)`
    /// - `backlog_threshold = 3`
    /// - `worker_ttl = 1800s`
    /// - `catch_signals = true`
    fn default() -> Self {
        Self {
            max_workers: 20,
            refork_interval: ReforkInterval::default(),
            backlog_threshold: 3,
            worker_ttl: Duration::from_secs(1800),
            catch_signals: true,
        }
    }
}

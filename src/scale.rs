/// Decides whether the pool should spawn another worker.
///
/// True iff capacity remains (`live_workers < max_workers`) and either the
/// pool is empty while work exists, or the backlog exceeds the threshold.
/// Negative backlog counts from a backend are treated as zero; a pool with
/// `max_workers == 0` never spawns.
///
/// ```
/// use pool_supervisor::should_spawn;
///
/// assert!(should_spawn(0, 4, 1, 3));   // empty pool, work waiting
/// assert!(!should_spawn(1, 4, 3, 3));  // backlog must exceed the threshold
/// assert!(should_spawn(1, 4, 4, 3));
/// assert!(!should_spawn(2, 2, 100, 3)); // at capacity
/// ```
pub fn should_spawn(
    live_workers: usize,
    max_workers: usize,
    backlog: i64,
    backlog_threshold: i64,
) -> bool {
    if max_workers == 0 || live_workers >= max_workers {
        return false;
    }
    let backlog = backlog.max(0);
    (live_workers == 0 && backlog > 0) || backlog > backlog_threshold
}

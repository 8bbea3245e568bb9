use std::{fmt, future::Future};

use async_trait::async_trait;

use crate::task::Task;

/// Error type user callables report back to the pool.
pub type CallableError = anyhow::Error;

/// What a [`Dispatcher`] produces per cycle: a finite batch of tasks.
pub type DispatchResult = Result<Vec<Task>, CallableError>;

/// Outcome of processing a single task; the value itself is ignored.
pub type WorkResult = Result<(), CallableError>;

/// The two roles a supervisor needs filled before it can do anything.
///
/// Each role holds exactly one callable; registering a role again replaces
/// the previous callable. The worker role must be present before
/// [`Supervisor::run`](crate::Supervisor::run), the dispatch role before the
/// first dispatch cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Dispatch,
    Worker,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Dispatch => write!(f, "dispatch"),
            Self::Worker => write!(f, "worker"),
        }
    }
}

/// Produces tasks for the pool. Invoked once per supervisor cycle while the
/// pool has spare capacity.
///
/// A returned error aborts the current cycle's scale decision; the
/// supervisor logs it and tries again on the next cycle. There is no
/// internal timeout: a dispatcher that hangs stalls scaling decisions.
#[async_trait]
pub trait Dispatcher: Send + Sync + 'static {
    async fn dispatch(&self) -> DispatchResult;
}

/// Consumes one task at a time. The same instance is shared by every worker
/// unit in the pool, so per-task state belongs in locals and cross-task state
/// behind `Arc`.
///
/// A returned error is logged by the worker unit and does not terminate it;
/// the unit moves on to the next task.
#[async_trait]
pub trait Worker: Send + Sync + 'static {
    async fn process(&self, task: Task) -> WorkResult;
}

#[async_trait]
impl<F, Fut> Dispatcher for F
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = DispatchResult> + Send + 'static,
{
    async fn dispatch(&self) -> DispatchResult {
        (self)().await
    }
}

#[async_trait]
impl<F, Fut> Worker for F
where
    F: Fn(Task) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = WorkResult> + Send + 'static,
{
    async fn process(&self, task: Task) -> WorkResult {
        (self)(task).await
    }
}

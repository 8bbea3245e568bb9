//! # pool-supervisor
//!
//! `pool-supervisor` keeps a bounded pool of Tokio workers fed from a shared
//! task queue. On a fixed cadence it asks a user-supplied dispatcher for new
//! tasks, decides from the backlog whether another worker is worth spawning,
//! reaps workers that have finished, retires workers past their time budget,
//! and shuts the whole pool down cleanly on a termination signal.
//!
//! ## Install
//!
//! ```bash
//! cargo add pool-supervisor
//! ```
//!
//! ## Quick example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use pool_supervisor::{DispatchResult, InMemoryQueue, SupervisorBuilder, Task, WorkResult};
//!
//! async fn produce() -> DispatchResult {
//!     // Fetch pending work from wherever it lives.
//!     Ok(vec![Task::new("resize:42"), Task::new("resize:43")])
//! }
//!
//! async fn consume(task: Task) -> WorkResult {
//!     println!("working on {}", task.payload());
//!     Ok(())
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let handle = SupervisorBuilder::new(Arc::new(InMemoryQueue::new()))
//!         .register_dispatcher(produce)
//!         .register_worker(consume)
//!         .build()
//!         .run()?;
//!
//!     handle.wait().await?; // until a termination signal arrives
//!     Ok(())
//! }
//! ```
//!
//! ## What you get
//!
//! * **Backlog-driven scaling** – a worker is spawned only when nobody is
//!   running and work exists, or when the backlog exceeds a threshold.
//! * **Worker time budgets** – workers finish their current task and retire
//!   once they outlive `worker_ttl`; the supervisor reaps them and may spawn
//!   replacements on the next cycle.
//! * **Clean shutdown** – SIGINT/SIGTERM (or [`SupervisorHandle::shutdown`])
//!   stops the loop; workers notice the supervisor is gone and stop themselves
//!   after their current task.
//! * **One-shot mode** – run a single dispatch/scale cycle and exit, for
//!   cron-style invocations.
//!
//! ## API overview
//!
//! | Surface                          | Purpose                                        |
//! | -------------------------------- | ---------------------------------------------- |
//! | [`SupervisorBuilder`]            | Configure the pool and register callables      |
//! | [`Dispatcher`] / [`Worker`]      | The two user-supplied roles (traits or fns)    |
//! | [`TaskQueue`]                    | Queue backend contract; [`InMemoryQueue`] ships |
//! | [`SupervisorHandle::shutdown`]   | Request a stop programmatically                |
//! | [`SupervisorHandle::worker_count`] | Live worker count                            |
//! | [`SupervisorHandle::wait`]       | Await supervisor completion                    |
//!
//! ## License
//!
//! MIT

pub use callable::{CallableError, DispatchResult, Dispatcher, Role, WorkResult, Worker};
pub use config::{ReforkInterval, SupervisorConfig};
pub use queue::{InMemoryQueue, QueueError, TaskQueue};
pub use scale::should_spawn;
pub use signals::wait_for_shutdown_signal;
pub use supervisor::{
    builder::SupervisorBuilder,
    handle::{SupervisorHandle, SupervisorHandleError},
    Supervisor, SupervisorError,
};
pub use task::Task;

mod callable;
mod config;
mod queue;
mod scale;
mod signals;
mod supervisor;
mod task;
mod worker;

/// Identifier the supervisor assigns to each spawned worker unit.
pub type WorkerId = u64;

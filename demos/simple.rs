use std::{
    sync::{
        atomic::{AtomicU32, Ordering},
        Arc,
    },
    time::Duration,
};

use async_trait::async_trait;
use pool_supervisor::{
    DispatchResult, Dispatcher, InMemoryQueue, SupervisorBuilder, Task, WorkResult, Worker,
};

/// Produces a couple of fake image-resize jobs per cycle.
struct FeedDispatcher {
    next_id: AtomicU32,
}

#[async_trait]
impl Dispatcher for FeedDispatcher {
    async fn dispatch(&self) -> DispatchResult {
        let id = self.next_id.fetch_add(2, Ordering::Relaxed);
        Ok(vec![
            Task::new(format!("resize:{id}")),
            Task::new(format!("resize:{}", id + 1)),
        ])
    }
}

struct PrintWorker;

#[async_trait]
impl Worker for PrintWorker {
    async fn process(&self, task: Task) -> WorkResult {
        println!("processing {task}");
        tokio::time::sleep(Duration::from_millis(300)).await;
        Ok(())
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt().init();

    let handle = SupervisorBuilder::new(Arc::new(InMemoryQueue::new()))
        .with_max_workers(4)
        .with_refork_interval(Duration::from_secs(2))
        .with_backlog_threshold(3)
        .with_worker_ttl(Duration::from_secs(30))
        .register_dispatcher(FeedDispatcher {
            next_id: AtomicU32::new(0),
        })
        .register_worker(PrintWorker)
        .build()
        .run()?;

    // Ctrl-C stops the loop; workers finish their current task and retire.
    handle.wait().await?;
    println!("pool drained, bye 🫡");
    Ok(())
}

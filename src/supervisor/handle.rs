use thiserror::Error;
use tokio::{
    sync::{mpsc, oneshot},
    task::JoinHandle,
};

use crate::supervisor::SupervisorError;

/// Control messages accepted by a running supervisor. The OS signal listener
/// and the handle both feed this channel; the loop drains it at every check
/// point, so a message is observed no later than the next cycle.
#[derive(Debug)]
pub(crate) enum SupervisorMessage {
    Shutdown,
    WorkerCount(oneshot::Sender<usize>),
}

/// Errors returned when talking to a supervisor that has already exited.
#[derive(Debug, Error)]
pub enum SupervisorHandleError {
    #[error("failed to send message to supervisor: {0}")]
    SendError(String),
    #[error("supervisor exited before replying")]
    RecvError,
}

/// External control over a running [`Supervisor`](crate::Supervisor).
#[derive(Debug)]
pub struct SupervisorHandle {
    join_handle: JoinHandle<Result<(), SupervisorError>>,
    tx: mpsc::UnboundedSender<SupervisorMessage>,
}

impl SupervisorHandle {
    pub(crate) fn new(
        join_handle: JoinHandle<Result<(), SupervisorError>>,
        tx: mpsc::UnboundedSender<SupervisorMessage>,
    ) -> Self {
        Self { join_handle, tx }
    }

    /// Requests an orderly stop, equivalent to a termination signal: the
    /// loop exits at its next check point and workers stop themselves after
    /// their current task.
    pub fn shutdown(&self) -> Result<(), SupervisorHandleError> {
        self.tx
            .send(SupervisorMessage::Shutdown)
            .map_err(|e| SupervisorHandleError::SendError(e.to_string()))
    }

    /// Number of currently live workers.
    pub async fn worker_count(&self) -> Result<usize, SupervisorHandleError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.tx
            .send(SupervisorMessage::WorkerCount(reply_tx))
            .map_err(|e| SupervisorHandleError::SendError(e.to_string()))?;
        reply_rx
            .await
            .map_err(|_| SupervisorHandleError::RecvError)
    }

    /// Whether the supervisor loop has finished.
    pub fn is_finished(&self) -> bool {
        self.join_handle.is_finished()
    }

    /// Waits for the supervisor to complete and returns its result.
    pub async fn wait(self) -> Result<(), SupervisorError> {
        self.join_handle.await?
    }
}

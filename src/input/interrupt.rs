//! Edge interrupt glue for the threaded work queue (std only).

use crate::error::Result;
use crate::queue::{Scheduler, WorkQueueHandle};
use crate::time::Clock;

use super::{EdgeNotifier, InputTask};

/// Everything a GPIO edge callback needs: the line's notifier and a queue
/// handle. Calling [`on_edge`](Self::on_edge) never blocks on task code.
pub struct LineInterrupt<C, const N: usize> {
    notifier: EdgeNotifier,
    queue: WorkQueueHandle<InputTask, C, N>,
}

impl<C: Clock, const N: usize> LineInterrupt<C, N> {
    /// Bind `notifier` to `queue`.
    pub fn new(notifier: EdgeNotifier, queue: WorkQueueHandle<InputTask, C, N>) -> Self {
        Self { notifier, queue }
    }

    /// Report one edge.
    ///
    /// # Errors
    ///
    /// Returns `QueueError::Shutdown` once the worker has stopped.
    pub fn on_edge(&mut self) -> Result<()> {
        self.notifier.notify(&mut self.queue)
    }

    /// Whether a settle evaluation is pending for this line.
    pub fn is_settling(&self) -> bool {
        self.queue.is_pending(self.notifier.task())
    }
}

//! Dedicated worker thread for a delayed task queue (std only).

use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};

use crate::error::{QueueError, Result};
use crate::time::{Clock, Instant};

use super::{DelayedTaskQueue, Scheduler, TaskHandler};

struct State<T, const N: usize> {
    queue: DelayedTaskQueue<T, N>,
    shutdown: bool,
}

struct Shared<T, const N: usize> {
    state: Mutex<State<T, N>>,
    wake: Condvar,
}

impl<T, const N: usize> Shared<T, N> {
    fn lock(&self) -> MutexGuard<'_, State<T, N>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// A delayed task queue that has not been started yet.
///
/// Hand out [`WorkQueueHandle`]s (to interrupt handlers, to startup code
/// that arms the first tasks), then [`spawn`](WorkQueue::spawn) the worker.
pub struct WorkQueue<T, C, const N: usize> {
    shared: Arc<Shared<T, N>>,
    clock: C,
}

impl<T, C, const N: usize> WorkQueue<T, C, N>
where
    T: Copy + Eq + Send + 'static,
    C: Clock + Clone + Send + 'static,
{
    /// Create an idle queue reading time from `clock`.
    pub fn new(clock: C) -> Self {
        Self {
            shared: Arc::new(Shared {
                state: Mutex::new(State {
                    queue: DelayedTaskQueue::new(),
                    shutdown: false,
                }),
                wake: Condvar::new(),
            }),
            clock,
        }
    }

    /// A scheduling handle. Cheap to clone, safe to move across threads.
    pub fn handle(&self) -> WorkQueueHandle<T, C, N> {
        WorkQueueHandle {
            shared: Arc::clone(&self.shared),
            clock: self.clock.clone(),
        }
    }

    /// Start the worker thread. `handler` runs every task, one at a time,
    /// on that thread only.
    ///
    /// # Errors
    ///
    /// Returns `QueueError::Spawn` if the thread cannot be created.
    pub fn spawn<H>(self, name: &str, handler: H) -> Result<Worker<T, C, N>>
    where
        H: TaskHandler<T> + Send + 'static,
    {
        let handle = self.handle();
        let worker_handle = self.handle();
        let thread = thread::Builder::new()
            .name(name.into())
            .spawn(move || run_worker(worker_handle, handler))
            .map_err(|_| QueueError::Spawn)?;

        debug!("work queue '{}' started", name);
        Ok(Worker {
            handle,
            thread: Some(thread),
        })
    }
}

/// Scheduling surface of a [`WorkQueue`].
///
/// Every call takes the queue lock only long enough to update one slot and
/// wake the worker, so it is fit for interrupt-like contexts.
pub struct WorkQueueHandle<T, C, const N: usize> {
    shared: Arc<Shared<T, N>>,
    clock: C,
}

impl<T, C: Clone, const N: usize> Clone for WorkQueueHandle<T, C, N> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
            clock: self.clock.clone(),
        }
    }
}

impl<T, C, const N: usize> WorkQueueHandle<T, C, N>
where
    T: Copy + Eq,
    C: Clock,
{
    /// Whether `task` is armed.
    pub fn is_pending(&self, task: T) -> bool {
        self.shared.lock().queue.is_pending(task)
    }

    /// Deadline of `task`, if armed.
    pub fn deadline_of(&self, task: T) -> Option<Instant> {
        self.shared.lock().queue.deadline_of(task)
    }

    /// Number of armed tasks.
    pub fn pending_count(&self) -> usize {
        self.shared.lock().queue.pending_count()
    }

    /// Arm `task` only if idle. Returns whether it was armed.
    ///
    /// # Errors
    ///
    /// Returns `QueueError::Shutdown` once the worker has stopped, or
    /// `QueueError::Full` if the task does not fit.
    pub fn schedule_if_idle(&mut self, task: T, delay: crate::time::Millis) -> Result<bool> {
        let now = self.clock.now();
        let mut state = self.shared.lock();
        if state.shutdown {
            return Err(QueueError::Shutdown.into());
        }
        let armed = state.queue.schedule_if_idle(task, delay, now)?;
        drop(state);
        self.shared.wake.notify_one();
        Ok(armed)
    }
}

impl<T, C, const N: usize> Scheduler<T> for WorkQueueHandle<T, C, N>
where
    T: Copy + Eq,
    C: Clock,
{
    fn now(&self) -> Instant {
        self.clock.now()
    }

    fn reschedule(&mut self, task: T, deadline: Instant) -> Result<()> {
        let mut state = self.shared.lock();
        if state.shutdown {
            return Err(QueueError::Shutdown.into());
        }
        state.queue.reschedule(task, deadline)?;
        drop(state);
        self.shared.wake.notify_one();
        Ok(())
    }

    fn cancel(&mut self, task: T) -> bool {
        let cancelled = self.shared.lock().queue.cancel(task);
        if cancelled {
            self.shared.wake.notify_one();
        }
        cancelled
    }
}

/// A running worker thread. Dropping it stops and joins the thread.
pub struct Worker<T, C, const N: usize> {
    handle: WorkQueueHandle<T, C, N>,
    thread: Option<JoinHandle<()>>,
}

impl<T, C: Clone, const N: usize> Worker<T, C, N> {
    /// A scheduling handle for this worker's queue.
    pub fn handle(&self) -> WorkQueueHandle<T, C, N> {
        self.handle.clone()
    }
}

impl<T, C, const N: usize> Worker<T, C, N> {
    /// Stop the worker after the task it is running, if any, and wait for it.
    /// Pending tasks are dropped.
    pub fn shutdown(mut self) {
        self.stop();
    }

    fn stop(&mut self) {
        self.handle.shared.lock().shutdown = true;
        self.handle.shared.wake.notify_all();
        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                error!("work queue worker panicked");
            }
        }
    }
}

impl<T, C, const N: usize> Drop for Worker<T, C, N> {
    fn drop(&mut self) {
        self.stop();
    }
}

fn run_worker<T, C, H, const N: usize>(mut handle: WorkQueueHandle<T, C, N>, mut handler: H)
where
    T: Copy + Eq,
    C: Clock,
    H: TaskHandler<T>,
{
    loop {
        let task = {
            let shared = Arc::clone(&handle.shared);
            let mut state = shared.lock();
            loop {
                if state.shutdown {
                    trace!("work queue worker exiting");
                    return;
                }
                let now = handle.clock.now();
                if let Some(task) = state.queue.pop_due(now) {
                    break task;
                }
                state = match state.queue.next_deadline() {
                    Some(deadline) => {
                        let wait = deadline.saturating_duration_since(now);
                        shared
                            .wake
                            .wait_timeout(state, wait.into())
                            .map(|(guard, _)| guard)
                            .unwrap_or_else(|e| e.into_inner().0)
                    }
                    None => shared
                        .wake
                        .wait(state)
                        .unwrap_or_else(PoisonError::into_inner),
                };
            }
        };
        handler.run(task, &mut handle);
    }
}

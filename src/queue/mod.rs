//! Delayed task queue.
//!
//! Tasks are identified by small `Copy` keys, armed with a deadline and run
//! one at a time by a single executor. Interrupt handlers only ever see the
//! [`Scheduler`] surface: they arm, re-arm or cancel, and never run task
//! code themselves.

mod delayed;
#[cfg(feature = "std")]
mod worker;

pub use delayed::{DelayedTaskQueue, QueueContext};
#[cfg(feature = "std")]
pub use worker::{WorkQueue, WorkQueueHandle, Worker};

use crate::error::Result;
use crate::time::{Instant, Millis};

/// Arm and disarm delayed tasks.
pub trait Scheduler<T> {
    /// Current instant as seen by this scheduler.
    fn now(&self) -> Instant;

    /// Arm `task` for `deadline`, replacing a pending deadline.
    fn reschedule(&mut self, task: T, deadline: Instant) -> Result<()>;

    /// Disarm `task`. Returns whether it was pending.
    fn cancel(&mut self, task: T) -> bool;

    /// Arm `task` to fire `delay` from now, replacing a pending deadline.
    fn schedule(&mut self, task: T, delay: Millis) -> Result<()> {
        let deadline = self.now() + delay;
        self.reschedule(task, deadline)
    }
}

/// Task callbacks, dispatched by key.
pub trait TaskHandler<T> {
    /// Run `task`. `scheduler` may be used to arm follow-up tasks.
    fn run<S: Scheduler<T>>(&mut self, task: T, scheduler: &mut S);
}

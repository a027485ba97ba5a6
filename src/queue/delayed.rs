//! Deadline-ordered task arena.

use heapless::Vec;

use crate::error::{QueueError, Result};
use crate::time::{Instant, Millis};

use super::{Scheduler, TaskHandler};

#[derive(Debug, Clone, Copy)]
struct Slot<T> {
    task: T,
    deadline: Option<Instant>,
    /// Arrival order of the current deadline, for FIFO tie-break.
    seq: u64,
}

/// Delayed task queue holding at most `N` distinct task keys.
///
/// Each key owns one slot, allocated on first use and never freed, so the
/// queue cannot grow past `N` entries no matter how often tasks are
/// re-armed. A slot is either idle or pending with exactly one deadline.
///
/// # Example
///
/// ```rust
/// use stepper_coord::queue::DelayedTaskQueue;
/// use stepper_coord::time::{Instant, Millis};
///
/// let mut queue: DelayedTaskQueue<u8, 4> = DelayedTaskQueue::new();
/// queue.schedule(1, Millis(30), Instant(0)).unwrap();
/// queue.schedule(1, Millis(30), Instant(10)).unwrap();
/// assert_eq!(queue.pending_count(), 1);
/// assert_eq!(queue.next_deadline(), Some(Instant(40)));
/// ```
#[derive(Debug, Clone)]
pub struct DelayedTaskQueue<T, const N: usize> {
    slots: Vec<Slot<T>, N>,
    next_seq: u64,
}

impl<T, const N: usize> Default for DelayedTaskQueue<T, N>
where
    T: Copy + Eq,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T, const N: usize> DelayedTaskQueue<T, N>
where
    T: Copy + Eq,
{
    /// Create an empty queue.
    pub const fn new() -> Self {
        Self {
            slots: Vec::new(),
            next_seq: 0,
        }
    }

    /// Arm `task` to fire `delay` after `now`, replacing any pending deadline.
    ///
    /// # Errors
    ///
    /// Returns `QueueError::Full` if `task` is new and every slot is taken.
    #[inline]
    pub fn schedule(&mut self, task: T, delay: Millis, now: Instant) -> Result<()> {
        self.reschedule(task, now + delay)
    }

    /// Arm `task` to fire at `deadline`, replacing any pending deadline.
    ///
    /// The task counts as arriving now for tie-break purposes.
    ///
    /// # Errors
    ///
    /// Returns `QueueError::Full` if `task` is new and every slot is taken.
    pub fn reschedule(&mut self, task: T, deadline: Instant) -> Result<()> {
        let seq = self.next_seq;
        let slot = self.slot_mut(task)?;
        slot.deadline = Some(deadline);
        slot.seq = seq;
        self.next_seq += 1;
        Ok(())
    }

    /// Arm `task` only if it is idle. A pending deadline is left untouched.
    ///
    /// Returns whether the task was armed.
    ///
    /// # Errors
    ///
    /// Returns `QueueError::Full` if `task` is new and every slot is taken.
    pub fn schedule_if_idle(&mut self, task: T, delay: Millis, now: Instant) -> Result<bool> {
        if self.is_pending(task) {
            return Ok(false);
        }
        self.schedule(task, delay, now)?;
        Ok(true)
    }

    /// Disarm `task`. Returns whether it was pending.
    pub fn cancel(&mut self, task: T) -> bool {
        match self.slots.iter_mut().find(|s| s.task == task) {
            Some(slot) => slot.deadline.take().is_some(),
            None => false,
        }
    }

    /// Whether `task` is armed.
    #[inline]
    pub fn is_pending(&self, task: T) -> bool {
        self.deadline_of(task).is_some()
    }

    /// Deadline of `task`, if armed.
    pub fn deadline_of(&self, task: T) -> Option<Instant> {
        self.slots
            .iter()
            .find(|s| s.task == task)
            .and_then(|s| s.deadline)
    }

    /// Number of armed tasks.
    pub fn pending_count(&self) -> usize {
        self.slots.iter().filter(|s| s.deadline.is_some()).count()
    }

    /// Whether no task is armed.
    #[inline]
    pub fn is_idle(&self) -> bool {
        self.pending_count() == 0
    }

    /// Earliest armed deadline.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.next_slot().and_then(|i| self.slots[i].deadline)
    }

    /// Take the next task whose deadline is at or before `now`.
    ///
    /// Tasks come out in deadline order, ties in arrival order. The task is
    /// idle again by the time it is returned, so its callback may re-arm it.
    pub fn pop_due(&mut self, now: Instant) -> Option<T> {
        let index = self.next_slot()?;
        let slot = &mut self.slots[index];
        match slot.deadline {
            Some(deadline) if deadline <= now => {
                slot.deadline = None;
                Some(slot.task)
            }
            _ => None,
        }
    }

    /// Run every task due at `now`, including tasks armed by those callbacks
    /// for `now` or earlier. Returns how many ran.
    pub fn run_due<H>(&mut self, handler: &mut H, now: Instant) -> usize
    where
        H: TaskHandler<T>,
    {
        let mut ran = 0;
        while let Some(task) = self.pop_due(now) {
            handler.run(task, &mut QueueContext { queue: self, now });
            ran += 1;
        }
        ran
    }

    /// Advance virtual time up to `until`, firing each task at its own
    /// deadline. Returns how many ran.
    pub fn run_until<H>(&mut self, handler: &mut H, until: Instant) -> usize
    where
        H: TaskHandler<T>,
    {
        let mut ran = 0;
        while let Some(deadline) = self.next_deadline() {
            if deadline > until {
                break;
            }
            if let Some(task) = self.pop_due(deadline) {
                handler.run(task, &mut QueueContext { queue: self, now: deadline });
                ran += 1;
            }
        }
        ran
    }

    fn next_slot(&self) -> Option<usize> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(i, s)| s.deadline.map(|d| (d, s.seq, i)))
            .min()
            .map(|(_, _, i)| i)
    }

    fn slot_mut(&mut self, task: T) -> Result<&mut Slot<T>> {
        let index = match self.slots.iter().position(|s| s.task == task) {
            Some(index) => index,
            None => {
                self.slots
                    .push(Slot {
                        task,
                        deadline: None,
                        seq: 0,
                    })
                    .map_err(|_| QueueError::Full)?;
                self.slots.len() - 1
            }
        };
        Ok(&mut self.slots[index])
    }
}

/// A queue paired with the instant its callbacks observe.
pub struct QueueContext<'a, T, const N: usize> {
    queue: &'a mut DelayedTaskQueue<T, N>,
    now: Instant,
}

impl<'a, T, const N: usize> QueueContext<'a, T, N> {
    /// Borrow `queue` as a scheduler frozen at `now`.
    pub fn new(queue: &'a mut DelayedTaskQueue<T, N>, now: Instant) -> Self {
        Self { queue, now }
    }
}

impl<T, const N: usize> Scheduler<T> for QueueContext<'_, T, N>
where
    T: Copy + Eq,
{
    fn now(&self) -> Instant {
        self.now
    }

    fn reschedule(&mut self, task: T, deadline: Instant) -> Result<()> {
        self.queue.reschedule(task, deadline)
    }

    fn cancel(&mut self, task: T) -> bool {
        self.queue.cancel(task)
    }
}

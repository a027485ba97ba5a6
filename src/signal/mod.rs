//! Completion signals.
//!
//! A signal is a single slot a producer raises once per cycle and one
//! consumer waits on. [`Waitable`] is the whole contract; the actuator's
//! asynchronous completion is expressed only in terms of it.

#[cfg(feature = "std")]
mod completion;

#[cfg(feature = "std")]
pub use completion::{wait_any, CompletionSignal};

use crate::error::Result;
use crate::time::Timeout;

/// Set-once notification carrying a value.
pub trait Waitable<T> {
    /// Store `value` and wake the waiter, if any.
    fn raise(&self, value: T);

    /// Block until raised or until `timeout` elapses. On success the slot is
    /// cleared before returning, ready for the next cycle.
    fn wait(&self, timeout: Timeout) -> Result<T>;

    /// Take the value without blocking.
    fn try_take(&self) -> Option<T>;

    /// Reset to unset, discarding any value.
    fn clear(&self);

    /// Whether the signal is raised.
    fn is_set(&self) -> bool;
}

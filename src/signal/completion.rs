//! Condvar-backed completion signal (std only).

use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant as StdInstant};

use crate::error::{Result, SignalError};
use crate::time::Timeout;

use super::Waitable;

/// Wake-up cell owned by one waiting context for the duration of one wait.
#[derive(Default)]
struct WaitCell {
    fired: Mutex<bool>,
    cond: Condvar,
}

impl WaitCell {
    fn lock(&self) -> MutexGuard<'_, bool> {
        self.fired.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn fire(&self) {
        *self.lock() = true;
        self.cond.notify_one();
    }
}

struct Slot<T> {
    value: Option<T>,
    waiter: Option<Arc<WaitCell>>,
}

/// Single-slot completion signal.
///
/// Clones share the slot: the consumer keeps one handle, the producer (an
/// actuator driver) receives another with each command.
///
/// # Example
///
/// ```rust
/// use stepper_coord::signal::{CompletionSignal, Waitable};
/// use stepper_coord::time::Timeout;
///
/// let signal = CompletionSignal::new();
/// let producer = signal.clone();
/// std::thread::spawn(move || producer.raise(7u32));
/// assert_eq!(signal.wait(Timeout::Forever).unwrap(), 7);
/// assert!(!signal.is_set());
/// ```
pub struct CompletionSignal<T> {
    slot: Arc<Mutex<Slot<T>>>,
}

impl<T> Clone for CompletionSignal<T> {
    fn clone(&self) -> Self {
        Self {
            slot: Arc::clone(&self.slot),
        }
    }
}

impl<T> Default for CompletionSignal<T> {
    fn default() -> Self {
        Self {
            slot: Arc::new(Mutex::new(Slot {
                value: None,
                waiter: None,
            })),
        }
    }
}

impl<T> core::fmt::Debug for CompletionSignal<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let slot = self.lock();
        f.debug_struct("CompletionSignal")
            .field("set", &slot.value.is_some())
            .field("waiting", &slot.waiter.is_some())
            .finish()
    }
}

impl<T> CompletionSignal<T> {
    /// Create an unset signal.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether both handles refer to the same slot.
    pub fn same_as(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.slot, &other.slot)
    }

    fn lock(&self) -> MutexGuard<'_, Slot<T>> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<T: Copy + Send> Waitable<T> for CompletionSignal<T> {
    fn raise(&self, value: T) {
        let waiter = {
            let mut slot = self.lock();
            if slot.value.is_some() {
                trace!("signal raised twice before being observed");
            }
            slot.value = Some(value);
            slot.waiter.clone()
        };
        if let Some(waiter) = waiter {
            waiter.fire();
        }
    }

    fn wait(&self, timeout: Timeout) -> Result<T> {
        wait_any(&[self], timeout).map(|(_, value)| value)
    }

    fn try_take(&self) -> Option<T> {
        self.lock().value.take()
    }

    fn clear(&self) {
        self.lock().value = None;
    }

    fn is_set(&self) -> bool {
        self.lock().value.is_some()
    }
}

/// Wait until any of `signals` is raised.
///
/// Returns the index of the first raised signal in slice order together with
/// its value. Only that signal is cleared.
///
/// # Errors
///
/// - `SignalError::Timeout` if none is raised in time.
/// - `SignalError::Busy` if another context is already waiting on one of them.
pub fn wait_any<T: Copy + Send>(
    signals: &[&CompletionSignal<T>],
    timeout: Timeout,
) -> Result<(usize, T)> {
    let cell = Arc::new(WaitCell::default());

    for (i, signal) in signals.iter().enumerate() {
        let mut slot = signal.lock();
        if slot.waiter.is_some() {
            drop(slot);
            release(&signals[..i]);
            return Err(SignalError::Busy.into());
        }
        slot.waiter = Some(Arc::clone(&cell));
    }

    let deadline = match timeout {
        Timeout::After(ms) => Some(StdInstant::now() + Duration::from(ms)),
        Timeout::NoWait | Timeout::Forever => None,
    };

    let result = loop {
        if let Some(hit) = take_first(signals) {
            break Ok(hit);
        }

        let mut fired = cell.lock();
        match deadline {
            None if timeout == Timeout::NoWait => break Err(SignalError::Timeout.into()),
            None => {
                while !*fired {
                    fired = cell.cond.wait(fired).unwrap_or_else(PoisonError::into_inner);
                }
            }
            Some(deadline) => {
                let remaining = deadline.saturating_duration_since(StdInstant::now());
                if !*fired {
                    if remaining.is_zero() {
                        break Err(SignalError::Timeout.into());
                    }
                    fired = cell
                        .cond
                        .wait_timeout(fired, remaining)
                        .map(|(guard, _)| guard)
                        .unwrap_or_else(|e| e.into_inner().0);
                }
            }
        }
        *fired = false;
    };

    release(signals);
    result
}

fn take_first<T: Copy>(signals: &[&CompletionSignal<T>]) -> Option<(usize, T)> {
    signals
        .iter()
        .enumerate()
        .find_map(|(i, signal)| signal.lock().value.take().map(|value| (i, value)))
}

fn release<T>(signals: &[&CompletionSignal<T>]) {
    for signal in signals {
        signal.lock().waiter = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::time::Millis;
    use std::thread;

    #[test]
    fn test_wait_returns_value_and_clears() {
        let signal = CompletionSignal::new();
        signal.raise(3u8);
        assert!(signal.is_set());
        assert_eq!(signal.wait(Timeout::NoWait).unwrap(), 3);
        assert!(!signal.is_set());
    }

    #[test]
    fn test_wait_times_out() {
        let signal: CompletionSignal<u8> = CompletionSignal::new();
        let started = StdInstant::now();
        assert_eq!(
            signal.wait(Timeout::After(Millis(30))),
            Err(Error::Signal(SignalError::Timeout))
        );
        assert!(started.elapsed() >= Duration::from_millis(30));
    }

    #[test]
    fn test_no_wait_on_unset() {
        let signal: CompletionSignal<u8> = CompletionSignal::new();
        assert_eq!(
            signal.wait(Timeout::NoWait),
            Err(Error::Signal(SignalError::Timeout))
        );
    }

    #[test]
    fn test_raise_from_other_thread_wakes_waiter() {
        let signal = CompletionSignal::new();
        let producer = signal.clone();
        let t = thread::spawn(move || {
            thread::sleep(Duration::from_millis(20));
            producer.raise(42u32);
        });
        assert_eq!(signal.wait(Timeout::After(Millis(2000))).unwrap(), 42);
        t.join().unwrap();
    }

    #[test]
    fn test_clear_discards_stale_raise() {
        let signal = CompletionSignal::new();
        signal.raise(1u8);
        signal.clear();
        assert!(signal.try_take().is_none());
    }

    #[test]
    fn test_wait_any_reports_index() {
        let a: CompletionSignal<u8> = CompletionSignal::new();
        let b = CompletionSignal::new();
        b.raise(9);
        assert_eq!(wait_any(&[&a, &b], Timeout::NoWait).unwrap(), (1, 9));
        assert!(!a.is_set() && !b.is_set());
    }

    #[test]
    fn test_second_waiter_is_busy() {
        let signal: CompletionSignal<u8> = CompletionSignal::new();
        let waiter = signal.clone();
        let t = thread::spawn(move || waiter.wait(Timeout::After(Millis(2000))));

        let mut busy = false;
        for _ in 0..200 {
            if signal.lock().waiter.is_some() {
                busy = signal.wait(Timeout::NoWait) == Err(Error::Signal(SignalError::Busy));
                break;
            }
            thread::sleep(Duration::from_millis(1));
        }
        signal.raise(5);
        assert!(busy);
        assert_eq!(t.join().unwrap().unwrap(), 5);
    }
}

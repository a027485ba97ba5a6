//! Monotonic time in milliseconds.
//!
//! The delayed task queue never reads a clock itself: callers pass `now`
//! explicitly, which lets the same queue run against a hardware timer, the
//! host's monotonic clock, or a virtual clock under test.

use core::ops::{Add, AddAssign};

use serde::Deserialize;

/// Point on the monotonic timeline, in milliseconds since an arbitrary origin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Instant(pub u64);

impl Instant {
    /// The origin.
    pub const ZERO: Self = Self(0);

    /// Create an instant `ms` milliseconds after the origin.
    #[inline]
    pub const fn from_millis(ms: u64) -> Self {
        Self(ms)
    }

    /// Milliseconds since the origin.
    #[inline]
    pub const fn as_millis(self) -> u64 {
        self.0
    }

    /// Time elapsed from `earlier` to `self`, zero if `earlier` is later.
    #[inline]
    pub fn saturating_duration_since(self, earlier: Instant) -> Millis {
        Millis(self.0.saturating_sub(earlier.0))
    }
}

/// Duration in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[serde(transparent)]
pub struct Millis(pub u64);

impl Millis {
    /// Create a new duration.
    #[inline]
    pub const fn new(ms: u64) -> Self {
        Self(ms)
    }

    /// Get the raw value.
    #[inline]
    pub const fn value(self) -> u64 {
        self.0
    }
}

impl Add<Millis> for Instant {
    type Output = Instant;

    fn add(self, rhs: Millis) -> Self::Output {
        Instant(self.0.saturating_add(rhs.0))
    }
}

impl AddAssign<Millis> for Instant {
    fn add_assign(&mut self, rhs: Millis) {
        *self = *self + rhs;
    }
}

#[cfg(feature = "std")]
impl From<Millis> for std::time::Duration {
    fn from(ms: Millis) -> Self {
        std::time::Duration::from_millis(ms.0)
    }
}

/// How long a blocking wait may last.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Timeout {
    /// Do not block at all.
    NoWait,
    /// Block for at most this long.
    After(Millis),
    /// Block until satisfied.
    Forever,
}

impl From<Option<Millis>> for Timeout {
    fn from(value: Option<Millis>) -> Self {
        match value {
            Some(ms) => Timeout::After(ms),
            None => Timeout::Forever,
        }
    }
}

/// Source of monotonic time.
pub trait Clock {
    /// Current instant.
    fn now(&self) -> Instant;
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now(&self) -> Instant {
        (**self).now()
    }
}

/// Clock that only moves when told to.
///
/// Cloning shares the underlying counter, so a test can hold one handle
/// while the code under test reads another.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    #[cfg(feature = "std")]
    now: std::sync::Arc<core::sync::atomic::AtomicU64>,
    #[cfg(not(feature = "std"))]
    now: core::cell::Cell<u64>,
}

impl ManualClock {
    /// Create a clock at the origin.
    pub fn new() -> Self {
        Self::default()
    }

    /// Jump to `instant`. Going backwards is ignored.
    pub fn set(&self, instant: Instant) {
        #[cfg(feature = "std")]
        self.now
            .fetch_max(instant.0, core::sync::atomic::Ordering::SeqCst);
        #[cfg(not(feature = "std"))]
        self.now.set(self.now.get().max(instant.0));
    }

    /// Advance by `delta`.
    pub fn advance(&self, delta: Millis) {
        let next = self.now() + delta;
        self.set(next);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        #[cfg(feature = "std")]
        let ms = self.now.load(core::sync::atomic::Ordering::SeqCst);
        #[cfg(not(feature = "std"))]
        let ms = self.now.get();
        Instant(ms)
    }
}

/// Host monotonic clock, origin at construction.
#[cfg(feature = "std")]
#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
    origin: std::time::Instant,
}

#[cfg(feature = "std")]
impl MonotonicClock {
    /// Start a clock at zero now.
    pub fn new() -> Self {
        Self {
            origin: std::time::Instant::now(),
        }
    }
}

#[cfg(feature = "std")]
impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(feature = "std")]
impl Clock for MonotonicClock {
    fn now(&self) -> Instant {
        let elapsed = self.origin.elapsed().as_millis();
        Instant(u64::try_from(elapsed).unwrap_or(u64::MAX))
    }
}

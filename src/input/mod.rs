//! Debounced input lines with LED feedback.
//!
//! Edge interrupts never touch line state. They hold an [`EdgeNotifier`]
//! and only re-arm a settle task on the delayed task queue; the
//! [`InputController`] running on the queue's worker re-samples the lines
//! once the window has passed, drives the LED and logs.
//!
//! ```text
//! edge IRQ ──notify──▶ queue: Settle(group) @ last edge + window
//!                                   │
//!                                   ▼
//!                       InputController::run
//!                  sample lines ─▶ flash LED ─▶ FlashOff @ +flash
//! ```

mod controller;
mod debounce;
mod flash;
#[cfg(feature = "std")]
mod interrupt;
mod line;

pub use controller::InputController;
pub use debounce::{DebounceCoordinator, EdgeNotifier};
pub use flash::FlashFeedback;
#[cfg(feature = "std")]
pub use interrupt::LineInterrupt;
pub use line::InputLine;

pub use crate::config::{ActiveLevel, DebounceMode};

/// Index of a line in its coordinator, in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LineId(pub(crate) usize);

impl LineId {
    /// Position in declaration order.
    #[inline]
    pub const fn index(self) -> usize {
        self.0
    }
}

/// Lines covered by one settle task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SettleGroup {
    /// Every line of the coordinator.
    All,
    /// A single line.
    Line(LineId),
}

/// Task keys the input side places on the delayed task queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum InputTask {
    /// Re-sample a group of lines after the debounce window.
    Settle(SettleGroup),
    /// Drive the LED inactive.
    FlashOff,
    /// Toggle the LED and re-arm.
    Heartbeat,
}

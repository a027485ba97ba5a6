//! # stepper-coord
//!
//! Event coordination for a small stepper controller: debounced inputs with
//! LED feedback, and asynchronous motion completion, on embedded-hal 1.0.
//!
//! ## Features
//!
//! - **Delayed task queue**: deadline-ordered, reschedule coalesces, FIFO ties
//! - **Debounce**: edge bursts collapse into one settle check after 30 ms
//! - **Flash feedback**: LED lit for 50 ms after the latest activation
//! - **Completion signals**: block on one or several signals with a timeout
//! - **Motion controller**: `Idle → Commanded → Settling → Idle`
//! - **Configuration-driven**: every timing and target in one TOML file
//! - **no_std compatible**: queue, debounce and configuration work without std
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use stepper_coord::prelude::*;
//!
//! let config = stepper_coord::load_config("coord.toml")?;
//!
//! // Inputs and LED run on the work queue thread.
//! let inputs: InputController<_, _, 4> =
//!     InputController::from_config(&config, [button_pin, endstop_pin], led_pin)?;
//! let button = inputs.notifier("button").unwrap();
//! let queue: WorkQueue<InputTask, _, 8> = WorkQueue::new(MonotonicClock::new());
//! let mut irq = LineInterrupt::new(button, queue.handle());
//! let _worker = queue.spawn("inputs", inputs)?;
//!
//! // From the GPIO edge callback:
//! irq.on_edge()?;
//!
//! // The main loop owns the motor.
//! let mut motion = MotionController::new(actuator);
//! motion.configure(&config.motor)?;
//! let fatal = ControlLoop::new(motion, &config.control).run();
//! ```
//!
//! ## Feature Flags
//!
//! - `std` (default): worker thread, completion signals, simulated actuator,
//!   TOML loading, `tracing` logs
//! - `defmt`: defmt logging and `defmt::Format` derives for embedded targets

#![cfg_attr(not(feature = "std"), no_std)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]
// Allow large error types - necessary for no_std with heapless strings
#![allow(clippy::result_large_err)]

#[macro_use]
mod fmt;

// Core modules
pub mod actuator;
pub mod config;
pub mod control;
pub mod error;
pub mod input;
pub mod motion;
pub mod queue;
pub mod signal;
pub mod time;

// Re-exports for ergonomic API
pub use config::{validate_config, SystemConfig};
pub use error::{Error, Result};

// Configuration loading (std only)
#[cfg(feature = "std")]
pub use config::{load_config, parse_config};

// Unit types
pub use config::units::{StepResolution, Steps, StepsPerSec};

/// Everything needed to wire a controller together.
pub mod prelude {
    pub use crate::actuator::{Actuator, MotionEvent, MotorState, StepDirActuator};
    pub use crate::config::{ActiveLevel, DebounceMode, StepResolution, Steps, StepsPerSec, SystemConfig};
    pub use crate::control::ControlLoop;
    pub use crate::error::{Error, Result};
    pub use crate::input::{EdgeNotifier, InputController, InputTask};
    pub use crate::motion::{MotionController, MotionReport, MotionState};
    pub use crate::queue::{DelayedTaskQueue, QueueContext, Scheduler, TaskHandler};
    pub use crate::signal::Waitable;
    pub use crate::time::{Clock, Instant, Millis, Timeout};

    #[cfg(feature = "std")]
    pub use crate::actuator::SimulatedActuator;
    #[cfg(feature = "std")]
    pub use crate::input::LineInterrupt;
    #[cfg(feature = "std")]
    pub use crate::queue::{WorkQueue, WorkQueueHandle};
    #[cfg(feature = "std")]
    pub use crate::signal::{wait_any, CompletionSignal};
    #[cfg(feature = "std")]
    pub use crate::time::MonotonicClock;
}

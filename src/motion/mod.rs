//! Motion command state machine.
//!
//! `Idle → Commanded → Settling → Idle`. Issuing is non-blocking; awaiting
//! blocks the calling context on the command's completion signal, never
//! polls the actuator.

mod controller;
mod state;

pub use controller::{MotionController, MotionReport};
pub use state::MotionState;

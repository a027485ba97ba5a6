//! Actuator collaborator.
//!
//! The motion controller talks to the motor only through [`Actuator`].
//! Commands return immediately; completion arrives later on the signal
//! passed with the target, carrying a [`MotionEvent`].

#[cfg(feature = "std")]
mod simulated;
mod step_dir;

#[cfg(feature = "std")]
pub use simulated::SimulatedActuator;
pub use step_dir::StepDirActuator;

use crate::config::{StepResolution, Steps, StepsPerSec};
use crate::error::Result;
use crate::signal::Waitable;

/// Driver-side state, authoritative for the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MotorState {
    /// Absolute position in steps.
    pub position: Steps,
    /// Whether the driver stage is energized.
    pub enabled: bool,
    /// Microstep divisor.
    pub resolution: StepResolution,
    /// Step rate limit.
    pub max_velocity: StepsPerSec,
    /// Whether a move is in progress.
    pub moving: bool,
}

/// How a command ended. Raised on the command's completion signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MotionEvent {
    /// Target position reached.
    Reached,
    /// Move stopped on request or because the driver was disabled.
    Stopped,
    /// Move halted by an end-stop.
    EndStop,
    /// Driver detected a stall.
    Stalled,
}

impl MotionEvent {
    /// Whether the move ended at its target.
    #[inline]
    pub fn is_reached(self) -> bool {
        self == MotionEvent::Reached
    }
}

impl core::fmt::Display for MotionEvent {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let name = match self {
            MotionEvent::Reached => "reached",
            MotionEvent::Stopped => "stopped",
            MotionEvent::EndStop => "end-stop",
            MotionEvent::Stalled => "stalled",
        };
        f.write_str(name)
    }
}

/// Stepper driver interface.
pub trait Actuator {
    /// Completion signal type raised by this driver.
    type Signal: Waitable<MotionEvent>;

    /// Whether the device is present and initialized.
    fn is_ready(&self) -> bool;

    /// Set the microstep divisor.
    fn set_step_resolution(&mut self, resolution: StepResolution) -> Result<()>;

    /// Set the step rate limit.
    fn set_max_velocity(&mut self, velocity: StepsPerSec) -> Result<()>;

    /// Declare the current position (calibration). Does not move.
    fn set_actual_position(&mut self, position: Steps) -> Result<()>;

    /// Energize or release the driver stage.
    fn enable(&mut self, enabled: bool) -> Result<()>;

    /// Start a move to `target`. Returns once the command is accepted;
    /// `signal` is raised when the move ends.
    fn set_target_position(&mut self, target: Steps, signal: &Self::Signal) -> Result<()>;

    /// Start a move of `delta` steps from the current position.
    fn move_by(&mut self, delta: Steps, signal: &Self::Signal) -> Result<()> {
        let from = self.actual_position()?;
        self.set_target_position(from + delta, signal)
    }

    /// Current absolute position.
    fn actual_position(&mut self) -> Result<Steps>;

    /// Halt any move in progress.
    fn stop(&mut self) -> Result<()>;
}

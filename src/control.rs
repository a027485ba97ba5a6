//! Main control loop.
//!
//! Alternates between two targets forever, awaiting each move before the
//! next. Any error ends the loop; the task queue and interrupt paths are
//! independent and keep running.

use crate::actuator::Actuator;
use crate::config::{ControlConfig, Steps};
use crate::error::{Error, Result};
use crate::motion::{MotionController, MotionReport};
use crate::time::Timeout;

/// The liveness driver of the system.
pub struct ControlLoop<A: Actuator> {
    motion: MotionController<A>,
    targets: [Steps; 2],
    timeout: Timeout,
    next: usize,
    legs: u64,
}

impl<A: Actuator> ControlLoop<A> {
    /// Drive `motion` with the targets and timeout from `config`.
    pub fn new(motion: MotionController<A>, config: &ControlConfig) -> Self {
        Self {
            motion,
            targets: config.targets,
            timeout: config.timeout(),
            next: 0,
            legs: 0,
        }
    }

    /// Run one leg: issue the next target, await it, report the position.
    ///
    /// # Errors
    ///
    /// Any issue or await failure, logged before it is returned.
    pub fn step(&mut self) -> Result<MotionReport> {
        let target = self.targets[self.next];
        let report = self
            .motion
            .move_to(target, self.timeout)
            .map_err(|e| {
                error!("move to {} failed: {}", target.value(), e);
                e
            })?;

        debug!("actual position: {}", report.position.value());
        self.next = (self.next + 1) % self.targets.len();
        self.legs += 1;
        Ok(report)
    }

    /// Run `cycles` full back-and-forth cycles.
    ///
    /// # Errors
    ///
    /// Stops at the first failed leg.
    pub fn run_cycles(&mut self, cycles: usize) -> Result<()> {
        for _ in 0..cycles * self.targets.len() {
            self.step()?;
        }
        Ok(())
    }

    /// Run until a leg fails and return that failure.
    pub fn run(&mut self) -> Error {
        info!(
            "main loop: {} <-> {}",
            self.targets[0].value(),
            self.targets[1].value()
        );
        loop {
            if let Err(e) = self.step() {
                error!("main loop halted after {} legs", self.legs);
                return e;
            }
        }
    }

    /// Completed legs.
    pub fn legs(&self) -> u64 {
        self.legs
    }

    /// The motion controller.
    pub fn controller(&self) -> &MotionController<A> {
        &self.motion
    }

    /// The motion controller, mutably.
    pub fn controller_mut(&mut self) -> &mut MotionController<A> {
        &mut self.motion
    }

    /// Tear the loop down, keeping the controller.
    pub fn into_inner(self) -> MotionController<A> {
        self.motion
    }
}

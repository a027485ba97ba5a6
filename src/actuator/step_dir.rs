//! STEP/DIR pin driver.
//!
//! Generic over embedded-hal 1.0 pin and delay types. Moves run to
//! completion inside `set_target_position`, pulsing STEP at the configured
//! rate, so the signal is already raised when the call returns.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;

use crate::config::{SoftLimits, StepResolution, Steps, StepsPerSec};
use crate::error::{CommandError, Result};
use crate::signal::Waitable;

use super::{Actuator, MotionEvent, MotorState};

/// STEP pulse high time in nanoseconds.
const PULSE_NS: u32 = 2_000;

/// Blocking stepper driver on two GPIO lines.
///
/// Generic over:
/// - `STEP`: STEP pin type (must implement `OutputPin`)
/// - `DIR`: DIR pin type (must implement `OutputPin`)
/// - `DELAY`: Delay provider (must implement `DelayNs`)
/// - `S`: Completion signal type
pub struct StepDirActuator<STEP, DIR, DELAY, S> {
    step_pin: STEP,
    dir_pin: DIR,
    delay: DELAY,
    position: Steps,
    /// Cached DIR level to skip redundant writes.
    forward: Option<bool>,
    invert_direction: bool,
    enabled: bool,
    resolution: StepResolution,
    /// Resolution fixed by the MS pins on the driver board, if known.
    strapped: Option<StepResolution>,
    max_velocity: StepsPerSec,
    limits: Option<SoftLimits>,
    _signal: core::marker::PhantomData<fn(&S)>,
}

impl<STEP, DIR, DELAY, S> StepDirActuator<STEP, DIR, DELAY, S>
where
    STEP: OutputPin,
    DIR: OutputPin,
    DELAY: DelayNs,
    S: Waitable<MotionEvent>,
{
    /// Create a disabled driver at position zero.
    pub fn new(step_pin: STEP, dir_pin: DIR, delay: DELAY) -> Self {
        Self {
            step_pin,
            dir_pin,
            delay,
            position: Steps(0),
            forward: None,
            invert_direction: false,
            enabled: false,
            resolution: StepResolution::default(),
            strapped: None,
            max_velocity: StepsPerSec(500),
            limits: None,
            _signal: core::marker::PhantomData,
        }
    }

    /// Drive DIR low for positive moves instead of high.
    pub fn invert_direction(mut self, invert: bool) -> Self {
        self.invert_direction = invert;
        self
    }

    /// Declare the microstep mode strapped on the driver board. Any other
    /// resolution is then rejected by `set_step_resolution`.
    pub fn strapped(mut self, resolution: StepResolution) -> Self {
        self.strapped = Some(resolution);
        self.resolution = resolution;
        self
    }

    /// Apply soft limits to every target.
    pub fn with_limits(mut self, limits: SoftLimits) -> Self {
        self.limits = Some(limits);
        self
    }

    /// Snapshot of the driver state.
    pub fn state(&self) -> MotorState {
        MotorState {
            position: self.position,
            enabled: self.enabled,
            resolution: self.resolution,
            max_velocity: self.max_velocity,
            moving: false,
        }
    }

    /// Give the pins and delay back.
    pub fn release(self) -> (STEP, DIR, DELAY) {
        (self.step_pin, self.dir_pin, self.delay)
    }

    fn set_direction(&mut self, forward: bool) -> Result<()> {
        if self.forward == Some(forward) {
            return Ok(());
        }
        let pin_high = forward != self.invert_direction;
        let written = if pin_high {
            self.dir_pin.set_high()
        } else {
            self.dir_pin.set_low()
        };
        written.map_err(|_| CommandError::Driver(crate::error::bounded("DIR write failed")))?;
        self.forward = Some(forward);
        Ok(())
    }

    fn pulse(&mut self, interval_ns: u64) -> Result<()> {
        self.step_pin
            .set_high()
            .map_err(|_| CommandError::Driver(crate::error::bounded("STEP write failed")))?;
        self.delay.delay_ns(PULSE_NS);
        self.step_pin
            .set_low()
            .map_err(|_| CommandError::Driver(crate::error::bounded("STEP write failed")))?;

        let rest = interval_ns.saturating_sub(u64::from(PULSE_NS));
        let rest = u32::try_from(rest).unwrap_or(u32::MAX);
        if rest > 0 {
            self.delay.delay_ns(rest);
        }
        Ok(())
    }

    fn resolve_target(&self, target: Steps) -> Result<Steps> {
        match self.limits {
            Some(limits) => limits.apply(target).ok_or_else(|| {
                CommandError::LimitExceeded {
                    position: target.value(),
                    limit: limits.violated_limit(target).value(),
                }
                .into()
            }),
            None => Ok(target),
        }
    }
}

impl<STEP, DIR, DELAY, S> Actuator for StepDirActuator<STEP, DIR, DELAY, S>
where
    STEP: OutputPin,
    DIR: OutputPin,
    DELAY: DelayNs,
    S: Waitable<MotionEvent>,
{
    type Signal = S;

    fn is_ready(&self) -> bool {
        true
    }

    fn set_step_resolution(&mut self, resolution: StepResolution) -> Result<()> {
        // No MS pins under our control: the board strap is the only mode.
        if let Some(strapped) = self.strapped {
            if strapped != resolution {
                return Err(CommandError::UnsupportedResolution(resolution.value()).into());
            }
        }
        self.resolution = resolution;
        Ok(())
    }

    fn set_max_velocity(&mut self, velocity: StepsPerSec) -> Result<()> {
        if velocity.value() == 0 {
            return Err(CommandError::InvalidVelocity(0).into());
        }
        self.max_velocity = velocity;
        Ok(())
    }

    fn set_actual_position(&mut self, position: Steps) -> Result<()> {
        self.position = position;
        Ok(())
    }

    fn enable(&mut self, enabled: bool) -> Result<()> {
        self.enabled = enabled;
        Ok(())
    }

    fn set_target_position(&mut self, target: Steps, signal: &S) -> Result<()> {
        if !self.enabled {
            return Err(CommandError::Disabled.into());
        }
        let target = self.resolve_target(target)?;
        let interval_ns = self
            .max_velocity
            .step_interval_ns()
            .ok_or(CommandError::InvalidVelocity(0))?;

        let delta = target - self.position;
        if delta.value() != 0 {
            self.set_direction(delta.value() > 0)?;
            let step = Steps(delta.signum());
            for _ in 0..delta.abs() {
                self.pulse(interval_ns)?;
                self.position = self.position + step;
            }
        }

        signal.raise(MotionEvent::Reached);
        Ok(())
    }

    fn actual_position(&mut self) -> Result<Steps> {
        Ok(self.position)
    }

    fn stop(&mut self) -> Result<()> {
        Ok(())
    }
}

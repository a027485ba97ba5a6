//! Motion controller over an [`Actuator`].

use crate::actuator::{Actuator, MotionEvent};
use crate::config::{MotorConfig, Steps};
use crate::error::{bounded, CommandError, ConfigError, Result};
use crate::signal::Waitable;
use crate::time::Timeout;

use super::MotionState;

/// Outcome of one command cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MotionReport {
    /// Commanded target.
    pub target: Steps,
    /// How the move ended.
    pub event: MotionEvent,
    /// Position read back after completion.
    pub position: Steps,
}

/// Issues commands to an actuator and awaits their completion.
///
/// One completion signal is created with the controller and reused for
/// every command; it is cleared before each issue so a stale raise can
/// never satisfy the next wait.
pub struct MotionController<A: Actuator> {
    actuator: A,
    signal: A::Signal,
    state: MotionState,
}

impl<A> MotionController<A>
where
    A: Actuator,
    A::Signal: Default,
{
    /// Wrap `actuator` with a fresh signal.
    pub fn new(actuator: A) -> Self {
        Self::with_signal(actuator, A::Signal::default())
    }
}

impl<A: Actuator> MotionController<A> {
    /// Wrap `actuator`, completing commands on `signal`.
    pub fn with_signal(actuator: A, signal: A::Signal) -> Self {
        Self {
            actuator,
            signal,
            state: MotionState::Idle,
        }
    }

    /// Bring the actuator up: readiness check, resolution, velocity,
    /// calibration, enable.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::DeviceNotReady` if the actuator is absent, or the
    /// first rejected setting.
    pub fn configure(&mut self, config: &MotorConfig) -> Result<()> {
        if !self.actuator.is_ready() {
            error!("motor '{}' not ready", config.name.as_str());
            return Err(ConfigError::DeviceNotReady(bounded(config.name.as_str())).into());
        }

        self.actuator.set_step_resolution(config.step_resolution)?;
        self.actuator.set_max_velocity(config.max_velocity)?;
        self.actuator.set_actual_position(config.initial_position)?;
        self.actuator.enable(true)?;
        info!(
            "motor '{}' enabled: 1/{} step at {} steps/s",
            config.name.as_str(),
            config.step_resolution.value(),
            config.max_velocity.value()
        );

        let position = self.actuator.actual_position()?;
        debug!("actual position: {}", position.value());
        Ok(())
    }

    /// Send `target` to the actuator without waiting.
    ///
    /// # Errors
    ///
    /// - `CommandError::InvalidState` if a command is already in flight
    /// - the actuator's rejection; the controller stays `Idle`
    pub fn issue(&mut self, target: Steps) -> Result<()> {
        if !self.state.is_idle() {
            return Err(CommandError::InvalidState(self.state.name()).into());
        }

        self.signal.clear();
        if let Err(e) = self.actuator.set_target_position(target, &self.signal) {
            error!("target {} rejected: {}", target.value(), e);
            return Err(e);
        }
        self.state = MotionState::Commanded { target };
        trace!("commanded {}", target.value());
        Ok(())
    }

    /// Send a move relative to the current position.
    ///
    /// # Errors
    ///
    /// As [`issue`](Self::issue), plus position read failures.
    pub fn issue_relative(&mut self, delta: Steps) -> Result<()> {
        if !self.state.is_idle() {
            return Err(CommandError::InvalidState(self.state.name()).into());
        }
        let from = self.actuator.actual_position()?;
        self.issue(from + delta)
    }

    /// Block until the command in flight completes, then read back the
    /// position.
    ///
    /// # Errors
    ///
    /// - `CommandError::InvalidState` if nothing was issued
    /// - `SignalError::Timeout` if `timeout` elapses; the command stays in
    ///   flight and may be awaited again
    pub fn await_completion(&mut self, timeout: Timeout) -> Result<MotionReport> {
        let target = match self.state {
            MotionState::Commanded { target } => target,
            other => return Err(CommandError::InvalidState(other.name()).into()),
        };

        self.state = MotionState::Settling { target };
        let event = match self.signal.wait(timeout) {
            Ok(event) => event,
            Err(e) => {
                self.state = MotionState::Commanded { target };
                return Err(e);
            }
        };
        self.state = MotionState::Idle;

        let position = self.actuator.actual_position()?;
        if !event.is_reached() {
            warn!("move to {} ended early at {}: {}", target.value(), position.value(), event);
        }
        Ok(MotionReport {
            target,
            event,
            position,
        })
    }

    /// Issue `target` and await it.
    ///
    /// # Errors
    ///
    /// As [`issue`](Self::issue) and [`await_completion`](Self::await_completion).
    pub fn move_to(&mut self, target: Steps, timeout: Timeout) -> Result<MotionReport> {
        self.issue(target)?;
        self.await_completion(timeout)
    }

    /// Current actuator position.
    ///
    /// # Errors
    ///
    /// Propagates the actuator's error.
    pub fn position(&mut self) -> Result<Steps> {
        self.actuator.actual_position()
    }

    /// Current state.
    #[inline]
    pub fn state(&self) -> MotionState {
        self.state
    }

    /// The reused completion signal.
    #[inline]
    pub fn signal(&self) -> &A::Signal {
        &self.signal
    }

    /// The actuator.
    #[inline]
    pub fn actuator(&self) -> &A {
        &self.actuator
    }

    /// The actuator, mutably.
    #[inline]
    pub fn actuator_mut(&mut self) -> &mut A {
        &mut self.actuator
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actuator::SimulatedActuator;
    use crate::config::{LimitPolicy, SoftLimits, StepsPerSec};
    use crate::error::{Error, SignalError};
    use crate::time::Millis;

    fn fast_config() -> MotorConfig {
        MotorConfig {
            max_velocity: StepsPerSec(20_000),
            ..MotorConfig::default()
        }
    }

    fn controller() -> MotionController<SimulatedActuator> {
        let mut c = MotionController::new(SimulatedActuator::new().unwrap());
        c.configure(&fast_config()).unwrap();
        c
    }

    #[test]
    fn test_configure_not_ready() {
        let actuator = SimulatedActuator::new().unwrap();
        actuator.set_ready(false);
        let mut c = MotionController::new(actuator);
        assert!(matches!(
            c.configure(&MotorConfig::default()),
            Err(Error::Config(ConfigError::DeviceNotReady(_)))
        ));
    }

    #[test]
    fn test_configure_applies_settings() {
        let c = controller();
        let state = c.actuator().state();
        assert!(state.enabled);
        assert_eq!(state.max_velocity, StepsPerSec(20_000));
        assert_eq!(state.position, Steps(0));
    }

    #[test]
    fn test_state_transitions() {
        let mut c = controller();
        assert_eq!(c.state(), MotionState::Idle);

        c.issue(Steps(200)).unwrap();
        assert_eq!(c.state(), MotionState::Commanded { target: Steps(200) });
        assert_eq!(
            c.issue(Steps(0)),
            Err(Error::Command(CommandError::InvalidState("Commanded")))
        );

        let report = c.await_completion(Timeout::After(Millis(2000))).unwrap();
        assert_eq!(report.event, MotionEvent::Reached);
        assert_eq!(report.position, Steps(200));
        assert_eq!(c.state(), MotionState::Idle);
    }

    #[test]
    fn test_await_without_issue() {
        let mut c = controller();
        assert_eq!(
            c.await_completion(Timeout::NoWait),
            Err(Error::Command(CommandError::InvalidState("Idle")))
        );
    }

    #[test]
    fn test_rejected_issue_stays_idle() {
        let mut c = MotionController::new(
            SimulatedActuator::new()
                .unwrap()
                .with_limits(SoftLimits::new(Steps(-100), Steps(100), LimitPolicy::Reject)),
        );
        c.configure(&fast_config()).unwrap();
        assert!(c.issue(Steps(1000)).is_err());
        assert_eq!(c.state(), MotionState::Idle);
    }

    #[test]
    fn test_timeout_keeps_command_in_flight() {
        let mut c = MotionController::new(SimulatedActuator::new().unwrap());
        c.configure(&MotorConfig {
            max_velocity: StepsPerSec(100),
            ..MotorConfig::default()
        })
        .unwrap();

        c.issue(Steps(1000)).unwrap();
        assert_eq!(
            c.await_completion(Timeout::After(Millis(10))),
            Err(Error::Signal(SignalError::Timeout))
        );
        assert_eq!(c.state(), MotionState::Commanded { target: Steps(1000) });

        c.actuator_mut().stop().unwrap();
        let report = c.await_completion(Timeout::NoWait).unwrap();
        assert_eq!(report.event, MotionEvent::Stopped);
        assert!(report.position < Steps(1000));
    }

    #[test]
    fn test_relative_round_trip() {
        let mut c = controller();
        c.issue_relative(Steps(150)).unwrap();
        c.await_completion(Timeout::Forever).unwrap();
        c.issue_relative(Steps(-150)).unwrap();
        let report = c.await_completion(Timeout::Forever).unwrap();
        assert_eq!(report.position, Steps(0));
    }
}

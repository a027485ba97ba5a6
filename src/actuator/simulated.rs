//! Software actuator with a background stepping thread (std only).
//!
//! Position advances at `max_velocity` whole steps per second from the
//! moment a target is accepted. A helper thread sleeps until the computed
//! arrival and raises `Reached`; reads in between interpolate.

use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant as StdInstant};

use crate::config::{SoftLimits, StepResolution, Steps, StepsPerSec};
use crate::error::{bounded, CommandError, Result};
use crate::signal::{CompletionSignal, Waitable};

use super::{Actuator, MotionEvent, MotorState};

struct Move {
    from: Steps,
    to: Steps,
    velocity: u32,
    started: StdInstant,
    signal: CompletionSignal<MotionEvent>,
}

impl Move {
    fn position_at(&self, now: StdInstant) -> Steps {
        let elapsed_us = now.saturating_duration_since(self.started).as_micros();
        let travelled = elapsed_us.saturating_mul(u128::from(self.velocity)) / 1_000_000;
        let distance = u128::from((self.to - self.from).abs());
        let travelled = i64::try_from(travelled.min(distance)).unwrap_or(i64::MAX);
        self.from + Steps((self.to - self.from).signum() * travelled)
    }

    fn arrival(&self) -> StdInstant {
        let distance = u128::from((self.to - self.from).abs());
        let velocity = u128::from(self.velocity.max(1));
        let us = (distance * 1_000_000 + velocity - 1) / velocity;
        self.started + Duration::from_micros(u64::try_from(us).unwrap_or(u64::MAX))
    }
}

struct Sim {
    ready: bool,
    enabled: bool,
    position: Steps,
    resolution: StepResolution,
    max_velocity: StepsPerSec,
    limits: Option<SoftLimits>,
    current: Option<Move>,
    shutdown: bool,
}

impl Sim {
    /// Freeze the current move where it is and hand back its signal.
    fn halt(&mut self) -> Option<CompletionSignal<MotionEvent>> {
        let current = self.current.take()?;
        self.position = current.position_at(StdInstant::now());
        Some(current.signal)
    }

    fn position(&self) -> Steps {
        match &self.current {
            Some(current) => current.position_at(StdInstant::now()),
            None => self.position,
        }
    }

    fn check_idle(&self) -> Result<()> {
        if self.current.is_some() {
            return Err(CommandError::InvalidState("moving").into());
        }
        Ok(())
    }
}

struct Shared {
    sim: Mutex<Sim>,
    wake: Condvar,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, Sim> {
        self.sim.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Host-side stand-in for a stepper driver.
///
/// Counts steps exactly, enforces soft limits and rejects commands while
/// disabled or not ready. Superseding a move retargets it without raising
/// the old signal.
pub struct SimulatedActuator {
    shared: Arc<Shared>,
    thread: Option<JoinHandle<()>>,
}

impl SimulatedActuator {
    /// Create a ready, disabled actuator at position zero.
    ///
    /// # Errors
    ///
    /// Returns `CommandError::Driver` if the stepping thread cannot start.
    pub fn new() -> Result<Self> {
        let shared = Arc::new(Shared {
            sim: Mutex::new(Sim {
                ready: true,
                enabled: false,
                position: Steps(0),
                resolution: StepResolution::default(),
                max_velocity: StepsPerSec(500),
                limits: None,
                current: None,
                shutdown: false,
            }),
            wake: Condvar::new(),
        });

        let stepper = Arc::clone(&shared);
        let thread = thread::Builder::new()
            .name("sim-actuator".into())
            .spawn(move || run_stepper(&stepper))
            .map_err(|_| CommandError::Driver(bounded("stepping thread failed to start")))?;

        Ok(Self {
            shared,
            thread: Some(thread),
        })
    }

    /// Apply soft limits to every target.
    pub fn with_limits(self, limits: SoftLimits) -> Self {
        self.shared.lock().limits = Some(limits);
        self
    }

    /// Mark the device present or absent.
    pub fn set_ready(&self, ready: bool) {
        self.shared.lock().ready = ready;
    }

    /// Snapshot of the driver state.
    pub fn state(&self) -> MotorState {
        let sim = self.shared.lock();
        MotorState {
            position: sim.position(),
            enabled: sim.enabled,
            resolution: sim.resolution,
            max_velocity: sim.max_velocity,
            moving: sim.current.is_some(),
        }
    }

    /// Halt the current move as an end-stop would.
    pub fn trigger_endstop(&self) {
        self.fault(MotionEvent::EndStop);
    }

    /// Halt the current move as if the motor had lost steps.
    pub fn trigger_stall(&self) {
        self.fault(MotionEvent::Stalled);
    }

    fn fault(&self, event: MotionEvent) {
        let halted = self.shared.lock().halt();
        if let Some(signal) = halted {
            warn!("simulated move halted: {}", event);
            signal.raise(event);
        }
        self.shared.wake.notify_one();
    }

    fn lock_ready(&self) -> Result<MutexGuard<'_, Sim>> {
        let sim = self.shared.lock();
        if !sim.ready {
            return Err(CommandError::NotReady.into());
        }
        Ok(sim)
    }
}

impl Actuator for SimulatedActuator {
    type Signal = CompletionSignal<MotionEvent>;

    fn is_ready(&self) -> bool {
        self.shared.lock().ready
    }

    fn set_step_resolution(&mut self, resolution: StepResolution) -> Result<()> {
        let mut sim = self.lock_ready()?;
        sim.check_idle()?;
        sim.resolution = resolution;
        Ok(())
    }

    fn set_max_velocity(&mut self, velocity: StepsPerSec) -> Result<()> {
        let mut sim = self.lock_ready()?;
        if velocity.value() == 0 {
            return Err(CommandError::InvalidVelocity(0).into());
        }
        sim.check_idle()?;
        sim.max_velocity = velocity;
        Ok(())
    }

    fn set_actual_position(&mut self, position: Steps) -> Result<()> {
        let mut sim = self.lock_ready()?;
        sim.check_idle()?;
        sim.position = position;
        Ok(())
    }

    fn enable(&mut self, enabled: bool) -> Result<()> {
        let halted = {
            let mut sim = self.lock_ready()?;
            sim.enabled = enabled;
            if enabled {
                None
            } else {
                sim.halt()
            }
        };
        if let Some(signal) = halted {
            signal.raise(MotionEvent::Stopped);
            self.shared.wake.notify_one();
        }
        Ok(())
    }

    fn set_target_position(&mut self, target: Steps, signal: &Self::Signal) -> Result<()> {
        let mut sim = self.lock_ready()?;
        if !sim.enabled {
            return Err(CommandError::Disabled.into());
        }
        let target = match sim.limits {
            Some(limits) => limits.apply(target).ok_or(CommandError::LimitExceeded {
                position: target.value(),
                limit: limits.violated_limit(target).value(),
            })?,
            None => target,
        };

        let _superseded = sim.halt();
        if target == sim.position {
            drop(sim);
            signal.raise(MotionEvent::Reached);
            return Ok(());
        }

        sim.current = Some(Move {
            from: sim.position,
            to: target,
            velocity: sim.max_velocity.value(),
            started: StdInstant::now(),
            signal: signal.clone(),
        });
        drop(sim);
        self.shared.wake.notify_one();
        Ok(())
    }

    fn actual_position(&mut self) -> Result<Steps> {
        Ok(self.lock_ready()?.position())
    }

    fn stop(&mut self) -> Result<()> {
        let halted = self.lock_ready()?.halt();
        if let Some(signal) = halted {
            signal.raise(MotionEvent::Stopped);
            self.shared.wake.notify_one();
        }
        Ok(())
    }
}

impl Drop for SimulatedActuator {
    fn drop(&mut self) {
        self.shared.lock().shutdown = true;
        self.shared.wake.notify_all();
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}

fn run_stepper(shared: &Shared) {
    let mut sim = shared.lock();
    loop {
        if sim.shutdown {
            return;
        }
        let arrival = sim.current.as_ref().map(Move::arrival);
        sim = match arrival {
            None => shared.wake.wait(sim).unwrap_or_else(PoisonError::into_inner),
            Some(arrival) => {
                let now = StdInstant::now();
                if now >= arrival {
                    if let Some(done) = sim.current.take() {
                        sim.position = done.to;
                        drop(sim);
                        done.signal.raise(MotionEvent::Reached);
                        shared.lock()
                    } else {
                        sim
                    }
                } else {
                    shared
                        .wake
                        .wait_timeout(sim, arrival - now)
                        .map(|(guard, _)| guard)
                        .unwrap_or_else(|e| e.into_inner().0)
                }
            }
        };
    }
}

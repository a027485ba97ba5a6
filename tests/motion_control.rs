//! Completion signals, the motion controller and the main loop against the
//! simulated actuator.

use std::thread;
use std::time::Duration;

use stepper_coord::actuator::{Actuator, MotionEvent, SimulatedActuator};
use stepper_coord::config::{ControlConfig, LimitPolicy, MotorConfig, SoftLimits, Steps, StepsPerSec};
use stepper_coord::control::ControlLoop;
use stepper_coord::error::{CommandError, Error, SignalError};
use stepper_coord::motion::{MotionController, MotionState};
use stepper_coord::signal::{wait_any, CompletionSignal, Waitable};
use stepper_coord::time::{Millis, Timeout};

fn motor(velocity: u32) -> MotorConfig {
    MotorConfig {
        max_velocity: StepsPerSec(velocity),
        ..MotorConfig::default()
    }
}

fn controller(velocity: u32) -> MotionController<SimulatedActuator> {
    let mut c = MotionController::new(SimulatedActuator::new().unwrap());
    c.configure(&motor(velocity)).unwrap();
    c
}

#[test]
fn await_never_returns_before_raise() {
    let signal: CompletionSignal<MotionEvent> = CompletionSignal::new();
    let producer = signal.clone();

    let raiser = thread::spawn(move || {
        thread::sleep(Duration::from_millis(40));
        producer.raise(MotionEvent::Reached);
    });
    let started = std::time::Instant::now();
    assert_eq!(signal.wait(Timeout::Forever), Ok(MotionEvent::Reached));
    assert!(started.elapsed() >= Duration::from_millis(40));
    raiser.join().unwrap();

    assert_eq!(
        signal.wait(Timeout::After(Millis(20))),
        Err(Error::Signal(SignalError::Timeout))
    );
}

#[test]
fn wait_any_sees_motion_or_abort() {
    let mut c = controller(100);
    let abort: CompletionSignal<MotionEvent> = CompletionSignal::new();
    c.issue(Steps(5000)).unwrap();

    let trigger = abort.clone();
    thread::spawn(move || {
        thread::sleep(Duration::from_millis(20));
        trigger.raise(MotionEvent::EndStop);
    });

    let (index, event) = wait_any(&[c.signal(), &abort], Timeout::After(Millis(2000))).unwrap();
    assert_eq!((index, event), (1, MotionEvent::EndStop));
    assert!(!c.signal().is_set());
}

#[test]
fn round_trip_returns_to_start() {
    let mut c = controller(50_000);
    let before = c.position().unwrap();

    let there = c.move_to(Steps(1000), Timeout::Forever).unwrap();
    assert_eq!(there.position, Steps(1000));
    c.issue_relative(Steps(-1000)).unwrap();
    let back = c.await_completion(Timeout::Forever).unwrap();

    assert_eq!(back.event, MotionEvent::Reached);
    assert_eq!(back.position, before);
}

#[test]
fn control_loop_cycles_between_targets() {
    let mut ctl = ControlLoop::new(controller(50_000), &ControlConfig::default());
    ctl.run_cycles(1).unwrap();
    let after_one = ctl.controller_mut().position().unwrap();
    ctl.run_cycles(2).unwrap();

    assert_eq!(after_one, Steps(-1000));
    assert_eq!(ctl.controller_mut().position().unwrap(), after_one);
    assert_eq!(ctl.legs(), 6);
    assert_eq!(ctl.controller().state(), MotionState::Idle);
}

#[test]
fn control_loop_aborts_on_rejected_command() {
    let actuator = SimulatedActuator::new()
        .unwrap()
        .with_limits(SoftLimits::new(Steps(-500), Steps(1500), LimitPolicy::Reject));
    let mut motion = MotionController::new(actuator);
    motion.configure(&motor(50_000)).unwrap();
    let mut ctl = ControlLoop::new(motion, &ControlConfig::default());

    let fatal = ctl.run();
    assert_eq!(
        fatal,
        Error::Command(CommandError::LimitExceeded { position: -1000, limit: -500 })
    );
    assert_eq!(ctl.legs(), 1);
    assert_eq!(ctl.controller().state(), MotionState::Idle);
}

#[test]
fn control_loop_aborts_when_driver_disabled() {
    let mut motion = controller(50_000);
    motion.actuator_mut().enable(false).unwrap();
    let mut ctl = ControlLoop::new(motion, &ControlConfig::default());

    assert_eq!(ctl.run(), Error::Command(CommandError::Disabled));
    assert_eq!(ctl.legs(), 0);
}

#[test]
fn endstop_ends_move_early() {
    let mut c = controller(100);
    c.issue(Steps(10_000)).unwrap();
    thread::sleep(Duration::from_millis(20));
    c.actuator().trigger_endstop();

    let report = c.await_completion(Timeout::After(Millis(2000))).unwrap();
    assert_eq!(report.event, MotionEvent::EndStop);
    assert!(report.position < Steps(10_000));
}

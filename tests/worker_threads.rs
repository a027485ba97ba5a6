//! Debounce and flash on a real worker thread with interrupt-style edges.

mod common;

use std::thread;
use std::time::{Duration, Instant as StdInstant};

use common::{Led, Level};
use stepper_coord::config::SystemConfig;
use stepper_coord::error::{Error, QueueError};
use stepper_coord::input::{InputController, InputTask, LineInterrupt};
use stepper_coord::queue::WorkQueue;
use stepper_coord::time::MonotonicClock;

fn wait_for(mut condition: impl FnMut() -> bool) -> Option<StdInstant> {
    let deadline = StdInstant::now() + Duration::from_secs(2);
    while StdInstant::now() < deadline {
        if condition() {
            return Some(StdInstant::now());
        }
        thread::sleep(Duration::from_millis(1));
    }
    None
}

#[test]
fn edges_from_another_thread_flash_once() {
    let config = SystemConfig::default();
    let button = Level::default();
    let led = Led::default();
    let inputs: InputController<Level, Led, 4> =
        InputController::from_config(&config, [button.clone(), Level::default()], led.clone()).unwrap();
    let notifier = inputs.notifier("button").unwrap();

    let queue: WorkQueue<InputTask, MonotonicClock, 8> = WorkQueue::new(MonotonicClock::new());
    let mut irq = LineInterrupt::new(notifier, queue.handle());
    let worker = queue.spawn("inputs", inputs).unwrap();

    button.set(true);
    let isr = thread::spawn(move || {
        for _ in 0..5 {
            irq.on_edge().unwrap();
            thread::sleep(Duration::from_millis(2));
        }
        let last_edge = StdInstant::now();
        assert!(irq.is_settling());
        last_edge
    });
    let last_edge = isr.join().unwrap();

    let lit_at = wait_for(|| led.is_lit()).expect("LED never lit");
    assert!(lit_at.duration_since(last_edge) >= Duration::from_millis(25));

    let off_at = wait_for(|| !led.is_lit()).expect("LED never cleared");
    assert!(off_at.duration_since(lit_at) >= Duration::from_millis(45));
    assert_eq!(led.writes(), 2);

    worker.shutdown();
}

#[test]
fn bounce_on_worker_thread_is_ignored() {
    let config = SystemConfig::default();
    let button = Level::default();
    let led = Led::default();
    let inputs: InputController<Level, Led, 4> =
        InputController::from_config(&config, [button.clone(), Level::default()], led.clone()).unwrap();
    let notifier = inputs.notifier("button").unwrap();

    let queue: WorkQueue<InputTask, MonotonicClock, 8> = WorkQueue::new(MonotonicClock::new());
    let handle = queue.handle();
    let mut irq = LineInterrupt::new(notifier, queue.handle());
    let worker = queue.spawn("inputs", inputs).unwrap();

    button.set(true);
    irq.on_edge().unwrap();
    button.set(false);

    assert!(wait_for(|| handle.pending_count() == 0).is_some());
    assert_eq!(led.writes(), 0);
    worker.shutdown();
}

#[test]
fn edges_after_shutdown_are_refused() {
    let config = SystemConfig::default();
    let inputs: InputController<Level, Led, 4> =
        InputController::from_config(&config, [Level::default(), Level::default()], Led::default()).unwrap();
    let notifier = inputs.notifier("endstop").unwrap();

    let queue: WorkQueue<InputTask, MonotonicClock, 8> = WorkQueue::new(MonotonicClock::new());
    let mut irq = LineInterrupt::new(notifier, queue.handle());
    queue.spawn("inputs", inputs).unwrap().shutdown();

    assert_eq!(irq.on_edge(), Err(Error::Queue(QueueError::Shutdown)));
}

//! Full system on the host: input worker thread, simulated ISR, simulated
//! stepper and the main control loop.
//!
//! Run with `cargo run --example motion_loop [config.toml]`.

use std::convert::Infallible;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use embedded_hal::digital::{ErrorType, InputPin, OutputPin, StatefulOutputPin};
use stepper_coord::prelude::*;
use tracing_subscriber::EnvFilter;

#[derive(Clone, Default)]
struct SimPin(Arc<AtomicBool>);

impl ErrorType for SimPin {
    type Error = Infallible;
}

impl InputPin for SimPin {
    fn is_high(&mut self) -> core::result::Result<bool, Infallible> {
        Ok(self.0.load(Ordering::SeqCst))
    }

    fn is_low(&mut self) -> core::result::Result<bool, Infallible> {
        Ok(!self.0.load(Ordering::SeqCst))
    }
}

impl OutputPin for SimPin {
    fn set_low(&mut self) -> core::result::Result<(), Infallible> {
        self.0.store(false, Ordering::SeqCst);
        Ok(())
    }

    fn set_high(&mut self) -> core::result::Result<(), Infallible> {
        self.0.store(true, Ordering::SeqCst);
        Ok(())
    }
}

impl StatefulOutputPin for SimPin {
    fn is_set_high(&mut self) -> core::result::Result<bool, Infallible> {
        Ok(self.0.load(Ordering::SeqCst))
    }

    fn is_set_low(&mut self) -> core::result::Result<bool, Infallible> {
        Ok(!self.0.load(Ordering::SeqCst))
    }
}

fn main() -> stepper_coord::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let mut config = match std::env::args().nth(1) {
        Some(path) => stepper_coord::load_config(path)?,
        None => SystemConfig::default(),
    };
    // Keep the demo short.
    config.motor.max_velocity = StepsPerSec(4000);
    config.heartbeat.period = Some(Millis(250));

    let button = SimPin::default();
    let led = SimPin::default();
    let inputs: InputController<SimPin, SimPin, 4> =
        InputController::from_config(&config, [button.clone(), SimPin::default()], led)?;
    let notifier = inputs
        .notifier("button")
        .ok_or(stepper_coord::error::ConfigError::DeviceNotReady(heapless::String::new()))?;

    let queue: WorkQueue<InputTask, MonotonicClock, 8> = WorkQueue::new(MonotonicClock::new());
    let mut irq = LineInterrupt::new(notifier, queue.handle());
    let mut handle = queue.handle();
    inputs.start(&mut handle)?;
    let worker = queue.spawn("inputs", inputs)?;

    // A bouncy press every 300 ms.
    let presser = thread::spawn(move || {
        for _ in 0..4 {
            button.0.store(true, Ordering::SeqCst);
            for _ in 0..3 {
                if irq.on_edge().is_err() {
                    return;
                }
                thread::sleep(Duration::from_millis(3));
            }
            thread::sleep(Duration::from_millis(100));
            button.0.store(false, Ordering::SeqCst);
            thread::sleep(Duration::from_millis(200));
        }
    });

    let mut motion = MotionController::new(SimulatedActuator::new()?);
    motion.configure(&config.motor)?;
    let mut control = ControlLoop::new(motion, &config.control);
    control.run_cycles(2)?;

    let _ = presser.join();
    worker.shutdown();
    tracing::info!("done after {} legs", control.legs());
    Ok(())
}

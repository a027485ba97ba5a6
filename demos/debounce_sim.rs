//! Replays a noisy button and end-stop in virtual time.
//!
//! Run with `cargo run --example debounce_sim`. Set `RUST_LOG=trace` to see
//! every settle check.

use std::convert::Infallible;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

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

/// (time ms, line, level after the edge)
const SCRIPT: &[(u64, &str, bool)] = &[
    // Clean press with contact bounce.
    (0, "button", true),
    (2, "button", false),
    (4, "button", true),
    (10, "button", true),
    // Glitch shorter than the window.
    (200, "endstop", true),
    (205, "endstop", false),
    // Both lines held together.
    (400, "endstop", true),
    (420, "button", true),
];

fn main() -> stepper_coord::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")))
        .init();

    let config = SystemConfig::default();
    let button = SimPin::default();
    let endstop = SimPin::default();
    let led = SimPin::default();

    let mut inputs: InputController<SimPin, SimPin, 4> =
        InputController::from_config(&config, [button.clone(), endstop.clone()], led.clone())?;
    let mut queue: DelayedTaskQueue<InputTask, 8> = DelayedTaskQueue::new();

    for &(at, line, level) in SCRIPT {
        queue.run_until(&mut inputs, Instant(at));
        let pin = if line == "button" { &button } else { &endstop };
        pin.0.store(level, Ordering::SeqCst);
        if level {
            if let Some(notifier) = inputs.notifier(line) {
                notifier.notify(&mut QueueContext::new(&mut queue, Instant(at)))?;
            }
        }
        tracing::trace!(at, line, level, "edge");
    }
    queue.run_until(&mut inputs, Instant(1000));

    for line in ["button", "endstop"] {
        if let Some(id) = inputs.coordinator().find(line) {
            tracing::info!("{}: {} activation(s)", line, inputs.activations(id));
        }
    }
    tracing::info!("LED lit at end: {}", led.0.load(Ordering::SeqCst));
    Ok(())
}

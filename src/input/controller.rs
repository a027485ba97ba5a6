//! Task handler that owns the inputs and the LED.

use embedded_hal::digital::{InputPin, OutputPin, StatefulOutputPin};

use crate::config::SystemConfig;
use crate::error::{bounded, ConfigError, Result};
use crate::queue::{Scheduler, TaskHandler};
use crate::time::{Instant, Millis};

use super::{DebounceCoordinator, EdgeNotifier, FlashFeedback, InputLine, InputTask, LineId};

/// Runs every [`InputTask`] on the queue's executor.
///
/// All line sampling, LED writes and activation bookkeeping happen here,
/// serialized by the queue. Interrupt handlers only hold [`EdgeNotifier`]s.
pub struct InputController<P, LED, const L: usize> {
    debounce: DebounceCoordinator<P, L>,
    flash: FlashFeedback<LED>,
    heartbeat: Option<Millis>,
    activations: [u32; L],
    last_activation: Option<(LineId, Instant)>,
    toggles: u32,
}

impl<P, LED, const L: usize> InputController<P, LED, L>
where
    P: InputPin,
    LED: OutputPin,
{
    /// Assemble a controller from its parts.
    pub fn new(
        debounce: DebounceCoordinator<P, L>,
        flash: FlashFeedback<LED>,
        heartbeat: Option<Millis>,
    ) -> Self {
        Self {
            debounce,
            flash,
            heartbeat,
            activations: [0; L],
            last_activation: None,
            toggles: 0,
        }
    }

    /// Build from configuration, pairing `pins` with `config.inputs` in order.
    ///
    /// # Errors
    ///
    /// - `ConfigError::TooManyInputs` if more inputs are configured than `L`
    /// - `ConfigError::DeviceNotReady` naming the first input left without a pin
    /// - `ConfigError::DuplicateInput` for repeated names
    pub fn from_config<I>(config: &SystemConfig, pins: I, led: LED) -> Result<Self>
    where
        I: IntoIterator<Item = P>,
    {
        if config.inputs.len() > L {
            return Err(ConfigError::TooManyInputs(config.inputs.len()).into());
        }

        let mut debounce = DebounceCoordinator::new(&config.debounce);
        let mut pins = pins.into_iter();
        for input in &config.inputs {
            let pin = pins
                .next()
                .ok_or_else(|| ConfigError::DeviceNotReady(bounded(input.name.as_str())))?;
            debounce.add_line(InputLine::from_config(input, pin))?;
            info!("input '{}' configured", input.name.as_str());
        }

        let flash = FlashFeedback::new(led, config.debounce.flash);
        Ok(Self::new(debounce, flash, config.heartbeat.period))
    }

    /// Arm the heartbeat, if configured.
    ///
    /// # Errors
    ///
    /// Propagates the scheduler's error.
    pub fn start<S: Scheduler<InputTask>>(&self, scheduler: &mut S) -> Result<()> {
        if let Some(period) = self.heartbeat {
            scheduler.schedule(InputTask::Heartbeat, period)?;
        }
        Ok(())
    }

    /// Notifier for the line called `name`.
    pub fn notifier(&self, name: &str) -> Option<EdgeNotifier> {
        self.debounce.find(name).map(|id| self.debounce.notifier(id))
    }

    /// The debounce coordinator.
    pub fn coordinator(&self) -> &DebounceCoordinator<P, L> {
        &self.debounce
    }

    /// The LED.
    pub fn flash(&self) -> &FlashFeedback<LED> {
        &self.flash
    }

    /// Confirmed activations of `id` so far.
    pub fn activations(&self, id: LineId) -> u32 {
        self.activations.get(id.index()).copied().unwrap_or(0)
    }

    /// Most recent confirmed activation.
    pub fn last_activation(&self) -> Option<(LineId, Instant)> {
        self.last_activation
    }

    /// Heartbeat toggles so far.
    pub fn heartbeat_toggles(&self) -> u32 {
        self.toggles
    }
}

impl<P, LED, const L: usize> TaskHandler<InputTask> for InputController<P, LED, L>
where
    P: InputPin,
    LED: StatefulOutputPin,
{
    fn run<S: Scheduler<InputTask>>(&mut self, task: InputTask, scheduler: &mut S) {
        match task {
            InputTask::Settle(group) => {
                let now = scheduler.now();
                for id in self.debounce.settle(group) {
                    if let Some(line) = self.debounce.line(id) {
                        info!("{} pressed", line.name());
                    }
                    if let Some(count) = self.activations.get_mut(id.index()) {
                        *count = count.saturating_add(1);
                    }
                    self.last_activation = Some((id, now));
                    if let Err(e) = self.flash.flash(scheduler) {
                        error!("LED flash failed: {}", e);
                    }
                }
            }
            InputTask::FlashOff => {
                if let Err(e) = self.flash.clear() {
                    error!("LED clear failed: {}", e);
                }
            }
            InputTask::Heartbeat => {
                match self.flash.toggle() {
                    Ok(lit) => {
                        self.toggles = self.toggles.wrapping_add(1);
                        debug!("heartbeat {} (LED {})", self.toggles, lit);
                    }
                    Err(e) => error!("LED toggle failed: {}", e),
                }
                if let Some(period) = self.heartbeat {
                    if let Err(e) = scheduler.schedule(InputTask::Heartbeat, period) {
                        error!("heartbeat re-arm failed: {}", e);
                    }
                }
            }
        }
    }
}

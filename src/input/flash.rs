//! LED flash on confirmed activation.

use embedded_hal::digital::{OutputPin, StatefulOutputPin};

use crate::error::{GpioError, Result};
use crate::queue::Scheduler;
use crate::time::Millis;

use super::InputTask;

/// One LED, lit on activation and cleared by the `FlashOff` task.
///
/// Every flash re-arms `FlashOff`, so overlapping activations keep the LED
/// lit until `duration` after the most recent one.
pub struct FlashFeedback<P> {
    led: P,
    duration: Millis,
    lit: bool,
}

impl<P: OutputPin> FlashFeedback<P> {
    /// Wrap an active-high LED. The pin is not touched until the first flash.
    pub fn new(led: P, duration: Millis) -> Self {
        Self {
            led,
            duration,
            lit: false,
        }
    }

    /// Light the LED and (re-)arm `FlashOff`.
    ///
    /// # Errors
    ///
    /// Returns `GpioError::Write` if the pin cannot be driven, or the
    /// scheduler's error.
    pub fn flash<S: Scheduler<InputTask>>(&mut self, scheduler: &mut S) -> Result<()> {
        self.led.set_high().map_err(|_| GpioError::Write)?;
        self.lit = true;
        scheduler.schedule(InputTask::FlashOff, self.duration)
    }

    /// Drive the LED inactive.
    ///
    /// # Errors
    ///
    /// Returns `GpioError::Write` if the pin cannot be driven.
    pub fn clear(&mut self) -> Result<()> {
        self.led.set_low().map_err(|_| GpioError::Write)?;
        self.lit = false;
        Ok(())
    }

    /// Whether the last write left the LED lit.
    #[inline]
    pub fn is_lit(&self) -> bool {
        self.lit
    }

    /// Flash length.
    #[inline]
    pub fn duration(&self) -> Millis {
        self.duration
    }

    /// Give the pin back.
    pub fn release(self) -> P {
        self.led
    }
}

impl<P: StatefulOutputPin> FlashFeedback<P> {
    /// Invert the LED. Returns whether it is now lit.
    ///
    /// # Errors
    ///
    /// Returns `GpioError::Write` if the pin cannot be driven.
    pub fn toggle(&mut self) -> Result<bool> {
        self.led.toggle().map_err(|_| GpioError::Write)?;
        self.lit = !self.lit;
        Ok(self.lit)
    }
}

//! A monitored GPIO input line.

use embedded_hal::digital::InputPin;
use heapless::String;

use crate::config::{ActiveLevel, InputConfig};
use crate::error::{bounded, GpioError, Result};

/// Named input pin with an active level.
pub struct InputLine<P> {
    name: String<32>,
    pin: P,
    active_level: ActiveLevel,
}

impl<P: InputPin> InputLine<P> {
    /// Wrap `pin`. Names longer than 32 chars are truncated.
    pub fn new(name: &str, pin: P, active_level: ActiveLevel) -> Self {
        Self {
            name: bounded(name),
            pin,
            active_level,
        }
    }

    /// Wrap `pin` using the name and level from `config`.
    pub fn from_config(config: &InputConfig, pin: P) -> Self {
        Self {
            name: config.name.clone(),
            pin,
            active_level: config.active_level,
        }
    }

    /// Line name.
    #[inline]
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Active level.
    #[inline]
    pub fn active_level(&self) -> ActiveLevel {
        self.active_level
    }

    /// Sample the live level and map it through the active level.
    ///
    /// # Errors
    ///
    /// Returns `GpioError::Read` if the pin cannot be read.
    pub fn is_active(&mut self) -> Result<bool> {
        let high = self
            .pin
            .is_high()
            .map_err(|_| GpioError::Read(self.name.clone()))?;
        Ok(self.active_level.is_active(high))
    }

    /// Give the pin back.
    pub fn release(self) -> P {
        self.pin
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use embedded_hal_mock::eh1::digital::{Mock as PinMock, State as PinState, Transaction as PinTransaction};
    use embedded_hal_mock::eh1::MockError;

    #[test]
    fn test_active_low_line() {
        let mut pin = PinMock::new(&[
            PinTransaction::get(PinState::Low),
            PinTransaction::get(PinState::High),
        ]);
        let mut line = InputLine::new("endstop", pin.clone(), ActiveLevel::Low);

        assert!(line.is_active().unwrap());
        assert!(!line.is_active().unwrap());
        pin.done();
    }

    #[test]
    fn test_read_error_names_line() {
        let mut pin = PinMock::new(&[PinTransaction::get(PinState::High)
            .with_error(MockError::Io(std::io::ErrorKind::NotConnected))]);
        let mut line = InputLine::new("button", pin.clone(), ActiveLevel::High);

        assert_eq!(
            line.is_active(),
            Err(Error::Gpio(GpioError::Read(bounded("button"))))
        );
        pin.done();
    }
}

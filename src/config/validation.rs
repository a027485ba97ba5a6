//! Configuration validation.

use crate::error::{ConfigError, Error, Result};

use super::{MotorConfig, SystemConfig};

/// Validate a system configuration.
///
/// Checks:
/// - Debounce window, flash duration and heartbeat period are non-zero
/// - Input names are unique
/// - Motor velocity is non-zero and soft limits are valid (min < max)
/// - Control loop targets lie within the soft limits
pub fn validate_config(config: &SystemConfig) -> Result<()> {
    if config.debounce.window.0 == 0 {
        return Err(Error::Config(ConfigError::InvalidDebounceWindow(0)));
    }

    if config.debounce.flash.0 == 0 {
        return Err(Error::Config(ConfigError::InvalidFlashDuration(0)));
    }

    if let Some(period) = config.heartbeat.period {
        if period.0 == 0 {
            return Err(Error::Config(ConfigError::InvalidHeartbeatPeriod(0)));
        }
    }

    for (i, input) in config.inputs.iter().enumerate() {
        if config.inputs[..i].iter().any(|other| other.name == input.name) {
            return Err(Error::Config(ConfigError::DuplicateInput(input.name.clone())));
        }
    }

    validate_motor(&config.motor)?;

    if let Some(limits) = config.motor.limits {
        for target in config.control.targets {
            if !limits.contains(target) {
                return Err(Error::Config(ConfigError::TargetOutsideLimits {
                    target: target.0,
                    min: limits.min.0,
                    max: limits.max.0,
                }));
            }
        }
    }

    Ok(())
}

fn validate_motor(config: &MotorConfig) -> Result<()> {
    if config.max_velocity.0 == 0 {
        return Err(Error::Config(ConfigError::InvalidMaxVelocity(0)));
    }

    if let Some(ref limits) = config.limits {
        if !limits.is_valid() {
            return Err(Error::Config(ConfigError::InvalidSoftLimits {
                min: limits.min.0,
                max: limits.max.0,
            }));
        }
    }

    Ok(())
}

//! Configuration loading from files (std only).

use std::fs;
use std::path::Path;

use crate::error::{bounded, ConfigError, Error, Result};

use super::SystemConfig;

/// Load configuration from a TOML file.
///
/// # Errors
///
/// Returns an error if the file cannot be read, parsed or validated.
///
/// # Example
///
/// ```rust,ignore
/// use stepper_coord::load_config;
///
/// let config = load_config("controller.toml")?;
/// ```
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<SystemConfig> {
    let content = fs::read_to_string(path.as_ref())
        .map_err(|e| Error::Config(ConfigError::IoError(bounded(&e.to_string()))))?;

    parse_config(&content)
}

/// Parse configuration from a TOML string.
///
/// # Errors
///
/// Returns an error if the TOML is invalid or fails validation.
pub fn parse_config(content: &str) -> Result<SystemConfig> {
    let config: SystemConfig = toml::from_str(content)
        .map_err(|e| Error::Config(ConfigError::ParseError(bounded(e.message()))))?;

    super::validation::validate_config(&config)?;

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ActiveLevel, DebounceMode, StepResolution, Steps, StepsPerSec};
    use crate::time::Millis;

    #[test]
    fn test_parse_empty_config_uses_defaults() {
        let config = parse_config("").unwrap();
        assert_eq!(config, SystemConfig::default());
    }

    #[test]
    fn test_parse_full_config() {
        let toml = r#"
[debounce]
window_ms = 20
flash_ms = 80
mode = "per_line"

[heartbeat]
period_ms = 250

[[inputs]]
name = "button"

[[inputs]]
name = "endstop"
active_level = "low"

[motor]
name = "motor0"
step_resolution = 1
max_velocity = 250
initial_position = 10

[motor.limits]
min_steps = -2048
max_steps = 2048

[control]
targets = [2000, -2000]
await_timeout_ms = 15000
"#;

        let config = parse_config(toml).unwrap();
        assert_eq!(config.debounce.window, Millis(20));
        assert_eq!(config.debounce.flash, Millis(80));
        assert_eq!(config.debounce.mode, DebounceMode::PerLine);
        assert_eq!(config.heartbeat.period, Some(Millis(250)));
        assert_eq!(config.inputs[1].active_level, ActiveLevel::Low);
        assert_eq!(config.motor.step_resolution, StepResolution::FULL);
        assert_eq!(config.motor.max_velocity, StepsPerSec(250));
        assert_eq!(config.motor.initial_position, Steps(10));
        assert_eq!(config.control.targets, [Steps(2000), Steps(-2000)]);
        assert_eq!(config.control.await_timeout, Some(Millis(15000)));
    }

    #[test]
    fn test_parse_rejects_bad_resolution() {
        let toml = r#"
[motor]
step_resolution = 3
"#;
        assert!(matches!(
            parse_config(toml),
            Err(Error::Config(ConfigError::ParseError(_)))
        ));
    }

    #[test]
    fn test_load_missing_file() {
        assert!(matches!(
            load_config("/nonexistent/controller.toml"),
            Err(Error::Config(ConfigError::IoError(_)))
        ));
    }
}

//! Motor configuration from TOML.

use heapless::String;
use serde::Deserialize;

use super::limits::SoftLimits;
use super::units::{StepResolution, Steps, StepsPerSec};

/// Actuator settings applied once at startup.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct MotorConfig {
    /// Human-readable name (max 32 chars).
    pub name: String<32>,

    /// Microstep divisor. Half step trades torque for smoothness.
    pub step_resolution: StepResolution,

    /// Maximum step rate.
    pub max_velocity: StepsPerSec,

    /// Position the driver is told it is at before enabling (calibration).
    pub initial_position: Steps,

    /// Optional soft limits.
    pub limits: Option<SoftLimits>,
}

impl MotorConfig {
    /// Full-step preset: more torque, lower step rate.
    pub fn full_step() -> Self {
        Self {
            step_resolution: StepResolution::FULL,
            max_velocity: StepsPerSec(250),
            ..Self::default()
        }
    }

    /// Half-step preset: less torque, twice the step rate.
    pub fn half_step() -> Self {
        Self::default()
    }
}

impl Default for MotorConfig {
    fn default() -> Self {
        Self {
            name: crate::error::bounded("motor0"),
            step_resolution: StepResolution::HALF,
            max_velocity: StepsPerSec(500),
            initial_position: Steps(0),
            limits: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets() {
        let full = MotorConfig::full_step();
        assert_eq!(full.step_resolution, StepResolution::FULL);
        assert_eq!(full.max_velocity, StepsPerSec(250));

        let half = MotorConfig::half_step();
        assert_eq!(half.step_resolution, StepResolution::HALF);
        assert_eq!(half.max_velocity, StepsPerSec(500));
    }
}

//! System configuration - root configuration structure.

use heapless::Vec;
use serde::Deserialize;

use super::control::ControlConfig;
use super::input::{ActiveLevel, DebounceConfig, HeartbeatConfig, InputConfig};
use super::motor::MotorConfig;

/// Maximum number of monitored input lines.
pub const MAX_INPUTS: usize = 8;

/// Root configuration structure from TOML.
///
/// Built once at startup and handed by reference to the components that
/// need it; nothing reads configuration from global state.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SystemConfig {
    /// Debounce and flash timing.
    #[serde(default)]
    pub debounce: DebounceConfig,

    /// Optional LED heartbeat.
    #[serde(default)]
    pub heartbeat: HeartbeatConfig,

    /// Monitored input lines, in declaration order.
    #[serde(default = "default_inputs")]
    pub inputs: Vec<InputConfig, MAX_INPUTS>,

    /// Actuator settings.
    #[serde(default)]
    pub motor: MotorConfig,

    /// Main loop settings.
    #[serde(default)]
    pub control: ControlConfig,
}

fn default_inputs() -> Vec<InputConfig, MAX_INPUTS> {
    let mut inputs = Vec::new();
    let _ = inputs.push(InputConfig::new("button", ActiveLevel::High));
    let _ = inputs.push(InputConfig::new("endstop", ActiveLevel::High));
    inputs
}

impl SystemConfig {
    /// Get an input configuration by name.
    pub fn input(&self, name: &str) -> Option<&InputConfig> {
        self.inputs.iter().find(|i| i.name.as_str() == name)
    }

    /// List all input names in declaration order.
    pub fn input_names(&self) -> impl Iterator<Item = &str> {
        self.inputs.iter().map(|i| i.name.as_str())
    }
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            debounce: DebounceConfig::default(),
            heartbeat: HeartbeatConfig::default(),
            inputs: default_inputs(),
            motor: MotorConfig::default(),
            control: ControlConfig::default(),
        }
    }
}

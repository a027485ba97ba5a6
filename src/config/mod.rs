//! Configuration module for stepper-coord.
//!
//! Provides the explicit startup configuration (debounce timing, input
//! lines, actuator settings, control loop targets) loaded from TOML files
//! (with `std` feature) or built in code.

mod control;
mod input;
mod limits;
mod motor;
mod system;
pub mod units;
#[cfg(feature = "std")]
mod loader;
mod validation;

pub use control::ControlConfig;
pub use input::{ActiveLevel, DebounceConfig, DebounceMode, HeartbeatConfig, InputConfig};
pub use limits::{LimitPolicy, SoftLimits};
pub use motor::MotorConfig;
pub use system::{SystemConfig, MAX_INPUTS};
pub use validation::validate_config;

#[cfg(feature = "std")]
pub use loader::{load_config, parse_config};

// Re-export unit types at config level
pub use units::{StepResolution, Steps, StepsPerSec};

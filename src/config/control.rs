//! Control loop configuration.

use serde::Deserialize;

use super::units::Steps;
use crate::time::{Millis, Timeout};

/// Targets the main loop alternates between.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ControlConfig {
    /// Absolute targets, visited in order then repeated.
    pub targets: [Steps; 2],

    /// Completion wait limit per move; absent waits forever.
    #[serde(rename = "await_timeout_ms")]
    pub await_timeout: Option<Millis>,
}

impl ControlConfig {
    /// The wait limit as a [`Timeout`].
    pub fn timeout(&self) -> Timeout {
        Timeout::from(self.await_timeout)
    }
}

impl Default for ControlConfig {
    fn default() -> Self {
        Self {
            targets: [Steps(1000), Steps(-1000)],
            await_timeout: None,
        }
    }
}

//! Input line, debounce and heartbeat configuration.

use heapless::String;
use serde::Deserialize;

use crate::time::Millis;

/// Which raw pin level counts as "active" (pressed, triggered).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[serde(rename_all = "snake_case")]
pub enum ActiveLevel {
    /// High level is active.
    #[default]
    High,
    /// Low level is active (e.g. a pulled-up switch to ground).
    Low,
}

impl ActiveLevel {
    /// Map a raw level to logical activity.
    #[inline]
    pub fn is_active(self, is_high: bool) -> bool {
        match self {
            ActiveLevel::High => is_high,
            ActiveLevel::Low => !is_high,
        }
    }
}

/// How settle checks are grouped across lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[serde(rename_all = "snake_case")]
pub enum DebounceMode {
    /// One settle task for every line: edges on any line push back the
    /// evaluation of all of them.
    #[default]
    Shared,
    /// One settle task per line: windows are independent.
    PerLine,
}

/// Debounce and flash timing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DebounceConfig {
    /// Quiet time after the last edge before the line is re-sampled.
    #[serde(rename = "window_ms")]
    pub window: Millis,

    /// How long the LED stays lit after a confirmed activation.
    #[serde(rename = "flash_ms")]
    pub flash: Millis,

    /// Settle task grouping.
    pub mode: DebounceMode,
}

impl Default for DebounceConfig {
    fn default() -> Self {
        Self {
            window: Millis(30),
            flash: Millis(50),
            mode: DebounceMode::Shared,
        }
    }
}

/// One monitored input line.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct InputConfig {
    /// Name used in log records (max 32 chars).
    pub name: String<32>,

    /// Active level of the line.
    #[serde(default)]
    pub active_level: ActiveLevel,
}

impl InputConfig {
    /// Create an input config.
    pub fn new(name: &str, active_level: ActiveLevel) -> Self {
        Self {
            name: crate::error::bounded(name),
            active_level,
        }
    }
}

/// Optional periodic LED toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(default)]
pub struct HeartbeatConfig {
    /// Toggle period; absent disables the heartbeat.
    #[serde(rename = "period_ms")]
    pub period: Option<Millis>,
}

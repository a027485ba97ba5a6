//! Soft travel limits.
//!
//! Bounds are raw step counts, the same unit `Actuator::set_target_position`
//! takes. Drivers check a target against them directly, without any
//! mechanical conversion or floating-point math.

use serde::Deserialize;

use super::units::Steps;

/// Policy for handling limit violations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[serde(rename_all = "snake_case")]
pub enum LimitPolicy {
    /// Reject moves that would exceed limits.
    #[default]
    Reject,
    /// Clamp target to nearest limit.
    Clamp,
}

/// Soft limits in steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SoftLimits {
    /// Minimum allowed position.
    #[serde(rename = "min_steps")]
    pub min: Steps,

    /// Maximum allowed position.
    #[serde(rename = "max_steps")]
    pub max: Steps,

    /// What to do when limit is exceeded.
    #[serde(default)]
    pub policy: LimitPolicy,
}

impl SoftLimits {
    /// Create new soft limits.
    pub fn new(min: Steps, max: Steps, policy: LimitPolicy) -> Self {
        Self { min, max, policy }
    }

    /// Check if limits are valid (min < max).
    pub fn is_valid(&self) -> bool {
        self.min < self.max
    }

    /// Check if a position is within limits.
    pub fn contains(&self, position: Steps) -> bool {
        position >= self.min && position <= self.max
    }

    /// Apply limit policy to a target position.
    ///
    /// Returns `Some(position)` if valid or clamped, `None` if rejected.
    pub fn apply(&self, target: Steps) -> Option<Steps> {
        if self.contains(target) {
            Some(target)
        } else {
            match self.policy {
                LimitPolicy::Reject => None,
                LimitPolicy::Clamp => {
                    if target < self.min {
                        Some(self.min)
                    } else {
                        Some(self.max)
                    }
                }
            }
        }
    }

    /// The limit a rejected target ran into.
    pub fn violated_limit(&self, target: Steps) -> Steps {
        if target < self.min {
            self.min
        } else {
            self.max
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_soft_limits_reject() {
        let limits = SoftLimits::new(Steps(-2048), Steps(2048), LimitPolicy::Reject);

        assert!(limits.apply(Steps(0)).is_some());
        assert!(limits.apply(Steps(2048)).is_some());
        assert!(limits.apply(Steps(-2048)).is_some());
        assert!(limits.apply(Steps(2049)).is_none());
        assert!(limits.apply(Steps(-2049)).is_none());
        assert_eq!(limits.violated_limit(Steps(-3000)), Steps(-2048));
    }

    #[test]
    fn test_soft_limits_clamp() {
        let limits = SoftLimits::new(Steps(-2048), Steps(2048), LimitPolicy::Clamp);

        assert_eq!(limits.apply(Steps(0)), Some(Steps(0)));
        assert_eq!(limits.apply(Steps(4096)), Some(Steps(2048)));
        assert_eq!(limits.apply(Steps(-4096)), Some(Steps(-2048)));
    }
}

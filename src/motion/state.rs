//! Controller states.

use crate::config::Steps;

/// Where the controller is in a command cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MotionState {
    /// Ready to issue.
    #[default]
    Idle,
    /// Target accepted by the actuator, completion not yet awaited.
    Commanded {
        /// Absolute target in steps.
        target: Steps,
    },
    /// Blocked on the completion signal.
    Settling {
        /// Absolute target in steps.
        target: Steps,
    },
}

impl MotionState {
    /// State name for logs and errors.
    pub fn name(&self) -> &'static str {
        match self {
            MotionState::Idle => "Idle",
            MotionState::Commanded { .. } => "Commanded",
            MotionState::Settling { .. } => "Settling",
        }
    }

    /// Target of the command in flight.
    pub fn target(&self) -> Option<Steps> {
        match *self {
            MotionState::Idle => None,
            MotionState::Commanded { target } | MotionState::Settling { target } => Some(target),
        }
    }

    /// Whether a new command may be issued.
    #[inline]
    pub fn is_idle(&self) -> bool {
        matches!(self, MotionState::Idle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_names_and_targets() {
        assert_eq!(MotionState::default().name(), "Idle");
        assert_eq!(MotionState::default().target(), None);

        let s = MotionState::Settling { target: Steps(-1000) };
        assert_eq!(s.name(), "Settling");
        assert_eq!(s.target(), Some(Steps(-1000)));
        assert!(!s.is_idle());
    }
}

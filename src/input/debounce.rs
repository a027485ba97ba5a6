//! Edge coalescing and settle evaluation.

use embedded_hal::digital::InputPin;
use heapless::Vec;

use crate::config::{DebounceConfig, DebounceMode};
use crate::error::{bounded, ConfigError, Result};
use crate::queue::Scheduler;
use crate::time::Millis;

use super::{InputLine, InputTask, LineId, SettleGroup};

/// What an edge interrupt holds for its line.
///
/// `notify` only re-arms the settle task. Repeated edges inside the window
/// keep pushing the deadline back, so a burst collapses into one evaluation
/// `window` after its last edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EdgeNotifier {
    task: InputTask,
    window: Millis,
}

impl EdgeNotifier {
    /// Settle task this notifier re-arms.
    #[inline]
    pub fn task(&self) -> InputTask {
        self.task
    }

    /// Record an edge.
    ///
    /// # Errors
    ///
    /// Propagates the scheduler's error (full arena, stopped worker).
    #[inline]
    pub fn notify<S: Scheduler<InputTask>>(&self, scheduler: &mut S) -> Result<()> {
        scheduler.schedule(self.task, self.window)
    }
}

/// Owns the monitored lines and decides which settle task each one uses.
pub struct DebounceCoordinator<P, const L: usize> {
    lines: Vec<InputLine<P>, L>,
    window: Millis,
    mode: DebounceMode,
}

impl<P: InputPin, const L: usize> DebounceCoordinator<P, L> {
    /// Create an empty coordinator.
    pub fn new(config: &DebounceConfig) -> Self {
        Self {
            lines: Vec::new(),
            window: config.window,
            mode: config.mode,
        }
    }

    /// Add a line. Lines are settled in the order they are added.
    ///
    /// # Errors
    ///
    /// - `ConfigError::DuplicateInput` if a line with the same name exists
    /// - `ConfigError::TooManyInputs` if the coordinator is full
    pub fn add_line(&mut self, line: InputLine<P>) -> Result<LineId> {
        if self.lines.iter().any(|l| l.name() == line.name()) {
            return Err(ConfigError::DuplicateInput(bounded(line.name())).into());
        }
        let id = LineId(self.lines.len());
        self.lines
            .push(line)
            .map_err(|_| ConfigError::TooManyInputs(L + 1))?;
        Ok(id)
    }

    /// Look up a line.
    pub fn line(&self, id: LineId) -> Option<&InputLine<P>> {
        self.lines.get(id.index())
    }

    /// Find a line by name.
    pub fn find(&self, name: &str) -> Option<LineId> {
        self.lines
            .iter()
            .position(|l| l.name() == name)
            .map(LineId)
    }

    /// All lines in declaration order.
    pub fn lines(&self) -> &[InputLine<P>] {
        &self.lines
    }

    /// Debounce window.
    pub fn window(&self) -> Millis {
        self.window
    }

    /// Settle grouping.
    pub fn mode(&self) -> DebounceMode {
        self.mode
    }

    /// Settle task for `id` under the configured mode.
    pub fn settle_task(&self, id: LineId) -> InputTask {
        match self.mode {
            DebounceMode::Shared => InputTask::Settle(SettleGroup::All),
            DebounceMode::PerLine => InputTask::Settle(SettleGroup::Line(id)),
        }
    }

    /// Notifier to hand to the interrupt handler of `id`.
    pub fn notifier(&self, id: LineId) -> EdgeNotifier {
        EdgeNotifier {
            task: self.settle_task(id),
            window: self.window,
        }
    }

    /// Re-sample every line of `group` and return the active ones, in
    /// declaration order.
    ///
    /// The triggering edge is not trusted: a line that has bounced back
    /// inactive is left out. A line that cannot be read counts as inactive.
    pub fn settle(&mut self, group: SettleGroup) -> Vec<LineId, L> {
        let mut active = Vec::new();
        for (i, line) in self.lines.iter_mut().enumerate() {
            let id = LineId(i);
            if let SettleGroup::Line(only) = group {
                if only != id {
                    continue;
                }
            }
            match line.is_active() {
                Ok(true) => {
                    // Cannot overflow: one entry per line at most.
                    let _ = active.push(id);
                }
                Ok(false) => trace!("{} inactive at settle", line.name()),
                Err(e) => warn!("{} unreadable at settle: {}", line.name(), e),
            }
        }
        active
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ActiveLevel;
    use crate::error::Error;
    use crate::queue::{DelayedTaskQueue, QueueContext};
    use crate::time::Instant;
    use embedded_hal_mock::eh1::digital::{Mock as PinMock, State as PinState, Transaction as PinTransaction};
    use embedded_hal_mock::eh1::MockError;

    fn coordinator(mode: DebounceMode) -> DebounceCoordinator<PinMock, 4> {
        DebounceCoordinator::new(&DebounceConfig {
            mode,
            ..DebounceConfig::default()
        })
    }

    #[test]
    fn test_shared_mode_uses_one_task() {
        let mut pin = PinMock::new(&[]);
        let mut c = coordinator(DebounceMode::Shared);
        let a = c.add_line(InputLine::new("button", pin.clone(), ActiveLevel::High)).unwrap();
        let b = c.add_line(InputLine::new("endstop", pin.clone(), ActiveLevel::High)).unwrap();
        assert_eq!(c.notifier(a).task(), c.notifier(b).task());
        assert_eq!(c.find("endstop"), Some(b));
        pin.done();
    }

    #[test]
    fn test_per_line_mode_uses_separate_tasks() {
        let mut pin = PinMock::new(&[]);
        let mut c = coordinator(DebounceMode::PerLine);
        let a = c.add_line(InputLine::new("button", pin.clone(), ActiveLevel::High)).unwrap();
        let b = c.add_line(InputLine::new("endstop", pin.clone(), ActiveLevel::High)).unwrap();
        assert_eq!(c.notifier(a).task(), InputTask::Settle(SettleGroup::Line(a)));
        assert_ne!(c.notifier(a).task(), c.notifier(b).task());
        pin.done();
    }

    #[test]
    fn test_duplicate_and_overflow() {
        let mut pin = PinMock::new(&[]);
        let mut c: DebounceCoordinator<PinMock, 1> = DebounceCoordinator::new(&DebounceConfig::default());
        c.add_line(InputLine::new("button", pin.clone(), ActiveLevel::High)).unwrap();

        let dup = c.add_line(InputLine::new("button", pin.clone(), ActiveLevel::High));
        assert_eq!(dup, Err(Error::Config(ConfigError::DuplicateInput(bounded("button")))));

        let full = c.add_line(InputLine::new("endstop", pin.clone(), ActiveLevel::High));
        assert_eq!(full, Err(Error::Config(ConfigError::TooManyInputs(2))));
        pin.done();
    }

    #[test]
    fn test_burst_coalesces_to_last_edge() {
        let c = coordinator(DebounceMode::Shared);
        let notifier = EdgeNotifier {
            task: InputTask::Settle(SettleGroup::All),
            window: c.window(),
        };
        let mut queue: DelayedTaskQueue<InputTask, 4> = DelayedTaskQueue::new();
        for t in [0, 3, 7, 10] {
            notifier.notify(&mut QueueContext::new(&mut queue, Instant(t))).unwrap();
        }
        assert_eq!(queue.pending_count(), 1);
        assert_eq!(queue.deadline_of(notifier.task()), Some(Instant(40)));
    }

    #[test]
    fn test_settle_samples_in_declaration_order() {
        let mut button = PinMock::new(&[PinTransaction::get(PinState::High)]);
        let mut endstop = PinMock::new(&[PinTransaction::get(PinState::Low)]);
        let mut limit = PinMock::new(&[PinTransaction::get(PinState::High)]);

        let mut c = coordinator(DebounceMode::Shared);
        let a = c.add_line(InputLine::new("button", button.clone(), ActiveLevel::High)).unwrap();
        c.add_line(InputLine::new("endstop", endstop.clone(), ActiveLevel::High)).unwrap();
        let l = c.add_line(InputLine::new("limit", limit.clone(), ActiveLevel::High)).unwrap();

        let active = c.settle(SettleGroup::All);
        assert_eq!(active.as_slice(), &[a, l]);

        button.done();
        endstop.done();
        limit.done();
    }

    #[test]
    fn test_settle_single_line_and_read_error() {
        let mut button = PinMock::new(&[]);
        let mut endstop = PinMock::new(&[PinTransaction::get(PinState::High)
            .with_error(MockError::Io(std::io::ErrorKind::NotConnected))]);

        let mut c = coordinator(DebounceMode::PerLine);
        c.add_line(InputLine::new("button", button.clone(), ActiveLevel::High)).unwrap();
        let e = c.add_line(InputLine::new("endstop", endstop.clone(), ActiveLevel::High)).unwrap();

        assert!(c.settle(SettleGroup::Line(e)).is_empty());

        button.done();
        endstop.done();
    }

    struct Fixed(bool);

    impl embedded_hal::digital::ErrorType for Fixed {
        type Error = core::convert::Infallible;
    }

    impl InputPin for Fixed {
        fn is_high(&mut self) -> core::result::Result<bool, Self::Error> {
            Ok(self.0)
        }

        fn is_low(&mut self) -> core::result::Result<bool, Self::Error> {
            Ok(!self.0)
        }
    }

    #[test]
    fn test_ids_stay_distinct_past_256_lines() {
        let mut c: DebounceCoordinator<Fixed, 300> = DebounceCoordinator::new(&DebounceConfig {
            mode: DebounceMode::PerLine,
            ..DebounceConfig::default()
        });
        for i in 0..300 {
            let name = std::format!("in{}", i);
            c.add_line(InputLine::new(&name, Fixed(i == 256), ActiveLevel::High)).unwrap();
        }

        let first = c.find("in0").unwrap();
        let last = c.find("in256").unwrap();
        assert_eq!(last.index(), 256);
        assert_ne!(c.notifier(first).task(), c.notifier(last).task());
        assert_eq!(c.settle(SettleGroup::Line(last)).as_slice(), &[last]);
        assert!(c.settle(SettleGroup::Line(first)).is_empty());
    }
}

use crate::config::ProgressSettings;
use std::time::{Duration, Instant};

const COMPLETE: u8 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Idle,
    Running { started: Instant },
    Settled { at: Instant },
}

/// Cosmetic progress for a request that reports none of its own.
///
/// Climbs by `step` every `tick` up to `ceiling` while running, shows 100
/// once settled and drops back to 0 after `reset_delay`. The value is derived
/// from timestamps, so it needs no timer thread.
#[derive(Debug, Clone)]
pub struct SimulatedProgress {
    settings: ProgressSettings,
    phase: Phase,
}

impl SimulatedProgress {
    pub fn new(settings: ProgressSettings) -> Self {
        Self {
            settings,
            phase: Phase::Idle,
        }
    }

    pub fn start(&mut self, now: Instant) {
        self.phase = Phase::Running { started: now };
    }

    pub fn settle(&mut self, now: Instant) {
        self.phase = Phase::Settled { at: now };
    }

    pub fn reset(&mut self) {
        self.phase = Phase::Idle;
    }

    fn ceiling(&self) -> u8 {
        self.settings.ceiling.min(COMPLETE - 1)
    }

    pub fn value(&self, now: Instant) -> u8 {
        match self.phase {
            Phase::Idle => 0,
            Phase::Running { started } => {
                let elapsed = now.saturating_duration_since(started);
                let ticks = elapsed.as_millis() / self.settings.tick().as_millis();
                let raised = ticks.saturating_mul(u128::from(self.settings.step));
                raised.min(u128::from(self.ceiling())) as u8
            }
            Phase::Settled { at } => {
                if self.reset_due(at, now) {
                    0
                } else {
                    COMPLETE
                }
            }
        }
    }

    /// True once a settled bar has been shown at 100 for the full delay.
    pub fn is_reset_due(&self, now: Instant) -> bool {
        match self.phase {
            Phase::Settled { at } => self.reset_due(at, now),
            _ => false,
        }
    }

    /// How long until the displayed value next changes, for repaint scheduling.
    pub fn next_change_in(&self, now: Instant) -> Option<Duration> {
        match self.phase {
            Phase::Idle => None,
            Phase::Running { .. } => Some(self.settings.tick()),
            Phase::Settled { at } => {
                let due = at + self.settings.reset_delay();
                Some(due.saturating_duration_since(now))
            }
        }
    }

    fn reset_due(&self, settled_at: Instant, now: Instant) -> bool {
        now.saturating_duration_since(settled_at) >= self.settings.reset_delay()
    }
}

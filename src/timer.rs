use serde::Serialize;
use tracing::{debug, info};

use crate::constants::{TIMER_TICKING_MS, TIMER_WARNING_MS};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TimerUrgency {
    Normal,
    Warning,
    Danger,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TimerSignals {
    pub warning: bool,
    pub ticking: bool,
    pub expired: bool,
}

impl TimerSignals {
    pub fn any(&self) -> bool {
        self.warning || self.ticking || self.expired
    }
}

/// Countdown that can be armed exactly once. Pausing and resuming never
/// rewind it.
#[derive(Clone, Debug)]
pub struct CountdownTimer {
    total_ms: u64,
    remaining_ms: u64,
    running: bool,
    armed_once: bool,
    warning_crossed: bool,
    ticking_crossed: bool,
    expired: bool,
    halted: bool,
}

impl CountdownTimer {
    pub fn new(total_ms: u64) -> Self {
        Self {
            total_ms,
            remaining_ms: total_ms,
            running: false,
            armed_once: false,
            warning_crossed: false,
            ticking_crossed: false,
            expired: false,
            halted: false,
        }
    }

    pub fn start(&mut self) -> bool {
        if self.armed_once {
            debug!("timer already armed, ignoring start");
            return false;
        }
        self.armed_once = true;
        self.running = !self.expired && !self.halted;
        info!(remaining_ms = self.remaining_ms, "timer started");
        self.running
    }

    pub fn pause(&mut self) {
        self.running = false;
    }

    pub fn resume(&mut self) -> bool {
        if !self.armed_once || self.expired || self.halted {
            return false;
        }
        self.running = true;
        true
    }

    /// Stops for good without reporting expiry.
    pub fn halt(&mut self) {
        self.running = false;
        self.halted = true;
    }

    pub fn tick(&mut self, dt_ms: u64) -> TimerSignals {
        let mut signals = TimerSignals::default();
        if !self.running {
            return signals;
        }

        self.remaining_ms = self.remaining_ms.saturating_sub(dt_ms);

        if !self.warning_crossed && self.remaining_ms <= TIMER_WARNING_MS {
            self.warning_crossed = true;
            signals.warning = true;
            info!("one minute remaining");
        }
        if !self.ticking_crossed && self.remaining_ms <= TIMER_TICKING_MS {
            self.ticking_crossed = true;
            signals.ticking = true;
        }
        if self.remaining_ms == 0 {
            self.running = false;
            self.expired = true;
            signals.expired = true;
            info!("timer expired");
        }
        signals
    }

    pub fn total_ms(&self) -> u64 {
        self.total_ms
    }

    pub fn remaining_ms(&self) -> u64 {
        self.remaining_ms
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn is_armed(&self) -> bool {
        self.armed_once
    }

    pub fn is_expired(&self) -> bool {
        self.expired
    }

    pub fn warning_crossed(&self) -> bool {
        self.warning_crossed
    }

    pub fn ticking_crossed(&self) -> bool {
        self.ticking_crossed
    }

    pub fn display(&self) -> String {
        let total_secs = self.remaining_ms / 1000;
        let minutes = (total_secs / 60).min(59);
        let seconds = total_secs % 60;
        format!("{minutes:02}:{seconds:02}")
    }

    pub fn urgency(&self) -> TimerUrgency {
        if self.remaining_ms <= TIMER_TICKING_MS {
            TimerUrgency::Danger
        } else if self.remaining_ms <= TIMER_WARNING_MS {
            TimerUrgency::Warning
        } else {
            TimerUrgency::Normal
        }
    }
}

//! Click- and keyboard-triggered countdown timers for a web page.
//!
//! The countdown core ([`TimerRecord`], [`controller::TimerWidgetController`])
//! is plain Rust driven through the [`scheduler::Scheduler`],
//! [`controller::TimerView`] and [`audio::CompletionCue`] seams. The [`dom`]
//! module binds it to page elements, `gloo-timers` and Web Audio.

use serde::Serialize;
use std::fmt;

pub mod audio;
pub mod config;
pub mod controller;
pub mod dom;
pub mod scheduler;
pub mod utils;

pub use controller::{Input, InputResponse, TimerView, TimerWidgetController};
pub use dom::{attach, TimerWidget, WidgetHandle};

/// Where a timer is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Idle,
    Running,
    Expired,
}

/// Result of one periodic tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Still counting; carries the new remaining time.
    Counting(u32),
    /// Reached zero on this tick. The tick registration has been dropped.
    Expired,
    /// The record was not running.
    Stale,
}

/// Countdown state for one timer element.
///
/// `H` is the scheduler's task handle. The record owns at most one tick
/// handle and one flash handle, and dropping either cancels its task.
/// The phase is derived from which handles are present.
pub struct TimerRecord<H> {
    duration: u32,
    remaining: u32,
    tick: Option<H>,
    flash: Option<H>,
}

impl<H> TimerRecord<H> {
    pub fn new(duration: u32) -> Self {
        Self {
            duration,
            remaining: duration,
            tick: None,
            flash: None,
        }
    }

    pub fn duration(&self) -> u32 {
        self.duration
    }

    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    pub fn phase(&self) -> Phase {
        if self.tick.is_some() {
            Phase::Running
        } else if self.flash.is_some() {
            Phase::Expired
        } else {
            Phase::Idle
        }
    }

    /// Cancel any pending tick or flash and rewind to the full duration.
    pub fn reset(&mut self) {
        self.tick = None;
        self.flash = None;
        self.remaining = self.duration;
    }

    /// Attach the periodic tick registration, replacing (and cancelling) any previous one.
    pub fn arm(&mut self, tick: H) {
        self.tick = Some(tick);
    }

    /// Count down by one second.
    pub fn step(&mut self) -> TickOutcome {
        if self.tick.is_none() {
            return TickOutcome::Stale;
        }
        self.remaining = self.remaining.saturating_sub(1);
        if self.remaining == 0 {
            self.tick = None;
            TickOutcome::Expired
        } else {
            TickOutcome::Counting(self.remaining)
        }
    }

    /// Attach the pending highlight-removal task.
    pub fn flash(&mut self, clear: H) {
        self.flash = Some(clear);
    }

    /// Drop the flash handle. Returns `false` if no flash was showing.
    pub fn clear_flash(&mut self) -> bool {
        self.flash.take().is_some()
    }
}

/// Serializable view of one timer, exposed to JavaScript.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimerSnapshot {
    pub index: usize,
    pub phase: Phase,
    pub remaining_seconds: u32,
    pub display: String,
}

/// Errors raised while binding the widget to the page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WidgetError {
    /// A timer element has no display child.
    MissingDisplay { index: usize },
    /// A DOM call failed.
    Dom(String),
}

impl fmt::Display for WidgetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WidgetError::MissingDisplay { index } => write!(
                f,
                "Timer {} has no `{}` element",
                index + 1,
                config::DISPLAY_SELECTOR
            ),
            WidgetError::Dom(msg) => write!(f, "DOM error: {}", msg),
        }
    }
}

impl std::error::Error for WidgetError {}

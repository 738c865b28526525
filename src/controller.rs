//! The timer widget controller: owns one record per timer element, starts
//! and ticks countdowns, and fires the expiry flash and cue.

use crate::audio::CompletionCue;
use crate::config::{DURATION_SECONDS, FLASH_MS, TICK_MS};
use crate::scheduler::Scheduler;
use crate::utils::{format_time, is_activation_key, shortcut_index};
use crate::{Phase, TickOutcome, TimerRecord, TimerSnapshot};
use log::debug;
use std::cell::RefCell;
use std::rc::{Rc, Weak};

/// Output surface for one timer.
pub trait TimerView {
    /// Replace the displayed countdown text.
    fn render(&self, text: &str);
    /// Toggle the expired highlight.
    fn set_expired(&self, expired: bool);
}

/// User input routed to the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Input<'a> {
    /// Pointer activation of timer `index`.
    Click(usize),
    /// Key pressed while timer `index` has focus.
    ElementKey { index: usize, key: &'a str },
    /// Key pressed anywhere on the page.
    GlobalKey(&'a str),
}

/// What happened in response to an [`Input`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InputResponse {
    pub started: bool,
    /// The browser's default action for the event must be suppressed.
    pub prevent_default: bool,
}

pub type SharedController<S, V, C> = Rc<RefCell<TimerWidgetController<S, V, C>>>;

pub struct TimerWidgetController<S: Scheduler, V, C> {
    records: Vec<TimerRecord<S::Handle>>,
    views: Vec<V>,
    scheduler: S,
    cue: C,
    // Scheduled callbacks reach the controller through this.
    this: Weak<RefCell<Self>>,
}

impl<S, V, C> TimerWidgetController<S, V, C>
where
    S: Scheduler + 'static,
    V: TimerView + 'static,
    C: CompletionCue + 'static,
{
    /// Build one record per view, in order, and render each at full duration.
    pub fn new(views: Vec<V>, scheduler: S, cue: C) -> SharedController<S, V, C> {
        let records = views
            .iter()
            .map(|_| TimerRecord::new(DURATION_SECONDS))
            .collect();
        let ctrl = Rc::new_cyclic(|this| {
            RefCell::new(Self {
                records,
                views,
                scheduler,
                cue,
                this: this.clone(),
            })
        });
        {
            let c = ctrl.borrow();
            for index in 0..c.count() {
                c.render(index);
            }
        }
        ctrl
    }

    pub fn count(&self) -> usize {
        self.records.len()
    }

    pub fn phase(&self, index: usize) -> Option<Phase> {
        self.records.get(index).map(TimerRecord::phase)
    }

    pub fn remaining(&self, index: usize) -> Option<u32> {
        self.records.get(index).map(TimerRecord::remaining)
    }

    pub fn snapshot(&self) -> Vec<TimerSnapshot> {
        self.records
            .iter()
            .enumerate()
            .map(|(index, rec)| TimerSnapshot {
                index,
                phase: rec.phase(),
                remaining_seconds: rec.remaining(),
                display: format_time(rec.remaining()),
            })
            .collect()
    }

    /// (Re)start timer `index` from its full duration.
    ///
    /// Cancels any running tick and pending flash first, so a record never
    /// has more than one tick registration. Unknown indices are ignored.
    pub fn start(&mut self, index: usize) -> bool {
        let Some(record) = self.records.get_mut(index) else {
            debug!("Ignoring start for unknown timer index {}", index);
            return false;
        };
        record.reset();
        self.views[index].set_expired(false);
        self.render(index);
        self.cue.prime();

        let this = self.this.clone();
        let tick = self.scheduler.every(
            TICK_MS,
            Box::new(move || {
                if let Some(ctrl) = this.upgrade() {
                    ctrl.borrow_mut().tick(index);
                }
            }),
        );
        self.records[index].arm(tick);
        debug!("Timer {} started ({}s)", index + 1, self.records[index].duration());
        true
    }

    /// Route a user input to the matching timer.
    pub fn handle(&mut self, input: Input<'_>) -> InputResponse {
        match input {
            Input::Click(index) => InputResponse {
                started: self.start(index),
                prevent_default: false,
            },
            Input::ElementKey { index, key } if is_activation_key(key) => InputResponse {
                started: self.start(index),
                prevent_default: true,
            },
            Input::GlobalKey(key) => match shortcut_index(key) {
                Some(index) => InputResponse {
                    started: self.start(index),
                    prevent_default: false,
                },
                None => InputResponse::default(),
            },
            Input::ElementKey { .. } => InputResponse::default(),
        }
    }

    fn tick(&mut self, index: usize) {
        let Some(record) = self.records.get_mut(index) else {
            return;
        };
        match record.step() {
            TickOutcome::Counting(_) => self.render(index),
            TickOutcome::Expired => {
                self.render(index);
                self.finish(index);
            }
            TickOutcome::Stale => {}
        }
    }

    /// Highlight the expired timer, play the cue and schedule the highlight's removal.
    fn finish(&mut self, index: usize) {
        self.views[index].set_expired(true);
        self.cue.play();

        let this = self.this.clone();
        let clear = self.scheduler.after(
            FLASH_MS,
            Box::new(move || {
                if let Some(ctrl) = this.upgrade() {
                    ctrl.borrow_mut().clear_flash(index);
                }
            }),
        );
        self.records[index].flash(clear);
        debug!("Timer {} expired", index + 1);
    }

    fn clear_flash(&mut self, index: usize) {
        if let Some(record) = self.records.get_mut(index) {
            if record.clear_flash() {
                self.views[index].set_expired(false);
            }
        }
    }

    fn render(&self, index: usize) {
        let text = format_time(self.records[index].remaining());
        self.views[index].render(&text);
    }
}

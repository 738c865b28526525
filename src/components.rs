//! Markup for the timer board.
//!
//! Cards follow the widget's DOM contract: a focusable `.timer` element
//! holding a single `.timer-display`. The controller owns the display text
//! once attached, so these components never re-render it.

use countdown_timers::config::{DURATION_SECONDS, SHORTCUT_KEYS};
use countdown_timers::utils::format_time;
use yew::prelude::*;

/// Hint shown under the countdown.
fn shortcut_hint(index: usize) -> String {
    match SHORTCUT_KEYS.get(index) {
        Some(key) => format!("Click or press {}", key),
        None => "Click to start".to_string(),
    }
}

#[derive(Properties, PartialEq)]
pub struct TimerCardProps {
    pub index: usize,
}

#[function_component(TimerCard)]
pub fn timer_card(props: &TimerCardProps) -> Html {
    let number = props.index + 1;
    html! {
        <div class="timer"
            tabindex="0"
            role="button"
            aria-label={ format!("Start timer {}", number) }
        >
            <span class="timer-label">{ format!("Timer {}", number) }</span>
            <span class="timer-display">{ format_time(DURATION_SECONDS) }</span>
            <span class="timer-hint">{ shortcut_hint(props.index) }</span>
        </div>
    }
}

#[derive(Properties, PartialEq)]
pub struct AttachErrorProps {
    pub message: String,
}

/// Shown when the controller could not bind to the board.
#[function_component(AttachError)]
pub fn attach_error(props: &AttachErrorProps) -> Html {
    html! {
        <div class="current-error">
            { format!("Timers unavailable: {}", props.message) }
        </div>
    }
}

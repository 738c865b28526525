//! Host page for the countdown timers, rendered with Yew.
//! Renders the timer cards and hands them to the widget controller.

use countdown_timers::config::TIMER_COUNT;
use yew::prelude::*;

mod components;
mod hooks;

use components::{AttachError, TimerCard};
use hooks::use_timer_widget;

/// Page layout: a heading, the timer board and an optional binding error.
#[function_component]
pub fn App() -> Html {
    let board = use_node_ref();
    let error = use_timer_widget(board.clone());

    html! {
        <main class="timer-page">
            <h1>{ "Countdown Timers" }</h1>
            <section class="timer-board" ref={board}>
                { (0..TIMER_COUNT).map(|index| html! {
                    <TimerCard key={index.to_string()} {index} />
                }).collect::<Html>() }
            </section>
            if let Some(message) = error {
                <AttachError {message} />
            }
        </main>
    }
}

/// Entry point: initializes Yew renderer for the App component.
fn main() {
    console_error_panic_hook::set_once();
    yew::Renderer::<App>::new().render();
}

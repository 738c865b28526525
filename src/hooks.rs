use countdown_timers::{attach, WidgetHandle};
use log::warn;
use web_sys::Element;
use yew::prelude::*;

/// Attach the countdown controller to the element behind `root` once it
/// has been rendered, and detach it when the component unmounts.
///
/// Returns the error message if binding failed.
#[hook]
pub fn use_timer_widget(root: NodeRef) -> Option<String> {
    let error_state_handle: UseStateHandle<Option<String>> = use_state(|| None::<String>);

    {
        let error_setter = error_state_handle.clone();
        use_effect_with(root, move |root| {
            let widget: Option<WidgetHandle> = match root.cast::<Element>() {
                Some(board) => match attach(&board) {
                    Ok(handle) => Some(handle),
                    Err(e) => {
                        warn!("Failed to bind timers: {}", e);
                        error_setter.set(Some(e.to_string()));
                        None
                    }
                },
                None => {
                    error_setter.set(Some("timer board was not rendered".to_string()));
                    None
                }
            };
            // Dropping the handle removes the listeners and stops every countdown.
            move || drop(widget)
        });
    }

    (*error_state_handle).clone()
}

//! Binds the controller to page elements and browser events.
//!
//! The page provides `.timer` elements, each with one `.timer-display`
//! child. Nothing here creates elements; it only finds them, writes text
//! into them and toggles the `expired` class.

use crate::audio::WebAudioCue;
use crate::config::{DISPLAY_SELECTOR, EXPIRED_CLASS, TIMER_SELECTOR};
use crate::controller::{Input, InputResponse, SharedController, TimerView, TimerWidgetController};
use crate::scheduler::BrowserScheduler;
use crate::{TimerSnapshot, WidgetError};
use log::{info, warn};
use std::cell::RefCell;
use std::rc::{Rc, Weak};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Element, Event, EventTarget, KeyboardEvent};

/// A timer element and its display child.
pub struct DomTimerView {
    element: Element,
    display: Element,
}

impl TimerView for DomTimerView {
    fn render(&self, text: &str) {
        self.display.set_text_content(Some(text));
    }

    fn set_expired(&self, expired: bool) {
        if let Err(e) = self
            .element
            .class_list()
            .toggle_with_force(EXPIRED_CLASS, expired)
        {
            warn!("Failed to toggle `{}` class: {:?}", EXPIRED_CLASS, e);
        }
    }
}

pub type BrowserController = SharedController<BrowserScheduler, DomTimerView, WebAudioCue>;

type WeakController =
    Weak<RefCell<TimerWidgetController<BrowserScheduler, DomTimerView, WebAudioCue>>>;

struct Listener {
    target: EventTarget,
    kind: &'static str,
    callback: Closure<dyn FnMut(Event)>,
}

/// Live widget bound to the page. Dropping it removes every event listener
/// and cancels all running countdowns.
pub struct WidgetHandle {
    controller: BrowserController,
    listeners: Vec<Listener>,
}

impl WidgetHandle {
    pub fn start(&self, index: usize) -> bool {
        self.controller.borrow_mut().start(index)
    }

    pub fn count(&self) -> usize {
        self.controller.borrow().count()
    }

    pub fn snapshot(&self) -> Vec<TimerSnapshot> {
        self.controller.borrow().snapshot()
    }

    fn listen<F>(
        &mut self,
        target: &EventTarget,
        kind: &'static str,
        handler: F,
    ) -> Result<(), WidgetError>
    where
        F: FnMut(Event) + 'static,
    {
        let callback = Closure::wrap(Box::new(handler) as Box<dyn FnMut(Event)>);
        target
            .add_event_listener_with_callback(kind, callback.as_ref().unchecked_ref())
            .map_err(dom_err)?;
        self.listeners.push(Listener {
            target: target.clone(),
            kind,
            callback,
        });
        Ok(())
    }
}

impl Drop for WidgetHandle {
    fn drop(&mut self) {
        for l in self.listeners.drain(..) {
            let _ = l.target.remove_event_listener_with_callback(
                l.kind,
                l.callback.as_ref().unchecked_ref(),
            );
        }
    }
}

fn dom_err(e: JsValue) -> WidgetError {
    WidgetError::Dom(format!("{:?}", e))
}

impl From<WidgetError> for JsValue {
    fn from(e: WidgetError) -> Self {
        JsValue::from_str(&e.to_string())
    }
}

/// Collect every timer element under `root`, in document order.
fn find_views(root: &Element) -> Result<Vec<DomTimerView>, WidgetError> {
    let nodes = root.query_selector_all(TIMER_SELECTOR).map_err(dom_err)?;
    let mut views = Vec::with_capacity(nodes.length() as usize);
    for i in 0..nodes.length() {
        let Some(element) = nodes.item(i).and_then(|n| n.dyn_into::<Element>().ok()) else {
            continue;
        };
        let index = views.len();
        let display = element
            .query_selector(DISPLAY_SELECTOR)
            .map_err(dom_err)?
            .ok_or(WidgetError::MissingDisplay { index })?;
        views.push(DomTimerView { element, display });
    }
    Ok(views)
}

fn dispatch(controller: &WeakController, input: Input<'_>) -> InputResponse {
    let Some(ctrl) = controller.upgrade() else {
        return InputResponse::default();
    };
    // Bound so the `RefMut` is released before `ctrl` goes out of scope.
    let response = match ctrl.try_borrow_mut() {
        Ok(mut c) => c.handle(input),
        Err(_) => {
            warn!("Timer widget busy, dropping {:?}", input);
            InputResponse::default()
        }
    };
    response
}

fn key_of(event: &Event) -> Option<String> {
    event.dyn_ref::<KeyboardEvent>().map(KeyboardEvent::key)
}

/// Bind every `.timer` under `root` and start listening for input.
///
/// Each timer gets click and keydown listeners; the owning document gets a
/// keydown listener for the digit shortcuts.
pub fn attach(root: &Element) -> Result<WidgetHandle, WidgetError> {
    let views = find_views(root)?;
    let targets: Vec<EventTarget> = views.iter().map(|v| v.element.clone().into()).collect();

    let controller = TimerWidgetController::new(views, BrowserScheduler, WebAudioCue::new());
    let mut handle = WidgetHandle {
        controller,
        listeners: Vec::with_capacity(targets.len() * 2 + 1),
    };

    for (index, target) in targets.iter().enumerate() {
        let weak = Rc::downgrade(&handle.controller);
        handle.listen(target, "click", move |_| {
            dispatch(&weak, Input::Click(index));
        })?;

        let weak = Rc::downgrade(&handle.controller);
        handle.listen(target, "keydown", move |event: Event| {
            let Some(key) = key_of(&event) else { return };
            if dispatch(&weak, Input::ElementKey { index, key: &key }).prevent_default {
                event.prevent_default();
            }
        })?;
    }

    let document: EventTarget = root
        .owner_document()
        .unwrap_or_else(gloo_utils::document)
        .into();
    let weak = Rc::downgrade(&handle.controller);
    handle.listen(&document, "keydown", move |event: Event| {
        if let Some(key) = key_of(&event) {
            dispatch(&weak, Input::GlobalKey(&key));
        }
    })?;

    info!("Bound {} countdown timers", targets.len());
    Ok(handle)
}

/// JavaScript entry point for pages that provide their own timer markup.
#[wasm_bindgen]
pub struct TimerWidget {
    handle: WidgetHandle,
}

#[wasm_bindgen]
impl TimerWidget {
    /// Bind every timer in the current document.
    #[wasm_bindgen(constructor)]
    pub fn new() -> Result<TimerWidget, JsValue> {
        console_error_panic_hook::set_once();
        let handle = attach(&gloo_utils::document_element())?;
        Ok(TimerWidget { handle })
    }

    /// Start timer `index`. Returns `false` for unknown indices.
    pub fn start(&self, index: usize) -> bool {
        self.handle.start(index)
    }

    pub fn count(&self) -> usize {
        self.handle.count()
    }

    /// Current state of every timer as an array of plain objects.
    pub fn snapshot(&self) -> Result<JsValue, JsValue> {
        serde_wasm_bindgen::to_value(&self.handle.snapshot()).map_err(Into::into)
    }
}

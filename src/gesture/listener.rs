// DOM event plumbing: turns touch/mouse events into input frames.
use std::cell::Cell;
use std::rc::Rc;

use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{AddEventListenerOptions, Event, EventTarget, HtmlElement, MouseEvent, TouchEvent};

use super::recognizer::{InputFrame, InputPhase};
use crate::config::GestureConfig;
use crate::state::Point;

/// Compatibility mouse events arrive shortly after a touch; ignore them.
const GHOST_MOUSE_WINDOW_MS: f64 = 800.0;

pub type Listener = Closure<dyn FnMut(Event)>;

/// Owns every listener registered by [`attach`]. Dropping it (or calling
/// [`ListenerGuard::detach`]) removes them; detaching twice is a no-op.
#[derive(Default)]
pub struct ListenerGuard {
    listeners: Vec<(EventTarget, &'static str, Listener)>,
}

impl ListenerGuard {
    pub fn new() -> Self {
        Self {
            listeners: Vec::new(),
        }
    }

    pub fn detach(&mut self) {
        for (target, name, cb) in self.listeners.drain(..) {
            let _ = target.remove_event_listener_with_callback(name, cb.as_ref().unchecked_ref());
        }
    }

    pub fn listen(&mut self, target: &EventTarget, name: &'static str, passive: bool, cb: Listener) {
        let opts = AddEventListenerOptions::new();
        opts.set_passive(passive);
        let res = target.add_event_listener_with_callback_and_add_event_listener_options(
            name,
            cb.as_ref().unchecked_ref(),
            &opts,
        );
        match res {
            Ok(()) => self.listeners.push((target.clone(), name, cb)),
            Err(e) => log::warn!("Failed to attach `{}` listener: {:?}", name, e),
        }
    }
}

impl Drop for ListenerGuard {
    fn drop(&mut self) {
        self.detach();
    }
}

/// Whether the browser exposes touch events at all.
pub fn supports_touch() -> bool {
    web_sys::window()
        .map(|w| js_sys::Reflect::has(&w, &JsValue::from_str("ontouchstart")).unwrap_or(false))
        .unwrap_or(false)
}

/// Registers touch and/or mouse listeners on `target` according to `config`
/// and feeds every event to `on_input` as an [`InputFrame`] in coordinates
/// relative to the target's top-left corner.
pub fn attach(
    target: &HtmlElement,
    config: &GestureConfig,
    on_input: Rc<dyn Fn(InputFrame)>,
) -> ListenerGuard {
    let mut guard = ListenerGuard::new();
    let last_touch_ms = Rc::new(Cell::new(f64::NEG_INFINITY));
    let target_et: &EventTarget = target.as_ref();

    if config.track_touch && supports_touch() {
        for (name, phase) in [
            ("touchstart", InputPhase::Start),
            ("touchmove", InputPhase::Move),
            ("touchend", InputPhase::End),
            ("touchcancel", InputPhase::Cancel),
        ] {
            let el = target.clone();
            let on_input = on_input.clone();
            let last_touch_ms = last_touch_ms.clone();
            let prevent_on_move = config.prevent_default_on_move;
            let cb = Closure::wrap(Box::new(move |e: Event| {
                let Some(te) = e.dyn_ref::<TouchEvent>() else {
                    return;
                };
                last_touch_ms.set(e.time_stamp());
                let contacts = touch_points(&el, te);
                // pinches always suppress native zoom
                if phase == InputPhase::Move && (prevent_on_move || contacts.len() >= 2) {
                    e.prevent_default();
                }
                on_input(InputFrame::new(phase, contacts, e.time_stamp()));
            }) as Box<dyn FnMut(Event)>);
            // touchmove must be non-passive to allow prevent_default
            guard.listen(target_et, name, phase != InputPhase::Move, cb);
        }
    } else if config.track_touch {
        log::debug!("touch events unsupported, tracking mouse only");
    }

    if config.track_mouse {
        let pressed = Rc::new(Cell::new(false));
        let Some(window) = web_sys::window() else {
            return guard;
        };
        let window_et: EventTarget = window.into();

        let down_cb = {
            let el = target.clone();
            let on_input = on_input.clone();
            let pressed = pressed.clone();
            let last_touch_ms = last_touch_ms.clone();
            Closure::wrap(Box::new(move |e: Event| {
                let Some(me) = e.dyn_ref::<MouseEvent>() else {
                    return;
                };
                if me.button() != 0 || e.time_stamp() - last_touch_ms.get() < GHOST_MOUSE_WINDOW_MS {
                    return;
                }
                pressed.set(true);
                on_input(InputFrame::new(
                    InputPhase::Start,
                    vec![mouse_point(&el, me)],
                    e.time_stamp(),
                ));
            }) as Box<dyn FnMut(Event)>)
        };
        guard.listen(target_et, "mousedown", true, down_cb);

        let move_cb = {
            let el = target.clone();
            let on_input = on_input.clone();
            let pressed = pressed.clone();
            let prevent_on_move = config.prevent_default_on_move;
            Closure::wrap(Box::new(move |e: Event| {
                if !pressed.get() {
                    return;
                }
                let Some(me) = e.dyn_ref::<MouseEvent>() else {
                    return;
                };
                if prevent_on_move {
                    e.prevent_default();
                }
                on_input(InputFrame::new(
                    InputPhase::Move,
                    vec![mouse_point(&el, me)],
                    e.time_stamp(),
                ));
            }) as Box<dyn FnMut(Event)>)
        };
        guard.listen(&window_et, "mousemove", false, move_cb);

        let up_cb = {
            let on_input = on_input.clone();
            let pressed = pressed.clone();
            Closure::wrap(Box::new(move |e: Event| {
                if !pressed.replace(false) {
                    return;
                }
                on_input(InputFrame::new(InputPhase::End, Vec::new(), e.time_stamp()));
            }) as Box<dyn FnMut(Event)>)
        };
        guard.listen(&window_et, "mouseup", true, up_cb);
    }

    guard
}

fn touch_points(el: &HtmlElement, e: &TouchEvent) -> Vec<Point> {
    let rect = el.get_bounding_client_rect();
    let touches = e.touches();
    (0..touches.length())
        .filter_map(|i| touches.item(i))
        .map(|t| {
            Point::new(
                t.client_x() as f64 - rect.left(),
                t.client_y() as f64 - rect.top(),
            )
        })
        .collect()
}

fn mouse_point(el: &HtmlElement, e: &MouseEvent) -> Point {
    let rect = el.get_bounding_client_rect();
    Point::new(
        e.client_x() as f64 - rect.left(),
        e.client_y() as f64 - rect.top(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_guard_detaches_twice_and_drops() {
        let mut guard = ListenerGuard::new();
        guard.detach();
        guard.detach();
        assert!(guard.listeners.is_empty());
    }
}

#[cfg(all(test, target_arch = "wasm32"))]
mod browser_tests {
    use super::*;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    fn counting_listener(hits: &Rc<Cell<u32>>) -> Listener {
        let hits = hits.clone();
        Closure::wrap(Box::new(move |_e: Event| hits.set(hits.get() + 1)) as Box<dyn FnMut(Event)>)
    }

    fn fire(target: &EventTarget) {
        let event = Event::new("ping").expect("event");
        target.dispatch_event(&event).expect("dispatch");
    }

    #[wasm_bindgen_test]
    fn detach_removes_listeners_and_repeats_safely() {
        let document = web_sys::window().and_then(|w| w.document()).expect("document");
        let target: EventTarget = document.create_element("div").expect("div").into();
        let hits = Rc::new(Cell::new(0));
        let mut guard = ListenerGuard::new();
        guard.listen(&target, "ping", true, counting_listener(&hits));
        fire(&target);
        assert_eq!(hits.get(), 1);

        guard.detach();
        guard.detach();
        fire(&target);
        assert_eq!(hits.get(), 1);
    }

    #[wasm_bindgen_test]
    fn dropping_guard_detaches() {
        let document = web_sys::window().and_then(|w| w.document()).expect("document");
        let target: EventTarget = document.create_element("div").expect("div").into();
        let hits = Rc::new(Cell::new(0));
        {
            let mut guard = ListenerGuard::new();
            guard.listen(&target, "ping", true, counting_listener(&hits));
        }
        fire(&target);
        assert_eq!(hits.get(), 0);
    }
}

use std::cell::RefCell;
use std::rc::Rc;

use web_sys::HtmlElement;
use yew::prelude::*;

use crate::config::GestureConfig;
use crate::gesture::{listener, GestureCallbacks, InputFrame, Recognizer};
use crate::haptics::{detect_haptics, Haptics, NoopHaptics};
use crate::util::now_ms;

/// Haptics backend for a component: detected once, or a no-op when disabled.
#[hook]
pub fn use_haptics(enabled: bool) -> Rc<dyn Haptics> {
    let haptics = use_memo(enabled, |enabled| -> Rc<dyn Haptics> {
        if *enabled {
            detect_haptics()
        } else {
            Rc::new(NoopHaptics)
        }
    });
    (*haptics).clone()
}

/// Attaches a gesture recognizer to `target` for the lifetime of the
/// component. Callbacks are refreshed on every render; the listeners are
/// re-attached only when `config` changes and removed on unmount.
#[hook]
pub fn use_gestures(target: NodeRef, config: GestureConfig, callbacks: GestureCallbacks) {
    let haptics = use_haptics(config.haptic_feedback);
    let callbacks_ref = use_mut_ref(GestureCallbacks::default);
    *callbacks_ref.borrow_mut() = callbacks;

    use_effect_with(config, move |config| {
        let recognizer = Rc::new(RefCell::new(Recognizer::new(config.clone(), haptics)));
        let guard = match target.cast::<HtmlElement>() {
            Some(el) => {
                let recognizer = recognizer.clone();
                let callbacks_ref = callbacks_ref.clone();
                let on_input: Rc<dyn Fn(InputFrame)> = Rc::new(move |frame: InputFrame| {
                    let signals = recognizer.borrow_mut().handle(&frame);
                    // clone out so callbacks may re-render freely
                    let cbs = callbacks_ref.borrow().clone();
                    cbs.dispatch(&signals);
                });
                Some(listener::attach(&el, config, on_input))
            }
            None => {
                log::warn!("use_gestures: target not mounted, gestures disabled");
                None
            }
        };
        move || {
            drop(guard);
            // a session in flight must not outlive its listeners
            if !recognizer.borrow().session().is_idle() {
                let signals = recognizer.borrow_mut().cancel(now_ms());
                let cbs = callbacks_ref.borrow().clone();
                cbs.dispatch(&signals);
            }
        }
    });
}

// Small browser helpers shared by the components.
use std::cell::{Cell, RefCell};
use std::rc::Rc;

use gloo_timers::callback::Timeout;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys::HtmlElement;

use crate::state::Viewport;

/// High resolution timestamp in ms, on the same clock as `Event::time_stamp`.
pub fn now_ms() -> f64 {
    web_sys::window()
        .and_then(|w| w.performance())
        .map(|p| p.now())
        .unwrap_or_else(js_sys::Date::now)
}

pub fn element_viewport(el: &HtmlElement) -> Viewport {
    Viewport::new(el.client_width() as f64, el.client_height() as f64)
}

type FrameCallback = Closure<dyn FnMut(f64)>;

/// requestAnimationFrame loop that only runs on demand. `step` receives the
/// frame timestamp and returns whether another frame is wanted. Dropping the
/// loop cancels any pending frame.
pub struct FrameLoop {
    closure: Rc<RefCell<Option<FrameCallback>>>,
    pending: Rc<Cell<Option<i32>>>,
}

impl FrameLoop {
    pub fn new(mut step: impl FnMut(f64) -> bool + 'static) -> Self {
        let closure: Rc<RefCell<Option<FrameCallback>>> = Rc::new(RefCell::new(None));
        let pending = Rc::new(Cell::new(None));
        let closure_loop = closure.clone();
        let pending_loop = pending.clone();
        *closure.borrow_mut() = Some(Closure::wrap(Box::new(move |ts: f64| {
            pending_loop.set(None);
            if step(ts) {
                schedule(&closure_loop, &pending_loop);
            }
        }) as Box<dyn FnMut(f64)>));
        Self { closure, pending }
    }

    /// Requests a frame unless one is already pending.
    pub fn request(&self) {
        if self.pending.get().is_none() {
            schedule(&self.closure, &self.pending);
        }
    }
}

fn schedule(closure: &Rc<RefCell<Option<FrameCallback>>>, pending: &Rc<Cell<Option<i32>>>) {
    let Some(window) = web_sys::window() else {
        return;
    };
    if let Some(cb) = closure.borrow().as_ref() {
        if let Ok(id) = window.request_animation_frame(cb.as_ref().unchecked_ref()) {
            pending.set(Some(id));
        }
    }
}

impl Drop for FrameLoop {
    fn drop(&mut self) {
        if let (Some(id), Some(window)) = (self.pending.take(), web_sys::window()) {
            let _ = window.cancel_animation_frame(id);
        }
        // breaks the closure -> cell reference cycle
        self.closure.borrow_mut().take();
    }
}

/// Trailing-edge debounce: of a burst of calls, only the last runs, once,
/// `delay_ms` after it.
#[derive(Clone)]
pub struct Debounce {
    delay_ms: u32,
    pending: Rc<RefCell<Option<Timeout>>>,
}

impl Debounce {
    pub fn new(delay_ms: u32) -> Self {
        Self {
            delay_ms,
            pending: Rc::new(RefCell::new(None)),
        }
    }

    pub fn call(&self, f: impl FnOnce() + 'static) {
        // dropping the previous handle clears its timer
        *self.pending.borrow_mut() = Some(Timeout::new(self.delay_ms, f));
    }

    pub fn cancel(&self) {
        self.pending.borrow_mut().take();
    }
}

pub fn format_counter(index: usize, total: usize) -> String {
    if total == 0 {
        String::new()
    } else {
        format!("{} / {}", index + 1, total)
    }
}

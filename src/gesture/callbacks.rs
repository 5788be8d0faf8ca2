use yew::Callback;

use super::recognizer::Signal;
use crate::state::{Direction, Point};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PinchDelta {
    pub scale_ratio: f64,
    pub center: Point,
    pub center_delta: Point,
}

/// Per-signal callbacks. Unset entries are skipped. Dispatch is synchronous,
/// in signal order, inside the event handler that produced the signals.
#[derive(Clone, Default, PartialEq)]
pub struct GestureCallbacks {
    pub on_session_start: Option<Callback<Direction>>,
    pub on_session_move: Option<Callback<(f64, Direction)>>,
    pub on_session_end: Option<Callback<()>>,
    pub on_session_cancel: Option<Callback<()>>,
    pub on_swipe_left: Option<Callback<()>>,
    pub on_swipe_right: Option<Callback<()>>,
    pub on_swipe_up: Option<Callback<()>>,
    pub on_swipe_down: Option<Callback<()>>,
    pub on_pan: Option<Callback<Point>>,
    pub on_pinch_start: Option<Callback<Point>>,
    pub on_pinch: Option<Callback<PinchDelta>>,
    pub on_pinch_end: Option<Callback<()>>,
    pub on_tap: Option<Callback<Point>>,
    pub on_double_tap: Option<Callback<Point>>,
}

impl GestureCallbacks {
    pub fn dispatch(&self, signals: &[Signal]) {
        for signal in signals {
            self.dispatch_one(signal);
        }
    }

    fn dispatch_one(&self, signal: &Signal) {
        fn emit<T>(cb: &Option<Callback<T>>, value: T) {
            if let Some(cb) = cb {
                cb.emit(value);
            }
        }
        match signal {
            Signal::SessionStart { direction, .. } => emit(&self.on_session_start, *direction),
            Signal::SessionMove {
                progress,
                direction,
            } => emit(&self.on_session_move, (*progress, *direction)),
            Signal::SessionEnd => emit(&self.on_session_end, ()),
            Signal::SessionCancel => emit(&self.on_session_cancel, ()),
            Signal::Swipe(Direction::Left) => emit(&self.on_swipe_left, ()),
            Signal::Swipe(Direction::Right) => emit(&self.on_swipe_right, ()),
            Signal::Swipe(Direction::Up) => emit(&self.on_swipe_up, ()),
            Signal::Swipe(Direction::Down) => emit(&self.on_swipe_down, ()),
            Signal::Swipe(Direction::None) => {}
            Signal::Pan { delta } => emit(&self.on_pan, *delta),
            Signal::PinchStart { center } => emit(&self.on_pinch_start, *center),
            Signal::Pinch {
                scale_ratio,
                center,
                center_delta,
            } => emit(
                &self.on_pinch,
                PinchDelta {
                    scale_ratio: *scale_ratio,
                    center: *center,
                    center_delta: *center_delta,
                },
            ),
            Signal::PinchEnd => emit(&self.on_pinch_end, ()),
            Signal::Tap { point } => emit(&self.on_tap, *point),
            Signal::DoubleTap { point } => emit(&self.on_double_tap, *point),
            // forwarded by the recognizer itself
            Signal::Haptic(_) => {}
        }
    }
}

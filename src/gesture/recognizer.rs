//! Gesture classification.
//!
//! [`transition`] is a pure function from the current [`RecognizerState`] and
//! one [`InputFrame`] to the next state plus the signals that frame produced.
//! [`Recognizer`] wraps it into an instance with its own config and haptics.

use std::rc::Rc;

use crate::config::GestureConfig;
use crate::haptics::{HapticPattern, Haptics};
use crate::state::{ContactPoint, Direction, GestureSession, PinchSession, Point, Session};

use super::double_tap::{TapKind, TapTracker};

/// Below this the previous pinch distance is treated as degenerate.
const MIN_PINCH_DISTANCE: f64 = 1e-6;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InputPhase {
    Start,
    Move,
    End,
    Cancel,
}

/// One raw input event. `contacts` holds the points still in contact
/// *after* the event, so a final release carries no contacts.
#[derive(Clone, Debug, PartialEq)]
pub struct InputFrame {
    pub phase: InputPhase,
    pub contacts: Vec<Point>,
    pub timestamp_ms: f64,
}

impl InputFrame {
    pub fn new(phase: InputPhase, contacts: Vec<Point>, timestamp_ms: f64) -> Self {
        Self {
            phase,
            contacts,
            timestamp_ms,
        }
    }

    pub fn start(x: f64, y: f64, timestamp_ms: f64) -> Self {
        Self::new(InputPhase::Start, vec![Point::new(x, y)], timestamp_ms)
    }

    pub fn moved(x: f64, y: f64, timestamp_ms: f64) -> Self {
        Self::new(InputPhase::Move, vec![Point::new(x, y)], timestamp_ms)
    }

    pub fn end(timestamp_ms: f64) -> Self {
        Self::new(InputPhase::End, Vec::new(), timestamp_ms)
    }

    pub fn cancel(timestamp_ms: f64) -> Self {
        Self::new(InputPhase::Cancel, Vec::new(), timestamp_ms)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Signal {
    SessionStart { direction: Direction, origin: Point },
    SessionMove { progress: f64, direction: Direction },
    SessionEnd,
    /// The session stopped without a release: cancelled input, or a second
    /// contact turned it into a pinch. Always followed by `SessionEnd`, never
    /// by a swipe or tap.
    SessionCancel,
    Swipe(Direction),
    /// Displacement since the previous sample of a single-contact session.
    Pan { delta: Point },
    PinchStart { center: Point },
    /// `scale_ratio` is relative to the previous frame; `center_delta` is the
    /// midpoint drift since the previous frame.
    Pinch {
        scale_ratio: f64,
        center: Point,
        center_delta: Point,
    },
    PinchEnd,
    Tap { point: Point },
    DoubleTap { point: Point },
    Haptic(HapticPattern),
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct RecognizerState {
    pub session: Session,
    pub taps: TapTracker,
}

pub fn transition(
    config: &GestureConfig,
    state: RecognizerState,
    input: &InputFrame,
) -> (RecognizerState, Vec<Signal>) {
    let RecognizerState { session, mut taps } = state;
    let mut out = Vec::new();
    let t = input.timestamp_ms;

    let session = match (session, input.contacts.as_slice()) {
        (Session::Idle, []) => Session::Idle,
        (Session::Pan(s), []) => {
            if input.phase == InputPhase::Cancel {
                taps.clear();
                out.push(Signal::SessionCancel);
                out.push(Signal::SessionEnd);
            } else {
                release(config, &s, t, &mut taps, &mut out);
            }
            Session::Idle
        }
        (Session::Pinch(p), []) => {
            log::debug!("pinch end at {:.2}x", p.total_ratio());
            out.push(Signal::PinchEnd);
            Session::Idle
        }

        (Session::Idle, [p]) => {
            out.push(Signal::SessionStart {
                direction: Direction::None,
                origin: *p,
            });
            out.push(Signal::Haptic(HapticPattern::Light));
            Session::Pan(GestureSession::begin(ContactPoint::at(*p, t)))
        }
        (Session::Pan(mut s), [p]) => {
            if input.phase == InputPhase::Move {
                advance(config, &mut s, ContactPoint::at(*p, t), &mut out);
            }
            Session::Pan(s)
        }
        (Session::Pinch(pinch), [p]) => {
            // the remaining contact becomes the new start
            log::debug!("pinch end at {:.2}x", pinch.total_ratio());
            out.push(Signal::PinchEnd);
            out.push(Signal::SessionStart {
                direction: Direction::None,
                origin: *p,
            });
            Session::Pan(GestureSession::resumed_after_pinch(ContactPoint::at(*p, t)))
        }

        (Session::Idle, [a, b, ..]) => begin_pinch(*a, *b, &mut taps, &mut out),
        (Session::Pan(_), [a, b, ..]) => {
            out.push(Signal::SessionCancel);
            out.push(Signal::SessionEnd);
            begin_pinch(*a, *b, &mut taps, &mut out)
        }
        (Session::Pinch(mut p), [a, b, ..]) => {
            pinch_frame(&mut p, *a, *b, &mut out);
            Session::Pinch(p)
        }
    };

    (RecognizerState { session, taps }, out)
}

fn advance(config: &GestureConfig, s: &mut GestureSession, current: ContactPoint, out: &mut Vec<Signal>) {
    let step = s.advance(current, config.threshold, config.direction_dead_zone);
    if step != Point::ORIGIN {
        out.push(Signal::Pan { delta: step });
    }
    out.push(Signal::SessionMove {
        progress: s.progress,
        direction: s.direction,
    });
    if s.progress >= 0.5 && !s.halfway_signaled {
        s.halfway_signaled = true;
        out.push(Signal::Haptic(HapticPattern::Medium));
    }
}

fn release(
    config: &GestureConfig,
    s: &GestureSession,
    timestamp_ms: f64,
    taps: &mut TapTracker,
    out: &mut Vec<Signal>,
) {
    let committed = !s.from_pinch
        && s.direction.is_some()
        && (s.distance >= config.threshold || s.velocity > config.velocity_threshold);
    if committed {
        log::debug!(
            "swipe {:?}: {:.1}px at {:.2}px/ms",
            s.direction,
            s.distance,
            s.velocity
        );
        out.push(Signal::Swipe(s.direction));
        out.push(Signal::Haptic(HapticPattern::Heavy));
    }
    out.push(Signal::SessionEnd);

    if s.from_pinch || s.direction.is_some() {
        // only back-to-back taps form a double tap
        taps.clear();
        return;
    }
    let point = s.start.point();
    match taps.register(point, timestamp_ms, config.double_tap_window_ms) {
        TapKind::Single => out.push(Signal::Tap { point }),
        TapKind::Double => out.push(Signal::DoubleTap { point }),
    }
}

fn begin_pinch(a: Point, b: Point, taps: &mut TapTracker, out: &mut Vec<Signal>) -> Session {
    taps.clear();
    let p = PinchSession::begin(a, b);
    out.push(Signal::PinchStart {
        center: p.initial_center,
    });
    Session::Pinch(p)
}

fn pinch_frame(p: &mut PinchSession, a: Point, b: Point, out: &mut Vec<Signal>) {
    let distance = a.distance_to(b);
    let center = a.midpoint(b);
    if !distance.is_finite() || !center.is_finite() {
        return;
    }
    // A degenerate previous distance skips the scale update for this frame.
    let scale_ratio = if p.current_distance > MIN_PINCH_DISTANCE {
        distance / p.current_distance
    } else {
        1.0
    };
    let center_delta = p.current_center.delta_to(center);
    p.current_distance = distance;
    p.current_center = center;
    out.push(Signal::Pinch {
        scale_ratio,
        center,
        center_delta,
    });
}

/// A recognizer instance with its own config, state and haptics.
pub struct Recognizer {
    config: GestureConfig,
    state: RecognizerState,
    haptics: Rc<dyn Haptics>,
}

impl Recognizer {
    pub fn new(config: GestureConfig, haptics: Rc<dyn Haptics>) -> Self {
        Self {
            config,
            state: RecognizerState::default(),
            haptics,
        }
    }

    pub fn session(&self) -> &Session {
        &self.state.session
    }

    /// Feeds one input frame and returns the signals it produced. Haptic
    /// signals are also forwarded to the haptics backend when enabled.
    pub fn handle(&mut self, input: &InputFrame) -> Vec<Signal> {
        let state = std::mem::take(&mut self.state);
        let (next, signals) = transition(&self.config, state, input);
        self.state = next;
        if self.config.haptic_feedback {
            for s in &signals {
                if let Signal::Haptic(p) = s {
                    self.haptics.pulse(*p);
                }
            }
        }
        signals
    }

    /// Drops any active session as if it had been cancelled.
    pub fn cancel(&mut self, timestamp_ms: f64) -> Vec<Signal> {
        self.handle(&InputFrame::cancel(timestamp_ms))
    }
}

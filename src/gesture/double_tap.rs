// Tap window tracking for double-tap detection.
use crate::state::Point;

/// Furthest a second tap may land from the first and still pair with it.
pub const DOUBLE_TAP_SLOP_PX: f64 = 40.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TapKind {
    Single,
    Double,
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct TapTracker {
    last_tap: Option<(Point, f64)>,
}

impl TapTracker {
    /// Registers a tap at `timestamp_ms`. A tap within `window_ms` and
    /// [`DOUBLE_TAP_SLOP_PX`] of the previous single tap completes a double
    /// tap and closes the window; anything else opens a fresh window.
    pub fn register(&mut self, point: Point, timestamp_ms: f64, window_ms: f64) -> TapKind {
        match self.last_tap.take() {
            Some((first, prev))
                if timestamp_ms - prev <= window_ms
                    && timestamp_ms >= prev
                    && first.distance_to(point) <= DOUBLE_TAP_SLOP_PX =>
            {
                TapKind::Double
            }
            _ => {
                self.last_tap = Some((point, timestamp_ms));
                TapKind::Single
            }
        }
    }

    pub fn clear(&mut self) {
        self.last_tap = None;
    }
}

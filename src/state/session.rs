// Gesture session state owned by the recognizer.
use super::point::{ContactPoint, Direction, Point};

/// One continuous single-contact interaction, from first contact to release.
#[derive(Clone, Debug, PartialEq)]
pub struct GestureSession {
    pub start: ContactPoint,
    pub current: ContactPoint,
    /// Locked on the first classification past the dead zone.
    pub direction: Direction,
    pub distance: f64,
    /// px/ms, measured from `start`.
    pub velocity: f64,
    pub progress: f64,
    /// Medium pulse already fired for this session.
    pub halfway_signaled: bool,
    /// Session was left behind by a pinch; it never commits a swipe or tap.
    pub from_pinch: bool,
}

impl GestureSession {
    pub fn begin(start: ContactPoint) -> Self {
        Self {
            start,
            current: start,
            direction: Direction::None,
            distance: 0.0,
            velocity: 0.0,
            progress: 0.0,
            halfway_signaled: false,
            from_pinch: false,
        }
    }

    pub fn resumed_after_pinch(start: ContactPoint) -> Self {
        Self {
            from_pinch: true,
            ..Self::begin(start)
        }
    }

    /// Moves the session to `current`, updating the derived measures.
    /// Returns the displacement since the previous sample.
    pub fn advance(&mut self, current: ContactPoint, threshold: f64, dead_zone: f64) -> Point {
        let step = self.current.point().delta_to(current.point());
        self.current = current;
        let dx = current.x - self.start.x;
        let dy = current.y - self.start.y;
        self.distance = (dx * dx + dy * dy).sqrt();
        let elapsed = current.timestamp_ms - self.start.timestamp_ms;
        self.velocity = if elapsed > 0.0 { self.distance / elapsed } else { 0.0 };
        self.progress = if threshold > 0.0 {
            (self.distance / threshold).min(1.0)
        } else {
            1.0
        };
        if !self.direction.is_some() && self.distance > dead_zone {
            self.direction = Direction::classify(dx, dy);
        }
        step
    }
}

/// Two-contact variant used for pinch-zoom.
#[derive(Clone, Debug, PartialEq)]
pub struct PinchSession {
    pub initial_distance: f64,
    pub current_distance: f64,
    pub initial_center: Point,
    pub current_center: Point,
}

impl PinchSession {
    pub fn begin(a: Point, b: Point) -> Self {
        let distance = a.distance_to(b);
        let center = a.midpoint(b);
        Self {
            initial_distance: distance,
            current_distance: distance,
            initial_center: center,
            current_center: center,
        }
    }

    /// Spread relative to the first frame; 1.0 when that frame was degenerate.
    pub fn total_ratio(&self) -> f64 {
        if self.initial_distance > f64::EPSILON && self.current_distance.is_finite() {
            self.current_distance / self.initial_distance
        } else {
            1.0
        }
    }
}

/// Explicit recognizer state. At most one session is active at a time.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum Session {
    #[default]
    Idle,
    Pan(GestureSession),
    Pinch(PinchSession),
}

impl Session {
    pub fn is_idle(&self) -> bool {
        matches!(self, Session::Idle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn total_ratio_tracks_spread_since_first_frame() {
        let mut p = PinchSession::begin(Point::new(0.0, 0.0), Point::new(100.0, 0.0));
        assert_eq!(p.initial_distance, 100.0);
        p.current_distance = 250.0;
        assert_eq!(p.total_ratio(), 2.5);
    }

    #[test]
    fn total_ratio_of_coincident_start_is_neutral() {
        let mut p = PinchSession::begin(Point::new(5.0, 5.0), Point::new(5.0, 5.0));
        p.current_distance = 80.0;
        assert_eq!(p.total_ratio(), 1.0);
    }
}

// Contact geometry shared by the recognizer and the controllers.
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const ORIGIN: Point = Point { x: 0.0, y: 0.0 };

    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance_to(self, other: Point) -> f64 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        (dx * dx + dy * dy).sqrt()
    }

    pub fn midpoint(self, other: Point) -> Point {
        Point::new((self.x + other.x) * 0.5, (self.y + other.y) * 0.5)
    }

    pub fn delta_to(self, other: Point) -> Point {
        Point::new(other.x - self.x, other.y - self.y)
    }

    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// A single contact sample: position plus the event timestamp in milliseconds.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ContactPoint {
    pub x: f64,
    pub y: f64,
    pub timestamp_ms: f64,
}

impl ContactPoint {
    pub fn new(x: f64, y: f64, timestamp_ms: f64) -> Self {
        Self { x, y, timestamp_ms }
    }

    pub fn at(point: Point, timestamp_ms: f64) -> Self {
        Self::new(point.x, point.y, timestamp_ms)
    }

    pub fn point(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Left,
    Right,
    Up,
    Down,
    #[default]
    None,
}

impl Direction {
    /// Classifies a displacement. Ties go to the horizontal axis; a zero
    /// displacement has no direction.
    pub fn classify(dx: f64, dy: f64) -> Direction {
        if dx == 0.0 && dy == 0.0 {
            return Direction::None;
        }
        if dx.abs() >= dy.abs() {
            if dx < 0.0 { Direction::Left } else { Direction::Right }
        } else if dy < 0.0 {
            Direction::Up
        } else {
            Direction::Down
        }
    }

    pub fn is_some(self) -> bool {
        self != Direction::None
    }
}

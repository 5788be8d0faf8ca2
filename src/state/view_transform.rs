// View transform for the image currently shown in the lightbox.
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ViewTransform {
    pub scale: f64,
    pub translate_x: f64,
    pub translate_y: f64,
}

impl ViewTransform {
    pub const IDENTITY: ViewTransform = ViewTransform {
        scale: 1.0,
        translate_x: 0.0,
        translate_y: 0.0,
    };

    pub fn is_identity(&self) -> bool {
        *self == Self::IDENTITY
    }

    pub fn is_zoomed(&self) -> bool {
        self.scale > 1.0
    }

    /// Linear blend towards `target`; `t` is clamped to [0, 1].
    pub fn lerp(&self, target: &ViewTransform, t: f64) -> ViewTransform {
        let t = t.clamp(0.0, 1.0);
        ViewTransform {
            scale: self.scale + (target.scale - self.scale) * t,
            translate_x: self.translate_x + (target.translate_x - self.translate_x) * t,
            translate_y: self.translate_y + (target.translate_y - self.translate_y) * t,
        }
    }

    /// CSS `transform` value, translate applied before scale.
    pub fn to_css(&self) -> String {
        format!(
            "translate({:.2}px, {:.2}px) scale({:.4})",
            self.translate_x, self.translate_y, self.scale
        )
    }
}

impl Default for ViewTransform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Size of the element the image is displayed in, in CSS pixels.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width: width.max(0.0),
            height: height.max(0.0),
        }
    }

    pub fn center(&self) -> (f64, f64) {
        (self.width * 0.5, self.height * 0.5)
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(800.0, 600.0)
    }
}

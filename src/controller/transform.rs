//! Bounded scale/translate state for the image shown in the lightbox.
//!
//! Points passed in are in viewport coordinates (origin top-left). The
//! transform itself is relative to the viewport centre, matching a CSS
//! `transform-origin: center` on the image element. Translation is hard
//! clamped so the scaled image never reveals more than its own overflow.

use std::rc::Rc;

use yew::Callback;

use crate::config::ViewerConfig;
use crate::haptics::{HapticPattern, Haptics};
use crate::state::{Point, ViewTransform, Viewport};

#[derive(Clone, Copy, Debug, PartialEq)]
struct Animation {
    from: ViewTransform,
    to: ViewTransform,
    start_ms: f64,
    duration_ms: f64,
}

fn ease_out_cubic(t: f64) -> f64 {
    let inv = 1.0 - t.clamp(0.0, 1.0);
    1.0 - inv * inv * inv
}

pub struct TransformController {
    transform: ViewTransform,
    viewport: Viewport,
    config: ViewerConfig,
    haptics: Rc<dyn Haptics>,
    on_change: Option<Callback<ViewTransform>>,
    animation: Option<Animation>,
}

impl TransformController {
    pub fn new(config: ViewerConfig, viewport: Viewport, haptics: Rc<dyn Haptics>) -> Self {
        Self {
            transform: ViewTransform::IDENTITY,
            viewport,
            config,
            haptics,
            on_change: None,
            animation: None,
        }
    }

    /// Invoked after every committed change, including animation frames.
    pub fn with_observer(mut self, on_change: Callback<ViewTransform>) -> Self {
        self.on_change = Some(on_change);
        self
    }

    pub fn transform(&self) -> ViewTransform {
        self.transform
    }

    pub fn is_animating(&self) -> bool {
        self.animation.is_some()
    }

    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
        let t = self.transform;
        let (x, y) = self.constrain(t.translate_x, t.translate_y, t.scale);
        self.commit(ViewTransform {
            translate_x: x,
            translate_y: y,
            ..t
        });
    }

    /// Clamps a translation so content scaled by `scale` stays inside the
    /// viewport. The bound is zero at or below 1:1.
    pub fn constrain(&self, x: f64, y: f64, scale: f64) -> (f64, f64) {
        let bx = (self.viewport.width * (scale - 1.0) * 0.5).max(0.0);
        let by = (self.viewport.height * (scale - 1.0) * 0.5).max(0.0);
        (x.clamp(-bx, bx), y.clamp(-by, by))
    }

    fn clamp_scale(&self, scale: f64) -> f64 {
        scale.clamp(self.config.min_scale, self.config.max_scale)
    }

    fn relative(&self, p: Point) -> Point {
        let (cx, cy) = self.viewport.center();
        Point::new(p.x - cx, p.y - cy)
    }

    /// Scales about `anchor` (viewport coordinates) to `new_scale`, unclamped.
    fn scaled_about(&self, anchor: Point, new_scale: f64) -> ViewTransform {
        let t = self.transform;
        let k = new_scale / t.scale;
        let p = self.relative(anchor);
        ViewTransform {
            scale: new_scale,
            translate_x: p.x - (p.x - t.translate_x) * k,
            translate_y: p.y - (p.y - t.translate_y) * k,
        }
    }

    /// One pinch frame. `center` is the current midpoint and `center_delta`
    /// its drift since the previous frame. A non-finite or non-positive
    /// ratio leaves the scale untouched for this frame.
    pub fn apply_pinch(&mut self, scale_ratio: f64, center: Point, center_delta: Point) {
        self.animation = None;
        let anchor = Point::new(center.x - center_delta.x, center.y - center_delta.y);
        let mut next = self.transform;
        if scale_ratio.is_finite() && scale_ratio > 0.0 && anchor.is_finite() {
            let new_scale = self.clamp_scale(self.transform.scale * scale_ratio);
            next = self.scaled_about(anchor, new_scale);
        } else {
            log::trace!("pinch frame skipped: ratio {}", scale_ratio);
        }
        if center_delta.is_finite() {
            next.translate_x += center_delta.x;
            next.translate_y += center_delta.y;
        }
        let (x, y) = self.constrain(next.translate_x, next.translate_y, next.scale);
        self.commit(ViewTransform {
            translate_x: x,
            translate_y: y,
            ..next
        });
    }

    /// Pans by `delta`. Disabled at or below 1:1.
    pub fn apply_pan(&mut self, delta: Point) {
        let t = self.transform;
        if t.scale <= 1.0 || !delta.is_finite() {
            return;
        }
        self.animation = None;
        let (x, y) = self.constrain(t.translate_x + delta.x, t.translate_y + delta.y, t.scale);
        self.commit(ViewTransform {
            translate_x: x,
            translate_y: y,
            ..t
        });
    }

    /// Zooms so the content under (`center_x`, `center_y`) stays put.
    pub fn zoom_to_point(&mut self, target_scale: f64, center_x: f64, center_y: f64) {
        if !(target_scale.is_finite() && center_x.is_finite() && center_y.is_finite()) {
            return;
        }
        self.animation = None;
        let scale = self.clamp_scale(target_scale);
        let next = self.scaled_about(Point::new(center_x, center_y), scale);
        let (x, y) = self.constrain(next.translate_x, next.translate_y, scale);
        self.commit(ViewTransform {
            translate_x: x,
            translate_y: y,
            scale,
        });
    }

    /// Double-tap behaviour: zoom in on `point` from rest, back out when zoomed.
    pub fn toggle_zoom_at(&mut self, point: Point) {
        if self.transform.is_zoomed() {
            self.zoom_to_point(1.0, point.x, point.y);
        } else {
            self.zoom_to_point(self.config.double_tap_scale, point.x, point.y);
        }
        self.haptics.pulse(HapticPattern::Light);
    }

    pub fn zoom_in(&mut self) {
        let (cx, cy) = self.viewport.center();
        self.zoom_to_point(self.transform.scale * self.config.zoom_step, cx, cy);
    }

    pub fn zoom_out(&mut self) {
        let (cx, cy) = self.viewport.center();
        self.zoom_to_point(self.transform.scale / self.config.zoom_step, cx, cy);
    }

    /// Wheel zoom around the cursor; `delta_y` is in pixels.
    pub fn zoom_by_wheel(&mut self, delta_y: f64, at: Point) {
        if !delta_y.is_finite() {
            return;
        }
        // an overflowing factor saturates at the scale limits
        let target = (self.transform.scale * (-delta_y * 0.001).exp())
            .min(self.config.max_scale)
            .max(self.config.min_scale);
        self.zoom_to_point(target, at.x, at.y);
    }

    /// Silent return to rest, used when another image becomes active.
    pub fn on_image_changed(&mut self) {
        self.animation = None;
        self.commit(ViewTransform::IDENTITY);
    }

    pub fn reset(&mut self) {
        self.animation = None;
        self.commit(ViewTransform::IDENTITY);
        self.haptics.pulse(HapticPattern::Light);
    }

    /// Starts easing back into bounds after a gesture ends. Below 1:1 the
    /// image returns to rest.
    pub fn settle(&mut self, now_ms: f64) {
        let t = self.transform;
        let target = if t.scale < 1.0 {
            ViewTransform::IDENTITY
        } else {
            let (x, y) = self.constrain(t.translate_x, t.translate_y, t.scale);
            ViewTransform {
                translate_x: x,
                translate_y: y,
                ..t
            }
        };
        if target == t {
            return;
        }
        if self.config.settle_duration_ms <= 0.0 {
            self.commit(target);
            return;
        }
        self.animation = Some(Animation {
            from: t,
            to: target,
            start_ms: now_ms,
            duration_ms: self.config.settle_duration_ms,
        });
    }

    /// Advances the settle animation. Returns true while more frames are needed.
    pub fn tick(&mut self, now_ms: f64) -> bool {
        let Some(anim) = self.animation else {
            return false;
        };
        let progress = (now_ms - anim.start_ms) / anim.duration_ms;
        if progress >= 1.0 {
            self.animation = None;
            self.commit(anim.to);
            return false;
        }
        self.commit(anim.from.lerp(&anim.to, ease_out_cubic(progress)));
        true
    }

    fn commit(&mut self, next: ViewTransform) {
        if next == self.transform {
            return;
        }
        self.transform = next;
        if let Some(cb) = &self.on_change {
            cb.emit(next);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GestureConfig;
    use crate::gesture::recognizer::{InputFrame, Recognizer, Signal};
    use crate::haptics::testing::RecordingHaptics;
    use std::cell::RefCell;

    const VIEW: Viewport = Viewport {
        width: 800.0,
        height: 600.0,
    };
    const EPS: f64 = 1e-9;

    fn controller() -> (TransformController, Rc<RecordingHaptics>) {
        let haptics = Rc::new(RecordingHaptics::default());
        (
            TransformController::new(ViewerConfig::default(), VIEW, haptics.clone()),
            haptics,
        )
    }

    fn center() -> Point {
        Point::new(400.0, 300.0)
    }

    #[test]
    fn pinch_doubling_from_rest() {
        let (mut c, _) = controller();
        // 100px -> 200px finger spread
        c.apply_pinch(200.0 / 100.0, center(), Point::ORIGIN);
        assert_eq!(c.transform().scale, 2.0);
    }

    #[test]
    fn pinch_clamps_to_max_scale() {
        let (mut c, _) = controller();
        c.apply_pinch(7.0, center(), Point::ORIGIN);
        assert_eq!(c.transform().scale, 5.0);
    }

    #[test]
    fn pinch_clamps_to_min_scale() {
        let (mut c, _) = controller();
        c.apply_pinch(0.1, center(), Point::ORIGIN);
        assert_eq!(c.transform().scale, 0.5);
        assert_eq!(c.transform().translate_x, 0.0);
    }

    #[test]
    fn invalid_ratio_keeps_scale() {
        let (mut c, _) = controller();
        c.apply_pinch(2.0, center(), Point::ORIGIN);
        for bad in [f64::NAN, f64::INFINITY, 0.0, -1.0] {
            c.apply_pinch(bad, center(), Point::ORIGIN);
            let t = c.transform();
            assert_eq!(t.scale, 2.0);
            assert!(t.translate_x.is_finite() && t.translate_y.is_finite());
        }
    }

    #[test]
    fn pinch_keeps_midpoint_content_fixed() {
        let (mut c, _) = controller();
        let mid = Point::new(500.0, 350.0);
        c.apply_pinch(2.0, mid, Point::ORIGIN);
        let t = c.transform();
        // content offset (100, 50) from centre maps back onto the same screen point
        assert!((t.translate_x + 2.0 * 100.0 - 100.0).abs() < EPS);
        assert!((t.translate_y + 2.0 * 50.0 - 50.0).abs() < EPS);
    }

    #[test]
    fn pinch_drift_moves_translate() {
        let (mut c, _) = controller();
        c.apply_pinch(2.0, center(), Point::ORIGIN);
        c.apply_pinch(1.0, Point::new(430.0, 320.0), Point::new(30.0, 20.0));
        let t = c.transform();
        assert!((t.translate_x - 30.0).abs() < EPS);
        assert!((t.translate_y - 20.0).abs() < EPS);
    }

    #[test]
    fn pan_at_rest_is_ignored() {
        let (mut c, _) = controller();
        c.apply_pan(Point::new(40.0, -25.0));
        assert!(c.transform().is_identity());
    }

    #[test]
    fn pan_is_hard_clamped_when_zoomed() {
        let (mut c, _) = controller();
        c.zoom_to_point(2.0, 400.0, 300.0);
        c.apply_pan(Point::new(10_000.0, -10_000.0));
        let t = c.transform();
        // bound = dim * (scale - 1) / 2
        assert_eq!(t.translate_x, 400.0);
        assert_eq!(t.translate_y, -300.0);
    }

    #[test]
    fn constrain_bound_is_zero_at_rest() {
        let (c, _) = controller();
        assert_eq!(c.constrain(50.0, -50.0, 1.0), (0.0, 0.0));
        assert_eq!(c.constrain(50.0, -50.0, 0.6), (0.0, 0.0));
        assert_eq!(c.constrain(500.0, -500.0, 3.0), (500.0, -500.0));
        assert_eq!(c.constrain(900.0, -900.0, 3.0), (800.0, -600.0));
    }

    #[test]
    fn zoom_to_point_keeps_point_stationary() {
        let (mut c, _) = controller();
        c.zoom_to_point(2.0, 500.0, 300.0);
        let t = c.transform();
        assert_eq!(t.scale, 2.0);
        assert!((t.translate_x - -100.0).abs() < EPS);
        assert!(t.translate_y.abs() < EPS);
    }

    #[test]
    fn zoom_round_trip_returns_to_rest() {
        let (mut c, _) = controller();
        c.zoom_to_point(3.0, 120.0, 80.0);
        c.zoom_to_point(1.0, 120.0, 80.0);
        let t = c.transform();
        assert_eq!(t.scale, 1.0);
        assert!(t.translate_x.abs() < EPS && t.translate_y.abs() < EPS);
    }

    #[test]
    fn reset_is_idempotent() {
        let (mut c, haptics) = controller();
        c.zoom_to_point(3.0, 100.0, 100.0);
        c.reset();
        let first = c.transform();
        c.reset();
        assert_eq!(first, ViewTransform::IDENTITY);
        assert_eq!(c.transform(), first);
        assert_eq!(haptics.take(), vec![HapticPattern::Light, HapticPattern::Light]);
    }

    #[test]
    fn zoom_buttons_step_around_centre() {
        let (mut c, _) = controller();
        c.zoom_in();
        assert!((c.transform().scale - 1.5).abs() < EPS);
        c.zoom_out();
        assert!((c.transform().scale - 1.0).abs() < EPS);
        c.zoom_out();
        assert!((c.transform().scale - 1.0 / 1.5).abs() < EPS);
    }

    #[test]
    fn settle_below_rest_animates_to_identity() {
        let (mut c, _) = controller();
        c.apply_pinch(0.7, center(), Point::ORIGIN);
        c.settle(1000.0);
        assert!(c.is_animating());
        assert!(c.tick(1100.0));
        let mid = c.transform().scale;
        assert!(mid > 0.7 && mid < 1.0);
        assert!(!c.tick(1200.0));
        assert!(c.transform().is_identity());
        assert!(!c.is_animating());
    }

    #[test]
    fn settle_inside_bounds_is_noop() {
        let (mut c, _) = controller();
        c.zoom_to_point(2.0, 400.0, 300.0);
        c.settle(0.0);
        assert!(!c.is_animating());
    }

    #[test]
    fn shrinking_viewport_reconstrains() {
        let (mut c, _) = controller();
        c.zoom_to_point(2.0, 400.0, 300.0);
        c.apply_pan(Point::new(400.0, 300.0));
        c.set_viewport(Viewport::new(400.0, 300.0));
        let t = c.transform();
        assert_eq!((t.translate_x, t.translate_y), (200.0, 150.0));
    }

    #[test]
    fn observer_sees_committed_changes() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let (c, _) = controller();
        let mut c = c.with_observer({
            let seen = seen.clone();
            Callback::from(move |t: ViewTransform| seen.borrow_mut().push(t.scale))
        });
        c.apply_pan(Point::new(5.0, 5.0));
        c.zoom_to_point(2.0, 400.0, 300.0);
        c.reset();
        c.reset();
        assert_eq!(*seen.borrow(), vec![2.0, 1.0]);
    }

    #[test]
    fn image_change_resets_without_haptic() {
        let (mut c, haptics) = controller();
        c.zoom_to_point(3.0, 100.0, 100.0);
        c.on_image_changed();
        assert!(c.transform().is_identity());
        assert!(haptics.take().is_empty());
    }

    #[test]
    fn wheel_up_zooms_in_and_clamps() {
        let (mut c, _) = controller();
        c.zoom_by_wheel(-100.0, center());
        assert!(c.transform().scale > 1.0);
        c.zoom_by_wheel(-100_000.0, center());
        assert_eq!(c.transform().scale, 5.0);
        c.zoom_by_wheel(100_000.0, center());
        assert_eq!(c.transform().scale, 0.5);
    }

    #[test]
    fn huge_wheel_delta_saturates_instead_of_dropping() {
        let (mut c, _) = controller();
        c.zoom_by_wheel(-1e6, center());
        assert_eq!(c.transform().scale, 5.0);
        c.zoom_by_wheel(f64::NAN, center());
        c.zoom_by_wheel(f64::NEG_INFINITY, center());
        assert_eq!(c.transform().scale, 5.0);
        c.zoom_by_wheel(1e6, center());
        assert_eq!(c.transform().scale, 0.5);
    }

    #[test]
    fn double_tap_toggles_zoom_at_tap_point() {
        let haptics = Rc::new(RecordingHaptics::default());
        let mut r = Recognizer::new(GestureConfig::default(), haptics.clone());
        let (mut c, _) = controller();
        let tap_at = |r: &mut Recognizer, c: &mut TransformController, t: f64| {
            r.handle(&InputFrame::start(500.0, 300.0, t));
            for s in r.handle(&InputFrame::end(t + 20.0)) {
                if let Signal::DoubleTap { point } = s {
                    c.toggle_zoom_at(point);
                }
            }
        };
        tap_at(&mut r, &mut c, 0.0);
        assert_eq!(c.transform().scale, 1.0);
        tap_at(&mut r, &mut c, 180.0);
        assert_eq!(c.transform().scale, 2.5);
        // third tap 400ms later opens a new window instead of zooming out
        tap_at(&mut r, &mut c, 600.0);
        assert_eq!(c.transform().scale, 2.5);
        tap_at(&mut r, &mut c, 750.0);
        assert_eq!(c.transform().scale, 1.0);
    }
}

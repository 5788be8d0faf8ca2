//! Best-effort vibration feedback.
//!
//! Capability detection happens once in [`detect_haptics`]; everything else
//! talks to the [`Haptics`] trait and never checks the platform itself.

use std::rc::Rc;

use wasm_bindgen::JsValue;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HapticPattern {
    Light,
    Medium,
    Heavy,
    /// Refresh failure.
    Error,
}

impl HapticPattern {
    /// Vibration pattern in ms, alternating on/off.
    pub fn durations(self) -> &'static [u32] {
        match self {
            HapticPattern::Light => &[10],
            HapticPattern::Medium => &[20],
            HapticPattern::Heavy => &[30],
            HapticPattern::Error => &[30, 50, 30],
        }
    }
}

pub trait Haptics {
    fn pulse(&self, pattern: HapticPattern);
}

pub struct NoopHaptics;

impl Haptics for NoopHaptics {
    fn pulse(&self, _pattern: HapticPattern) {}
}

/// `navigator.vibrate` backed haptics.
pub struct VibrationHaptics {
    navigator: web_sys::Navigator,
}

impl Haptics for VibrationHaptics {
    fn pulse(&self, pattern: HapticPattern) {
        let durations = pattern.durations();
        // Return value only says whether the UA accepted the request.
        if let [single] = durations {
            let _ = self.navigator.vibrate_with_duration(*single);
        } else {
            let arr = js_sys::Array::new();
            for d in durations {
                arr.push(&JsValue::from(*d));
            }
            let _ = self.navigator.vibrate_with_pattern(&arr);
        }
    }
}

/// Returns vibration haptics when the browser exposes `navigator.vibrate`,
/// a no-op implementation otherwise.
pub fn detect_haptics() -> Rc<dyn Haptics> {
    let navigator = web_sys::window().map(|w| w.navigator());
    match navigator {
        Some(nav) if js_sys::Reflect::has(&nav, &JsValue::from_str("vibrate")).unwrap_or(false) => {
            log::debug!("haptics: navigator.vibrate available");
            Rc::new(VibrationHaptics { navigator: nav })
        }
        _ => {
            log::debug!("haptics: unsupported, using no-op");
            Rc::new(NoopHaptics)
        }
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::cell::RefCell;

    /// Records every pulse for assertions.
    #[derive(Default)]
    pub struct RecordingHaptics {
        pub pulses: RefCell<Vec<HapticPattern>>,
    }

    impl RecordingHaptics {
        pub fn take(&self) -> Vec<HapticPattern> {
            std::mem::take(&mut *self.pulses.borrow_mut())
        }
    }

    impl Haptics for RecordingHaptics {
        fn pulse(&self, pattern: HapticPattern) {
            self.pulses.borrow_mut().push(pattern);
        }
    }
}

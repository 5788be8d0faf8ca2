//! Gesture, viewer and pull-to-refresh configuration.
//!
//! Every struct deserializes with `#[serde(default)]`, so a partial JSON
//! override stored in `localStorage` only replaces the fields it names.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

pub const CONFIG_STORAGE_KEY: &str = "portfolio_gesture_config";

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GestureConfig {
    /// Distance in px that commits a swipe.
    pub threshold: f64,
    /// px/ms; a faster release commits even below `threshold`.
    pub velocity_threshold: f64,
    pub prevent_default_on_move: bool,
    pub track_touch: bool,
    pub track_mouse: bool,
    pub haptic_feedback: bool,
    /// Movement below this never locks a direction.
    pub direction_dead_zone: f64,
    pub double_tap_window_ms: f64,
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            threshold: 50.0,
            velocity_threshold: 0.3,
            prevent_default_on_move: true,
            track_touch: true,
            track_mouse: true,
            haptic_feedback: true,
            direction_dead_zone: 10.0,
            double_tap_window_ms: 300.0,
        }
    }
}

impl GestureConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("threshold", self.threshold)?;
        positive("velocity_threshold", self.velocity_threshold)?;
        non_negative("direction_dead_zone", self.direction_dead_zone)?;
        positive("double_tap_window_ms", self.double_tap_window_ms)?;
        if self.direction_dead_zone >= self.threshold {
            return Err(ConfigError::invalid(
                "direction_dead_zone",
                "must be smaller than threshold",
            ));
        }
        Ok(())
    }

    /// Recognizer config for tracking a pull: progress 1.0 is
    /// `max_pull_distance` of travel and native scrolling stays live. The
    /// pull controller owns the haptics for these sessions.
    pub fn for_pull_tracking(&self, max_pull_distance: f64) -> Self {
        Self {
            threshold: max_pull_distance,
            prevent_default_on_move: false,
            haptic_feedback: false,
            ..self.clone()
        }
    }

    /// Swipe-only recognizer sharing a scrolling container with another
    /// recognizer. The consumer pulses on the swipes it acts on.
    pub fn for_passive_swipes(&self) -> Self {
        Self {
            prevent_default_on_move: false,
            haptic_feedback: false,
            ..self.clone()
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    pub min_scale: f64,
    pub max_scale: f64,
    pub double_tap_scale: f64,
    /// Factor applied by the +/- buttons.
    pub zoom_step: f64,
    pub settle_duration_ms: f64,
    pub resize_debounce_ms: u32,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            min_scale: 0.5,
            max_scale: 5.0,
            double_tap_scale: 2.5,
            zoom_step: 1.5,
            settle_duration_ms: 200.0,
            resize_debounce_ms: 150,
        }
    }
}

impl ViewerConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("min_scale", self.min_scale)?;
        positive("max_scale", self.max_scale)?;
        if self.min_scale > self.max_scale {
            return Err(ConfigError::invalid("min_scale", "must not exceed max_scale"));
        }
        if !(self.min_scale..=self.max_scale).contains(&self.double_tap_scale) {
            return Err(ConfigError::invalid(
                "double_tap_scale",
                format!("must lie in [{}, {}]", self.min_scale, self.max_scale),
            ));
        }
        if !(self.zoom_step.is_finite() && self.zoom_step > 1.0) {
            return Err(ConfigError::invalid("zoom_step", "must be greater than 1"));
        }
        non_negative("settle_duration_ms", self.settle_duration_ms)?;
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PullConfig {
    /// Pull distance in px that arms the refresh.
    pub threshold: f64,
    pub max_pull_distance: f64,
    /// Time the "refreshing" banner stays up after the action settles.
    pub completion_delay_ms: u32,
    /// `None` waits on the refresh action indefinitely.
    pub refresh_timeout_ms: Option<u32>,
    pub pull_text: String,
    pub release_text: String,
    pub refreshing_text: String,
}

impl Default for PullConfig {
    fn default() -> Self {
        Self {
            threshold: 80.0,
            max_pull_distance: 120.0,
            completion_delay_ms: 500,
            refresh_timeout_ms: None,
            pull_text: "Pull to refresh".to_string(),
            release_text: "Release to refresh".to_string(),
            refreshing_text: "Refreshing...".to_string(),
        }
    }
}

impl PullConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("threshold", self.threshold)?;
        positive("max_pull_distance", self.max_pull_distance)?;
        if self.threshold > self.max_pull_distance {
            return Err(ConfigError::invalid(
                "threshold",
                "must not exceed max_pull_distance",
            ));
        }
        if self.refresh_timeout_ms == Some(0) {
            return Err(ConfigError::invalid("refresh_timeout_ms", "must be non-zero"));
        }
        Ok(())
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub gesture: GestureConfig,
    pub viewer: ViewerConfig,
    pub pull: PullConfig,
}

impl AppConfig {
    pub fn from_json(raw: &str) -> Result<Self, ConfigError> {
        let cfg: AppConfig = serde_json::from_str(raw)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.gesture.validate()?;
        self.viewer.validate()?;
        self.pull.validate()
    }

    /// Defaults, overridden by the JSON stored under [`CONFIG_STORAGE_KEY`]
    /// when present and valid.
    pub fn load() -> Self {
        let Some(raw) = web_sys::window()
            .and_then(|win| win.local_storage().ok().flatten())
            .and_then(|store| store.get_item(CONFIG_STORAGE_KEY).ok().flatten())
        else {
            return Self::default();
        };
        match Self::from_json(&raw) {
            Ok(cfg) => {
                log::info!("Loaded gesture config override from localStorage");
                cfg
            }
            Err(e) => {
                log::warn!("Ignoring stored gesture config: {}", e);
                Self::default()
            }
        }
    }
}

fn positive(field: &'static str, v: f64) -> Result<(), ConfigError> {
    if v.is_finite() && v > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::invalid(field, format!("must be positive, got {v}")))
    }
}

fn non_negative(field: &'static str, v: f64) -> Result<(), ConfigError> {
    if v.is_finite() && v >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::invalid(field, format!("must be non-negative, got {v}")))
    }
}

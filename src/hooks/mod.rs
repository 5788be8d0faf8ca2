pub mod use_gestures;

pub use use_gestures::{use_gestures, use_haptics};

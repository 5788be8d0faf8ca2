pub mod callbacks;
pub mod double_tap;
pub mod listener;
pub mod recognizer;

pub use callbacks::{GestureCallbacks, PinchDelta};
pub use listener::ListenerGuard;
pub use recognizer::{InputFrame, Recognizer};

pub mod point;
pub mod pull;
pub mod session;
pub mod view_transform;

pub use point::{ContactPoint, Direction, Point};
pub use pull::PullState;
pub use session::{GestureSession, PinchSession, Session};
pub use view_transform::{ViewTransform, Viewport};

pub mod pull_refresh;
pub mod transform;

pub use pull_refresh::{run_refresh, PullToRefresh, ReleaseAction};
pub use transform::TransformController;

// Pull-to-refresh progress, owned by the pull controller.
#[derive(Default, Debug, Clone, Copy, PartialEq)]
pub struct PullState {
    pub pull_distance: f64,
    /// Armed: releasing now triggers the refresh action.
    pub can_refresh: bool,
    pub is_refreshing: bool,
}

impl PullState {
    pub fn is_idle(&self) -> bool {
        self.pull_distance == 0.0 && !self.is_refreshing
    }
}

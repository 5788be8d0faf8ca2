//! Pull-to-refresh: an elastic downward pull at the top of a scroll
//! container that runs an async refresh action once per armed release.

use std::cell::RefCell;
use std::future::Future;
use std::pin::pin;
use std::rc::Rc;

use futures::future::{select, Either};
use yew::Callback;

use crate::config::PullConfig;
use crate::error::RefreshError;
use crate::haptics::{HapticPattern, Haptics};
use crate::state::{Direction, PullState};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReleaseAction {
    /// Armed release: the caller must start the refresh action now.
    Refresh,
    /// Not armed: the pull collapsed without refreshing.
    Collapse,
    /// No pull in progress, or a refresh is still pending.
    Ignored,
}

pub struct PullToRefresh {
    config: PullConfig,
    state: PullState,
    /// Current session started with the container scrolled to the top.
    armed_session: bool,
    dragging: bool,
    haptics: Rc<dyn Haptics>,
    on_change: Option<Callback<PullState>>,
}

impl PullToRefresh {
    pub fn new(config: PullConfig, haptics: Rc<dyn Haptics>) -> Self {
        Self {
            config,
            state: PullState::default(),
            armed_session: false,
            dragging: false,
            haptics,
            on_change: None,
        }
    }

    pub fn with_observer(mut self, on_change: Callback<PullState>) -> Self {
        self.on_change = Some(on_change);
        self
    }

    pub fn state(&self) -> PullState {
        self.state
    }

    pub fn status_text(&self) -> &str {
        if self.state.is_refreshing {
            &self.config.refreshing_text
        } else if self.state.can_refresh {
            &self.config.release_text
        } else {
            &self.config.pull_text
        }
    }

    /// Session start. The scroll position is checked here only; a pull that
    /// starts mid-scroll stays inert for the whole session.
    pub fn begin(&mut self, scroll_top: f64) -> bool {
        if self.state.is_refreshing {
            self.dragging = false;
            self.armed_session = false;
            return false;
        }
        self.dragging = true;
        self.armed_session = scroll_top <= 0.0;
        self.armed_session
    }

    pub fn drag(&mut self, progress: f64, direction: Direction) {
        if !self.dragging || !self.armed_session || self.state.is_refreshing {
            return;
        }
        if direction != Direction::Down || !progress.is_finite() {
            return;
        }
        let max = self.config.max_pull_distance;
        let pull = (progress.max(0.0) * max).min(max);
        let armed = pull >= self.config.threshold;
        if armed != self.state.can_refresh {
            self.haptics.pulse(HapticPattern::Medium);
        }
        self.commit(PullState {
            pull_distance: pull,
            can_refresh: armed,
            is_refreshing: false,
        });
    }

    pub fn release(&mut self) -> ReleaseAction {
        let was_dragging = std::mem::take(&mut self.dragging);
        self.armed_session = false;
        if self.state.is_refreshing || !was_dragging {
            return ReleaseAction::Ignored;
        }
        if self.state.can_refresh {
            log::debug!("pull released armed at {:.0}px", self.state.pull_distance);
            self.commit(PullState {
                pull_distance: self.config.threshold,
                can_refresh: false,
                is_refreshing: true,
            });
            ReleaseAction::Refresh
        } else {
            self.collapse();
            ReleaseAction::Collapse
        }
    }

    /// Session stopped without a release. Never starts a refresh.
    pub fn cancel(&mut self) {
        let was_dragging = std::mem::take(&mut self.dragging);
        self.armed_session = false;
        if was_dragging && !self.state.is_refreshing {
            self.collapse();
        }
    }

    /// Records the refresh outcome. The banner stays up until [`collapse`].
    ///
    /// [`collapse`]: PullToRefresh::collapse
    pub fn settle(&mut self, result: &Result<(), RefreshError>) {
        match result {
            Ok(()) => {
                log::debug!("refresh completed");
                self.haptics.pulse(HapticPattern::Heavy);
            }
            Err(e) => {
                log::warn!("{}", e);
                self.haptics.pulse(HapticPattern::Error);
            }
        }
    }

    pub fn collapse(&mut self) {
        self.commit(PullState::default());
    }

    fn commit(&mut self, next: PullState) {
        if next == self.state {
            return;
        }
        self.state = next;
        if let Some(cb) = &self.on_change {
            cb.emit(next);
        }
    }
}

/// Runs `action` for a release that returned [`ReleaseAction::Refresh`],
/// then collapses the pull after the completion delay. Failures and timeouts
/// are absorbed. `sleep(ms)` provides the timer.
pub async fn run_refresh<A, S, SF>(controller: Rc<RefCell<PullToRefresh>>, action: A, sleep: S)
where
    A: Future<Output = Result<(), RefreshError>>,
    S: Fn(u32) -> SF,
    SF: Future<Output = ()>,
{
    let (timeout_ms, delay_ms) = {
        let c = controller.borrow();
        (c.config.refresh_timeout_ms, c.config.completion_delay_ms)
    };
    let result = match timeout_ms {
        None => action.await,
        Some(after_ms) => {
            let action = pin!(action);
            let timer = pin!(sleep(after_ms));
            match select(action, timer).await {
                Either::Left((res, _)) => res,
                Either::Right(_) => Err(RefreshError::TimedOut { after_ms }),
            }
        }
    };
    controller.borrow_mut().settle(&result);
    sleep(delay_ms).await;
    controller.borrow_mut().collapse();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GestureConfig;
    use crate::gesture::recognizer::{InputFrame, InputPhase, Recognizer, Signal};
    use crate::state::Point;
    use crate::haptics::testing::RecordingHaptics;
    use futures::executor::block_on;
    use futures::future::{pending, ready};
    use std::cell::Cell;

    fn pull() -> (PullToRefresh, Rc<RecordingHaptics>) {
        let haptics = Rc::new(RecordingHaptics::default());
        (PullToRefresh::new(PullConfig::default(), haptics.clone()), haptics)
    }

    fn no_sleep(_ms: u32) -> futures::future::Ready<()> {
        ready(())
    }

    #[test]
    fn pull_past_threshold_arms_and_refreshes_once() {
        let (mut p, _) = pull();
        assert!(p.begin(0.0));
        // 0.75 of a 120px max pull
        p.drag(0.75, Direction::Down);
        assert_eq!(p.state().pull_distance, 90.0);
        assert!(p.state().can_refresh);
        assert_eq!(p.status_text(), "Release to refresh");

        assert_eq!(p.release(), ReleaseAction::Refresh);
        assert!(p.state().is_refreshing);
        assert_eq!(p.status_text(), "Refreshing...");

        // another pull while pending does nothing
        assert!(!p.begin(0.0));
        p.drag(1.0, Direction::Down);
        assert_eq!(p.release(), ReleaseAction::Ignored);
        assert!(p.state().is_refreshing);
    }

    #[test]
    fn unarmed_release_collapses() {
        let (mut p, _) = pull();
        p.begin(0.0);
        p.drag(0.5, Direction::Down);
        assert_eq!(p.state().pull_distance, 60.0);
        assert!(!p.state().can_refresh);
        assert_eq!(p.release(), ReleaseAction::Collapse);
        assert!(p.state().is_idle());
    }

    #[test]
    fn scrolled_container_never_arms() {
        let (mut p, _) = pull();
        assert!(!p.begin(35.0));
        p.drag(1.0, Direction::Down);
        assert_eq!(p.state().pull_distance, 0.0);
        assert_eq!(p.release(), ReleaseAction::Collapse);
    }

    #[test]
    fn only_downward_sessions_pull() {
        let (mut p, _) = pull();
        p.begin(0.0);
        p.drag(1.0, Direction::Up);
        p.drag(1.0, Direction::Left);
        assert_eq!(p.state().pull_distance, 0.0);
    }

    #[test]
    fn arming_pulses_on_both_edges() {
        let (mut p, haptics) = pull();
        p.begin(0.0);
        p.drag(0.5, Direction::Down);
        assert!(haptics.take().is_empty());
        p.drag(0.8, Direction::Down);
        assert_eq!(haptics.take(), vec![HapticPattern::Medium]);
        p.drag(0.9, Direction::Down);
        assert!(haptics.take().is_empty());
        p.drag(0.3, Direction::Down);
        assert_eq!(haptics.take(), vec![HapticPattern::Medium]);
    }

    #[test]
    fn pull_is_capped_at_max() {
        let (mut p, _) = pull();
        p.begin(0.0);
        p.drag(3.0, Direction::Down);
        assert_eq!(p.state().pull_distance, 120.0);
    }

    #[test]
    fn run_refresh_success_collapses() {
        let (mut p, haptics) = pull();
        p.begin(0.0);
        p.drag(1.0, Direction::Down);
        assert_eq!(p.release(), ReleaseAction::Refresh);
        haptics.take();

        let calls = Rc::new(Cell::new(0));
        let ctrl = Rc::new(RefCell::new(p));
        let action = {
            let calls = calls.clone();
            async move {
                calls.set(calls.get() + 1);
                Ok::<(), RefreshError>(())
            }
        };
        block_on(run_refresh(ctrl.clone(), action, no_sleep));
        assert_eq!(calls.get(), 1);
        assert!(ctrl.borrow().state().is_idle());
        assert_eq!(haptics.take(), vec![HapticPattern::Heavy]);
    }

    #[test]
    fn run_refresh_failure_is_absorbed() {
        let (mut p, haptics) = pull();
        p.begin(0.0);
        p.drag(1.0, Direction::Down);
        p.release();
        haptics.take();
        let ctrl = Rc::new(RefCell::new(p));
        block_on(run_refresh(
            ctrl.clone(),
            ready(Err(RefreshError::Failed("offline".into()))),
            no_sleep,
        ));
        assert!(ctrl.borrow().state().is_idle());
        assert_eq!(haptics.take(), vec![HapticPattern::Error]);
        // a new pull can refresh again
        let mut p = ctrl.borrow_mut();
        assert!(p.begin(0.0));
    }

    #[test]
    fn run_refresh_times_out_when_configured() {
        let haptics = Rc::new(RecordingHaptics::default());
        let cfg = PullConfig {
            refresh_timeout_ms: Some(5_000),
            ..PullConfig::default()
        };
        let mut p = PullToRefresh::new(cfg, haptics.clone());
        p.begin(0.0);
        p.drag(1.0, Direction::Down);
        p.release();
        let ctrl = Rc::new(RefCell::new(p));
        block_on(run_refresh(ctrl.clone(), pending(), no_sleep));
        assert!(ctrl.borrow().state().is_idle());
        assert!(haptics.take().contains(&HapticPattern::Error));
    }

    #[test]
    fn driven_by_recognizer_progress() {
        let gesture_haptics = Rc::new(RecordingHaptics::default());
        let gesture = GestureConfig {
            threshold: 120.0,
            ..GestureConfig::default()
        };
        let mut r = Recognizer::new(gesture, gesture_haptics);
        let (mut p, _) = pull();
        let feed = |r: &mut Recognizer, p: &mut PullToRefresh, frame: InputFrame| {
            let mut action = None;
            for s in r.handle(&frame) {
                match s {
                    Signal::SessionStart { .. } => {
                        p.begin(0.0);
                    }
                    Signal::SessionMove {
                        progress,
                        direction,
                    } => p.drag(progress, direction),
                    Signal::SessionEnd => action = Some(p.release()),
                    Signal::SessionCancel => p.cancel(),
                    _ => {}
                }
            }
            action
        };
        feed(&mut r, &mut p, InputFrame::start(100.0, 0.0, 0.0));
        feed(&mut r, &mut p, InputFrame::moved(100.0, 90.0, 200.0));
        assert_eq!(p.state().pull_distance, 90.0);
        assert!(p.state().can_refresh);
        assert_eq!(
            feed(&mut r, &mut p, InputFrame::end(210.0)),
            Some(ReleaseAction::Refresh)
        );
        // second gesture before settling
        feed(&mut r, &mut p, InputFrame::start(100.0, 0.0, 300.0));
        feed(&mut r, &mut p, InputFrame::moved(100.0, 110.0, 400.0));
        assert_eq!(
            feed(&mut r, &mut p, InputFrame::end(410.0)),
            Some(ReleaseAction::Ignored)
        );
    }

    #[test]
    fn second_finger_cancels_armed_pull() {
        let gesture = GestureConfig {
            threshold: 120.0,
            ..GestureConfig::default()
        };
        let mut r = Recognizer::new(gesture, Rc::new(RecordingHaptics::default()));
        let (mut p, _) = pull();
        let mut refreshed = false;
        let frames = [
            InputFrame::start(100.0, 0.0, 0.0),
            InputFrame::moved(100.0, 100.0, 100.0),
            InputFrame::new(
                InputPhase::Start,
                vec![Point::new(100.0, 100.0), Point::new(200.0, 100.0)],
                120.0,
            ),
            InputFrame::end(200.0),
        ];
        for frame in frames {
            for s in r.handle(&frame) {
                match s {
                    Signal::SessionStart { .. } => {
                        p.begin(0.0);
                    }
                    Signal::SessionMove {
                        progress,
                        direction,
                    } => p.drag(progress, direction),
                    Signal::SessionEnd => refreshed |= p.release() == ReleaseAction::Refresh,
                    Signal::SessionCancel => p.cancel(),
                    _ => {}
                }
            }
        }
        assert!(!refreshed);
        assert!(p.state().is_idle());
    }

    #[test]
    fn end_after_cancel_does_not_refresh() {
        let (mut p, _) = pull();
        p.begin(0.0);
        p.drag(1.0, Direction::Down);
        assert!(p.state().can_refresh);
        p.cancel();
        assert_eq!(p.release(), ReleaseAction::Ignored);
        assert!(p.state().is_idle());
    }

    #[test]
    fn category_swipes_keep_the_gesture_threshold() {
        let gesture = GestureConfig::default();
        let pull_cfg = PullConfig::default();
        let pull_haptics = Rc::new(RecordingHaptics::default());
        let swipe_haptics = Rc::new(RecordingHaptics::default());
        let mut tracker = Recognizer::new(
            gesture.for_pull_tracking(pull_cfg.max_pull_distance),
            pull_haptics.clone(),
        );
        let mut swipes = Recognizer::new(gesture.for_passive_swipes(), swipe_haptics.clone());
        // 60px left in 300ms: past 50px, short of the 120px pull range
        let frames = [
            InputFrame::start(200.0, 100.0, 0.0),
            InputFrame::moved(140.0, 100.0, 300.0),
            InputFrame::end(300.0),
        ];
        let mut tracked = Vec::new();
        let mut swiped = Vec::new();
        for frame in &frames {
            tracked.extend(tracker.handle(frame));
            swiped.extend(swipes.handle(frame));
        }
        assert!(!tracked.iter().any(|s| matches!(s, Signal::Swipe(_))));
        assert!(swiped.contains(&Signal::Swipe(Direction::Left)));
        assert!(pull_haptics.take().is_empty());
        assert!(swipe_haptics.take().is_empty());
    }

    #[test]
    fn pull_session_pulses_once_from_the_controller() {
        let tracker_haptics = Rc::new(RecordingHaptics::default());
        let mut r = Recognizer::new(
            GestureConfig::default().for_pull_tracking(PullConfig::default().max_pull_distance),
            tracker_haptics.clone(),
        );
        let (mut p, pull_haptics) = pull();
        let frames = [
            InputFrame::start(100.0, 0.0, 0.0),
            InputFrame::moved(100.0, 100.0, 200.0),
        ];
        for frame in &frames {
            for s in r.handle(frame) {
                match s {
                    Signal::SessionStart { .. } => {
                        p.begin(0.0);
                    }
                    Signal::SessionMove {
                        progress,
                        direction,
                    } => p.drag(progress, direction),
                    _ => {}
                }
            }
        }
        assert!(p.state().can_refresh);
        assert!(tracker_haptics.take().is_empty());
        assert_eq!(pull_haptics.take(), vec![HapticPattern::Medium]);
    }

    #[test]
    fn cancel_while_refreshing_keeps_banner() {
        let (mut p, _) = pull();
        p.begin(0.0);
        p.drag(1.0, Direction::Down);
        p.release();
        p.begin(0.0);
        p.cancel();
        assert!(p.state().is_refreshing);
    }
}

use std::rc::Rc;

use futures::future::LocalBoxFuture;
use gloo_timers::future::TimeoutFuture;
use wasm_bindgen_futures::spawn_local;
use web_sys::Element;
use yew::prelude::*;

use crate::config::{GestureConfig, PullConfig};
use crate::controller::{run_refresh, PullToRefresh, ReleaseAction};
use crate::error::RefreshError;
use crate::gesture::GestureCallbacks;
use crate::haptics::HapticPattern;
use crate::hooks::{use_gestures, use_haptics};
use crate::state::{Direction, PullState};

pub type RefreshFuture = LocalBoxFuture<'static, Result<(), RefreshError>>;

/// Async refresh supplied by the parent. Compared by identity.
#[derive(Clone)]
pub struct RefreshAction(Rc<dyn Fn() -> RefreshFuture>);

impl RefreshAction {
    pub fn new(f: impl Fn() -> RefreshFuture + 'static) -> Self {
        Self(Rc::new(f))
    }

    fn start(&self) -> RefreshFuture {
        (self.0)()
    }
}

impl PartialEq for RefreshAction {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

#[derive(Properties, PartialEq)]
pub struct PullToRefreshProps {
    pub config: PullConfig,
    pub gesture: GestureConfig,
    pub on_refresh: RefreshAction,
    #[prop_or_default]
    pub on_swipe_left: Option<Callback<()>>,
    #[prop_or_default]
    pub on_swipe_right: Option<Callback<()>>,
    #[prop_or_default]
    pub children: Children,
}

/// Scroll container with a pull-down refresh banner above its children.
#[function_component(PullToRefreshView)]
pub fn pull_to_refresh_view(props: &PullToRefreshProps) -> Html {
    let container_ref = use_node_ref();
    let pull = use_state_eq(PullState::default);
    let haptics = use_haptics(props.gesture.haptic_feedback);
    let controller = {
        let set_pull = pull.setter();
        let config = props.config.clone();
        let haptics = haptics.clone();
        use_mut_ref(move || {
            PullToRefresh::new(config, haptics).with_observer(Callback::from(move |s| set_pull.set(s)))
        })
    };
    let action = use_mut_ref(|| props.on_refresh.clone());
    *action.borrow_mut() = props.on_refresh.clone();

    // pull tracking and category swipes need different thresholds, so
    // each gets its own recognizer on the container
    let pull_gesture = use_memo(
        (props.gesture.clone(), props.config.max_pull_distance),
        |(g, max)| g.for_pull_tracking(*max),
    );
    let swipe_gesture = use_memo(props.gesture.clone(), |g| g.for_passive_swipes());

    let callbacks = {
        let on_session_start = {
            let controller = controller.clone();
            let container_ref = container_ref.clone();
            Callback::from(move |_: Direction| {
                let top = container_ref
                    .cast::<Element>()
                    .map(|el| el.scroll_top() as f64)
                    .unwrap_or(0.0);
                controller.borrow_mut().begin(top);
            })
        };
        let on_session_move = {
            let controller = controller.clone();
            Callback::from(move |(progress, dir): (f64, Direction)| {
                controller.borrow_mut().drag(progress, dir)
            })
        };
        let on_session_end = {
            let controller = controller.clone();
            let action = action.clone();
            Callback::from(move |_| {
                let released = controller.borrow_mut().release();
                if released == ReleaseAction::Refresh {
                    let fut = action.borrow().start();
                    spawn_local(run_refresh(controller.clone(), fut, TimeoutFuture::new));
                }
            })
        };
        let on_session_cancel = {
            let controller = controller.clone();
            Callback::from(move |_| controller.borrow_mut().cancel())
        };
        GestureCallbacks {
            on_session_start: Some(on_session_start),
            on_session_move: Some(on_session_move),
            on_session_end: Some(on_session_end),
            on_session_cancel: Some(on_session_cancel),
            ..Default::default()
        }
    };
    use_gestures(container_ref.clone(), (*pull_gesture).clone(), callbacks);

    let with_pulse = |cb: &Option<Callback<()>>| {
        cb.clone().map(|cb| {
            let haptics = haptics.clone();
            Callback::from(move |_: ()| {
                haptics.pulse(HapticPattern::Heavy);
                cb.emit(());
            })
        })
    };
    let swipe_callbacks = GestureCallbacks {
        on_swipe_left: with_pulse(&props.on_swipe_left),
        on_swipe_right: with_pulse(&props.on_swipe_right),
        ..Default::default()
    };
    use_gestures(container_ref.clone(), (*swipe_gesture).clone(), swipe_callbacks);

    let s = *pull;
    let status = controller.borrow().status_text().to_string();
    let opacity = (s.pull_distance / props.config.threshold.max(1.0)).min(1.0);
    let banner_style = format!(
        "height:{:.0}px; overflow:hidden; display:flex; align-items:flex-end; justify-content:center; color:#8b949e; font-size:13px; opacity:{:.2}; transition:height 0.12s ease-out;",
        s.pull_distance, opacity
    );
    let icon = if s.is_refreshing {
        "⟳"
    } else if s.can_refresh {
        "↑"
    } else {
        "↓"
    };

    html! {
        <div ref={container_ref} style="position:relative; height:100vh; overflow-y:auto; overscroll-behavior-y:contain;">
            <div style={banner_style} aria-live="polite">
                if !s.is_idle() {
                    <span style="padding-bottom:10px;">{ format!("{} {}", icon, status) }</span>
                }
            </div>
            { for props.children.iter() }
        </div>
    }
}

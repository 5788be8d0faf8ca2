use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys::{Event, EventTarget, HtmlElement, KeyboardEvent, WheelEvent};
use yew::prelude::*;

use crate::components::zoom_controls::ZoomControls;
use crate::config::{GestureConfig, ViewerConfig};
use crate::controller::TransformController;
use crate::gesture::{GestureCallbacks, ListenerGuard, PinchDelta};
use crate::hooks::{use_gestures, use_haptics};
use crate::model::Photo;
use crate::state::{Point, ViewTransform, Viewport};
use crate::util::{element_viewport, format_counter, now_ms, Debounce, FrameLoop};

#[derive(Properties, PartialEq, Clone)]
pub struct ImageViewerProps {
    pub photo: Photo,
    pub index: usize,
    pub total: usize,
    pub gesture: GestureConfig,
    pub viewer: ViewerConfig,
    pub on_next: Callback<()>,
    pub on_prev: Callback<()>,
    pub on_close: Callback<()>,
}

#[derive(Clone)]
struct Navigation {
    next: Callback<()>,
    prev: Callback<()>,
    close: Callback<()>,
}

/// Full-screen lightbox with pinch/wheel zoom, pan and swipe navigation.
#[function_component(ImageViewer)]
pub fn image_viewer(props: &ImageViewerProps) -> Html {
    let stage_ref = use_node_ref();
    let transform = use_state_eq(|| ViewTransform::IDENTITY);
    let haptics = use_haptics(props.gesture.haptic_feedback);
    let controller = {
        let set_transform = transform.setter();
        let viewer = props.viewer.clone();
        use_mut_ref(move || {
            TransformController::new(viewer, Viewport::default(), haptics)
                .with_observer(Callback::from(move |t| set_transform.set(t)))
        })
    };
    let frames = use_mut_ref(|| None::<FrameLoop>);
    let nav = use_mut_ref(|| Navigation {
        next: props.on_next.clone(),
        prev: props.on_prev.clone(),
        close: props.on_close.clone(),
    });
    *nav.borrow_mut() = Navigation {
        next: props.on_next.clone(),
        prev: props.on_prev.clone(),
        close: props.on_close.clone(),
    };

    // Window and stage listeners, mounted once.
    {
        let controller = controller.clone();
        let frames = frames.clone();
        let stage_ref = stage_ref.clone();
        let nav = nav.clone();
        let debounce = Debounce::new(props.viewer.resize_debounce_ms);
        use_effect_with((), move |_| {
            let tick_ctrl = controller.clone();
            *frames.borrow_mut() = Some(FrameLoop::new(move |ts| tick_ctrl.borrow_mut().tick(ts)));

            let stage = stage_ref.cast::<HtmlElement>();
            if let Some(el) = &stage {
                controller.borrow_mut().set_viewport(element_viewport(el));
            }

            let mut guard = ListenerGuard::new();
            if let Some(window) = web_sys::window() {
                let window_et: EventTarget = window.into();

                let resize_cb = {
                    let controller = controller.clone();
                    let stage_ref = stage_ref.clone();
                    let debounce = debounce.clone();
                    Closure::wrap(Box::new(move |_e: Event| {
                        let controller = controller.clone();
                        let stage_ref = stage_ref.clone();
                        debounce.call(move || {
                            if let Some(el) = stage_ref.cast::<HtmlElement>() {
                                let vp = element_viewport(&el);
                                log::debug!("viewer viewport {}x{}", vp.width, vp.height);
                                controller.borrow_mut().set_viewport(vp);
                            }
                        });
                    }) as Box<dyn FnMut(Event)>)
                };
                guard.listen(&window_et, "resize", true, resize_cb);

                let keydown_cb = {
                    let controller = controller.clone();
                    Closure::wrap(Box::new(move |e: Event| {
                        let Some(ke) = e.dyn_ref::<KeyboardEvent>() else {
                            return;
                        };
                        let nav = nav.borrow().clone();
                        let zoomed = controller.borrow().transform().is_zoomed();
                        match ke.key().as_str() {
                            "Escape" => nav.close.emit(()),
                            "ArrowRight" if !zoomed => nav.next.emit(()),
                            "ArrowLeft" if !zoomed => nav.prev.emit(()),
                            "+" | "=" => controller.borrow_mut().zoom_in(),
                            "-" | "_" => controller.borrow_mut().zoom_out(),
                            "0" => controller.borrow_mut().reset(),
                            _ => return,
                        }
                        e.prevent_default();
                    }) as Box<dyn FnMut(Event)>)
                };
                guard.listen(&window_et, "keydown", false, keydown_cb);
            }

            if let Some(el) = stage {
                let wheel_cb = {
                    let controller = controller.clone();
                    let el = el.clone();
                    Closure::wrap(Box::new(move |e: Event| {
                        let Some(we) = e.dyn_ref::<WheelEvent>() else {
                            return;
                        };
                        e.prevent_default();
                        let rect = el.get_bounding_client_rect();
                        let at = Point::new(
                            we.client_x() as f64 - rect.left(),
                            we.client_y() as f64 - rect.top(),
                        );
                        controller.borrow_mut().zoom_by_wheel(we.delta_y(), at);
                    }) as Box<dyn FnMut(Event)>)
                };
                guard.listen(el.as_ref(), "wheel", false, wheel_cb);
            }

            move || {
                drop(guard);
                debounce.cancel();
                frames.borrow_mut().take();
            }
        });
    }

    {
        let controller = controller.clone();
        use_effect_with(props.photo.id.clone(), move |_| {
            controller.borrow_mut().on_image_changed();
            || ()
        });
    }

    let callbacks = {
        let on_pinch = {
            let controller = controller.clone();
            Callback::from(move |d: PinchDelta| {
                controller
                    .borrow_mut()
                    .apply_pinch(d.scale_ratio, d.center, d.center_delta)
            })
        };
        let on_pinch_end = {
            let controller = controller.clone();
            let frames = frames.clone();
            Callback::from(move |_| {
                let mut c = controller.borrow_mut();
                c.settle(now_ms());
                if c.is_animating() {
                    if let Some(f) = frames.borrow().as_ref() {
                        f.request();
                    }
                }
            })
        };
        let on_pan = {
            let controller = controller.clone();
            Callback::from(move |delta: Point| controller.borrow_mut().apply_pan(delta))
        };
        let on_double_tap = {
            let controller = controller.clone();
            Callback::from(move |p: Point| controller.borrow_mut().toggle_zoom_at(p))
        };
        // swipes navigate only while the image is at rest
        let unless_zoomed = |cb: Callback<()>| {
            let controller = controller.clone();
            Callback::from(move |_: ()| {
                if !controller.borrow().transform().is_zoomed() {
                    cb.emit(());
                }
            })
        };
        GestureCallbacks {
            on_swipe_left: Some(unless_zoomed(props.on_next.clone())),
            on_swipe_right: Some(unless_zoomed(props.on_prev.clone())),
            on_swipe_down: Some(unless_zoomed(props.on_close.clone())),
            on_pan: Some(on_pan),
            on_pinch: Some(on_pinch),
            on_pinch_end: Some(on_pinch_end),
            on_double_tap: Some(on_double_tap),
            ..Default::default()
        }
    };
    use_gestures(stage_ref.clone(), props.gesture.clone(), callbacks);

    let zoom_in = {
        let controller = controller.clone();
        Callback::from(move |_| controller.borrow_mut().zoom_in())
    };
    let zoom_out = {
        let controller = controller.clone();
        Callback::from(move |_| controller.borrow_mut().zoom_out())
    };
    let reset = {
        let controller = controller.clone();
        Callback::from(move |_| controller.borrow_mut().reset())
    };
    let close = {
        let cb = props.on_close.clone();
        Callback::from(move |_| cb.emit(()))
    };
    let prev = {
        let cb = props.on_prev.clone();
        Callback::from(move |_| cb.emit(()))
    };
    let next = {
        let cb = props.on_next.clone();
        Callback::from(move |_| cb.emit(()))
    };

    let t = *transform;
    let img_style = format!(
        "width:100%; height:100%; object-fit:contain; transform:{}; transform-origin:center; user-select:none; -webkit-user-drag:none; pointer-events:none;",
        t.to_css()
    );
    let at_start = props.index == 0;
    let at_end = props.index + 1 >= props.total;

    html! {
        <div style="position:fixed; inset:0; z-index:50; background:rgba(1,4,9,0.96); display:flex; flex-direction:column;">
            <div style="display:flex; align-items:center; gap:12px; padding:10px 16px; color:#c9d1d9; border-bottom:1px solid #30363d;">
                <span style="flex:1; font-size:14px; font-weight:600;">{ props.photo.title.clone() }</span>
                <span style="font-size:12px; color:#8b949e;">{ format_counter(props.index, props.total) }</span>
                <button onclick={close} title="Close (Esc)">{"✕"}</button>
            </div>
            <div style="position:relative; flex:1;">
                <div ref={stage_ref} style="position:absolute; inset:0; overflow:hidden; touch-action:none;">
                    <img src={props.photo.url.clone()} alt={props.photo.title.clone()} draggable="false" style={img_style} />
                </div>
                <button onclick={prev} disabled={at_start} style="position:absolute; left:12px; top:50%; transform:translateY(-50%);">{"‹"}</button>
                <button onclick={next} disabled={at_end} style="position:absolute; right:12px; top:50%; transform:translateY(-50%);">{"›"}</button>
                <ZoomControls scale={t.scale} on_zoom_in={zoom_in} on_zoom_out={zoom_out} on_reset={reset} />
            </div>
        </div>
    }
}

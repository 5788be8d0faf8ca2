use yew::prelude::*;

#[derive(Properties, PartialEq, Clone)]
pub struct ZoomControlsProps {
    pub scale: f64,
    pub on_zoom_in: Callback<()>,
    pub on_zoom_out: Callback<()>,
    pub on_reset: Callback<()>,
}

#[function_component(ZoomControls)]
pub fn zoom_controls(props: &ZoomControlsProps) -> Html {
    let zi = {
        let cb = props.on_zoom_in.clone();
        Callback::from(move |_| cb.emit(()))
    };
    let zo = {
        let cb = props.on_zoom_out.clone();
        Callback::from(move |_| cb.emit(()))
    };
    let rs = {
        let cb = props.on_reset.clone();
        Callback::from(move |_| cb.emit(()))
    };
    let percent = (props.scale * 100.0).round();
    html! {<div style="position:absolute; left:50%; bottom:16px; transform:translateX(-50%); background:rgba(22,27,34,0.9); border:1px solid #30363d; border-radius:8px; padding:8px; display:flex; gap:6px; align-items:center;">
        <button onclick={zo} title="Zoom out"> {"-"} </button>
        <span style="min-width:48px; text-align:center; font-size:12px; color:#c9d1d9;">{ format!("{}%", percent) }</span>
        <button onclick={zi} title="Zoom in"> {"+"} </button>
        <span style="width:8px;"></span>
        <button onclick={rs}> {"Reset"} </button>
    </div>}
}

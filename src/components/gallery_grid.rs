use crate::model::Photo;
use yew::prelude::*;

#[derive(Properties, PartialEq, Clone)]
pub struct GalleryGridProps {
    pub photos: Vec<Photo>,
    pub on_open: Callback<usize>,
}

#[function_component(GalleryGrid)]
pub fn gallery_grid(props: &GalleryGridProps) -> Html {
    if props.photos.is_empty() {
        return html! {
            <p style="padding:24px 16px; color:#8b949e; font-size:14px;">{"No photos in this category yet."}</p>
        };
    }
    html! {
        <div style="display:grid; grid-template-columns:repeat(auto-fill, minmax(160px, 1fr)); gap:8px; padding:0 16px 24px;">
            { for props.photos.iter().enumerate().map(|(i, p)| {
                let onclick = {
                    let cb = props.on_open.clone();
                    Callback::from(move |_| cb.emit(i))
                };
                html! {
                    <button key={p.id.clone()} {onclick} title={p.title.clone()}
                        style="padding:0; border:1px solid #30363d; border-radius:6px; overflow:hidden; background:#161b22; aspect-ratio:1 / 1; cursor:zoom-in;">
                        <img src={p.thumbnail().to_string()} alt={p.title.clone()} loading="lazy" draggable="false"
                            style="width:100%; height:100%; object-fit:cover; display:block;" />
                    </button>
                }
            }) }
        </div>
    }
}

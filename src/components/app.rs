use super::{
    category_filter::CategoryFilter,
    gallery_grid::GalleryGrid,
    image_viewer::ImageViewer,
    pull_to_refresh::{PullToRefreshView, RefreshAction},
};
use crate::config::AppConfig;
use crate::error::RefreshError;
use crate::model::{GalleryAction, GalleryState, Manifest, Photo};
use futures::FutureExt;
use yew::prelude::*;

const CATEGORY_STORAGE_KEY: &str = "portfolio_active_category";

#[function_component(App)]
pub fn app() -> Html {
    let config = use_memo((), |_| AppConfig::load());
    let gallery = use_reducer(|| match Manifest::bundled() {
        Ok(m) => GalleryState::from_manifest(m),
        Err(e) => {
            log::error!("Bundled manifest unreadable: {}", e);
            GalleryState::default()
        }
    });

    // Restore the last category filter
    {
        let gallery = gallery.clone();
        use_effect_with((), move |_| {
            if let Some(win) = web_sys::window() {
                if let Ok(Some(store)) = win.local_storage() {
                    if let Ok(Some(raw)) = store.get_item(CATEGORY_STORAGE_KEY) {
                        if let Ok(cat) = serde_json::from_str::<Option<String>>(&raw) {
                            gallery.dispatch(GalleryAction::SelectCategory(cat));
                        }
                    }
                }
            }
            || ()
        });
    }
    {
        let active = gallery.active_category.clone();
        use_effect_with(active, move |active| {
            if let Some(win) = web_sys::window() {
                if let Ok(Some(store)) = win.local_storage() {
                    if let Ok(s) = serde_json::to_string(active) {
                        let _ = store.set_item(CATEGORY_STORAGE_KEY, &s);
                    }
                }
            }
            || ()
        });
    }

    let refresh = {
        let dispatcher = gallery.dispatcher();
        use_memo((), move |_| {
            RefreshAction::new(move || {
                let dispatcher = dispatcher.clone();
                async move {
                    let manifest = Manifest::bundled()?;
                    log::info!("Reloaded {} photos", manifest.photos.len());
                    dispatcher.dispatch(GalleryAction::Loaded(manifest));
                    Ok::<(), RefreshError>(())
                }
                .boxed_local()
            })
        })
    };

    let dispatch = |action: fn() -> GalleryAction| {
        let gallery = gallery.clone();
        Callback::from(move |_| gallery.dispatch(action()))
    };
    let next_category = dispatch(|| GalleryAction::NextCategory);
    let prev_category = dispatch(|| GalleryAction::PrevCategory);
    let on_next = dispatch(|| GalleryAction::Next);
    let on_prev = dispatch(|| GalleryAction::Prev);
    let on_close = dispatch(|| GalleryAction::Close);
    let on_select = {
        let gallery = gallery.clone();
        Callback::from(move |c: Option<String>| gallery.dispatch(GalleryAction::SelectCategory(c)))
    };
    let on_open = {
        let gallery = gallery.clone();
        Callback::from(move |i: usize| gallery.dispatch(GalleryAction::Open(i)))
    };

    let visible: Vec<Photo> = gallery.visible().into_iter().cloned().collect();
    let viewer = match (gallery.open, gallery.open_photo()) {
        (Some(index), Some(photo)) => html! {
            <ImageViewer
                photo={photo.clone()}
                {index}
                total={visible.len()}
                gesture={config.gesture.clone()}
                viewer={config.viewer.clone()}
                {on_next}
                {on_prev}
                {on_close}
            />
        },
        _ => html! {},
    };

    html! {
        <div style="font-family:system-ui, sans-serif; background:#0d1117; color:#c9d1d9; min-height:100vh;">
            <PullToRefreshView
                config={config.pull.clone()}
                gesture={config.gesture.clone()}
                on_refresh={(*refresh).clone()}
                on_swipe_left={next_category}
                on_swipe_right={prev_category}
            >
                <header style="padding:16px 16px 0;">
                    <h1 style="margin:0; font-size:20px; font-weight:600;">{"Portfolio"}</h1>
                </header>
                <CategoryFilter
                    categories={gallery.categories.clone()}
                    active={gallery.active_category.clone()}
                    {on_select}
                />
                <GalleryGrid key={gallery.version.to_string()} photos={visible.clone()} {on_open} />
            </PullToRefreshView>
            { viewer }
        </div>
    }
}

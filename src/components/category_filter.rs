use crate::model::Category;
use yew::prelude::*;

#[derive(Properties, PartialEq, Clone)]
pub struct CategoryFilterProps {
    pub categories: Vec<Category>,
    pub active: Option<String>,
    pub on_select: Callback<Option<String>>,
}

#[function_component(CategoryFilter)]
pub fn category_filter(props: &CategoryFilterProps) -> Html {
    let chip = |label: String, value: Option<String>| {
        let selected = props.active == value;
        let style = if selected {
            "padding:4px 12px; border-radius:14px; border:1px solid #58a6ff; background:#1f6feb; color:#fff; font-size:13px;"
        } else {
            "padding:4px 12px; border-radius:14px; border:1px solid #30363d; background:transparent; color:#c9d1d9; font-size:13px;"
        };
        let onclick = {
            let cb = props.on_select.clone();
            Callback::from(move |_| cb.emit(value.clone()))
        };
        html! { <button {style} {onclick} aria-pressed={selected.to_string()}>{ label }</button> }
    };
    html! {
        <nav style="display:flex; gap:8px; flex-wrap:wrap; padding:12px 16px;">
            { chip("All".to_string(), None) }
            { for props.categories.iter().map(|c| chip(c.name.clone(), Some(c.id.clone()))) }
        </nav>
    }
}

mod components;
mod config;
mod controller;
mod error;
mod gesture;
mod haptics;
mod hooks;
mod model;
mod state;
mod util;

use components::app::App;

fn main() {
    console_error_panic_hook::set_once();
    let _ = console_log::init_with_level(log::Level::Debug);
    log::info!("Portfolio starting");
    yew::Renderer::<App>::new().render();
}

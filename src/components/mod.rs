pub mod app;
pub mod category_filter;
pub mod gallery_grid;
pub mod image_viewer;
pub mod pull_to_refresh;
pub mod zoom_controls;

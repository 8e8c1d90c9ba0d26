pub mod api;
pub mod cli;
pub mod config;
pub mod editor;
pub mod loader;
pub mod logging;
pub mod model;
pub mod net;
pub mod session;
pub mod timer;
pub mod tui;
pub mod ui;

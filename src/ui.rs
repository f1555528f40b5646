//! Ratatui front-end over the catalog core. The app state lives in `app`, the
//! modal form state in `forms`, rendering helpers in `helpers`, and the
//! crossterm event loop in `terminal`.

mod app;
mod forms;
mod helpers;
mod terminal;

pub use app::App;
pub use terminal::run_app;

//! Ratatui front-end: a songbook list, a per-songbook detail with the derived
//! listings, and paginated song and artist lookups.

mod app;
mod forms;
mod helpers;
mod screens;
mod terminal;

pub use app::App;
pub use terminal::run_app;

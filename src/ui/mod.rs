pub mod app;
pub mod board_area;
pub mod game;
pub mod modal;

pub use app::App;

pub mod app;
pub mod bolt;
pub mod client;
pub mod config;
pub mod effects;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod state;
pub mod ui;
pub mod view;

pub use app::router;
pub use config::Config;
pub use state::AppState;

pub mod achievements;
pub mod app;
pub mod auth;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod onboarding;
pub mod progress;
pub mod routines;
pub mod state;
pub mod storage;
pub mod ui;

pub use app::router;
pub use state::AppState;
pub use storage::{load_data, resolve_data_path};
